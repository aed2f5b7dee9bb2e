#![forbid(unsafe_code)]

use super::{RemoveOutcome, RentalStore, StoreError, Touch};
use crate::backend::KeyValueBackend;
use ml_core::ids::Plate;
use ml_core::{Bike, BikeDraft, BikeStatus};
use tracing::{debug, info, warn};

/// One entry of the plate picker on the contract form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlateOption {
    pub plate: Plate,
    pub model: String,
    pub status: BikeStatus,
    pub selectable: bool,
    pub selected: bool,
}

const SAMPLE_BIKES: [(&str, &str, BikeStatus); 2] = [
    ("123가4567", "PCX", BikeStatus::Available),
    ("234나8910", "NMAX", BikeStatus::Rented),
];

impl<B: KeyValueBackend> RentalStore<B> {
    pub fn bikes(&self) -> &[Bike] {
        &self.bikes
    }

    pub fn bike(&self, plate: &str) -> Option<&Bike> {
        let plate = plate.trim();
        self.bikes.iter().find(|bike| bike.plate.as_str() == plate)
    }

    pub fn model_for(&self, plate: &str) -> Option<&str> {
        self.bike(plate).map(|bike| bike.model.as_str())
    }

    pub fn register_bike(&mut self, draft: BikeDraft) -> Result<Bike, StoreError> {
        let bike = draft.validate()?;
        if self.bike(bike.plate.as_str()).is_some() {
            warn!(plate = %bike.plate, "rejected duplicate plate");
            return Err(StoreError::DuplicatePlate(bike.plate));
        }

        self.bikes.push(bike.clone());
        self.save_bikes();
        info!(
            plate = %bike.plate,
            model = %bike.model,
            status = bike.status.as_str(),
            "registered bike"
        );
        Ok(bike)
    }

    pub fn set_bike_status(&mut self, plate: &str, status: BikeStatus) -> Touch {
        let plate = plate.trim();
        let Some(bike) = self
            .bikes
            .iter_mut()
            .find(|bike| bike.plate.as_str() == plate)
        else {
            debug!(plate, status = status.as_str(), "no bike for plate, status left alone");
            return Touch::NotFound;
        };

        bike.status = status;
        self.save_bikes();
        Touch::Applied
    }

    /// Removes a bike after `confirm` accepts it. A bike still held by an active contract is
    /// never removed, and `confirm` is not asked.
    pub fn remove_bike(
        &mut self,
        plate: &str,
        confirm: impl FnOnce(&Bike) -> bool,
    ) -> Result<RemoveOutcome, StoreError> {
        let plate = plate.trim();
        let Some(index) = self
            .bikes
            .iter()
            .position(|bike| bike.plate.as_str() == plate)
        else {
            return Ok(RemoveOutcome::NotFound);
        };

        if let Some(holder) = self.active_holder(plate, None) {
            warn!(plate, contract = %holder.id, "refused to remove a bike under contract");
            return Err(StoreError::BikeInUse {
                plate: self.bikes[index].plate.clone(),
                contract_id: holder.id.clone(),
            });
        }

        if !confirm(&self.bikes[index]) {
            return Ok(RemoveOutcome::Declined);
        }

        let removed = self.bikes.remove(index);
        self.save_bikes();
        info!(plate = %removed.plate, "removed bike");
        Ok(RemoveOutcome::Removed(removed))
    }

    /// Plates for the contract form. A bike that is not available cannot be picked, except the
    /// plate the edited contract already holds.
    pub fn plate_options(&self, selected: Option<&str>) -> Vec<PlateOption> {
        let selected = selected.map(str::trim).filter(|plate| !plate.is_empty());
        self.bikes
            .iter()
            .map(|bike| {
                let is_selected = selected == Some(bike.plate.as_str());
                PlateOption {
                    plate: bike.plate.clone(),
                    model: bike.model.clone(),
                    status: bike.status,
                    selectable: bike.status == BikeStatus::Available || is_selected,
                    selected: is_selected,
                }
            })
            .collect()
    }

    /// Fills an empty registry with the two demo bikes. Returns whether anything was written.
    pub fn seed_sample_bikes(&mut self) -> bool {
        if !self.bikes.is_empty() {
            return false;
        }

        for (plate, model, status) in SAMPLE_BIKES {
            let Ok(plate) = Plate::try_new(plate) else {
                continue;
            };
            self.bikes.push(Bike {
                plate,
                model: model.to_string(),
                status,
            });
        }
        self.save_bikes();
        info!(count = self.bikes.len(), "seeded sample bikes");
        true
    }
}
