#![forbid(unsafe_code)]

use super::{Lookup, Release, RentalStore, StoreError, Touch};
use crate::backend::{KeyValueBackend, now_ms};
use ml_core::ids::{ContractId, Plate};
use ml_core::{BikeStatus, Contract, ContractDraft, ContractStatus, desired_bike_status};
use tracing::{debug, info, warn};

impl<B: KeyValueBackend> RentalStore<B> {
    pub fn contracts(&self) -> &[Contract] {
        &self.contracts
    }

    pub fn contract(&self, id: &str) -> Option<&Contract> {
        self.contracts
            .iter()
            .find(|contract| contract.id.as_str() == id)
    }

    /// Contracts that are neither archived nor terminated, in storage order.
    pub fn active_contracts(&self) -> impl Iterator<Item = &Contract> {
        self.contracts.iter().filter(|contract| contract.is_active())
    }

    /// Whether an active contract other than `exclude` references `plate`.
    pub fn is_bike_in_use(&self, plate: &str, exclude: Option<&ContractId>) -> bool {
        self.active_holder(plate, exclude).is_some()
    }

    pub(super) fn active_holder(
        &self,
        plate: &str,
        exclude: Option<&ContractId>,
    ) -> Option<&Contract> {
        let plate = plate.trim();
        self.contracts.iter().find(|contract| {
            contract.is_active()
                && contract.plate.as_str() == plate
                && exclude.is_none_or(|id| &contract.id != id)
        })
    }

    /// Sets the bike to the status a contract in `status` implies.
    pub fn claim_bike(&mut self, plate: &Plate, status: ContractStatus) -> Touch {
        self.set_bike_status(plate.as_str(), desired_bike_status(status))
    }

    /// Frees the bike unless an active contract other than `exclude` still holds it.
    pub fn release_or_keep_bike(&mut self, plate: &Plate, exclude: Option<&ContractId>) -> Release {
        if self.is_bike_in_use(plate.as_str(), exclude) {
            debug!(plate = %plate, "bike still under another contract, kept rented");
            return Release::KeptInUse;
        }
        match self.set_bike_status(plate.as_str(), BikeStatus::Available) {
            Touch::Applied => Release::Released,
            Touch::NotFound => Release::NotFound,
        }
    }

    pub fn add_contract(&mut self, draft: ContractDraft) -> Result<Contract, StoreError> {
        let terms = draft.validate()?;
        if !terms.status.is_terminated() {
            self.ensure_plate_free(&terms.plate, None)?;
        }

        let id = self.next_contract_id();
        let bike_model = self
            .model_for(terms.plate.as_str())
            .unwrap_or_default()
            .to_string();
        let contract = terms.into_contract(id, bike_model, false);

        if contract.status.is_terminated()
            && let Some(holder) = self.active_holder(contract.plate.as_str(), None)
        {
            warn!(
                plate = %contract.plate,
                holder = %holder.id,
                "terminated contract frees a bike another active contract holds"
            );
        }
        self.claim_bike(&contract.plate, contract.status);
        self.contracts.push(contract.clone());
        self.save_contracts();

        info!(
            contract = %contract.id,
            plate = %contract.plate,
            status = contract.status.as_str(),
            "added contract"
        );
        Ok(contract)
    }

    /// Rewrites the contract from `draft`, keeping its id and archive flag, then brings the old and
    /// new bikes in line with the result.
    pub fn update_contract(
        &mut self,
        id: &str,
        draft: ContractDraft,
    ) -> Result<Lookup<Contract>, StoreError> {
        let Some(index) = self
            .contracts
            .iter()
            .position(|contract| contract.id.as_str() == id)
        else {
            return Ok(Lookup::NotFound);
        };

        let terms = draft.validate()?;
        let old = self.contracts[index].clone();
        let plate_changed = old.plate != terms.plate;

        if !terms.status.is_terminated() && (plate_changed || !old.is_active()) {
            self.ensure_plate_free(&terms.plate, Some(&old.id))?;
        }

        let bike_model = if plate_changed {
            self.model_for(terms.plate.as_str())
                .unwrap_or_default()
                .to_string()
        } else {
            old.bike_model.clone()
        };
        let updated = terms.into_contract(old.id.clone(), bike_model, old.archived);
        self.contracts[index] = updated.clone();
        self.save_contracts();

        if plate_changed {
            self.release_or_keep_bike(&old.plate, Some(&updated.id));
            self.claim_bike(&updated.plate, updated.status);
        } else if updated.status.is_terminated() {
            self.release_or_keep_bike(&updated.plate, Some(&updated.id));
        } else {
            self.set_bike_status(updated.plate.as_str(), BikeStatus::Rented);
        }

        info!(
            contract = %updated.id,
            plate = %updated.plate,
            status = updated.status.as_str(),
            plate_changed,
            "updated contract"
        );
        Ok(Lookup::Found(updated))
    }

    /// Hides the contract from every list and frees its bike if nothing else holds it.
    pub fn archive_contract(&mut self, id: &str) -> Touch {
        let Some(contract) = self
            .contracts
            .iter_mut()
            .find(|contract| contract.id.as_str() == id)
        else {
            return Touch::NotFound;
        };
        if contract.archived {
            return Touch::Applied;
        }

        let was_active = contract.is_active();
        contract.archived = true;
        let plate = contract.plate.clone();
        let id = contract.id.clone();
        self.save_contracts();

        if was_active {
            self.release_or_keep_bike(&plate, Some(&id));
        }
        info!(contract = %id, plate = %plate, "archived contract");
        Touch::Applied
    }

    /// Status-only edit, used by overdue propagation. Bikes are left alone: Normal and Overdue
    /// both keep the bike rented.
    pub fn set_contract_status(&mut self, id: &str, status: ContractStatus) -> Touch {
        let Some(contract) = self
            .contracts
            .iter_mut()
            .find(|contract| contract.id.as_str() == id)
        else {
            return Touch::NotFound;
        };

        contract.status = status;
        self.save_contracts();
        Touch::Applied
    }

    fn ensure_plate_free(
        &self,
        plate: &Plate,
        exclude: Option<&ContractId>,
    ) -> Result<(), StoreError> {
        match self.active_holder(plate.as_str(), exclude) {
            Some(holder) => {
                warn!(plate = %plate, holder = %holder.id, "rejected double booking");
                Err(StoreError::BikeInUse {
                    plate: plate.clone(),
                    contract_id: holder.id.clone(),
                })
            }
            None => Ok(()),
        }
    }

    fn next_contract_id(&self) -> ContractId {
        let now_ms = now_ms();
        let mut attempt = 0u32;
        loop {
            let id = ContractId::generate(now_ms, attempt);
            if self.contract(id.as_str()).is_none() {
                return id;
            }
            attempt = attempt.saturating_add(1);
        }
    }

    /// Records stored without an id get one. The collection is re-saved only if something changed.
    pub(super) fn ensure_contract_ids(&mut self) {
        let missing = self
            .contracts
            .iter()
            .filter(|contract| contract.id.is_empty())
            .count();
        if missing == 0 {
            return;
        }

        for index in 0..self.contracts.len() {
            if self.contracts[index].id.is_empty() {
                let id = self.next_contract_id();
                self.contracts[index].id = id;
            }
        }
        self.save_contracts();
        info!(assigned = missing, "assigned ids to stored contracts");
    }
}
