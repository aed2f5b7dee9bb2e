#![forbid(unsafe_code)]

use crate::dates;
use crate::ids::{ContractId, Plate};
use crate::model::{Bike, BikeStatus, Contract, ContractStatus, DEFAULT_CONTRACT_KIND, Fees};
use time::Date;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BikeDraft {
    pub plate: String,
    pub model: String,
    pub status: BikeStatus,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BikeDraftError {
    MissingPlate,
    MissingModel,
}

impl BikeDraftError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingPlate => "plate is required",
            Self::MissingModel => "model is required",
        }
    }
}

impl std::fmt::Display for BikeDraftError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for BikeDraftError {}

impl BikeDraft {
    pub fn validate(&self) -> Result<Bike, BikeDraftError> {
        let plate = Plate::try_new(self.plate.as_str()).map_err(|_| BikeDraftError::MissingPlate)?;
        let model = self.model.trim();
        if model.is_empty() {
            return Err(BikeDraftError::MissingModel);
        }
        Ok(Bike {
            plate,
            model: model.to_string(),
            status: self.status,
        })
    }
}

/// Raw contract form input, before validation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContractDraft {
    pub kind: String,
    pub name: String,
    pub phone: String,
    pub plate: String,
    pub day_fee: u64,
    pub start: Option<Date>,
    pub days: u32,
    pub status: ContractStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContractField {
    Name,
    Phone,
    Plate,
    DayFee,
    StartDate,
    Days,
    EndDate,
}

impl ContractField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Plate => "plate",
            Self::DayFee => "day_fee",
            Self::StartDate => "start",
            Self::Days => "days",
            Self::EndDate => "end",
        }
    }
}

/// Every required contract field that was missing or invalid, in form order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingFields(Vec<ContractField>);

impl MissingFields {
    pub fn fields(&self) -> &[ContractField] {
        &self.0
    }

    pub fn contains(&self, field: ContractField) -> bool {
        self.0.contains(&field)
    }
}

impl std::fmt::Display for MissingFields {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = self
            .0
            .iter()
            .map(|field| field.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "missing or invalid contract fields: {names}")
    }
}

impl std::error::Error for MissingFields {}

/// Validated contract input with derived fees and end date.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractTerms {
    pub kind: String,
    pub name: String,
    pub phone: String,
    pub plate: Plate,
    pub fees: Fees,
    pub start: Date,
    pub days: u32,
    pub end: Date,
    pub status: ContractStatus,
}

impl ContractDraft {
    pub fn end_date(&self) -> Option<Date> {
        self.start.and_then(|start| dates::end_date(start, self.days))
    }

    pub fn validate(&self) -> Result<ContractTerms, MissingFields> {
        let mut missing = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            missing.push(ContractField::Name);
        }
        let phone = self.phone.trim();
        if phone.is_empty() {
            missing.push(ContractField::Phone);
        }
        let plate = Plate::try_new(self.plate.as_str()).ok();
        if plate.is_none() {
            missing.push(ContractField::Plate);
        }
        if self.day_fee == 0 {
            missing.push(ContractField::DayFee);
        }
        if self.start.is_none() {
            missing.push(ContractField::StartDate);
        }
        if self.days < 1 {
            missing.push(ContractField::Days);
        }
        let end = self.end_date();
        if end.is_none() {
            missing.push(ContractField::EndDate);
        }

        let (Some(plate), Some(start), Some(end)) = (plate, self.start, end) else {
            return Err(MissingFields(missing));
        };
        if !missing.is_empty() {
            return Err(MissingFields(missing));
        }

        let kind = match self.kind.trim() {
            "" => DEFAULT_CONTRACT_KIND.to_string(),
            kind => kind.to_string(),
        };

        Ok(ContractTerms {
            kind,
            name: name.to_string(),
            phone: phone.to_string(),
            plate,
            fees: Fees::from_day_fee(self.day_fee),
            start,
            days: self.days,
            end,
            status: self.status,
        })
    }
}

impl ContractTerms {
    /// Builds the persisted record. The billing amount snapshots the monthly fee.
    pub fn into_contract(self, id: ContractId, bike_model: String, archived: bool) -> Contract {
        Contract {
            id,
            kind: self.kind,
            name: self.name,
            phone: self.phone,
            plate: self.plate,
            bike_model,
            day_fee: self.fees.day,
            week_fee: self.fees.week,
            month_fee: self.fees.month,
            billing_amount: self.fees.month,
            start: self.start,
            days: self.days,
            end: self.end,
            status: self.status,
            archived,
        }
    }
}
