#![forbid(unsafe_code)]

use ml_core::ids::{ContractId, Plate};
use ml_core::{BikeDraftError, MissingFields};

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
    Json(serde_json::Error),
    InvalidInput(&'static str),
    InvalidBike(BikeDraftError),
    InvalidContract(MissingFields),
    DuplicatePlate(Plate),
    /// The plate is held by another active contract.
    BikeInUse {
        plate: Plate,
        contract_id: ContractId,
    },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::Json(err) => write!(f, "json: {err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::InvalidBike(err) => write!(f, "invalid bike: {err}"),
            Self::InvalidContract(err) => write!(f, "invalid contract: {err}"),
            Self::DuplicatePlate(plate) => write!(f, "plate already registered: {plate}"),
            Self::BikeInUse { plate, contract_id } => {
                write!(f, "bike in use (plate={plate}, contract={contract_id})")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Sql(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::InvalidBike(err) => Some(err),
            Self::InvalidContract(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<BikeDraftError> for StoreError {
    fn from(value: BikeDraftError) -> Self {
        Self::InvalidBike(value)
    }
}

impl From<MissingFields> for StoreError {
    fn from(value: MissingFields) -> Self {
        Self::InvalidContract(value)
    }
}
