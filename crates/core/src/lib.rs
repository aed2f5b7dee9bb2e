#![forbid(unsafe_code)]

pub mod ids {
    use serde::{Deserialize, Serialize};

    /// License plate of a bike. Unique across the registry.
    #[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Plate(String);

    impl Plate {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, PlateError> {
            let value = value.into();
            let trimmed = validate_plate(&value)?;
            Ok(Self(trimmed.to_string()))
        }
    }

    impl std::fmt::Display for Plate {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum PlateError {
        Empty,
        ContainsControl,
    }

    impl PlateError {
        pub fn message(&self) -> &'static str {
            match self {
                Self::Empty => "plate must not be empty",
                Self::ContainsControl => "plate contains control characters",
            }
        }
    }

    fn validate_plate(value: &str) -> Result<&str, PlateError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(PlateError::Empty);
        }
        if trimmed.chars().any(|c| c.is_control()) {
            return Err(PlateError::ContainsControl);
        }
        Ok(trimmed)
    }

    /// Contract identifier, `c_<millis>` for generated ids.
    ///
    /// Records written by older builds may carry any non-empty string; a record with no id at all
    /// deserializes to the empty id and gets one assigned on load.
    #[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ContractId(String);

    impl ContractId {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, ContractIdError> {
            let value = value.into();
            if value.trim().is_empty() {
                return Err(ContractIdError::Empty);
            }
            if value.chars().any(|c| c.is_control()) {
                return Err(ContractIdError::ContainsControl);
            }
            Ok(Self(value))
        }

        /// Generated id for a contract created at `now_ms`. `attempt` disambiguates ids minted within
        /// the same millisecond.
        pub fn generate(now_ms: i64, attempt: u32) -> Self {
            if attempt == 0 {
                Self(format!("c_{now_ms}"))
            } else {
                Self(format!("c_{now_ms}_{attempt}"))
            }
        }
    }

    impl std::fmt::Display for ContractId {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum ContractIdError {
        Empty,
        ContainsControl,
    }

    impl ContractIdError {
        pub fn message(&self) -> &'static str {
            match self {
                Self::Empty => "contract id must not be empty",
                Self::ContainsControl => "contract id contains control characters",
            }
        }
    }
}

pub mod dates;
mod draft;
mod model;
pub mod paging;

pub use draft::*;
pub use model::*;

#[cfg(test)]
mod tests;
