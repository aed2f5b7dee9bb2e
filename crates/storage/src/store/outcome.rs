#![forbid(unsafe_code)]

use ml_core::Bike;

/// Result of a mutation addressed by key. `NotFound` is not an error: callers reference bikes and
/// contracts unconditionally and are free to ignore a miss.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Touch {
    Applied,
    NotFound,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed(Bike),
    Declined,
    NotFound,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Release {
    Released,
    /// Another active contract still references the plate.
    KeptInUse,
    NotFound,
}
