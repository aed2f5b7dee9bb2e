#![forbid(unsafe_code)]

use crate::backend::KeyValueBackend;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub const BIKES_KEY: &str = "motorbike_bikes_v1";
pub const CONTRACTS_KEY: &str = "motorbike_contracts_v1";
pub const PAYMENTS_KEY: &str = "motorbike_payments_v2";

/// JSON collections stored under named keys.
///
/// Reads never fail: a missing key, a backend error or a payload of the wrong shape all come back
/// as the empty collection. Writes overwrite the whole key and swallow failures after logging them.
#[derive(Debug)]
pub struct RecordStore<B> {
    backend: B,
}

impl<B: KeyValueBackend> RecordStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    pub fn load<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "no stored collection, starting empty");
                return T::default();
            }
            Err(err) => {
                warn!(key, error = %err, "failed to read stored collection, starting empty");
                return T::default();
            }
        };

        match serde_json::from_str::<T>(&raw) {
            Ok(value) => {
                debug!(key, bytes = raw.len(), "loaded collection");
                value
            }
            Err(err) => {
                warn!(key, error = %err, "stored collection is malformed, starting empty");
                T::default()
            }
        }
    }

    pub fn save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key, error = %err, "failed to serialize collection, write dropped");
                return;
            }
        };

        match self.backend.set(key, &raw) {
            Ok(()) => debug!(key, bytes = raw.len(), "saved collection"),
            Err(err) => warn!(key, error = %err, "failed to write collection, write dropped"),
        }
    }
}
