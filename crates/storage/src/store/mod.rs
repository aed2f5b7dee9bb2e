#![forbid(unsafe_code)]

mod bikes;
mod contracts;
mod error;
mod outcome;
mod payments;
mod settlement;

pub use bikes::PlateOption;
pub use error::StoreError;
pub use outcome::{Lookup, Release, RemoveOutcome, Touch};
pub use payments::{OverdueSweep, PaymentBook};
pub use settlement::Settlement;

use crate::backend::{KeyValueBackend, SqliteBackend};
use crate::config::StoreConfig;
use crate::record_store::{BIKES_KEY, CONTRACTS_KEY, PAYMENTS_KEY, RecordStore};
use ml_core::{Bike, Contract};
use tracing::info;

/// The rental repository: bikes, contracts and committed payments for one session.
///
/// Every collection is held in memory and written back to its key right after each mutation.
/// Build one per session and pass it by reference to whatever needs it.
#[derive(Debug)]
pub struct RentalStore<B: KeyValueBackend = SqliteBackend> {
    records: RecordStore<B>,
    bikes: Vec<Bike>,
    contracts: Vec<Contract>,
    payments: PaymentBook,
}

impl RentalStore<SqliteBackend> {
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let backend = SqliteBackend::open(&config.storage_dir)?;
        let mut store = Self::with_backend(backend);
        if config.seed_sample_bikes {
            store.seed_sample_bikes();
        }
        info!(
            storage_dir = %config.storage_dir.display(),
            bikes = store.bikes.len(),
            contracts = store.contracts.len(),
            "opened rental store"
        );
        Ok(store)
    }
}

impl<B: KeyValueBackend> RentalStore<B> {
    pub fn with_backend(backend: B) -> Self {
        let mut store = Self {
            records: RecordStore::new(backend),
            bikes: Vec::new(),
            contracts: Vec::new(),
            payments: PaymentBook::new(),
        };
        store.reload();
        store
    }

    /// Drops in-memory state and reads every collection back from storage.
    pub fn reload(&mut self) {
        self.bikes = self.records.load(BIKES_KEY);
        self.contracts = self.records.load(CONTRACTS_KEY);
        self.payments = self.records.load(PAYMENTS_KEY);
        self.ensure_contract_ids();
    }

    pub fn records(&self) -> &RecordStore<B> {
        &self.records
    }

    pub fn into_backend(self) -> B {
        self.records.into_backend()
    }

    fn save_bikes(&mut self) {
        self.records.save(BIKES_KEY, &self.bikes);
    }

    fn save_contracts(&mut self) {
        self.records.save(CONTRACTS_KEY, &self.contracts);
    }

    fn save_payments(&mut self) {
        self.records.save(PAYMENTS_KEY, &self.payments);
    }
}
