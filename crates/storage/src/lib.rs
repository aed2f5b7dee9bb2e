#![forbid(unsafe_code)]

mod backend;
mod config;
mod record_store;
mod session;
mod store;

pub use backend::{KeyValueBackend, MemoryBackend, SqliteBackend};
pub use config::StoreConfig;
pub use record_store::{BIKES_KEY, CONTRACTS_KEY, PAYMENTS_KEY, RecordStore};
pub use session::{CommitReport, DayCounts, DayRow, HistoryRow, HistoryView, PaymentSession};
pub use store::*;
