#![forbid(unsafe_code)]

use super::RentalStore;
use crate::backend::KeyValueBackend;
use ml_core::dates::format_date;
use ml_core::ids::ContractId;
use ml_core::{ContractStatus, PaymentEntry};
use std::collections::BTreeMap;
use time::Date;
use tracing::info;

/// Committed payment checkmarks: `YYYY-MM-DD` → contract id → entry.
pub type PaymentBook = BTreeMap<String, BTreeMap<String, PaymentEntry>>;

/// Contracts whose status changed in an overdue sweep.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OverdueSweep {
    pub marked_overdue: Vec<ContractId>,
    pub restored_normal: Vec<ContractId>,
}

impl OverdueSweep {
    pub fn is_empty(&self) -> bool {
        self.marked_overdue.is_empty() && self.restored_normal.is_empty()
    }
}

impl<B: KeyValueBackend> RentalStore<B> {
    pub fn payments(&self) -> &PaymentBook {
        &self.payments
    }

    pub fn committed_entry(&self, date: Date, contract_id: &ContractId) -> Option<&PaymentEntry> {
        self.payments
            .get(&format_date(date))
            .and_then(|day| day.get(contract_id.as_str()))
    }

    /// Committed paid-state of a cell; unpaid when nothing was ever saved for it.
    pub fn committed_paid(&self, date: Date, contract_id: &ContractId) -> bool {
        self.committed_entry(date, contract_id)
            .is_some_and(|entry| entry.paid)
    }

    /// Overwrites each cell with its new paid-state stamped `ts`, then persists the payment
    /// store once. Returns the number of cells written.
    pub fn record_payments(
        &mut self,
        cells: impl IntoIterator<Item = (Date, ContractId, bool)>,
        ts: i64,
    ) -> usize {
        let mut written = 0usize;
        for (date, contract_id, paid) in cells {
            self.payments
                .entry(format_date(date))
                .or_default()
                .insert(contract_id.as_str().to_string(), PaymentEntry { paid, ts });
            written += 1;
        }
        self.save_payments();
        written
    }

    /// Every active contract unpaid on `date` becomes overdue; a paid contract that was overdue
    /// goes back to normal. The contract store is saved when anything changed.
    pub fn apply_overdue(&mut self, date: Date) -> OverdueSweep {
        let day = self.payments.get(&format_date(date));
        let mut sweep = OverdueSweep::default();

        for contract in self.contracts.iter_mut().filter(|c| c.is_active()) {
            let paid = day
                .and_then(|entries| entries.get(contract.id.as_str()))
                .is_some_and(|entry| entry.paid);

            if !paid {
                if contract.status != ContractStatus::Overdue {
                    contract.status = ContractStatus::Overdue;
                    sweep.marked_overdue.push(contract.id.clone());
                }
            } else if contract.status == ContractStatus::Overdue {
                contract.status = ContractStatus::Normal;
                sweep.restored_normal.push(contract.id.clone());
            }
        }

        if !sweep.is_empty() {
            self.save_contracts();
            info!(
                date = %format_date(date),
                overdue = sweep.marked_overdue.len(),
                restored = sweep.restored_normal.len(),
                "applied overdue sweep"
            );
        }
        sweep
    }
}
