#![forbid(unsafe_code)]

use super::RentalStore;
use crate::backend::KeyValueBackend;
use ml_core::{Contract, ContractStatus};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    /// Sum of every stored contract's billing amount.
    pub billing_total: u64,
    pub overdue: Vec<Contract>,
}

impl<B: KeyValueBackend> RentalStore<B> {
    pub fn settlement(&self) -> Settlement {
        let billing_total = self
            .contracts
            .iter()
            .fold(0u64, |sum, contract| sum.saturating_add(contract.billing_amount));
        let overdue = self
            .contracts
            .iter()
            .filter(|contract| contract.status == ContractStatus::Overdue)
            .cloned()
            .collect();

        Settlement {
            billing_total,
            overdue,
        }
    }
}
