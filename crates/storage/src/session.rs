#![forbid(unsafe_code)]

use crate::backend::{KeyValueBackend, now_ms};
use crate::config::StoreConfig;
use crate::store::{OverdueSweep, RentalStore};
use ml_core::dates::{format_date, today_local, today_utc};
use ml_core::ids::ContractId;
use ml_core::paging::paginate_desc;
use ml_core::Contract;
use std::collections::BTreeMap;
use time::Date;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DayCounts {
    pub paid: usize,
    pub unpaid: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayRow<'a> {
    pub contract: &'a Contract,
    pub paid: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryRow {
    pub date: Date,
    pub paid: bool,
    pub day_fee: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryView {
    pub contract_id: ContractId,
    pub start: Date,
    pub end: Date,
    pub total_days: usize,
    pub page_index: usize,
    pub total_pages: usize,
    pub rows: Vec<HistoryRow>,
}

impl HistoryView {
    pub fn has_prev(&self) -> bool {
        self.page_index > 0
    }

    pub fn has_next(&self) -> bool {
        self.page_index + 1 < self.total_pages
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub committed: usize,
    /// Present when overdue propagation ran.
    pub sweep: Option<OverdueSweep>,
}

/// Payment checkmarks edited on screen but not yet saved, plus the view state around them
/// (displayed date, selected contract, history page).
///
/// A staged cell shadows the committed entry until [`PaymentSession::commit`] writes it or the
/// session throws it away. Staged edits never follow the user to another date.
#[derive(Clone, Debug)]
pub struct PaymentSession {
    current_date: Date,
    staged: BTreeMap<(Date, ContractId), bool>,
    selected: Option<ContractId>,
    history_page: usize,
    page_size: usize,
    auto_overdue: bool,
}

impl PaymentSession {
    pub fn new(current_date: Date, config: &StoreConfig) -> Self {
        Self {
            current_date,
            staged: BTreeMap::new(),
            selected: None,
            history_page: 0,
            page_size: config.history_page_size.max(1),
            auto_overdue: config.auto_overdue,
        }
    }

    /// Session on today's local date. When the local offset is unknown the UTC date is used,
    /// which can be a day off near midnight.
    pub fn today(config: &StoreConfig) -> Self {
        let today = today_local().unwrap_or_else(|| {
            let utc = today_utc();
            warn!(
                date = %format_date(utc),
                "local utc offset unavailable, falling back to the utc date"
            );
            utc
        });
        Self::new(today, config)
    }

    pub fn current_date(&self) -> Date {
        self.current_date
    }

    pub fn auto_overdue(&self) -> bool {
        self.auto_overdue
    }

    pub fn set_auto_overdue(&mut self, enabled: bool) {
        self.auto_overdue = enabled;
    }

    pub fn is_dirty(&self) -> bool {
        !self.staged.is_empty()
    }

    pub fn staged_count(&self) -> usize {
        self.staged.len()
    }

    pub fn stage(&mut self, date: Date, contract_id: &ContractId, paid: bool) {
        self.staged.insert((date, contract_id.clone()), paid);
        debug!(date = %format_date(date), contract = %contract_id, paid, "staged payment");
    }

    /// Staged value if any, else the committed one, else unpaid.
    pub fn paid_state<B: KeyValueBackend>(
        &self,
        store: &RentalStore<B>,
        date: Date,
        contract_id: &ContractId,
    ) -> bool {
        match self.staged.get(&(date, contract_id.clone())) {
            Some(paid) => *paid,
            None => store.committed_paid(date, contract_id),
        }
    }

    /// Writes every staged cell, runs overdue propagation for the displayed date when enabled,
    /// and leaves the session clean.
    pub fn commit<B: KeyValueBackend>(&mut self, store: &mut RentalStore<B>) -> CommitReport {
        let staged = std::mem::take(&mut self.staged);
        let cells = staged
            .into_iter()
            .map(|((date, contract_id), paid)| (date, contract_id, paid));
        let committed = store.record_payments(cells, now_ms());

        let sweep = self
            .auto_overdue
            .then(|| store.apply_overdue(self.current_date));

        info!(
            committed,
            date = %format_date(self.current_date),
            auto_overdue = self.auto_overdue,
            "committed payments"
        );
        CommitReport { committed, sweep }
    }

    pub fn discard(&mut self) {
        if self.is_dirty() {
            debug!(dropped = self.staged.len(), "discarded staged payments");
        }
        self.staged.clear();
    }

    /// Moves the display to `date`. With unsaved edits `confirm` is asked first; declining keeps
    /// the current date and the staged edits. Otherwise staged edits are dropped and the store is
    /// reloaded. Returns whether the switch happened.
    pub fn switch_date<B: KeyValueBackend>(
        &mut self,
        store: &mut RentalStore<B>,
        date: Date,
        confirm: impl FnOnce() -> bool,
    ) -> bool {
        if self.is_dirty() && !confirm() {
            return false;
        }
        self.discard();
        self.current_date = date;
        store.reload();
        true
    }

    /// Active contracts with their effective paid-state on the displayed date.
    pub fn day_rows<'a, B: KeyValueBackend>(&self, store: &'a RentalStore<B>) -> Vec<DayRow<'a>> {
        store
            .active_contracts()
            .map(|contract| DayRow {
                contract,
                paid: self.paid_state(store, self.current_date, &contract.id),
            })
            .collect()
    }

    pub fn day_counts<B: KeyValueBackend>(&self, store: &RentalStore<B>, date: Date) -> DayCounts {
        let mut counts = DayCounts::default();
        for contract in store.active_contracts() {
            if self.paid_state(store, date, &contract.id) {
                counts.paid += 1;
            } else {
                counts.unpaid += 1;
            }
        }
        counts
    }

    pub fn selected(&self) -> Option<&ContractId> {
        self.selected.as_ref()
    }

    pub fn select_contract(&mut self, contract_id: ContractId) {
        self.selected = Some(contract_id);
        self.history_page = 0;
    }

    pub fn history_page(&self) -> usize {
        self.history_page
    }

    pub fn next_page(&mut self) {
        self.history_page = self.history_page.saturating_add(1);
    }

    pub fn prev_page(&mut self) {
        self.history_page = self.history_page.saturating_sub(1);
    }

    /// Payment history of the selected contract over its whole period, newest first. The page
    /// index is clamped into range and remembered. `None` when nothing is selected or the
    /// selected contract no longer exists.
    pub fn history<B: KeyValueBackend>(&mut self, store: &RentalStore<B>) -> Option<HistoryView> {
        let contract_id = self.selected.as_ref()?;
        let contract = store.contract(contract_id.as_str())?;

        let dates = contract.period_dates();
        let page = paginate_desc(&dates, self.page_size, self.history_page);
        self.history_page = page.page_index;

        let rows = page
            .items
            .iter()
            .map(|date| HistoryRow {
                date: *date,
                paid: self.paid_state(store, *date, &contract.id),
                day_fee: contract.day_fee,
            })
            .collect();

        Some(HistoryView {
            contract_id: contract.id.clone(),
            start: contract.start,
            end: contract.end,
            total_days: dates.len(),
            page_index: page.page_index,
            total_pages: page.total_pages,
            rows,
        })
    }
}
