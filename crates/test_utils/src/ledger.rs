//! In-memory ledger harness
//!
//! Wires the bills and settlement services to one shared in-memory store
//! and a manual clock, the way an application would wire them to a real
//! store and the system clock.

use std::sync::Arc;

use core_kernel::temporal::mock::ManualClock;
use core_kernel::{BillId, LedgerConfig, UserId};
use domain_bills::{BillDraft, BillRecord, BillService, User, UserService};
use domain_settlement::ports::mock::InMemoryLedgerStore;
use domain_settlement::{Balance, BalanceService, Settlement};

use crate::telemetry::init_tracing;

/// A fully wired ledger for tests
pub struct TestLedger {
    pub store: Arc<InMemoryLedgerStore>,
    pub clock: Arc<ManualClock>,
    pub config: LedgerConfig,
    pub bills: BillService,
    pub users: UserService,
    pub balances: Arc<BalanceService>,
}

impl TestLedger {
    /// A ledger with the default configuration
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    /// A ledger with a custom configuration
    pub fn with_config(config: LedgerConfig) -> Self {
        init_tracing();

        let store = Arc::new(InMemoryLedgerStore::new());
        let clock = Arc::new(ManualClock::at_default_start());
        let balances = Arc::new(BalanceService::new(
            store.clone(),
            store.clone(),
            clock.clone(),
            &config,
        ));
        let bills = BillService::new(store.clone(), store.clone(), clock.clone(), &config);
        let users = UserService::new(store.clone(), balances.clone(), clock.clone(), &config);

        Self {
            store,
            clock,
            config,
            bills,
            users,
            balances,
        }
    }

    /// Registers users by name, in order
    pub fn register(&self, names: &[&str]) -> Vec<User> {
        names
            .iter()
            .map(|name| self.users.create_user(name).expect("create user"))
            .collect()
    }

    /// Advances the clock one minute and records the bill
    pub fn record(&self, draft: &BillDraft) -> BillRecord {
        self.clock.advance_seconds(60);
        self.bills.create_bill(draft).expect("create bill")
    }

    /// Advances the clock one minute and settles
    pub fn settle(&self, note: &str) -> Settlement {
        self.clock.advance_seconds(60);
        self.balances.settle(note).expect("settle")
    }

    /// Current net balances
    pub fn current_balances(&self) -> Vec<Balance> {
        self.balances.compute_balances().expect("compute balances")
    }

    /// Retrieves a stored bill without resolving names
    pub fn bill(&self, bill_id: BillId) -> BillRecord {
        self.bills.get_bill(bill_id).expect("get bill").record
    }

    /// Ids of `users`, in order
    pub fn ids(users: &[User]) -> Vec<UserId> {
        users.iter().map(|u| u.id).collect()
    }
}

impl Default for TestLedger {
    fn default() -> Self {
        Self::new()
    }
}
