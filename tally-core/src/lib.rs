//! tally-core: ledger records and the credit-card cycle advisor

pub mod cycle;
pub mod error;
pub mod finance;
pub mod time;

pub use cycle::{
    CreditCardCycle, CycleAdvisor, CyclePolicy, CycleStatus, DayOfMonth, MonthLength,
    NOMINAL_MONTH_DAYS, Severity, classify_cycle, days_since_cutoff,
};
pub use error::RecordError;
pub use finance::{
    Category, Debt, DebtKind, Transaction, TransactionKind, categories_for, default_categories,
};
pub use time::{Clock, FixedClock, SystemClock};
