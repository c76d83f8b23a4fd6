//! tally-finance: balances, category breakdowns, card tips, CSV import and
//! the AI advice contract

pub mod advice;
pub mod balance;
pub mod breakdown;
pub mod card_tips;
pub mod import;

pub use advice::{AdviceSource, build_advice_prompt, financial_advice};
pub use balance::{Balance, DebtTotals, calculate_balance, debt_totals, recent};
pub use breakdown::{CategorySlice, category_breakdown};
pub use card_tips::{CardTip, card_tip, card_tips};
pub use import::{import_transactions_csv, parse_transactions_csv};
