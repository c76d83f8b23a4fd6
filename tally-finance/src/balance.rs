//! Balance totals over transactions and debts.

use serde::Serialize;
use tally_core::{Debt, DebtKind, Transaction};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Balance {
    pub income: f64,
    pub expense: f64,
    /// income - expense
    pub total: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DebtTotals {
    /// What I owe
    pub payable: f64,
    /// What is owed to me
    pub receivable: f64,
}

impl DebtTotals {
    pub fn net(&self) -> f64 {
        self.receivable - self.payable
    }
}

pub fn calculate_balance(txns: &[Transaction]) -> Balance {
    let income: f64 = txns.iter().filter(|t| t.is_income()).map(|t| t.amount).sum();
    let expense: f64 = txns.iter().filter(|t| t.is_expense()).map(|t| t.amount).sum();
    Balance {
        income,
        expense,
        total: income - expense,
    }
}

pub fn debt_totals(debts: &[Debt]) -> DebtTotals {
    let sum = |kind: DebtKind| -> f64 {
        debts
            .iter()
            .filter(|d| d.kind == kind)
            .map(|d| d.amount)
            .sum()
    };
    DebtTotals {
        payable: sum(DebtKind::Payable),
        receivable: sum(DebtKind::Receivable),
    }
}

/// First `n` transactions. The ledger stores newest first.
pub fn recent(txns: &[Transaction], n: usize) -> &[Transaction] {
    &txns[..n.min(txns.len())]
}
