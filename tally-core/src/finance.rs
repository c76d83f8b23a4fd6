//! Ledger record types: transactions, debts and categories.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cycle::CreditCardCycle;
use crate::error::RecordError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    #[serde(rename = "income")]
    Income,
    #[serde(rename = "expense")]
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(RecordError::UnknownKind(other.to_string())),
        }
    }
}

/// A single income or expense entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: String,
    /// Always positive; `kind` carries the sign.
    pub amount: f64,
    /// Category id (built-in or custom)
    pub category: String,
    pub kind: TransactionKind,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        kind: TransactionKind,
        amount: f64,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Result<Self, RecordError> {
        let category = category.into();
        if category.trim().is_empty() {
            return Err(RecordError::MissingField("category"));
        }
        Ok(Self {
            id: id.into(),
            amount: positive_amount(amount)?,
            category,
            kind,
            date,
            note: None,
        })
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let note = note.into();
        self.note = if note.trim().is_empty() { None } else { Some(note) };
        self
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    /// Positive for income, negative for expense.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DebtKind {
    /// I owe this
    #[serde(rename = "payable")]
    Payable,
    /// Someone owes me this
    #[serde(rename = "receivable")]
    Receivable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Debt {
    pub id: String,
    /// Bank, person or concept
    pub title: String,
    pub amount: f64,
    pub kind: DebtKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_card: Option<CreditCardCycle>,
}

impl Debt {
    pub fn new(
        id: impl Into<String>,
        kind: DebtKind,
        title: impl Into<String>,
        amount: f64,
    ) -> Result<Self, RecordError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(RecordError::MissingField("title"));
        }
        Ok(Self {
            id: id.into(),
            title,
            amount: positive_amount(amount)?,
            kind,
            due_date: None,
            notes: None,
            credit_card: None,
        })
    }

    /// Plain loans carry a due date; credit cards use their cycle instead.
    pub fn with_due_date(mut self, due: NaiveDate) -> Self {
        if self.credit_card.is_none() {
            self.due_date = Some(due);
        }
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        let notes = notes.into();
        self.notes = if notes.trim().is_empty() { None } else { Some(notes) };
        self
    }

    pub fn with_card(mut self, cycle: CreditCardCycle) -> Result<Self, RecordError> {
        if self.kind != DebtKind::Payable {
            return Err(RecordError::ReceivableCard);
        }
        self.due_date = None;
        self.credit_card = Some(cycle);
        Ok(self)
    }

    pub fn is_credit_card(&self) -> bool {
        self.credit_card.is_some()
    }

    /// Cycle to classify, or `None` for a plain non-revolving debt.
    pub fn card_cycle(&self) -> Option<&CreditCardCycle> {
        self.credit_card.as_ref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    /// CSS-style hex color, e.g. `#ef4444`
    pub color: String,
    pub kind: TransactionKind,
}

impl Category {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        icon: impl Into<String>,
        color: impl Into<String>,
        kind: TransactionKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
            color: color.into(),
            kind,
        }
    }
}

const EXPENSE_DEFAULTS: &[(&str, &str, &str, &str)] = &[
    ("food", "Food", "🍔", "#ef4444"),
    ("transport", "Transport", "🚌", "#f97316"),
    ("home", "Home", "🏠", "#8b5cf6"),
    ("entertainment", "Entertainment", "🎬", "#ec4899"),
    ("health", "Health", "💊", "#14b8a6"),
    ("other_expense", "Other", "📦", "#64748b"),
];

const INCOME_DEFAULTS: &[(&str, &str, &str, &str)] = &[
    ("salary", "Salary", "💰", "#22c55e"),
    ("freelance", "Freelance", "💻", "#3b82f6"),
    ("investment", "Investment", "📈", "#eab308"),
    ("other_income", "Other", "💎", "#64748b"),
];

/// Built-in categories for `kind`.
pub fn default_categories(kind: TransactionKind) -> Vec<Category> {
    let table = match kind {
        TransactionKind::Expense => EXPENSE_DEFAULTS,
        TransactionKind::Income => INCOME_DEFAULTS,
    };
    table
        .iter()
        .map(|(id, name, icon, color)| Category::new(*id, *name, *icon, *color, kind))
        .collect()
}

/// Built-in categories followed by the custom ones of the same kind.
pub fn categories_for(kind: TransactionKind, custom: &[Category]) -> Vec<Category> {
    let mut all = default_categories(kind);
    all.extend(custom.iter().filter(|c| c.kind == kind).cloned());
    all
}

fn positive_amount(amount: f64) -> Result<f64, RecordError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(RecordError::InvalidAmount(amount))
    }
}
