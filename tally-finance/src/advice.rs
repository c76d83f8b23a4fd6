//! AI advice: prompt construction and the fallback contract around an
//! external text generator.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use tally_core::{DayOfMonth, Debt, DebtKind, Transaction, TransactionKind};

/// Only the most recent transactions are sent, to keep the prompt small.
pub const MAX_PROMPT_TRANSACTIONS: usize = 20;

pub const NO_PROVIDER_MESSAGE: &str = "Configure your API key to receive personalized AI advice.";
pub const EMPTY_RESPONSE_MESSAGE: &str = "I couldn't generate advice right now.";
pub const CONNECTION_ERROR_MESSAGE: &str =
    "There was an error connecting to the financial advisor.";

/// Anything that turns a prompt into free text.
#[async_trait]
pub trait AdviceSource: Send + Sync {
    async fn advise(&self, prompt: &str) -> Result<String>;
}

#[derive(Serialize)]
struct TxnSummary<'a> {
    #[serde(rename = "type")]
    kind: TransactionKind,
    amount: f64,
    category: &'a str,
    date: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DebtSummary<'a> {
    #[serde(rename = "type")]
    kind: DebtKind,
    amount: f64,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<String>,
    is_credit_card: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    cutoff_day: Option<DayOfMonth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_day: Option<DayOfMonth>,
}

/// Build the advisor prompt from the newest transactions and every debt.
pub fn build_advice_prompt(today: DayOfMonth, txns: &[Transaction], debts: &[Debt]) -> String {
    let txn_summary: Vec<TxnSummary<'_>> = txns
        .iter()
        .take(MAX_PROMPT_TRANSACTIONS)
        .map(|t| TxnSummary {
            kind: t.kind,
            amount: t.amount,
            category: &t.category,
            date: t.date.to_string(),
        })
        .collect();

    let debt_summary: Vec<DebtSummary<'_>> = debts
        .iter()
        .map(|d| DebtSummary {
            kind: d.kind,
            amount: d.amount,
            title: &d.title,
            due_date: d.due_date.map(|dt| dt.to_string()),
            is_credit_card: d.is_credit_card(),
            cutoff_day: d.card_cycle().map(|c| c.cutoff_day),
            payment_day: d.card_cycle().map(|c| c.payment_day),
        })
        .collect();

    // Plain structs of strings and numbers; serialization cannot fail.
    let txn_json = serde_json::to_string(&txn_summary).unwrap_or_else(|_| "[]".to_string());
    let debt_json = serde_json::to_string(&debt_summary).unwrap_or_else(|_| "[]".to_string());

    format!(
        "Act as an expert, concise financial advisor. Today is day {today} of the month.\n\
         \n\
         Here are my recent transactions (JSON): {txn_json}.\n\
         \n\
         Here is my current debt status (JSON): {debt_json}.\n\
         If you see 'isCreditCard': true, pay attention to 'cutoffDay' (statement cutoff) \
         and 'paymentDay' (payment due).\n\
         \n\
         Analyze my overall situation and give me brief (max 3 sentences), actionable advice.\n\
         \n\
         KEY RULES:\n\
         1. If I have credit cards, suggest which one to use today based on the cutoff date \
         (strategy: buying right after cutoff gives the most financing days).\n\
         2. If any payment date is close (next 5 days), warn me with priority.\n\
         3. If I have no urgent debts, suggest saving.\n\
         \n\
         Speak to me directly and use financial emojis."
    )
}

/// Ask `source` for advice. Never fails: a missing source, a transport
/// error or an empty answer each map to a fixed user-facing message.
pub async fn financial_advice<S: AdviceSource + ?Sized>(
    source: Option<&S>,
    today: DayOfMonth,
    txns: &[Transaction],
    debts: &[Debt],
) -> String {
    let Some(source) = source else {
        return NO_PROVIDER_MESSAGE.to_string();
    };

    let prompt = build_advice_prompt(today, txns, debts);
    match source.advise(&prompt).await {
        Ok(text) if text.trim().is_empty() => EMPTY_RESPONSE_MESSAGE.to_string(),
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            log::error!("advice request failed: {e:#}");
            CONNECTION_ERROR_MESSAGE.to_string()
        }
    }
}
