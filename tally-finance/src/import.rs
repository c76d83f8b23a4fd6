//! Bulk-import transactions from CSV.
//!
//! Expected header: `date,type,amount,category,note`
//! - date: YYYY-MM-DD
//! - type: income | expense
//! - amount: positive number (a leading `$` and thousands commas are accepted)

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tally_core::{Transaction, TransactionKind};

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    #[serde(rename = "type")]
    kind: String,
    amount: String,
    category: String,
    #[serde(default)]
    note: Option<String>,
}

/// Parse a CSV file. Rows that fail validation are skipped with a warning.
pub fn import_transactions_csv(
    path: impl AsRef<Path>,
    id_prefix: &str,
) -> Result<Vec<Transaction>> {
    let file = std::fs::File::open(path.as_ref())
        .with_context(|| format!("opening {}", path.as_ref().display()))?;
    parse_transactions_csv(file, id_prefix)
}

pub fn parse_transactions_csv<R: Read>(reader: R, id_prefix: &str) -> Result<Vec<Transaction>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut txns = Vec::new();
    for (i, result) in rdr.deserialize::<CsvRow>().enumerate() {
        // +2: 1-based, after the header row
        let line = i + 2;
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                log::warn!("skipping CSV line {line}: {e}");
                continue;
            }
        };
        match row_to_transaction(row, format!("{id_prefix}-{i:04}")) {
            Ok(t) => txns.push(t),
            Err(e) => log::warn!("skipping CSV line {line}: {e:#}"),
        }
    }

    log::info!("imported {} transactions", txns.len());
    Ok(txns)
}

fn row_to_transaction(row: CsvRow, id: String) -> Result<Transaction> {
    let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{}'", row.date))?;
    let kind: TransactionKind = row.kind.parse()?;
    let amount: f64 = row
        .amount
        .replace(['$', ','], "")
        .parse()
        .with_context(|| format!("invalid amount '{}'", row.amount))?;

    let txn = Transaction::new(id, kind, amount, row.category, date)?;
    Ok(match row.note {
        Some(note) => txn.with_note(note),
        None => txn,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rows_and_skip_bad_ones() {
        let csv = "date,type,amount,category,note\n\
                   2026-03-01,income,\"$2,500.00\",salary,March pay\n\
                   2026-03-02,expense,45.10,food,\n\
                   03/04/2026,expense,10,food,bad date\n\
                   2026-03-05,refund,10,food,bad type\n\
                   2026-03-06,expense,-3,food,negative\n";
        let txns = parse_transactions_csv(csv.as_bytes(), "imp").unwrap();

        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].id, "imp-0000");
        assert_eq!(txns[0].amount, 2500.0);
        assert_eq!(txns[0].note.as_deref(), Some("March pay"));
        assert!(txns[1].is_expense());
        assert_eq!(txns[1].note, None);
    }
}
