//! Per-user transactions, debts and custom categories.
//!
//! Keys are namespaced `<base>_<user_id>`; with nobody logged in the bare
//! base key is used. Every mutation is persisted before it returns.
//! Reads for display tolerate corrupt data; mutations refuse to touch it.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tally_core::{Category, Debt, Transaction};

use crate::store::{KeyValueStore, read_json, try_read_json, write_json};

const BASE_KEY_TRANSACTIONS: &str = "tally_transactions";
const BASE_KEY_DEBTS: &str = "tally_debts";
const BASE_KEY_CATEGORIES: &str = "tally_categories";

pub struct Ledger<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
    user_id: Option<String>,
}

impl<'a, S: KeyValueStore + ?Sized> Ledger<'a, S> {
    pub fn new(store: &'a S, user_id: Option<String>) -> Self {
        Self { store, user_id }
    }

    fn key(&self, base: &str) -> String {
        match &self.user_id {
            Some(id) => format!("{base}_{id}"),
            None => base.to_string(),
        }
    }

    /// Current list for a read-modify-write. Fails instead of starting over
    /// from an empty list when the stored one can't be read.
    fn load_for_update<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        let all = try_read_json(self.store, key)
            .with_context(|| format!("refusing to modify {key}; fix or remove it first"))?;
        Ok(all.unwrap_or_default())
    }

    /// Newest first.
    pub fn transactions(&self) -> Vec<Transaction> {
        read_json(self.store, &self.key(BASE_KEY_TRANSACTIONS))
    }

    pub fn add_transaction(&self, txn: Transaction) -> Result<Vec<Transaction>> {
        let key = self.key(BASE_KEY_TRANSACTIONS);
        let mut all = self.load_for_update(&key)?;
        all.insert(0, txn);
        write_json(self.store, &key, &all)?;
        Ok(all)
    }

    /// Prepend a batch, keeping the batch's own order.
    pub fn add_transactions(&self, batch: Vec<Transaction>) -> Result<Vec<Transaction>> {
        let key = self.key(BASE_KEY_TRANSACTIONS);
        let existing: Vec<Transaction> = self.load_for_update(&key)?;
        let mut all = batch;
        all.extend(existing);
        write_json(self.store, &key, &all)?;
        Ok(all)
    }

    /// Remove by id. Returns whether anything was removed.
    pub fn delete_transaction(&self, id: &str) -> Result<bool> {
        let key = self.key(BASE_KEY_TRANSACTIONS);
        let mut all: Vec<Transaction> = self.load_for_update(&key)?;
        let before = all.len();
        all.retain(|t| t.id != id);
        write_json(self.store, &key, &all)?;
        Ok(all.len() != before)
    }

    pub fn debts(&self) -> Vec<Debt> {
        read_json(self.store, &self.key(BASE_KEY_DEBTS))
    }

    pub fn add_debt(&self, debt: Debt) -> Result<Vec<Debt>> {
        let key = self.key(BASE_KEY_DEBTS);
        let mut all = self.load_for_update(&key)?;
        all.insert(0, debt);
        write_json(self.store, &key, &all)?;
        Ok(all)
    }

    pub fn delete_debt(&self, id: &str) -> Result<bool> {
        let key = self.key(BASE_KEY_DEBTS);
        let mut all: Vec<Debt> = self.load_for_update(&key)?;
        let before = all.len();
        all.retain(|d| d.id != id);
        write_json(self.store, &key, &all)?;
        Ok(all.len() != before)
    }

    pub fn custom_categories(&self) -> Vec<Category> {
        read_json(self.store, &self.key(BASE_KEY_CATEGORIES))
    }

    pub fn add_custom_category(&self, category: Category) -> Result<Vec<Category>> {
        let key = self.key(BASE_KEY_CATEGORIES);
        let mut all = self.load_for_update(&key)?;
        all.push(category);
        write_json(self.store, &key, &all)?;
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, MemoryStore};
    use chrono::NaiveDate;
    use tally_core::{CreditCardCycle, DebtKind, TransactionKind};

    fn txn(id: &str) -> Transaction {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        Transaction::new(id, TransactionKind::Expense, 10.0, "food", date).unwrap()
    }

    #[test]
    fn transactions_are_newest_first_and_deletable() {
        let store = MemoryStore::default();
        let ledger = Ledger::new(&store, Some("user_1".to_string()));

        ledger.add_transaction(txn("a")).unwrap();
        ledger.add_transaction(txn("b")).unwrap();
        let ids: Vec<String> = ledger.transactions().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["b", "a"]);

        assert!(ledger.delete_transaction("a").unwrap());
        assert!(!ledger.delete_transaction("missing").unwrap());
        assert_eq!(ledger.transactions().len(), 1);
    }

    #[test]
    fn batch_import_goes_in_front() {
        let store = MemoryStore::default();
        let ledger = Ledger::new(&store, None);
        ledger.add_transaction(txn("old")).unwrap();
        let all = ledger.add_transactions(vec![txn("n1"), txn("n2")]).unwrap();
        let ids: Vec<&str> = all.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["n1", "n2", "old"]);
    }

    #[test]
    fn users_do_not_see_each_other() {
        let store = MemoryStore::default();
        let ana = Ledger::new(&store, Some("user_ana".to_string()));
        let ben = Ledger::new(&store, Some("user_ben".to_string()));
        let anon = Ledger::new(&store, None);

        ana.add_transaction(txn("a1")).unwrap();
        assert!(ben.transactions().is_empty());
        assert!(anon.transactions().is_empty());
        assert!(store.get("tally_transactions_user_ana").unwrap().is_some());
    }

    #[test]
    fn debts_round_trip_with_card_cycle() {
        let store = MemoryStore::default();
        let ledger = Ledger::new(&store, Some("u".to_string()));
        let card = Debt::new("d1", DebtKind::Payable, "Visa", 900.0)
            .unwrap()
            .with_card(CreditCardCycle::new(5, 20).unwrap())
            .unwrap();
        ledger.add_debt(card.clone()).unwrap();
        assert_eq!(ledger.debts(), vec![card]);
        assert!(ledger.delete_debt("d1").unwrap());
        assert!(ledger.debts().is_empty());
    }

    #[test]
    fn custom_categories_append() {
        let store = MemoryStore::default();
        let ledger = Ledger::new(&store, Some("u".to_string()));
        let pets = Category::new("custom_1", "Pets", "🐶", "#000000", TransactionKind::Expense);
        ledger.add_custom_category(pets.clone()).unwrap();
        assert_eq!(ledger.custom_categories(), vec![pets]);
    }

    #[test]
    fn corrupt_ledger_is_left_untouched_by_mutations() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let ledger = Ledger::new(&store, Some("u".to_string()));
        let path = dir.path().join("tally_transactions_u.json");
        let seeded = r#"[{"id":"1","amount":"2500","category":"salary","kind":"income","date":"2026-03-01"}]"#;
        std::fs::write(&path, seeded).unwrap();

        let err = ledger.add_transaction(txn("2")).unwrap_err();
        assert!(format!("{err:#}").contains("tally_transactions_u"));
        assert!(ledger.delete_transaction("1").is_err());
        assert!(ledger.add_transactions(vec![txn("3")]).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), seeded);

        // Display reads still degrade to empty.
        assert!(ledger.transactions().is_empty());
    }

    #[test]
    fn corrupt_debts_and_categories_reject_changes() {
        let store = MemoryStore::default();
        let ledger = Ledger::new(&store, None);
        store.set("tally_debts", "{oops").unwrap();
        store.set("tally_categories", "[1,2]").unwrap();

        let debt = Debt::new("d1", DebtKind::Payable, "Loan", 10.0).unwrap();
        assert!(ledger.add_debt(debt).is_err());
        assert!(ledger.delete_debt("d1").is_err());
        let pets = Category::new("c", "Pets", "🐶", "#000000", TransactionKind::Expense);
        assert!(ledger.add_custom_category(pets).is_err());

        assert_eq!(store.get("tally_debts").unwrap().as_deref(), Some("{oops"));
        assert_eq!(store.get("tally_categories").unwrap().as_deref(), Some("[1,2]"));
    }
}
