use crate::db::storage::Storage;
use crate::error::Result;
use crate::models::transaction::{Transaction, TransactionDraft};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

pub const STORAGE_KEY: &str = "money-tracker-data";

/// Owns the transaction list (newest first) and writes the whole list back
/// to its storage after every mutation.
pub struct TransactionStore<S: Storage> {
    storage: S,
    transactions: Vec<Transaction>,
}

impl<S: Storage> TransactionStore<S> {
    /// Never fails: a missing, unreadable or corrupt value starts an empty
    /// ledger.
    pub fn load(storage: S) -> Self {
        let transactions = match storage.read(STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Transaction>>(&raw) {
                Ok(list) => {
                    log::info!("Loaded {} transactions", list.len());
                    drop_duplicate_ids(list)
                }
                Err(e) => {
                    log::warn!("Discarding unreadable stored transactions: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => {
                log::info!("No stored transactions, starting empty");
                Vec::new()
            }
            Err(e) => {
                log::warn!("Failed to read stored transactions: {}", e);
                Vec::new()
            }
        };

        Self {
            storage,
            transactions,
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn find(&self, id: u64) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn add(&mut self, draft: TransactionDraft) -> Result<&[Transaction]> {
        self.add_at(draft, Utc::now())
    }

    pub fn add_at(&mut self, draft: TransactionDraft, now: DateTime<Utc>) -> Result<&[Transaction]> {
        self.add_all_at(vec![draft], now)
    }

    /// Adds every draft in order (the last one ends up newest) and saves
    /// once. If the save fails none of them are kept.
    pub fn add_all(&mut self, drafts: Vec<TransactionDraft>) -> Result<&[Transaction]> {
        self.add_all_at(drafts, Utc::now())
    }

    pub fn add_all_at(&mut self, drafts: Vec<TransactionDraft>, now: DateTime<Utc>) -> Result<&[Transaction]> {
        let count = drafts.len();
        let mut added: Vec<Transaction> = Vec::with_capacity(count + self.transactions.len());
        for draft in drafts {
            let id = self.next_id_among(now, &added);
            added.push(Transaction::from_draft(id, now, draft));
        }
        added.reverse();

        let previous = std::mem::take(&mut self.transactions);
        added.extend(previous.iter().cloned());
        self.transactions = added;

        if let Err(e) = self.persist() {
            self.transactions = previous;
            return Err(e);
        }
        log::debug!("Added {} transactions", count);
        Ok(&self.transactions)
    }

    /// Removing an id that is not present leaves the list as it was.
    pub fn remove(&mut self, id: u64) -> Result<&[Transaction]> {
        let previous = self.transactions.clone();
        self.transactions.retain(|t| t.id != id);

        if let Err(e) = self.persist() {
            self.transactions = previous;
            return Err(e);
        }
        if self.transactions.len() == previous.len() {
            log::debug!("Transaction {} not found, nothing removed", id);
        } else {
            log::debug!("Removed transaction {}", id);
        }
        Ok(&self.transactions)
    }

    #[cfg(test)]
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn persist(&mut self) -> Result<()> {
        let raw = serde_json::to_string(&self.transactions)?;
        self.storage.write(STORAGE_KEY, &raw)
    }

    // Millisecond timestamp, bumped past the largest id already in use.
    // `pending` holds records stamped in the same batch but not stored yet.
    fn next_id_among(&self, now: DateTime<Utc>, pending: &[Transaction]) -> u64 {
        let candidate = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let in_use = || self.transactions.iter().chain(pending).map(|t| t.id);
        match in_use().max() {
            Some(max) if candidate <= max => max
                .checked_add(1)
                .unwrap_or_else(|| {
                    let taken: HashSet<u64> = in_use().collect();
                    (0..).find(|id| !taken.contains(id)).unwrap_or(0)
                }),
            _ => candidate,
        }
    }
}

fn drop_duplicate_ids(list: Vec<Transaction>) -> Vec<Transaction> {
    let mut seen = HashSet::with_capacity(list.len());
    let total = list.len();
    let unique: Vec<Transaction> = list.into_iter().filter(|t| seen.insert(t.id)).collect();
    if unique.len() < total {
        log::warn!(
            "Dropped {} stored transactions with duplicate ids",
            total - unique.len()
        );
    }
    unique
}
