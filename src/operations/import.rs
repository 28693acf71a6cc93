use super::add::{create_draft, parse_transaction_type};
use crate::db::storage::Storage;
use crate::db::store::TransactionStore;
use crate::error::{Result, TrackerError};
use crate::models::transaction::TransactionDraft;
use std::fs::File;
use std::path::Path;

/// Imports `description,amount,type[,category]` rows. Every row is
/// validated first and the batch is saved in one write, so a bad line or a
/// failed save leaves the store untouched.
pub fn import_csv_to_store<S: Storage>(store: &mut TransactionStore<S>, path: &Path) -> Result<usize> {
    let drafts = read_csv(path)?;
    let count = drafts.len();
    store.add_all(drafts)?;
    log::info!("Imported {} transactions from {}", count, path.display());
    Ok(count)
}

fn read_csv(path: &Path) -> Result<Vec<TransactionDraft>> {
    let file = File::open(path).map_err(|e| {
        TrackerError::validation(format!("Failed to open file '{}': {}", path.display(), e))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut drafts = Vec::new();

    for (line_index, result) in reader.records().enumerate() {
        let line = line_index + 1;
        let record = result?;

        if record.len() != 3 && record.len() != 4 {
            return Err(TrackerError::validation(format!(
                "Invalid number of columns on line {}: expected 3 or 4, got {}",
                line,
                record.len()
            )));
        }

        let description = record.get(0).unwrap_or("");
        let amount = record.get(1).unwrap_or("");
        let category = record.get(3);

        let draft = parse_transaction_type(record.get(2).unwrap_or(""))
            .and_then(|transaction_type| create_draft(description, amount, transaction_type, category))
            .map_err(|e| TrackerError::validation(format!("Line {}: {}", line, e)))?;

        drafts.push(draft);
    }

    Ok(drafts)
}
