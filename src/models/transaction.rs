use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::{Category, resolve_category};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredTransaction")]
pub struct Transaction {
    pub id: u64,
    pub description: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub date: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        id: u64,
        date: DateTime<Utc>,
        description: String,
        amount: Decimal,
        transaction_type: TransactionType,
        category: Option<String>,
    ) -> Self {
        Self {
            id,
            date,
            description,
            amount,
            transaction_type,
            category,
        }
    }

    pub fn from_draft(id: u64, date: DateTime<Utc>, draft: TransactionDraft) -> Self {
        Self::new(
            id,
            date,
            draft.description,
            draft.amount,
            draft.transaction_type,
            draft.category,
        )
    }

    pub fn category_info(&self) -> &'static Category {
        resolve_category(self.transaction_type, self.category.as_deref())
    }
}

/// Validated input for a transaction that has not been stamped with an id
/// and creation date yet.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub description: String,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub category: Option<String>,
}

// Shape accepted when reading persisted state. Older data names the
// description `text`, has no category, and stores dates as display strings.
#[derive(Deserialize)]
struct StoredTransaction {
    id: u64,
    #[serde(alias = "text")]
    description: String,
    amount: Decimal,
    #[serde(rename = "type")]
    transaction_type: TransactionType,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    date: Option<StoredDate>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredDate {
    Millis(i64),
    Text(String),
}

impl From<StoredTransaction> for Transaction {
    fn from(stored: StoredTransaction) -> Self {
        let date = stored
            .date
            .and_then(parse_stored_date)
            .or_else(|| i64::try_from(stored.id).ok().and_then(DateTime::from_timestamp_millis))
            .unwrap_or_default();

        Transaction {
            id: stored.id,
            description: stored.description,
            amount: stored.amount,
            transaction_type: stored.transaction_type,
            category: stored.category,
            date,
        }
    }
}

fn parse_stored_date(date: StoredDate) -> Option<DateTime<Utc>> {
    match date {
        StoredDate::Millis(ms) => DateTime::from_timestamp_millis(ms),
        StoredDate::Text(text) => {
            if let Ok(parsed) = DateTime::parse_from_rfc3339(&text) {
                return Some(parsed.with_timezone(&Utc));
            }
            NaiveDate::parse_from_str(&text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|d| d.and_utc())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_serializes_type_and_skips_missing_category() {
        let date = Utc.with_ymd_and_hms(2025, 11, 9, 8, 30, 0).unwrap();
        let tx = Transaction::new(
            1,
            date,
            "Lunch".to_string(),
            Decimal::new(12050, 2),
            TransactionType::Expense,
            None,
        );

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "expense");
        assert_eq!(json["description"], "Lunch");
        assert!(json.get("category").is_none());
        assert_eq!(json["date"], "2025-11-09T08:30:00Z");
    }

    #[test]
    fn test_reads_legacy_text_record() {
        let json = r#"{"id":1731139200000,"text":"Coffee","amount":45,"type":"expense","date":"9/11/2567"}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();

        assert_eq!(tx.description, "Coffee");
        assert_eq!(tx.amount, Decimal::from(45));
        assert_eq!(tx.category, None);
        // unreadable display date falls back to the creation-timestamp id
        assert_eq!(tx.date, DateTime::from_timestamp_millis(1731139200000).unwrap());
        assert_eq!(tx.category_info().id, "other");
    }

    #[test]
    fn test_reads_plain_date_and_string_amount() {
        let json = r#"{"id":7,"description":"Salary","amount":"1500.00","type":"income","category":"salary","date":"2025-01-15"}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();

        assert_eq!(tx.amount, Decimal::new(150000, 2));
        assert_eq!(tx.transaction_type, TransactionType::Income);
        assert_eq!(tx.date, Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap());
        assert_eq!(tx.category_info().label, "Salary");
    }

    #[test]
    fn test_rejects_unknown_type() {
        let json = r#"{"id":7,"description":"x","amount":1,"type":"transfer"}"#;
        assert!(serde_json::from_str::<Transaction>(json).is_err());
    }
}
