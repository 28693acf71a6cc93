use crate::error::{Result, TrackerError};
use crate::models::category::{categories_for, default_category, find_category};
use crate::models::transaction::{TransactionDraft, TransactionType};
use rust_decimal::Decimal;
use std::str::FromStr;

const MAX_DESCRIPTION_LEN: usize = 255;
// 1e15, far below the point where summing a ledger could overflow Decimal
const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

pub fn parse_transaction_type(input: &str) -> Result<TransactionType> {
    match input.trim().to_lowercase().as_str() {
        "income" => Ok(TransactionType::Income),
        "expense" => Ok(TransactionType::Expense),
        _ => Err(TrackerError::validation(
            "Invalid transaction type. Use 'income' or 'expense'.",
        )),
    }
}

/// Validates raw form input. Nothing reaches the store unless this passes.
pub fn create_draft(
    description: &str,
    amount: &str,
    transaction_type: TransactionType,
    category: Option<&str>,
) -> Result<TransactionDraft> {
    let description = description.trim();
    if description.is_empty() {
        return Err(TrackerError::validation("Description cannot be empty"));
    }
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(TrackerError::validation("Description too long"));
    }

    let amount = amount.trim();
    if amount.is_empty() {
        return Err(TrackerError::validation("Amount cannot be empty"));
    }
    let amount = Decimal::from_str(amount).map_err(|_| {
        TrackerError::validation(format!(
            "Invalid amount format {}. Please provide a valid decimal number.",
            amount
        ))
    })?;
    if amount <= Decimal::ZERO {
        return Err(TrackerError::validation("Amount must be greater than zero"));
    }
    if amount > MAX_AMOUNT {
        return Err(TrackerError::validation(format!(
            "Amount too large. The maximum is {}",
            MAX_AMOUNT
        )));
    }

    let category = match category.map(str::trim).filter(|c| !c.is_empty()) {
        Some(id) => {
            let found = find_category(transaction_type, &id.to_lowercase()).ok_or_else(|| {
                let known: Vec<&str> = categories_for(transaction_type).iter().map(|c| c.id).collect();
                TrackerError::validation(format!(
                    "Unknown {} category '{}'. Known: {}",
                    transaction_type,
                    id,
                    known.join(", ")
                ))
            })?;
            found.id
        }
        None => default_category(transaction_type).id,
    };

    Ok(TransactionDraft {
        description: description.to_string(),
        amount,
        transaction_type,
        category: Some(category.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_rejected(result: Result<TransactionDraft>, needle: &str) {
        match result {
            Err(TrackerError::Validation(message)) => assert!(
                message.contains(needle),
                "expected '{}' in '{}'",
                needle,
                message
            ),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_create_draft_success() {
        let draft = create_draft("  Lunch ", "120.50", TransactionType::Expense, Some("food")).unwrap();
        assert_eq!(draft.description, "Lunch");
        assert_eq!(draft.amount, Decimal::new(12050, 2));
        assert_eq!(draft.category.as_deref(), Some("food"));
    }

    #[test]
    fn test_create_draft_defaults_category_by_type() {
        let expense = create_draft("Bus", "20", TransactionType::Expense, None).unwrap();
        assert_eq!(expense.category.as_deref(), Some("food"));

        let income = create_draft("Pay", "2000", TransactionType::Income, Some("  ")).unwrap();
        assert_eq!(income.category.as_deref(), Some("salary"));
    }

    #[test]
    fn test_create_draft_rejects_empty_fields() {
        assert_rejected(create_draft("", "10", TransactionType::Expense, None), "Description");
        assert_rejected(create_draft("Snack", "  ", TransactionType::Expense, None), "Amount");
    }

    #[test]
    fn test_create_draft_rejects_non_numeric_amount() {
        assert_rejected(create_draft("Snack", "ten", TransactionType::Expense, None), "Invalid amount");
    }

    #[test]
    fn test_create_draft_rejects_non_positive_amount() {
        assert_rejected(create_draft("Snack", "0", TransactionType::Expense, None), "greater than zero");
        assert_rejected(create_draft("Snack", "-5", TransactionType::Expense, None), "greater than zero");
    }

    #[test]
    fn test_create_draft_rejects_oversized_amount() {
        assert_rejected(
            create_draft("Big", "1000000000000000000000000000", TransactionType::Expense, None),
            "too large",
        );
        assert_rejected(create_draft("Big", "1000000000000000.01", TransactionType::Income, None), "too large");

        let limit = create_draft("Lottery", "1000000000000000", TransactionType::Income, None).unwrap();
        assert_eq!(limit.amount, MAX_AMOUNT);
    }

    #[test]
    fn test_create_draft_rejects_category_of_other_type() {
        assert_rejected(
            create_draft("Pay", "10", TransactionType::Expense, Some("salary")),
            "Unknown expense category",
        );
    }

    #[test]
    fn test_create_draft_rejects_long_description() {
        let long = "x".repeat(256);
        assert_rejected(create_draft(&long, "1", TransactionType::Expense, None), "too long");
    }

    #[test]
    fn test_parse_transaction_type() {
        assert_eq!(parse_transaction_type("Income").unwrap(), TransactionType::Income);
        assert_eq!(parse_transaction_type(" expense ").unwrap(), TransactionType::Expense);
        assert!(parse_transaction_type("transfer").is_err());
    }
}
