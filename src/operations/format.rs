use crate::models::transaction::{Transaction, TransactionType};
use rust_decimal::{Decimal, RoundingStrategy};

/// Two decimals with comma thousands separators, e.g. `12,345.60`.
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    let text = rounded.to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < Decimal::ZERO && !rounded.is_zero() { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}

pub fn signed_amount(transaction: &Transaction) -> String {
    let sign = match transaction.transaction_type {
        TransactionType::Income => '+',
        TransactionType::Expense => '-',
    };
    format!("{}{}", sign, format_amount(transaction.amount))
}
