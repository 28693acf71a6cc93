use crate::models::category::resolve_category;
use crate::models::transaction::{Transaction, TransactionType};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category_id: &'static str,
    pub total: Decimal,
    pub label: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSegment {
    pub category_id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub total: Decimal,
    /// Share of total expense, 0..=100.
    pub percent: f64,
    /// Sum of the percents of all preceding segments.
    pub offset: f64,
}

pub fn totals(transactions: &[Transaction]) -> Totals {
    // Saturating so stored amounts past the validation limit cannot panic here.
    let (income, expense) = transactions.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(income, expense), t| match t.transaction_type {
            TransactionType::Income => (income.saturating_add(t.amount), expense),
            TransactionType::Expense => (income, expense.saturating_add(t.amount)),
        },
    );

    Totals {
        income,
        expense,
        balance: income.saturating_sub(expense),
    }
}

/// Expense totals per category, largest first. Equal totals keep the order
/// in which their category first appears in `transactions`.
pub fn expense_by_category(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut groups: Vec<CategoryTotal> = Vec::new();

    for transaction in transactions
        .iter()
        .filter(|t| t.transaction_type == TransactionType::Expense)
    {
        let category = resolve_category(TransactionType::Expense, transaction.category.as_deref());
        match groups.iter_mut().find(|g| g.category_id == category.id) {
            Some(group) => group.total = group.total.saturating_add(transaction.amount),
            None => groups.push(CategoryTotal {
                category_id: category.id,
                total: transaction.amount,
                label: category.label,
                icon: category.icon,
                color: category.color,
            }),
        }
    }

    // sort_by is stable, which is what keeps the first-seen tie order
    groups.sort_by(|a, b| b.total.cmp(&a.total));
    groups
}

pub fn chart_segments(category_totals: &[CategoryTotal], total_expense: Decimal) -> Vec<ChartSegment> {
    if total_expense <= Decimal::ZERO {
        return Vec::new();
    }

    let mut cumulative = 0.0_f64;
    category_totals
        .iter()
        .map(|cat| {
            // divide first: total <= total_expense keeps the product in range
            let percent = cat
                .total
                .checked_div(total_expense)
                .and_then(|share| share.checked_mul(Decimal::ONE_HUNDRED))
                .and_then(|p| p.to_f64())
                .unwrap_or(0.0);
            let segment = ChartSegment {
                category_id: cat.category_id,
                label: cat.label,
                icon: cat.icon,
                color: cat.color,
                total: cat.total,
                percent,
                offset: cumulative,
            };
            cumulative += percent;
            segment
        })
        .collect()
}

pub fn top_expense_category(transactions: &[Transaction]) -> Option<CategoryTotal> {
    expense_by_category(transactions).into_iter().next()
}
