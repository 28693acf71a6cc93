use super::transaction::TransactionType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

pub const EXPENSE_CATEGORIES: &[Category] = &[
    Category { id: "food", label: "Food", icon: "☕", color: "orange" },
    Category { id: "transport", label: "Transport", icon: "🚗", color: "blue" },
    Category { id: "shopping", label: "Shopping", icon: "🛍", color: "pink" },
    Category { id: "utilities", label: "Bills & Utilities", icon: "⚡", color: "yellow" },
    Category { id: "health", label: "Health", icon: "♥", color: "emerald" },
    Category { id: "other", label: "Other", icon: "…", color: "slate" },
];

pub const INCOME_CATEGORIES: &[Category] = &[
    Category { id: "salary", label: "Salary", icon: "$", color: "green" },
    Category { id: "bonus", label: "Bonus", icon: "✦", color: "purple" },
    Category { id: "other_income", label: "Other Income", icon: "…", color: "slate" },
];

pub fn categories_for(transaction_type: TransactionType) -> &'static [Category] {
    match transaction_type {
        TransactionType::Income => INCOME_CATEGORIES,
        TransactionType::Expense => EXPENSE_CATEGORIES,
    }
}

/// Category picked for new records when the caller names none.
pub fn default_category(transaction_type: TransactionType) -> &'static Category {
    &categories_for(transaction_type)[0]
}

/// Last entry of each list catches unset and unknown ids.
pub fn fallback_category(transaction_type: TransactionType) -> &'static Category {
    let list = categories_for(transaction_type);
    &list[list.len() - 1]
}

pub fn find_category(transaction_type: TransactionType, id: &str) -> Option<&'static Category> {
    categories_for(transaction_type).iter().find(|c| c.id == id)
}

pub fn resolve_category(transaction_type: TransactionType, id: Option<&str>) -> &'static Category {
    id.and_then(|id| find_category(transaction_type, id))
        .unwrap_or_else(|| fallback_category(transaction_type))
}
