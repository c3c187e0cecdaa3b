//! Budgets, expenses and the dashboard figures derived from them.

mod summary;

pub use summary::{BudgetExpenses, BudgetStats, ChartSlice, FinancialSummary};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Monthly spending envelope for one category.
#[derive(ToSchema, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    #[serde(deserialize_with = "crate::ids::string_or_number")]
    pub id: String,
    pub category: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    pub monthly_budget: f64,
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Writable fields of a [`Budget`], as sent on create and update.
#[derive(ToSchema, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetDraft {
    pub category: String,
    pub name: String,
    pub icon: String,
    pub monthly_budget: f64,
    pub color: String,
}

#[derive(ToSchema, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(deserialize_with = "crate::ids::string_or_number")]
    pub id: String,
    // older payloads call the owning budget a category
    #[serde(alias = "categoryId", deserialize_with = "crate::ids::string_or_number")]
    pub budget_id: String,
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(ToSchema, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDraft {
    pub budget_id: String,
    pub name: String,
    pub amount: f64,
    pub description: String,
    pub color: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn budget_accepts_numeric_ids() -> Result<(), serde_json::Error> {
        let budget: Budget = serde_json::from_value(json!({
            "id": 3,
            "category": "Home",
            "name": "Rent",
            "icon": "home",
            "monthlyBudget": 1200.0,
            "color": "#22c55e"
        }))?;
        assert_eq!(budget.id, "3");
        assert_eq!(budget.created_at, None);
        Ok(())
    }

    #[test]
    fn expense_reads_legacy_category_id() -> Result<(), serde_json::Error> {
        let expense: Expense = serde_json::from_value(json!({
            "id": "e-1",
            "categoryId": 3,
            "name": "March rent",
            "amount": 1100.5
        }))?;
        assert_eq!(expense.budget_id, "3");
        assert_eq!(expense.description, "");

        let value = serde_json::to_value(&expense)?;
        assert_eq!(value.get("budgetId"), Some(&json!("3")));
        assert!(value.get("createdAt").is_none());
        Ok(())
    }
}
