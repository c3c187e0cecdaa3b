use super::{Budget, Expense};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStats {
    #[serde(flatten)]
    pub budget: Budget,
    pub spent: f64,
    pub remaining: f64,
    pub percentage_used: f64,
}

#[derive(ToSchema, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetExpenses {
    pub budget: Budget,
    pub expenses: Vec<Expense>,
}

/// One slice of the spending-by-budget chart.
#[derive(ToSchema, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSlice {
    pub name: String,
    pub value: f64,
    pub color: String,
    pub percentage: f64,
}

/// Everything the dashboard renders, computed from one snapshot of budgets
/// and expenses.
#[derive(ToSchema, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub budgets: Vec<Budget>,
    pub expenses: Vec<Expense>,
    pub total_budget: f64,
    pub total_spent: f64,
    pub total_remaining: f64,
    pub budget_stats: Vec<BudgetStats>,
    pub expenses_by_budget: Vec<BudgetExpenses>,
    pub chart: Vec<ChartSlice>,
}

impl FinancialSummary {
    /// Expenses pointing at an unknown budget count towards nothing and are
    /// left out of the grouping.
    #[must_use]
    pub fn compute(budgets: Vec<Budget>, expenses: Vec<Expense>) -> Self {
        let budget_stats: Vec<BudgetStats> = budgets
            .iter()
            .map(|budget| budget_stats(budget, &expenses))
            .collect();

        let total_budget: f64 = budgets.iter().map(|budget| budget.monthly_budget).sum();
        let total_spent: f64 = budget_stats.iter().map(|stats| stats.spent).sum();

        let expenses_by_budget = budgets
            .iter()
            .filter_map(|budget| {
                let owned: Vec<Expense> = expenses
                    .iter()
                    .filter(|expense| expense.budget_id == budget.id)
                    .cloned()
                    .collect();
                (!owned.is_empty()).then(|| BudgetExpenses {
                    budget: budget.clone(),
                    expenses: owned,
                })
            })
            .collect();

        let chart = budget_stats
            .iter()
            .map(|stats| ChartSlice {
                name: stats.budget.name.clone(),
                value: stats.spent,
                color: stats.budget.color.clone(),
                percentage: share_of(stats.spent, total_spent),
            })
            .collect();

        Self {
            budgets,
            expenses,
            total_budget,
            total_spent,
            total_remaining: total_budget - total_spent,
            budget_stats,
            expenses_by_budget,
            chart,
        }
    }
}

fn budget_stats(budget: &Budget, expenses: &[Expense]) -> BudgetStats {
    let spent: f64 = expenses
        .iter()
        .filter(|expense| expense.budget_id == budget.id)
        .map(|expense| expense.amount)
        .sum();
    let percentage_used = if budget.monthly_budget > 0.0 {
        spent / budget.monthly_budget * 100.0
    } else {
        0.0
    };
    BudgetStats {
        budget: budget.clone(),
        spent,
        remaining: budget.monthly_budget - spent,
        percentage_used,
    }
}

// whole-number percentage; 0 when nothing was spent at all
fn share_of(spent: f64, total: f64) -> f64 {
    if total > 0.0 {
        (spent / total * 100.0).round()
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(id: &str, name: &str, monthly: f64) -> Budget {
        Budget {
            id: id.to_string(),
            category: name.to_string(),
            name: name.to_string(),
            icon: "family".to_string(),
            monthly_budget: monthly,
            color: format!("#{id}{id}{id}"),
            created_at: None,
            updated_at: None,
        }
    }

    fn expense(id: &str, budget_id: &str, amount: f64) -> Expense {
        Expense {
            id: id.to_string(),
            budget_id: budget_id.to_string(),
            name: format!("expense {id}"),
            amount,
            description: String::new(),
            color: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn per_budget_stats_and_totals() {
        let summary = FinancialSummary::compute(
            vec![budget("1", "Food", 400.0), budget("2", "Rent", 1000.0)],
            vec![
                expense("a", "1", 100.0),
                expense("b", "1", 50.0),
                expense("c", "2", 1000.0),
            ],
        );

        let food = &summary.budget_stats[0];
        assert!((food.spent - 150.0).abs() < f64::EPSILON);
        assert!((food.remaining - 250.0).abs() < f64::EPSILON);
        assert!((food.percentage_used - 37.5).abs() < f64::EPSILON);

        let rent = &summary.budget_stats[1];
        assert!((rent.percentage_used - 100.0).abs() < f64::EPSILON);

        assert!((summary.total_budget - 1400.0).abs() < f64::EPSILON);
        assert!((summary.total_spent - 1150.0).abs() < f64::EPSILON);
        assert!((summary.total_remaining - 250.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_budget_reports_zero_percent() {
        let summary = FinancialSummary::compute(
            vec![budget("1", "Gifts", 0.0)],
            vec![expense("a", "1", 30.0)],
        );
        let stats = &summary.budget_stats[0];
        assert!((stats.percentage_used).abs() < f64::EPSILON);
        assert!((stats.remaining + 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn orphan_expenses_are_dropped_from_grouping() {
        let summary = FinancialSummary::compute(
            vec![budget("1", "Food", 400.0), budget("2", "Rent", 1000.0)],
            vec![expense("a", "1", 10.0), expense("z", "99", 500.0)],
        );
        assert_eq!(summary.expenses.len(), 2);
        assert_eq!(summary.expenses_by_budget.len(), 1);
        assert_eq!(summary.expenses_by_budget[0].budget.id, "1");
        assert_eq!(summary.expenses_by_budget[0].expenses.len(), 1);
        assert!((summary.total_spent - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn chart_percentages_are_rounded_shares() {
        let summary = FinancialSummary::compute(
            vec![
                budget("1", "Food", 100.0),
                budget("2", "Rent", 100.0),
                budget("3", "Fun", 100.0),
            ],
            vec![expense("a", "1", 1.0), expense("b", "2", 2.0)],
        );
        let shares: Vec<f64> = summary.chart.iter().map(|slice| slice.percentage).collect();
        assert_eq!(shares, vec![33.0, 67.0, 0.0]);
        assert_eq!(summary.chart[1].name, "Rent");
        assert!((summary.chart[1].value - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn nothing_spent_means_zero_shares() {
        let summary = FinancialSummary::compute(vec![budget("1", "Food", 100.0)], vec![]);
        assert!(summary.chart.iter().all(|slice| slice.percentage == 0.0));
        assert!(summary.expenses_by_budget.is_empty());
    }

    #[test]
    fn serializes_flattened_stats() -> Result<(), serde_json::Error> {
        let summary = FinancialSummary::compute(
            vec![budget("1", "Food", 200.0)],
            vec![expense("a", "1", 50.0)],
        );
        let value = serde_json::to_value(&summary)?;
        let stats = &value["budgetStats"][0];
        assert_eq!(stats["monthlyBudget"], 200.0);
        assert_eq!(stats["percentageUsed"], 25.0);
        assert_eq!(value["totalRemaining"], 150.0);
        Ok(())
    }
}
