//! Consumer-side view of a repayment plan.
//!
//! The engine returns raw signed savings. This is the single place where they
//! are clamped and rounded for display, shared by the CLI, the bindings and
//! any document export.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::payoff::plan::PayoffResult;
use crate::payoff::{Budget, RoadmapEntry, Strategy};
use crate::types::*;

/// Milestones shown in a report; the rest are counted, not listed.
pub const MAX_MILESTONES: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affordability {
    pub income: Money,
    pub living_expenses: Money,
    pub committed_payments: Money,
    pub extra_payment: Money,
    pub surplus: Money,
    /// False only when income or living expenses were given and `surplus` is negative.
    pub affordable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoffReport {
    pub total_debt: Money,
    pub total_interest: Money,
    pub total_duration: Months,
    pub interest_saved: Money,
    pub months_saved: Months,
    pub reached_cap: bool,
    pub milestones: Vec<RoadmapEntry>,
    pub more_milestones: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
    pub affordability: Affordability,
}

/// One row of the strategy comparison table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyRow {
    pub strategy: Strategy,
    pub total_interest: Money,
    pub total_duration: Months,
    pub loans_closed: usize,
    pub reached_cap: bool,
    pub interest_saved: Money,
    pub months_saved: Months,
}

fn clamp_money(value: Money) -> Money {
    value.max(Decimal::ZERO).round_dp(2)
}

fn clamp_months(value: i64) -> Months {
    Months::try_from(value.max(0)).unwrap_or(Months::MAX)
}

/// Headline figures, first milestones and affordability for a plan.
pub fn build_report(result: &PayoffResult, budget: &Budget) -> PayoffReport {
    let milestones: Vec<RoadmapEntry> = result
        .roadmap
        .iter()
        .take(MAX_MILESTONES)
        .cloned()
        .collect();
    let more_milestones = result.roadmap.len().saturating_sub(MAX_MILESTONES);

    let headline = if result.reached_cap {
        Some(format!(
            "This debt is not payable with current inputs: loans remain open after {} months.",
            result.total_duration
        ))
    } else if result.roadmap.is_empty() {
        Some("No active loans found. You are debt free!".to_string())
    } else {
        None
    };

    let advice = result.suggestions.avalanche.as_ref().map(|focus| {
        format!(
            "Direct the extra payment of {} to {} ({}% p.a.) to hit these targets.",
            budget.effective_extra().round_dp(2),
            focus.name,
            focus.rate
        )
    });

    let committed = result.suggestions.stats.total_monthly_payment;
    let surplus = budget.monthly_surplus(committed);
    let shortfall = budget.shortfall(committed);

    PayoffReport {
        total_debt: result.suggestions.stats.total_debt,
        total_interest: result.total_interest.round_dp(2),
        total_duration: result.total_duration,
        interest_saved: clamp_money(result.interest_saved),
        months_saved: clamp_months(result.months_saved),
        reached_cap: result.reached_cap,
        milestones,
        more_milestones,
        headline,
        advice,
        affordability: Affordability {
            income: budget.income,
            living_expenses: budget.living_expenses,
            committed_payments: committed,
            extra_payment: budget.effective_extra(),
            surplus,
            affordable: shortfall.is_none(),
        },
    }
}

/// Baseline, avalanche and snowball side by side, savings clamped at zero.
pub fn compare_strategies(result: &PayoffResult) -> Vec<StrategyRow> {
    let baseline = &result.strategies.baseline;
    [Strategy::Baseline, Strategy::Avalanche, Strategy::Snowball]
        .into_iter()
        .map(|strategy| {
            let run = result.run(strategy);
            StrategyRow {
                strategy,
                total_interest: run.total_interest.round_dp(2),
                total_duration: run.total_duration,
                loans_closed: run.closures.len(),
                reached_cap: run.reached_cap,
                interest_saved: clamp_money(baseline.total_interest - run.total_interest),
                months_saved: clamp_months(
                    i64::from(baseline.total_duration) - i64::from(run.total_duration),
                ),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payoff::{simulate, Loan};
    use rust_decimal_macros::dec;

    #[test]
    fn test_debt_free_headline() {
        let r = simulate(&[], dec!(1000), Decimal::ZERO, Decimal::ZERO);
        let report = build_report(&r, &Budget::new(dec!(1000), Decimal::ZERO, Decimal::ZERO));
        assert_eq!(
            report.headline.as_deref(),
            Some("No active loans found. You are debt free!")
        );
        assert!(report.advice.is_none());
        assert!(report.milestones.is_empty());
    }

    #[test]
    fn test_clamps_negative_savings() {
        assert_eq!(clamp_money(dec!(-12.5)), Decimal::ZERO);
        assert_eq!(clamp_money(dec!(12.345)), dec!(12.34));
        assert_eq!(clamp_months(-3), 0);
        assert_eq!(clamp_months(7), 7);
    }

    #[test]
    fn test_milestones_truncated() {
        let loans: Vec<Loan> = (1..=25)
            .map(|i| {
                let balance = Decimal::from(i * 100);
                Loan::new(i.to_string(), format!("Loan {i}"), dec!(100), Decimal::ZERO, balance)
            })
            .collect();
        let r = simulate(&loans, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
        let report = build_report(&r, &Budget::default());
        assert_eq!(report.milestones.len(), MAX_MILESTONES);
        assert_eq!(report.more_milestones, 5);
    }

    #[test]
    fn test_affordability() {
        let loans = vec![Loan::new("1", "Card", dec!(5000), dec!(36), dec!(150000))];
        let budget = Budget::new(dec!(5000), dec!(50000), dec!(15000));
        let r = simulate(&loans, budget.extra_payment, budget.income, budget.living_expenses);
        let report = build_report(&r, &budget);
        assert_eq!(report.affordability.committed_payments, dec!(5000));
        assert_eq!(report.affordability.surplus, dec!(25000));
        assert!(report.affordability.affordable);
        assert!(report.advice.unwrap().contains("Card"));
    }

    #[test]
    fn test_affordability_matches_plan_warnings() {
        let sample = crate::payoff::PlanInputs::sample();
        let plan = crate::payoff::plan_repayment(&sample).unwrap();
        let report = build_report(&plan.result, &sample.budget());
        assert!(!report.affordability.affordable);
        assert!(plan.warnings.iter().any(|w| w.contains("exceed income")));

        let mut silent = sample.clone();
        silent.income = Decimal::ZERO;
        silent.living_expenses = Decimal::ZERO;
        let plan = crate::payoff::plan_repayment(&silent).unwrap();
        let report = build_report(&plan.result, &silent.budget());
        assert!(report.affordability.affordable);
        assert!(report.affordability.surplus < Decimal::ZERO);
        assert!(!plan.warnings.iter().any(|w| w.contains("exceed income")));
    }

    #[test]
    fn test_compare_rows() {
        let loans = vec![
            Loan::new("1", "Card", dec!(5000), dec!(36), dec!(150000)),
            Loan::new("2", "Car", dec!(12000), dec!(9.5), dec!(800000)),
        ];
        let r = simulate(&loans, dec!(5000), Decimal::ZERO, Decimal::ZERO);
        let rows = compare_strategies(&r);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].strategy, Strategy::Baseline);
        assert_eq!(rows[0].interest_saved, Decimal::ZERO);
        assert_eq!(rows[0].months_saved, 0);
        assert!(rows[1].interest_saved > Decimal::ZERO);
        assert_eq!(rows[1].loans_closed, 2);
    }
}
