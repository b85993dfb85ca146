use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::loan::{normalize_loans, Budget, Loan, PlanInputs, SimulationConfig};
use super::simulation::{run_strategy, RoadmapEntry, StrategyRun};
use super::strategy::Strategy;
use crate::types::*;
use crate::DebtPayoffResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Totals of the no-extra-payment reference run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineSummary {
    pub total_interest: Money,
    pub total_duration: Months,
    pub reached_cap: bool,
}

/// The loan a strategy would direct extra money to at the start of the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusLoan {
    pub loan_id: String,
    pub name: String,
    pub rate: Percent,
    pub balance: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtStats {
    /// Sum of active balances at simulation start.
    pub total_debt: Money,
    pub total_monthly_payment: Money,
    pub active_loans: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestions {
    pub avalanche: Option<FocusLoan>,
    pub snowball: Option<FocusLoan>,
    pub stats: DebtStats,
}

/// Every run behind a plan, for side-by-side comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyRuns {
    pub baseline: StrategyRun,
    pub avalanche: StrategyRun,
    pub snowball: StrategyRun,
}

/// Complete repayment plan.
///
/// The headline figures (`roadmap`, `total_interest`, `total_duration`,
/// `reached_cap`) come from the avalanche run. `interest_saved` and
/// `months_saved` are raw signed differences against the baseline; clamping
/// them for display is left to the consumer (see `report::build_report`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoffResult {
    pub roadmap: Vec<RoadmapEntry>,
    pub total_interest: Money,
    pub total_duration: Months,
    pub reached_cap: bool,
    pub baseline: BaselineSummary,
    pub suggestions: Suggestions,
    pub interest_saved: Money,
    pub months_saved: i64,
    pub strategies: StrategyRuns,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

fn focus_loan(strategy: Strategy, loans: &[Loan]) -> Option<FocusLoan> {
    let idx = strategy.select_focus(loans.iter().map(|l| (l.annual_rate_percent, l.balance)))?;
    let loan = &loans[idx];
    Some(FocusLoan {
        loan_id: loan.id.clone(),
        name: loan.name.clone(),
        rate: loan.annual_rate_percent,
        balance: loan.balance,
    })
}

fn suggest(active: &[Loan]) -> Suggestions {
    Suggestions {
        avalanche: focus_loan(Strategy::Avalanche, active),
        snowball: focus_loan(Strategy::Snowball, active),
        stats: DebtStats {
            total_debt: active
                .iter()
                .fold(Decimal::ZERO, |acc, l| acc.saturating_add(l.balance)),
            total_monthly_payment: active
                .iter()
                .fold(Decimal::ZERO, |acc, l| acc.saturating_add(l.monthly_payment)),
            active_loans: active.len(),
        },
    }
}

/// Run the baseline, avalanche and snowball simulations and assemble the plan.
///
/// `income` and `living_expenses` do not influence the result. Never fails:
/// negative inputs are treated as zero and unpayable loans end in a capped run.
pub fn simulate(
    loans: &[Loan],
    extra_payment: Money,
    income: Money,
    living_expenses: Money,
) -> PayoffResult {
    simulate_with(
        loans,
        &Budget::new(extra_payment, income, living_expenses),
        &SimulationConfig::default(),
    )
}

/// [`simulate`] with an explicit budget and configuration.
pub fn simulate_with(loans: &[Loan], budget: &Budget, config: &SimulationConfig) -> PayoffResult {
    let normalized = normalize_loans(loans);
    let active = &normalized.active;
    let extra = budget.effective_extra();

    let baseline = run_strategy(active, Strategy::Baseline, Decimal::ZERO, config);
    let avalanche = run_strategy(active, Strategy::Avalanche, extra, config);
    let snowball = run_strategy(active, Strategy::Snowball, extra, config);

    debug!(
        loans = active.len(),
        baseline_months = baseline.total_duration,
        avalanche_months = avalanche.total_duration,
        snowball_months = snowball.total_duration,
        "repayment plan simulated"
    );

    PayoffResult {
        roadmap: avalanche.closures.clone(),
        total_interest: avalanche.total_interest,
        total_duration: avalanche.total_duration,
        reached_cap: avalanche.reached_cap,
        baseline: BaselineSummary {
            total_interest: baseline.total_interest,
            total_duration: baseline.total_duration,
            reached_cap: baseline.reached_cap,
        },
        suggestions: suggest(active),
        interest_saved: baseline.total_interest - avalanche.total_interest,
        months_saved: i64::from(baseline.total_duration) - i64::from(avalanche.total_duration),
        strategies: StrategyRuns {
            baseline,
            avalanche,
            snowball,
        },
    }
}

impl PayoffResult {
    /// Run for the given strategy.
    pub fn run(&self, strategy: Strategy) -> &StrategyRun {
        match strategy {
            Strategy::Avalanche => &self.strategies.avalanche,
            Strategy::Snowball => &self.strategies.snowball,
            Strategy::Baseline => &self.strategies.baseline,
        }
    }

    fn date_from(&mut self, start: chrono::NaiveDate) {
        let runs = [
            &mut self.strategies.baseline,
            &mut self.strategies.avalanche,
            &mut self.strategies.snowball,
        ];
        for run in runs {
            run.closures = std::mem::take(&mut run.closures)
                .into_iter()
                .map(|c| c.dated_from(start))
                .collect();
        }
        self.roadmap = self.strategies.avalanche.closures.clone();
    }
}

/// Build a repayment plan from a stored inputs aggregate, wrapped in the
/// standard computation envelope.
///
/// Only a malformed configuration is an error. Input leniency (clamped
/// fields, skipped loans), capped runs and an unaffordable budget are
/// reported as warnings.
pub fn plan_repayment(inputs: &PlanInputs) -> DebtPayoffResult<ComputationOutput<PayoffResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    inputs.config.validate()?;

    let budget = inputs.budget();
    let normalized = normalize_loans(&inputs.loans);
    for id in &normalized.adjusted {
        warnings.push(format!("Loan '{id}': negative values treated as zero"));
    }
    for id in &normalized.closed {
        warnings.push(format!("Loan '{id}': zero balance, excluded from simulation"));
    }
    if budget.extra_payment < Decimal::ZERO {
        warnings.push("Negative extra payment treated as zero".into());
    }

    let mut result = simulate_with(&normalized.active, &budget, &inputs.config);
    if let Some(date) = inputs.start_date {
        result.date_from(date);
    }

    for strategy in [Strategy::Baseline, Strategy::Avalanche, Strategy::Snowball] {
        let run = result.run(strategy);
        if run.reached_cap {
            let names: Vec<&str> = run
                .outstanding
                .iter()
                .map(|o| o.loan_name.as_str())
                .collect();
            let growth = if run.overflowed {
                "; balances grow without bound, interest saturated"
            } else {
                ""
            };
            warnings.push(format!(
                "{strategy}: not payable within {} months with current inputs ({}){growth}",
                inputs.config.max_months,
                names.join(", ")
            ));
        }
    }

    if let Some(gap) = budget.shortfall(result.suggestions.stats.total_monthly_payment) {
        warnings.push(format!(
            "EMIs plus extra payment exceed income after living expenses by {}",
            gap.round_dp(2)
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Debt Payoff Simulation (avalanche / snowball vs. baseline)",
        &serde_json::json!({
            "loans": inputs.loans.len(),
            "active_loans": normalized.active.len(),
            "extra_payment": budget.effective_extra().to_string(),
            "max_months": inputs.config.max_months,
            "balance_tolerance": inputs.config.balance_tolerance.to_string(),
            "rollover": "freed EMIs join the extra pool when extra_payment > 0",
        }),
        warnings,
        elapsed,
        result,
    ))
}
