use chrono::{Months as CalendarMonths, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::amortization::step_month;
use super::loan::{Loan, SimulationConfig};
use super::strategy::Strategy;
use crate::types::*;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every loan reached a zero balance.
    AllClosed,
    /// The horizon ran out with loans still open.
    Capped,
}

/// A loan reaching zero balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapEntry {
    /// 1-indexed month of closure.
    pub month: Months,
    /// 1-indexed year containing `month`.
    pub year: u32,
    pub loan_id: String,
    pub loan_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closes_on: Option<NaiveDate>,
}

/// A loan still open when a capped run stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutstandingLoan {
    pub loan_id: String,
    pub loan_name: String,
    pub balance: Money,
}

/// Result of one strategy simulated to completion or to the horizon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyRun {
    pub strategy: Strategy,
    pub status: RunStatus,
    pub reached_cap: bool,
    pub total_interest: Money,
    pub total_paid: Money,
    /// Months simulated; equals the horizon when capped.
    pub total_duration: Months,
    /// Closures in the order they happened.
    pub closures: Vec<RoadmapEntry>,
    pub outstanding: Vec<OutstandingLoan>,
    /// An open balance outgrew the `Decimal` range before the horizon.
    /// `total_interest` is then saturated at `Decimal::MAX`; `total_paid` and
    /// `outstanding` reflect the last month that could be represented.
    pub overflowed: bool,
}

/// One loan's slot in a run. Balances are owned by the run.
struct Position<'a> {
    loan: &'a Loan,
    balance: Money,
}

struct SimulationState<'a> {
    active: Vec<Position<'a>>,
    /// EMIs released by closed loans and redirected to the pool.
    freed: Money,
    interest: Money,
    paid: Money,
    month: Months,
    closures: Vec<RoadmapEntry>,
}

// ---------------------------------------------------------------------------
// Impls
// ---------------------------------------------------------------------------

/// Year (1-indexed) that contains the given 1-indexed month.
pub fn year_of_month(month: Months) -> u32 {
    month.saturating_sub(1) / 12 + 1
}

impl RoadmapEntry {
    pub fn new(month: Months, loan_id: impl Into<String>, loan_name: impl Into<String>) -> Self {
        RoadmapEntry {
            month,
            year: year_of_month(month),
            loan_id: loan_id.into(),
            loan_name: loan_name.into(),
            closes_on: None,
        }
    }

    /// Attach the calendar date of closure, taking `start` as the date of
    /// month 1.
    pub fn dated_from(mut self, start: NaiveDate) -> Self {
        self.closes_on =
            start.checked_add_months(CalendarMonths::new(self.month.saturating_sub(1)));
        self
    }
}

impl StrategyRun {
    /// Month in which the given loan closed, if it did.
    pub fn closure_month(&self, loan_id: &str) -> Option<Months> {
        self.closures
            .iter()
            .find(|c| c.loan_id == loan_id)
            .map(|c| c.month)
    }
}

impl<'a> SimulationState<'a> {
    fn new(loans: &'a [Loan]) -> Self {
        let active = loans
            .iter()
            .filter(|l| l.balance > Decimal::ZERO)
            .map(|loan| Position {
                loan,
                balance: loan.balance,
            })
            .collect();
        SimulationState {
            active,
            freed: Decimal::ZERO,
            interest: Decimal::ZERO,
            paid: Decimal::ZERO,
            month: 0,
            closures: Vec::new(),
        }
    }

    /// Simulate one more month. Returns `None`, with the state left as it was,
    /// when a balance or running total would leave the `Decimal` range.
    fn advance(
        &mut self,
        strategy: Strategy,
        extra: Money,
        rollover: bool,
        tolerance: Money,
    ) -> Option<()> {
        let pool = extra.checked_add(self.freed)?;
        let focus = if pool > Decimal::ZERO {
            strategy.select_focus(
                self.active
                    .iter()
                    .map(|p| (p.loan.annual_rate_percent, p.balance)),
            )
        } else {
            None
        };

        let steps = self
            .active
            .iter()
            .enumerate()
            .map(|(idx, pos)| {
                let allocated = if focus == Some(idx) {
                    pool
                } else {
                    Decimal::ZERO
                };
                step_month(
                    pos.balance,
                    pos.loan.annual_rate_percent,
                    pos.loan.monthly_payment,
                    allocated,
                    tolerance,
                )
            })
            .collect::<Option<Vec<_>>>()?;

        let (mut interest, mut paid, mut freed) = (self.interest, self.paid, self.freed);
        for (pos, step) in self.active.iter().zip(&steps) {
            interest = interest.checked_add(step.interest)?;
            paid = paid.checked_add(step.payment)?;
            if step.closed && rollover {
                freed = freed.checked_add(pos.loan.monthly_payment)?;
            }
        }

        self.month += 1;
        self.interest = interest;
        self.paid = paid;
        self.freed = freed;
        for (pos, step) in self.active.iter_mut().zip(&steps) {
            pos.balance = step.balance;
            if step.closed {
                self.closures.push(RoadmapEntry::new(
                    self.month,
                    pos.loan.id.clone(),
                    pos.loan.name.clone(),
                ));
            }
        }

        self.active.retain(|p| p.balance > Decimal::ZERO);
        Some(())
    }
}

/// Simulate one strategy over `loans` until every loan closes or the horizon
/// in `config` is reached.
///
/// Loans are expected to be normalized; any with a non-positive balance are
/// skipped. The baseline ignores `extra_payment`. Closed loans' EMIs are only
/// redirected when a strategy is being followed with a positive extra budget,
/// so a zero-extra run reproduces the baseline exactly.
pub fn run_strategy(
    loans: &[Loan],
    strategy: Strategy,
    extra_payment: Money,
    config: &SimulationConfig,
) -> StrategyRun {
    let extra = if strategy.allocates_extra() {
        extra_payment.max(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };
    let rollover = extra > Decimal::ZERO;

    let mut state = SimulationState::new(loans);
    let mut overflowed = false;
    while !state.active.is_empty() && state.month < config.max_months {
        if state
            .advance(strategy, extra, rollover, config.balance_tolerance)
            .is_none()
        {
            overflowed = true;
            break;
        }
    }

    let status = if state.active.is_empty() {
        RunStatus::AllClosed
    } else {
        RunStatus::Capped
    };

    let outstanding: Vec<OutstandingLoan> = state
        .active
        .iter()
        .map(|p| OutstandingLoan {
            loan_id: p.loan.id.clone(),
            loan_name: p.loan.name.clone(),
            balance: p.balance,
        })
        .collect();

    if overflowed {
        warn!(
            strategy = strategy.label(),
            month = state.month + 1,
            open_loans = outstanding.len(),
            "balances outgrew decimal range, run stopped as not payable"
        );
    } else if status == RunStatus::Capped {
        warn!(
            strategy = strategy.label(),
            months = state.month,
            open_loans = outstanding.len(),
            "simulation reached horizon with loans still open"
        );
    } else {
        debug!(
            strategy = strategy.label(),
            months = state.month,
            interest = %state.interest,
            "all loans closed"
        );
    }

    StrategyRun {
        strategy,
        status,
        reached_cap: status == RunStatus::Capped,
        total_interest: if overflowed {
            Decimal::MAX
        } else {
            state.interest
        },
        total_paid: state.paid,
        total_duration: if overflowed {
            config.max_months
        } else {
            state.month
        },
        closures: state.closures,
        outstanding,
        overflowed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn cfg() -> SimulationConfig {
        SimulationConfig::default()
    }

    #[test]
    fn test_year_of_month() {
        assert_eq!(year_of_month(1), 1);
        assert_eq!(year_of_month(12), 1);
        assert_eq!(year_of_month(13), 2);
        assert_eq!(year_of_month(24), 2);
        assert_eq!(year_of_month(25), 3);
    }

    #[test]
    fn test_single_zero_rate_loan() {
        let loans = vec![Loan::new("1", "Flat", dec!(1000), Decimal::ZERO, dec!(12000))];
        let run = run_strategy(&loans, Strategy::Avalanche, Decimal::ZERO, &cfg());
        assert_eq!(run.status, RunStatus::AllClosed);
        assert_eq!(run.total_duration, 12);
        assert_eq!(run.total_interest, Decimal::ZERO);
        assert_eq!(run.total_paid, dec!(12000));
        assert_eq!(run.closures, vec![RoadmapEntry::new(12, "1", "Flat")]);
    }

    #[test]
    fn test_extra_payment_shortens_run() {
        let loans = vec![Loan::new("1", "Flat", dec!(1000), Decimal::ZERO, dec!(12000))];
        let run = run_strategy(&loans, Strategy::Snowball, dec!(1000), &cfg());
        assert_eq!(run.total_duration, 6);
    }

    #[test]
    fn test_baseline_ignores_extra() {
        let loans = vec![Loan::new("1", "Flat", dec!(1000), Decimal::ZERO, dec!(12000))];
        let run = run_strategy(&loans, Strategy::Baseline, dec!(1000), &cfg());
        assert_eq!(run.total_duration, 12);
    }

    #[test]
    fn test_rollover_of_freed_emi() {
        // A closes in month 2 with extra; its 500 EMI then joins the pool for B.
        let loans = vec![
            Loan::new("a", "A", dec!(500), Decimal::ZERO, dec!(1000)),
            Loan::new("b", "B", dec!(500), Decimal::ZERO, dec!(10000)),
        ];
        let run = run_strategy(&loans, Strategy::Snowball, dec!(100), &cfg());
        // Month 1: A 1000 - 600 = 400, B 9500. Month 2: A closes, B 9000.
        // From month 3 B receives 500 + 100 + 500 = 1100 per month.
        // 9000 / 1100 = 8.18 => 9 more months => closes month 11.
        assert_eq!(run.closure_month("a"), Some(2));
        assert_eq!(run.closure_month("b"), Some(11));
        assert_eq!(run.total_duration, 11);
    }

    #[test]
    fn test_zero_capacity_is_capped() {
        let loans = vec![Loan::new("1", "Stuck", Decimal::ZERO, dec!(10), dec!(5000))];
        let config = SimulationConfig {
            max_months: 120,
            ..SimulationConfig::default()
        };
        let run = run_strategy(&loans, Strategy::Avalanche, Decimal::ZERO, &config);
        assert_eq!(run.status, RunStatus::Capped);
        assert!(run.reached_cap);
        assert_eq!(run.total_duration, 120);
        assert!(run.closures.is_empty());
        assert_eq!(run.outstanding.len(), 1);
        assert!(run.outstanding[0].balance > dec!(5000));
    }

    #[test]
    fn test_closed_loans_skipped() {
        let loans = vec![Loan::new("1", "Done", dec!(100), dec!(5), Decimal::ZERO)];
        let run = run_strategy(&loans, Strategy::Avalanche, dec!(100), &cfg());
        assert_eq!(run.status, RunStatus::AllClosed);
        assert_eq!(run.total_duration, 0);
        assert!(run.closures.is_empty());
    }

    #[test]
    fn test_dated_roadmap_entry() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        let first = RoadmapEntry::new(1, "1", "Card").dated_from(start);
        assert_eq!(first.closes_on, Some(start));
        let second = RoadmapEntry::new(2, "1", "Card").dated_from(start);
        assert_eq!(second.closes_on, NaiveDate::from_ymd_opt(2026, 2, 28));
        let year_on = RoadmapEntry::new(13, "1", "Card").dated_from(start);
        assert_eq!(year_on.closes_on, NaiveDate::from_ymd_opt(2027, 1, 31));
    }

    #[test]
    fn test_unpaid_high_rate_loan_caps_at_default_horizon() {
        // No payment at 120% p.a.: the balance leaves Decimal range around month 550
        let loans = vec![Loan::new("1", "Payday", Decimal::ZERO, dec!(120), dec!(1000000))];
        let run = run_strategy(&loans, Strategy::Baseline, Decimal::ZERO, &cfg());
        assert_eq!(run.status, RunStatus::Capped);
        assert!(run.reached_cap);
        assert!(run.overflowed);
        assert_eq!(run.total_duration, 600);
        assert_eq!(run.total_interest, Decimal::MAX);
        assert!(run.closures.is_empty());
        assert_eq!(run.outstanding.len(), 1);
        assert!(run.outstanding[0].balance > dec!(1000000));
    }

    #[test]
    fn test_emi_below_interest_caps_without_closing_others() {
        // EMI 100 against ~8,333 monthly interest; the other loan still closes
        let loans = vec![
            Loan::new("1", "Card", dec!(100), dec!(200), dec!(50000)),
            Loan::new("2", "Flat", dec!(1000), Decimal::ZERO, dec!(3000)),
        ];
        let run = run_strategy(&loans, Strategy::Avalanche, dec!(500), &cfg());
        assert_eq!(run.status, RunStatus::Capped);
        assert!(run.overflowed);
        assert_eq!(run.total_duration, 600);
        assert_eq!(run.closure_month("2"), Some(3));
        assert_eq!(run.outstanding.len(), 1);
        assert_eq!(run.outstanding[0].loan_id, "1");
    }

    #[test]
    fn test_bounded_capped_run_does_not_overflow() {
        let loans = vec![Loan::new("1", "Stuck", Decimal::ZERO, dec!(10), dec!(5000))];
        let run = run_strategy(&loans, Strategy::Baseline, Decimal::ZERO, &cfg());
        assert!(run.reached_cap);
        assert!(!run.overflowed);
        assert!(run.total_interest < Decimal::MAX);
    }
}
