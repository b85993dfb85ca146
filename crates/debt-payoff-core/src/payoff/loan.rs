use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::DebtPayoffError;
use crate::types::*;
use crate::DebtPayoffResult;

/// Default simulation horizon: 50 years.
pub const DEFAULT_MAX_MONTHS: Months = 600;

/// Balances at or below this amount are treated as fully repaid.
pub const DEFAULT_BALANCE_TOLERANCE: Money = dec!(0.005);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single amortizing loan / EMI as entered by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    /// Opaque identifier, stable across edits.
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Contractual monthly installment.
    pub monthly_payment: Money,
    pub annual_rate_percent: Percent,
    /// Outstanding principal.
    pub balance: Money,
}

/// Monthly cash available for debt service.
///
/// Only `extra_payment` feeds the simulation. Income and living expenses are
/// carried for affordability context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    #[serde(default)]
    pub extra_payment: Money,
    #[serde(default)]
    pub income: Money,
    #[serde(default)]
    pub living_expenses: Money,
}

/// Tunables for the simulation driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Horizon after which a run stops and reports `reached_cap`.
    #[serde(default = "default_max_months")]
    pub max_months: Months,
    #[serde(default = "default_balance_tolerance")]
    pub balance_tolerance: Money,
}

/// Everything a caller needs to persist to reproduce a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanInputs {
    pub loans: Vec<Loan>,
    #[serde(default)]
    pub extra_payment: Money,
    #[serde(default)]
    pub income: Money,
    #[serde(default)]
    pub living_expenses: Money,
    /// When set, roadmap entries carry the calendar month of each closure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub config: SimulationConfig,
}

/// Loans ready for simulation, plus what normalization had to do to get there.
#[derive(Debug, Clone, Default)]
pub struct NormalizedLoans {
    pub active: Vec<Loan>,
    /// Ids of loans that had negative fields clamped to zero.
    pub adjusted: Vec<String>,
    /// Ids of loans dropped because their balance was already zero.
    pub closed: Vec<String>,
}

fn default_max_months() -> Months {
    DEFAULT_MAX_MONTHS
}

fn default_balance_tolerance() -> Money {
    DEFAULT_BALANCE_TOLERANCE
}

// ---------------------------------------------------------------------------
// Impls
// ---------------------------------------------------------------------------

impl Loan {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        monthly_payment: Money,
        annual_rate_percent: Percent,
        balance: Money,
    ) -> Self {
        Loan {
            id: id.into(),
            name: name.into(),
            monthly_payment,
            annual_rate_percent,
            balance,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.balance <= Decimal::ZERO
    }

    /// Copy of the loan with negative numeric fields clamped to zero.
    /// The flag reports whether anything was clamped.
    pub fn normalized(&self) -> (Loan, bool) {
        let clamped = self.monthly_payment < Decimal::ZERO
            || self.annual_rate_percent < Decimal::ZERO
            || self.balance < Decimal::ZERO;
        let loan = Loan {
            id: self.id.clone(),
            name: self.name.clone(),
            monthly_payment: self.monthly_payment.max(Decimal::ZERO),
            annual_rate_percent: self.annual_rate_percent.max(Decimal::ZERO),
            balance: self.balance.max(Decimal::ZERO),
        };
        (loan, clamped)
    }
}

impl Budget {
    pub fn new(extra_payment: Money, income: Money, living_expenses: Money) -> Self {
        Budget {
            extra_payment,
            income,
            living_expenses,
        }
    }

    /// Extra payment with negative values treated as zero.
    pub fn effective_extra(&self) -> Money {
        self.extra_payment.max(Decimal::ZERO)
    }

    /// Income left after living expenses, the given EMIs and the extra payment.
    pub fn monthly_surplus(&self, committed_payments: Money) -> Money {
        self.income
            .saturating_sub(self.living_expenses)
            .saturating_sub(committed_payments)
            .saturating_sub(self.effective_extra())
    }

    /// Whether income or living expenses were supplied at all. Without them
    /// affordability cannot be judged.
    pub fn has_household_budget(&self) -> bool {
        self.income > Decimal::ZERO || self.living_expenses > Decimal::ZERO
    }

    /// Amount by which the EMIs plus the extra payment exceed income after
    /// living expenses. `None` when the plan fits or no household budget was
    /// given.
    pub fn shortfall(&self, committed_payments: Money) -> Option<Money> {
        if !self.has_household_budget() {
            return None;
        }
        let surplus = self.monthly_surplus(committed_payments);
        (surplus < Decimal::ZERO).then(|| -surplus)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            max_months: DEFAULT_MAX_MONTHS,
            balance_tolerance: DEFAULT_BALANCE_TOLERANCE,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> DebtPayoffResult<()> {
        if self.max_months == 0 {
            return Err(DebtPayoffError::InvalidInput {
                field: "config.max_months".into(),
                reason: "Simulation horizon must be at least 1 month".into(),
            });
        }
        if self.balance_tolerance < Decimal::ZERO {
            return Err(DebtPayoffError::InvalidInput {
                field: "config.balance_tolerance".into(),
                reason: "Balance tolerance cannot be negative".into(),
            });
        }
        Ok(())
    }
}

impl PlanInputs {
    pub fn budget(&self) -> Budget {
        Budget::new(self.extra_payment, self.income, self.living_expenses)
    }

    /// The portfolio a new user starts from: a home loan, a car loan and a
    /// credit card balance.
    pub fn sample() -> Self {
        PlanInputs {
            loans: vec![
                Loan::new("1", "Home Loan", dec!(35000), dec!(8.5), dec!(4500000)),
                Loan::new("2", "Car Loan", dec!(12000), dec!(9.5), dec!(800000)),
                Loan::new("3", "Credit Card", dec!(5000), dec!(36.0), dec!(150000)),
            ],
            extra_payment: dec!(5000),
            income: dec!(50000),
            living_expenses: dec!(15000),
            start_date: None,
            config: SimulationConfig::default(),
        }
    }
}

/// Clamp negative fields to zero and drop loans that are already repaid.
/// Input order is preserved; it is the tie-breaker for every ranking.
pub fn normalize_loans(loans: &[Loan]) -> NormalizedLoans {
    let mut out = NormalizedLoans::default();
    for loan in loans {
        let (loan, clamped) = loan.normalized();
        if clamped {
            out.adjusted.push(loan.id.clone());
        }
        if loan.is_closed() {
            out.closed.push(loan.id);
        } else {
            out.active.push(loan);
        }
    }
    out
}
