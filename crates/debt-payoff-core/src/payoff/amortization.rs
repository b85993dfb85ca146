use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Decimal places kept on each month's interest charge. Keeps balance scale
/// bounded over long horizons.
const INTEREST_DP: u32 = 10;

/// Outcome of advancing one loan by one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthStep {
    pub balance: Money,
    pub interest: Money,
    pub payment: Money,
    pub closed: bool,
}

/// Nominal annual percentage converted to a monthly fraction.
pub fn monthly_rate(annual_rate_percent: Percent) -> Decimal {
    annual_rate_percent.max(Decimal::ZERO) / dec!(100) / dec!(12)
}

/// Advance a loan by one month.
///
/// Interest accrues on the opening balance, then the EMI plus any extra
/// allocated this month is applied, capped at what is owed so the balance
/// never goes negative. A remainder within `tolerance` of zero closes the loan.
///
/// Returns `None` when the balance with interest no longer fits in a
/// `Decimal`, which only happens to a loan whose payments never cover its
/// interest.
pub fn step_month(
    balance: Money,
    annual_rate_percent: Percent,
    monthly_payment: Money,
    extra_allocated: Money,
    tolerance: Money,
) -> Option<MonthStep> {
    let balance = balance.max(Decimal::ZERO);
    let interest = balance
        .checked_mul(monthly_rate(annual_rate_percent))?
        .round_dp(INTEREST_DP);
    let owed = balance.checked_add(interest)?;

    let offered = monthly_payment
        .max(Decimal::ZERO)
        .checked_add(extra_allocated.max(Decimal::ZERO))?;
    let payment = offered.min(owed);

    let remaining = owed - payment;
    let closed = remaining <= tolerance;

    Some(MonthStep {
        balance: if closed { Decimal::ZERO } else { remaining },
        interest,
        payment,
        closed,
    })
}
