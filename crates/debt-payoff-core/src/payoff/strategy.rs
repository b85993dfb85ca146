use serde::{Deserialize, Serialize};

use crate::types::*;

/// How the pooled extra payment is directed each month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Highest interest rate first.
    Avalanche,
    /// Smallest outstanding balance first.
    Snowball,
    /// Contractual EMIs only; used as the comparison reference.
    Baseline,
}

impl Strategy {
    /// Strategies that redirect money, in presentation order.
    pub const OPTIMIZED: [Strategy; 2] = [Strategy::Avalanche, Strategy::Snowball];

    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Avalanche => "avalanche",
            Strategy::Snowball => "snowball",
            Strategy::Baseline => "baseline",
        }
    }

    pub fn allocates_extra(&self) -> bool {
        !matches!(self, Strategy::Baseline)
    }

    /// Whether a challenger `(rate, balance)` strictly beats the incumbent.
    /// Strictness keeps the earlier loan on ties.
    fn outranks(&self, challenger: (Percent, Money), incumbent: (Percent, Money)) -> bool {
        match self {
            Strategy::Avalanche => challenger.0 > incumbent.0,
            Strategy::Snowball => challenger.1 < incumbent.1,
            Strategy::Baseline => false,
        }
    }

    /// Position of the loan that should receive this month's pool, given the
    /// active loans' `(annual_rate_percent, balance)` in input order.
    /// `None` for the baseline or an empty set.
    pub fn select_focus<I>(&self, candidates: I) -> Option<usize>
    where
        I: IntoIterator<Item = (Percent, Money)>,
    {
        if !self.allocates_extra() {
            return None;
        }
        let mut best: Option<(usize, (Percent, Money))> = None;
        for (idx, candidate) in candidates.into_iter().enumerate() {
            let take = match best {
                None => true,
                Some((_, incumbent)) => self.outranks(candidate, incumbent),
            };
            if take {
                best = Some((idx, candidate));
            }
        }
        best.map(|(idx, _)| idx)
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn book() -> Vec<(Percent, Money)> {
        vec![
            (dec!(8.5), dec!(4500000)),
            (dec!(36), dec!(150000)),
            (dec!(9.5), dec!(800000)),
        ]
    }

    #[test]
    fn test_avalanche_picks_highest_rate() {
        assert_eq!(Strategy::Avalanche.select_focus(book()), Some(1));
    }

    #[test]
    fn test_snowball_picks_smallest_balance() {
        let mut loans = book();
        loans[1].1 = dec!(900000);
        assert_eq!(Strategy::Snowball.select_focus(loans), Some(2));
    }

    #[test]
    fn test_ties_keep_input_order() {
        let loans = vec![
            (dec!(12), dec!(500)),
            (dec!(12), dec!(500)),
            (dec!(12), dec!(500)),
        ];
        assert_eq!(Strategy::Avalanche.select_focus(loans.clone()), Some(0));
        assert_eq!(Strategy::Snowball.select_focus(loans), Some(0));
    }

    #[test]
    fn test_baseline_never_focuses() {
        assert_eq!(Strategy::Baseline.select_focus(book()), None);
    }

    #[test]
    fn test_empty_set() {
        assert_eq!(Strategy::Avalanche.select_focus(Vec::new()), None);
    }

    #[test]
    fn test_serde_names() {
        let s = serde_json::to_string(&Strategy::Snowball).unwrap();
        assert_eq!(s, "\"snowball\"");
    }
}
