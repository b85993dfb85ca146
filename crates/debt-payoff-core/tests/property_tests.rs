use debt_payoff_core::payoff::loan::SimulationConfig;
use debt_payoff_core::payoff::{simulate_with, Budget, Loan, RunStatus};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn arb_loan(idx: usize) -> impl Strategy<Value = Loan> {
    // EMI 0..5000, rate 0.00..40.00 %, balance 0..200000
    (0u32..5_000, 0u32..4_000, 0u32..200_000).prop_map(move |(emi, rate_bps, balance)| {
        Loan::new(
            idx.to_string(),
            format!("Loan {idx}"),
            Decimal::from(emi),
            Decimal::new(i64::from(rate_bps), 2),
            Decimal::from(balance),
        )
    })
}

fn arb_loans() -> impl Strategy<Value = Vec<Loan>> {
    (0usize..5).prop_flat_map(|n| (0..n).map(arb_loan).collect::<Vec<_>>())
}

fn arb_punitive_loan(idx: usize) -> impl Strategy<Value = Loan> {
    // EMI 0..2000, rate 0..600 %, balance up to 10,000,000: EMI often below interest
    (0u32..2_000, 0u32..600, 1u32..10_000_000).prop_map(move |(emi, rate, balance)| {
        Loan::new(
            idx.to_string(),
            format!("Loan {idx}"),
            Decimal::from(emi),
            Decimal::from(rate),
            Decimal::from(balance),
        )
    })
}

fn arb_punitive_loans() -> impl Strategy<Value = Vec<Loan>> {
    (1usize..4).prop_flat_map(|n| (0..n).map(arb_punitive_loan).collect::<Vec<_>>())
}

fn config() -> SimulationConfig {
    SimulationConfig {
        max_months: 240,
        ..SimulationConfig::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn optimized_never_worse_than_baseline(loans in arb_loans(), extra in 0u32..20_000) {
        let r = simulate_with(&loans, &Budget::new(Decimal::from(extra), Decimal::ZERO, Decimal::ZERO), &config());
        prop_assert!(r.total_interest <= r.baseline.total_interest);
        prop_assert!(r.total_duration <= r.baseline.total_duration);
        prop_assert!(r.strategies.snowball.total_interest <= r.baseline.total_interest);
        prop_assert!(r.strategies.snowball.total_duration <= r.baseline.total_duration);
        prop_assert!(r.interest_saved >= Decimal::ZERO);
        prop_assert!(r.months_saved >= 0);
    }

    #[test]
    fn zero_extra_reproduces_baseline(loans in arb_loans()) {
        let r = simulate_with(&loans, &Budget::default(), &config());
        prop_assert_eq!(r.total_interest, r.baseline.total_interest);
        prop_assert_eq!(r.total_duration, r.baseline.total_duration);
    }

    #[test]
    fn focus_loans_are_extremal(loans in arb_loans()) {
        let r = simulate_with(&loans, &Budget::default(), &config());
        let active: Vec<&Loan> = loans.iter().filter(|l| l.balance > Decimal::ZERO).collect();
        match (&r.suggestions.avalanche, &r.suggestions.snowball) {
            (Some(av), Some(sb)) => {
                prop_assert!(active.iter().all(|l| av.rate >= l.annual_rate_percent));
                prop_assert!(active.iter().all(|l| sb.balance <= l.balance));
            }
            (None, None) => prop_assert!(active.is_empty()),
            _ => prop_assert!(false, "suggestions must both be present or both absent"),
        }
    }

    #[test]
    fn roadmap_is_ordered_and_complete(loans in arb_loans(), extra in 0u32..20_000) {
        let r = simulate_with(&loans, &Budget::new(Decimal::from(extra), Decimal::ZERO, Decimal::ZERO), &config());
        for run in [&r.strategies.baseline, &r.strategies.avalanche, &r.strategies.snowball] {
            prop_assert!(run.closures.windows(2).all(|w| w[0].month <= w[1].month));
            let active = loans.iter().filter(|l| l.balance > Decimal::ZERO).count();
            match run.status {
                RunStatus::AllClosed => prop_assert_eq!(run.closures.len(), active),
                RunStatus::Capped => {
                    prop_assert_eq!(run.closures.len() + run.outstanding.len(), active);
                    prop_assert_eq!(run.total_duration, 240);
                }
            }
        }
    }

    #[test]
    fn simulation_is_idempotent(loans in arb_loans(), extra in 0u32..20_000) {
        let budget = Budget::new(Decimal::from(extra), Decimal::ZERO, Decimal::ZERO);
        let a = simulate_with(&loans, &budget, &config());
        let b = simulate_with(&loans, &budget, &config());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn punitive_rates_end_capped_at_default_horizon(
        loans in arb_punitive_loans(),
        extra in 0u32..5_000,
    ) {
        let defaults = SimulationConfig::default();
        let r = simulate_with(&loans, &Budget::new(Decimal::from(extra), Decimal::ZERO, Decimal::ZERO), &defaults);
        for run in [&r.strategies.baseline, &r.strategies.avalanche, &r.strategies.snowball] {
            prop_assert_eq!(run.closures.len() + run.outstanding.len(), loans.len());
            prop_assert!(run.total_duration <= defaults.max_months);
            if run.overflowed {
                prop_assert_eq!(run.status, RunStatus::Capped);
                prop_assert_eq!(run.total_duration, defaults.max_months);
                prop_assert_eq!(run.total_interest, Decimal::MAX);
                prop_assert!(!run.outstanding.is_empty());
            }
            if run.status == RunStatus::Capped {
                prop_assert!(run.reached_cap);
                prop_assert_eq!(run.total_duration, defaults.max_months);
            }
        }
        prop_assert!(r.interest_saved >= Decimal::ZERO);
    }
}
