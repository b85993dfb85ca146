use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Instant;

use debt_payoff_core::payoff::{self, Loan, PlanInputs};
use debt_payoff_core::report;
use debt_payoff_core::types::with_metadata;

use crate::input;

/// Arguments shared by every plan command
#[derive(Args)]
pub struct PlanArgs {
    /// Path to JSON or YAML inputs file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan as "name:emi:rate:balance", e.g. "Credit Card:5000:36:150000" (repeatable)
    #[arg(long = "loan", value_parser = parse_loan)]
    pub loans: Vec<Loan>,

    /// Extra amount available every month on top of the EMIs
    #[arg(long)]
    pub extra: Option<Decimal>,

    /// Monthly income (affordability context only)
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Monthly living expenses (affordability context only)
    #[arg(long)]
    pub expenses: Option<Decimal>,

    /// Date of the plan's first month (YYYY-MM-DD); a closure in month N is dated N-1 months later
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Simulation horizon in months
    #[arg(long)]
    pub max_months: Option<u32>,
}

fn parse_loan(s: &str) -> Result<Loan, String> {
    let parts: Vec<&str> = s.rsplitn(4, ':').collect();
    if parts.len() != 4 {
        return Err(format!("expected \"name:emi:rate:balance\", got \"{s}\""));
    }
    // rsplitn yields fields back to front
    let field = |raw: &str, what: &str| -> Result<Decimal, String> {
        raw.trim()
            .parse::<Decimal>()
            .map_err(|e| format!("invalid {what} '{raw}': {e}"))
    };
    let balance = field(parts[0], "balance")?;
    let rate = field(parts[1], "rate")?;
    let emi = field(parts[2], "emi")?;
    Ok(Loan::new(String::new(), parts[3].trim(), emi, rate, balance))
}

fn resolve_inputs(args: PlanArgs) -> Result<PlanInputs, Box<dyn std::error::Error>> {
    let mut inputs: PlanInputs = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        if args.loans.is_empty() {
            return Err("--loan is required (or provide --input)".into());
        }
        let loans = args
            .loans
            .into_iter()
            .enumerate()
            .map(|(i, mut loan)| {
                loan.id = (i + 1).to_string();
                loan
            })
            .collect();
        PlanInputs {
            loans,
            extra_payment: args.extra.unwrap_or_default(),
            income: args.income.unwrap_or_default(),
            living_expenses: args.expenses.unwrap_or_default(),
            start_date: None,
            config: Default::default(),
        }
    };

    if let Some(months) = args.max_months {
        inputs.config.max_months = months;
    }
    if args.start_date.is_some() {
        inputs.start_date = args.start_date;
    }
    Ok(inputs)
}

pub fn run_simulate(args: PlanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = resolve_inputs(args)?;
    let result = payoff::plan_repayment(&inputs)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_compare(args: PlanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs = resolve_inputs(args)?;
    let plan = payoff::plan_repayment(&inputs)?;
    let rows = report::compare_strategies(&plan.result);
    Ok(serde_json::to_value(rows)?)
}

pub fn run_report(args: PlanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let inputs = resolve_inputs(args)?;
    let plan = payoff::plan_repayment(&inputs)?;
    let summary = report::build_report(&plan.result, &inputs.budget());

    let elapsed = start.elapsed().as_micros() as u64;
    let output = with_metadata(
        "Debt Freedom Roadmap",
        &plan.assumptions,
        plan.warnings,
        elapsed,
        summary,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_sample() -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(PlanInputs::sample())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_loan() {
        let loan = parse_loan("Credit Card:5000:36:150000").unwrap();
        assert_eq!(loan.name, "Credit Card");
        assert_eq!(loan.monthly_payment, dec!(5000));
        assert_eq!(loan.annual_rate_percent, dec!(36));
        assert_eq!(loan.balance, dec!(150000));
    }

    #[test]
    fn test_parse_loan_name_with_colon() {
        let loan = parse_loan("Bank: Personal:1200:14.5:40000").unwrap();
        assert_eq!(loan.name, "Bank: Personal");
        assert_eq!(loan.annual_rate_percent, dec!(14.5));
    }

    #[test]
    fn test_parse_loan_rejects_garbage() {
        assert!(parse_loan("Car:12000:9.5").is_err());
        assert!(parse_loan("Car:abc:9.5:800000").is_err());
    }
}
