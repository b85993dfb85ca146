//! Month-by-month loan repayment simulation.
//!
//! A plan is three independent runs over the same loan set: a baseline that
//! pays only contractual EMIs, and avalanche / snowball runs that pour the
//! extra budget (plus the EMIs of loans already closed) into one focus loan
//! per month.

pub mod amortization;
pub mod loan;
pub mod plan;
pub mod simulation;
pub mod strategy;

pub use loan::{Budget, Loan, PlanInputs, SimulationConfig};
pub use plan::{plan_repayment, simulate, simulate_with, PayoffResult};
pub use simulation::{RoadmapEntry, RunStatus, StrategyRun};
pub use strategy::Strategy;
