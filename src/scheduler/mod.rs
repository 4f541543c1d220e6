//! Allocation passes, the run pipeline and KPI evaluation.
//!
//! # Algorithm
//!
//! `GreedyAllocator` visits students cohort by cohort (seeded shuffle
//! within each cohort) and commits the best-scoring feasible group until
//! each student reaches their hours or runs out of candidates. It is a
//! heuristic, not an exact solver.
//!
//! `SwapImprover` then trades assignments between pairs of students when
//! that makes groups less mixed without breaking any hard constraint.
//!
//! # KPI
//!
//! `AllocationKpi` reports demand versus supply, satisfaction and seat
//! fill rates.
//!
//! # Pipeline
//!
//! `LabScheduler` ties ingestion, validation, both passes and the result
//! assembly into one call.

mod greedy;
mod kpi;
mod runner;
mod swap;

pub use greedy::{GreedyAllocator, GreedyStats};
pub use kpi::{demand_hours, supply_hours, AllocationKpi};
pub use runner::{AllocationReport, LabScheduler};
pub use swap::SwapImprover;
