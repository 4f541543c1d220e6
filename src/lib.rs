//! Lab session allocation engine.
//!
//! Assigns students to capacity-bounded laboratory session groups so that
//! each student reaches a required number of credit hours without clashing
//! with their lectures or with their other labs, while keeping groups
//! balanced and cohorts together.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `TimeSlot`, `Student`, `SessionGroup`,
//!   plus tolerant week/weekday/period notation parsing
//! - **`conflict`**: Per-student busy slots and the dynamic conflict check
//! - **`registry`**: Group catalog and the atomic `commit`/`swap` operations
//! - **`scoring`**: Candidate scoring rules and the score engine
//! - **`scheduler`**: Greedy pass, swap pass, KPIs and the run pipeline
//! - **`assembler`**: Output rows and the shortfall report
//! - **`ingest`** / **`source`**: Raw records and where they come from
//! - **`validation`**: Input integrity checks (duplicate IDs, zero values)
//! - **`config`**: Run parameters and scoring weights
//!
//! # Determinism
//!
//! All randomness comes from one seed. Two runs over the same input with
//! the same configuration produce identical rows.
//!
//! # Example
//!
//! ```
//! use lab_roster::{AllocationConfig, LabScheduler, SessionGroup, Student, TimeSlot};
//!
//! let student = Student::new("2024001")
//!     .with_affiliation("Science", "Physics", "P1")
//!     .with_busy_slot(TimeSlot::from_raw("1-16周", "星期一", "1-2节").unwrap());
//! let groups = vec![
//!     SessionGroup::new("G1", TimeSlot::from_raw("3", "星期一", "1-2").unwrap())
//!         .with_capacity(20)
//!         .with_credit_hours(4),
//!     SessionGroup::new("G2", TimeSlot::from_raw("3", "星期二", "1-2").unwrap())
//!         .with_capacity(20)
//!         .with_credit_hours(4),
//! ];
//!
//! let config = AllocationConfig::default().with_required_hours(4);
//! let report = LabScheduler::new(config).allocate(vec![student], groups).unwrap();
//! // G1 clashes with the Monday lecture
//! assert_eq!(report.rows.len(), 1);
//! assert_eq!(report.rows[0].weekday, "星期二");
//! ```

pub mod assembler;
pub mod config;
pub mod conflict;
pub mod error;
pub mod ingest;
pub mod models;
pub mod registry;
pub mod scheduler;
pub mod scoring;
pub mod source;
pub mod validation;

pub use assembler::{AssignmentRow, ShortfallEntry, ShortfallReport};
pub use config::{AllocationConfig, EvaluationMode, ScoreWeights};
pub use error::{Error, ParseError, Result, SkippedRecord};
pub use models::{SessionGroup, SessionIdx, Student, StudentIdx, StudentRoster, TimeSlot};
pub use registry::SessionRegistry;
pub use scheduler::{AllocationKpi, AllocationReport, LabScheduler};
pub use source::{JsonSource, MemorySource, RecordSource};
