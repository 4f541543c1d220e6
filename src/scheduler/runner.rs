//! End-to-end allocation pipeline.
//!
//! read → ingest → validate → conflict index → greedy pass → swap pass →
//! rows, shortfall report and KPIs.

use log::{info, warn};
use serde::Serialize;

use super::greedy::{GreedyAllocator, GreedyStats};
use super::kpi::{demand_hours, supply_hours, AllocationKpi};
use super::swap::SwapImprover;
use crate::assembler::{assemble_rows, shortfall_report, AssignmentRow, ShortfallReport};
use crate::config::AllocationConfig;
use crate::conflict::ConflictIndex;
use crate::error::{Error, Result, SkippedRecord};
use crate::ingest::{ingest_sessions, ingest_students};
use crate::models::{SessionGroup, Student, StudentRoster};
use crate::registry::SessionRegistry;
use crate::source::RecordSource;
use crate::validation::validate_input;

/// Everything a run produces.
#[derive(Debug, Clone, Serialize)]
pub struct AllocationReport {
    /// One row per commit, by group then enrollment order.
    pub rows: Vec<AssignmentRow>,
    /// Students left below their hours.
    pub shortfall: ShortfallReport,
    pub kpi: AllocationKpi,
    pub greedy: GreedyStats,
    /// Accepted swaps.
    pub swaps: usize,
    /// Lecture rows dropped during ingestion.
    pub skipped_lectures: Vec<SkippedRecord>,
    /// Session rows dropped during ingestion.
    pub skipped_sessions: Vec<SkippedRecord>,
    /// Final student state.
    #[serde(skip)]
    pub roster: StudentRoster,
    /// Final group state.
    #[serde(skip)]
    pub registry: SessionRegistry,
}

impl AllocationReport {
    /// Total rows dropped during ingestion.
    pub fn skip_count(&self) -> usize {
        self.skipped_lectures.len() + self.skipped_sessions.len()
    }
}

/// Runs allocations with a fixed configuration.
///
/// # Example
/// ```
/// use lab_roster::config::AllocationConfig;
/// use lab_roster::models::{SessionGroup, Student, TimeSlot};
/// use lab_roster::scheduler::LabScheduler;
///
/// let students = vec![Student::new("S1").with_required_hours(8)];
/// let sessions = vec![
///     SessionGroup::new("G1", TimeSlot::new(vec![1], 1, 1, 2).unwrap())
///         .with_experiment("Optics")
///         .with_capacity(10)
///         .with_credit_hours(4),
///     SessionGroup::new("G2", TimeSlot::new(vec![2], 1, 1, 2).unwrap())
///         .with_experiment("Circuits")
///         .with_capacity(10)
///         .with_credit_hours(4),
/// ];
///
/// let report = LabScheduler::new(AllocationConfig::default())
///     .allocate(students, sessions)
///     .unwrap();
/// assert_eq!(report.rows.len(), 2);
/// assert!(report.shortfall.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct LabScheduler {
    config: AllocationConfig,
}

impl LabScheduler {
    pub fn new(config: AllocationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    /// Reads, ingests and allocates records from `source`.
    ///
    /// # Errors
    /// - `InvalidConfig` for unusable parameters.
    /// - `SourceUnreadable` if the source fails.
    /// - `EmptyInput` if either record list is empty.
    /// - `InvalidInput` / `CapacityExceeded` as for [`allocate`](Self::allocate).
    pub fn run(&self, source: &impl RecordSource) -> Result<AllocationReport> {
        self.config.validate()?;

        let lectures = source.lectures()?;
        if lectures.is_empty() {
            return Err(Error::EmptyInput("lecture"));
        }
        let sessions = source.sessions()?;
        if sessions.is_empty() {
            return Err(Error::EmptyInput("session"));
        }

        let students = ingest_students(&lectures, self.config.required_hours);
        let groups = ingest_sessions(&sessions);
        info!(
            "source '{}': {} students from {} lecture rows ({} skipped), {} groups from {} rows ({} skipped)",
            source.name(),
            students.items.len(),
            lectures.len(),
            students.skip_count(),
            groups.items.len(),
            sessions.len(),
            groups.skip_count()
        );

        let mut report = self.execute(students.items, groups.items)?;
        report.skipped_lectures = students.skipped;
        report.skipped_sessions = groups.skipped;
        Ok(report)
    }

    /// Allocates already-built models.
    ///
    /// Students with `required_hours == 0` take the configured value.
    ///
    /// # Errors
    /// - `InvalidConfig` for unusable parameters.
    /// - `InvalidInput` if the models fail [`validate_input`].
    /// - `CapacityExceeded` if the engine broke its capacity invariant.
    pub fn allocate(
        &self,
        students: Vec<Student>,
        sessions: Vec<SessionGroup>,
    ) -> Result<AllocationReport> {
        self.config.validate()?;
        self.execute(students, sessions)
    }

    fn execute(
        &self,
        mut students: Vec<Student>,
        sessions: Vec<SessionGroup>,
    ) -> Result<AllocationReport> {
        for s in students.iter_mut().filter(|s| s.required_hours == 0) {
            s.required_hours = self.config.required_hours;
        }
        validate_input(&students, &sessions).map_err(Error::InvalidInput)?;

        let mut roster = StudentRoster::new(students);
        let mut registry = SessionRegistry::new(sessions);

        let (demand, supply) = (demand_hours(&roster), supply_hours(&registry));
        info!("demand {}h, supply {}h", demand, supply);
        if supply < demand {
            warn!(
                "supply of {}h cannot cover demand of {}h; some students will fall short",
                supply, demand
            );
        }

        let conflicts = ConflictIndex::build(&roster);
        let greedy = GreedyAllocator::new(&self.config).allocate(&mut roster, &mut registry, &conflicts)?;
        let swaps = SwapImprover::new(&self.config).improve(&mut roster, &mut registry, &conflicts);

        let rows = assemble_rows(&roster, &registry);
        let shortfall = shortfall_report(&roster, self.config.shortfall_preview);
        let kpi = AllocationKpi::calculate(&roster, &registry);

        if !shortfall.is_empty() {
            warn!("{} students are short of their required hours", shortfall.total);
            for entry in &shortfall.preview {
                warn!("  {} {} short by {}h", entry.student_id, entry.name, entry.shortfall);
            }
        }
        info!(
            "allocation done: {} rows, {}/{} students satisfied",
            rows.len(),
            kpi.satisfied_count,
            kpi.student_count
        );

        Ok(AllocationReport {
            rows,
            shortfall,
            kpi,
            greedy,
            swaps,
            skipped_lectures: Vec::new(),
            skipped_sessions: Vec::new(),
            roster,
            registry,
        })
    }
}
