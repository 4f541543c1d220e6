//! Record sources feeding a run.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::ingest::{LectureRecord, SessionRecord};

/// Supplies raw lecture and lab records.
///
/// Implementations fail with `SourceUnreadable` when the data cannot be
/// obtained at all. Individual bad records are not their concern.
pub trait RecordSource {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Lecture rows (one per student per lecture occurrence).
    fn lectures(&self) -> Result<Vec<LectureRecord>>;

    /// Lab group rows.
    fn sessions(&self) -> Result<Vec<SessionRecord>>;
}

/// Reads two JSON files, each holding an array of records.
#[derive(Debug, Clone)]
pub struct JsonSource {
    lectures: PathBuf,
    sessions: PathBuf,
}

impl JsonSource {
    pub fn new(lectures: impl Into<PathBuf>, sessions: impl Into<PathBuf>) -> Self {
        Self {
            lectures: lectures.into(),
            sessions: sessions.into(),
        }
    }

    fn read<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        let unreadable = |reason: String| Error::SourceUnreadable {
            source_name: path.display().to_string(),
            reason,
        };
        let text = fs::read_to_string(path).map_err(|e| unreadable(e.to_string()))?;
        let records: Vec<T> = serde_json::from_str(&text).map_err(|e| unreadable(e.to_string()))?;
        info!("read {} records from {}", records.len(), path.display());
        Ok(records)
    }
}

impl RecordSource for JsonSource {
    fn name(&self) -> &str {
        "json"
    }

    fn lectures(&self) -> Result<Vec<LectureRecord>> {
        self.read(&self.lectures)
    }

    fn sessions(&self) -> Result<Vec<SessionRecord>> {
        self.read(&self.sessions)
    }
}

/// Records already held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub lectures: Vec<LectureRecord>,
    pub sessions: Vec<SessionRecord>,
}

impl MemorySource {
    pub fn new(lectures: Vec<LectureRecord>, sessions: Vec<SessionRecord>) -> Self {
        Self { lectures, sessions }
    }
}

impl RecordSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn lectures(&self) -> Result<Vec<LectureRecord>> {
        Ok(self.lectures.clone())
    }

    fn sessions(&self) -> Result<Vec<SessionRecord>> {
        Ok(self.sessions.clone())
    }
}
