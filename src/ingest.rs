//! Raw record types and their conversion into models.
//!
//! Records mirror spreadsheet rows: most fields are optional and may hold
//! text or numbers. Field names accept both English keys and the spreadsheet
//! column headers (`学号`, `上课周次`, ...). Conversion never fails as a
//! whole; bad rows are dropped and reported as [`SkippedRecord`]s.

use std::collections::{HashMap, HashSet};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, SkippedRecord};
use crate::models::{
    parse_integral, parse_period_range, parse_weekday, parse_weeks, SessionGroup, Student, TimeSlot,
};

/// A cell value that may be text or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawValue {
    /// Cell contents as trimmed text. Whole floats print without a fraction.
    pub fn as_text(&self) -> String {
        match self {
            Self::Int(n) => n.to_string(),
            Self::Float(f) if f.is_finite() && f.fract() == 0.0 => format!("{}", *f as i64),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.trim().to_string(),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for RawValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

/// One lecture occurrence of one student.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LectureRecord {
    #[serde(alias = "学号")]
    pub student_id: Option<RawValue>,
    #[serde(alias = "姓名（可能有重名）", alias = "姓名")]
    pub name: Option<String>,
    #[serde(alias = "院系名称")]
    pub faculty: Option<String>,
    #[serde(alias = "专业名称")]
    pub major: Option<String>,
    #[serde(alias = "班级名称")]
    pub class_name: Option<String>,
    #[serde(alias = "周次")]
    pub weeks: Option<RawValue>,
    #[serde(alias = "上课星期")]
    pub weekday: Option<RawValue>,
    #[serde(alias = "上课节次")]
    pub periods: Option<RawValue>,
}

/// One offered lab group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionRecord {
    #[serde(alias = "实验组名称")]
    pub session_id: Option<RawValue>,
    #[serde(alias = "实验项目名称")]
    pub experiment_name: Option<String>,
    #[serde(alias = "上课教师")]
    pub instructor: Option<String>,
    #[serde(alias = "实验人数")]
    pub capacity: Option<RawValue>,
    #[serde(alias = "课时")]
    pub credit_hours: Option<RawValue>,
    #[serde(alias = "上课周次")]
    pub weeks: Option<RawValue>,
    #[serde(alias = "上课星期")]
    pub weekday: Option<RawValue>,
    #[serde(alias = "开始节次")]
    pub period_start: Option<RawValue>,
    #[serde(alias = "结束节次")]
    pub period_end: Option<RawValue>,
}

/// Converted models plus the rows that were dropped.
#[derive(Debug, Clone)]
pub struct Ingested<T> {
    pub items: Vec<T>,
    pub skipped: Vec<SkippedRecord>,
}

impl<T> Ingested<T> {
    pub fn skip_count(&self) -> usize {
        self.skipped.len()
    }
}

fn text(value: &Option<RawValue>) -> Option<String> {
    value
        .as_ref()
        .map(RawValue::as_text)
        .filter(|s| !s.is_empty())
}

fn required(value: &Option<RawValue>, field: &'static str) -> Result<String, ParseError> {
    text(value).ok_or(ParseError::MissingField(field))
}

fn plain(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

fn positive(value: &Option<RawValue>, field: &'static str) -> Result<u32, ParseError> {
    let raw = required(value, field)?;
    let n = parse_integral(&raw).ok_or_else(|| ParseError::InvalidNumber {
        field,
        value: raw.clone(),
    })?;
    if n == 0 {
        return Err(ParseError::NonPositive(field));
    }
    Ok(n)
}

fn lecture_slot(record: &LectureRecord) -> Result<TimeSlot, ParseError> {
    let weeks = required(&record.weeks, "weeks")?;
    let weekday = required(&record.weekday, "weekday")?;
    let periods = required(&record.periods, "periods")?;
    TimeSlot::from_raw(&weeks, &weekday, &periods)
}

/// Builds students from lecture rows.
///
/// Rows are grouped per student id in first-appearance order; the first
/// row supplies the identity fields. A row whose time fields are malformed
/// is skipped, but its student is still registered. Rows without an id are
/// skipped entirely.
pub fn ingest_students(records: &[LectureRecord], required_hours: u32) -> Ingested<Student> {
    let mut students: Vec<Student> = Vec::new();
    let mut by_id: HashMap<String, usize> = HashMap::new();
    let mut skipped = Vec::new();

    for (i, record) in records.iter().enumerate() {
        let row = i + 1;
        let id = match required(&record.student_id, "student_id") {
            Ok(id) => id,
            Err(e) => {
                skipped.push(SkippedRecord::new(row, e));
                continue;
            }
        };
        let pos = *by_id.entry(id.clone()).or_insert_with(|| {
            students.push(
                Student::new(id)
                    .with_name(plain(&record.name))
                    .with_affiliation(
                        plain(&record.faculty),
                        plain(&record.major),
                        plain(&record.class_name),
                    )
                    .with_required_hours(required_hours),
            );
            students.len() - 1
        });

        match lecture_slot(record) {
            Ok(slot) => students[pos].busy_slots.push(slot),
            Err(e) => skipped.push(SkippedRecord::new(row, e)),
        }
    }

    for skip in &skipped {
        warn!("lecture row {} skipped: {}", skip.row, skip.reason);
    }
    Ingested {
        items: students,
        skipped,
    }
}

fn session_from_record(record: &SessionRecord, row: usize) -> Result<SessionGroup, ParseError> {
    let id = text(&record.session_id).unwrap_or_else(|| row.to_string());
    let weeks = required(&record.weeks, "weeks")?;
    let weekday = required(&record.weekday, "weekday")?;
    let (start, _) = parse_period_range(&required(&record.period_start, "period_start")?)?;
    let (_, end) = parse_period_range(&required(&record.period_end, "period_end")?)?;
    let occupation = TimeSlot::new(parse_weeks(&weeks)?, parse_weekday(&weekday)?, start, end)?;

    Ok(SessionGroup::new(id, occupation)
        .with_experiment(plain(&record.experiment_name))
        .with_instructor(plain(&record.instructor))
        .with_capacity(positive(&record.capacity, "capacity")?)
        .with_credit_hours(positive(&record.credit_hours, "credit_hours")?))
}

/// Builds lab groups from session rows.
///
/// A missing id falls back to the 1-based row number. Malformed rows,
/// non-positive capacity or credit hours, and repeated ids are skipped.
pub fn ingest_sessions(records: &[SessionRecord]) -> Ingested<SessionGroup> {
    let mut groups = Vec::new();
    let mut seen = HashSet::new();
    let mut skipped = Vec::new();

    for (i, record) in records.iter().enumerate() {
        let row = i + 1;
        match session_from_record(record, row) {
            Ok(group) if !seen.insert(group.id.clone()) => {
                skipped.push(SkippedRecord::new(row, ParseError::DuplicateId(group.id)));
            }
            Ok(group) => groups.push(group),
            Err(e) => skipped.push(SkippedRecord::new(row, e)),
        }
    }

    for skip in &skipped {
        warn!("session row {} skipped: {}", skip.row, skip.reason);
    }
    Ingested {
        items: groups,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lecture(id: &str, weeks: &str, weekday: &str, periods: &str) -> LectureRecord {
        LectureRecord {
            student_id: Some(id.into()),
            name: Some(format!("name-{id}")),
            faculty: Some("Science".into()),
            major: Some("Physics".into()),
            class_name: Some("P1".into()),
            weeks: Some(weeks.into()),
            weekday: Some(weekday.into()),
            periods: Some(periods.into()),
        }
    }

    fn session(id: Option<&str>, start: &str, end: &str) -> SessionRecord {
        SessionRecord {
            session_id: id.map(RawValue::from),
            experiment_name: Some("Optics".into()),
            instructor: Some("Chen".into()),
            capacity: Some(RawValue::Int(20)),
            credit_hours: Some(RawValue::Float(4.0)),
            weeks: Some("1-8".into()),
            weekday: Some(RawValue::Int(3)),
            period_start: Some(start.into()),
            period_end: Some(end.into()),
        }
    }

    #[test]
    fn test_raw_value_text() {
        assert_eq!(RawValue::Int(7).as_text(), "7");
        assert_eq!(RawValue::Float(3.0).as_text(), "3");
        assert_eq!(RawValue::Text("  周三 ".into()).as_text(), "周三");
    }

    #[test]
    fn test_students_grouped_in_first_appearance_order() {
        let records = vec![
            lecture("b", "1-16", "星期一", "1-2节"),
            lecture("a", "1-8", "2", "3-4"),
            lecture("b", "9-16", "Wed", "第5节"),
        ];
        let out = ingest_students(&records, 30);
        assert_eq!(out.skip_count(), 0);
        let ids: Vec<&str> = out.items.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(out.items[0].busy_slots.len(), 2);
        assert_eq!(out.items[0].name, "name-b");
        assert_eq!(out.items[0].required_hours, 30);
    }

    #[test]
    fn test_bad_lecture_rows_skipped() {
        let mut no_id = lecture("x", "1", "1", "1");
        no_id.student_id = None;
        let records = vec![
            lecture("a", "1-8", "1", "5-3"),
            no_id,
            lecture("a", "1-8", "1", "1-2"),
        ];
        let out = ingest_students(&records, 30);
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.items[0].busy_slots.len(), 1);
        assert_eq!(out.skip_count(), 2);
        assert_eq!(
            out.skipped[0],
            SkippedRecord::new(1, ParseError::InvertedPeriod { start: 5, end: 3 })
        );
        assert_eq!(
            out.skipped[1],
            SkippedRecord::new(2, ParseError::MissingField("student_id"))
        );
    }

    #[test]
    fn test_sessions_ingested() {
        let out = ingest_sessions(&[session(Some("G1"), "5", "8"), session(None, "1", "2")]);
        assert_eq!(out.skip_count(), 0);
        assert_eq!(out.items[0].id, "G1");
        assert_eq!(out.items[0].capacity, 20);
        assert_eq!(out.items[0].credit_hours, 4);
        assert_eq!(out.items[0].occupation.period_start(), 5);
        assert_eq!(out.items[0].occupation.period_end(), 8);
        // Row-number fallback
        assert_eq!(out.items[1].id, "2");
    }

    #[test]
    fn test_inverted_session_row_skipped() {
        let out = ingest_sessions(&[session(Some("G1"), "8", "5"), session(Some("G2"), "1", "2")]);
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.skip_count(), 1);
        assert_eq!(
            out.skipped[0].reason,
            ParseError::InvertedPeriod { start: 8, end: 5 }
        );
    }

    #[test]
    fn test_out_of_term_weeks_skipped() {
        let mut huge = session(Some("G1"), "1", "2");
        huge.weeks = Some("4294967295".into());
        let mut wide = session(Some("G2"), "1", "2");
        wide.weeks = Some("1-4000000000".into());
        let out = ingest_sessions(&[huge, wide, session(Some("G3"), "1", "2")]);
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.items[0].id, "G3");
        assert_eq!(
            out.skipped[0],
            SkippedRecord::new(1, ParseError::InvalidWeeks("4294967295".into()))
        );
        assert_eq!(
            out.skipped[1],
            SkippedRecord::new(2, ParseError::InvalidWeeks("1-4000000000".into()))
        );

        let students = ingest_students(&[lecture("a", "1 3", "1", "1-2")], 30);
        let weeks: Vec<u32> = students.items[0].busy_slots[0].weeks().iter().copied().collect();
        assert_eq!(weeks, vec![1, 3]);
    }

    #[test]
    fn test_session_numbers_and_duplicates() {
        let mut zero = session(Some("Z"), "1", "2");
        zero.capacity = Some(RawValue::Int(0));
        let mut junk = session(Some("J"), "1", "2");
        junk.credit_hours = Some("four".into());
        let out = ingest_sessions(&[
            session(Some("G1"), "1", "2"),
            session(Some("G1"), "3", "4"),
            zero,
            junk,
        ]);
        assert_eq!(out.items.len(), 1);
        let reasons: Vec<ParseError> = out.skipped.into_iter().map(|s| s.reason).collect();
        assert_eq!(
            reasons,
            vec![
                ParseError::DuplicateId("G1".into()),
                ParseError::NonPositive("capacity"),
                ParseError::InvalidNumber {
                    field: "credit_hours",
                    value: "four".into()
                },
            ]
        );
    }

    #[test]
    fn test_records_from_spreadsheet_headers() {
        let json = r#"[{"学号": 2024001, "姓名（可能有重名）": "李", "班级名称": "P1",
                        "周次": "1-16周", "上课星期": "星期二", "上课节次": "3-4节"}]"#;
        let records: Vec<LectureRecord> = serde_json::from_str(json).unwrap();
        let out = ingest_students(&records, 30);
        assert_eq!(out.items[0].id, "2024001");
        assert_eq!(out.items[0].class_name, "P1");
        assert_eq!(out.items[0].busy_slots[0].weekday(), 2);
    }
}
