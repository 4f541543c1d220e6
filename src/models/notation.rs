//! Parsers for the week, weekday and period notations found in timetable
//! exports.
//!
//! # Accepted forms
//!
//! | Field | Examples |
//! |-------|----------|
//! | Weeks | `1-6周,8周`, `1~16`, `第3周`, `1-16单`, `2-8(双)`, `6-1` |
//! | Weekday | `3`, `星期三`, `周三`, `礼拜三`, `周日`, `Wed`, `wednesday` |
//! | Periods | `3`, `第3节`, `3-5节`, `3~5`, `第3-5节` |
//!
//! Week items may also be separated by whitespace (`1-4 6-8`); spaces
//! around a range separator are ignored. Weeks are bounded by
//! [`MAX_WEEK`].
//!
//! Reversed week ranges are normalised. Reversed period ranges are not:
//! they are reported as [`ParseError::InvertedPeriod`].

use std::collections::BTreeSet;

use crate::error::ParseError;

/// Highest week number a term can have.
pub const MAX_WEEK: u32 = 60;

const WEEK_SEPARATORS: &[char] = &[',', '，', '、', ';', '；'];
/// Characters that stay glued to their neighbour across whitespace.
const SUFFIX_MARKERS: &[char] = &['周', '单', '双', '(', '（'];
const RANGE_SEPARATORS: &[char] = &['-', '~', '～', '–', '—'];
const ENGLISH_DAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parity {
    All,
    Odd,
    Even,
}

impl Parity {
    fn admits(self, week: u32) -> bool {
        match self {
            Parity::All => true,
            Parity::Odd => week % 2 == 1,
            Parity::Even => week % 2 == 0,
        }
    }
}

/// Parses a week specification into a week set.
///
/// # Errors
/// `InvalidWeeks` for any unreadable item, `EmptyWeeks` if the result
/// has no weeks.
pub fn parse_weeks(raw: &str) -> Result<BTreeSet<u32>, ParseError> {
    let mut weeks = BTreeSet::new();
    let tight = tighten(raw);
    for item in tight.split(|c: char| c == ' ' || WEEK_SEPARATORS.contains(&c)) {
        if item.is_empty() {
            continue;
        }
        parse_week_item(item, &mut weeks)
            .ok_or_else(|| ParseError::InvalidWeeks(item.to_string()))?;
    }
    if weeks.is_empty() {
        Err(ParseError::EmptyWeeks)
    } else {
        Ok(weeks)
    }
}

/// Collapses whitespace runs to one space, dropping them entirely next to
/// a range separator, before a suffix marker or after `第`.
fn tighten(raw: &str) -> String {
    let text = raw.trim();
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            let rest = &text[i..];
            let glued = RANGE_SEPARATORS.contains(&c)
                || SUFFIX_MARKERS.contains(&c)
                || rest.starts_with("odd")
                || rest.starts_with("even")
                || out.ends_with(RANGE_SEPARATORS)
                || out.ends_with('第');
            if !glued {
                out.push(' ');
            }
            pending_space = false;
        }
        out.push(c);
    }
    out
}

fn parse_week_item(item: &str, weeks: &mut BTreeSet<u32>) -> Option<()> {
    let (body, parity) = strip_parity(item);
    let (start, end) = match body.split_once(RANGE_SEPARATORS) {
        Some((a, b)) => (parse_week_number(a)?, parse_week_number(b)?),
        None => {
            let w = parse_week_number(body)?;
            (w, w)
        }
    };
    let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
    weeks.extend((lo..=hi).filter(|w| parity.admits(*w)));
    Some(())
}

fn strip_parity(item: &str) -> (&str, Parity) {
    const MARKERS: [(&str, Parity); 12] = [
        ("(单)", Parity::Odd),
        ("（单）", Parity::Odd),
        ("单周", Parity::Odd),
        ("单", Parity::Odd),
        ("(odd)", Parity::Odd),
        ("odd", Parity::Odd),
        ("(双)", Parity::Even),
        ("（双）", Parity::Even),
        ("双周", Parity::Even),
        ("双", Parity::Even),
        ("(even)", Parity::Even),
        ("even", Parity::Even),
    ];
    for (marker, parity) in MARKERS {
        if let Some(body) = item.strip_suffix(marker) {
            return (body, parity);
        }
    }
    (item, Parity::All)
}

fn parse_week_number(text: &str) -> Option<u32> {
    let text = text.trim_start_matches('第').trim_end_matches('周');
    parse_integral(text).filter(|w| (1..=MAX_WEEK).contains(w))
}

/// Parses an integer, accepting spreadsheet-style floats such as `3.0`.
pub(crate) fn parse_integral(text: &str) -> Option<u32> {
    let text = text.trim();
    if let Ok(n) = text.parse::<u32>() {
        return Some(n);
    }
    let f = text.parse::<f64>().ok()?;
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64).then(|| f as u32)
}

/// Parses a weekday into `1..=7` (Monday = 1).
pub fn parse_weekday(raw: &str) -> Result<u8, ParseError> {
    let text = raw.trim();
    let invalid = || ParseError::InvalidWeekday(text.to_string());

    if let Some(n) = parse_integral(text) {
        return u8::try_from(n)
            .ok()
            .filter(|d| (1..=7).contains(d))
            .ok_or_else(invalid);
    }

    let stripped = ["星期", "礼拜", "周"]
        .iter()
        .find_map(|prefix| text.strip_prefix(prefix));
    if let Some(day) = stripped {
        return match day {
            "一" | "1" => Ok(1),
            "二" | "2" => Ok(2),
            "三" | "3" => Ok(3),
            "四" | "4" => Ok(4),
            "五" | "5" => Ok(5),
            "六" | "6" => Ok(6),
            "日" | "天" | "七" | "7" => Ok(7),
            _ => Err(invalid()),
        };
    }

    let lower = text.to_ascii_lowercase();
    if lower.len() < 3 {
        return Err(invalid());
    }
    ENGLISH_DAYS
        .iter()
        .position(|name| name.starts_with(&lower))
        .map(|i| i as u8 + 1)
        .ok_or_else(invalid)
}

/// Parses a period specification into an inclusive `(start, end)` range.
///
/// The first and last integers in the text bound the range; a single
/// integer yields a one-period range.
pub fn parse_period_range(raw: &str) -> Result<(u32, u32), ParseError> {
    let text = raw.trim();
    let invalid = || ParseError::InvalidPeriod(text.to_string());

    let numbers: Vec<u32> = match parse_integral(text) {
        Some(n) => vec![n],
        None if text.contains('.') || text.starts_with('-') => return Err(invalid()),
        None => text
            .split(|c: char| !c.is_ascii_digit())
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<_, _>>()?,
    };
    let (start, end) = match (numbers.first(), numbers.last()) {
        (Some(&s), Some(&e)) => (s, e),
        _ => return Err(invalid()),
    };
    if start == 0 {
        return Err(invalid());
    }
    if start > end {
        return Err(ParseError::InvertedPeriod { start, end });
    }
    Ok((start, end))
}

/// Renders weeks compactly (`1-6,8`). The output parses back to the same set.
pub fn format_weeks(weeks: &BTreeSet<u32>) -> String {
    let mut parts = Vec::new();
    let mut iter = weeks.iter().copied().peekable();
    while let Some(start) = iter.next() {
        let mut end = start;
        while let Some(next) = end.checked_add(1).filter(|n| iter.peek() == Some(n)) {
            end = next;
            iter.next();
        }
        if start == end {
            parts.push(start.to_string());
        } else {
            parts.push(format!("{start}-{end}"));
        }
    }
    parts.join(",")
}

/// Chinese weekday label (`星期一` … `星期日`).
pub fn weekday_label(weekday: u8) -> String {
    const LABELS: [&str; 7] = ["星期一", "星期二", "星期三", "星期四", "星期五", "星期六", "星期日"];
    LABELS
        .get(usize::from(weekday).wrapping_sub(1))
        .map(|s| s.to_string())
        .unwrap_or_else(|| weekday.to_string())
}
