//! Error taxonomy for document parsing, date conversion and dialect loading.
//!
//! None of these escape `load_document`: parse and conversion failures are
//! turned into [`Diagnostic`]s and the offending item is dropped.

use std::fmt;
use std::path::PathBuf;

use calendar_types::DiagnosticRecord;
use thiserror::Error;

/// Which of the two document sections a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Eras,
    Events,
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eras => f.write_str("eras"),
            Self::Events => f.write_str("events"),
        }
    }
}

// ── Date conversion ──────────────────────────────────────────────────────

/// Why a date string could not be turned into a day index (or back).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidDate {
    /// Text does not follow the dialect's date grammar
    #[error("malformed date: {0:?}")]
    MalformedText(String),

    #[error("unknown day name {0:?}")]
    UnknownDayName(String),

    #[error("unknown month name {0:?}")]
    UnknownMonthName(String),

    /// No era with this number in the loaded table
    #[error("unknown era {0}")]
    UnknownEra(u32),

    #[error("year {year} is outside era {era} (years {start} to {end})")]
    YearOutOfRange {
        year: u32,
        era: u32,
        start: u32,
        end: u32,
    },

    #[error("day {day} is outside 1..={days_per_month}")]
    DayOutOfRange { day: u32, days_per_month: u32 },

    /// Month index past the dialect's month list
    #[error("month index {month} is outside 0..{months_per_year}")]
    MonthOutOfRange { month: usize, months_per_year: u32 },

    /// Weekday index past the dialect's day names
    #[error("weekday index {weekday} is outside 0..{days_per_week}")]
    WeekdayOutOfRange { weekday: usize, days_per_week: u32 },

    /// Only raised under `WeekdayPolicy::Derived`
    #[error("day name {found:?} does not match the computed weekday {expected:?}")]
    WeekdayMismatch { found: String, expected: String },

    #[error("day index {index} is beyond the known calendar ({total} days)")]
    IndexOutOfKnownRange { index: u64, total: u64 },
}

impl InvalidDate {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedText(_) => "malformed_date",
            Self::UnknownDayName(_) => "unknown_day_name",
            Self::UnknownMonthName(_) => "unknown_month_name",
            Self::UnknownEra(_) => "unknown_era",
            Self::YearOutOfRange { .. } => "year_out_of_range",
            Self::DayOutOfRange { .. } => "day_out_of_range",
            Self::MonthOutOfRange { .. } => "month_out_of_range",
            Self::WeekdayOutOfRange { .. } => "weekday_out_of_range",
            Self::WeekdayMismatch { .. } => "weekday_mismatch",
            Self::IndexOutOfKnownRange { .. } => "index_out_of_known_range",
        }
    }
}

// ── Document parsing ─────────────────────────────────────────────────────

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no {section} section found")]
    SectionNotFound { section: SectionKind },

    /// A bullet line that does not have the expected shape
    #[error("line {line}: malformed entry {text:?}")]
    MalformedText { line: usize, text: String },

    #[error("line {line}: era {number} is already defined")]
    DuplicateEra { number: u32, line: usize },

    #[error("line {line}: era {number} ends (year {end}) before it starts (year {start})")]
    InvertedEraRange {
        number: u32,
        start: u32,
        end: u32,
        line: usize,
    },

    /// An event was dropped because its date did not convert
    #[error("line {line}: event dated {date:?} dropped: {source}")]
    InvalidDate {
        line: usize,
        date: String,
        #[source]
        source: InvalidDate,
    },
}

impl ParseError {
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::SectionNotFound { .. } => None,
            Self::MalformedText { line, .. }
            | Self::DuplicateEra { line, .. }
            | Self::InvertedEraRange { line, .. }
            | Self::InvalidDate { line, .. } => Some(*line),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::SectionNotFound { .. } => "section_not_found",
            Self::MalformedText { .. } => "malformed_text",
            Self::DuplicateEra { .. } => "duplicate_era",
            Self::InvertedEraRange { .. } => "inverted_era_range",
            Self::InvalidDate { source, .. } => source.kind(),
        }
    }
}

/// A non-fatal problem recorded while loading a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub error: ParseError,
}

impl Diagnostic {
    pub fn line(&self) -> Option<usize> {
        self.error.line()
    }

    pub fn to_record(&self) -> DiagnosticRecord {
        DiagnosticRecord {
            line: self.error.line(),
            kind: self.error.kind().to_string(),
            message: self.error.to_string(),
        }
    }
}

impl From<ParseError> for Diagnostic {
    fn from(error: ParseError) -> Self {
        Self { error }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

// ── Dialect configuration ────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read dialect file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid dialect TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid dialect: {0}")]
    Invalid(String),

    #[error("dialect produced an invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_date_kind_carried_through() {
        let err = ParseError::InvalidDate {
            line: 12,
            date: "1 Clar de Massié, Année 1 du 9 âge".to_string(),
            source: InvalidDate::UnknownEra(9),
        };
        assert_eq!(err.kind(), "unknown_era");
        assert_eq!(err.line(), Some(12));
        assert!(err.to_string().contains("unknown era 9"));
    }

    #[test]
    fn test_section_not_found_has_no_line() {
        let diag = Diagnostic::from(ParseError::SectionNotFound {
            section: SectionKind::Events,
        });
        let rec = diag.to_record();
        assert_eq!(rec.line, None);
        assert_eq!(rec.kind, "section_not_found");
        assert_eq!(rec.message, "no events section found");
    }
}
