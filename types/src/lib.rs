use serde::{Deserialize, Serialize};

// ── Era ──────────────────────────────────────────────────────────────────

/// One row of the era table ("Âges"), in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Era {
    /// Era identifier as written in the document (`3e âge` → 3).
    pub number: u32,
    pub start_year: u32,
    /// Inclusive.
    pub end_year: u32,
    /// 1-based source line of the era bullet.
    #[serde(default)]
    pub line: usize,
}

impl Era {
    /// Number of years in the era, both bounds included. Widened so that
    /// an era spanning every `u32` year still counts.
    pub fn duration_years(&self) -> u64 {
        (u64::from(self.end_year) + 1).saturating_sub(u64::from(self.start_year))
    }

    pub fn contains_year(&self, year: u32) -> bool {
        (self.start_year..=self.end_year).contains(&year)
    }

    /// Total number of days covered by this era for a given year length.
    pub fn span_days(&self, days_per_year: u64) -> u64 {
        self.duration_years().saturating_mul(days_per_year)
    }
}

// ── Event ────────────────────────────────────────────────────────────────

/// An event whose date was resolved to a day index.
///
/// Events whose date failed to convert never become a `CalendarEvent`;
/// they only show up as diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Date expression exactly as authored, e.g. "3 Clar de Massié, Année 30 du 7e âge"
    pub raw_date_text: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Era number read from the date text alone, 0 when absent.
    pub era_number: u32,
    /// Days since the first day of the first era in table order.
    pub day_index: u64,
    /// 1-based source line of the event bullet.
    #[serde(default)]
    pub line: usize,
}

// ── Diagnostics ──────────────────────────────────────────────────────────

/// Flattened, serialisable form of a non-fatal load problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Stable machine-readable code, e.g. "unknown_era".
    pub kind: String,
    pub message: String,
}

// ── JSON output format ─────────────────────────────────────────────────

/// Everything one document load produced, as handed to renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub eras: Vec<Era>,
    pub events: Vec<CalendarEvent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<DiagnosticRecord>,
    /// Days covered by the era table.
    pub total_days: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn era(number: u32, start_year: u32, end_year: u32) -> Era {
        Era {
            number,
            start_year,
            end_year,
            line: 0,
        }
    }

    #[test]
    fn test_duration_is_inclusive() {
        assert_eq!(era(1, 1, 10).duration_years(), 10);
        assert_eq!(era(2, 7, 7).duration_years(), 1);
    }

    #[test]
    fn test_contains_year_bounds() {
        let e = era(3, 5, 9);
        assert!(!e.contains_year(4));
        assert!(e.contains_year(5));
        assert!(e.contains_year(9));
        assert!(!e.contains_year(10));
    }

    #[test]
    fn test_span_days() {
        assert_eq!(era(1, 1, 10).span_days(420), 4200);
    }

    #[test]
    fn test_full_u32_range() {
        let e = era(1, 0, u32::MAX);
        assert_eq!(e.duration_years(), 1 << 32);
        assert_eq!(e.span_days(476), (1u64 << 32) * 476);
        assert!(e.contains_year(u32::MAX));
    }

    #[test]
    fn test_event_description_omitted_when_empty() {
        let ev = CalendarEvent {
            raw_date_text: "1 Clar de Massié, Année 1 du 1 âge".to_string(),
            title: "Fondation".to_string(),
            description: String::new(),
            era_number: 1,
            day_index: 0,
            line: 4,
        };
        let json = serde_json::to_string(&ev).unwrap();
        assert!(!json.contains("description"));
        assert!(json.contains("\"day_index\":0"));
    }

    #[test]
    fn test_diagnostic_line_optional() {
        let rec = DiagnosticRecord {
            line: None,
            kind: "section_not_found".to_string(),
            message: "section not found".to_string(),
        };
        let json = serde_json::to_string(&rec).unwrap();
        assert!(!json.contains("line"));
    }
}
