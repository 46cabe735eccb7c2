//! Loaded-document state: immutable snapshots and the session that
//! publishes them.

use std::sync::{Arc, PoisonError, RwLock};

use calendar_types::{CalendarEvent, Era, SnapshotRecord};
use tracing::info;

use crate::calendar::Calendar;
use crate::dialect::CalendarDialect;
use crate::error::{Diagnostic, InvalidDate, ParseError, SectionKind};
use crate::parser::DocumentParser;
use crate::sections::split_sections;

/// The complete result of one document load: era table, converted events
/// and diagnostics. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct CalendarSnapshot {
    dialect: Arc<CalendarDialect>,
    eras: Vec<Era>,
    events: Vec<CalendarEvent>,
    diagnostics: Vec<Diagnostic>,
}

/// Parse a calendar document. Never fails: problems end up in
/// [`CalendarSnapshot::diagnostics`] and the affected items are left out.
pub fn load_document(text: &str, dialect: Arc<CalendarDialect>) -> CalendarSnapshot {
    let sections = split_sections(text);
    let parser = DocumentParser::new(&dialect);

    let eras = parser.eras_from(&sections);
    let events = parser.events_from(&sections, &eras.items);

    let mut diagnostics = eras.diagnostics;
    diagnostics.extend(events.diagnostics);

    info!(
        eras = eras.items.len(),
        events = events.items.len(),
        diagnostics = diagnostics.len(),
        "calendar document loaded"
    );

    CalendarSnapshot {
        eras: eras.items,
        events: events.items,
        diagnostics,
        dialect,
    }
}

impl CalendarSnapshot {
    /// A snapshot with no eras and no events.
    pub fn empty(dialect: Arc<CalendarDialect>) -> Self {
        Self {
            dialect,
            eras: Vec::new(),
            events: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn dialect(&self) -> &CalendarDialect {
        &self.dialect
    }

    pub fn eras(&self) -> &[Era] {
        &self.eras
    }

    /// Events whose date converted, in document order.
    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn calendar(&self) -> Calendar<'_> {
        Calendar::new(&self.dialect, &self.eras)
    }

    /// Canonical date for a day index; the unknown-date text past the end.
    pub fn format_index(&self, index: u64) -> String {
        self.calendar().index_to_date(index)
    }

    /// Convert a user-entered date against this snapshot's era table.
    pub fn parse_date(&self, text: &str) -> Result<u64, InvalidDate> {
        self.calendar().date_to_index(text)
    }

    /// Year-level label for axis ticks.
    pub fn axis_label(&self, index: u64) -> String {
        self.calendar().year_label(index)
    }

    pub fn total_days(&self) -> u64 {
        self.calendar().total_days()
    }

    /// Smallest and largest event index, if there are events.
    pub fn event_extent(&self) -> Option<(u64, u64)> {
        let min = self.events.iter().map(|e| e.day_index).min()?;
        let max = self.events.iter().map(|e| e.day_index).max()?;
        Some((min, max))
    }

    pub fn events_in_era(&self, number: u32) -> impl Iterator<Item = &CalendarEvent> {
        self.events.iter().filter(move |e| e.era_number == number)
    }

    /// Events sorted by day index; same-day events keep document order.
    pub fn chronological(&self) -> Vec<&CalendarEvent> {
        let mut sorted: Vec<&CalendarEvent> = self.events.iter().collect();
        sorted.sort_by_key(|e| e.day_index);
        sorted
    }

    /// Whether loading reported this section as absent.
    pub fn missing_section(&self, section: SectionKind) -> bool {
        self.diagnostics.iter().any(|d| {
            matches!(&d.error, ParseError::SectionNotFound { section: s } if *s == section)
        })
    }

    pub fn to_record(&self) -> SnapshotRecord {
        SnapshotRecord {
            eras: self.eras.clone(),
            events: self.events.clone(),
            diagnostics: self.diagnostics.iter().map(Diagnostic::to_record).collect(),
            total_days: self.total_days(),
        }
    }
}

// ── Session ──────────────────────────────────────────────────────────────

/// Holds the currently published snapshot for one document.
///
/// Readers take a cheap `Arc` clone and keep working on it even while a
/// reload publishes a newer snapshot.
#[derive(Debug)]
pub struct CalendarSession {
    dialect: Arc<CalendarDialect>,
    current: RwLock<Arc<CalendarSnapshot>>,
}

impl CalendarSession {
    pub fn new(dialect: Arc<CalendarDialect>) -> Self {
        let empty = Arc::new(CalendarSnapshot::empty(dialect.clone()));
        Self {
            dialect,
            current: RwLock::new(empty),
        }
    }

    pub fn current(&self) -> Arc<CalendarSnapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Parse `text` and publish the result.
    ///
    /// A document without an era section is refused and the previous
    /// snapshot stays published.
    pub fn reload(&self, text: &str) -> Result<Arc<CalendarSnapshot>, ParseError> {
        let snapshot = load_document(text, self.dialect.clone());
        if snapshot.missing_section(SectionKind::Eras) {
            return Err(ParseError::SectionNotFound {
                section: SectionKind::Eras,
            });
        }

        let snapshot = Arc::new(snapshot);
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = snapshot.clone();
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
## Âges
- **1er âge**: Année 1 à Année 10
- **2e âge**: Année 1 à Année 5

## Événements
- **5 Clar de Rasser, Année 2 du 2e âge**: Couronnement
  - Description: Le roi est couronné.
- **1 Clar de Massié, Année 1 du 1er âge**: Aube
  - Description: Le commencement.
- **1 Clar de Massié, Année 1 du 7e âge**: Prophétie
  - Description: Un âge qui n'existe pas.
- **1 Clar de Massié, Année 1 du 1er âge**: Aube bis
  - Description: Même jour.
";

    fn dialect() -> Arc<CalendarDialect> {
        Arc::new(CalendarDialect::default())
    }

    #[test]
    fn test_load_document() {
        let snap = load_document(DOC, dialect());
        assert_eq!(snap.eras().len(), 2);
        assert_eq!(snap.events().len(), 3);
        assert_eq!(snap.diagnostics().len(), 1);
        assert_eq!(snap.diagnostics()[0].error.kind(), "unknown_era");
        assert_eq!(snap.total_days(), 15 * 476);
    }

    #[test]
    fn test_format_and_parse_through_snapshot() {
        let snap = load_document(DOC, dialect());
        let idx = snap.parse_date("5 Clar de Rasser, Année 2 du 2e âge").unwrap();
        assert_eq!(idx, 10 * 476 + 476 + 28 + 4);
        assert_eq!(snap.format_index(idx), "5 Flok de Rasser, Année 2 du 2 âge");
        assert_eq!(snap.format_index(999_999_999), "Date inconnue");
        assert_eq!(snap.axis_label(idx), "Année 2 du 2 âge");
        assert_eq!(
            snap.parse_date("5 Clar de Rasser, Année 9 du 2e âge"),
            Err(InvalidDate::YearOutOfRange {
                year: 9,
                era: 2,
                start: 1,
                end: 5
            })
        );
    }

    #[test]
    fn test_chronological_and_extent() {
        let snap = load_document(DOC, dialect());
        let titles: Vec<&str> = snap.chronological().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Aube", "Aube bis", "Couronnement"]);
        assert_eq!(snap.event_extent(), Some((0, 10 * 476 + 476 + 28 + 4)));
        assert_eq!(snap.events_in_era(1).count(), 2);
        assert_eq!(snap.events_in_era(7).count(), 0);
    }

    #[test]
    fn test_missing_events_section() {
        let snap = load_document("## Âges\n- **1er âge**: Année 1 à Année 10\n", dialect());
        assert_eq!(snap.eras().len(), 1);
        assert!(snap.events().is_empty());
        assert!(snap.missing_section(SectionKind::Events));
        assert!(!snap.missing_section(SectionKind::Eras));
        assert_eq!(snap.event_extent(), None);
    }

    #[test]
    fn test_era_spanning_every_year() {
        let doc = "\
## Âges
- **1er âge**: Année 0 à Année 4294967295
- **2e âge**: Année 1 à Année 5
## Événements
- **1 Clar de Massié, Année 1 du 2e âge**: Après l'éternité
  - Description: Le deuxième âge commence.
";
        let snap = load_document(doc, dialect());
        assert!(snap.diagnostics().is_empty(), "{:?}", snap.diagnostics());
        assert_eq!(snap.eras()[0].duration_years(), 1 << 32);
        assert_eq!(snap.events()[0].day_index, (1u64 << 32) * 476);
        assert_eq!(snap.total_days(), ((1u64 << 32) + 5) * 476);
        assert_eq!(
            snap.format_index(snap.events()[0].day_index),
            "1 Clar de Massié, Année 1 du 2 âge"
        );
    }

    #[test]
    fn test_garbage_document_never_fails() {
        let snap = load_document("\u{0}\n## \n- **\n**:", dialect());
        assert!(snap.eras().is_empty());
        assert!(snap.events().is_empty());
        assert!(snap.missing_section(SectionKind::Eras));
        assert!(snap.missing_section(SectionKind::Events));
    }

    #[test]
    fn test_record_serialises() {
        let snap = load_document(DOC, dialect());
        let json = serde_json::to_string(&snap.to_record()).unwrap();
        let back: SnapshotRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.events.len(), 3);
        assert_eq!(back.diagnostics[0].kind, "unknown_era");
        assert_eq!(back.diagnostics[0].line, Some(10));
    }

    // ── Session ──────────────────────────────────────────────────────

    #[test]
    fn test_session_reload_publishes() {
        let session = CalendarSession::new(dialect());
        assert!(session.current().eras().is_empty());

        let published = session.reload(DOC).unwrap();
        assert_eq!(published.events().len(), 3);
        assert!(Arc::ptr_eq(&published, &session.current()));
    }

    #[test]
    fn test_session_keeps_old_snapshot_on_missing_eras() {
        let session = CalendarSession::new(dialect());
        let first = session.reload(DOC).unwrap();
        let err = session.reload("## Événements\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::SectionNotFound {
                section: SectionKind::Eras
            }
        );
        assert!(Arc::ptr_eq(&first, &session.current()));
    }

    #[test]
    fn test_session_readers_keep_their_snapshot() {
        let session = Arc::new(CalendarSession::new(dialect()));
        session.reload(DOC).unwrap();
        let held = session.current();

        let writer = {
            let session = Arc::clone(&session);
            std::thread::spawn(move || {
                session
                    .reload("## Âges\n- **1er âge**: Année 1 à Année 2\n")
                    .unwrap()
            })
        };
        let newer = writer.join().unwrap();

        assert_eq!(held.events().len(), 3);
        assert_eq!(newer.eras().len(), 1);
        assert_eq!(session.current().eras().len(), 1);
    }
}
