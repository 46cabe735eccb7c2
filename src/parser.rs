use std::collections::HashSet;

use calendar_types::{CalendarEvent, Era};
use tracing::{debug, warn};

use crate::calendar::Calendar;
use crate::dialect::CalendarDialect;
use crate::error::{Diagnostic, ParseError, SectionKind};
use crate::matcher::{EraLine, EventLine};
use crate::sections::{Section, find_section, split_sections};

/// Items extracted from one section, plus what went wrong along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed<T> {
    pub items: Vec<T>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Default for Parsed<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            diagnostics: Vec::new(),
        }
    }
}

// ── Document shape ─────────────────────────────────────────────────
//
// Real data examples:
//   ## Âges
//   - **1er âge**: Année 1 à Année 1200
//   - **2e âge**: Année 1 à Année 340
//
//   ## Événements
//   - **3 Clar de Massié, Année 30 du 2e âge**: La chute de Vorn
//     - Description: Les murailles cèdent
//       après un siège de trois ans.

/// Extracts the era table and the event list from a calendar document.
pub struct DocumentParser<'d> {
    dialect: &'d CalendarDialect,
}

impl<'d> DocumentParser<'d> {
    pub fn new(dialect: &'d CalendarDialect) -> Self {
        Self { dialect }
    }

    /// Era table in document order. A missing section gives an empty table.
    pub fn parse_eras(&self, text: &str) -> Parsed<Era> {
        self.eras_from(&split_sections(text))
    }

    /// Events whose date converts against `eras`; the rest are dropped and
    /// reported.
    pub fn parse_events(&self, text: &str, eras: &[Era]) -> Parsed<CalendarEvent> {
        self.events_from(&split_sections(text), eras)
    }

    pub(crate) fn eras_from(&self, sections: &[Section<'_>]) -> Parsed<Era> {
        let vocabulary = self.dialect.vocabulary();
        let Some(section) = find_section(sections, &vocabulary.era_headings) else {
            warn!(headings = ?vocabulary.era_headings, "no era section in document");
            return Parsed {
                items: Vec::new(),
                diagnostics: vec![
                    ParseError::SectionNotFound {
                        section: SectionKind::Eras,
                    }
                    .into(),
                ],
            };
        };

        let matcher = self.dialect.matcher();
        let mut out = Parsed::default();
        let mut seen = HashSet::new();

        for &(line, text) in &section.lines {
            let raw = match matcher.era_line(text) {
                EraLine::Parsed(raw) => raw,
                EraLine::Malformed => {
                    out.diagnostics.push(malformed(line, text));
                    continue;
                }
                EraLine::Ignored => continue,
            };

            if raw.number == 0 {
                out.diagnostics.push(malformed(line, text));
                continue;
            }
            if raw.end_year < raw.start_year {
                out.diagnostics.push(
                    ParseError::InvertedEraRange {
                        number: raw.number,
                        start: raw.start_year,
                        end: raw.end_year,
                        line,
                    }
                    .into(),
                );
                continue;
            }
            if !seen.insert(raw.number) {
                out.diagnostics.push(
                    ParseError::DuplicateEra {
                        number: raw.number,
                        line,
                    }
                    .into(),
                );
                continue;
            }

            out.items.push(Era {
                number: raw.number,
                start_year: raw.start_year,
                end_year: raw.end_year,
                line,
            });
        }

        for d in &out.diagnostics {
            debug!(%d, "era entry skipped");
        }
        out
    }

    pub(crate) fn events_from(
        &self,
        sections: &[Section<'_>],
        eras: &[Era],
    ) -> Parsed<CalendarEvent> {
        let vocabulary = self.dialect.vocabulary();
        let Some(section) = find_section(sections, &vocabulary.event_headings) else {
            warn!(headings = ?vocabulary.event_headings, "no event section in document");
            return Parsed {
                items: Vec::new(),
                diagnostics: vec![
                    ParseError::SectionNotFound {
                        section: SectionKind::Events,
                    }
                    .into(),
                ],
            };
        };

        let calendar = Calendar::new(self.dialect, eras);
        let matcher = self.dialect.matcher();
        let mut out = Parsed::default();
        let mut pending: Option<PendingEvent> = None;

        for &(line, text) in &section.lines {
            match matcher.event_line(text) {
                EventLine::Header { date, title } => {
                    if let Some(done) = pending.take() {
                        self.finish(done, &calendar, &mut out);
                    }
                    pending = Some(PendingEvent {
                        line,
                        date,
                        title,
                        description: Vec::new(),
                        described: false,
                    });
                }
                EventLine::Description(body) => match pending.as_mut() {
                    Some(p) if !p.described => {
                        p.described = true;
                        p.description.push(body);
                    }
                    // a second "Description:" line is just more text
                    Some(p) => p.description.push(text.trim()),
                    None => out.diagnostics.push(malformed(line, text)),
                },
                EventLine::Bullet => match pending.as_mut() {
                    Some(p) if p.described => p.description.push(text.trim()),
                    _ => out.diagnostics.push(malformed(line, text)),
                },
                EventLine::Text(body) => match pending.as_mut() {
                    Some(p) if p.described => p.description.push(body),
                    _ => debug!(line, "stray text in event section"),
                },
                EventLine::Blank => {
                    if let Some(p) = pending.as_mut().filter(|p| p.described) {
                        p.description.push("");
                    }
                }
            }
        }
        if let Some(done) = pending.take() {
            self.finish(done, &calendar, &mut out);
        }
        out
    }

    /// Convert a collected event block, or drop it with a diagnostic.
    fn finish(
        &self,
        pending: PendingEvent<'_>,
        calendar: &Calendar<'_>,
        out: &mut Parsed<CalendarEvent>,
    ) {
        let era_number = self.dialect.era_reference(pending.date);
        match calendar.date_to_index(pending.date) {
            Ok(day_index) => out.items.push(CalendarEvent {
                raw_date_text: pending.date.to_string(),
                title: pending.title.to_string(),
                description: pending.description.join("\n").trim().to_string(),
                era_number,
                day_index,
                line: pending.line,
            }),
            Err(source) => {
                warn!(line = pending.line, date = pending.date, %source, "event dropped");
                out.diagnostics.push(
                    ParseError::InvalidDate {
                        line: pending.line,
                        date: pending.date.to_string(),
                        source,
                    }
                    .into(),
                );
            }
        }
    }
}

/// An event header whose description is still being collected.
struct PendingEvent<'a> {
    line: usize,
    date: &'a str,
    title: &'a str,
    description: Vec<&'a str>,
    described: bool,
}

fn malformed(line: usize, text: &str) -> Diagnostic {
    ParseError::MalformedText {
        line,
        text: text.trim().to_string(),
    }
    .into()
}
