//! Fantasy-world calendar model.
//!
//! Reads the era table and the event list out of a Markdown calendar
//! document and converts between calendar dates and a flat day index.

pub mod calendar;
pub mod dialect;
pub mod error;
pub mod matcher;
pub mod parser;
pub mod sections;
pub mod snapshot;
pub mod vault;

pub use calendar::{Calendar, CalendarDate};
pub use calendar_types::{CalendarEvent, DiagnosticRecord, Era, SnapshotRecord};
pub use dialect::{CalendarDialect, DialectConfig, Vocabulary, WeekdayPolicy};
pub use error::{ConfigError, Diagnostic, InvalidDate, ParseError, SectionKind};
pub use parser::{DocumentParser, Parsed};
pub use snapshot::{CalendarSession, CalendarSnapshot, load_document};
