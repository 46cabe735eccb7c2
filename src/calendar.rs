//! Conversion between calendar dates and flat day indices.
//!
//! The day index counts days from the first day of the first era *in table
//! order*. Eras are laid end to end in the order the document lists them,
//! each spanning `duration_years * days_per_year` days.

use calendar_types::Era;

use crate::dialect::{CalendarDialect, WeekdayPolicy};
use crate::error::InvalidDate;

/// A date split into its components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDate {
    /// 1-based day of the month
    pub day: u32,
    /// Index into the dialect's day names
    pub weekday: usize,
    /// 0-based index into the dialect's month names
    pub month: usize,
    pub year: u32,
    /// Era number (not table position)
    pub era: u32,
}

/// An era table read through one dialect.
#[derive(Debug, Clone, Copy)]
pub struct Calendar<'a> {
    dialect: &'a CalendarDialect,
    eras: &'a [Era],
}

impl<'a> Calendar<'a> {
    pub fn new(dialect: &'a CalendarDialect, eras: &'a [Era]) -> Self {
        Self { dialect, eras }
    }

    pub fn dialect(&self) -> &'a CalendarDialect {
        self.dialect
    }

    pub fn eras(&self) -> &'a [Era] {
        self.eras
    }

    fn span(&self, era: &Era) -> u64 {
        era.span_days(self.dialect.days_per_year())
    }

    /// Number of days covered by the whole table.
    pub fn total_days(&self) -> u64 {
        self.eras
            .iter()
            .fold(0u64, |acc, e| acc.saturating_add(self.span(e)))
    }

    /// Table position and record of the era with this number.
    pub fn find_era(&self, number: u32) -> Option<(usize, &'a Era)> {
        self.eras.iter().enumerate().find(|(_, e)| e.number == number)
    }

    /// Day index of the first day of the era at table position `position`.
    pub fn era_offset(&self, position: usize) -> u64 {
        self.eras[..position]
            .iter()
            .fold(0u64, |acc, e| acc.saturating_add(self.span(e)))
    }

    /// Check a parsed date against the era table and compute its index.
    pub fn index_of(&self, date: &CalendarDate) -> Result<u64, InvalidDate> {
        self.dialect.check_components(date)?;
        let (position, era) = self
            .find_era(date.era)
            .ok_or(InvalidDate::UnknownEra(date.era))?;
        if !era.contains_year(date.year) {
            return Err(InvalidDate::YearOutOfRange {
                year: date.year,
                era: era.number,
                start: era.start_year,
                end: era.end_year,
            });
        }

        let days_per_year = self.dialect.days_per_year();
        let days_per_month = u64::from(self.dialect.days_per_month());
        let index = self
            .era_offset(position)
            .saturating_add(u64::from(date.year - era.start_year).saturating_mul(days_per_year))
            .saturating_add(date.month as u64 * days_per_month)
            .saturating_add(u64::from(date.day - 1));

        if self.dialect.weekday_policy() == WeekdayPolicy::Derived {
            let expected = self.weekday_of(index);
            if date.weekday != expected {
                let names = self.dialect.day_names();
                return Err(InvalidDate::WeekdayMismatch {
                    found: names[date.weekday].clone(),
                    expected: names[expected].clone(),
                });
            }
        }
        Ok(index)
    }

    /// Parse a date string and convert it to a day index.
    pub fn date_to_index(&self, text: &str) -> Result<u64, InvalidDate> {
        let date = self.dialect.parse_date(text)?;
        self.index_of(&date)
    }

    fn weekday_of(&self, index: u64) -> usize {
        (index % u64::from(self.dialect.days_per_week())) as usize
    }

    /// Split a day index back into a date.
    pub fn try_date_at(&self, index: u64) -> Result<CalendarDate, InvalidDate> {
        let days_per_year = self.dialect.days_per_year();
        let days_per_month = u64::from(self.dialect.days_per_month());

        let mut remaining = index;
        for era in self.eras {
            let span = self.span(era);
            if remaining >= span {
                remaining -= span;
                continue;
            }
            let in_year = remaining % days_per_year;
            return Ok(CalendarDate {
                day: (in_year % days_per_month) as u32 + 1,
                weekday: self.weekday_of(index),
                month: (in_year / days_per_month) as usize,
                year: era.start_year + (remaining / days_per_year) as u32,
                era: era.number,
            });
        }
        Err(InvalidDate::IndexOutOfKnownRange {
            index,
            total: self.total_days(),
        })
    }

    pub fn date_at(&self, index: u64) -> Option<CalendarDate> {
        self.try_date_at(index).ok()
    }

    /// Canonical date text for a day index, or the dialect's unknown-date
    /// sentinel past the end of the table.
    pub fn index_to_date(&self, index: u64) -> String {
        match self.try_date_at(index) {
            Ok(date) => self.dialect.format_date(&date),
            Err(e) => {
                tracing::debug!(%e, "formatting index outside the era table");
                self.dialect.unknown_date().to_string()
            }
        }
    }

    /// Year-level label for a day index ("Année 30 du 7 âge").
    pub fn year_label(&self, index: u64) -> String {
        match self.date_at(index) {
            Some(date) => self.dialect.format_year(date.year, date.era),
            None => self.dialect.unknown_date().to_string(),
        }
    }
}
