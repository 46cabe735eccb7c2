//! Second parsing pass: classify individual section lines.
//!
//! Every line gets a tagged result, so a bad bullet is reported on its own
//! instead of silently breaking a larger match.

use regex::Regex;

use crate::dialect::{Vocabulary, keyword_pattern, ordinal_pattern};

/// An era bullet with its numbers already parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEra {
    pub number: u32,
    pub start_year: u32,
    pub end_year: u32,
}

/// A line of the era section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraLine {
    /// `- **2e âge**: Année 1 à Année 500`
    Parsed(RawEra),
    /// A bullet that is not a well-formed era entry
    Malformed,
    /// Blank line or prose
    Ignored,
}

/// A line of the event section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLine<'a> {
    /// `- **<date>**: <title>` at column 0
    Header { date: &'a str, title: &'a str },
    /// `- Description: <text>`, possibly indented
    Description(&'a str),
    /// Any other column-0 bullet
    Bullet,
    Text(&'a str),
    Blank,
}

#[derive(Debug, Clone)]
pub struct LineMatcher {
    re_era: Regex,
    re_event_header: Regex,
    re_description: Regex,
}

impl LineMatcher {
    pub fn new(vocabulary: &Vocabulary) -> Result<Self, regex::Error> {
        let year = keyword_pattern(&vocabulary.year_word);

        // - **<N><suffix?> âge**: Année <A> à Année <B>
        let re_era = Regex::new(&format!(
            r"^-\s*\*\*\s*([0-9]+){ordinal}\s+{era}\s*\*\*\s*:\s*{year}\s*([0-9]+)\s*{range}\s*{year}\s*([0-9]+)",
            ordinal = ordinal_pattern(&vocabulary.ordinal_suffixes),
            era = keyword_pattern(&vocabulary.era_word),
            range = keyword_pattern(&vocabulary.range_word),
        ))?;

        let re_event_header = Regex::new(r"^-\s*\*\*(.+?)\*\*\s*:(.*)$")?;

        let re_description = Regex::new(&format!(
            r"^-\s*{desc}\s*:(.*)$",
            desc = keyword_pattern(&vocabulary.description_word),
        ))?;

        Ok(Self {
            re_era,
            re_event_header,
            re_description,
        })
    }

    pub fn era_line(&self, line: &str) -> EraLine {
        let trimmed = line.trim();
        if !trimmed.starts_with('-') {
            return EraLine::Ignored;
        }
        let Some(caps) = self.re_era.captures(trimmed) else {
            return EraLine::Malformed;
        };
        let parsed = (
            caps[1].parse::<u32>(),
            caps[2].parse::<u32>(),
            caps[3].parse::<u32>(),
        );
        match parsed {
            (Ok(number), Ok(start_year), Ok(end_year)) => EraLine::Parsed(RawEra {
                number,
                start_year,
                end_year,
            }),
            _ => EraLine::Malformed,
        }
    }

    pub fn event_line<'a>(&self, line: &'a str) -> EventLine<'a> {
        if let Some(caps) = self.re_event_header.captures(line) {
            let date = caps.get(1).map_or("", |m| m.as_str().trim());
            let title = caps.get(2).map_or("", |m| m.as_str().trim());
            if !date.is_empty() {
                return EventLine::Header { date, title };
            }
        }
        let trimmed = line.trim();
        if let Some(caps) = self.re_description.captures(trimmed) {
            return EventLine::Description(caps.get(1).map_or("", |m| m.as_str().trim()));
        }
        if trimmed.is_empty() {
            EventLine::Blank
        } else if line.starts_with('-') {
            EventLine::Bullet
        } else {
            EventLine::Text(trimmed)
        }
    }
}
