//! Calendar dialect: the day names, month names and document vocabulary
//! that define one calendar's grammar.
//!
//! A dialect is validated and its patterns compiled once, when it is built.
//! Everything downstream (document parsing, date parsing, formatting) borrows
//! the same compiled dialect, so the parser and the formatter cannot drift
//! apart. Dates parsed under one dialect must be formatted under the same one.

use std::collections::HashSet;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarDate;
use crate::error::{ConfigError, InvalidDate};
use crate::matcher::LineMatcher;

// ── Built-in French dialect ──────────────────────────────────────────────

/// Weekday names, in order. Their count is the length of a week.
pub const DAY_NAMES: &[&str] = &["Clar", "Flume", "Éther", "Armon", "Flok", "Mété", "Chir"];

/// Month names, in order, including the three seasonal months.
pub const MONTH_NAMES: &[&str] = &[
    "Massié", "Rasser", "Finci", "Été", // spring + summer solstice
    "Visir", "Comir", "Arnie", "Elzeryn", "Automne", // autumn
    "Ōure", "Weelk", "Frîrr", "Hiver", // winter
    "Aulbe", "Scholl", "Midnay", "Cabir",
];

/// Month names that only exist in the seasonal variant of the calendar.
pub const SEASONAL_MONTHS: &[&str] = &["Été", "Automne", "Hiver"];

pub const DEFAULT_WEEKS_PER_MONTH: u32 = 4;

// ── Configuration (TOML) ─────────────────────────────────────────────────

/// How the day-of-week name in a date relates to the computed index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekdayPolicy {
    /// The name must be a known day name; its position is not checked.
    #[default]
    Decorative,
    /// The name must equal `day_names[index % days_per_week]`.
    Derived,
}

fn default_day_names() -> Vec<String> {
    DAY_NAMES.iter().map(|s| s.to_string()).collect()
}

fn default_month_names() -> Vec<String> {
    MONTH_NAMES.iter().map(|s| s.to_string()).collect()
}

fn default_weeks_per_month() -> u32 {
    DEFAULT_WEEKS_PER_MONTH
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Fixed words of the document and date grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Vocabulary {
    /// Level-2 heading keywords that open the era table
    pub era_headings: Vec<String>,
    /// Level-2 heading keywords that open the event list
    pub event_headings: Vec<String>,
    /// "âge" in "2e âge"
    pub era_word: String,
    /// "Année" in "Année 30"
    pub year_word: String,
    /// "à" in "Année 1 à Année 10"
    pub range_word: String,
    /// "de" in "3 Clar de Massié"
    pub month_joiner: String,
    /// "du" in "Année 30 du 7e âge"
    pub era_joiner: String,
    /// "Description" in "- Description: ..."
    pub description_word: String,
    /// Suffixes accepted (and discarded) after an era number: "1er", "2e", "3ème"
    pub ordinal_suffixes: Vec<String>,
    /// Printed when a day index lies outside every known era
    pub unknown_date: String,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            era_headings: words(&["Âges", "Ages", "Eras"]),
            event_headings: words(&["Événements", "Evenements", "Events"]),
            era_word: "âge".to_string(),
            year_word: "Année".to_string(),
            range_word: "à".to_string(),
            month_joiner: "de".to_string(),
            era_joiner: "du".to_string(),
            description_word: "Description".to_string(),
            ordinal_suffixes: words(&["ème", "er", "e"]),
            unknown_date: "Date inconnue".to_string(),
        }
    }
}

/// Raw, unvalidated dialect as read from TOML. Every field is optional and
/// falls back to the built-in French dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DialectConfig {
    #[serde(default = "default_day_names")]
    pub day_names: Vec<String>,
    #[serde(default = "default_month_names")]
    pub month_names: Vec<String>,
    #[serde(default = "default_weeks_per_month")]
    pub weeks_per_month: u32,
    #[serde(default)]
    pub weekday_policy: WeekdayPolicy,
    #[serde(default)]
    pub vocabulary: Vocabulary,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self {
            day_names: default_day_names(),
            month_names: default_month_names(),
            weeks_per_month: default_weeks_per_month(),
            weekday_policy: WeekdayPolicy::default(),
            vocabulary: Vocabulary::default(),
        }
    }
}

impl DialectConfig {
    /// The calendar variant without the seasonal months.
    pub fn without_seasons() -> Self {
        let mut cfg = Self::default();
        cfg.month_names
            .retain(|m| !SEASONAL_MONTHS.contains(&m.as_str()));
        cfg
    }
}

// ── Compiled dialect ─────────────────────────────────────────────────────

/// A validated dialect with its patterns compiled.
#[derive(Debug, Clone)]
pub struct CalendarDialect {
    config: DialectConfig,
    re_date: Regex,
    re_era_ref: Regex,
    matcher: LineMatcher,
}

impl Default for CalendarDialect {
    fn default() -> Self {
        Self::from_config(DialectConfig::default()).expect("built-in dialect is valid")
    }
}

/// Regex fragment for a fixed word or phrase, case-insensitive, with any
/// run of whitespace between its words.
pub(crate) fn keyword_pattern(word: &str) -> String {
    let parts: Vec<String> = word.split_whitespace().map(regex::escape).collect();
    format!("(?i:{})", parts.join(r"\s+"))
}

/// Regex fragment for the optional ordinal suffix after an era number.
/// Longest suffixes first so "ème" wins over "e".
pub(crate) fn ordinal_pattern(suffixes: &[String]) -> String {
    if suffixes.is_empty() {
        return String::new();
    }
    let mut sorted: Vec<&String> = suffixes.iter().collect();
    sorted.sort_by_key(|s| std::cmp::Reverse(s.chars().count()));
    let alts: Vec<String> = sorted.iter().map(|s| regex::escape(s)).collect();
    format!("(?i:{})?", alts.join("|"))
}

impl CalendarDialect {
    /// Validate a configuration and compile its grammar.
    pub fn from_config(config: DialectConfig) -> Result<Self, ConfigError> {
        validate(&config)?;
        let v = &config.vocabulary;
        let ordinal = ordinal_pattern(&v.ordinal_suffixes);

        // <day> <day-name> de <month-name>, Année <year> du <era><suffix?> âge
        let re_date = Regex::new(&format!(
            r"^([0-9]+)\s+(\S+)\s+{joiner}\s+([^,]+?)\s*,\s*{year}\s+([0-9]+)\s+{era_joiner}\s+([0-9]+){ordinal}\s+{era}$",
            joiner = keyword_pattern(&v.month_joiner),
            year = keyword_pattern(&v.year_word),
            era_joiner = keyword_pattern(&v.era_joiner),
            era = keyword_pattern(&v.era_word),
        ))?;

        // Lightweight "du <N> âge" lookup, independent of the full grammar.
        let re_era_ref = Regex::new(&format!(
            r"\b{era_joiner}\s+([0-9]+){ordinal}\s+{era}",
            era_joiner = keyword_pattern(&v.era_joiner),
            era = keyword_pattern(&v.era_word),
        ))?;

        let matcher = LineMatcher::new(v)?;

        Ok(Self {
            config,
            re_date,
            re_era_ref,
            matcher,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: DialectConfig = toml::from_str(text)?;
        Self::from_config(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn config(&self) -> &DialectConfig {
        &self.config
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.config.vocabulary
    }

    pub(crate) fn matcher(&self) -> &LineMatcher {
        &self.matcher
    }

    pub fn weekday_policy(&self) -> WeekdayPolicy {
        self.config.weekday_policy
    }

    pub fn day_names(&self) -> &[String] {
        &self.config.day_names
    }

    pub fn month_names(&self) -> &[String] {
        &self.config.month_names
    }

    pub fn days_per_week(&self) -> u32 {
        self.config.day_names.len() as u32
    }

    pub fn months_per_year(&self) -> u32 {
        self.config.month_names.len() as u32
    }

    pub fn weeks_per_month(&self) -> u32 {
        self.config.weeks_per_month
    }

    pub fn days_per_month(&self) -> u32 {
        self.config.weeks_per_month * self.days_per_week()
    }

    pub fn days_per_year(&self) -> u64 {
        u64::from(self.months_per_year()) * u64::from(self.days_per_month())
    }

    pub fn weekday_index(&self, name: &str) -> Option<usize> {
        self.config.day_names.iter().position(|d| d == name)
    }

    pub fn month_index(&self, name: &str) -> Option<usize> {
        self.config.month_names.iter().position(|m| m == name)
    }

    /// Era number referenced by a date text ("... du 7e âge" → 7), or 0.
    ///
    /// Independent of full date parsing: works on text whose day or month
    /// names are wrong.
    pub fn era_reference(&self, date_text: &str) -> u32 {
        self.re_era_ref
            .captures(date_text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    }

    /// Parse the grammar and the day/month names of a date. Era and year
    /// bounds are checked later against an era table.
    pub fn parse_date(&self, text: &str) -> Result<CalendarDate, InvalidDate> {
        let text = text.trim();
        let malformed = || InvalidDate::MalformedText(text.to_string());
        let caps = self.re_date.captures(text).ok_or_else(malformed)?;

        let day: u32 = caps[1].parse().map_err(|_| malformed())?;
        let year: u32 = caps[4].parse().map_err(|_| malformed())?;
        let era: u32 = caps[5].parse().map_err(|_| malformed())?;

        let day_name = &caps[2];
        let weekday = self
            .weekday_index(day_name)
            .ok_or_else(|| InvalidDate::UnknownDayName(day_name.to_string()))?;
        let month_name = &caps[3];
        let month = self
            .month_index(month_name)
            .ok_or_else(|| InvalidDate::UnknownMonthName(month_name.to_string()))?;

        let date = CalendarDate {
            day,
            weekday,
            month,
            year,
            era,
        };
        self.check_components(&date)?;
        Ok(date)
    }

    /// Check day, month and weekday of a date against this dialect.
    pub fn check_components(&self, date: &CalendarDate) -> Result<(), InvalidDate> {
        let days_per_month = self.days_per_month();
        if date.day == 0 || date.day > days_per_month {
            return Err(InvalidDate::DayOutOfRange {
                day: date.day,
                days_per_month,
            });
        }
        if date.month >= self.config.month_names.len() {
            return Err(InvalidDate::MonthOutOfRange {
                month: date.month,
                months_per_year: self.months_per_year(),
            });
        }
        if date.weekday >= self.config.day_names.len() {
            return Err(InvalidDate::WeekdayOutOfRange {
                weekday: date.weekday,
                days_per_week: self.days_per_week(),
            });
        }
        Ok(())
    }

    /// Canonical text of a date, in exactly the grammar `parse_date` reads.
    /// A date with components outside this dialect formats as the
    /// unknown-date text.
    pub fn format_date(&self, date: &CalendarDate) -> String {
        if self.check_components(date).is_err() {
            return self.unknown_date().to_string();
        }
        let v = &self.config.vocabulary;
        format!(
            "{} {} {} {}, {} {} {} {} {}",
            date.day,
            self.config.day_names[date.weekday],
            v.month_joiner,
            self.config.month_names[date.month],
            v.year_word,
            date.year,
            v.era_joiner,
            date.era,
            v.era_word,
        )
    }

    /// Coarse year-level label, e.g. "Année 30 du 7 âge".
    pub fn format_year(&self, year: u32, era: u32) -> String {
        let v = &self.config.vocabulary;
        format!(
            "{} {} {} {} {}",
            v.year_word, year, v.era_joiner, era, v.era_word
        )
    }

    pub fn unknown_date(&self) -> &str {
        &self.config.vocabulary.unknown_date
    }
}

// ── Validation ───────────────────────────────────────────────────────────

fn validate(config: &DialectConfig) -> Result<(), ConfigError> {
    let invalid = |msg: String| Err(ConfigError::Invalid(msg));

    if config.day_names.is_empty() {
        return invalid("day_names is empty".to_string());
    }
    if config.month_names.is_empty() {
        return invalid("month_names is empty".to_string());
    }
    if config.weeks_per_month == 0 {
        return invalid("weeks_per_month must be at least 1".to_string());
    }
    if u64::from(config.weeks_per_month) * config.day_names.len() as u64 > u64::from(u32::MAX) {
        return invalid("weeks_per_month is too large".to_string());
    }

    let mut seen = HashSet::new();
    for day in &config.day_names {
        if day.is_empty() || day.chars().any(|c| c.is_whitespace() || c == ',') {
            return invalid(format!("day name {day:?} must be one word without commas"));
        }
        if !seen.insert(day.as_str()) {
            return invalid(format!("day name {day:?} is listed twice"));
        }
    }

    let mut seen = HashSet::new();
    for month in &config.month_names {
        if month.trim().is_empty() || month.trim() != month.as_str() || month.contains(',') {
            return invalid(format!(
                "month name {month:?} must be non-empty, trimmed and without commas"
            ));
        }
        if !seen.insert(month.as_str()) {
            return invalid(format!("month name {month:?} is listed twice"));
        }
    }

    let v = &config.vocabulary;
    if v.era_headings.is_empty() || v.event_headings.is_empty() {
        return invalid("era_headings and event_headings need at least one keyword".to_string());
    }
    let required = [
        ("era_word", &v.era_word),
        ("year_word", &v.year_word),
        ("range_word", &v.range_word),
        ("month_joiner", &v.month_joiner),
        ("era_joiner", &v.era_joiner),
        ("description_word", &v.description_word),
        ("unknown_date", &v.unknown_date),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            return invalid(format!("vocabulary.{name} is empty"));
        }
    }
    for heading in v.era_headings.iter().chain(&v.event_headings) {
        if heading.trim().is_empty() {
            return invalid("heading keywords must not be empty".to_string());
        }
    }
    if v.ordinal_suffixes.iter().any(|s| s.is_empty()) {
        return invalid("ordinal suffixes must not be empty".to_string());
    }

    Ok(())
}
