use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use fantasy_calendar::vault::{CALENDAR_FILE, locate_calendar};
use fantasy_calendar::{CalendarDialect, CalendarSnapshot, load_document};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "fantasy_calendar",
    about = "Era and event calendar for fantasy worlds"
)]
struct Cli {
    /// Dialect TOML overriding day names, month names and vocabulary
    #[arg(long, global = true)]
    dialect: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a calendar document and print eras, events and diagnostics as JSON
    Load {
        /// calendar.md, or a vault directory containing one
        path: PathBuf,
    },
    /// Print the events in chronological order
    Timeline { path: PathBuf },
    /// Convert a date to its day index, e.g. "3 Clar de Massié, Année 30 du 7e âge"
    Parse { path: PathBuf, date: Vec<String> },
    /// Convert a day index to its canonical date
    Format { path: PathBuf, index: u64 },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let dialect = match load_dialect(cli.dialect.as_deref()) {
        Ok(d) => Arc::new(d),
        Err(msg) => return fail(&msg),
    };

    let result = match cli.command {
        Command::Load { path } => run_load(&path, dialect),
        Command::Timeline { path } => run_timeline(&path, dialect),
        Command::Parse { path, date } => run_parse(&path, dialect, &date.join(" ")),
        Command::Format { path, index } => run_format(&path, dialect, index),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => fail(&msg),
    }
}

/// `RUST_LOG` directives when set and valid, otherwise `warn`.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

fn fail(msg: &str) -> ExitCode {
    eprintln!("{msg}");
    ExitCode::FAILURE
}

// ═══════════════════════════════════════════════════════════════════════
//  INPUT HELPERS
// ═══════════════════════════════════════════════════════════════════════

fn load_dialect(path: Option<&Path>) -> Result<CalendarDialect, String> {
    match path {
        Some(p) => CalendarDialect::load(p).map_err(|e| e.to_string()),
        None => Ok(CalendarDialect::default()),
    }
}

fn read_snapshot(path: &Path, dialect: Arc<CalendarDialect>) -> Result<CalendarSnapshot, String> {
    let file = locate_calendar(path)
        .ok_or_else(|| format!("No {CALENDAR_FILE} found at {}", path.display()))?;
    let text = std::fs::read_to_string(&file)
        .map_err(|e| format!("Cannot read {}: {e}", file.display()))?;
    eprintln!("  reading {}", file.display());
    Ok(load_document(&text, dialect))
}

/// Diagnostics go to stderr so stdout stays machine-readable.
fn report_diagnostics(snapshot: &CalendarSnapshot) {
    for d in snapshot.diagnostics() {
        match d.line() {
            Some(line) => eprintln!("  line {line}: {d}"),
            None => eprintln!("  {d}"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  SUBCOMMANDS
// ═══════════════════════════════════════════════════════════════════════

fn run_load(path: &Path, dialect: Arc<CalendarDialect>) -> Result<(), String> {
    let snapshot = read_snapshot(path, dialect)?;
    let json = serde_json::to_string_pretty(&snapshot.to_record())
        .map_err(|e| format!("JSON serialization failed: {e}"))?;
    println!("{json}");
    eprintln!(
        "{} era(s), {} event(s), {} diagnostic(s)",
        snapshot.eras().len(),
        snapshot.events().len(),
        snapshot.diagnostics().len()
    );
    Ok(())
}

fn run_timeline(path: &Path, dialect: Arc<CalendarDialect>) -> Result<(), String> {
    let snapshot = read_snapshot(path, dialect)?;
    report_diagnostics(&snapshot);

    if snapshot.events().is_empty() {
        println!("Aucun événement trouvé");
        return Ok(());
    }

    let mut current_era = None;
    for event in snapshot.chronological() {
        if current_era != Some(event.era_number) {
            current_era = Some(event.era_number);
            println!("── {} ──", snapshot.axis_label(event.day_index));
        }
        println!(
            "{:>10}  {}  {}",
            event.day_index,
            snapshot.format_index(event.day_index),
            event.title
        );
        for line in event.description.lines().filter(|l| !l.trim().is_empty()) {
            println!("{:>10}    {}", "", line);
        }
    }

    if let Some((first, last)) = snapshot.event_extent() {
        eprintln!(
            "\n{} event(s) spanning {} day(s) of {}",
            snapshot.events().len(),
            last - first + 1,
            snapshot.total_days()
        );
    }
    Ok(())
}

fn run_parse(path: &Path, dialect: Arc<CalendarDialect>, date: &str) -> Result<(), String> {
    let snapshot = read_snapshot(path, dialect)?;
    let index = snapshot
        .parse_date(date)
        .map_err(|e| format!("Invalid date {date:?}: {e}"))?;
    println!("{index}");
    Ok(())
}

fn run_format(path: &Path, dialect: Arc<CalendarDialect>, index: u64) -> Result<(), String> {
    let snapshot = read_snapshot(path, dialect)?;
    println!("{}", snapshot.format_index(index));
    Ok(())
}
