use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use pager::Pager;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use techgrid_core::data::{Database, DetectionSource};
use techgrid_core::presence::PresenceTable;
use techgrid_core::report::{ReportFormat, render_report, save_report};
use techgrid_core::selection::NO_DATA_MESSAGE;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the store connection string
pub const DB_ENV_VAR: &str = "TECHGRID_DB_URI";
pub const DEFAULT_DB_LOCATION: &str = "~/.config/techgrid/scraped_data.db";

// Helper functions shared by the handlers

/// Turn a user supplied connection string into something SQLite can open.
/// Plain paths get `~` expanded; `file:` URIs are passed through untouched.
pub fn resolve_connection_string(raw: &str) -> Result<String, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(format!(
            "No database connection string provided (set {} or --db)",
            DB_ENV_VAR
        ));
    }

    if raw.starts_with("file:") {
        Ok(raw.to_string())
    } else {
        Ok(shellexpand::tilde(raw).into_owned())
    }
}

pub fn open_database(raw: &str) -> Result<Database, String> {
    let connection_string = resolve_connection_string(raw)?;
    if !connection_string.starts_with("file:") && !Database::exists(Path::new(&connection_string)) {
        return Err(format!(
            "No detection store found at {} (set {} or --db)",
            connection_string, DB_ENV_VAR
        ));
    }
    debug!("opening detection store at {}", connection_string);
    Database::open(&connection_string)
        .map_err(|e| format!("Failed to open database {}: {}", connection_string, e))
}

/// Aggregate and reshape. `None` when the store holds no detections.
pub fn load_presence_table<S: DetectionSource + ?Sized>(
    source: &S,
) -> Result<Option<PresenceTable>, String> {
    PresenceTable::load(source).map_err(|e| format!("Failed to load detections: {}", e))
}

pub fn build_report<S: DetectionSource + ?Sized>(
    source: &S,
    format: ReportFormat,
) -> Result<Option<String>, String> {
    match load_presence_table(source)? {
        Some(table) => render_report(&table, format)
            .map(Some)
            .map_err(|e| format!("Failed to render report: {}", e)),
        None => Ok(None),
    }
}

pub fn lookup_urls<S: DetectionSource + ?Sized>(
    source: &S,
    base_url: &str,
    technology: &str,
) -> Result<Vec<String>, String> {
    source
        .urls_for(base_url, technology)
        .map_err(|e| format!("Failed to look up URLs: {}", e))
}

/// Logs go to stderr. The interactive grid owns the terminal, so it stays
/// silent unless RUST_LOG asks otherwise.
pub fn init_tracing(verbose: bool, interactive: bool) {
    let default_level = if interactive {
        "off"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn fail(message: &str) -> ! {
    eprintln!("{} {}", "✗".red().bold(), message);
    std::process::exit(1);
}

fn loading_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message.to_string());
    spinner
}

pub fn handle_ui(db_uri: &str) {
    let spinner = loading_spinner("Aggregating detections...");
    let db = match open_database(db_uri) {
        Ok(db) => db,
        Err(e) => {
            spinner.finish_and_clear();
            fail(&e);
        }
    };

    let table = match load_presence_table(&db) {
        Ok(table) => table,
        Err(e) => {
            spinner.finish_and_clear();
            fail(&e);
        }
    };
    spinner.finish_and_clear();

    let Some(table) = table else {
        println!("{}", NO_DATA_MESSAGE);
        return;
    };

    if let Err(e) = techgrid_tui::run(&db, table) {
        fail(&format!("Error running TUI: {}", e));
    }

    if let Err(e) = db.close() {
        fail(&format!("Failed to close database: {}", e));
    }
}

pub fn handle_table(db_uri: &str, args: &ArgMatches) {
    let format = args
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);
    let output = args.get_one::<PathBuf>("output");

    let db = open_database(db_uri).unwrap_or_else(|e| fail(&e));
    let report = build_report(&db, format).unwrap_or_else(|e| fail(&e));
    if let Err(e) = db.close() {
        fail(&format!("Failed to close database: {}", e));
    }

    let Some(report) = report else {
        println!("{}", NO_DATA_MESSAGE);
        return;
    };

    match output {
        Some(path) => {
            if let Err(e) = save_report(&report, path) {
                fail(&format!("Failed to write {}: {}", path.display(), e));
            }
            println!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        None => {
            if format == ReportFormat::Text {
                Pager::with_pager("less -R").setup();
            }
            print!("{}", report);
        }
    }
}

pub fn handle_urls(db_uri: &str, args: &ArgMatches) {
    let base_url = args
        .get_one::<String>("base-url")
        .unwrap_or_else(|| fail("--base-url is required"));
    let technology = args
        .get_one::<String>("technology")
        .unwrap_or_else(|| fail("--technology is required"));

    let db = open_database(db_uri).unwrap_or_else(|e| fail(&e));
    let urls = lookup_urls(&db, base_url, technology).unwrap_or_else(|e| fail(&e));
    if let Err(e) = db.close() {
        fail(&format!("Failed to close database: {}", e));
    }

    if urls.is_empty() {
        eprintln!(
            "{} No URLs recorded for '{}' under '{}'",
            "ℹ".blue(),
            technology,
            base_url
        );
        return;
    }

    for url in urls {
        println!("{}", url);
    }
}
