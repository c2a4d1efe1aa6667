//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `smsguard check [TEXT]`: classify one message, or prompt interactively
//! - `smsguard history`: list past predictions with filter/search and stats
//! - `smsguard clear`: delete the remote history after confirmation
//! - `smsguard export`: write the held history as CSV
//! - `smsguard health`: check config and service reachability
//! - `smsguard config show|init|set|reset`: configuration management
//!
//! Each handler catches failures of its own action, prints them for the user
//! and maps them to the process exit code.

use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::checker::{CheckView, Checker};
use crate::config::{self, GuardConfig};
use crate::error::ServiceError;
use crate::history::{
    ClearOutcome, FilterState, HistoryController, HistoryRow, HistoryView, LabelFilter, Tone,
};
use crate::model::Verdict;
use crate::service::{Endpoints, HttpService, PredictionService};

/// Output format for commands that render data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// smsguard check
// ---------------------------------------------------------------------------

/// Classify the message in `words`, or read messages from stdin when empty.
///
/// Piped stdin is read whole as a single message. A terminal gets the
/// interactive prompt.
pub fn run_check(cfg: &GuardConfig, words: &[String], format: OutputFormat) -> Result<ExitCode> {
    let mut checker = Checker::new(HttpService::from_config(&cfg.service));
    if format == OutputFormat::Table {
        checker = checker.on_busy(|busy| {
            if busy {
                eprintln!("{}", "Checking…".dimmed());
            }
        });
    }

    if !words.is_empty() {
        let ok = check_once(&mut checker, &words.join(" "), format)?;
        return Ok(exit_code(ok));
    }

    let stdin = io::stdin();
    if !stdin.is_terminal() {
        let message = read_piped_message(stdin.lock()).context("failed to read message")?;
        let ok = check_once(&mut checker, &message, format)?;
        return Ok(exit_code(ok));
    }

    let ok = check_session(&mut checker, &mut stdin.lock(), format)?;
    Ok(exit_code(ok))
}

/// Prompt for messages until end of input.
///
/// Returns whether the last submitted message was checked successfully.
fn check_session<S: PredictionService, R: BufRead>(
    checker: &mut Checker<S>,
    input: &mut R,
    format: OutputFormat,
) -> Result<bool> {
    let mut last_ok = true;

    loop {
        println!(
            "{}",
            "Type a message, then press Enter on an empty line (Ctrl+D to check and quit)."
                .dimmed()
        );

        let Some(message) = read_message(input).context("failed to read message")? else {
            return Ok(last_ok);
        };

        last_ok = check_once(checker, &message, format)?;
        println!();
    }
}

fn check_once<S: PredictionService>(
    checker: &mut Checker<S>,
    text: &str,
    format: OutputFormat,
) -> Result<bool> {
    match checker.check(text) {
        Ok(view) => {
            print_check(view, format)?;
            Ok(true)
        }
        Err(err) => {
            alert(&err.to_string());
            Ok(false)
        }
    }
}

/// Read all of `reader` as one message, blank lines included.
pub fn read_piped_message<R: Read>(mut reader: R) -> io::Result<String> {
    let mut message = String::new();
    reader.read_to_string(&mut message)?;
    Ok(message)
}

/// Read one message from the interactive prompt: lines up to an empty line
/// or end of input.
///
/// Returns `None` at end of input when nothing was buffered.
pub fn read_message<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut lines: Vec<String> = Vec::new();
    let mut saw_input = false;

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(saw_input.then(|| lines.join("\n")));
        }
        saw_input = true;

        let line = line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            return Ok(Some(lines.join("\n")));
        }
        lines.push(line.to_string());
    }
}

fn print_check(view: &CheckView, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(view)?);
        return Ok(());
    }

    let label = match view.verdict {
        Verdict::Spam => view.label.red().bold(),
        Verdict::Ham => view.label.green().bold(),
    };
    println!("  {label}");
    println!("  {}", view.confidence_line());
    if let Some(ref explanation) = view.explanation {
        println!("  {}", explanation.dimmed());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// smsguard history
// ---------------------------------------------------------------------------

/// Load the history and render it under the given filter.
pub fn run_history(
    cfg: &GuardConfig,
    label: LabelFilter,
    search: Option<String>,
    format: OutputFormat,
) -> Result<ExitCode> {
    let mut ctl = history_controller(cfg);
    ctl.set_filter(FilterState::new(label, search.unwrap_or_default()));

    if format == OutputFormat::Table
        && let Some(loading) = HistoryView::Loading.placeholder()
    {
        eprintln!("{}", loading.dimmed());
    }
    let loaded = ctl.load().is_ok();

    match format {
        OutputFormat::Json => print_history_json(&ctl)?,
        OutputFormat::Table => print_history_table(&ctl),
    }

    Ok(exit_code(loaded))
}

fn history_controller(cfg: &GuardConfig) -> HistoryController<HttpService> {
    HistoryController::new(HttpService::from_config(&cfg.service))
        .with_alert_threshold(cfg.alerts.spam_ratio_threshold)
}

fn print_history_table<S: PredictionService>(ctl: &HistoryController<S>) {
    println!("{}", "Prediction History".bold().cyan());
    println!("{}", "=".repeat(60));
    println!("  {}", ctl.stats_line().bold());

    if ctl.alert_raised() {
        let stats = ctl.stats();
        println!(
            "  {}",
            format!(
                "⚠ High spam activity: {:.0}% of checked messages are spam",
                stats.spam_ratio() * 100.0
            )
            .red()
            .bold()
        );
    }

    let filter = ctl.filter();
    if filter.label != LabelFilter::All || filter.needle().is_some() {
        println!(
            "  {}",
            format!("filter: {}  search: {}", filter.label, filter.query.trim()).dimmed()
        );
    }
    println!();

    let view = ctl.view();
    match view.placeholder() {
        Some(placeholder) => println!("  {}", placeholder.dimmed()),
        None => {
            for row in view.rows() {
                print_history_row(row);
            }
        }
    }
}

fn print_history_row(row: &HistoryRow) {
    let bar = match row.tone {
        Tone::Spam => "▌".red(),
        Tone::Safe => "▌".green(),
    };
    for line in row.text.lines() {
        println!("{bar} {line}");
    }
    println!("{bar} {}", row.meta_line().dimmed());
    println!();
}

fn print_history_json<S: PredictionService>(ctl: &HistoryController<S>) -> Result<()> {
    let value = serde_json::json!({
        "state": ctl.state(),
        "stats": ctl.stats(),
        "stats_line": ctl.stats_line(),
        "alert": {
            "raised": ctl.alert_raised(),
            "opacity": ctl.overlay_opacity(),
            "threshold": ctl.alert_threshold(),
        },
        "filter": {
            "label": ctl.filter().label,
            "query": ctl.filter().query,
        },
        "view": ctl.view(),
    });

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// smsguard clear
// ---------------------------------------------------------------------------

/// Clear the remote history after confirmation.
pub fn run_clear(cfg: &GuardConfig, assume_yes: bool) -> Result<ExitCode> {
    let confirmed = assume_yes || confirm("Clear prediction history?")?;
    let mut ctl = history_controller(cfg);

    match ctl.clear(confirmed) {
        Ok(ClearOutcome::Cancelled) => {
            println!("{}", "Cancelled.".dimmed());
            Ok(ExitCode::SUCCESS)
        }
        Ok(ClearOutcome::Cleared) => {
            println!("{} History cleared", "✓".green().bold());
            println!("  {}", ctl.stats_line().dimmed());
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            tracing::debug!(error = %err, "clear failed");
            alert(match err {
                ServiceError::Status { .. } => "Failed to clear history",
                _ => "Error clearing history",
            });
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Ask a yes/no question on stdin; anything but `y`/`yes` declines.
fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush().context("failed to flush stdout")?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

// ---------------------------------------------------------------------------
// smsguard export
// ---------------------------------------------------------------------------

/// Load the history and write it as CSV.
pub fn run_export(cfg: &GuardConfig, output: Option<PathBuf>) -> Result<ExitCode> {
    let mut ctl = history_controller(cfg);

    if ctl.load().is_err() {
        if let Some(placeholder) = ctl.view().placeholder() {
            alert(&placeholder);
        }
        return Ok(ExitCode::FAILURE);
    }

    let path = export_path(output.as_deref(), &cfg.export.file_name);
    match ctl.export_to(&path) {
        Ok(written) => {
            println!(
                "{} Exported {} records to {}",
                "✓".green().bold(),
                ctl.records().len(),
                written.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            alert(&err.to_string());
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Resolve where the CSV goes: `--output` (a file, or a directory to put the
/// default file name in) or the default file name in the working directory.
fn export_path(output: Option<&Path>, file_name: &str) -> PathBuf {
    match output {
        Some(dir) if dir.is_dir() => dir.join(file_name),
        Some(file) => file.to_path_buf(),
        None => PathBuf::from(file_name),
    }
}

// ---------------------------------------------------------------------------
// smsguard health
// ---------------------------------------------------------------------------

/// Check config files and reachability of every configured endpoint.
pub fn run_health(cfg: &GuardConfig) -> Result<ExitCode> {
    println!("{}", "smsguard Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.smsguard/config.toml found"
        } else {
            "not found (run `smsguard config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".smsguard.toml found"
        } else {
            "none (optional)"
        },
    );

    let endpoints = Endpoints::new(cfg.service.candidates());
    let mut any_reachable = false;
    for (i, base) in endpoints.iter().enumerate() {
        let name = if i == 0 { "Service (primary)" } else { "Service (fallback)" };
        let probe = HttpService::with_endpoints(Endpoints::new([base]), &cfg.service);
        match probe.ping() {
            Ok(message) => {
                any_reachable = true;
                print_health_item(name, true, &message);
            }
            Err(err) => print_health_item(name, false, &format!("{base}: {}", err.user_message())),
        }
    }

    print_health_item(
        "Spam alert threshold",
        true,
        &format!("{:.0}%", cfg.alerts.spam_ratio_threshold * 100.0),
    );

    Ok(exit_code(any_reachable))
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<25} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// smsguard config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show(cfg: &GuardConfig) -> Result<ExitCode> {
    let toml_str = config::show_effective_config(cfg)?;
    println!("{}", "Effective smsguard Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.smsguard/config.toml", global_exists);
    print_source(".smsguard.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "SMSGUARD_* environment variables".dimmed()
    );

    Ok(ExitCode::SUCCESS)
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.smsguard/config.toml`.
pub fn run_config_init(force: bool) -> Result<ExitCode> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(ExitCode::SUCCESS)
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<ExitCode> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(ExitCode::SUCCESS)
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<ExitCode> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Report a failure of the current action to the user.
fn alert(message: &str) {
    eprintln!("{} {}", "!".yellow().bold(), message.yellow());
}

fn exit_code(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io::Cursor;

    use super::*;
    use crate::checker::prepare_input;
    use crate::model::{PredictResponse, PredictionRecord};

    /// Answers classify calls from a script, in order.
    struct Scripted(RefCell<Vec<Result<PredictResponse, ServiceError>>>);

    impl Scripted {
        fn new(replies: Vec<Result<PredictResponse, ServiceError>>) -> Self {
            Self(RefCell::new(replies))
        }
    }

    impl PredictionService for Scripted {
        fn predict(&self, _text: &str) -> Result<PredictResponse, ServiceError> {
            self.0.borrow_mut().remove(0)
        }

        fn fetch_history(&self) -> Result<Vec<PredictionRecord>, ServiceError> {
            Ok(Vec::new())
        }

        fn clear_history(&self) -> Result<(), ServiceError> {
            Ok(())
        }

        fn ping(&self) -> Result<String, ServiceError> {
            Ok("ok".to_string())
        }
    }

    fn spam() -> Result<PredictResponse, ServiceError> {
        Ok(PredictResponse {
            label: serde_json::json!("spam"),
            probability: Some(0.9),
            ..Default::default()
        })
    }

    fn refused() -> Result<PredictResponse, ServiceError> {
        Err(ServiceError::Transport {
            url: "http://localhost:5000/predict".to_string(),
            reason: "Connection refused".to_string(),
        })
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Table);
    }

    #[test]
    fn read_message_stops_at_blank_line() {
        let mut input = Cursor::new("Congrats!\nYou won\n\nnext message\n");
        assert_eq!(
            read_message(&mut input).unwrap().as_deref(),
            Some("Congrats!\nYou won")
        );
        assert_eq!(
            read_message(&mut input).unwrap().as_deref(),
            Some("next message")
        );
        assert_eq!(read_message(&mut input).unwrap(), None);
    }

    #[test]
    fn read_message_blank_submission_is_empty() {
        let mut input = Cursor::new("\n");
        assert_eq!(read_message(&mut input).unwrap().as_deref(), Some(""));
    }

    #[test]
    fn piped_message_with_leading_blank_line_is_kept() {
        let raw = read_piped_message(Cursor::new("\nWIN a free prize, reply YES\n")).unwrap();
        assert_eq!(prepare_input(&raw).unwrap(), "WIN a free prize, reply YES");
    }

    #[test]
    fn piped_message_keeps_every_paragraph() {
        let raw = read_piped_message(Cursor::new(
            "Dear customer\n\nclaim your prize at http://x.example\n",
        ))
        .unwrap();
        assert_eq!(
            prepare_input(&raw).unwrap(),
            "Dear customer\n\nclaim your prize at http://x.example"
        );
    }

    #[test]
    fn session_reports_failure_of_last_check() {
        let service = Scripted::new(vec![spam(), refused()]);
        let mut checker = Checker::new(&service);
        let mut input = Cursor::new("first\n\nsecond\n\n");
        assert!(!check_session(&mut checker, &mut input, OutputFormat::Json).unwrap());
    }

    #[test]
    fn session_succeeds_when_last_check_succeeds() {
        let service = Scripted::new(vec![refused(), spam()]);
        let mut checker = Checker::new(&service);
        let mut input = Cursor::new("first\n\nsecond\n");
        assert!(check_session(&mut checker, &mut input, OutputFormat::Json).unwrap());
    }

    #[test]
    fn empty_session_succeeds() {
        let service = Scripted::new(vec![]);
        let mut checker = Checker::new(&service);
        let mut input = Cursor::new("");
        assert!(check_session(&mut checker, &mut input, OutputFormat::Json).unwrap());
    }

    #[test]
    fn affirmative_answers() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative(" YES "));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("no"));
    }

    #[test]
    fn export_path_defaults_to_file_name() {
        assert_eq!(
            export_path(None, "Predicted_SPAM_SMS.csv"),
            PathBuf::from("Predicted_SPAM_SMS.csv")
        );
        assert_eq!(
            export_path(Some(Path::new("out/history.csv")), "Predicted_SPAM_SMS.csv"),
            PathBuf::from("out/history.csv")
        );
        let dir = std::env::temp_dir();
        assert_eq!(
            export_path(Some(&dir), "Predicted_SPAM_SMS.csv"),
            dir.join("Predicted_SPAM_SMS.csv")
        );
    }
}
