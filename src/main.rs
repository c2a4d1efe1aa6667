use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use smsguard::cli::{self, OutputFormat};
use smsguard::config;
use smsguard::history::LabelFilter;
use smsguard::logging;

#[derive(Debug, Parser)]
#[command(name = "smsguard")]
#[command(about = "Check SMS messages for spam and browse prediction history")]
struct App {
    /// Enable debug logging (overridden by SMSGUARD_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Primary service base address for this invocation
    #[arg(long, global = true)]
    url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Classify a message; with no text, prompt for messages on stdin
    Check {
        /// Message text (words are joined with spaces)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// List past predictions with stats
    History {
        /// Label filter: all, spam, ham
        #[arg(long, default_value = "all")]
        filter: LabelFilter,
        /// Case-insensitive search over message text
        #[arg(long)]
        search: Option<String>,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Delete the remote prediction history
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Export the full prediction history as CSV
    Export {
        /// Output file, or a directory to write the default file name into
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Check configuration and service reachability
    Health,
    /// Show or edit configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default config to ~/.smsguard/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `service.base_url http://sms.lan:5000`
    Set { key: String, value: String },
    /// Reset ~/.smsguard/config.toml to defaults
    Reset,
}

fn main() -> ExitCode {
    let app = App::parse();
    logging::init(app.verbose);

    match run(app) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(app: App) -> Result<ExitCode> {
    let mut cfg = config::load();
    if let Some(url) = app.url {
        cfg.service.base_url = url;
    }
    if !cfg.display.color {
        colored::control::set_override(false);
    }

    match app.command {
        Commands::Check { text, format } => {
            cli::run_check(&cfg, &text, OutputFormat::from_str_opt(Some(&format)))
        }
        Commands::History {
            filter,
            search,
            format,
        } => cli::run_history(&cfg, filter, search, OutputFormat::from_str_opt(Some(&format))),
        Commands::Clear { yes } => cli::run_clear(&cfg, yes),
        Commands::Export { output } => cli::run_export(&cfg, output),
        Commands::Health => cli::run_health(&cfg),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(&cfg),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
