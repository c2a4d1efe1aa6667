//! Configuration system for smsguard.
//!
//! Provides a layered configuration hierarchy:
//!
//! 1. **Built-in defaults**: [`schema::GuardConfig::default()`]
//! 2. **User global config**: `~/.smsguard/config.toml`
//! 3. **Project local config**: `.smsguard.toml` in the current directory
//! 4. **Environment variables**: `SMSGUARD_*` overrides (highest precedence)
//!
//! # Usage
//!
//! ```rust,ignore
//! use smsguard::config;
//!
//! let cfg = config::load();
//! let client = HttpService::from_config(&cfg.service);
//! ```
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

pub use schema::GuardConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env.
/// Layers merge per key, so a project file only needs the keys it changes.
pub fn load() -> GuardConfig {
    let mut merged = defaults_value();

    for path in [global_config_path(), project_config_path()].into_iter().flatten() {
        if let Some(layer) = load_toml_layer(&path) {
            merge_values(&mut merged, layer);
        }
    }

    let mut config = match merged.try_into::<GuardConfig>() {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "merged config is invalid; using defaults");
            GuardConfig::default()
        }
    };

    apply_env_overrides(&mut config);

    config
}

fn defaults_value() -> toml::Value {
    toml::Value::try_from(GuardConfig::default())
        .unwrap_or_else(|_| toml::Value::Table(toml::Table::new()))
}

/// Read one TOML config layer from `path`, if it exists.
///
/// Returns `None` if the file is missing or does not describe a valid
/// config. Invalid files are logged and skipped as a whole.
fn load_toml_layer(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    let checked = toml::from_str::<GuardConfig>(&content)
        .and_then(|_| toml::from_str::<toml::Value>(&content));
    match checked {
        Ok(layer) => {
            debug!(path = %path.display(), "loaded config file");
            Some(layer)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring malformed config file");
            None
        }
    }
}

/// Merge `overlay` into `base`: tables merge key by key, anything else in
/// the overlay replaces the base value.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.smsguard/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".smsguard").join("config.toml"))
}

/// Path to the project local config: `.smsguard.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".smsguard.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `SMSGUARD_URL`: primary service base address
/// - `SMSGUARD_FALLBACK_URL`: fallback base address
/// - `SMSGUARD_TIMEOUT_MS`: request timeout (`0` = none)
/// - `SMSGUARD_SPAM_THRESHOLD`: spam alert ratio
/// - `SMSGUARD_EXPORT_FILE`: CSV export file name
/// - `SMSGUARD_COLOR`: colour output (`1`/`true`/`yes`/`on`)
/// - `NO_COLOR`: disables colour when set to any non-empty value
fn apply_env_overrides(config: &mut GuardConfig) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

/// Apply overrides from an arbitrary variable source.
fn apply_overrides<F>(config: &mut GuardConfig, var: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = var("SMSGUARD_URL")
        && !val.is_empty()
    {
        config.service.base_url = val;
    }
    if let Some(val) = var("SMSGUARD_FALLBACK_URL")
        && !val.is_empty()
    {
        config.service.fallback_url = val;
    }
    if let Some(val) = var("SMSGUARD_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.service.timeout_ms = ms;
    }
    if let Some(val) = var("SMSGUARD_SPAM_THRESHOLD")
        && let Ok(ratio) = val.parse::<f64>()
    {
        config.alerts.spam_ratio_threshold = ratio;
    }
    if let Some(val) = var("SMSGUARD_EXPORT_FILE")
        && !val.is_empty()
    {
        config.export.file_name = val;
    }
    if let Some(val) = var("SMSGUARD_COLOR") {
        config.display.color = is_truthy(&val);
    }
    if var("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        config.display.color = false;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.smsguard/config.toml`.
///
/// Returns an error if the file already exists (use `force = true` to
/// overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.smsguard/ directory")?;
    }

    fs::write(&path, GuardConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Supports dotted keys like `service.base_url`. When no file exists yet the
/// defaults are written first.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&GuardConfig::default())
            .context("failed to serialize default config")?
    };

    let mut value_table: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut value_table, key, value)?;

    // Reject edits that would leave the file unloadable.
    let updated = toml::to_string_pretty(&value_table).context("failed to serialize config")?;
    toml::from_str::<GuardConfig>(&updated)
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, updated).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    let Some((&leaf, sections)) = parts.split_last() else {
        anyhow::bail!("empty config key");
    };

    let mut current = root;
    for part in sections {
        current = current
            .get_mut(*part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => anyhow::bail!("unknown config key '{key}'"),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config(config: &GuardConfig) -> Result<String> {
    toml::to_string_pretty(config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
