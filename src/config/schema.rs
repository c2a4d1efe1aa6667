/// Configuration schema and defaults for smsguard.
///
/// Defines the TOML-serializable configuration structure with the sections
/// `[service]`, `[alerts]`, `[export]` and `[display]`. Every field has a
/// built-in default; users only set what they want to override.
use serde::{Deserialize, Serialize};

/// Default primary base address of the classification service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Loopback address tried when the primary address is unreachable.
pub const DEFAULT_FALLBACK_URL: &str = "http://127.0.0.1:5000";

/// Spam share of the history above which the alert banner is raised.
pub const DEFAULT_SPAM_RATIO_THRESHOLD: f64 = 0.4;

/// File name used for CSV exports.
pub const DEFAULT_EXPORT_FILE: &str = "Predicted_SPAM_SMS.csv";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level smsguard configuration.
///
/// Maps directly to `~/.smsguard/config.toml` and `.smsguard.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub service: ServiceConfig,
    pub alerts: AlertConfig,
    pub export: ExportConfig,
    pub display: DisplayConfig,
}

// ---------------------------------------------------------------------------
// [service]
// ---------------------------------------------------------------------------

/// Where the classification service lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Primary base address. Classification requests only go here.
    pub base_url: String,
    /// Tried for history calls when `base_url` cannot be reached.
    pub fallback_url: String,
    /// Per-request timeout in milliseconds; `0` waits indefinitely.
    pub timeout_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            fallback_url: DEFAULT_FALLBACK_URL.to_string(),
            timeout_ms: 0,
        }
    }
}

impl ServiceConfig {
    /// Candidate base addresses in the order they are tried.
    pub fn candidates(&self) -> Vec<String> {
        vec![self.base_url.clone(), self.fallback_url.clone()]
    }
}

// ---------------------------------------------------------------------------
// [alerts]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Raise the spam alert when `spam / total` exceeds this ratio.
    pub spam_ratio_threshold: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            spam_ratio_threshold: DEFAULT_SPAM_RATIO_THRESHOLD,
        }
    }
}

// ---------------------------------------------------------------------------
// [export]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_EXPORT_FILE.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [display]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Colourise terminal output.
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

impl GuardConfig {
    /// Annotated default config written by `smsguard config init`.
    pub fn default_toml() -> String {
        r#"# smsguard configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (SMSGUARD_*)
#   2. Project config (.smsguard.toml in current directory)
#   3. User global config (~/.smsguard/config.toml)
#   4. Built-in defaults

[service]
base_url = "http://localhost:5000"      # Primary address; /predict only goes here
fallback_url = "http://127.0.0.1:5000"  # Tried for /history when base_url is unreachable
timeout_ms = 0                          # 0 = wait indefinitely

[alerts]
spam_ratio_threshold = 0.4              # Warn when more than 40% of history is spam

[export]
file_name = "Predicted_SPAM_SMS.csv"

[display]
color = true
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
