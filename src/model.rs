/// Wire types exchanged with the classification service.
///
/// The service is loosely typed: history entries carry extra fields
/// (`isSpam`, `fallback`), labels arrive as strings or numbers, and
/// probabilities may be missing entirely. Missing values are defaulted and
/// scalars are stringified rather than rejected.
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// History records
// ---------------------------------------------------------------------------

/// A single past prediction as returned by `GET /history`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PredictionRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: String,
    /// Raw label from the service, e.g. `"Spam"` or `"Not Spam"`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub label: String,
    /// Spam probability in `[0, 1]`; `0` when absent.
    #[serde(default, deserialize_with = "lenient_probability")]
    pub probability: f64,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<String>,
    /// Mobile operator the message came through, if the service knows it.
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub carrier: Option<String>,
}

impl PredictionRecord {
    /// Whether the stored label marks this record as spam.
    pub fn is_spam(&self) -> bool {
        self.label.eq_ignore_ascii_case("spam")
    }
}

/// Body of a successful `GET /history` response.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub history: Option<Vec<PredictionRecord>>,
}

impl HistoryResponse {
    pub fn into_records(self) -> Vec<PredictionRecord> {
        self.history.unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Interpreted outcome of a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Spam,
    Ham,
}

impl Verdict {
    /// Interpret a response label that may be a string (`"spam"`, `"ham"`,
    /// `"Not Spam"`, `"1"`) or a number (`1` / `0`).
    pub fn from_label(label: &Value) -> Self {
        let spam = match label {
            Value::String(s) => s.eq_ignore_ascii_case("spam") || s == "1",
            Value::Number(n) => n.as_f64() == Some(1.0),
            _ => false,
        };
        if spam { Self::Spam } else { Self::Ham }
    }

    /// Human-facing label.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Spam => "Spam",
            Self::Ham => "Not Spam",
        }
    }

    pub fn is_spam(self) -> bool {
        self == Self::Spam
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spam => write!(f, "spam"),
            Self::Ham => write!(f, "ham"),
        }
    }
}

/// Body of a successful `POST /predict` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub label: Value,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub probability: Option<f64>,
    /// Older service builds report the probability under this name.
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub prob: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub message: Option<String>,
}

impl PredictResponse {
    pub fn verdict(&self) -> Verdict {
        Verdict::from_label(&self.label)
    }

    /// `probability`, falling back to `prob`, falling back to `0`.
    pub fn spam_probability(&self) -> f64 {
        self.probability.or(self.prob).unwrap_or(0.0)
    }
}

/// Body of the service's `GET /` health route.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Lenient field decoders
// ---------------------------------------------------------------------------

/// Render a scalar JSON value as a string; `null` becomes `None`.
fn coerce_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_string(value).unwrap_or_default())
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_string(value).filter(|s| !s.is_empty()))
}

fn lenient_probability<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_f64(&value).unwrap_or(0.0))
}

fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_f64(&value))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
