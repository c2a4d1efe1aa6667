//! Error types shared by the service client and the controllers.

use std::path::PathBuf;

use thiserror::Error;

/// Failure talking to the classification service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request never produced an HTTP response (refused, DNS, reset).
    #[error("could not reach {url}: {reason}")]
    Transport { url: String, reason: String },

    /// The service answered with a non-2xx status.
    #[error("server returned HTTP {status}{}", detail_suffix(.message))]
    Status {
        status: u16,
        message: Option<String>,
    },

    /// A 2xx response whose body could not be decoded.
    #[error("invalid response from {url}: {reason}")]
    Data { url: String, reason: String },

    #[error("no service endpoints configured")]
    NoEndpoints,
}

impl ServiceError {
    /// Whether another candidate endpoint may be tried after this error.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Short message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message
                .clone()
                .unwrap_or_else(|| "Server error".to_string()),
            Self::Transport { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }
}

fn service_message(err: &ServiceError) -> String {
    err.user_message()
}

fn detail_suffix(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {m}"),
        None => String::new(),
    }
}

/// Extract a readable message from an error response body.
///
/// JSON bodies yield their `error` or `message` field, or the compact JSON
/// itself. Anything else yields the trimmed raw text. Empty bodies yield
/// `None`.
pub fn extract_error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(json) => {
            let field = ["error", "message"].iter().find_map(|key| {
                json.get(key)
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            });
            Some(field.unwrap_or_else(|| json.to_string()))
        }
        Err(_) => Some(trimmed.to_string()),
    }
}

/// Failure of a checker action.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Please enter an SMS message to check.")]
    EmptyInput,

    #[error("Error: {}", service_message(.0))]
    Service(#[from] ServiceError),
}

/// Failure of a CSV export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No history data to download")]
    NoHistory,

    #[error("failed to write {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
