//! Access to the remote classification service.
//!
//! Controllers depend on the [`PredictionService`] trait rather than on HTTP
//! directly, so their state handling can be exercised with in-memory fakes.
//! The production implementation is [`http::HttpService`].
//!
//! # Endpoint fallback
//!
//! History calls walk an ordered list of candidate base addresses
//! ([`Endpoints`]). The next candidate is tried only when the previous one
//! failed at the transport level (connection refused, DNS, reset). An HTTP
//! error status is an answer from the service and ends the walk.
pub mod http;

use tracing::{debug, warn};

use crate::error::ServiceError;
use crate::model::{PredictResponse, PredictionRecord};

pub use http::HttpService;

/// Operations the controllers need from the classification service.
pub trait PredictionService {
    /// Classify a single message (`POST /predict`).
    fn predict(&self, text: &str) -> Result<PredictResponse, ServiceError>;

    /// Fetch the full prediction history (`GET /history`).
    fn fetch_history(&self) -> Result<Vec<PredictionRecord>, ServiceError>;

    /// Delete the remote prediction history (`DELETE /history`).
    fn clear_history(&self) -> Result<(), ServiceError>;

    /// Check that the service answers (`GET /`), returning its status message.
    fn ping(&self) -> Result<String, ServiceError>;
}

impl<S: PredictionService + ?Sized> PredictionService for &S {
    fn predict(&self, text: &str) -> Result<PredictResponse, ServiceError> {
        (**self).predict(text)
    }

    fn fetch_history(&self) -> Result<Vec<PredictionRecord>, ServiceError> {
        (**self).fetch_history()
    }

    fn clear_history(&self) -> Result<(), ServiceError> {
        (**self).clear_history()
    }

    fn ping(&self) -> Result<String, ServiceError> {
        (**self).ping()
    }
}

// ---------------------------------------------------------------------------
// Candidate base addresses
// ---------------------------------------------------------------------------

/// Ordered, de-duplicated list of service base addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    candidates: Vec<String>,
}

impl Endpoints {
    /// Build from base URLs in priority order. Trailing slashes are dropped,
    /// and blank or repeated entries are skipped.
    pub fn new<I, S>(bases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut candidates: Vec<String> = Vec::new();
        for base in bases {
            let base = base.as_ref().trim().trim_end_matches('/');
            if base.is_empty() || candidates.iter().any(|c| c == base) {
                continue;
            }
            candidates.push(base.to_string());
        }
        Self { candidates }
    }

    /// The first (preferred) base address.
    pub fn primary(&self) -> Option<&str> {
        self.candidates.first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Full URL for `path` on the primary base address.
    pub fn primary_url(&self, path: &str) -> Result<String, ServiceError> {
        self.primary()
            .map(|base| join(base, path))
            .ok_or(ServiceError::NoEndpoints)
    }

    /// Run `attempt` against `path` on each candidate in order.
    ///
    /// Returns the first outcome that is not a transport failure. If every
    /// candidate fails at the transport level, the last transport error is
    /// returned.
    pub fn try_each<T, F>(&self, path: &str, mut attempt: F) -> Result<T, ServiceError>
    where
        F: FnMut(&str) -> Result<T, ServiceError>,
    {
        let mut last_err = None;

        for base in &self.candidates {
            let url = join(base, path);
            debug!(%url, "trying endpoint");
            match attempt(&url) {
                Err(err) if err.is_transport() => {
                    warn!(%url, error = %err, "endpoint unreachable");
                    last_err = Some(err);
                }
                outcome => return outcome,
            }
        }

        Err(last_err.unwrap_or(ServiceError::NoEndpoints))
    }
}

fn join(base: &str, path: &str) -> String {
    format!("{}/{}", base, path.trim_start_matches('/'))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
