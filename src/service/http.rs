/// Blocking HTTP client for the classification service.
///
/// Uses the synchronous `ureq` client. Classification goes to the primary
/// base address only. History reads and deletes walk the configured
/// candidates through [`Endpoints::try_each`].
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use super::{Endpoints, PredictionService};
use crate::config::schema::ServiceConfig;
use crate::error::{ServiceError, extract_error_message};
use crate::model::{HealthResponse, HistoryResponse, PredictResponse, PredictionRecord};

/// Request body for `POST /predict`.
#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    text: &'a str,
}

/// `ureq`-backed [`PredictionService`].
///
/// Built once per command invocation from the resolved config.
#[derive(Debug)]
pub struct HttpService {
    endpoints: Endpoints,
    agent: ureq::Agent,
}

impl HttpService {
    /// Build a client from the resolved `[service]` config.
    ///
    /// A `timeout_ms` of `0` leaves requests unbounded.
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::with_endpoints(Endpoints::new(config.candidates()), config)
    }

    /// Build a client over explicit endpoints, taking the timeout from
    /// `config`.
    pub fn with_endpoints(endpoints: Endpoints, config: &ServiceConfig) -> Self {
        Self::with_timeout(
            endpoints,
            (config.timeout_ms > 0).then(|| Duration::from_millis(config.timeout_ms)),
        )
    }

    /// Build a client over explicit endpoints.
    pub fn new(endpoints: Endpoints) -> Self {
        Self::with_timeout(endpoints, None)
    }

    fn with_timeout(endpoints: Endpoints, timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            endpoints,
            agent: builder.build(),
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }
}

impl PredictionService for HttpService {
    fn predict(&self, text: &str) -> Result<PredictResponse, ServiceError> {
        let url = self.endpoints.primary_url("/predict")?;
        debug!(%url, chars = text.chars().count(), "classifying message");

        let resp = self
            .agent
            .post(&url)
            .send_json(PredictRequest { text })
            .map_err(|e| classify_error(&url, e))?;

        resp.into_json::<PredictResponse>()
            .map_err(|e| data_error(&url, &e))
    }

    fn fetch_history(&self) -> Result<Vec<PredictionRecord>, ServiceError> {
        let records = self.endpoints.try_each("/history", |url| {
            let resp = self
                .agent
                .get(url)
                .call()
                .map_err(|e| classify_error(url, e))?;
            let body: HistoryResponse = resp.into_json().map_err(|e| data_error(url, &e))?;
            Ok(body.into_records())
        })?;

        info!(count = records.len(), "history loaded");
        Ok(records)
    }

    fn clear_history(&self) -> Result<(), ServiceError> {
        self.endpoints.try_each("/history", |url| {
            self.agent
                .delete(url)
                .call()
                .map(|_| ())
                .map_err(|e| classify_error(url, e))
        })?;

        info!("remote history cleared");
        Ok(())
    }

    fn ping(&self) -> Result<String, ServiceError> {
        self.endpoints.try_each("/", |url| {
            let resp = self
                .agent
                .get(url)
                .call()
                .map_err(|e| classify_error(url, e))?;
            let health: HealthResponse = resp.into_json().map_err(|e| data_error(url, &e))?;
            let message = health.message.unwrap_or_else(|| {
                if health.ok { "ok" } else { "service answered" }.to_string()
            });
            Ok(format!("{message} ({url})"))
        })
    }
}

/// Split a `ureq` failure into transport and status errors.
fn classify_error(url: &str, err: ureq::Error) -> ServiceError {
    match err {
        ureq::Error::Status(status, resp) => {
            let body = resp.into_string().unwrap_or_default();
            ServiceError::Status {
                status,
                message: extract_error_message(&body),
            }
        }
        ureq::Error::Transport(transport) => ServiceError::Transport {
            url: url.to_string(),
            reason: transport.to_string(),
        },
    }
}

fn data_error(url: &str, err: &std::io::Error) -> ServiceError {
    ServiceError::Data {
        url: url.to_string(),
        reason: err.to_string(),
    }
}
