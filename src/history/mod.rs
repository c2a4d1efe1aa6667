//! History controller: load, filter, summarise, clear and export past
//! predictions.
//!
//! The controller holds the only copy of the history list and the active
//! filter. Everything it renders ([`HistoryController::view`],
//! [`HistoryController::stats`]) is a pure projection of those two values;
//! records are never edited in place. The list is replaced wholesale by a
//! successful load and emptied by a successful clear. Failures leave it
//! untouched.
pub mod filter;
pub mod stats;
pub mod view;

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::schema::DEFAULT_SPAM_RATIO_THRESHOLD;
use crate::error::{ExportError, ServiceError};
use crate::export;
use crate::model::PredictionRecord;
use crate::service::PredictionService;
use crate::view::ViewState;

pub use filter::{FilterState, LabelFilter, project};
pub use stats::HistoryStats;
pub use view::{HistoryRow, HistoryView, Tone};

/// Why the last load failed.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadFailure {
    Server(Option<String>),
    InvalidResponse,
    Offline,
}

/// Result of a clear request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// The user declined; nothing was sent.
    Cancelled,
    Cleared,
}

/// State of the history view.
#[derive(Debug)]
pub struct HistoryController<S> {
    service: S,
    records: Vec<PredictionRecord>,
    filter: FilterState,
    state: ViewState,
    failure: Option<LoadFailure>,
    alert_threshold: f64,
}

impl<S: PredictionService> HistoryController<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            records: Vec::new(),
            filter: FilterState::default(),
            state: ViewState::Idle,
            failure: None,
            alert_threshold: DEFAULT_SPAM_RATIO_THRESHOLD,
        }
    }

    /// Override the spam ratio above which the alert is raised.
    pub fn with_alert_threshold(mut self, threshold: f64) -> Self {
        self.alert_threshold = threshold;
        self
    }

    // -----------------------------------------------------------------------
    // Load
    // -----------------------------------------------------------------------

    /// Fetch the full history from the service.
    ///
    /// On success the held list is replaced. On failure the held list is kept
    /// and the view shows why the load failed.
    pub fn load(&mut self) -> Result<(), ServiceError> {
        self.state = ViewState::Loading;

        match self.service.fetch_history() {
            Ok(records) => {
                info!(count = records.len(), "history replaced");
                self.records = records;
                self.failure = None;
                self.state = ViewState::Rendered;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "could not load history");
                self.failure = Some(match &err {
                    ServiceError::Status { message, .. } => LoadFailure::Server(message.clone()),
                    ServiceError::Data { .. } => LoadFailure::InvalidResponse,
                    ServiceError::Transport { .. } | ServiceError::NoEndpoints => {
                        LoadFailure::Offline
                    }
                });
                self.state = ViewState::Error;
                Err(err)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Filter / search
    // -----------------------------------------------------------------------

    pub fn set_label_filter(&mut self, label: LabelFilter) {
        self.filter.label = label;
        self.rerender();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.filter.query = query.into();
        self.rerender();
    }

    pub fn set_filter(&mut self, filter: FilterState) {
        self.filter = filter;
        self.rerender();
    }

    /// Filter changes re-render the held list without touching the network.
    fn rerender(&mut self) {
        debug!(filter = %self.filter.label, query = %self.filter.query, "re-rendering history");
        if self.state == ViewState::Error {
            self.failure = None;
            self.state = ViewState::Rendered;
        }
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    // -----------------------------------------------------------------------
    // Projections
    // -----------------------------------------------------------------------

    /// The full held list, unfiltered.
    pub fn records(&self) -> &[PredictionRecord] {
        &self.records
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Records visible under the active filter, in service order.
    pub fn visible(&self) -> Vec<&PredictionRecord> {
        project(&self.records, &self.filter)
    }

    /// What the list area shows right now.
    pub fn view(&self) -> HistoryView {
        match (self.state, &self.failure) {
            (ViewState::Loading, _) => HistoryView::Loading,
            (ViewState::Error, Some(LoadFailure::Server(detail))) => {
                HistoryView::ServerError(detail.clone())
            }
            (ViewState::Error, Some(LoadFailure::InvalidResponse)) => HistoryView::InvalidResponse,
            (ViewState::Error, _) => HistoryView::Offline,
            _ => {
                let rows: Vec<HistoryRow> =
                    self.visible().into_iter().map(HistoryRow::from_record).collect();
                if rows.is_empty() {
                    HistoryView::NoMatches
                } else {
                    HistoryView::Rows(rows)
                }
            }
        }
    }

    /// Counts over the full list, independent of the filter.
    pub fn stats(&self) -> HistoryStats {
        HistoryStats::compute(&self.records)
    }

    /// Summary line, or the load failure marker (`Error` / `Offline`).
    pub fn stats_line(&self) -> String {
        match &self.failure {
            Some(LoadFailure::Offline) => "Offline".to_string(),
            Some(_) => "Error".to_string(),
            None => self.stats().summary(),
        }
    }

    pub fn alert_threshold(&self) -> f64 {
        self.alert_threshold
    }

    pub fn alert_raised(&self) -> bool {
        self.stats().alert_raised(self.alert_threshold)
    }

    pub fn overlay_opacity(&self) -> &'static str {
        self.stats().overlay_opacity(self.alert_threshold)
    }

    // -----------------------------------------------------------------------
    // Clear
    // -----------------------------------------------------------------------

    /// Delete the remote history once the user has confirmed.
    ///
    /// Local state is only emptied after the service reports success.
    pub fn clear(&mut self, confirmed: bool) -> Result<ClearOutcome, ServiceError> {
        if !confirmed {
            debug!("clear cancelled by user");
            return Ok(ClearOutcome::Cancelled);
        }

        self.service.clear_history()?;
        self.records.clear();
        self.failure = None;
        self.state = ViewState::Rendered;
        Ok(ClearOutcome::Cleared)
    }

    // -----------------------------------------------------------------------
    // Export
    // -----------------------------------------------------------------------

    /// CSV of the full held list, ignoring the active filter.
    pub fn export_csv(&self) -> Result<String, ExportError> {
        export::to_csv(&self.records)
    }

    /// Write the CSV of the full held list to `path`.
    pub fn export_to(&self, path: &Path) -> Result<PathBuf, ExportError> {
        export::write_csv(&self.records, path)
    }
}
