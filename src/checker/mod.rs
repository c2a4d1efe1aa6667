/// Checker controller: classify one message and render the result.
///
/// The controller owns the state of the checker view: whether the trigger is
/// enabled, whether the loading indicator is on, and the last rendered
/// result. Rendering goes through the pure [`interpret`] projection so the
/// terminal binding in `cli` stays thin.
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::CheckError;
use crate::model::{PredictResponse, Verdict};
use crate::service::PredictionService;
use crate::view::{BusyGuard, BusyHook, ViewState, confidence_pct};

/// Rendered classification result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckView {
    pub verdict: Verdict,
    /// `"Spam"` or `"Not Spam"`.
    pub label: &'static str,
    pub confidence_pct: i64,
    /// Optional explanation supplied by the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl CheckView {
    pub fn confidence_line(&self) -> String {
        format!("Confidence: {}%", self.confidence_pct)
    }
}

/// Project a classify response into its view model.
pub fn interpret(resp: &PredictResponse) -> CheckView {
    let verdict = resp.verdict();
    CheckView {
        verdict,
        label: verdict.display_name(),
        confidence_pct: confidence_pct(resp.spam_probability()),
        explanation: resp.message.clone().filter(|m| !m.is_empty()),
    }
}

/// Trim user input, rejecting empty or whitespace-only messages.
pub fn prepare_input(raw: &str) -> Result<&str, CheckError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(CheckError::EmptyInput);
    }
    Ok(text)
}

/// State of the checker view.
pub struct Checker<S> {
    service: S,
    state: ViewState,
    busy: bool,
    on_busy: Option<BusyHook>,
    result: Option<CheckView>,
    result_visible: bool,
}

impl<S: PredictionService> Checker<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            state: ViewState::Idle,
            busy: false,
            on_busy: None,
            result: None,
            result_visible: false,
        }
    }

    /// Notify `hook` when a request starts (`true`) and settles (`false`).
    pub fn on_busy(mut self, hook: impl FnMut(bool) + 'static) -> Self {
        self.on_busy = Some(Box::new(hook));
        self
    }

    /// Classify `raw` and render the result.
    ///
    /// Empty input is rejected before any request is made and leaves the view
    /// untouched. While the request is in flight the trigger is disabled and
    /// the result area hidden; the trigger is re-enabled however the request
    /// settles. On failure the previous result is kept but stays hidden.
    pub fn check(&mut self, raw: &str) -> Result<&CheckView, CheckError> {
        let text = prepare_input(raw)?;

        self.state = ViewState::Loading;
        self.result_visible = false;

        let outcome = {
            let _busy = BusyGuard::engage(&mut self.busy, self.on_busy.as_mut());
            self.service.predict(text)
        };

        match outcome {
            Ok(resp) => {
                let view = interpret(&resp);
                debug!(verdict = %view.verdict, confidence = view.confidence_pct, "message classified");
                self.state = ViewState::Rendered;
                self.result_visible = true;
                Ok(&*self.result.insert(view))
            }
            Err(err) => {
                warn!(error = %err, "classification failed");
                self.state = ViewState::Error;
                Err(CheckError::Service(err))
            }
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Whether the check trigger accepts input. Only observable as `false`
    /// from a busy hook while a request is in flight.
    pub fn trigger_enabled(&self) -> bool {
        !self.busy
    }

    pub fn is_loading(&self) -> bool {
        self.busy
    }

    /// The result currently shown, if the result area is visible.
    pub fn visible_result(&self) -> Option<&CheckView> {
        self.result.as_ref().filter(|_| self.result_visible)
    }

    /// The last successful result, visible or not.
    pub fn last_result(&self) -> Option<&CheckView> {
        self.result.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(label: serde_json::Value, probability: Option<f64>) -> PredictResponse {
        PredictResponse {
            label,
            probability,
            ..Default::default()
        }
    }

    #[test]
    fn prepare_input_trims() {
        assert_eq!(prepare_input("  hello \n").unwrap(), "hello");
        assert!(matches!(prepare_input(""), Err(CheckError::EmptyInput)));
        assert!(matches!(prepare_input(" \t\n "), Err(CheckError::EmptyInput)));
    }

    #[test]
    fn interpret_spam_string_label() {
        let view = interpret(&response(json!("Spam"), Some(0.934)));
        assert_eq!(view.verdict, Verdict::Spam);
        assert_eq!(view.label, "Spam");
        assert_eq!(view.confidence_line(), "Confidence: 93%");
        assert!(view.explanation.is_none());
    }

    #[test]
    fn interpret_numeric_labels() {
        assert_eq!(interpret(&response(json!(1), None)).verdict, Verdict::Spam);
        let ham = interpret(&response(json!(0), None));
        assert_eq!(ham.verdict, Verdict::Ham);
        assert_eq!(ham.label, "Not Spam");
        assert_eq!(ham.confidence_pct, 0);
    }

    #[test]
    fn interpret_keeps_message() {
        let resp = PredictResponse {
            label: json!("ham"),
            prob: Some(0.05),
            message: Some("Looks like a personal message".to_string()),
            ..Default::default()
        };
        let view = interpret(&resp);
        assert_eq!(view.confidence_pct, 5);
        assert_eq!(
            view.explanation.as_deref(),
            Some("Looks like a personal message")
        );
    }
}
