//! HTTP client tests against a scripted local server.
//!
//! Covers request shapes, endpoint fallback and how error responses are
//! classified. Fallback is exercised with a base address on a port nothing
//! listens on, so the connection is refused at the transport level.
mod common;

use common::{DEAD_BASE, MockServer};
use smsguard::error::ServiceError;
use smsguard::history::{HistoryController, HistoryView};
use smsguard::model::Verdict;
use smsguard::service::{Endpoints, HttpService, PredictionService};

const HISTORY_BODY: &str = r#"{"history": [
    {"timestamp": "2025-03-01T10:15:00Z", "text": "WIN a prize", "label": "Spam", "probability": 0.97, "isSpam": true},
    {"timestamp": "2025-03-01T09:00:00Z", "text": "See you soon", "label": "Not Spam", "probability": 0.04, "carrier": "Smart"}
]}"#;

// ---------------------------------------------------------------------------
// predict
// ---------------------------------------------------------------------------

#[test]
fn predict_posts_text_as_json() {
    let server = MockServer::start(vec![(200, r#"{"label": "Spam", "probability": 0.91, "text": "WIN"}"#)]);
    let service = HttpService::new(Endpoints::new([server.base.as_str()]));

    let resp = service.predict("WIN").unwrap();
    assert_eq!(resp.verdict(), Verdict::Spam);
    assert_eq!(resp.spam_probability(), 0.91);

    let seen = server.finish();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].path, "/predict");
    let body: serde_json::Value = serde_json::from_str(&seen[0].body).unwrap();
    assert_eq!(body, serde_json::json!({ "text": "WIN" }));
}

#[test]
fn predict_surfaces_server_error_message() {
    let server = MockServer::start(vec![(400, r#"{"error": "`text` field is required."}"#)]);
    let service = HttpService::new(Endpoints::new([server.base.as_str()]));

    match service.predict("x") {
        Err(ServiceError::Status { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message.as_deref(), Some("`text` field is required."));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    server.finish();
}

#[test]
fn predict_does_not_fall_back() {
    let service = HttpService::new(Endpoints::new([DEAD_BASE, "http://127.0.0.1:2"]));
    match service.predict("hello") {
        Err(ServiceError::Transport { url, .. }) => {
            assert_eq!(url, format!("{DEAD_BASE}/predict"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn predict_rejects_non_json_success_body() {
    let server = MockServer::start(vec![(200, "<html>oops</html>")]);
    let service = HttpService::new(Endpoints::new([server.base.as_str()]));
    assert!(matches!(service.predict("hi"), Err(ServiceError::Data { .. })));
    server.finish();
}

// ---------------------------------------------------------------------------
// history
// ---------------------------------------------------------------------------

#[test]
fn fetch_history_decodes_records() {
    let server = MockServer::start(vec![(200, HISTORY_BODY)]);
    let service = HttpService::new(Endpoints::new([server.base.as_str()]));

    let records = service.fetch_history().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records[0].is_spam());
    assert_eq!(records[1].carrier.as_deref(), Some("Smart"));

    let seen = server.finish();
    assert_eq!(seen[0].method, "GET");
    assert_eq!(seen[0].path, "/history");
}

#[test]
fn fetch_history_falls_back_when_primary_unreachable() {
    let server = MockServer::start(vec![(200, HISTORY_BODY)]);
    let service = HttpService::new(Endpoints::new([DEAD_BASE, server.base.as_str()]));

    let records = service.fetch_history().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(server.finish().len(), 1);
}

#[test]
fn fetch_history_does_not_fall_back_on_status() {
    // The second server must never be contacted.
    let primary = MockServer::start(vec![(500, r#"{"history": [], "error": "Invalid history data"}"#)]);
    let fallback = MockServer::start(vec![]);
    let service = HttpService::new(Endpoints::new([
        primary.base.as_str(),
        fallback.base.as_str(),
    ]));

    match service.fetch_history() {
        Err(ServiceError::Status { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message.as_deref(), Some("Invalid history data"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(primary.finish().len(), 1);
    assert!(fallback.finish().is_empty());
}

#[test]
fn fetch_history_offline_when_all_unreachable() {
    let service = HttpService::new(Endpoints::new([DEAD_BASE, "http://127.0.0.1:2"]));
    let err = service.fetch_history().unwrap_err();
    assert!(err.is_transport());
}

#[test]
fn fetch_history_non_json_body_is_data_error_without_fallback() {
    let primary = MockServer::start(vec![(200, "<html>not json</html>")]);
    let fallback = MockServer::start(vec![]);
    let service = HttpService::new(Endpoints::new([
        primary.base.as_str(),
        fallback.base.as_str(),
    ]));

    match service.fetch_history() {
        Err(ServiceError::Data { url, .. }) => assert_eq!(url, format!("{}/history", primary.base)),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(primary.finish().len(), 1);
    assert!(fallback.finish().is_empty());
}

#[test]
fn history_load_with_non_json_body_shows_invalid_response() {
    let server = MockServer::start(vec![(200, "<html>not json</html>")]);
    let mut ctl = HistoryController::new(HttpService::new(Endpoints::new([server.base.as_str()])));

    assert!(ctl.load().is_err());
    assert_eq!(ctl.view(), HistoryView::InvalidResponse);
    assert_eq!(
        ctl.view().placeholder().as_deref(),
        Some("Could not load history (invalid response).")
    );
    assert_eq!(ctl.stats_line(), "Error");
    server.finish();
}

#[test]
fn fetch_history_with_missing_list_is_empty() {
    let server = MockServer::start(vec![(200, "{}")]);
    let service = HttpService::new(Endpoints::new([server.base.as_str()]));
    assert!(service.fetch_history().unwrap().is_empty());
    server.finish();
}

// ---------------------------------------------------------------------------
// clear
// ---------------------------------------------------------------------------

#[test]
fn clear_history_sends_delete_with_fallback() {
    let server = MockServer::start(vec![(200, r#"{"status": "success", "message": "History cleared"}"#)]);
    let service = HttpService::new(Endpoints::new([DEAD_BASE, server.base.as_str()]));

    service.clear_history().unwrap();

    let seen = server.finish();
    assert_eq!(seen[0].method, "DELETE");
    assert_eq!(seen[0].path, "/history");
}

#[test]
fn clear_history_reports_status_failure() {
    let server = MockServer::start(vec![(500, r#"{"error": "Could not clear history file"}"#)]);
    let service = HttpService::new(Endpoints::new([server.base.as_str()]));
    assert!(matches!(
        service.clear_history(),
        Err(ServiceError::Status { status: 500, .. })
    ));
    server.finish();
}

// ---------------------------------------------------------------------------
// ping
// ---------------------------------------------------------------------------

#[test]
fn ping_reports_service_message() {
    let server = MockServer::start(vec![(200, r#"{"ok": true, "message": "API running"}"#)]);
    let service = HttpService::new(Endpoints::new([server.base.as_str()]));
    let message = service.ping().unwrap();
    assert!(message.starts_with("API running"));
    assert_eq!(server.finish()[0].path, "/");
}
