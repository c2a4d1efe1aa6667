/// View models for the history list.
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

use crate::model::PredictionRecord;
use crate::view::confidence_pct;

/// Visual tone of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Spam,
    Safe,
}

/// One rendered history entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub text: String,
    pub label: String,
    pub confidence_pct: i64,
    /// Local-time rendering of the timestamp; empty when absent.
    pub time: String,
    pub tone: Tone,
}

impl HistoryRow {
    pub fn from_record(record: &PredictionRecord) -> Self {
        Self::from_record_in(record, &Local)
    }

    /// Like [`from_record`](Self::from_record) with an explicit display zone.
    pub fn from_record_in<Tz>(record: &PredictionRecord, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        Self {
            text: record.text.clone(),
            label: record.label.clone(),
            confidence_pct: confidence_pct(record.probability),
            time: record
                .timestamp
                .as_deref()
                .map(|ts| format_timestamp_in(ts, tz))
                .unwrap_or_default(),
            tone: if record.is_spam() { Tone::Spam } else { Tone::Safe },
        }
    }

    /// `"{label} · {pct}% · {time}"`.
    pub fn meta_line(&self) -> String {
        format!("{} · {}% · {}", self.label, self.confidence_pct, self.time)
    }
}

/// What the history list area shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum HistoryView {
    Loading,
    Rows(Vec<HistoryRow>),
    NoMatches,
    ServerError(Option<String>),
    InvalidResponse,
    Offline,
}

impl HistoryView {
    /// Placeholder line for every state that has no rows.
    pub fn placeholder(&self) -> Option<String> {
        match self {
            Self::Rows(_) => None,
            Self::Loading => Some("Loading history…".to_string()),
            Self::NoMatches => Some("No matching history.".to_string()),
            Self::ServerError(detail) => Some(match detail {
                Some(d) => format!("Could not load history (server error): {d}."),
                None => "Could not load history (server error).".to_string(),
            }),
            Self::InvalidResponse => Some("Could not load history (invalid response).".to_string()),
            Self::Offline => Some("Could not load history (network).".to_string()),
        }
    }

    pub fn rows(&self) -> &[HistoryRow] {
        match self {
            Self::Rows(rows) => rows,
            _ => &[],
        }
    }
}

/// Render an ISO-8601 timestamp in `tz`.
///
/// Offset-qualified timestamps are converted; naive ones are taken as UTC.
/// Unparseable input is returned unchanged.
pub fn format_timestamp_in<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match parse_timestamp(raw) {
        Some(utc) => utc.with_timezone(tz).format("%Y-%m-%d %H:%M:%S").to_string(),
        None => raw.to_string(),
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}
