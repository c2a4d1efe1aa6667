/// Label filter and free-text search over the history list.
///
/// [`project`] is the whole filtering pipeline: it never mutates or reorders
/// records, it only selects which ones the view shows.
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::model::PredictionRecord;

/// Which labels the history view shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelFilter {
    #[default]
    All,
    /// Only spam-labelled records.
    Spam,
    /// Every record that is not spam-labelled.
    Ham,
}

impl LabelFilter {
    pub fn admits(self, record: &PredictionRecord) -> bool {
        match self {
            Self::All => true,
            Self::Spam => record.is_spam(),
            Self::Ham => !record.is_spam(),
        }
    }
}

impl fmt::Display for LabelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Spam => write!(f, "spam"),
            Self::Ham => write!(f, "ham"),
        }
    }
}

impl FromStr for LabelFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "spam" => Ok(Self::Spam),
            "ham" | "safe" => Ok(Self::Ham),
            other => Err(format!("unknown filter '{other}' (expected all, spam or ham)")),
        }
    }
}

/// Label filter plus search query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub label: LabelFilter,
    pub query: String,
}

impl FilterState {
    pub fn new(label: LabelFilter, query: impl Into<String>) -> Self {
        Self {
            label,
            query: query.into(),
        }
    }

    /// Lower-cased, trimmed query, or `None` when there is nothing to search.
    pub fn needle(&self) -> Option<String> {
        let q = self.query.trim();
        (!q.is_empty()).then(|| q.to_lowercase())
    }
}

/// Records visible under `filter`, in their original order.
///
/// The label filter is applied first, then a case-insensitive substring
/// search over the message text.
pub fn project<'a>(records: &'a [PredictionRecord], filter: &FilterState) -> Vec<&'a PredictionRecord> {
    let needle = filter.needle();
    records
        .iter()
        .filter(|r| filter.label.admits(r))
        .filter(|r| match &needle {
            Some(n) => r.text.to_lowercase().contains(n.as_str()),
            None => true,
        })
        .collect()
}
