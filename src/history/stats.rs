/// Summary counts over the full history list.
use serde::Serialize;

use crate::model::PredictionRecord;

/// Totals over the whole held list, regardless of filter or query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HistoryStats {
    pub total: usize,
    pub spam: usize,
    pub safe: usize,
}

impl HistoryStats {
    pub fn compute(records: &[PredictionRecord]) -> Self {
        let total = records.len();
        let spam = records.iter().filter(|r| r.is_spam()).count();
        Self {
            total,
            spam,
            safe: total - spam,
        }
    }

    /// e.g. `"10 items · 3 spam · 7 safe"`.
    pub fn summary(&self) -> String {
        format!("{} items · {} spam · {} safe", self.total, self.spam, self.safe)
    }

    pub fn spam_ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.spam as f64 / self.total as f64
    }

    /// Whether the spam share strictly exceeds `threshold`.
    pub fn alert_raised(&self, threshold: f64) -> bool {
        self.total > 0 && self.spam_ratio() > threshold
    }

    /// Opacity of the spam alert overlay: `"1"` when raised, else `"0"`.
    pub fn overlay_opacity(&self, threshold: f64) -> &'static str {
        if self.alert_raised(threshold) { "1" } else { "0" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(spam: usize, ham: usize) -> Vec<PredictionRecord> {
        let mk = |label: &str| PredictionRecord {
            label: label.to_string(),
            ..Default::default()
        };
        std::iter::repeat_with(|| mk("Spam"))
            .take(spam)
            .chain(std::iter::repeat_with(|| mk("Not Spam")).take(ham))
            .collect()
    }

    #[test]
    fn summary_counts() {
        let stats = HistoryStats::compute(&history(3, 7));
        assert_eq!(stats.summary(), "10 items · 3 spam · 7 safe");
    }

    #[test]
    fn overlay_threshold_is_strict() {
        let half = HistoryStats::compute(&history(5, 5));
        assert_eq!(half.overlay_opacity(0.4), "1");

        let forty = HistoryStats::compute(&history(4, 6));
        assert_eq!(forty.overlay_opacity(0.4), "0");
    }

    #[test]
    fn empty_history_never_alerts() {
        let stats = HistoryStats::compute(&[]);
        assert_eq!(stats.summary(), "0 items · 0 spam · 0 safe");
        assert_eq!(stats.overlay_opacity(0.0), "0");
        assert_eq!(stats.spam_ratio(), 0.0);
    }
}
