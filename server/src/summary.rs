use std::collections::BTreeMap;

use serde::Serialize;

use crate::interpretation::ConfidenceLevel;

const NO_SUCCESS_MESSAGE: &str = "No successful predictions";

/// Aggregate figures of a batch, computed over its successful predictions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total_students: usize,
    pub successful_predictions: usize,
    #[serde(rename = "errors")]
    pub failed_predictions: usize,
    #[serde(flatten)]
    pub stats: Option<ChanceStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChanceStats {
    pub average_chance: f64,
    pub min_chance: f64,
    pub max_chance: f64,
    /// Population standard deviation.
    pub std_chance: f64,
    pub confidence_counts: BTreeMap<&'static str, usize>,
}

impl BatchSummary {
    /// Summarises a batch.
    ///
    /// # Arguments
    /// * `total` - Number of elements in the batch.
    /// * `successes` - Chance and tier of every successful prediction.
    ///
    /// # Returns
    /// The summary, with a message instead of statistics when nothing succeeded.
    pub fn new(total: usize, successes: &[(f64, ConfidenceLevel)]) -> Self {
        let stats = ChanceStats::new(successes);
        let message = stats.is_none().then_some(NO_SUCCESS_MESSAGE);

        Self {
            total_students: total,
            successful_predictions: successes.len(),
            failed_predictions: total.saturating_sub(successes.len()),
            stats,
            message,
        }
    }
}

impl ChanceStats {
    fn new(successes: &[(f64, ConfidenceLevel)]) -> Option<Self> {
        if successes.is_empty() {
            return None;
        }

        let n = successes.len() as f64;
        let chances = successes.iter().map(|&(chance, _)| chance);

        let mean = chances.clone().sum::<f64>() / n;
        let min = chances.clone().fold(f64::INFINITY, f64::min);
        let max = chances.clone().fold(f64::NEG_INFINITY, f64::max);
        let variance = chances.map(|c| (c - mean).powi(2)).sum::<f64>() / n;

        let mut confidence_counts = BTreeMap::new();
        for &(_, level) in successes {
            *confidence_counts.entry(level.label()).or_insert(0) += 1;
        }

        Some(Self {
            average_chance: round4(mean),
            min_chance: round4(min),
            max_chance: round4(max),
            std_chance: round4(variance.sqrt()),
            confidence_counts,
        })
    }
}

/// Rounds to 4 decimal places.
pub fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn statistics_cover_successes_only() {
        let successes = [
            (0.9, ConfidenceLevel::High),
            (0.5, ConfidenceLevel::Medium),
            (0.1, ConfidenceLevel::VeryLow),
        ];
        let summary = BatchSummary::new(5, &successes);

        assert_eq!(summary.successful_predictions, 3);
        assert_eq!(summary.failed_predictions, 2);
        assert_eq!(summary.message, None);

        let stats = summary.stats.unwrap();
        assert_eq!(stats.average_chance, 0.5);
        assert_eq!(stats.min_chance, 0.1);
        assert_eq!(stats.max_chance, 0.9);
        // sqrt(0.32 / 3)
        assert_eq!(stats.std_chance, 0.3266);
        assert_eq!(stats.confidence_counts.get("High"), Some(&1));
        assert_eq!(stats.confidence_counts.get("Low"), None);
    }

    #[test]
    fn single_success_has_no_spread() {
        let summary = BatchSummary::new(1, &[(0.7312, ConfidenceLevel::MediumHigh)]);
        let stats = summary.stats.unwrap();

        assert_eq!(stats.average_chance, 0.7312);
        assert_eq!(stats.std_chance, 0.0);
    }

    #[test]
    fn no_successes_is_not_an_error() {
        let summary = BatchSummary::new(3, &[]);

        assert_eq!(summary.successful_predictions, 0);
        assert_eq!(summary.failed_predictions, 3);
        assert_eq!(summary.stats, None);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            json,
            json!({
                "total_students": 3,
                "successful_predictions": 0,
                "errors": 3,
                "message": "No successful predictions",
            })
        );
    }

    #[test]
    fn statistics_are_flattened_into_the_summary() {
        let summary = BatchSummary::new(
            2,
            &[(0.25, ConfidenceLevel::Low), (0.75, ConfidenceLevel::MediumHigh)],
        );
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["average_chance"], 0.5);
        assert_eq!(json["std_chance"], 0.25);
        assert_eq!(json["confidence_counts"], json!({ "Low": 1, "Medium-High": 1 }));
        assert!(json.get("message").is_none());
    }

    #[test]
    fn rounds_to_four_places() {
        assert_eq!(round4(0.123_456), 0.1235);
        assert_eq!(round4(1.0), 1.0);
        assert_eq!(round4(0.0), 0.0);
    }
}
