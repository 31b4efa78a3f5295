use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a canonical record (standard, course, objective, or item).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Identifier of the student cohort whose results are being summarized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CohortId(pub String);

impl fmt::Display for CohortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CohortId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardRecord {
    pub id: RecordId,
    #[serde(default)]
    pub code: Option<String>,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub id: RecordId,
    #[serde(default)]
    pub code: Option<String>,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveRecord {
    pub id: RecordId,
    pub course_id: RecordId,
    #[serde(default)]
    pub code: Option<String>,
    pub title: String,
    #[serde(default)]
    pub weight_in_course: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: RecordId,
    #[serde(default)]
    pub label: Option<String>,
}

/// Share of an item attributed to one objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemObjectiveWeight {
    pub item_id: RecordId,
    pub objective_id: RecordId,
    #[serde(default)]
    pub weight: Option<f64>,
}

/// Explicit standard ↔ course weight row, independent of the visual graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardCourseLink {
    pub standard_id: RecordId,
    pub course_id: RecordId,
    #[serde(default)]
    pub weight_in_standard: Option<f64>,
}

/// Aggregate-only result of one item for one cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResult {
    pub cohort_id: CohortId,
    pub item_id: RecordId,
    #[serde(default)]
    pub mean_points: Option<f64>,
    #[serde(default)]
    pub max_points: Option<f64>,
    /// Counts arrive as JSON numbers and are validated in [`ItemResult::mean_pct`].
    #[serde(default)]
    pub n_attempted: Option<f64>,
    #[serde(default)]
    pub n_correct: Option<f64>,
}

impl ItemResult {
    /// `mean_points / max_points` when both are usable, else `n_correct / n_attempted`.
    /// Negative or non-finite counts are unusable.
    pub fn mean_pct(&self) -> Option<f64> {
        if let (Some(mean), Some(max)) = (self.mean_points, self.max_points) {
            let ratio = mean / max;
            if max > 0.0 && ratio.is_finite() {
                return Some(ratio);
            }
        }

        match (self.n_correct, self.n_attempted) {
            (Some(correct), Some(attempted))
                if correct.is_finite()
                    && correct >= 0.0
                    && attempted.is_finite()
                    && attempted > 0.0 =>
            {
                Some(correct / attempted)
            }
            _ => None,
        }
    }
}

/// Weight from an optional stored column: missing or non-finite reads as 1, negatives as 0.
pub(crate) fn stored_weight(raw: Option<f64>) -> f64 {
    match raw {
        Some(weight) if weight.is_finite() => weight.max(0.0),
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(
        mean_points: Option<f64>,
        max_points: Option<f64>,
        n_attempted: Option<f64>,
        n_correct: Option<f64>,
    ) -> ItemResult {
        ItemResult {
            cohort_id: CohortId::from("2025"),
            item_id: RecordId::from("q1"),
            mean_points,
            max_points,
            n_attempted,
            n_correct,
        }
    }

    #[test]
    fn mean_pct_prefers_points_then_counts() {
        assert_eq!(
            result(Some(3.0), Some(4.0), Some(10.0), Some(2.0)).mean_pct(),
            Some(0.75)
        );
        assert_eq!(result(Some(3.0), Some(0.0), Some(10.0), Some(2.0)).mean_pct(), Some(0.2));
        assert_eq!(result(None, Some(4.0), Some(8.0), Some(6.0)).mean_pct(), Some(0.75));
    }

    #[test]
    fn mean_pct_is_none_without_usable_inputs() {
        assert_eq!(result(None, None, Some(0.0), Some(0.0)).mean_pct(), None);
        assert_eq!(result(None, None, Some(5.0), None).mean_pct(), None);
        assert_eq!(result(Some(f64::NAN), Some(4.0), None, None).mean_pct(), None);
    }

    #[test]
    fn irregular_counts_load_but_yield_no_mean() {
        let json = r#"[
            { "cohort_id": "k", "item_id": "q1", "n_attempted": 12.0, "n_correct": 9 },
            { "cohort_id": "k", "item_id": "q2", "n_attempted": -4, "n_correct": 2 },
            { "cohort_id": "k", "item_id": "q3", "n_attempted": 10, "n_correct": -1 }
        ]"#;
        let results: Vec<ItemResult> = serde_json::from_str(json).expect("results parse");
        assert_eq!(results[0].mean_pct(), Some(0.75));
        assert_eq!(results[1].mean_pct(), None);
        assert_eq!(results[2].mean_pct(), None);
        assert_eq!(
            result(None, None, Some(f64::INFINITY), Some(3.0)).mean_pct(),
            None
        );
    }

    #[test]
    fn stored_weight_defaults_and_floors() {
        assert_eq!(stored_weight(None), 1.0);
        assert_eq!(stored_weight(Some(f64::INFINITY)), 1.0);
        assert_eq!(stored_weight(Some(-2.0)), 0.0);
        assert_eq!(stored_weight(Some(2.5)), 2.5);
    }
}
