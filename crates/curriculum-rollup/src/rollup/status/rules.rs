use crate::rollup::domain::{EntityKind, KpiKey};
use serde::{Deserialize, Serialize};

/// Which entity kinds a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleScope {
    Any,
    Standard,
    Course,
    Objective,
    Assessment,
    #[serde(alias = "question")]
    Item,
}

impl RuleScope {
    pub fn matches(self, kind: EntityKind) -> bool {
        self == RuleScope::Any || self == RuleScope::from(kind)
    }
}

impl From<EntityKind> for RuleScope {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Standard => RuleScope::Standard,
            EntityKind::Course => RuleScope::Course,
            EntityKind::Objective => RuleScope::Objective,
            EntityKind::Assessment => RuleScope::Assessment,
            EntityKind::Item => RuleScope::Item,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

/// Cut points for one rule. `green` and `amber` are inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub green: f64,
    pub amber: f64,
    #[serde(default, alias = "grayIfMissing")]
    pub gray_if_missing: bool,
}

/// One threshold rule: if `scope` matches and `kpi` is present, classify by `thresholds`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusRule {
    pub scope: RuleScope,
    pub kpi: KpiKey,
    pub direction: Direction,
    pub thresholds: Thresholds,
}

impl StatusRule {
    pub fn higher_is_better(scope: RuleScope, kpi: KpiKey, green: f64, amber: f64) -> Self {
        Self {
            scope,
            kpi,
            direction: Direction::HigherIsBetter,
            thresholds: Thresholds {
                green,
                amber,
                gray_if_missing: true,
            },
        }
    }

    pub fn lower_is_better(scope: RuleScope, kpi: KpiKey, green: f64, amber: f64) -> Self {
        Self {
            direction: Direction::LowerIsBetter,
            ..Self::higher_is_better(scope, kpi, green, amber)
        }
    }

    pub fn with_gray_if_missing(mut self, gray_if_missing: bool) -> Self {
        self.thresholds.gray_if_missing = gray_if_missing;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_matches_its_own_kind_and_any_matches_all() {
        for kind in EntityKind::ordered() {
            assert!(RuleScope::Any.matches(kind));
            assert!(RuleScope::from(kind).matches(kind));
        }
        assert!(!RuleScope::Item.matches(EntityKind::Assessment));
        assert!(!RuleScope::Standard.matches(EntityKind::Course));
    }
}
