mod palette;
mod rules;

pub use palette::StatusPalette;
pub use rules::{Direction, RuleScope, StatusRule, Thresholds};

use super::domain::{EntityKind, KpiKey, KpiMap, Status};
use serde::{Deserialize, Serialize};

/// Ordered rule list plus the palette forwarded to renderers. First applicable rule wins.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub palette: StatusPalette,
    #[serde(default)]
    pub rules: Vec<StatusRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<StatusRule>) -> Self {
        Self {
            palette: StatusPalette::default(),
            rules,
        }
    }

    /// Organization defaults shipped with the product.
    pub fn standard() -> Self {
        Self::new(vec![
            StatusRule::higher_is_better(RuleScope::Item, KpiKey::Proficiency, 0.85, 0.6),
            StatusRule::higher_is_better(RuleScope::Assessment, KpiKey::Proficiency, 0.8, 0.5),
            StatusRule::higher_is_better(RuleScope::Objective, KpiKey::Alignment, 0.9, 0.7),
            StatusRule::higher_is_better(RuleScope::Course, KpiKey::Completion, 0.9, 0.7),
            // Freshness is measured in days since review.
            StatusRule::lower_is_better(RuleScope::Standard, KpiKey::Freshness, 30.0, 90.0),
        ])
    }
}

/// Classifies an entity from its KPI map. Overrides are the caller's concern.
pub fn evaluate_status(kind: EntityKind, kpis: &KpiMap, rule_set: &RuleSet) -> Status {
    for rule in rule_set.rules.iter().filter(|rule| rule.scope.matches(kind)) {
        let Some(value) = kpis.get(&rule.kpi).copied() else {
            if rule.thresholds.gray_if_missing {
                return Status::Gray;
            }
            continue;
        };

        return classify(value, rule);
    }

    Status::Gray
}

fn classify(value: f64, rule: &StatusRule) -> Status {
    let Thresholds { green, amber, .. } = rule.thresholds;
    match rule.direction {
        Direction::HigherIsBetter if value >= green => Status::Green,
        Direction::HigherIsBetter if value >= amber => Status::Amber,
        Direction::HigherIsBetter => Status::Red,
        Direction::LowerIsBetter if value <= green => Status::Green,
        Direction::LowerIsBetter if value <= amber => Status::Amber,
        Direction::LowerIsBetter => Status::Red,
    }
}
