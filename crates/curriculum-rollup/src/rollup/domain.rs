use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Identifier wrapper for entities in a rollup hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Closed set of curriculum levels, ordered from the top of the hierarchy down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Standard,
    Course,
    Objective,
    Assessment,
    #[serde(alias = "question")]
    Item,
}

impl EntityKind {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Standard,
            Self::Course,
            Self::Objective,
            Self::Assessment,
            Self::Item,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Course => "Course",
            Self::Objective => "Objective",
            Self::Assessment => "Assessment",
            Self::Item => "Item",
        }
    }
}

/// Normalized `[0,1]` metric vocabulary. `Freshness` is reserved and never extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiKey {
    Proficiency,
    Alignment,
    Completion,
    Freshness,
}

/// Ordered so serialized snapshots stay byte-stable across runs.
pub type KpiMap = BTreeMap<KpiKey, f64>;

/// Discrete health classification of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Green,
    Amber,
    Red,
    #[default]
    Gray,
}

impl Status {
    pub const fn ordered() -> [Self; 4] {
        [Self::Green, Self::Amber, Self::Red, Self::Gray]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Green => "GREEN",
            Self::Amber => "AMBER",
            Self::Red => "RED",
            Self::Gray => "GRAY",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Kind-specific raw signals. Every field is optional because upstream exports are partial.
///
/// Legacy exports use camelCase keys and keep `weight` and `statusOverride` inside the
/// payload; both spellings are accepted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawData {
    /// Observed correctness for items and assessments, 0..100.
    #[serde(alias = "averagePct", skip_serializing_if = "Option::is_none")]
    pub average_pct: Option<f64>,
    /// Item p-value, 0..100. Used when `average_pct` is missing.
    #[serde(alias = "difficultyPct", skip_serializing_if = "Option::is_none")]
    pub difficulty_pct: Option<f64>,
    /// Objective achievement, 0..100.
    #[serde(alias = "achievementPct", skip_serializing_if = "Option::is_none")]
    pub achievement_pct: Option<f64>,
    /// Course average, 0..100.
    #[serde(alias = "courseAvgPct", skip_serializing_if = "Option::is_none")]
    pub course_avg_pct: Option<f64>,
    /// Legacy percentage form of the contribution weight.
    #[serde(alias = "weightPct", skip_serializing_if = "Option::is_none")]
    pub weight_pct: Option<f64>,
    /// Legacy placement of [`Entity::weight`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Legacy placement of [`Entity::status_override`].
    #[serde(alias = "statusOverride", skip_serializing_if = "Option::is_none")]
    pub status_override: Option<Status>,
}

/// One node of the hierarchy as supplied by the snapshot provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub data: RawData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(
        default,
        alias = "statusOverride",
        skip_serializing_if = "Option::is_none"
    )]
    pub status_override: Option<Status>,
    #[serde(default, alias = "computedKPIs", alias = "computedKpis")]
    pub computed_kpis: KpiMap,
    #[serde(default, alias = "computedStatus")]
    pub computed_status: Status,
}

impl Entity {
    pub fn new(id: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            id: EntityId(id.into()),
            kind,
            label: String::new(),
            data: RawData::default(),
            weight: None,
            status_override: None,
            computed_kpis: KpiMap::new(),
            computed_status: Status::Gray,
        }
    }

    /// Manual status pin, from the entity itself or the legacy payload field.
    pub fn pinned_status(&self) -> Option<Status> {
        self.status_override.or(self.data.status_override)
    }

    /// Contribution weight among siblings: `weight` (entity, then payload), else
    /// `weight_pct / 100`, else 1.
    pub fn effective_weight(&self) -> f64 {
        let explicit = self
            .weight
            .filter(|w| w.is_finite())
            .or(self.data.weight.filter(|w| w.is_finite()));
        if let Some(weight) = explicit {
            return weight.clamp(0.0, 1.0);
        }
        if let Some(pct) = self.data.weight_pct.filter(|p| p.is_finite()) {
            return (pct / 100.0).clamp(0.0, 1.0);
        }
        1.0
    }
}

/// Directed parent → child relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    #[serde(alias = "source")]
    pub parent: EntityId,
    #[serde(alias = "target")]
    pub child: EntityId,
}

impl Edge {
    pub fn new(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self {
            parent: EntityId(parent.into()),
            child: EntityId(child.into()),
        }
    }
}

/// Immutable entity/edge snapshot. Entities are shared so untouched entries survive a
/// recomputation as the same allocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub entities: Vec<Arc<Entity>>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}
