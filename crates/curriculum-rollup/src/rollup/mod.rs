//! Live-graph rollup: KPI extraction, weighted aggregation, status rules, and incremental
//! recomputation over an immutable entity/edge snapshot.

pub mod aggregate;
pub mod domain;
pub mod graph;
pub mod kpi;
pub mod recompute;
pub mod status;
pub mod summary;

pub use aggregate::{
    aggregate_child_kpis, normalize_weights, round_kpi, weighted_mean, Weighted,
    KPI_ROUNDING_DECIMALS,
};
pub use domain::{Edge, Entity, EntityId, EntityKind, KpiKey, KpiMap, RawData, Snapshot, Status};
pub use graph::Adjacency;
pub use kpi::extract_kpis;
pub use recompute::{changed_ids, compute_entity, recompute_all, recompute_upstream};
pub use status::{
    evaluate_status, Direction, RuleScope, RuleSet, StatusPalette, StatusRule, Thresholds,
};
pub use summary::{KindBreakdown, StatusCount, StatusSummary};
