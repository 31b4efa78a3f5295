use super::domain::{Entity, EntityId, EntityKind, Status};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: Status,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindBreakdown {
    pub kind: EntityKind,
    pub kind_label: &'static str,
    pub total: usize,
    pub statuses: Vec<StatusCount>,
}

/// Status distribution across a snapshot, for dashboards and filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub total: usize,
    pub statuses: Vec<StatusCount>,
    pub by_kind: Vec<KindBreakdown>,
    pub pinned: Vec<EntityId>,
}

impl StatusSummary {
    pub fn from_entities(entities: &[Arc<Entity>]) -> Self {
        let count_statuses = |matching: &dyn Fn(&Entity) -> bool| -> Vec<StatusCount> {
            Status::ordered()
                .into_iter()
                .map(|status| StatusCount {
                    status,
                    count: entities
                        .iter()
                        .map(Arc::as_ref)
                        .filter(|&entity| matching(entity) && entity.computed_status == status)
                        .count(),
                })
                .collect()
        };

        let by_kind = EntityKind::ordered()
            .into_iter()
            .filter_map(|kind| {
                let total = entities.iter().filter(|entity| entity.kind == kind).count();
                (total > 0).then(|| KindBreakdown {
                    kind,
                    kind_label: kind.label(),
                    total,
                    statuses: count_statuses(&|entity: &Entity| entity.kind == kind),
                })
            })
            .collect();

        let pinned = entities
            .iter()
            .filter(|entity| entity.pinned_status().is_some())
            .map(|entity| entity.id.clone())
            .collect();

        Self {
            total: entities.len(),
            statuses: count_statuses(&|_: &Entity| true),
            by_kind,
            pinned,
        }
    }

    pub fn count(&self, status: Status) -> usize {
        self.statuses
            .iter()
            .find(|entry| entry.status == status)
            .map(|entry| entry.count)
            .unwrap_or(0)
    }
}
