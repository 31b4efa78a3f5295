use super::aggregate::aggregate_child_kpis;
use super::domain::{Edge, Entity, EntityId, KpiMap, Status};
use super::graph::Adjacency;
use super::kpi::extract_kpis;
use super::status::{evaluate_status, RuleSet};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// KPIs and status for one entity given its (already computed) children.
///
/// Self-extracted values survive unless aggregation produced a value for the same key.
pub fn compute_entity(
    entity: &Entity,
    children: &[&Entity],
    rule_set: &RuleSet,
) -> (KpiMap, Status) {
    let mut kpis = extract_kpis(entity.kind, &entity.data);
    if !children.is_empty() {
        kpis.extend(aggregate_child_kpis(entity.kind, children));
    }

    let status = entity
        .pinned_status()
        .unwrap_or_else(|| evaluate_status(entity.kind, &kpis, rule_set));

    (kpis, status)
}

/// Recomputes `changed_id` and everything above it, leaving every other entry untouched.
///
/// The input is expected to be consistent apart from the changed entity's raw data; under that
/// precondition the result equals [`recompute_all`]. Entries whose values do not move keep
/// their original allocation, so an up-to-date snapshot comes back pointer-identical.
pub fn recompute_upstream(
    entities: &[Arc<Entity>],
    edges: &[Edge],
    changed_id: &EntityId,
    rule_set: &RuleSet,
) -> Vec<Arc<Entity>> {
    let adjacency = Adjacency::build(entities, edges);
    if !adjacency.contains(changed_id) {
        debug!(entity = %changed_id, "changed entity not in snapshot; nothing to recompute");
        return entities.to_vec();
    }

    let chain = adjacency.children_first(&adjacency.ancestors(changed_id));
    debug!(entity = %changed_id, chain = chain.len(), "recomputing upstream");
    recompute_ids(entities, &adjacency, &chain, rule_set)
}

/// Recomputes every entity, children before parents.
pub fn recompute_all(
    entities: &[Arc<Entity>],
    edges: &[Edge],
    rule_set: &RuleSet,
) -> Vec<Arc<Entity>> {
    let adjacency = Adjacency::build(entities, edges);
    let ids: Vec<EntityId> = entities.iter().map(|entity| entity.id.clone()).collect();
    let order = adjacency.children_first(&ids);
    debug!(entities = order.len(), "recomputing full snapshot");
    recompute_ids(entities, &adjacency, &order, rule_set)
}

fn recompute_ids(
    entities: &[Arc<Entity>],
    adjacency: &Adjacency,
    order: &[EntityId],
    rule_set: &RuleSet,
) -> Vec<Arc<Entity>> {
    let mut working: HashMap<&EntityId, Arc<Entity>> = entities
        .iter()
        .map(|entity| (&entity.id, Arc::clone(entity)))
        .collect();

    for id in order {
        let Some(current) = working.get(id).cloned() else {
            continue;
        };

        let updated = {
            let children: Vec<&Entity> = adjacency
                .children(id)
                .iter()
                .filter_map(|child_id| working.get(child_id).map(Arc::as_ref))
                .collect();
            let (kpis, status) = compute_entity(&current, &children, rule_set);

            if kpis == current.computed_kpis && status == current.computed_status {
                None
            } else {
                Some(Arc::new(Entity {
                    computed_kpis: kpis,
                    computed_status: status,
                    ..Entity::clone(&current)
                }))
            }
        };

        if let Some(updated) = updated {
            if let Some(slot) = working.get_mut(id) {
                *slot = updated;
            }
        }
    }

    entities
        .iter()
        .map(|entity| {
            working
                .get(&entity.id)
                .cloned()
                .unwrap_or_else(|| Arc::clone(entity))
        })
        .collect()
}

/// Ids whose entries in `after` are no longer the same allocation as in `before`.
pub fn changed_ids(before: &[Arc<Entity>], after: &[Arc<Entity>]) -> Vec<EntityId> {
    let previous: HashMap<&EntityId, &Arc<Entity>> =
        before.iter().map(|entity| (&entity.id, entity)).collect();

    after
        .iter()
        .filter(|entity| {
            previous
                .get(&entity.id)
                .map(|old| !Arc::ptr_eq(old, entity))
                .unwrap_or(true)
        })
        .map(|entity| entity.id.clone())
        .collect()
}
