//! Property checks for weighting, missing data, and incremental recomputation.

use curriculum_rollup::rollup::{
    aggregate_child_kpis, recompute_all, recompute_upstream, weighted_mean, Edge, Entity,
    EntityKind, KpiKey, RawData, RuleSet, Weighted,
};
use proptest::prelude::*;
use std::sync::Arc;

// =============================================================================
// Strategy helpers
// =============================================================================

fn kind_strategy() -> impl Strategy<Value = EntityKind> {
    prop::sample::select(EntityKind::ordered().to_vec())
}

fn pct_strategy() -> impl Strategy<Value = Option<f64>> {
    prop::option::of(-20.0f64..120.0)
}

fn raw_strategy() -> impl Strategy<Value = RawData> {
    (pct_strategy(), pct_strategy(), pct_strategy(), pct_strategy()).prop_map(
        |(average_pct, difficulty_pct, achievement_pct, course_avg_pct)| RawData {
            average_pct,
            difficulty_pct,
            achievement_pct,
            course_avg_pct,
            ..RawData::default()
        },
    )
}

#[derive(Debug, Clone)]
struct NodeShape {
    kind: EntityKind,
    raw: RawData,
    weight: Option<f64>,
}

fn node_strategy() -> impl Strategy<Value = NodeShape> {
    (kind_strategy(), raw_strategy(), prop::option::of(0.0f64..=1.0)).prop_map(
        |(kind, raw, weight)| NodeShape { kind, raw, weight },
    )
}

/// A random forest: node `i > 0` optionally hangs under some node `< i`.
fn forest_strategy() -> impl Strategy<Value = (Vec<NodeShape>, Vec<Option<usize>>)> {
    (2usize..24).prop_flat_map(|size| {
        let nodes = prop::collection::vec(node_strategy(), size);
        let parents = (0..size)
            .map(|index| {
                if index == 0 {
                    Just(None).boxed()
                } else {
                    prop::option::weighted(0.9, 0..index).boxed()
                }
            })
            .collect::<Vec<_>>();
        (nodes, parents)
    })
}

fn materialize(nodes: &[NodeShape], parents: &[Option<usize>]) -> (Vec<Arc<Entity>>, Vec<Edge>) {
    let entities = nodes
        .iter()
        .enumerate()
        .map(|(index, shape)| {
            let mut entity = Entity::new(format!("n{index}"), shape.kind);
            entity.data = shape.raw.clone();
            entity.weight = shape.weight;
            Arc::new(entity)
        })
        .collect();
    let edges = parents
        .iter()
        .enumerate()
        .filter_map(|(child, parent)| {
            parent.map(|parent| Edge::new(format!("n{parent}"), format!("n{child}")))
        })
        .collect();
    (entities, edges)
}

fn scored_child(value: Option<f64>, weight: f64) -> Entity {
    let mut entity = Entity::new("child", EntityKind::Item);
    entity.weight = Some(weight);
    if let Some(value) = value {
        entity.computed_kpis.insert(KpiKey::Proficiency, value);
    }
    entity
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn weighted_mean_is_scale_invariant(
        pairs in prop::collection::vec((0.0f64..=1.0, 0.01f64..100.0), 1..12),
        scale in 0.01f64..100.0,
    ) {
        let base: Vec<Weighted> = pairs.iter().map(|(v, w)| Weighted::new(*v, *w)).collect();
        let scaled: Vec<Weighted> =
            pairs.iter().map(|(v, w)| Weighted::new(*v, w * scale)).collect();
        let a = weighted_mean(&base).expect("positive weights");
        let b = weighted_mean(&scaled).expect("positive weights");
        prop_assert!((a - b).abs() < 1e-9, "{a} vs {b}");
    }

    #[test]
    fn aggregated_kpi_is_scale_invariant(
        pairs in prop::collection::vec((0.0f64..=1.0, 0.05f64..=1.0), 1..12),
        scale in 0.1f64..=1.0,
    ) {
        let base: Vec<Entity> = pairs.iter().map(|(v, w)| scored_child(Some(*v), *w)).collect();
        let scaled: Vec<Entity> =
            pairs.iter().map(|(v, w)| scored_child(Some(*v), w * scale)).collect();
        let base_refs: Vec<&Entity> = base.iter().collect();
        let scaled_refs: Vec<&Entity> = scaled.iter().collect();

        let a = aggregate_child_kpis(EntityKind::Assessment, &base_refs)[&KpiKey::Proficiency];
        let b = aggregate_child_kpis(EntityKind::Assessment, &scaled_refs)[&KpiKey::Proficiency];
        // Both sides are rounded to four places; allow one unit of rounding.
        prop_assert!((a - b).abs() <= 1.0001e-4, "{a} vs {b}");
    }

    #[test]
    fn missing_children_never_move_the_parent(
        defined in prop::collection::vec((0.0f64..=1.0, 0.0f64..=1.0), 0..8),
        missing_weights in prop::collection::vec(0.0f64..=1.0, 1..8),
    ) {
        let defined_children: Vec<Entity> =
            defined.iter().map(|(v, w)| scored_child(Some(*v), *w)).collect();
        let missing_children: Vec<Entity> =
            missing_weights.iter().map(|w| scored_child(None, *w)).collect();

        let only_defined: Vec<&Entity> = defined_children.iter().collect();
        let mixed: Vec<&Entity> = defined_children
            .iter()
            .zip(missing_children.iter().cycle())
            .flat_map(|(d, m)| [d, m])
            .chain(missing_children.iter())
            .collect();

        prop_assert_eq!(
            aggregate_child_kpis(EntityKind::Assessment, &only_defined),
            aggregate_child_kpis(EntityKind::Assessment, &mixed)
        );
    }

    #[test]
    fn upstream_matches_full_recompute(
        (nodes, parents) in forest_strategy(),
        pick in any::<prop::sample::Index>(),
        new_raw in raw_strategy(),
    ) {
        let rules = RuleSet::standard();
        let (entities, edges) = materialize(&nodes, &parents);
        let settled = recompute_all(&entities, &edges, &rules);

        let changed = pick.index(settled.len());
        let mut edited = settled.clone();
        let mut replacement = Entity::clone(&edited[changed]);
        replacement.data = new_raw;
        edited[changed] = Arc::new(replacement);
        let changed_id = edited[changed].id.clone();

        let incremental = recompute_upstream(&edited, &edges, &changed_id, &rules);
        let full = recompute_all(&edited, &edges, &rules);

        for (lhs, rhs) in incremental.iter().zip(full.iter()) {
            prop_assert_eq!(&lhs.id, &rhs.id);
            prop_assert_eq!(&lhs.computed_kpis, &rhs.computed_kpis);
            prop_assert_eq!(lhs.computed_status, rhs.computed_status);
        }
    }

    #[test]
    fn recompute_is_idempotent(
        (nodes, parents) in forest_strategy(),
        pick in any::<prop::sample::Index>(),
    ) {
        let rules = RuleSet::standard();
        let (entities, edges) = materialize(&nodes, &parents);
        let changed_id = entities[pick.index(entities.len())].id.clone();

        let once = recompute_upstream(&entities, &edges, &changed_id, &rules);
        let twice = recompute_upstream(&entities, &edges, &changed_id, &rules);
        prop_assert_eq!(
            serde_json::to_string(&once).expect("serialize"),
            serde_json::to_string(&twice).expect("serialize")
        );

        let settled = recompute_all(&entities, &edges, &rules);
        let resettled = recompute_upstream(&settled, &edges, &changed_id, &rules);
        for (lhs, rhs) in settled.iter().zip(resettled.iter()) {
            prop_assert!(Arc::ptr_eq(lhs, rhs));
        }
    }
}
