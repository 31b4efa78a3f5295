use super::domain::{Edge, Entity, EntityId};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::warn;

/// Parent/child lookup indexes over one snapshot.
///
/// Edges naming an id that is not in the entity list are dropped, as are self-loops and
/// repeated parent → child pairs. Every parent of a child is kept; [`Adjacency::parent_of`]
/// reports the last one seen.
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    children_of: HashMap<EntityId, Vec<EntityId>>,
    parents_of: HashMap<EntityId, Vec<EntityId>>,
    roots: Vec<EntityId>,
    leaves: Vec<EntityId>,
}

impl Adjacency {
    pub fn build(entities: &[Arc<Entity>], edges: &[Edge]) -> Self {
        let known: HashSet<&EntityId> = entities.iter().map(|entity| &entity.id).collect();
        let mut children_of: HashMap<EntityId, Vec<EntityId>> = entities
            .iter()
            .map(|entity| (entity.id.clone(), Vec::new()))
            .collect();
        let mut parents_of: HashMap<EntityId, Vec<EntityId>> = HashMap::new();
        let mut seen: HashSet<(&EntityId, &EntityId)> = HashSet::new();

        for edge in edges {
            if edge.parent == edge.child
                || !known.contains(&edge.parent)
                || !known.contains(&edge.child)
            {
                continue;
            }

            if !seen.insert((&edge.parent, &edge.child)) {
                // A repeated edge still moves the parent to the "last seen" slot.
                let parents = parents_of.entry(edge.child.clone()).or_default();
                parents.retain(|parent| parent != &edge.parent);
                parents.push(edge.parent.clone());
                continue;
            }

            children_of
                .entry(edge.parent.clone())
                .or_default()
                .push(edge.child.clone());
            parents_of
                .entry(edge.child.clone())
                .or_default()
                .push(edge.parent.clone());
        }

        let roots = entities
            .iter()
            .filter(|entity| !parents_of.contains_key(&entity.id))
            .map(|entity| entity.id.clone())
            .collect();
        let leaves = entities
            .iter()
            .filter(|entity| {
                children_of
                    .get(&entity.id)
                    .map(|children| children.is_empty())
                    .unwrap_or(true)
            })
            .map(|entity| entity.id.clone())
            .collect();

        Self {
            children_of,
            parents_of,
            roots,
            leaves,
        }
    }

    pub fn children(&self, id: &EntityId) -> &[EntityId] {
        self.children_of
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn parents(&self, id: &EntityId) -> &[EntityId] {
        self.parents_of
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Single-parent view: the parent from the last edge seen for `id`.
    pub fn parent_of(&self, id: &EntityId) -> Option<&EntityId> {
        self.parents(id).last()
    }

    pub fn roots(&self) -> &[EntityId] {
        &self.roots
    }

    pub fn leaves(&self) -> &[EntityId] {
        &self.leaves
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.children_of.contains_key(id)
    }

    /// `id` followed by its single-parent chain up to a root. Stops early on a cycle.
    pub fn ancestor_chain(&self, id: &EntityId) -> Vec<EntityId> {
        let mut chain = vec![id.clone()];
        let mut visited: HashSet<&EntityId> = HashSet::from([id]);
        let mut current = self.parent_of(id);

        while let Some(parent) = current {
            if !visited.insert(parent) {
                warn!(entity = %id, at = %parent, "cycle detected while walking ancestor chain");
                break;
            }
            chain.push(parent.clone());
            current = self.parent_of(parent);
        }

        chain
    }

    /// `id` and every entity reachable by following parent links, breadth first.
    pub fn ancestors(&self, id: &EntityId) -> Vec<EntityId> {
        let mut out = vec![id.clone()];
        let mut visited: HashSet<&EntityId> = HashSet::from([id]);
        let mut queue: VecDeque<&EntityId> = VecDeque::from([id]);

        while let Some(current) = queue.pop_front() {
            for parent in self.parents(current) {
                if visited.insert(parent) {
                    out.push(parent.clone());
                    queue.push_back(parent);
                }
            }
        }

        out
    }

    /// Orders `members` so every entity comes after all of its children that are also
    /// members. Entities caught in a cycle are appended last, in input order.
    pub fn children_first(&self, members: &[EntityId]) -> Vec<EntityId> {
        let member_set: HashSet<&EntityId> = members.iter().collect();
        let mut pending: HashMap<&EntityId, usize> = members
            .iter()
            .map(|id| {
                let count = self
                    .children(id)
                    .iter()
                    .filter(|child| member_set.contains(child))
                    .count();
                (id, count)
            })
            .collect();

        let mut ready: VecDeque<&EntityId> = members
            .iter()
            .filter(|id| pending.get(id) == Some(&0))
            .collect();
        let mut ordered: Vec<EntityId> = Vec::with_capacity(members.len());
        let mut placed: HashSet<&EntityId> = HashSet::with_capacity(members.len());

        while let Some(id) = ready.pop_front() {
            if !placed.insert(id) {
                continue;
            }
            ordered.push(id.clone());
            for parent in self.parents(id) {
                if let Some(count) = pending.get_mut(parent) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.push_back(parent);
                    }
                }
            }
        }

        if ordered.len() < member_set.len() {
            let stuck: Vec<&EntityId> = members
                .iter()
                .filter(|id| !placed.contains(id))
                .collect();
            warn!(
                count = stuck.len(),
                "cycle detected; processing remaining entities in input order"
            );
            for id in stuck {
                if placed.insert(id) {
                    ordered.push(id.clone());
                }
            }
        }

        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollup::domain::EntityKind;

    fn entities(ids: &[(&str, EntityKind)]) -> Vec<Arc<Entity>> {
        ids.iter()
            .map(|(id, kind)| Arc::new(Entity::new(*id, *kind)))
            .collect()
    }

    fn id(value: &str) -> EntityId {
        EntityId::from(value)
    }

    #[test]
    fn build_indexes_children_parents_roots_and_leaves() {
        let nodes = entities(&[
            ("std", EntityKind::Standard),
            ("course", EntityKind::Course),
            ("obj", EntityKind::Objective),
            ("orphan", EntityKind::Item),
        ]);
        let edges = vec![Edge::new("std", "course"), Edge::new("course", "obj")];
        let adjacency = Adjacency::build(&nodes, &edges);

        assert_eq!(adjacency.children(&id("std")), &[id("course")]);
        assert_eq!(adjacency.parent_of(&id("obj")), Some(&id("course")));
        assert_eq!(adjacency.roots(), &[id("std"), id("orphan")]);
        assert_eq!(adjacency.leaves(), &[id("obj"), id("orphan")]);
        assert_eq!(
            adjacency.ancestor_chain(&id("obj")),
            vec![id("obj"), id("course"), id("std")]
        );
    }

    #[test]
    fn unknown_ids_self_loops_and_duplicates_are_dropped() {
        let nodes = entities(&[("a", EntityKind::Assessment), ("q", EntityKind::Item)]);
        let edges = vec![
            Edge::new("a", "q"),
            Edge::new("a", "q"),
            Edge::new("a", "ghost"),
            Edge::new("ghost", "q"),
            Edge::new("q", "q"),
        ];
        let adjacency = Adjacency::build(&nodes, &edges);

        assert_eq!(adjacency.children(&id("a")), &[id("q")]);
        assert_eq!(adjacency.parents(&id("q")), &[id("a")]);
        assert!(adjacency.children(&id("ghost")).is_empty());
        assert!(!adjacency.contains(&id("ghost")));
    }

    #[test]
    fn parent_of_reports_last_seen_edge_but_all_parents_are_kept() {
        let nodes = entities(&[
            ("o1", EntityKind::Objective),
            ("o2", EntityKind::Objective),
            ("q", EntityKind::Item),
        ]);
        let edges = vec![Edge::new("o1", "q"), Edge::new("o2", "q")];
        let adjacency = Adjacency::build(&nodes, &edges);

        assert_eq!(adjacency.parent_of(&id("q")), Some(&id("o2")));
        assert_eq!(adjacency.parents(&id("q")), &[id("o1"), id("o2")]);
        assert_eq!(
            adjacency.ancestors(&id("q")),
            vec![id("q"), id("o1"), id("o2")]
        );
    }

    #[test]
    fn children_first_orders_diamond_and_survives_cycles() {
        let nodes = entities(&[
            ("top", EntityKind::Standard),
            ("left", EntityKind::Course),
            ("right", EntityKind::Course),
            ("leaf", EntityKind::Objective),
        ]);
        let edges = vec![
            Edge::new("top", "left"),
            Edge::new("top", "right"),
            Edge::new("left", "leaf"),
            Edge::new("right", "leaf"),
        ];
        let adjacency = Adjacency::build(&nodes, &edges);
        let order = adjacency.children_first(&adjacency.ancestors(&id("leaf")));
        assert_eq!(order.first(), Some(&id("leaf")));
        assert_eq!(order.last(), Some(&id("top")));
        assert_eq!(order.len(), 4);

        let cyclic = vec![Edge::new("left", "right"), Edge::new("right", "left")];
        let adjacency = Adjacency::build(&nodes, &cyclic);
        let chain = adjacency.ancestor_chain(&id("left"));
        assert_eq!(chain, vec![id("left"), id("right")]);
        let order = adjacency.children_first(&adjacency.ancestors(&id("left")));
        assert_eq!(order.len(), 2);
    }
}
