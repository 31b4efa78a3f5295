use super::records::{stored_weight, CohortId, CourseRecord, ObjectiveRecord, RecordId};
use super::store::{RecordStore, StoreError};
use crate::rollup::aggregate::{normalize_weights, round_kpi, weighted_mean, Weighted};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Level of a node in a standard's evidence tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceLevel {
    Standard,
    Course,
    Objective,
    Item,
}

impl EvidenceLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Course => "course",
            Self::Objective => "objective",
            Self::Item => "item",
        }
    }
}

/// One auditable step of a standard's score.
///
/// `weight` is this node's normalized share among the siblings that produced a mean;
/// siblings without a mean stay in the tree with `mean_pct: None` and a zero share.
/// `n_children` counts only the children that contributed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceNode {
    pub id: RecordId,
    pub level: EvidenceLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub label: String,
    pub raw_weight: f64,
    pub weight: f64,
    pub mean_pct: Option<f64>,
    pub n_children: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<EvidenceNode>,
}

impl EvidenceNode {
    fn new(id: RecordId, level: EvidenceLevel, label: String, raw_weight: f64) -> Self {
        Self {
            id,
            level,
            code: None,
            label,
            raw_weight,
            weight: 0.0,
            mean_pct: None,
            n_children: 0,
            children: Vec::new(),
        }
    }

    fn with_children(mut self, children: Vec<EvidenceNode>) -> Self {
        self.children = children;
        let (mean_pct, n_children) = settle_level(&mut self.children);
        self.mean_pct = mean_pct;
        self.n_children = n_children;
        self
    }

    /// Depth-first walk yielding each node with its depth (root is 0).
    pub fn walk(&self) -> Vec<(usize, &EvidenceNode)> {
        let mut out = Vec::new();
        let mut stack = vec![(0usize, self)];
        while let Some((depth, node)) = stack.pop() {
            out.push((depth, node));
            for child in node.children.iter().rev() {
                stack.push((depth + 1, child));
            }
        }
        out
    }
}

/// A mean together with how many children produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeanSummary {
    pub mean_pct: Option<f64>,
    pub n_children: usize,
}

impl From<&EvidenceNode> for MeanSummary {
    fn from(node: &EvidenceNode) -> Self {
        Self {
            mean_pct: node.mean_pct,
            n_children: node.n_children,
        }
    }
}

/// Normalizes sibling weights over the contributors and returns the level's mean.
fn settle_level(children: &mut [EvidenceNode]) -> (Option<f64>, usize) {
    let contributing: Vec<usize> = children
        .iter()
        .enumerate()
        .filter(|(_, child)| child.mean_pct.is_some())
        .map(|(index, _)| index)
        .collect();

    for child in children.iter_mut() {
        child.weight = 0.0;
    }

    let raw: Vec<f64> = contributing
        .iter()
        .map(|&index| children[index].raw_weight)
        .collect();
    let Some(shares) = normalize_weights(&raw) else {
        return (None, 0);
    };

    let mut entries = Vec::with_capacity(contributing.len());
    for (&index, share) in contributing.iter().zip(shares) {
        let child = &mut children[index];
        child.weight = share;
        if let Some(mean) = child.mean_pct {
            entries.push(Weighted::new(mean, share));
        }
    }

    (weighted_mean(&entries).map(round_kpi), entries.len())
}

/// Batch builder of standard evidence trees over a canonical record store.
pub struct EvidenceBuilder<S: ?Sized> {
    store: Arc<S>,
}

impl<S> EvidenceBuilder<S>
where
    S: RecordStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Full breakdown of a standard for one cohort: standard → courses → objectives → items.
    pub fn build_standard_evidence(
        &self,
        cohort: &CohortId,
        standard_id: &RecordId,
    ) -> Result<EvidenceNode, EvidenceError> {
        let standard = self.store.standard(standard_id)?;
        let mut root = EvidenceNode::new(
            standard_id.clone(),
            EvidenceLevel::Standard,
            standard
                .as_ref()
                .map(|record| record.title.clone())
                .unwrap_or_else(|| standard_id.to_string()),
            1.0,
        );
        root.code = standard.and_then(|record| record.code);

        let mut courses = Vec::new();
        for link in self.store.course_links(standard_id)? {
            let Some(course) = self.store.course(&link.course_id)? else {
                warn!(
                    standard = %standard_id,
                    course = %link.course_id,
                    "standard links to a course missing from the record store; skipping"
                );
                continue;
            };
            let raw_weight = stored_weight(link.weight_in_standard);
            courses.push(self.course_node(cohort, &course, raw_weight)?);
        }

        let mut root = root.with_children(courses);
        root.weight = 1.0;
        debug!(
            standard = %standard_id,
            cohort = %cohort,
            courses = root.children.len(),
            contributing = root.n_children,
            "built standard evidence"
        );
        Ok(root)
    }

    /// Breakdown of one course (course → objectives → items). Unknown courses yield `None`.
    pub fn build_course_evidence(
        &self,
        cohort: &CohortId,
        course_id: &RecordId,
    ) -> Result<Option<EvidenceNode>, EvidenceError> {
        let Some(course) = self.store.course(course_id)? else {
            return Ok(None);
        };
        let mut node = self.course_node(cohort, &course, 1.0)?;
        node.weight = 1.0;
        Ok(Some(node))
    }

    /// Breakdown of one objective (objective → items).
    pub fn build_objective_evidence(
        &self,
        cohort: &CohortId,
        objective: &ObjectiveRecord,
    ) -> Result<EvidenceNode, EvidenceError> {
        let mut node = self.objective_node(cohort, objective)?;
        node.weight = 1.0;
        Ok(node)
    }

    pub fn standard_mean(
        &self,
        cohort: &CohortId,
        standard_id: &RecordId,
    ) -> Result<MeanSummary, EvidenceError> {
        let tree = self.build_standard_evidence(cohort, standard_id)?;
        Ok(MeanSummary::from(&tree))
    }

    pub fn course_mean(
        &self,
        cohort: &CohortId,
        course_id: &RecordId,
    ) -> Result<MeanSummary, EvidenceError> {
        Ok(self
            .build_course_evidence(cohort, course_id)?
            .as_ref()
            .map(MeanSummary::from)
            .unwrap_or(MeanSummary {
                mean_pct: None,
                n_children: 0,
            }))
    }

    pub fn objective_mean(
        &self,
        cohort: &CohortId,
        objective: &ObjectiveRecord,
    ) -> Result<MeanSummary, EvidenceError> {
        let node = self.objective_node(cohort, objective)?;
        Ok(MeanSummary::from(&node))
    }

    fn course_node(
        &self,
        cohort: &CohortId,
        course: &CourseRecord,
        raw_weight: f64,
    ) -> Result<EvidenceNode, EvidenceError> {
        let mut node = EvidenceNode::new(
            course.id.clone(),
            EvidenceLevel::Course,
            course.title.clone(),
            raw_weight,
        );
        node.code = course.code.clone();

        let objectives = self
            .store
            .objectives_for_course(&course.id)?
            .iter()
            .map(|objective| self.objective_node(cohort, objective))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(node.with_children(objectives))
    }

    fn objective_node(
        &self,
        cohort: &CohortId,
        objective: &ObjectiveRecord,
    ) -> Result<EvidenceNode, EvidenceError> {
        let mut node = EvidenceNode::new(
            objective.id.clone(),
            EvidenceLevel::Objective,
            objective.title.clone(),
            stored_weight(objective.weight_in_course),
        );
        node.code = objective.code.clone();

        let mappings = self.store.item_mappings(&objective.id)?;
        if mappings.is_empty() {
            debug!(objective = %objective.id, "objective has no mapped items");
            return Ok(node);
        }

        let item_ids: Vec<RecordId> = mappings
            .iter()
            .map(|mapping| mapping.item_id.clone())
            .collect();
        let items = self.store.items(&item_ids)?;
        let results = self.store.item_results(cohort, &item_ids)?;

        let item_nodes = mappings
            .into_iter()
            .map(|mapping| {
                let label = items
                    .iter()
                    .find(|item| item.id == mapping.item_id)
                    .and_then(|item| item.label.clone())
                    .unwrap_or_else(|| mapping.item_id.to_string());
                let mut item = EvidenceNode::new(
                    mapping.item_id.clone(),
                    EvidenceLevel::Item,
                    label,
                    stored_weight(mapping.weight),
                );
                item.mean_pct = results
                    .iter()
                    .find(|result| result.item_id == mapping.item_id)
                    .and_then(|result| result.mean_pct());
                item
            })
            .collect();

        Ok(node.with_children(item_nodes))
    }
}

/// Error raised while assembling evidence.
#[derive(Debug, thiserror::Error)]
pub enum EvidenceError {
    #[error("failed to read canonical records: {0}")]
    Store(#[from] StoreError),
}
