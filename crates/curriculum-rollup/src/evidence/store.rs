use super::records::{
    CohortId, CourseRecord, ItemObjectiveWeight, ItemRecord, ItemResult, ObjectiveRecord,
    RecordId, StandardCourseLink, StandardRecord,
};
use serde::{Deserialize, Serialize};

/// Read-only access to the canonical relational records.
pub trait RecordStore: Send + Sync {
    fn standard(&self, id: &RecordId) -> Result<Option<StandardRecord>, StoreError>;
    fn course_links(&self, standard_id: &RecordId) -> Result<Vec<StandardCourseLink>, StoreError>;
    fn course(&self, id: &RecordId) -> Result<Option<CourseRecord>, StoreError>;
    fn objectives_for_course(&self, course_id: &RecordId)
        -> Result<Vec<ObjectiveRecord>, StoreError>;
    fn item_mappings(&self, objective_id: &RecordId)
        -> Result<Vec<ItemObjectiveWeight>, StoreError>;
    fn items(&self, ids: &[RecordId]) -> Result<Vec<ItemRecord>, StoreError>;
    fn item_results(
        &self,
        cohort: &CohortId,
        item_ids: &[RecordId],
    ) -> Result<Vec<ItemResult>, StoreError>;
}

/// Error enumeration for record store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

/// Whole-dataset store, typically deserialized from a JSON export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InMemoryRecordStore {
    pub standards: Vec<StandardRecord>,
    pub courses: Vec<CourseRecord>,
    pub objectives: Vec<ObjectiveRecord>,
    pub items: Vec<ItemRecord>,
    pub item_objectives: Vec<ItemObjectiveWeight>,
    pub standard_courses: Vec<StandardCourseLink>,
    pub results: Vec<ItemResult>,
}

impl RecordStore for InMemoryRecordStore {
    fn standard(&self, id: &RecordId) -> Result<Option<StandardRecord>, StoreError> {
        Ok(self.standards.iter().find(|record| &record.id == id).cloned())
    }

    fn course_links(&self, standard_id: &RecordId) -> Result<Vec<StandardCourseLink>, StoreError> {
        Ok(self
            .standard_courses
            .iter()
            .filter(|link| &link.standard_id == standard_id)
            .cloned()
            .collect())
    }

    fn course(&self, id: &RecordId) -> Result<Option<CourseRecord>, StoreError> {
        Ok(self.courses.iter().find(|record| &record.id == id).cloned())
    }

    fn objectives_for_course(
        &self,
        course_id: &RecordId,
    ) -> Result<Vec<ObjectiveRecord>, StoreError> {
        Ok(self
            .objectives
            .iter()
            .filter(|objective| &objective.course_id == course_id)
            .cloned()
            .collect())
    }

    fn item_mappings(
        &self,
        objective_id: &RecordId,
    ) -> Result<Vec<ItemObjectiveWeight>, StoreError> {
        Ok(self
            .item_objectives
            .iter()
            .filter(|mapping| &mapping.objective_id == objective_id)
            .cloned()
            .collect())
    }

    fn items(&self, ids: &[RecordId]) -> Result<Vec<ItemRecord>, StoreError> {
        Ok(self
            .items
            .iter()
            .filter(|item| ids.contains(&item.id))
            .cloned()
            .collect())
    }

    fn item_results(
        &self,
        cohort: &CohortId,
        item_ids: &[RecordId],
    ) -> Result<Vec<ItemResult>, StoreError> {
        Ok(self
            .results
            .iter()
            .filter(|result| &result.cohort_id == cohort && item_ids.contains(&result.item_id))
            .cloned()
            .collect())
    }
}
