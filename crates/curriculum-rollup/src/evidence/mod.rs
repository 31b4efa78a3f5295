//! Standard evidence trees built from canonical records rather than the live graph.

pub mod builder;
pub mod export;
pub mod records;
pub mod store;

pub use builder::{EvidenceBuilder, EvidenceError, EvidenceLevel, EvidenceNode, MeanSummary};
pub use export::{flatten, write_csv, EvidenceRow};
pub use records::{
    CohortId, CourseRecord, ItemObjectiveWeight, ItemRecord, ItemResult, ObjectiveRecord,
    RecordId, StandardCourseLink, StandardRecord,
};
pub use store::{InMemoryRecordStore, RecordStore, StoreError};
