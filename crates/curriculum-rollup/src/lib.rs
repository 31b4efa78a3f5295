//! Hierarchical weighted rollup and traffic-light classification for curriculum entities.
//!
//! [`rollup`] works on a live entity/edge snapshot and recomputes only the ancestors of a
//! changed entity. [`evidence`] rebuilds a standard's score from canonical records as an
//! auditable tree.

pub mod config;
pub mod error;
pub mod evidence;
pub mod rollup;
pub mod telemetry;
