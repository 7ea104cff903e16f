//! Validation module for post-assembly checking.
//!
//! Assembly already rejects unknown ports, double writers and cycles; the
//! pipeline reports what is only visible once a workflow is complete.

pub mod pipeline;
pub mod stages;

pub use pipeline::ValidationPipeline;
pub use stages::{BoundaryValidation, NestedValidation, StructuralValidation, ValidationStage};
