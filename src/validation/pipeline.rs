//! Validation pipeline implementation.

use crate::core::error::ValidationReport;
use crate::graph::structure::Workflow;
use crate::validation::stages::{
    BoundaryValidation, NestedValidation, StructuralValidation, ValidationStage,
};
use log::debug;
use std::time::Instant;

/// Multi-stage validation pipeline.
///
/// Runs a series of validation stages on an assembled workflow before it
/// is handed to an execution engine.
pub struct ValidationPipeline {
    stages: Vec<Box<dyn ValidationStage>>,
}

impl ValidationPipeline {
    /// Create a new pipeline with the given stages.
    pub fn new(stages: Vec<Box<dyn ValidationStage>>) -> Self {
        Self { stages }
    }

    /// Create the default validation pipeline with all standard stages.
    pub fn default_pipeline() -> Self {
        Self {
            stages: vec![
                Box::new(StructuralValidation),
                Box::new(BoundaryValidation::new()),
                Box::new(NestedValidation),
            ],
        }
    }

    /// Pipeline for embedded workflows, whose inputs the parent feeds.
    pub fn nested_pipeline() -> Self {
        Self {
            stages: vec![
                Box::new(StructuralValidation),
                Box::new(BoundaryValidation::outputs_only()),
                Box::new(NestedValidation),
            ],
        }
    }

    /// Add a custom validation stage.
    pub fn add_stage(&mut self, stage: Box<dyn ValidationStage>) {
        self.stages.push(stage);
    }

    /// Validate a workflow through all stages.
    pub fn validate(&self, workflow: &Workflow) -> ValidationReport {
        let start = Instant::now();
        let mut report = ValidationReport::new();

        for stage in &self.stages {
            match stage.validate(workflow) {
                Ok(warnings) => {
                    for warning in warnings {
                        report.add_warning(warning);
                    }
                }
                Err(errors) => {
                    for error in errors {
                        let is_fatal = error.is_fatal();
                        report.add_error(error);

                        // Stop on fatal errors
                        if is_fatal {
                            debug!("{} stopped validation of '{}'", stage.name(), workflow.name());
                            report.duration_ms = start.elapsed().as_millis() as u64;
                            return report;
                        }
                    }
                }
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        report
    }

    /// Quick validation - just check if the workflow can be executed.
    pub fn can_execute(&self, workflow: &Workflow) -> bool {
        self.validate(workflow).can_execute()
    }
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::default_pipeline()
    }
}
