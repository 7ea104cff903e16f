//! Individual validation stages.
//!
//! Each stage checks for a specific category of problems.

use crate::core::error::{GraphError, ValidationError, ValidationWarning};
use crate::graph::nesting::{INPUT_NODE, OUTPUT_NODE};
use crate::graph::structure::{GraphNode, NodeKind, Workflow};
use crate::graph::topology::TopologyAnalyzer;
use crate::validation::pipeline::ValidationPipeline;

/// Trait for validation stages.
pub trait ValidationStage: Send + Sync {
    /// Name of this validation stage.
    fn name(&self) -> &str;

    /// Validate the workflow.
    ///
    /// Returns Ok with warnings, or Err with errors.
    fn validate(
        &self,
        workflow: &Workflow,
    ) -> Result<Vec<ValidationWarning>, Vec<ValidationError>>;
}

/// Whether an input port receives data, by connection or literal value.
fn is_written(workflow: &Workflow, node: &GraphNode, port: &str) -> bool {
    workflow.writer_of(node.id().as_str(), port).is_some() || node.value(port).is_some()
}

/// Structural validation - checks graph structure.
///
/// Verifies:
/// - Workflow is a DAG (no cycles)
/// - All mandatory primitive inputs have a writer
pub struct StructuralValidation;

impl ValidationStage for StructuralValidation {
    fn name(&self) -> &str {
        "Structural Validation"
    }

    fn validate(
        &self,
        workflow: &Workflow,
    ) -> Result<Vec<ValidationWarning>, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        // Empty workflow warning (not error - might be intentional)
        if workflow.is_empty() {
            warnings.push(ValidationWarning {
                message: format!("Workflow '{}' is empty", workflow.name()),
                node_path: None,
                suggestion: Some("Add nodes to build a pipeline".to_string()),
            });
            return Ok(warnings);
        }

        let analyzer = TopologyAnalyzer::new(workflow);
        if let Err(err) = analyzer.topological_sort() {
            let nodes = match err {
                GraphError::CycleDetected { nodes } => nodes,
                other => vec![other.to_string()],
            };
            return Err(vec![ValidationError::CycleDetected { nodes }]);
        }

        for node in workflow.nodes() {
            if !matches!(node.kind(), NodeKind::Primitive(_)) {
                continue;
            }
            for input in node.inputs().iter().filter(|p| !p.optional) {
                if !is_written(workflow, node, &input.name) {
                    errors.push(ValidationError::MissingRequiredInput {
                        node_path: node.id().to_string(),
                        port: input.name.clone(),
                    });
                }
            }
        }

        // Check for disconnected subgraphs (warning)
        let subgraphs = analyzer.find_subgraphs();
        if subgraphs.len() > 1 {
            warnings.push(ValidationWarning {
                message: format!(
                    "Workflow '{}' contains {} disconnected subgraphs",
                    workflow.name(),
                    subgraphs.len()
                ),
                node_path: None,
                suggestion: Some(
                    "Consider connecting all parts or removing unused nodes".to_string(),
                ),
            });
        }

        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(errors)
        }
    }
}

/// Boundary validation - checks the workflow's input and output surfaces.
///
/// Verifies:
/// - Every promised output field is written
/// - Every input field receives a value (optional, see [`Self::outputs_only`])
pub struct BoundaryValidation {
    check_inputs: bool,
}

impl BoundaryValidation {
    /// Check both surfaces.
    pub fn new() -> Self {
        Self { check_inputs: true }
    }

    /// Check only the output surface.
    ///
    /// Used for embedded workflows, whose inputs are fed by the parent.
    pub fn outputs_only() -> Self {
        Self {
            check_inputs: false,
        }
    }
}

impl Default for BoundaryValidation {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationStage for BoundaryValidation {
    fn name(&self) -> &str {
        "Boundary Validation"
    }

    fn validate(
        &self,
        workflow: &Workflow,
    ) -> Result<Vec<ValidationWarning>, Vec<ValidationError>> {
        let mut warnings = Vec::new();

        if let Some(outputnode) = workflow.nodes().find(|n| n.id().as_str() == OUTPUT_NODE) {
            for field in workflow.output_fields() {
                if !is_written(workflow, outputnode, field) {
                    warnings.push(ValidationWarning {
                        message: format!("Output field '{}' is never written", field),
                        node_path: Some(OUTPUT_NODE.to_string()),
                        suggestion: Some(format!(
                            "Connect a producer to '{}.{}'",
                            OUTPUT_NODE, field
                        )),
                    });
                }
            }
        }

        if self.check_inputs {
            if let Some(inputnode) = workflow.nodes().find(|n| n.id().as_str() == INPUT_NODE) {
                for field in workflow.input_fields() {
                    if !is_written(workflow, inputnode, field) {
                        warnings.push(ValidationWarning {
                            message: format!("Input field '{}' has no value", field),
                            node_path: Some(INPUT_NODE.to_string()),
                            suggestion: Some(
                                "Set it with set_input or leave it for the execution engine"
                                    .to_string(),
                            ),
                        });
                    }
                }
            }
        }

        Ok(warnings)
    }
}

/// Nested validation - validates every embedded workflow.
///
/// Child reports are re-anchored under the embedding node, so a problem
/// inside `dwi_reference_wf` reads `dwi_reference_wf.<node>`.
pub struct NestedValidation;

impl ValidationStage for NestedValidation {
    fn name(&self) -> &str {
        "Nested Validation"
    }

    fn validate(
        &self,
        workflow: &Workflow,
    ) -> Result<Vec<ValidationWarning>, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let pipeline = ValidationPipeline::nested_pipeline();

        for node in workflow.nodes() {
            let NodeKind::NestedWorkflow(child) = node.kind() else {
                continue;
            };
            let prefix = node.id().as_str();

            for input in node.inputs() {
                if !is_written(workflow, node, &input.name) {
                    warnings.push(ValidationWarning {
                        message: format!(
                            "Embedded input '{}' is neither connected nor set",
                            input.name
                        ),
                        node_path: Some(prefix.to_string()),
                        suggestion: Some(format!("Connect an output to '{}.{}'", prefix, input.name)),
                    });
                }
            }

            let report = pipeline.validate(child);
            errors.extend(report.errors.into_iter().map(|e| e.prefixed(prefix)));
            warnings.extend(report.warnings.into_iter().map(|w| w.prefixed(prefix)));
        }

        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::node::Passthrough;
    use std::sync::Arc;

    fn bounded() -> Workflow {
        let mut wf = Workflow::new("bounded_wf");
        wf.add_identity(INPUT_NODE, ["in_file"]).unwrap();
        wf.add_primitive("step", Arc::new(Passthrough)).unwrap();
        wf.add_identity(OUTPUT_NODE, ["out_file", "out_mask"]).unwrap();
        wf.connect(INPUT_NODE, "in_file", "step", "input").unwrap();
        wf.connect("step", "output", OUTPUT_NODE, "out_file").unwrap();
        wf
    }

    #[test]
    fn test_structural_validation_empty_workflow() {
        let wf = Workflow::new("empty_wf");
        let warnings = StructuralValidation.validate(&wf).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("empty"));
    }

    #[test]
    fn test_structural_missing_required_input() {
        let mut wf = Workflow::new("wf");
        wf.add_primitive("step", Arc::new(Passthrough)).unwrap();

        let errors = StructuralValidation.validate(&wf).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::MissingRequiredInput {
                node_path: "step".to_string(),
                port: "input".to_string(),
            }]
        );

        wf.set_input("step", "input", "file.nii.gz").unwrap();
        assert!(StructuralValidation.validate(&wf).is_ok());
    }

    #[test]
    fn test_structural_disconnected_warning() {
        let mut wf = bounded();
        wf.add_identity("stray", ["x"]).unwrap();

        let warnings = StructuralValidation.validate(&wf).unwrap();
        assert!(warnings.iter().any(|w| w.message.contains("2 disconnected")));
    }

    #[test]
    fn test_boundary_validation() {
        let wf = bounded();
        let warnings = BoundaryValidation::new().validate(&wf).unwrap();

        let messages: Vec<_> = warnings.iter().map(|w| w.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Output field 'out_mask' is never written",
                "Input field 'in_file' has no value",
            ]
        );

        let warnings = BoundaryValidation::outputs_only().validate(&wf).unwrap();
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_nested_validation_prefixes_paths() {
        let mut child = Workflow::new("child_wf");
        child.add_identity(INPUT_NODE, ["in_file"]).unwrap();
        child.add_primitive("orphan", Arc::new(Passthrough)).unwrap();

        let mut parent = Workflow::new("parent_wf");
        parent.embed(child, "child").unwrap();

        let errors = NestedValidation.validate(&parent).unwrap_err();
        assert_eq!(errors[0].affected_nodes(), vec!["child.orphan".to_string()]);
    }

    #[test]
    fn test_nested_validation_unfed_input() {
        let mut parent = Workflow::new("parent_wf");
        parent.embed(bounded(), "inner").unwrap();

        let warnings = NestedValidation.validate(&parent).unwrap();
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("inputnode.in_file")
                && w.node_path.as_deref() == Some("inner")));
        assert!(warnings
            .iter()
            .any(|w| w.node_path.as_deref() == Some("inner.outputnode")));
    }
}
