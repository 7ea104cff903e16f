//! Reference image and brain mask of a diffusion series.

use crate::core::error::GraphResult;
use crate::graph::nesting::{INPUT_NODE, OUTPUT_NODE};
use crate::graph::structure::Workflow;
use crate::interfaces::builtin::{BrainMask, ExtractB0, ValidateImage};
use std::sync::Arc;

/// Build the `dwi_reference_wf` workflow.
///
/// Inputs: `dwi_file`, `b0_ixs`.
/// Outputs: `ref_image` (skull-stripped b=0 average), `dwi_mask`,
/// `validation_report`.
pub fn init_dwi_reference_wf(omp_nthreads: usize) -> GraphResult<Workflow> {
    let mut workflow = Workflow::new("dwi_reference_wf")
        .with_description("Average the b=0 volumes and compute a brain mask");

    workflow.add_identity(INPUT_NODE, ["dwi_file", "b0_ixs"])?;
    workflow.add_identity(OUTPUT_NODE, ["ref_image", "dwi_mask", "validation_report"])?;

    workflow.add_primitive("validate", Arc::new(ValidateImage))?;
    workflow.add_primitive("extract_b0", Arc::new(ExtractB0))?;
    workflow.add_primitive("mask", Arc::new(BrainMask))?;
    workflow.set_input("mask", "num_threads", omp_nthreads)?;

    workflow.connect_all(vec![
        (INPUT_NODE, "validate", vec![("dwi_file", "in_file")]),
        (INPUT_NODE, "extract_b0", vec![("b0_ixs", "b0_ixs")]),
        ("validate", "extract_b0", vec![("out_file", "in_file")]),
        ("extract_b0", "mask", vec![("out_file", "in_file")]),
        (
            "mask",
            OUTPUT_NODE,
            vec![("out_file", "ref_image"), ("out_mask", "dwi_mask")],
        ),
        ("validate", OUTPUT_NODE, vec![("out_report", "validation_report")]),
    ])?;

    Ok(workflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Value;
    use crate::validation::ValidationPipeline;

    #[test]
    fn test_reference_boundaries() {
        let wf = init_dwi_reference_wf(4).unwrap();

        assert_eq!(wf.input_fields(), vec!["dwi_file", "b0_ixs"]);
        assert_eq!(
            wf.output_fields(),
            vec!["ref_image", "dwi_mask", "validation_report"]
        );
        assert_eq!(
            wf.get_node("mask").unwrap().value("num_threads"),
            Some(&Value::Integer(4))
        );
        assert!(wf.is_reachable(INPUT_NODE, OUTPUT_NODE));
    }

    #[test]
    fn test_reference_validates_as_embedded() {
        let wf = init_dwi_reference_wf(1).unwrap();
        let report = ValidationPipeline::nested_pipeline().validate(&wf);

        assert!(report.can_execute());
        assert!(report.warnings.is_empty());
    }
}
