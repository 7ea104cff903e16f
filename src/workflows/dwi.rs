//! Top-level diffusion preprocessing workflow.

use crate::core::config::BuildConfig;
use crate::core::error::DwiflowResult;
use crate::graph::nesting::{INPUT_NODE, OUTPUT_NODE};
use crate::graph::structure::Workflow;
use crate::interfaces::builtin::CheckGradientTable;
use crate::workflows::layout::BidsLayout;
use crate::workflows::naming::derive_name;
use crate::workflows::reference::init_dwi_reference_wf;
use crate::workflows::reports::init_reportlets_wf;
use log::info;
use std::path::Path;
use std::sync::Arc;

/// Fields of the preprocessing workflow's input surface.
///
/// Only the series and its gradient sidecars are set here; anatomical
/// fields are fed by an enclosing subject workflow.
pub const INPUT_FIELDS: [&str; 16] = [
    "dwi_file",
    "bvec_file",
    "bval_file",
    "subjects_dir",
    "subject_id",
    "t1w_preproc",
    "t1w_mask",
    "t1w_dseg",
    "t1w_tpms",
    "t1w_aseg",
    "t1w_aparc",
    "anat2std_xfm",
    "std2anat_xfm",
    "template",
    "t1w2fsnative_xfm",
    "fsnative2t1w_xfm",
];

/// Fields of the preprocessing workflow's output surface.
pub const OUTPUT_FIELDS: [&str; 5] = ["out_dwi", "out_bvec", "out_bval", "out_rasb", "out_dwi_mask"];

/// Build the preprocessing workflow for one diffusion series.
///
/// The workflow is named after `dwi_file` (see
/// [`derive_name`](crate::workflows::naming::derive_name)), checks the
/// gradient table, computes a reference and mask through
/// `dwi_reference_wf`, and writes reportlets through `reportlets_wf`.
pub fn init_dwi_preproc_wf(
    dwi_file: impl AsRef<Path>,
    config: &BuildConfig,
) -> DwiflowResult<Workflow> {
    let layout = BidsLayout::from_config(config);
    let dwi_file = layout.resolve(dwi_file);
    let mut workflow = Workflow::new(derive_name(&dwi_file)?);

    workflow.add_identity(INPUT_NODE, INPUT_FIELDS)?;
    workflow.set_input(INPUT_NODE, "dwi_file", dwi_file.as_path())?;
    workflow.set_input(INPUT_NODE, "bvec_file", layout.get_bvec(&dwi_file))?;
    workflow.set_input(INPUT_NODE, "bval_file", layout.get_bval(&dwi_file))?;

    workflow.add_identity(OUTPUT_NODE, OUTPUT_FIELDS)?;
    workflow.add_primitive("gradient_table", Arc::new(CheckGradientTable))?;
    workflow.embed(init_dwi_reference_wf(config.omp_nthreads)?, "dwi_reference_wf")?;

    workflow.connect_all(vec![
        (
            INPUT_NODE,
            "gradient_table",
            vec![
                ("dwi_file", "dwi_file"),
                ("bvec_file", "in_bvec"),
                ("bval_file", "in_bval"),
            ],
        ),
        (INPUT_NODE, "dwi_reference_wf", vec![("dwi_file", "inputnode.dwi_file")]),
        ("gradient_table", "dwi_reference_wf", vec![("b0_ixs", "inputnode.b0_ixs")]),
        (
            "dwi_reference_wf",
            OUTPUT_NODE,
            vec![
                ("outputnode.ref_image", "out_dwi"),
                ("outputnode.dwi_mask", "out_dwi_mask"),
            ],
        ),
        (
            "gradient_table",
            OUTPUT_NODE,
            vec![
                ("out_bvec", "out_bvec"),
                ("out_bval", "out_bval"),
                ("out_rasb", "out_rasb"),
            ],
        ),
    ])?;

    // Reporting
    workflow.embed(init_reportlets_wf(config.reportlets_dir())?, "reportlets_wf")?;
    workflow.connect_all(vec![
        (INPUT_NODE, "reportlets_wf", vec![("dwi_file", "inputnode.source_file")]),
        (
            "dwi_reference_wf",
            "reportlets_wf",
            vec![
                ("outputnode.ref_image", "inputnode.dwi_ref"),
                ("outputnode.dwi_mask", "inputnode.dwi_mask"),
                ("outputnode.validation_report", "inputnode.validation_report"),
            ],
        ),
    ])?;

    info!(
        "Assembled '{}' for {} ({} nodes, {} connections)",
        workflow.name(),
        dwi_file.display(),
        workflow.node_count(),
        workflow.connection_count()
    );
    Ok(workflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{DwiflowError, NamingError};
    use crate::core::types::Value;
    use crate::graph::topology::TopologyAnalyzer;
    use crate::validation::ValidationPipeline;
    use std::path::PathBuf;

    const DWI: &str = "/data/sub-01/dwi/sub-01_run-1_dwi.nii.gz";

    fn build() -> Workflow {
        let config = BuildConfig::default()
            .with_omp_nthreads(8)
            .with_work_dir("/work");
        init_dwi_preproc_wf(DWI, &config).unwrap()
    }

    #[test]
    fn test_name_and_surfaces() {
        let wf = build();

        assert_eq!(wf.name(), "dwi_preproc_run_1_wf");
        assert_eq!(wf.input_fields(), INPUT_FIELDS.to_vec());
        assert_eq!(wf.output_fields(), OUTPUT_FIELDS.to_vec());
        assert_eq!(wf.node_count(), 5);
        assert_eq!(wf.connection_count(), 14);
    }

    #[test]
    fn test_literal_inputs() {
        let wf = build();

        assert_eq!(
            wf.trace_value(INPUT_NODE, "bvec_file").unwrap(),
            Some(&Value::Path(PathBuf::from(
                "/data/sub-01/dwi/sub-01_run-1_dwi.bvec"
            )))
        );
        assert_eq!(wf.trace_value(INPUT_NODE, "t1w_mask").unwrap(), None);

        let reference = wf.nested("dwi_reference_wf").unwrap();
        assert_eq!(
            reference.get_node("mask").unwrap().value("num_threads"),
            Some(&Value::Integer(8))
        );

        let reportlets = wf.nested("reportlets_wf").unwrap();
        assert_eq!(
            reportlets
                .get_node("ds_report_mask")
                .unwrap()
                .value("base_directory")
                .and_then(Value::as_path),
            Some(Path::new("/work/reportlets"))
        );
    }

    #[test]
    fn test_wiring() {
        let wf = build();

        let writer = wf.writer_of("dwi_reference_wf", "inputnode.b0_ixs").unwrap();
        assert!(writer.from.is("gradient_table", "b0_ixs"));

        let writer = wf.writer_of(OUTPUT_NODE, "out_dwi").unwrap();
        assert!(writer.from.is("dwi_reference_wf", "outputnode.ref_image"));

        let writer = wf.writer_of("reportlets_wf", "inputnode.validation_report").unwrap();
        assert!(writer.from.is("dwi_reference_wf", "outputnode.validation_report"));

        assert!(wf.is_reachable(INPUT_NODE, "reportlets_wf"));
        assert!(!wf.is_reachable("reportlets_wf", OUTPUT_NODE));
    }

    #[test]
    fn test_execution_order() {
        let wf = build();
        let batches = TopologyAnalyzer::new(&wf).parallel_batches().unwrap();

        let mut ids: Vec<Vec<&str>> = batches
            .iter()
            .map(|batch| batch.iter().map(|id| id.as_str()).collect())
            .collect();
        // nodes within a batch have no defined order
        ids.iter_mut().for_each(|batch| batch.sort_unstable());
        assert_eq!(
            ids,
            vec![
                vec![INPUT_NODE],
                vec!["gradient_table"],
                vec!["dwi_reference_wf"],
                vec![OUTPUT_NODE, "reportlets_wf"],
            ]
        );
    }

    #[test]
    fn test_validation_report() {
        let wf = build();
        let report = ValidationPipeline::default_pipeline().validate(&wf);

        assert!(report.can_execute(), "{:?}", report.errors);
        // anatomical inputs are left for the enclosing workflow
        assert_eq!(report.warnings.len(), 13);
        assert!(report
            .warnings
            .iter()
            .all(|w| w.node_path.as_deref() == Some(INPUT_NODE)));
    }

    #[test]
    fn test_relative_path_uses_bids_dir() {
        let config = BuildConfig {
            bids_dir: Some(PathBuf::from("/bids")),
            ..BuildConfig::default()
        };
        let wf = init_dwi_preproc_wf("sub-02/dwi/sub-02_dwi.nii.gz", &config).unwrap();

        assert_eq!(wf.name(), "dwi_preproc_wf");
        assert_eq!(
            wf.get_node(INPUT_NODE).unwrap().value("dwi_file"),
            Some(&Value::Path(PathBuf::from("/bids/sub-02/dwi/sub-02_dwi.nii.gz")))
        );
    }

    #[test]
    fn test_malformed_filename() {
        let result = init_dwi_preproc_wf("/data/.nii.gz", &BuildConfig::default());
        assert!(matches!(
            result,
            Err(DwiflowError::Naming(NamingError::MalformedFilename { .. }))
        ));
    }
}
