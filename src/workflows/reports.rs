//! Visual reports written alongside preprocessing.

use crate::core::error::GraphResult;
use crate::graph::nesting::INPUT_NODE;
use crate::graph::structure::Workflow;
use crate::interfaces::builtin::{DerivativesSink, MaskReportlet};
use std::path::Path;
use std::sync::Arc;

/// Build the `reportlets_wf` workflow.
///
/// Inputs: `source_file`, `dwi_ref`, `dwi_mask`, `validation_report`.
/// The workflow only writes files, so it has no output surface.
pub fn init_reportlets_wf(reportlets_dir: impl AsRef<Path>) -> GraphResult<Workflow> {
    let reportlets_dir = reportlets_dir.as_ref();
    let mut workflow = Workflow::new("reportlets_wf");

    workflow.add_identity(
        INPUT_NODE,
        ["source_file", "dwi_ref", "dwi_mask", "validation_report"],
    )?;
    workflow.add_primitive("mask_reportlet", Arc::new(MaskReportlet))?;

    for (id, desc) in [("ds_report_mask", "brain"), ("ds_report_validation", "validation")] {
        workflow.add_primitive(id, Arc::new(DerivativesSink))?;
        workflow.set_input(id, "base_directory", reportlets_dir)?;
        workflow.set_input(id, "desc", desc)?;
        workflow.set_input(id, "datatype", "figures")?;
    }

    workflow.connect_all(vec![
        (
            INPUT_NODE,
            "mask_reportlet",
            vec![("dwi_ref", "background_file"), ("dwi_mask", "mask_file")],
        ),
        (INPUT_NODE, "ds_report_mask", vec![("source_file", "source_file")]),
        ("mask_reportlet", "ds_report_mask", vec![("out_report", "in_file")]),
        (
            INPUT_NODE,
            "ds_report_validation",
            vec![
                ("source_file", "source_file"),
                ("validation_report", "in_file"),
            ],
        ),
    ])?;

    Ok(workflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Value;

    #[test]
    fn test_reportlets_literals() {
        let wf = init_reportlets_wf("/work/reportlets").unwrap();

        let sink = wf.get_node("ds_report_mask").unwrap();
        assert_eq!(
            sink.value("base_directory").and_then(Value::as_path),
            Some(Path::new("/work/reportlets"))
        );
        assert_eq!(sink.value("desc").and_then(Value::as_str), Some("brain"));
        assert!(wf.output_fields().is_empty());
    }

    #[test]
    fn test_source_file_fans_out() {
        let wf = init_reportlets_wf("reportlets").unwrap();

        let targets: Vec<_> = wf
            .connections_from(INPUT_NODE)
            .filter(|c| c.from.port_name == "source_file")
            .map(|c| c.to.node_id.to_string())
            .collect();
        assert_eq!(targets, vec!["ds_report_mask", "ds_report_validation"]);
    }
}
