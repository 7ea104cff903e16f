//! # dwiflow - Diffusion MRI workflow assembly
//!
//! dwiflow builds the directed acyclic graph of a diffusion MRI
//! preprocessing pipeline and hands it to an execution engine. It never
//! runs a processing step itself.
//!
//! ## Features
//!
//! - **Validated assembly**: unknown ports, double writers and cycles are
//!   rejected by the call that would introduce them
//! - **Identity boundaries**: every workflow exposes `inputnode` and
//!   `outputnode` surfaces
//! - **Embedding**: whole workflows become single nodes, addressed with
//!   dotted paths such as `dwi_reference_wf.outputnode.ref_image`
//! - **Naming**: workflow identifiers derived from BIDS filenames
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dwiflow::prelude::*;
//!
//! let config = BuildConfig::default().with_omp_nthreads(4);
//! let workflow = init_dwi_preproc_wf("/data/sub-01/dwi/sub-01_run-1_dwi.nii.gz", &config)?;
//! assert_eq!(workflow.name(), "dwi_preproc_run_1_wf");
//!
//! let report = ValidationPipeline::default().validate(&workflow);
//! println!("{}", report.summary());
//!
//! let json = SerializedWorkflow::from_workflow(&workflow).to_json()?;
//! ```
//!
//! ## Building a workflow by hand
//!
//! ```rust,ignore
//! use dwiflow::prelude::*;
//! use std::sync::Arc;
//!
//! let mut wf = Workflow::new("gradients_wf");
//! wf.add_identity(INPUT_NODE, ["dwi_file"])?;
//! wf.add_primitive("gradient_table", Arc::new(CheckGradientTable))?;
//! wf.add_identity(OUTPUT_NODE, ["out_bvec"])?;
//! wf.connect_all(vec![
//!     (INPUT_NODE, "gradient_table", vec![("dwi_file", "dwi_file")]),
//!     ("gradient_table", OUTPUT_NODE, vec![("out_bvec", "out_bvec")]),
//! ])?;
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: Values, ports, interfaces, configuration and errors
//! - [`graph`]: Workflow structure, embedding, topology and serialization
//! - [`validation`]: Post-assembly validation pipeline
//! - [`interfaces`]: Interface registry and built-in declarations
//! - [`workflows`]: Name derivation and the diffusion workflow builders

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod graph;
pub mod interfaces;
pub mod validation;
pub mod workflows;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```rust,ignore
/// use dwiflow::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::types::Value;
    pub use crate::core::node::{Category, InterfaceMetadata, NodeInterface, Passthrough};
    pub use crate::core::port::{PortDefinition, PortDirection, PortHandle};
    pub use crate::core::config::BuildConfig;

    // Errors
    pub use crate::core::error::{
        ConfigError, DwiflowError, DwiflowResult, GraphError, GraphResult, NamingError, NodeId,
        ValidationError, ValidationReport, ValidationWarning, WorkflowId,
    };

    // Graph
    pub use crate::graph::structure::{GraphNode, NodeKind, Workflow};
    pub use crate::graph::connection::{Connection, Endpoint, PortPath};
    pub use crate::graph::nesting::{INPUT_NODE, OUTPUT_NODE};
    pub use crate::graph::topology::TopologyAnalyzer;
    pub use crate::graph::serialization::{SerializedConnection, SerializedNode, SerializedWorkflow};

    // Validation
    pub use crate::validation::pipeline::ValidationPipeline;
    pub use crate::validation::stages::{
        BoundaryValidation, NestedValidation, StructuralValidation, ValidationStage,
    };

    // Interfaces
    pub use crate::interfaces::registry::{InterfaceFactory, InterfaceRegistry};
    pub use crate::interfaces::builtin::{
        BrainMask, CheckGradientTable, DerivativesSink, ExtractB0, MaskReportlet, ValidateImage,
    };

    // Workflows
    pub use crate::workflows::{
        derive_name, init_dwi_preproc_wf, init_dwi_reference_wf, init_reportlets_wf, BidsLayout,
        NameDeriver,
    };
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
