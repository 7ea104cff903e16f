//! Diffusion preprocessing workflows.
//!
//! Builders assemble workflows from the built-in interfaces; nothing here
//! runs a processing step.

pub mod dwi;
pub mod layout;
pub mod naming;
pub mod reference;
pub mod reports;

pub use dwi::init_dwi_preproc_wf;
pub use layout::BidsLayout;
pub use naming::{derive_name, split_filename, NameDeriver};
pub use reference::init_dwi_reference_wf;
pub use reports::init_reportlets_wf;
