//! Built-in interface declarations.
//!
//! These describe the fields of the processing steps the diffusion
//! workflows are assembled from. What the steps compute is up to the
//! execution engine.

mod gradients;
mod images;
mod reports;

use crate::core::node::Passthrough;
use crate::interfaces::registry::InterfaceRegistry;
use std::sync::Arc;

/// Register all built-in interfaces.
pub fn register_all(registry: &mut InterfaceRegistry) {
    registry.register(|| Arc::new(Passthrough));
    gradients::register(registry);
    images::register(registry);
    reports::register(registry);
}

// Re-export for direct access
pub use gradients::CheckGradientTable;
pub use images::{BrainMask, ExtractB0, ValidateImage};
pub use reports::{DerivativesSink, MaskReportlet};
