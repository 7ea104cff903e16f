//! Gradient table interfaces.

use crate::core::node::{Category, InterfaceMetadata, NodeInterface};
use crate::core::port::PortDefinition;
use crate::interfaces::registry::InterfaceRegistry;
use std::sync::Arc;

/// Register gradient interfaces.
pub fn register(registry: &mut InterfaceRegistry) {
    registry.register(|| Arc::new(CheckGradientTable));
}

/// Check and normalize the gradient table of a diffusion series.
///
/// Accepts FSL-style `bvec`/`bval` sidecars or a RAS+B table and reports
/// which volumes are low-b references.
#[derive(Debug, Clone)]
pub struct CheckGradientTable;

impl NodeInterface for CheckGradientTable {
    fn metadata(&self) -> InterfaceMetadata {
        InterfaceMetadata::builder("check_gradient_table", "Check Gradient Table")
            .description("Validate the gradient table and locate b=0 volumes")
            .category(Category::Gradients)
            .input(PortDefinition::input("dwi_file").with_description("Diffusion series"))
            .input(
                PortDefinition::input("in_bvec")
                    .optional()
                    .with_description("FSL-style b-vectors file"),
            )
            .input(
                PortDefinition::input("in_bval")
                    .optional()
                    .with_description("FSL-style b-values file"),
            )
            .input(
                PortDefinition::input("in_rasb")
                    .optional()
                    .with_description("RAS+B gradient table"),
            )
            .input(
                PortDefinition::input("b0_threshold")
                    .optional()
                    .with_description("Highest b-value counted as b=0"),
            )
            .output(PortDefinition::output("out_bvec"))
            .output(PortDefinition::output("out_bval"))
            .output(PortDefinition::output("out_rasb"))
            .output(PortDefinition::output("full_sphere"))
            .output(PortDefinition::output("pole"))
            .output(
                PortDefinition::output("b0_ixs").with_description("Indices of b=0 volumes"),
            )
            .output(PortDefinition::output("b0_mask"))
            .tags(["bvec", "bval", "gradients"])
            .build()
    }
}
