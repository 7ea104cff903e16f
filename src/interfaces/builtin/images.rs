//! Image interfaces: conformance checks, b=0 extraction and masking.

use crate::core::node::{Category, InterfaceMetadata, NodeInterface};
use crate::core::port::PortDefinition;
use crate::interfaces::registry::InterfaceRegistry;
use std::sync::Arc;

/// Register image interfaces.
pub fn register(registry: &mut InterfaceRegistry) {
    registry.register(|| Arc::new(ValidateImage));
    registry.register(|| Arc::new(ExtractB0));
    registry.register(|| Arc::new(BrainMask));
}

/// Check header conformance of an image and report any fixes applied.
#[derive(Debug, Clone)]
pub struct ValidateImage;

impl NodeInterface for ValidateImage {
    fn metadata(&self) -> InterfaceMetadata {
        InterfaceMetadata::builder("validate_image", "Validate Image")
            .description("Check the qform/sform of an image and fix it if needed")
            .category(Category::Reference)
            .input(PortDefinition::input("in_file"))
            .output(PortDefinition::output("out_file"))
            .output(
                PortDefinition::output("out_report")
                    .with_description("HTML snippet describing the validation"),
            )
            .tags(["header", "conformance"])
            .build()
    }
}

/// Average the b=0 volumes of a diffusion series.
#[derive(Debug, Clone)]
pub struct ExtractB0;

impl NodeInterface for ExtractB0 {
    fn metadata(&self) -> InterfaceMetadata {
        InterfaceMetadata::builder("extract_b0", "Extract b0")
            .description("Extract and average the b=0 volumes")
            .category(Category::Reference)
            .input(PortDefinition::input("in_file"))
            .input(PortDefinition::input("b0_ixs"))
            .output(PortDefinition::output("out_file"))
            .tags(["b0", "reference"])
            .build()
    }
}

/// Skull-strip a reference image.
#[derive(Debug, Clone)]
pub struct BrainMask;

impl NodeInterface for BrainMask {
    fn metadata(&self) -> InterfaceMetadata {
        InterfaceMetadata::builder("brain_mask", "Brain Mask")
            .description("Compute a brain mask and the masked reference")
            .category(Category::Masking)
            .input(PortDefinition::input("in_file"))
            .input(
                PortDefinition::input("num_threads")
                    .optional()
                    .with_description("Threads available to the tool"),
            )
            .output(PortDefinition::output("out_file"))
            .output(PortDefinition::output("out_mask"))
            .tags(["skullstrip", "mask"])
            .build()
    }
}
