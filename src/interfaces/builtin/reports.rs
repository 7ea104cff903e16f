//! Reporting and derivatives interfaces.

use crate::core::node::{Category, InterfaceMetadata, NodeInterface};
use crate::core::port::PortDefinition;
use crate::interfaces::registry::InterfaceRegistry;
use std::sync::Arc;

/// Register reporting interfaces.
pub fn register(registry: &mut InterfaceRegistry) {
    registry.register(|| Arc::new(MaskReportlet));
    registry.register(|| Arc::new(DerivativesSink));
}

/// Render a mask contour over its background image.
#[derive(Debug, Clone)]
pub struct MaskReportlet;

impl NodeInterface for MaskReportlet {
    fn metadata(&self) -> InterfaceMetadata {
        InterfaceMetadata::builder("mask_reportlet", "Mask Reportlet")
            .description("Plot a brain mask over the reference image")
            .category(Category::Reporting)
            .input(PortDefinition::input("background_file"))
            .input(PortDefinition::input("mask_file"))
            .output(PortDefinition::output("out_report"))
            .tags(["svg", "report", "mask"])
            .build()
    }
}

/// Store a file under the derivatives tree with BIDS-style naming.
#[derive(Debug, Clone)]
pub struct DerivativesSink;

impl NodeInterface for DerivativesSink {
    fn metadata(&self) -> InterfaceMetadata {
        InterfaceMetadata::builder("derivatives_sink", "Derivatives Sink")
            .description("Write a result next to its source file's BIDS entities")
            .category(Category::Output)
            .input(PortDefinition::input("base_directory"))
            .input(
                PortDefinition::input("source_file")
                    .with_description("File whose entities name the output"),
            )
            .input(PortDefinition::input("in_file"))
            .input(PortDefinition::input("desc").optional())
            .input(PortDefinition::input("datatype").optional())
            .output(PortDefinition::output("out_file"))
            .tags(["bids", "derivatives"])
            .build()
    }
}
