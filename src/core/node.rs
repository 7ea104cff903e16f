//! NodeInterface trait and interface metadata.
//!
//! A `NodeInterface` is the contract every processing step must satisfy to
//! take part in a workflow: it declares a fixed set of named input and
//! output fields. What the step computes is opaque to the graph.

use crate::core::port::PortDefinition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category for organizing interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Gradient table handling (b-values, b-vectors)
    Gradients,
    /// Reference image extraction and conformance checks
    Reference,
    /// Brain masking
    Masking,
    /// Visual reports
    Reporting,
    /// Writing derivatives
    Output,
    /// Utility nodes
    Utility,
    /// Custom/user-defined
    #[default]
    Custom,
}

impl Category {
    /// Get the display name for this category.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Gradients => "Gradients",
            Category::Reference => "Reference",
            Category::Masking => "Masking",
            Category::Reporting => "Reporting",
            Category::Output => "Output",
            Category::Utility => "Utility",
            Category::Custom => "Custom",
        }
    }
}

/// Metadata describing an interface.
///
/// The port lists are captured once when a node is added to a workflow,
/// so an interface cannot change its fields after registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceMetadata {
    /// Unique identifier for this interface type (e.g., "check_gradient_table")
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Category for organization
    pub category: Category,
    /// Detailed description
    pub description: String,
    /// Version string
    pub version: String,
    /// Input port definitions
    pub inputs: Vec<PortDefinition>,
    /// Output port definitions
    pub outputs: Vec<PortDefinition>,
    /// Searchable tags
    pub tags: Vec<String>,
}

impl InterfaceMetadata {
    /// Create a new metadata builder.
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> InterfaceMetadataBuilder {
        InterfaceMetadataBuilder::new(id, name)
    }

    /// Get all input port names.
    pub fn input_names(&self) -> Vec<&str> {
        self.inputs.iter().map(|p| p.name.as_str()).collect()
    }

    /// Get all output port names.
    pub fn output_names(&self) -> Vec<&str> {
        self.outputs.iter().map(|p| p.name.as_str()).collect()
    }

    /// Find an input port by name.
    pub fn get_input(&self, name: &str) -> Option<&PortDefinition> {
        self.inputs.iter().find(|p| p.name == name)
    }

    /// Find an output port by name.
    pub fn get_output(&self, name: &str) -> Option<&PortDefinition> {
        self.outputs.iter().find(|p| p.name == name)
    }
}

/// Builder for InterfaceMetadata.
pub struct InterfaceMetadataBuilder {
    id: String,
    name: String,
    category: Category,
    description: String,
    version: String,
    inputs: Vec<PortDefinition>,
    outputs: Vec<PortDefinition>,
    tags: Vec<String>,
}

impl InterfaceMetadataBuilder {
    /// Create a new builder with required fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: Category::Custom,
            description: String::new(),
            version: "1.0.0".to_string(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Set the category.
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Add an input port.
    pub fn input(mut self, port: PortDefinition) -> Self {
        self.inputs.push(port);
        self
    }

    /// Add an output port.
    pub fn output(mut self, port: PortDefinition) -> Self {
        self.outputs.push(port);
        self
    }

    /// Add multiple tags.
    pub fn tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags.extend(tags.into_iter().map(|t| t.into()));
        self
    }

    /// Build the metadata.
    pub fn build(self) -> InterfaceMetadata {
        InterfaceMetadata {
            id: self.id,
            name: self.name,
            category: self.category,
            description: self.description,
            version: self.version,
            inputs: self.inputs,
            outputs: self.outputs,
            tags: self.tags,
        }
    }
}

/// The contract for primitive processing steps.
///
/// # Thread Safety
///
/// `Send + Sync` bounds let an assembled workflow be shared across the
/// threads of an execution engine.
///
/// # Example Implementation
///
/// ```ignore
/// struct ExtractB0;
///
/// impl NodeInterface for ExtractB0 {
///     fn metadata(&self) -> InterfaceMetadata {
///         InterfaceMetadata::builder("extract_b0", "Extract b0")
///             .category(Category::Reference)
///             .input(PortDefinition::input("in_file"))
///             .input(PortDefinition::input("b0_ixs"))
///             .output(PortDefinition::output("out_file"))
///             .build()
///     }
/// }
/// ```
pub trait NodeInterface: Send + Sync {
    /// Get the metadata for this interface.
    ///
    /// Called when the node is registered and should return consistent values.
    fn metadata(&self) -> InterfaceMetadata;
}

impl fmt::Debug for dyn NodeInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeInterface({})", self.metadata().id)
    }
}

/// A single-field interface that forwards its input.
///
/// Useful for tests and as a template for new interfaces.
#[derive(Debug, Clone)]
pub struct Passthrough;

impl NodeInterface for Passthrough {
    fn metadata(&self) -> InterfaceMetadata {
        InterfaceMetadata::builder("passthrough", "Passthrough")
            .category(Category::Utility)
            .description("Passes the input through unchanged")
            .input(PortDefinition::input("input"))
            .output(PortDefinition::output("output"))
            .build()
    }
}
