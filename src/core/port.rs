//! Port definitions for node inputs/outputs.
//!
//! Ports define the interface of a node: which named fields it accepts
//! and which it produces. Names are opaque and matched exactly.

use crate::core::error::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a port (input or output).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
}

impl PortDirection {
    /// The other direction.
    pub fn opposite(self) -> Self {
        match self {
            PortDirection::Input => PortDirection::Output,
            PortDirection::Output => PortDirection::Input,
        }
    }
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortDirection::Input => f.write_str("input"),
            PortDirection::Output => f.write_str("output"),
        }
    }
}

/// Definition of a node port (input or output).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDefinition {
    /// Unique name within the node and direction
    pub name: String,
    /// Direction (input or output)
    pub direction: PortDirection,
    /// Whether an input may be left without a writer
    pub optional: bool,
    /// Description for documentation
    pub description: String,
}

impl PortDefinition {
    /// Create a new input port definition.
    pub fn input(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: PortDirection::Input,
            optional: false,
            description: String::new(),
        }
    }

    /// Create a new output port definition.
    pub fn output(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: PortDirection::Output,
            optional: false,
            description: String::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark this port as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Same port in the other direction. Identity fields are declared twice.
    pub(crate) fn mirrored(&self) -> Self {
        Self {
            direction: self.direction.opposite(),
            ..self.clone()
        }
    }
}

/// A port resolved against a node in a workflow.
///
/// Produced once by [`Workflow::resolve_port`](crate::graph::Workflow::resolve_port)
/// so callers never re-parse the dotted address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortHandle {
    /// Node that owns the port.
    pub node_id: NodeId,
    /// Port name as declared on the node.
    pub port: String,
    /// Declared direction.
    pub direction: PortDirection,
}

impl fmt::Display for PortHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node_id, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_definition_builder() {
        let port = PortDefinition::input("in_bvec")
            .with_description("b-vectors file")
            .optional();

        assert_eq!(port.name, "in_bvec");
        assert_eq!(port.direction, PortDirection::Input);
        assert!(port.optional);
        assert_eq!(port.description, "b-vectors file");
    }

    #[test]
    fn test_mirrored_port() {
        let port = PortDefinition::input("dwi_file");
        let mirrored = port.mirrored();

        assert_eq!(mirrored.name, "dwi_file");
        assert_eq!(mirrored.direction, PortDirection::Output);
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(PortDirection::Input.to_string(), "input");
        assert_eq!(PortDirection::Output.opposite(), PortDirection::Input);
    }

    #[test]
    fn test_port_handle_display() {
        let handle = PortHandle {
            node_id: NodeId::new("gradient_table").unwrap(),
            port: "b0_ixs".to_string(),
            direction: PortDirection::Output,
        };
        assert_eq!(handle.to_string(), "gradient_table.b0_ixs");
    }
}
