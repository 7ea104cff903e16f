//! Workflow serialization for handing off to an execution engine.
//!
//! The serialized form keeps primitive nodes as interface ids, so
//! rebuilding a workflow needs an [`InterfaceRegistry`] and goes through
//! the same validating calls as building it by hand.

use crate::core::error::{GraphError, GraphResult, WorkflowId};
use crate::core::types::Value;
use crate::graph::connection::Connection;
use crate::graph::structure::{GraphNode, NodeKind, Workflow};
use crate::interfaces::registry::InterfaceRegistry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// What a serialized node wraps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SerializedNodeKind {
    /// Primitive node, rebuilt from the registry.
    Primitive {
        /// Interface type ID
        interface: String,
    },
    /// Identity boundary node.
    Identity {
        /// Field names
        fields: Vec<String>,
    },
    /// Embedded workflow.
    Workflow {
        /// The embedded workflow
        workflow: Box<SerializedWorkflow>,
    },
}

/// Serializable representation of a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedNode {
    /// Node ID
    pub id: String,
    /// Node kind
    pub kind: SerializedNodeKind,
    /// Input port names (informational)
    pub inputs: Vec<String>,
    /// Output port names (informational)
    pub outputs: Vec<String>,
    /// Literal values stored on the node
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub values: IndexMap<String, Value>,
    /// Optional display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Serializable representation of a connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedConnection {
    /// From node ID
    pub from_node: String,
    /// From port name
    pub from_port: String,
    /// To node ID
    pub to_node: String,
    /// To port name
    pub to_port: String,
}

impl From<&Connection> for SerializedConnection {
    fn from(conn: &Connection) -> Self {
        Self {
            from_node: conn.from.node_id.to_string(),
            from_port: conn.from.port_name.clone(),
            to_node: conn.to.node_id.to_string(),
            to_port: conn.to.port_name.clone(),
        }
    }
}

/// Serializable representation of a complete workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedWorkflow {
    /// Format version
    pub version: String,
    /// Workflow identity
    pub id: WorkflowId,
    /// Workflow name
    pub name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// All nodes
    pub nodes: Vec<SerializedNode>,
    /// All connections
    pub connections: Vec<SerializedConnection>,
}

impl SerializedWorkflow {
    /// Current format version.
    pub const VERSION: &'static str = "1.0.0";

    /// Capture a workflow.
    pub fn from_workflow(workflow: &Workflow) -> Self {
        Self {
            version: Self::VERSION.to_string(),
            id: workflow.id(),
            name: workflow.name().to_string(),
            description: workflow.description.clone(),
            nodes: workflow.nodes().map(serialize_node).collect(),
            connections: workflow
                .connections()
                .iter()
                .map(SerializedConnection::from)
                .collect(),
        }
    }

    /// Rebuild the workflow, validating every node and connection.
    pub fn into_workflow(self, registry: &InterfaceRegistry) -> GraphResult<Workflow> {
        let mut workflow = Workflow::new(self.name);
        workflow.set_id(self.id);
        workflow.description = self.description;

        for node in self.nodes {
            let rebuilt = match node.kind {
                SerializedNodeKind::Primitive { interface } => {
                    let instance = registry
                        .create(&interface)
                        .ok_or(GraphError::UnknownInterface(interface))?;
                    GraphNode::primitive(node.id.clone(), instance)
                }
                SerializedNodeKind::Identity { fields } => GraphNode::identity(node.id.clone(), fields),
                SerializedNodeKind::Workflow { workflow: child } => {
                    GraphNode::nested(node.id.clone(), child.into_workflow(registry)?)
                }
            };
            let rebuilt = match node.label {
                Some(label) => rebuilt.with_label(label),
                None => rebuilt,
            };

            workflow.add_node(rebuilt)?;
            for (port, value) in node.values {
                workflow.set_input(&node.id, &port, value)?;
            }
        }

        for conn in self.connections {
            workflow.connect(&conn.from_node, &conn.from_port, &conn.to_node, &conn.to_port)?;
        }

        Ok(workflow)
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to compact JSON (no whitespace).
    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn serialize_node(node: &GraphNode) -> SerializedNode {
    let kind = match node.kind() {
        NodeKind::Primitive(interface) => SerializedNodeKind::Primitive {
            interface: interface.metadata().id,
        },
        NodeKind::IdentityBoundary => SerializedNodeKind::Identity {
            fields: node.inputs().iter().map(|p| p.name.clone()).collect(),
        },
        NodeKind::NestedWorkflow(child) => SerializedNodeKind::Workflow {
            workflow: Box::new(SerializedWorkflow::from_workflow(child)),
        },
    };

    SerializedNode {
        id: node.id().to_string(),
        kind,
        inputs: node.inputs().iter().map(|p| p.name.clone()).collect(),
        outputs: node.outputs().iter().map(|p| p.name.clone()).collect(),
        values: node.values().clone(),
        label: node.label.clone(),
    }
}

impl From<&Workflow> for SerializedWorkflow {
    fn from(workflow: &Workflow) -> Self {
        Self::from_workflow(workflow)
    }
}
