//! Connection types for the graph.

use crate::core::error::{ConnectionId, GraphError, GraphResult, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An endpoint of a connection (node + port).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// The node ID.
    pub node_id: NodeId,
    /// The port name on that node.
    pub port_name: String,
}

impl Endpoint {
    /// Create a new endpoint.
    pub fn new(node_id: NodeId, port_name: impl Into<String>) -> Self {
        Self {
            node_id,
            port_name: port_name.into(),
        }
    }

    /// Check whether this endpoint addresses the given node and port.
    pub fn is(&self, node_id: &str, port_name: &str) -> bool {
        self.node_id.as_str() == node_id && self.port_name == port_name
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node_id, self.port_name)
    }
}

/// A connection between two ports in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Unique identifier for this connection.
    pub id: ConnectionId,
    /// Source endpoint (output port).
    pub from: Endpoint,
    /// Target endpoint (input port).
    pub to: Endpoint,
}

impl Connection {
    /// Create a new connection.
    pub fn new(from: Endpoint, to: Endpoint) -> Self {
        Self {
            id: ConnectionId::new(),
            from,
            to,
        }
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// A dotted port address such as `"dwi_reference_wf.outputnode.ref_image"`.
///
/// The first segment names a node of the workflow being wired; the rest
/// is the port name on that node, which may itself contain dots when the
/// node is an embedded workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortPath<'a> {
    /// Node segment.
    pub node: &'a str,
    /// Port segment.
    pub port: &'a str,
}

impl<'a> PortPath<'a> {
    /// Split a dotted address at its first separator.
    pub fn parse(path: &'a str) -> GraphResult<Self> {
        match path.split_once('.') {
            Some((node, port)) if !node.is_empty() && !port.is_empty() => {
                Ok(Self { node, port })
            }
            _ => Err(GraphError::InvalidPortPath(path.to_string())),
        }
    }
}
