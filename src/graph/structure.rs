//! Workflow structure and node management.
//!
//! The Workflow is the central data structure that holds all nodes and
//! their connections. Every mutation validates eagerly, so a workflow is
//! acyclic with single-writer inputs after each successful call:
//! - Node ids are unique and valid dotted-path segments
//! - Ports are resolved against the node's declared set
//! - Cycles are rejected when the closing connection is added

use crate::core::error::{ConnectionId, GraphError, GraphResult, NodeId, WorkflowId};
use crate::core::node::NodeInterface;
use crate::core::port::{PortDefinition, PortDirection, PortHandle};
use crate::core::types::Value;
use crate::graph::connection::{Connection, Endpoint, PortPath};
use indexmap::IndexMap;
use log::debug;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

/// What a node wraps.
#[derive(Clone)]
pub enum NodeKind {
    /// An opaque processing step described by its interface.
    Primitive(Arc<dyn NodeInterface>),
    /// A pass-through placeholder marking a workflow boundary.
    IdentityBoundary,
    /// A whole workflow used as a single node.
    NestedWorkflow(Box<Workflow>),
}

impl NodeKind {
    /// Short name of the variant, for logs and serialization.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Primitive(_) => "primitive",
            NodeKind::IdentityBoundary => "identity",
            NodeKind::NestedWorkflow(_) => "workflow",
        }
    }
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Primitive(interface) => {
                f.debug_tuple("Primitive").field(&interface.metadata().id).finish()
            }
            NodeKind::IdentityBoundary => f.write_str("IdentityBoundary"),
            NodeKind::NestedWorkflow(workflow) => {
                f.debug_tuple("NestedWorkflow").field(&workflow.name()).finish()
            }
        }
    }
}

/// A node instance in a workflow.
///
/// Contains the node kind, its fixed port sets and any literal values
/// assigned to its fields.
#[derive(Debug, Clone)]
pub struct GraphNode {
    id: NodeId,
    kind: NodeKind,
    inputs: Vec<PortDefinition>,
    outputs: Vec<PortDefinition>,
    values: IndexMap<String, Value>,
    /// Optional display name override
    pub label: Option<String>,
}

impl GraphNode {
    /// Create a primitive node. The interface's ports are captured here.
    pub fn primitive(id: impl Into<String>, interface: Arc<dyn NodeInterface>) -> Self {
        let metadata = interface.metadata();
        Self::with_ports(
            id,
            NodeKind::Primitive(interface),
            metadata.inputs,
            metadata.outputs,
        )
    }

    /// Create an identity node. Every field is both an input and an output.
    pub fn identity<I, S>(id: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let inputs: Vec<PortDefinition> = fields
            .into_iter()
            .map(|field| PortDefinition::input(field).optional())
            .collect();
        let outputs = inputs.iter().map(PortDefinition::mirrored).collect();
        Self::with_ports(id, NodeKind::IdentityBoundary, inputs, outputs)
    }

    pub(crate) fn with_ports(
        id: impl Into<String>,
        kind: NodeKind,
        inputs: Vec<PortDefinition>,
        outputs: Vec<PortDefinition>,
    ) -> Self {
        Self {
            id: NodeId::from_validated(id),
            kind,
            inputs,
            outputs,
            values: IndexMap::new(),
            label: None,
        }
    }

    /// Set the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Node id.
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Node kind.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Whether this is an identity boundary node.
    pub fn is_identity(&self) -> bool {
        matches!(self.kind, NodeKind::IdentityBoundary)
    }

    /// Interface id of a primitive node.
    pub fn interface_id(&self) -> Option<String> {
        match &self.kind {
            NodeKind::Primitive(interface) => Some(interface.metadata().id),
            _ => None,
        }
    }

    /// Declared input ports.
    pub fn inputs(&self) -> &[PortDefinition] {
        &self.inputs
    }

    /// Declared output ports.
    pub fn outputs(&self) -> &[PortDefinition] {
        &self.outputs
    }

    /// Find a declared port.
    pub fn port(&self, name: &str, direction: PortDirection) -> Option<&PortDefinition> {
        let ports = match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        };
        ports.iter().find(|p| p.name == name)
    }

    /// Display name (label or id).
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(self.id.as_str())
    }

    /// Literal values stored on this node itself.
    pub fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    /// Literal value reaching an input port by direct assignment.
    ///
    /// For an embedded workflow, `inputnode.<field>` reads the child's
    /// boundary field.
    pub fn value(&self, port: &str) -> Option<&Value> {
        match &self.kind {
            NodeKind::NestedWorkflow(child) => {
                let (boundary, field) = port.split_once('.')?;
                child.nodes.get(boundary)?.value(field)
            }
            _ => self.values.get(port),
        }
    }

    fn assign(&mut self, port: &str, value: Value) -> GraphResult<()> {
        match &mut self.kind {
            NodeKind::NestedWorkflow(child) => {
                let path = PortPath::parse(port)?;
                child.set_input(path.node, path.port, value)
            }
            _ => {
                self.values.insert(port.to_string(), value);
                Ok(())
            }
        }
    }

    fn check_ports(&self) -> GraphResult<()> {
        if matches!(self.kind, NodeKind::Primitive(_))
            && self.inputs.is_empty()
            && self.outputs.is_empty()
        {
            return Err(GraphError::EmptyPortSet(self.id.to_string()));
        }

        for (ports, direction) in [
            (&self.inputs, PortDirection::Input),
            (&self.outputs, PortDirection::Output),
        ] {
            let mut seen = HashSet::new();
            for port in ports {
                if !seen.insert(port.name.as_str()) {
                    return Err(GraphError::DuplicatePort {
                        node_id: self.id.to_string(),
                        port: port.name.clone(),
                        direction,
                    });
                }
            }
        }

        Ok(())
    }
}

/// A named, owned collection of nodes and connections.
///
/// Uses IndexMap to maintain insertion order for consistent iteration.
#[derive(Debug, Clone)]
pub struct Workflow {
    id: WorkflowId,
    name: String,
    pub(crate) nodes: IndexMap<NodeId, GraphNode>,
    connections: Vec<Connection>,
    /// Optional free-form description.
    pub description: Option<String>,
}

impl Workflow {
    /// Create a new empty workflow.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: WorkflowId::new(),
            name: name.into(),
            nodes: IndexMap::new(),
            connections: Vec::new(),
            description: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Workflow identity, shared by clones.
    pub fn id(&self) -> WorkflowId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: WorkflowId) {
        self.id = id;
    }

    /// Workflow name.
    pub fn name(&self) -> &str {
        &self.name
    }

    // ========================================================================
    // Node Management
    // ========================================================================

    /// Add a prepared node to the workflow.
    pub fn add_node(&mut self, node: GraphNode) -> GraphResult<NodeId> {
        let id = NodeId::new(node.id.as_str())?;
        if self.nodes.contains_key(id.as_str()) {
            return Err(GraphError::DuplicateNode(id));
        }
        node.check_ports()?;

        if let NodeKind::NestedWorkflow(child) = &node.kind {
            if child.contains_workflow(self.id) {
                return Err(GraphError::CyclicEmbedding {
                    parent: self.name.clone(),
                    child: child.name.clone(),
                });
            }
        }

        debug!(
            "Workflow '{}': added {} node '{}' ({} in, {} out)",
            self.name,
            node.kind.label(),
            id,
            node.inputs.len(),
            node.outputs.len()
        );
        self.nodes.insert(id.clone(), node);
        Ok(id)
    }

    /// Add a primitive node wrapping an interface.
    pub fn add_primitive(
        &mut self,
        id: impl Into<String>,
        interface: Arc<dyn NodeInterface>,
    ) -> GraphResult<NodeId> {
        self.add_node(GraphNode::primitive(id, interface))
    }

    /// Add an identity boundary node with the given fields.
    pub fn add_identity<I, S>(&mut self, id: impl Into<String>, fields: I) -> GraphResult<NodeId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_node(GraphNode::identity(id, fields))
    }

    /// Get a reference to a node.
    pub fn get_node(&self, id: impl AsRef<str>) -> GraphResult<&GraphNode> {
        let id = id.as_ref();
        self.nodes
            .get(id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))
    }

    /// Check if a node exists.
    pub fn has_node(&self, id: impl AsRef<str>) -> bool {
        self.nodes.contains_key(id.as_ref())
    }

    /// Get all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// Get all node IDs.
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> + '_ {
        self.nodes.keys()
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Resolve a port name against a node's declared ports.
    pub fn resolve_port(
        &self,
        node_id: impl AsRef<str>,
        port: impl AsRef<str>,
        direction: PortDirection,
    ) -> GraphResult<PortHandle> {
        let node = self.get_node(node_id)?;
        let port = port.as_ref();

        if node.port(port, direction).is_some() {
            return Ok(PortHandle {
                node_id: node.id.clone(),
                port: port.to_string(),
                direction,
            });
        }

        if node.port(port, direction.opposite()).is_some() {
            Err(GraphError::PortDirectionMismatch {
                node_id: node.id.to_string(),
                port: port.to_string(),
                expected: direction,
            })
        } else {
            Err(GraphError::UnknownPort {
                node_id: node.id.to_string(),
                port: port.to_string(),
                direction,
            })
        }
    }

    /// Assign a literal value to an input field.
    ///
    /// This is how external parameters enter the graph. The value becomes
    /// the field's single writer, so the field must not be connected.
    pub fn set_input(
        &mut self,
        node_id: impl AsRef<str>,
        port: impl AsRef<str>,
        value: impl Into<Value>,
    ) -> GraphResult<()> {
        let handle = self.resolve_port(node_id, port, PortDirection::Input)?;
        if self.writer_of(handle.node_id.as_str(), &handle.port).is_some() {
            return Err(GraphError::PortAlreadyBound {
                node_id: handle.node_id.to_string(),
                port: handle.port,
            });
        }

        let node = self
            .nodes
            .get_mut(handle.node_id.as_str())
            .ok_or_else(|| GraphError::UnknownNode(handle.node_id.to_string()))?;
        let value = value.into();
        debug!("Workflow '{}': {} = {}", self.name, handle, value);
        node.assign(&handle.port, value)
    }

    // ========================================================================
    // Connection Management
    // ========================================================================

    /// Create a connection between two ports.
    pub fn connect(
        &mut self,
        from_node: impl AsRef<str>,
        from_port: impl AsRef<str>,
        to_node: impl AsRef<str>,
        to_port: impl AsRef<str>,
    ) -> GraphResult<ConnectionId> {
        let source = self.resolve_port(from_node, from_port, PortDirection::Output)?;
        let sink = self.resolve_port(to_node, to_port, PortDirection::Input)?;

        if self.has_writer(&sink) {
            return Err(GraphError::PortAlreadyBound {
                node_id: sink.node_id.to_string(),
                port: sink.port,
            });
        }

        if self.would_create_cycle(&source.node_id, &sink.node_id) {
            return Err(GraphError::CycleDetected {
                nodes: vec![source.node_id.to_string(), sink.node_id.to_string()],
            });
        }

        let connection = Connection::new(
            Endpoint::new(source.node_id, source.port),
            Endpoint::new(sink.node_id, sink.port),
        );
        debug!("Workflow '{}': connected {}", self.name, connection);

        let id = connection.id;
        self.connections.push(connection);
        Ok(id)
    }

    /// Connect two dotted port addresses, e.g.
    /// `connect_paths("gradient_table.b0_ixs", "dwi_reference_wf.inputnode.b0_ixs")`.
    pub fn connect_paths(&mut self, from: &str, to: &str) -> GraphResult<ConnectionId> {
        let from = PortPath::parse(from)?;
        let to = PortPath::parse(to)?;
        self.connect(from.node, from.port, to.node, to.port)
    }

    /// Wire many fields between pairs of nodes at once.
    ///
    /// Each item is `(source node, sink node, [(output, input), ...])`.
    /// The batch is atomic: if any link fails, no link from it is kept.
    pub fn connect_all<'a, I>(&mut self, links: I) -> GraphResult<Vec<ConnectionId>>
    where
        I: IntoIterator<Item = (&'a str, &'a str, Vec<(&'a str, &'a str)>)>,
    {
        let checkpoint = self.connections.len();
        let mut ids = Vec::new();

        for (from_node, to_node, fields) in links {
            for (from_port, to_port) in fields {
                match self.connect(from_node, from_port, to_node, to_port) {
                    Ok(id) => ids.push(id),
                    Err(err) => {
                        self.connections.truncate(checkpoint);
                        debug!(
                            "Workflow '{}': batch connect rolled back {} connection(s)",
                            self.name,
                            ids.len()
                        );
                        return Err(err);
                    }
                }
            }
        }

        Ok(ids)
    }

    /// Get all connections.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Get a connection by ID.
    pub fn get_connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    /// Get all connections from a node.
    pub fn connections_from<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Connection> {
        self.connections
            .iter()
            .filter(move |c| c.from.node_id.as_str() == node_id)
    }

    /// Get all connections to a node.
    pub fn connections_to<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Connection> {
        self.connections
            .iter()
            .filter(move |c| c.to.node_id.as_str() == node_id)
    }

    /// The connection feeding an input port, if any.
    pub fn writer_of(&self, node_id: &str, port: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.to.is(node_id, port))
    }

    /// Check if an input port has a writer (connection or literal value).
    ///
    /// For an embedded workflow, `inputnode.<field>` also counts as written
    /// when the child feeds that field itself.
    pub fn has_writer(&self, port: &PortHandle) -> bool {
        if self.writer_of(port.node_id.as_str(), &port.port).is_some() {
            return true;
        }
        let Some(node) = self.nodes.get(port.node_id.as_str()) else {
            return false;
        };
        match &node.kind {
            NodeKind::NestedWorkflow(child) => port
                .port
                .split_once('.')
                .and_then(|(boundary, field)| {
                    child
                        .resolve_port(boundary, field, PortDirection::Input)
                        .ok()
                })
                .map_or(false, |inner| child.has_writer(&inner)),
            _ => node.value(&port.port).is_some(),
        }
    }

    /// Get the number of connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    // ========================================================================
    // Graph Analysis
    // ========================================================================

    /// Check if connecting from_node to to_node would create a cycle.
    fn would_create_cycle(&self, from_node: &NodeId, to_node: &NodeId) -> bool {
        // If from_node is reachable from to_node, adding this edge creates a cycle
        self.is_reachable(to_node.as_str(), from_node.as_str())
    }

    /// Check if `target` is reachable from `start` following connections.
    pub fn is_reachable(&self, start: &str, target: &str) -> bool {
        if start == target {
            return true;
        }

        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            if current == target {
                return true;
            }

            if visited.insert(current) {
                for conn in self.connections_from(current) {
                    queue.push_back(conn.to.node_id.as_str());
                }
            }
        }

        false
    }

    /// Get all nodes that depend on the given node (downstream).
    pub fn get_downstream(&self, node_id: &str) -> Vec<NodeId> {
        self.walk(node_id, |c| (&c.from, &c.to))
    }

    /// Get all nodes that the given node depends on (upstream).
    pub fn get_upstream(&self, node_id: &str) -> Vec<NodeId> {
        self.walk(node_id, |c| (&c.to, &c.from))
    }

    fn walk<F>(&self, node_id: &str, edge: F) -> Vec<NodeId>
    where
        F: Fn(&Connection) -> (&Endpoint, &Endpoint),
    {
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(node_id);

        while let Some(current) = queue.pop_front() {
            for conn in &self.connections {
                let (near, far) = edge(conn);
                if near.node_id.as_str() == current && visited.insert(far.node_id.as_str()) {
                    result.push(far.node_id.clone());
                    queue.push_back(far.node_id.as_str());
                }
            }
        }

        result
    }

    /// Get nodes with no incoming connections (source nodes).
    pub fn get_source_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .keys()
            .filter(|id| self.connections_to(id.as_str()).next().is_none())
            .cloned()
            .collect()
    }

    /// Get nodes with no outgoing connections (sink nodes).
    pub fn get_sink_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .keys()
            .filter(|id| self.connections_from(id.as_str()).next().is_none())
            .cloned()
            .collect()
    }

    /// Check if the workflow is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
