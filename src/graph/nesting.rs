//! Embedding whole workflows as single nodes.
//!
//! An embedded workflow shows its parent only its boundary: each field of
//! its `inputnode` becomes an input port `inputnode.<field>` and each field
//! of its `outputnode` an output port `outputnode.<field>`. Field names
//! are not rewritten, so a parent wires
//! `dwi_reference_wf.outputnode.ref_image` exactly as the child names it.

use crate::core::error::{GraphError, GraphResult, NodeId, WorkflowId};
use crate::core::port::{PortDefinition, PortDirection};
use crate::core::types::Value;
use crate::graph::structure::{GraphNode, NodeKind, Workflow};

/// Id of the identity node that forms a workflow's input surface.
pub const INPUT_NODE: &str = "inputnode";

/// Id of the identity node that forms a workflow's output surface.
pub const OUTPUT_NODE: &str = "outputnode";

impl GraphNode {
    /// Create a node wrapping a whole workflow.
    pub fn nested(id: impl Into<String>, workflow: Workflow) -> Self {
        let inputs = boundary_ports(&workflow, INPUT_NODE, PortDirection::Input);
        let outputs = boundary_ports(&workflow, OUTPUT_NODE, PortDirection::Output);
        Self::with_ports(
            id,
            NodeKind::NestedWorkflow(Box::new(workflow)),
            inputs,
            outputs,
        )
    }
}

fn boundary_ports(workflow: &Workflow, boundary: &str, direction: PortDirection) -> Vec<PortDefinition> {
    let Some(node) = workflow.nodes.get(boundary).filter(|n| n.is_identity()) else {
        return Vec::new();
    };

    let ports = match direction {
        PortDirection::Input => node.inputs(),
        PortDirection::Output => node.outputs(),
    };
    ports
        .iter()
        .map(|port| PortDefinition {
            name: format!("{}.{}", boundary, port.name),
            ..port.clone()
        })
        .collect()
}

impl Workflow {
    /// Register `child` as a single node of this workflow.
    ///
    /// Fails with [`GraphError::CyclicEmbedding`] if `child` is this
    /// workflow or already contains it at any depth.
    pub fn embed(&mut self, child: Workflow, as_node_id: impl Into<String>) -> GraphResult<NodeId> {
        self.add_node(GraphNode::nested(as_node_id, child))
    }

    /// Whether this workflow is, or transitively embeds, the workflow `id`.
    pub fn contains_workflow(&self, id: WorkflowId) -> bool {
        self.id() == id
            || self.nodes().any(|node| match node.kind() {
                NodeKind::NestedWorkflow(child) => child.contains_workflow(id),
                _ => false,
            })
    }

    /// The workflow embedded as `node_id`.
    pub fn nested(&self, node_id: impl AsRef<str>) -> GraphResult<&Workflow> {
        let node = self.get_node(node_id.as_ref())?;
        match node.kind() {
            NodeKind::NestedWorkflow(child) => Ok(child),
            _ => Err(GraphError::UnknownNode(format!(
                "{} (not an embedded workflow)",
                node.id()
            ))),
        }
    }

    /// Fields of this workflow's input surface.
    pub fn input_fields(&self) -> Vec<&str> {
        self.boundary_fields(INPUT_NODE)
    }

    /// Fields of this workflow's output surface.
    pub fn output_fields(&self) -> Vec<&str> {
        self.boundary_fields(OUTPUT_NODE)
    }

    fn boundary_fields(&self, boundary: &str) -> Vec<&str> {
        self.nodes
            .get(boundary)
            .filter(|n| n.is_identity())
            .map(|n| n.inputs().iter().map(|p| p.name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Dotted paths of every node, descending into embedded workflows.
    pub fn node_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for node in self.nodes() {
            paths.push(node.id().to_string());
            if let NodeKind::NestedWorkflow(child) = node.kind() {
                paths.extend(
                    child
                        .node_paths()
                        .into_iter()
                        .map(|p| format!("{}.{}", node.id(), p)),
                );
            }
        }
        paths
    }

    /// The literal value that reaches an output port, if any.
    ///
    /// Follows identity pass-throughs and embedded boundaries upstream,
    /// in and out of nested workflows, until it finds a literal value or a
    /// primitive output (which only exists at run time).
    pub fn trace_value(
        &self,
        node_id: impl AsRef<str>,
        port: impl AsRef<str>,
    ) -> GraphResult<Option<&Value>> {
        let handle = self.resolve_port(node_id, port, PortDirection::Output)?;
        let mut scopes = Vec::new();
        Ok(trace_output(&mut scopes, self, handle.node_id.as_str(), &handle.port))
    }
}

/// Enclosing workflows, innermost last, with the id each child has there.
type Scopes<'a> = Vec<(&'a Workflow, &'a str)>;

fn trace_output<'a>(
    scopes: &mut Scopes<'a>,
    workflow: &'a Workflow,
    node_id: &str,
    port: &str,
) -> Option<&'a Value> {
    let node = workflow.nodes.get(node_id)?;
    match node.kind() {
        NodeKind::Primitive(_) => None,
        NodeKind::IdentityBoundary => trace_input(scopes, workflow, node, port),
        NodeKind::NestedWorkflow(child) => {
            let (boundary, field) = port.split_once('.')?;
            scopes.push((workflow, node.id().as_str()));
            let value = trace_output(scopes, child, boundary, field);
            scopes.pop();
            value
        }
    }
}

fn trace_input<'a>(
    scopes: &mut Scopes<'a>,
    workflow: &'a Workflow,
    node: &'a GraphNode,
    port: &str,
) -> Option<&'a Value> {
    if let Some(conn) = workflow.writer_of(node.id().as_str(), port) {
        return trace_output(
            scopes,
            workflow,
            conn.from.node_id.as_str(),
            &conn.from.port_name,
        );
    }
    if let Some(value) = node.values().get(port) {
        return Some(value);
    }
    if node.id().as_str() != INPUT_NODE {
        return None;
    }

    // Unset input surface: the value comes from whatever the parent wired
    // into the embedding node.
    let (parent, embedded_as) = scopes.pop()?;
    let value = parent
        .writer_of(embedded_as, &format!("{}.{}", INPUT_NODE, port))
        .and_then(|conn| {
            trace_output(
                scopes,
                parent,
                conn.from.node_id.as_str(),
                &conn.from.port_name,
            )
        });
    scopes.push((parent, embedded_as));
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::node::Passthrough;
    use std::sync::Arc;

    fn reference_wf() -> Workflow {
        let mut wf = Workflow::new("dwi_reference_wf");
        wf.add_identity(INPUT_NODE, ["dwi_file", "b0_ixs"]).unwrap();
        wf.add_identity(OUTPUT_NODE, ["ref_image", "dwi_file"]).unwrap();
        wf.add_primitive("enhance", Arc::new(Passthrough)).unwrap();
        wf.connect(INPUT_NODE, "b0_ixs", "enhance", "input").unwrap();
        wf.connect("enhance", "output", OUTPUT_NODE, "ref_image").unwrap();
        wf.connect(INPUT_NODE, "dwi_file", OUTPUT_NODE, "dwi_file").unwrap();
        wf
    }

    #[test]
    fn test_embedded_ports_mirror_boundary() {
        let mut parent = Workflow::new("parent_wf");
        parent.embed(reference_wf(), "ref").unwrap();

        let node = parent.get_node("ref").unwrap();
        let inputs: Vec<_> = node.inputs().iter().map(|p| p.name.as_str()).collect();
        let outputs: Vec<_> = node.outputs().iter().map(|p| p.name.as_str()).collect();

        assert_eq!(inputs, vec!["inputnode.dwi_file", "inputnode.b0_ixs"]);
        assert_eq!(outputs, vec!["outputnode.ref_image", "outputnode.dwi_file"]);
    }

    #[test]
    fn test_embed_without_boundaries() {
        let mut child = Workflow::new("bare_wf");
        child.add_primitive("step", Arc::new(Passthrough)).unwrap();

        let mut parent = Workflow::new("parent_wf");
        parent.embed(child, "bare").unwrap();

        let node = parent.get_node("bare").unwrap();
        assert!(node.inputs().is_empty());
        assert!(node.outputs().is_empty());
    }

    #[test]
    fn test_connect_through_embedding() {
        let mut parent = Workflow::new("parent_wf");
        parent.add_identity(INPUT_NODE, ["dwi_file"]).unwrap();
        parent.add_identity(OUTPUT_NODE, ["out_dwi"]).unwrap();
        parent.embed(reference_wf(), "ref").unwrap();

        parent
            .connect_paths("inputnode.dwi_file", "ref.inputnode.dwi_file")
            .unwrap();
        parent
            .connect_paths("ref.outputnode.ref_image", "outputnode.out_dwi")
            .unwrap();

        assert!(parent.is_reachable(INPUT_NODE, OUTPUT_NODE));
        assert!(matches!(
            parent.connect("ref", "dwi_file", OUTPUT_NODE, "out_dwi"),
            Err(GraphError::UnknownPort { .. })
        ));
    }

    #[test]
    fn test_internally_fed_field_has_one_writer() {
        let mut child = Workflow::new("child_wf");
        child.add_identity(INPUT_NODE, ["x"]).unwrap();
        child.add_primitive("p", Arc::new(Passthrough)).unwrap();
        child.connect("p", "output", INPUT_NODE, "x").unwrap();

        let mut parent = Workflow::new("parent_wf");
        parent.add_identity(INPUT_NODE, ["y"]).unwrap();
        parent.embed(child, "c").unwrap();

        let result = parent.connect_paths("inputnode.y", "c.inputnode.x");
        assert!(matches!(result, Err(GraphError::PortAlreadyBound { .. })));
        assert_eq!(parent.connection_count(), 0);

        let sink = parent
            .resolve_port("c", "inputnode.x", PortDirection::Input)
            .unwrap();
        assert!(parent.has_writer(&sink));
    }

    #[test]
    fn test_embedded_values_match_standalone() {
        let mut child = reference_wf();
        child
            .set_input(INPUT_NODE, "dwi_file", "/data/sub-01_dwi.nii.gz")
            .unwrap();

        let standalone = child
            .trace_value(OUTPUT_NODE, "dwi_file")
            .unwrap()
            .cloned();
        assert_eq!(standalone, Some(Value::from("/data/sub-01_dwi.nii.gz")));

        let mut parent = Workflow::new("parent_wf");
        parent.embed(child, "x").unwrap();
        let embedded = parent.trace_value("x", "outputnode.dwi_file").unwrap().cloned();
        assert_eq!(embedded, standalone);

        // primitive outputs only exist at run time
        assert_eq!(parent.trace_value("x", "outputnode.ref_image").unwrap(), None);
    }

    #[test]
    fn test_trace_value_through_parent_wiring() {
        let mut parent = Workflow::new("parent_wf");
        parent.add_identity(INPUT_NODE, ["dwi_file"]).unwrap();
        parent.add_identity(OUTPUT_NODE, ["out_dwi"]).unwrap();
        parent.embed(reference_wf(), "ref").unwrap();
        parent
            .set_input(INPUT_NODE, "dwi_file", "/data/sub-02_dwi.nii.gz")
            .unwrap();
        parent
            .connect_paths("inputnode.dwi_file", "ref.inputnode.dwi_file")
            .unwrap();
        parent
            .connect_paths("ref.outputnode.dwi_file", "outputnode.out_dwi")
            .unwrap();

        assert_eq!(
            parent.trace_value(OUTPUT_NODE, "out_dwi").unwrap(),
            Some(&Value::from("/data/sub-02_dwi.nii.gz"))
        );
    }

    #[test]
    fn test_set_input_on_embedded_node() {
        let mut parent = Workflow::new("parent_wf");
        parent.embed(reference_wf(), "ref").unwrap();
        parent
            .set_input("ref", "inputnode.b0_ixs", vec![0i64, 1])
            .unwrap();

        let child = parent.nested("ref").unwrap();
        assert_eq!(
            child.get_node(INPUT_NODE).unwrap().value("b0_ixs"),
            Some(&Value::List(vec![Value::Integer(0), Value::Integer(1)]))
        );

        // the literal now owns the port
        parent.add_identity(INPUT_NODE, ["b0_ixs"]).unwrap();
        let result = parent.connect_paths("inputnode.b0_ixs", "ref.inputnode.b0_ixs");
        assert!(matches!(result, Err(GraphError::PortAlreadyBound { .. })));
    }

    #[test]
    fn test_cyclic_embedding() {
        let mut a = Workflow::new("a_wf");
        let mut b = Workflow::new("b_wf");
        b.add_identity(INPUT_NODE, ["x"]).unwrap();

        a.embed(b.clone(), "b").unwrap();
        let result = b.embed(a.clone(), "a");
        assert!(matches!(result, Err(GraphError::CyclicEmbedding { .. })));
        assert!(!b.has_node("a"));
    }

    #[test]
    fn test_self_embedding() {
        let mut a = Workflow::new("a_wf");
        let result = a.embed(a.clone(), "me");
        assert!(matches!(result, Err(GraphError::CyclicEmbedding { .. })));
    }

    #[test]
    fn test_deep_cyclic_embedding() {
        let a = Workflow::new("a_wf");
        let mut b = Workflow::new("b_wf");
        b.embed(a.clone(), "a").unwrap();
        let mut c = Workflow::new("c_wf");
        c.embed(b, "b").unwrap();

        let mut a = a;
        assert!(matches!(
            a.embed(c, "c"),
            Err(GraphError::CyclicEmbedding { .. })
        ));
    }

    #[test]
    fn test_node_paths() {
        let mut parent = Workflow::new("parent_wf");
        parent.add_identity(INPUT_NODE, ["dwi_file"]).unwrap();
        parent.embed(reference_wf(), "ref").unwrap();

        assert_eq!(
            parent.node_paths(),
            vec![
                "inputnode",
                "ref",
                "ref.inputnode",
                "ref.outputnode",
                "ref.enhance",
            ]
        );
        assert_eq!(parent.input_fields(), vec!["dwi_file"]);
        assert!(parent.output_fields().is_empty());
    }
}
