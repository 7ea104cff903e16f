//! Topological analysis and sorting of workflows.
//!
//! Provides algorithms for:
//! - Topological sorting (the order an execution engine would follow)
//! - Parallel batch identification
//! - Weakly connected subgraphs

use crate::core::error::{GraphError, GraphResult, NodeId};
use crate::graph::structure::Workflow;
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::unionfind::UnionFind;
use std::collections::{HashMap, HashSet, VecDeque};

/// Analyzer for workflow topology.
pub struct TopologyAnalyzer<'a> {
    workflow: &'a Workflow,
    graph: DiGraph<&'a NodeId, ()>,
    index: HashMap<&'a str, NodeIndex>,
}

impl<'a> TopologyAnalyzer<'a> {
    /// Create a new analyzer for the given workflow.
    pub fn new(workflow: &'a Workflow) -> Self {
        let mut graph = DiGraph::with_capacity(workflow.node_count(), workflow.connection_count());
        let mut index = HashMap::new();

        for id in workflow.node_ids() {
            index.insert(id.as_str(), graph.add_node(id));
        }
        for conn in workflow.connections() {
            if let (Some(&from), Some(&to)) = (
                index.get(conn.from.node_id.as_str()),
                index.get(conn.to.node_id.as_str()),
            ) {
                graph.add_edge(from, to, ());
            }
        }

        Self {
            workflow,
            graph,
            index,
        }
    }

    /// Get the topological sort order.
    ///
    /// Returns nodes in an order where dependencies come before dependents.
    pub fn topological_sort(&self) -> GraphResult<Vec<NodeId>> {
        toposort(&self.graph, None)
            .map(|order| order.into_iter().map(|ix| self.graph[ix].clone()).collect())
            .map_err(|cycle| GraphError::CycleDetected {
                nodes: vec![self.graph[cycle.node_id()].to_string()],
            })
    }

    /// Group nodes into parallel execution batches.
    ///
    /// Nodes in the same batch don't depend on each other.
    pub fn parallel_batches(&self) -> GraphResult<Vec<Vec<NodeId>>> {
        let sorted = self.topological_sort()?;

        // Longest path from a source
        let mut depth: HashMap<&str, usize> = HashMap::new();
        for node_id in &sorted {
            let node_depth = self
                .workflow
                .connections_to(node_id.as_str())
                .filter_map(|conn| depth.get(conn.from.node_id.as_str()))
                .max()
                .map(|d| d + 1)
                .unwrap_or(0);
            depth.insert(node_id.as_str(), node_depth);
        }

        let max_depth = depth.values().max().copied().unwrap_or(0);
        let mut batches: Vec<Vec<NodeId>> = vec![Vec::new(); max_depth + 1];
        for node_id in &sorted {
            batches[depth[node_id.as_str()]].push(node_id.clone());
        }
        batches.retain(|batch| !batch.is_empty());

        Ok(batches)
    }

    /// Get the execution depth of a node.
    ///
    /// Depth 0 = source nodes (no dependencies)
    pub fn node_depth(&self, node_id: &str) -> GraphResult<usize> {
        if !self.workflow.has_node(node_id) {
            return Err(GraphError::UnknownNode(node_id.to_string()));
        }

        let mut max_depth = 0;
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back((node_id, 0));

        // BFS backwards to find longest path
        while let Some((current, depth)) = queue.pop_front() {
            if visited.insert((current, depth)) {
                for conn in self.workflow.connections_to(current) {
                    queue.push_back((conn.from.node_id.as_str(), depth + 1));
                    max_depth = max_depth.max(depth + 1);
                }
            }
        }

        Ok(max_depth)
    }

    /// Check if the workflow has any cycles.
    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Find all weakly connected subgraphs, in node insertion order.
    pub fn find_subgraphs(&self) -> Vec<HashSet<NodeId>> {
        let mut sets = UnionFind::new(self.graph.node_count());
        for edge in self.graph.raw_edges() {
            sets.union(edge.source().index(), edge.target().index());
        }

        let mut groups: Vec<(usize, HashSet<NodeId>)> = Vec::new();
        for id in self.workflow.node_ids() {
            let root = sets.find(self.index[id.as_str()].index());
            match groups.iter_mut().find(|(r, _)| *r == root) {
                Some((_, group)) => {
                    group.insert(id.clone());
                }
                None => groups.push((root, HashSet::from([id.clone()]))),
            }
        }

        groups.into_iter().map(|(_, group)| group).collect()
    }
}
