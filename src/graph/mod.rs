//! Graph module for assembling workflows.
//!
//! A workflow is a directed acyclic graph (DAG) where nodes are processing
//! steps, identity boundaries or whole embedded workflows, and edges carry
//! data from an output port to an input port.

pub mod structure;
pub mod connection;
pub mod nesting;
pub mod topology;
pub mod serialization;

// Re-export commonly used types
pub use structure::{GraphNode, NodeKind, Workflow};
pub use connection::{Connection, Endpoint, PortPath};
pub use nesting::{INPUT_NODE, OUTPUT_NODE};
pub use topology::TopologyAnalyzer;
pub use serialization::SerializedWorkflow;
