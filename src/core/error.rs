//! Error types for dwiflow.
//!
//! Uses thiserror for structured errors with context. Errors are designed to:
//! - Be serializable so a report can be handed to an external engine
//! - Name the node and port that caused them
//! - Convert into the top-level [`DwiflowError`] with `?`

use crate::core::port::PortDirection;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Identifier of a node, unique within its owning workflow.
///
/// Node ids double as the first segment of dotted port paths
/// (`"gradient_table.b0_ixs"`), so they may not be empty or contain `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId(String);

impl NodeId {
    /// Create a node id, rejecting names that would break dotted addressing.
    pub fn new(id: impl Into<String>) -> GraphResult<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(GraphError::InvalidNodeId {
                id,
                reason: "node ids cannot be empty".to_string(),
            });
        }
        if id.contains('.') {
            return Err(GraphError::InvalidNodeId {
                id,
                reason: "node ids cannot contain '.'".to_string(),
            });
        }
        Ok(Self(id))
    }

    /// Unchecked constructor for ids that were validated before.
    pub(crate) fn from_validated(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NodeId {
    type Error = GraphError;

    fn try_from(id: String) -> GraphResult<Self> {
        Self::new(id)
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Identity of a workflow.
///
/// Clones share the id, so a cloned workflow counts as the same workflow
/// when checking for self-containing embeddings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowId(pub Uuid);

impl WorkflowId {
    /// Create a new random workflow ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WorkflowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Unique identifier for a connection in a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Top-level error type for dwiflow.
#[derive(Error, Debug)]
pub enum DwiflowError {
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Naming error: {0}")]
    Naming(#[from] NamingError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while assembling a workflow.
///
/// Every variant is detected eagerly by the call that triggers it; the
/// workflow is left as it was before that call.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GraphError {
    #[error("Node '{0}' already exists in this workflow")]
    DuplicateNode(NodeId),

    #[error("Node '{0}' not found")]
    UnknownNode(String),

    #[error("No {direction} port '{port}' on node '{node_id}'")]
    UnknownPort {
        node_id: String,
        port: String,
        direction: PortDirection,
    },

    #[error("Port '{port}' on node '{node_id}' is not an {expected} port")]
    PortDirectionMismatch {
        node_id: String,
        port: String,
        expected: PortDirection,
    },

    #[error("Input port '{port}' on node '{node_id}' is already bound")]
    PortAlreadyBound { node_id: String, port: String },

    #[error("Connection would create a cycle involving nodes: {nodes:?}")]
    CycleDetected { nodes: Vec<String> },

    #[error("Cannot embed workflow '{child}' into '{parent}': it already contains '{parent}'")]
    CyclicEmbedding { parent: String, child: String },

    #[error("Primitive node '{0}' declares no ports")]
    EmptyPortSet(String),

    #[error("Node '{node_id}' declares {direction} port '{port}' more than once")]
    DuplicatePort {
        node_id: String,
        port: String,
        direction: PortDirection,
    },

    #[error("Invalid node id '{id}': {reason}")]
    InvalidNodeId { id: String, reason: String },

    #[error("Invalid port path '{0}': expected '<node>.<port>'")]
    InvalidPortPath(String),

    #[error("Interface '{0}' is not registered")]
    UnknownInterface(String),
}

impl GraphError {
    /// The node the error is about, when there is exactly one.
    pub fn node_id(&self) -> Option<&str> {
        match self {
            GraphError::DuplicateNode(id) => Some(id.as_str()),
            GraphError::UnknownNode(id) | GraphError::EmptyPortSet(id) => Some(id),
            GraphError::UnknownPort { node_id, .. }
            | GraphError::PortDirectionMismatch { node_id, .. }
            | GraphError::PortAlreadyBound { node_id, .. }
            | GraphError::DuplicatePort { node_id, .. } => Some(node_id),
            _ => None,
        }
    }
}

/// Errors from deriving a workflow name out of an input path.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NamingError {
    #[error("Malformed filename '{path}': {reason}")]
    MalformedFilename { path: String, reason: String },
}

/// Errors while loading a [`BuildConfig`](crate::core::config::BuildConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Errors found by the post-assembly validation pipeline.
///
/// Node references are dotted paths from the validated workflow, so an
/// error inside an embedded workflow reads `dwi_reference_wf.extract_b0`.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("Missing required input '{port}' on node {node_path}")]
    MissingRequiredInput { node_path: String, port: String },

    #[error("Workflow contains a cycle through: {nodes:?}")]
    CycleDetected { nodes: Vec<String> },

    #[error("{0}")]
    Other(String),
}

impl ValidationError {
    /// Check if this is a fatal error that should stop validation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ValidationError::CycleDetected { .. })
    }

    /// Get suggestion for fixing this error.
    pub fn suggested_fix(&self) -> Option<String> {
        match self {
            ValidationError::MissingRequiredInput { port, .. } => Some(format!(
                "Connect an output to '{}' or assign it a value",
                port
            )),
            ValidationError::CycleDetected { .. } => {
                Some("Remove one of the connections between the listed nodes".to_string())
            }
            ValidationError::Other(_) => None,
        }
    }

    /// Get list of affected node paths.
    pub fn affected_nodes(&self) -> Vec<String> {
        match self {
            ValidationError::MissingRequiredInput { node_path, .. } => vec![node_path.clone()],
            ValidationError::CycleDetected { nodes } => nodes.clone(),
            ValidationError::Other(_) => vec![],
        }
    }

    /// Re-anchor node paths under an embedding node.
    pub fn prefixed(self, prefix: &str) -> Self {
        match self {
            ValidationError::MissingRequiredInput { node_path, port } => {
                ValidationError::MissingRequiredInput {
                    node_path: format!("{}.{}", prefix, node_path),
                    port,
                }
            }
            ValidationError::CycleDetected { nodes } => ValidationError::CycleDetected {
                nodes: nodes
                    .into_iter()
                    .map(|n| format!("{}.{}", prefix, n))
                    .collect(),
            },
            other => other,
        }
    }
}

/// Result type alias for dwiflow operations.
pub type DwiflowResult<T> = Result<T, DwiflowError>;

/// Result type alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Result type alias for name derivation.
pub type NamingResult<T> = Result<T, NamingError>;

// ============================================================================
// Validation Report
// ============================================================================

/// Comprehensive validation report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether validation passed without errors.
    pub success: bool,
    /// List of errors found.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<ValidationWarning>,
    /// Time taken for validation in milliseconds.
    pub duration_ms: u64,
}

/// Non-fatal validation warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    /// Warning message.
    pub message: String,
    /// Node path that triggered the warning, if applicable.
    pub node_path: Option<String>,
    /// Suggestion for addressing the warning.
    pub suggestion: Option<String>,
}

impl ValidationWarning {
    /// Re-anchor the node path under an embedding node.
    pub fn prefixed(mut self, prefix: &str) -> Self {
        self.node_path = Some(match self.node_path {
            Some(path) => format!("{}.{}", prefix, path),
            None => prefix.to_string(),
        });
        self
    }
}

impl ValidationReport {
    /// Create a new empty report (success).
    pub fn new() -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Add an error to the report.
    pub fn add_error(&mut self, error: ValidationError) {
        self.success = false;
        self.errors.push(error);
    }

    /// Add a warning to the report.
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Check if the workflow can be handed to an execution engine.
    pub fn can_execute(&self) -> bool {
        self.success
    }

    /// Get a human-readable summary.
    pub fn summary(&self) -> String {
        if self.success {
            if self.warnings.is_empty() {
                "Workflow is valid".to_string()
            } else {
                format!("Workflow is valid with {} warning(s)", self.warnings.len())
            }
        } else {
            format!("Validation failed with {} error(s)", self.errors.len())
        }
    }

    /// Get detailed error messages with suggestions.
    pub fn detailed_errors(&self) -> Vec<String> {
        self.errors
            .iter()
            .enumerate()
            .map(|(i, error)| {
                let mut msg = format!("{}. {}", i + 1, error);
                if let Some(fix) = error.suggested_fix() {
                    msg.push_str(&format!("\n   -> Suggestion: {}", fix));
                }
                msg
            })
            .collect()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}
