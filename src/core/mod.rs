//! Core types and traits for dwiflow.
//!
//! This module contains the foundational types of the graph builder:
//! - Literal values assigned to node fields
//! - Port definitions
//! - The node interface trait and its metadata
//! - Error types
//! - Build configuration

pub mod types;
pub mod port;
pub mod error;
pub mod node;
pub mod config;

// Re-export commonly used types
pub use types::Value;
pub use port::{PortDefinition, PortDirection, PortHandle};
pub use error::{DwiflowError, GraphError, NamingError, ValidationError};
pub use node::{Category, InterfaceMetadata, NodeInterface};
pub use config::BuildConfig;
