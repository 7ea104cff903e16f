//! Interfaces of primitive processing steps and their registry.

pub mod builtin;
pub mod registry;

pub use registry::{InterfaceFactory, InterfaceRegistry, RegistryEntry};
