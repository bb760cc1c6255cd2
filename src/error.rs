//! # Error Taxonomy
//!
//! Failure cases surfaced by container operations. Everything here is a
//! recoverable condition: callers (tools, command handlers) decide whether
//! to retry or abandon, and no operation leaves partial state behind when it
//! returns an error.

use thiserror::Error;

/// Errors produced by the container manager and its collaborators
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContainerError {
    /// Operation invoked on an object that is not a container
    #[error("object {0} is not a container")]
    InvalidContainer(u64),

    /// Operation referenced an object id that is not in the registry
    #[error("object {0} does not exist")]
    MissingObject(u64),

    /// Object or parent has no live transform node in the scene graph
    #[error("missing transform node")]
    MissingTransformNode,

    /// Reparent would make a container its own ancestor
    #[error("reparent rejected: would create a cycle")]
    CyclicParentRejected,

    /// Fit or grouping requested over zero objects
    #[error("operation requires a non-empty set of objects")]
    EmptyChildSet,

    /// Nesting a container would exceed the supported depth
    #[error("nesting depth {depth} exceeds maximum {max}")]
    MaxNestingDepthExceeded { depth: usize, max: usize },
}
