//! Data-layer boundary
//!
//! The bridge's only observable output besides logs: named, typed nodes in
//! an external data store. The store runtime itself is a collaborator behind
//! the [`NodeStore`] trait; this module defines that boundary plus the
//! node mapping, the publisher adapter, and two store bindings (a logging
//! one for the binary, a recording one for tests).

pub mod nodes;
pub mod publisher;
pub mod log_store;
pub mod mock_store;

pub use log_store::LoggingNodeStore;
pub use mock_store::MockNodeStore;
pub use nodes::{connected_path, field_value, node_path, NodeBinding};
pub use publisher::{NodePublisher, PublishError};

use thiserror::Error;

/// Value carried across the store boundary.
///
/// One tagged variant per node kind keeps the publisher to a single
/// codepath instead of per-type node classes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeValue {
    Bool(bool),
    Int(i64),
    Float(f32),
}

impl NodeValue {
    /// Wire-kind label, used in registration logs
    pub fn kind(&self) -> &'static str {
        match self {
            NodeValue::Bool(_) => "bool8",
            NodeValue::Int(_) => "int64",
            NodeValue::Float(_) => "float32",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("node registration rejected: {0}")]
    Register(String),

    #[error("node write rejected: {0}")]
    Write(String),
}

/// The consumed store primitives: register a node once at startup, then
/// mutate its value on change.
pub trait NodeStore {
    fn register_node(&mut self, path: &str, initial: NodeValue) -> Result<(), StoreError>;

    fn set_value(&mut self, path: &str, value: NodeValue) -> Result<(), StoreError>;
}
