//! Recording store binding for tests
//!
//! Records every registration and write so scenario tests can assert on the
//! exact node traffic, and can be told to reject writes for specific paths
//! to exercise the partial-failure contract.

use crate::datalayer::{NodeStore, NodeValue, StoreError};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Recorded {
    registered: Vec<(String, NodeValue)>,
    writes: Vec<(String, NodeValue)>,
    fail_paths: HashSet<String>,
}

/// Store binding that records calls. Clones share the same recording, so a
/// test can keep a handle while the publisher owns another.
#[derive(Clone, Default)]
pub struct MockNodeStore {
    inner: Arc<Mutex<Recorded>>,
}

impl MockNodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject all future writes to `path`.
    pub fn fail_path(&self, path: &str) {
        self.inner.lock().unwrap().fail_paths.insert(path.to_string());
    }

    /// Every registration so far, in order.
    pub fn registered(&self) -> Vec<(String, NodeValue)> {
        self.inner.lock().unwrap().registered.clone()
    }

    /// Every successful write so far, in order.
    pub fn writes(&self) -> Vec<(String, NodeValue)> {
        self.inner.lock().unwrap().writes.clone()
    }

    /// Successful writes to a single path, in order.
    pub fn writes_for(&self, path: &str) -> Vec<NodeValue> {
        self.inner
            .lock()
            .unwrap()
            .writes
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, value)| *value)
            .collect()
    }
}

impl NodeStore for MockNodeStore {
    fn register_node(&mut self, path: &str, initial: NodeValue) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_paths.contains(path) {
            return Err(StoreError::Register(format!(
                "injected failure for {path}"
            )));
        }
        inner.registered.push((path.to_string(), initial));
        Ok(())
    }

    fn set_value(&mut self, path: &str, value: NodeValue) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_paths.contains(path) {
            return Err(StoreError::Write(format!("injected failure for {path}")));
        }
        inner.writes.push((path.to_string(), value));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_recording() {
        let store = MockNodeStore::new();
        let mut handle = store.clone();

        handle
            .register_node("gamepad/dpad", NodeValue::Int(8))
            .unwrap();
        handle.set_value("gamepad/dpad", NodeValue::Int(2)).unwrap();

        assert_eq!(store.registered().len(), 1);
        assert_eq!(store.writes_for("gamepad/dpad"), vec![NodeValue::Int(2)]);
    }

    #[test]
    fn failing_paths_reject_writes_but_leave_others_alone() {
        let store = MockNodeStore::new();
        store.fail_path("gamepad/buttons/A");
        let mut handle = store.clone();

        assert!(handle
            .set_value("gamepad/buttons/A", NodeValue::Bool(true))
            .is_err());
        assert!(handle
            .set_value("gamepad/buttons/B", NodeValue::Bool(true))
            .is_ok());
        assert_eq!(store.writes().len(), 1);
    }
}
