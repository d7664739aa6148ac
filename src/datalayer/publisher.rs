//! Node publisher adapter
//!
//! Owns the store binding and the static mapping table, registers every
//! node once at startup, and writes changed fields as typed values. A
//! failing node never aborts the rest of a cycle: all per-node failures are
//! collected into a single aggregate error.

use crate::datalayer::nodes::{self, NodeBinding};
use crate::datalayer::{NodeStore, NodeValue, StoreError};
use crate::gamepad::diff::Field;
use crate::gamepad::types::PadState;
use log::{debug, info, warn};
use thiserror::Error;

/// Aggregate of the per-node failures from one publish cycle
#[derive(Debug, Error)]
#[error("failed to publish {} node(s): {}", .failures.len(), .failures.iter().map(|(path, _)| path.as_str()).collect::<Vec<_>>().join(", "))]
pub struct PublishError {
    pub failures: Vec<(String, StoreError)>,
}

/// Maps controller fields to data-layer nodes and performs the writes.
pub struct NodePublisher<S: NodeStore> {
    store: S,
    bindings: Vec<NodeBinding>,
    connected_path: String,
}

impl<S: NodeStore> NodePublisher<S> {
    /// Build the mapping table for `root` (done once, at startup).
    pub fn new(store: S, root: &str) -> Self {
        Self {
            store,
            bindings: nodes::bindings(root),
            connected_path: nodes::connected_path(root),
        }
    }

    /// Register every node with its initial value.
    ///
    /// A rejection here is fatal to startup: a missing node would make the
    /// bridge silently incomplete for its whole lifetime.
    pub fn register_all(&mut self, initial: &PadState) -> Result<(), StoreError> {
        self.store
            .register_node(&self.connected_path, NodeValue::Bool(false))?;
        for binding in &self.bindings {
            let value = nodes::field_value(binding.field, initial);
            debug!("registering node {} ({})", binding.path, value.kind());
            self.store.register_node(&binding.path, value)?;
        }
        info!("registered {} data-layer nodes", self.bindings.len() + 1);
        Ok(())
    }

    /// Write the given changed fields from `state`.
    ///
    /// Every field is attempted; failures are logged, collected, and
    /// returned as one aggregate error for the cycle.
    pub fn publish(&mut self, changed: &[Field], state: &PadState) -> Result<(), PublishError> {
        let mut failures = Vec::new();

        for field in changed {
            if let Some(binding) = self.bindings.iter().find(|b| b.field == *field) {
                let value = nodes::field_value(*field, state);
                if let Err(e) = self.store.set_value(&binding.path, value) {
                    warn!("node write failed for {}: {}", binding.path, e);
                    failures.push((binding.path.clone(), e));
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(PublishError { failures })
        }
    }

    /// Update the device-presence node.
    pub fn set_connected(&mut self, connected: bool) -> Result<(), StoreError> {
        self.store
            .set_value(&self.connected_path, NodeValue::Bool(connected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datalayer::mock_store::MockNodeStore;
    use crate::gamepad::types::Button;

    #[test]
    fn register_all_covers_every_field_and_the_presence_node() {
        let store = MockNodeStore::new();
        let mut publisher = NodePublisher::new(store.clone(), "gamepad");

        publisher.register_all(&PadState::default()).unwrap();

        let registered = store.registered();
        assert_eq!(registered.len(), Field::ALL.len() + 1);
        assert_eq!(
            registered[0],
            ("gamepad/connected".to_string(), NodeValue::Bool(false))
        );
        assert!(registered
            .iter()
            .any(|(path, _)| path == "gamepad/buttons/Logitech"));
    }

    #[test]
    fn publish_writes_only_the_changed_fields() {
        let store = MockNodeStore::new();
        let mut publisher = NodePublisher::new(store.clone(), "gamepad");

        let mut state = PadState::default();
        state.left_trigger = 0.5;
        state.buttons.a = true;

        publisher
            .publish(&[Field::LeftTrigger, Field::Button(Button::A)], &state)
            .unwrap();

        assert_eq!(
            store.writes(),
            vec![
                ("gamepad/trigger/left".to_string(), NodeValue::Float(0.5)),
                ("gamepad/buttons/A".to_string(), NodeValue::Bool(true)),
            ]
        );
    }

    #[test]
    fn one_failing_node_does_not_stop_the_rest_of_the_cycle() {
        let store = MockNodeStore::new();
        store.fail_path("gamepad/buttons/A");
        let mut publisher = NodePublisher::new(store.clone(), "gamepad");

        let mut state = PadState::default();
        state.buttons.a = true;
        state.buttons.b = true;
        state.right_stick.x = 1.0;

        let err = publisher
            .publish(
                &[
                    Field::Button(Button::A),
                    Field::Button(Button::B),
                    Field::RightStickX,
                ],
                &state,
            )
            .unwrap_err();

        // The healthy nodes were still written, in order
        assert_eq!(
            store.writes(),
            vec![
                ("gamepad/buttons/B".to_string(), NodeValue::Bool(true)),
                ("gamepad/rightStick/x".to_string(), NodeValue::Float(1.0)),
            ]
        );

        // And the aggregate error names the failed node
        assert_eq!(err.failures.len(), 1);
        assert_eq!(err.failures[0].0, "gamepad/buttons/A");
        assert!(err.to_string().contains("gamepad/buttons/A"));
    }

    #[test]
    fn set_connected_writes_the_presence_node() {
        let store = MockNodeStore::new();
        let mut publisher = NodePublisher::new(store.clone(), "gamepad");

        publisher.set_connected(true).unwrap();
        publisher.set_connected(false).unwrap();

        assert_eq!(
            store.writes(),
            vec![
                ("gamepad/connected".to_string(), NodeValue::Bool(true)),
                ("gamepad/connected".to_string(), NodeValue::Bool(false)),
            ]
        );
    }
}
