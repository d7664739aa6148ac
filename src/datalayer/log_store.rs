//! Logging store binding
//!
//! Default binding for the binary: accepts every registration and write and
//! logs them instead of talking to a real provider runtime. A real data
//! layer plugs in by implementing [`NodeStore`](crate::datalayer::NodeStore)
//! in its place.

use crate::datalayer::{NodeStore, NodeValue, StoreError};
use log::{debug, info};

/// Store binding that logs node traffic.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingNodeStore;

impl NodeStore for LoggingNodeStore {
    fn register_node(&mut self, path: &str, initial: NodeValue) -> Result<(), StoreError> {
        info!("[store] registered {} ({}) = {:?}", path, initial.kind(), initial);
        Ok(())
    }

    fn set_value(&mut self, path: &str, value: NodeValue) -> Result<(), StoreError> {
        debug!("[store] {} = {:?}", path, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_store_accepts_everything() {
        let mut store = LoggingNodeStore;
        assert!(store
            .register_node("gamepad/buttons/A", NodeValue::Bool(false))
            .is_ok());
        assert!(store
            .set_value("gamepad/leftStick/x", NodeValue::Float(0.25))
            .is_ok());
        assert!(store.set_value("gamepad/dpad", NodeValue::Int(8)).is_ok());
    }
}
