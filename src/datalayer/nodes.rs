//! Static field-to-node mapping
//!
//! Every publishable controller field has a fixed node path under a
//! configurable root and a fixed value kind. The table is explicit and
//! built once at startup so the mapping is auditable and testable without
//! a store.

use crate::datalayer::NodeValue;
use crate::gamepad::diff::Field;
use crate::gamepad::types::PadState;

/// One (field, node path) entry of the mapping table
#[derive(Debug, Clone)]
pub struct NodeBinding {
    pub field: Field,
    pub path: String,
}

/// Build the full mapping table for a root, in canonical field order.
pub fn bindings(root: &str) -> Vec<NodeBinding> {
    Field::ALL
        .into_iter()
        .map(|field| NodeBinding {
            field,
            path: node_path(root, field),
        })
        .collect()
}

/// Node path for a single field under `root`.
pub fn node_path(root: &str, field: Field) -> String {
    match field {
        Field::LeftStickX => format!("{root}/leftStick/x"),
        Field::LeftStickY => format!("{root}/leftStick/y"),
        Field::RightStickX => format!("{root}/rightStick/x"),
        Field::RightStickY => format!("{root}/rightStick/y"),
        Field::LeftTrigger => format!("{root}/trigger/left"),
        Field::RightTrigger => format!("{root}/trigger/right"),
        Field::Dpad => format!("{root}/dpad"),
        Field::Button(button) => format!("{root}/buttons/{}", button.name()),
    }
}

/// Path of the device-presence node.
pub fn connected_path(root: &str) -> String {
    format!("{root}/connected")
}

/// Extract a field's typed value from a state snapshot.
pub fn field_value(field: Field, state: &PadState) -> NodeValue {
    match field {
        Field::LeftStickX => NodeValue::Float(state.left_stick.x),
        Field::LeftStickY => NodeValue::Float(state.left_stick.y),
        Field::RightStickX => NodeValue::Float(state.right_stick.x),
        Field::RightStickY => NodeValue::Float(state.right_stick.y),
        Field::LeftTrigger => NodeValue::Float(state.left_trigger),
        Field::RightTrigger => NodeValue::Float(state.right_trigger),
        Field::Dpad => NodeValue::Int(state.dpad.code() as i64),
        Field::Button(button) => NodeValue::Bool(state.buttons.pressed(button)),
    }
}
