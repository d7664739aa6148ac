//! Change detection between controller state snapshots
//!
//! The differ compares two decoded snapshots field by field and yields the
//! identifiers of the fields that changed. Comparison is exact: rescaling in
//! the decoder is deterministic arithmetic, so identical raw input always
//! produces identical values and no epsilon is needed.

use crate::gamepad::types::{Button, PadState};

/// Identifier for one publishable controller field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    LeftStickX,
    LeftStickY,
    RightStickX,
    RightStickY,
    LeftTrigger,
    RightTrigger,
    Dpad,
    Button(Button),
}

impl Field {
    /// Every field, in canonical publish order
    pub const ALL: [Field; 20] = [
        Field::LeftStickX,
        Field::LeftStickY,
        Field::RightStickX,
        Field::RightStickY,
        Field::LeftTrigger,
        Field::RightTrigger,
        Field::Dpad,
        Field::Button(Button::A),
        Field::Button(Button::B),
        Field::Button(Button::X),
        Field::Button(Button::Y),
        Field::Button(Button::L1),
        Field::Button(Button::R1),
        Field::Button(Button::L2),
        Field::Button(Button::R2),
        Field::Button(Button::Back),
        Field::Button(Button::Start),
        Field::Button(Button::L3),
        Field::Button(Button::R3),
        Field::Button(Button::Logitech),
    ];
}

/// Compare a new snapshot against the last published one.
///
/// Returns the changed field identifiers in canonical order. With no
/// previous state every field is reported changed, forcing the initial
/// full publish.
pub fn diff(previous: Option<&PadState>, current: &PadState) -> Vec<Field> {
    let previous = match previous {
        Some(state) => state,
        None => return Field::ALL.to_vec(),
    };

    Field::ALL
        .into_iter()
        .filter(|field| !unchanged(*field, previous, current))
        .collect()
}

fn unchanged(field: Field, a: &PadState, b: &PadState) -> bool {
    match field {
        Field::LeftStickX => a.left_stick.x == b.left_stick.x,
        Field::LeftStickY => a.left_stick.y == b.left_stick.y,
        Field::RightStickX => a.right_stick.x == b.right_stick.x,
        Field::RightStickY => a.right_stick.y == b.right_stick.y,
        Field::LeftTrigger => a.left_trigger == b.left_trigger,
        Field::RightTrigger => a.right_trigger == b.right_trigger,
        Field::Dpad => a.dpad == b.dpad,
        Field::Button(button) => a.buttons.pressed(button) == b.buttons.pressed(button),
    }
}
