//! Input report decoding
//!
//! Converts a fixed-layout raw report buffer into a [`PadState`]. Decoding is
//! stateless and total: on a buffer of the correct length every bit pattern
//! maps to a defined value. The only failure mode is a wrong-length buffer,
//! which is a transport contract violation and surfaced as an error instead
//! of being silently dropped.

use crate::gamepad::constants::*;
use crate::gamepad::types::{Buttons, DpadDirection, PadState, Stick};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected report length: got {actual} bytes, expected {expected}")]
    UnexpectedLength { expected: usize, actual: usize },
}

/// Decode one raw input report into a controller state snapshot.
///
/// The buffer must be exactly [`REPORT_LEN`] bytes; the caller (the
/// acquisition loop) is responsible for treating a violation as fatal.
pub fn decode_report(raw: &[u8]) -> Result<PadState, DecodeError> {
    if raw.len() != REPORT_LEN {
        return Err(DecodeError::UnexpectedLength {
            expected: REPORT_LEN,
            actual: raw.len(),
        });
    }

    let mask = u16::from_le_bytes([raw[OFFSET_BUTTONS], raw[OFFSET_BUTTONS + 1]]);

    Ok(PadState {
        left_stick: Stick {
            x: axis(raw[OFFSET_LEFT_X]),
            y: axis(raw[OFFSET_LEFT_Y]),
        },
        right_stick: Stick {
            x: axis(raw[OFFSET_RIGHT_X]),
            y: axis(raw[OFFSET_RIGHT_Y]),
        },
        left_trigger: trigger(raw[OFFSET_LEFT_TRIGGER]),
        right_trigger: trigger(raw[OFFSET_RIGHT_TRIGGER]),
        buttons: Buttons::from_mask(mask),
        dpad: DpadDirection::from_nibble(raw[OFFSET_DPAD] & DPAD_NIBBLE_MASK),
    })
}

/// Encode a state back into a raw report (inverse of [`decode_report`]).
///
/// Used to build synthetic fixtures; for every decodable state the
/// round-trip through `decode_report` is exact.
pub fn encode_report(state: &PadState) -> [u8; REPORT_LEN] {
    let mut raw = [0u8; REPORT_LEN];
    raw[OFFSET_DPAD] = state.dpad.code();

    let mask = state.buttons.to_mask().to_le_bytes();
    raw[OFFSET_BUTTONS] = mask[0];
    raw[OFFSET_BUTTONS + 1] = mask[1];

    raw[OFFSET_LEFT_TRIGGER] = trigger_byte(state.left_trigger);
    raw[OFFSET_RIGHT_TRIGGER] = trigger_byte(state.right_trigger);
    raw[OFFSET_LEFT_X] = axis_byte(state.left_stick.x);
    raw[OFFSET_LEFT_Y] = axis_byte(state.left_stick.y);
    raw[OFFSET_RIGHT_X] = axis_byte(state.right_stick.x);
    raw[OFFSET_RIGHT_Y] = axis_byte(state.right_stick.y);
    raw
}

/// Rescale an unsigned axis byte to -1.0..1.0 with 0x80 at exactly 0.0
fn axis(byte: u8) -> f32 {
    byte as f32 / 128.0 - 1.0
}

/// Rescale a trigger byte to 0.0..1.0 with 0x00 at exactly 0.0
fn trigger(byte: u8) -> f32 {
    byte as f32 / 255.0
}

fn axis_byte(value: f32) -> u8 {
    ((value + 1.0) * 128.0).round().clamp(0.0, 255.0) as u8
}

fn trigger_byte(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}
