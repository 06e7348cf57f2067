//! Input Snapshots
//!
//! Per-tick input captured by the frontend and handed to the simulation as
//! plain values. Entity logic never polls a device: it reads a
//! [`PlayerIntent`] derived from the frame.
//!
//! Button state is packed into flag bytes the same way for both schemes.

use serde::{Serialize, Deserialize};

use crate::config::GamepadBindings;
use crate::core::tuning::{MOVE_DEADZONE, STICK_JUMP_THRESHOLD, TRIGGER_THRESHOLD};
use crate::core::vec2::Vec2;

// =============================================================================
// MOUSE + KEYBOARD
// =============================================================================

/// Mouse and keyboard state for a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MouseFrame {
    /// Pointer position in arena coordinates
    pub pointer: Vec2,

    /// Held keys / buttons (packed bits):
    /// - Bit 0: move left
    /// - Bit 1: move right
    /// - Bit 2: jump
    /// - Bit 3: fire (left mouse button)
    /// - Bit 4: reload
    /// - Bit 5: shield
    /// - Bit 6: latch
    pub flags: u8,
}

impl MouseFrame {
    /// Move left flag bit
    pub const FLAG_LEFT: u8 = 0x01;
    /// Move right flag bit
    pub const FLAG_RIGHT: u8 = 0x02;
    /// Jump flag bit
    pub const FLAG_JUMP: u8 = 0x04;
    /// Fire flag bit
    pub const FLAG_FIRE: u8 = 0x08;
    /// Reload flag bit
    pub const FLAG_RELOAD: u8 = 0x10;
    /// Shield flag bit
    pub const FLAG_SHIELD: u8 = 0x20;
    /// Latch flag bit
    pub const FLAG_LATCH: u8 = 0x40;

    /// Create a frame with the pointer at `pointer` and nothing held.
    pub const fn new(pointer: Vec2) -> Self {
        Self { pointer, flags: 0 }
    }

    /// Builder: mark `flag` as held.
    pub const fn with(mut self, flag: u8) -> Self {
        self.flags |= flag;
        self
    }

    /// Check if `flag` is held this frame.
    #[inline]
    pub fn held(&self, flag: u8) -> bool {
        self.flags & flag != 0
    }
}

// =============================================================================
// GAMEPAD
// =============================================================================

/// Raw device state as reported by the input backend.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawGamepadState {
    /// Axis values in [-1, 1]
    pub axes: Vec<f32>,
    /// Button pressed states
    pub buttons: Vec<bool>,
}

/// Gamepad state for a single frame, already mapped through bindings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GamepadFrame {
    /// Movement stick
    pub move_stick: Vec2,
    /// Aim stick
    pub aim_stick: Vec2,
    /// Fire trigger axis
    pub fire_trigger: f32,
    /// Latch trigger axis
    pub latch_trigger: f32,
    /// Buttons (packed bits):
    /// - Bit 0: jump
    /// - Bit 1: reload
    /// - Bit 2: shield
    pub buttons: u8,
}

impl GamepadFrame {
    /// Jump button bit
    pub const BUTTON_JUMP: u8 = 0x01;
    /// Reload button bit
    pub const BUTTON_RELOAD: u8 = 0x02;
    /// Shield button bit
    pub const BUTTON_SHIELD: u8 = 0x04;

    /// Map raw device state through `bindings`.
    ///
    /// Missing axes read as 0.0 and missing buttons as released, so a
    /// binding that points past the device's range is harmless.
    pub fn from_raw(raw: &RawGamepadState, bindings: &GamepadBindings) -> Self {
        let axis = |i: usize| raw.axes.get(i).copied().unwrap_or(0.0);
        let button = |i: usize| raw.buttons.get(i).copied().unwrap_or(false);

        let mut buttons = 0;
        if button(bindings.jump_button) {
            buttons |= Self::BUTTON_JUMP;
        }
        if button(bindings.reload_button) {
            buttons |= Self::BUTTON_RELOAD;
        }
        if bindings.shield_buttons.iter().any(|&b| button(b)) {
            buttons |= Self::BUTTON_SHIELD;
        }

        Self {
            move_stick: Vec2::new(axis(bindings.move_x_axis), axis(bindings.move_y_axis)),
            aim_stick: Vec2::new(axis(bindings.aim_x_axis), axis(bindings.aim_y_axis)),
            fire_trigger: axis(bindings.fire_axis),
            latch_trigger: axis(bindings.latch_axis),
            buttons,
        }
    }

    /// Builder: mark `button` as pressed.
    pub const fn with(mut self, button: u8) -> Self {
        self.buttons |= button;
        self
    }

    /// Check if `button` is pressed this frame.
    #[inline]
    pub fn pressed(&self, button: u8) -> bool {
        self.buttons & button != 0
    }
}

// =============================================================================
// NORMALIZED INTENT
// =============================================================================

/// One frame of input for one player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum InputFrame {
    /// Nothing held (device missing or player idle)
    #[default]
    Idle,
    /// Mouse and keyboard
    Mouse(MouseFrame),
    /// Gamepad
    Gamepad(GamepadFrame),
}

/// Aim source for the frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum AimInput {
    /// No aim input; keep the previous angle
    #[default]
    Hold,
    /// Aim at an arena point
    Pointer(Vec2),
    /// Aim along a stick vector
    Stick(Vec2),
}

/// Control-scheme independent view of a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerIntent {
    /// Horizontal movement in [-1, 1], deadzone applied
    pub move_axis: f32,
    /// Jump requested
    pub jump: bool,
    /// Fire held
    pub fire: bool,
    /// Reload requested
    pub reload: bool,
    /// Shield requested
    pub shield: bool,
    /// Latch held
    pub latch: bool,
    /// Aim source
    pub aim: AimInput,
}

impl InputFrame {
    /// Derive the scheme-independent intent.
    pub fn intent(&self) -> PlayerIntent {
        match self {
            InputFrame::Idle => PlayerIntent::default(),
            InputFrame::Mouse(frame) => {
                let mut move_axis = 0.0;
                if frame.held(MouseFrame::FLAG_LEFT) {
                    move_axis -= 1.0;
                }
                if frame.held(MouseFrame::FLAG_RIGHT) {
                    move_axis += 1.0;
                }
                PlayerIntent {
                    move_axis,
                    jump: frame.held(MouseFrame::FLAG_JUMP),
                    fire: frame.held(MouseFrame::FLAG_FIRE),
                    reload: frame.held(MouseFrame::FLAG_RELOAD),
                    shield: frame.held(MouseFrame::FLAG_SHIELD),
                    latch: frame.held(MouseFrame::FLAG_LATCH),
                    aim: AimInput::Pointer(frame.pointer),
                }
            }
            InputFrame::Gamepad(frame) => {
                let raw_x = frame.move_stick.x;
                let move_axis = if raw_x.abs() < MOVE_DEADZONE { 0.0 } else { raw_x };
                PlayerIntent {
                    move_axis,
                    jump: frame.pressed(GamepadFrame::BUTTON_JUMP)
                        || frame.move_stick.y < STICK_JUMP_THRESHOLD,
                    fire: frame.fire_trigger > TRIGGER_THRESHOLD,
                    reload: frame.pressed(GamepadFrame::BUTTON_RELOAD),
                    shield: frame.pressed(GamepadFrame::BUTTON_SHIELD),
                    latch: frame.latch_trigger > TRIGGER_THRESHOLD,
                    aim: AimInput::Stick(frame.aim_stick),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_intent() {
        let frame = MouseFrame::new(Vec2::new(300.0, 200.0))
            .with(MouseFrame::FLAG_RIGHT)
            .with(MouseFrame::FLAG_FIRE);
        let intent = InputFrame::Mouse(frame).intent();

        assert_eq!(intent.move_axis, 1.0);
        assert!(intent.fire);
        assert!(!intent.jump);
        assert_eq!(intent.aim, AimInput::Pointer(Vec2::new(300.0, 200.0)));

        // Both directions cancel out
        let both = frame.with(MouseFrame::FLAG_LEFT);
        assert_eq!(InputFrame::Mouse(both).intent().move_axis, 0.0);
    }

    #[test]
    fn test_gamepad_movement_deadzone() {
        let drift = GamepadFrame {
            move_stick: Vec2::new(0.05, -0.09),
            ..Default::default()
        };
        assert_eq!(InputFrame::Gamepad(drift).intent().move_axis, 0.0);

        let push = GamepadFrame {
            move_stick: Vec2::new(-0.6, 0.0),
            ..Default::default()
        };
        assert_eq!(InputFrame::Gamepad(push).intent().move_axis, -0.6);
    }

    #[test]
    fn test_gamepad_triggers_and_stick_jump() {
        let frame = GamepadFrame {
            move_stick: Vec2::new(0.0, -0.9),
            fire_trigger: 0.7,
            latch_trigger: 0.2,
            ..Default::default()
        };
        let intent = InputFrame::Gamepad(frame).intent();
        assert!(intent.jump, "stick pushed up is a jump");
        assert!(intent.fire);
        assert!(!intent.latch);
    }

    #[test]
    fn test_from_raw_bindings() {
        let bindings = GamepadBindings::default();
        let mut raw = RawGamepadState {
            axes: vec![0.5, 0.0, 1.0, 0.0, 0.9, -1.0],
            buttons: vec![false; 12],
        };
        raw.buttons[10] = true;
        raw.buttons[2] = true;

        let frame = GamepadFrame::from_raw(&raw, &bindings);
        assert_eq!(frame.move_stick, Vec2::new(0.5, 0.0));
        assert_eq!(frame.aim_stick, Vec2::new(1.0, 0.0));
        assert_eq!(frame.latch_trigger, 0.9);
        assert!(frame.pressed(GamepadFrame::BUTTON_SHIELD));
        assert!(frame.pressed(GamepadFrame::BUTTON_RELOAD));
        assert!(!frame.pressed(GamepadFrame::BUTTON_JUMP));
    }

    #[test]
    fn test_from_raw_short_device() {
        let raw = RawGamepadState { axes: vec![0.3], buttons: vec![] };
        let frame = GamepadFrame::from_raw(&raw, &GamepadBindings::default());
        assert_eq!(frame.move_stick, Vec2::new(0.3, 0.0));
        assert_eq!(frame.buttons, 0);
    }

    #[test]
    fn test_idle_intent() {
        let intent = InputFrame::Idle.intent();
        assert_eq!(intent.move_axis, 0.0);
        assert_eq!(intent.aim, AimInput::Hold);
    }
}
