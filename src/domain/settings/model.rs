//! Operator configuration model

use crate::domain::binding::Binding;
use crate::domain::shared::error::DomainError;
use crate::domain::shared::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Keyboard key names per drone control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyboardBindings {
    pub move_forward: String,
    pub move_backward: String,
    pub move_left: String,
    pub move_right: String,
    pub move_up: String,
    pub move_down: String,
    pub yaw_left: String,
    pub yaw_right: String,
    pub pitch_up: String,
    pub pitch_down: String,
    pub roll_left: String,
    pub roll_right: String,
}

impl Default for KeyboardBindings {
    fn default() -> Self {
        Self {
            move_forward: "W".to_string(),
            move_backward: "S".to_string(),
            move_left: "A".to_string(),
            move_right: "D".to_string(),
            move_up: "Space".to_string(),
            move_down: "LShift".to_string(),
            pitch_up: "I".to_string(),
            pitch_down: "K".to_string(),
            yaw_left: "J".to_string(),
            yaw_right: "L".to_string(),
            roll_left: "Q".to_string(),
            roll_right: "E".to_string(),
        }
    }
}

/// Grouped controller input driving a two-axis control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ControlSource {
    LeftStick,
    RightStick,
    DPad,
    FaceButtons,
}

/// Controller bindings: stick-style controls take a [`ControlSource`],
/// button controls a logical button id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamepadBindings {
    pub move_horizontal: ControlSource,
    pub move_up: u16,
    pub move_down: u16,
    pub pitch_yaw: ControlSource,
    pub roll_left: u16,
    pub roll_right: u16,
}

impl Default for GamepadBindings {
    fn default() -> Self {
        Self {
            move_horizontal: ControlSource::LeftStick,
            move_up: 9,
            move_down: 10,
            pitch_yaw: ControlSource::RightStick,
            roll_left: 7,
            roll_right: 8,
        }
    }
}

/// One bindable field of [`GamepadBindings`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GamepadField {
    MoveHorizontal,
    MoveUp,
    MoveDown,
    PitchYaw,
    RollLeft,
    RollRight,
}

impl GamepadField {
    /// Stick-style fields capture grouped inputs rather than single buttons
    pub fn is_joystick(&self) -> bool {
        matches!(self, GamepadField::MoveHorizontal | GamepadField::PitchYaw)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GamepadField::MoveHorizontal => "moveHorizontal",
            GamepadField::MoveUp => "moveUp",
            GamepadField::MoveDown => "moveDown",
            GamepadField::PitchYaw => "pitchYaw",
            GamepadField::RollLeft => "rollLeft",
            GamepadField::RollRight => "rollRight",
        }
    }

    /// Current value of this field as a binding
    pub fn get(&self, bindings: &GamepadBindings) -> Binding {
        match self {
            GamepadField::MoveHorizontal => bindings.move_horizontal.into(),
            GamepadField::PitchYaw => bindings.pitch_yaw.into(),
            GamepadField::MoveUp => Binding::Button(bindings.move_up),
            GamepadField::MoveDown => Binding::Button(bindings.move_down),
            GamepadField::RollLeft => Binding::Button(bindings.roll_left),
            GamepadField::RollRight => Binding::Button(bindings.roll_right),
        }
    }

    /// Store `binding` into this field
    pub fn set(&self, bindings: &mut GamepadBindings, binding: Binding) -> Result<()> {
        match self {
            GamepadField::MoveHorizontal => bindings.move_horizontal = binding.try_into()?,
            GamepadField::PitchYaw => bindings.pitch_yaw = binding.try_into()?,
            GamepadField::MoveUp => bindings.move_up = self.button_id(binding)?,
            GamepadField::MoveDown => bindings.move_down = self.button_id(binding)?,
            GamepadField::RollLeft => bindings.roll_left = self.button_id(binding)?,
            GamepadField::RollRight => bindings.roll_right = self.button_id(binding)?,
        }
        Ok(())
    }

    fn button_id(&self, binding: Binding) -> Result<u16> {
        match binding {
            Binding::Button(id) => Ok(id),
            other => Err(DomainError::ValidationError(format!(
                "{} needs a button, got {}",
                self, other
            ))),
        }
    }
}

impl fmt::Display for GamepadField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GamepadField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "moveHorizontal" => Ok(GamepadField::MoveHorizontal),
            "moveUp" => Ok(GamepadField::MoveUp),
            "moveDown" => Ok(GamepadField::MoveDown),
            "pitchYaw" => Ok(GamepadField::PitchYaw),
            "rollLeft" => Ok(GamepadField::RollLeft),
            "rollRight" => Ok(GamepadField::RollRight),
            other => Err(DomainError::ValidationError(format!(
                "Unknown gamepad binding {}",
                other
            ))),
        }
    }
}

/// Persisted operator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub ip: String,
    pub stream_port: u16,
    pub control_port: u16,
    pub keyboard: KeyboardBindings,
    pub gamepad: GamepadBindings,
}

impl Config {
    /// Reject values the drone link cannot use
    pub fn validate(&self) -> Result<()> {
        if self.ip.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Drone address must not be empty".to_string(),
            ));
        }
        if self.stream_port == 0 || self.control_port == 0 {
            return Err(DomainError::ValidationError(
                "Ports must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ip: "10.10.10.10".to_string(),
            stream_port: 8889,
            control_port: 5000,
            keyboard: KeyboardBindings::default(),
            gamepad: GamepadBindings::default(),
        }
    }
}
