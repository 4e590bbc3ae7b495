//! Fixed controller lookup tables
//!
//! Physical button indices follow the W3C "standard" gamepad layout. They
//! are remapped to the logical button ids the drone control plane expects,
//! and logical ids are rendered with a display label for the operator.

use crate::domain::settings::model::ControlSource;
use crate::domain::shared::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A captured controller binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Binding {
    /// Logical button id, or the raw physical index for unknown buttons
    Button(u16),
    LeftStick,
    RightStick,
    DPad,
    FaceButtons,
}

/// Logical id for a physical button index
pub fn logical_button(index: usize) -> Option<u16> {
    let id = match index {
        0 => 1,
        1 => 2,
        2 => 5,
        3 => 4,
        4 => 7,
        5 => 8,
        6 => 9,
        7 => 10,
        8 => 11,
        9 => 12,
        10 => 14,
        11 => 15,
        12 => 16,
        13 => 17,
        14 => 18,
        15 => 19,
        16 => 13,
        17 => 3,
        18 => 6,
        _ => return None,
    };
    Some(id)
}

/// Display label for a logical button id
pub fn button_label(id: u16) -> Option<&'static str> {
    let label = match id {
        1 => "A / ×",
        2 => "B / ○",
        3 => "C",
        4 => "Y / △",
        5 => "X / □",
        6 => "Z",
        7 => "LB / L1",
        8 => "RB / R1",
        9 => "LT / L2",
        10 => "RT / R2",
        11 => "Back / Share",
        12 => "Start / Options",
        13 => "Xbox / PS Button",
        14 => "L3",
        15 => "R3",
        16 => "DPad Up",
        17 => "DPad Down",
        18 => "DPad Left",
        19 => "DPad Right",
        _ => return None,
    };
    Some(label)
}

impl Binding {
    /// Binding for a pressed physical button in button mode.
    ///
    /// Indices outside the table degrade to the raw index so an unknown
    /// button can still be bound.
    pub fn from_button_index(index: usize) -> Self {
        match logical_button(index) {
            Some(id) => Binding::Button(id),
            None => Binding::Button(u16::try_from(index).unwrap_or(u16::MAX)),
        }
    }

    /// Label shown to the operator
    pub fn label(&self) -> String {
        match self {
            Binding::Button(id) => match button_label(*id) {
                Some(label) => label.to_string(),
                None => id.to_string(),
            },
            Binding::LeftStick => "Left Stick".to_string(),
            Binding::RightStick => "Right Stick".to_string(),
            Binding::DPad => "D-Pad".to_string(),
            Binding::FaceButtons => "Face Buttons".to_string(),
        }
    }

    pub fn is_grouped(&self) -> bool {
        !matches!(self, Binding::Button(_))
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Button(id) => write!(f, "{}", id),
            Binding::LeftStick => f.write_str("leftStick"),
            Binding::RightStick => f.write_str("rightStick"),
            Binding::DPad => f.write_str("dPad"),
            Binding::FaceButtons => f.write_str("faceButtons"),
        }
    }
}

impl FromStr for Binding {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "leftStick" => Ok(Binding::LeftStick),
            "rightStick" => Ok(Binding::RightStick),
            "dPad" => Ok(Binding::DPad),
            "faceButtons" => Ok(Binding::FaceButtons),
            other => other
                .parse::<u16>()
                .map(Binding::Button)
                .map_err(|_| DomainError::ValidationError(format!("Unknown binding {}", other))),
        }
    }
}

impl TryFrom<String> for Binding {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Binding> for String {
    fn from(binding: Binding) -> Self {
        binding.to_string()
    }
}

impl From<ControlSource> for Binding {
    fn from(source: ControlSource) -> Self {
        match source {
            ControlSource::LeftStick => Binding::LeftStick,
            ControlSource::RightStick => Binding::RightStick,
            ControlSource::DPad => Binding::DPad,
            ControlSource::FaceButtons => Binding::FaceButtons,
        }
    }
}

impl TryFrom<Binding> for ControlSource {
    type Error = DomainError;

    fn try_from(binding: Binding) -> Result<Self, Self::Error> {
        match binding {
            Binding::LeftStick => Ok(ControlSource::LeftStick),
            Binding::RightStick => Ok(ControlSource::RightStick),
            Binding::DPad => Ok(ControlSource::DPad),
            Binding::FaceButtons => Ok(ControlSource::FaceButtons),
            Binding::Button(id) => Err(DomainError::ValidationError(format!(
                "Button {} is not a stick-style control",
                id
            ))),
        }
    }
}
