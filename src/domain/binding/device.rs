//! Controller input snapshots

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// State of one connected controller in a single frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamepadSnapshot {
    #[serde(default)]
    pub id: Option<String>,
    /// Pressed flag per button index
    #[serde(default)]
    pub buttons: Vec<bool>,
    /// Axis values in [-1.0, 1.0], standard layout: LX, LY, RX, RY
    #[serde(default)]
    pub axes: Vec<f64>,
}

impl GamepadSnapshot {
    pub fn new(buttons: Vec<bool>, axes: Vec<f64>) -> Self {
        Self {
            id: None,
            buttons,
            axes,
        }
    }

    /// Snapshot with the given button indices pressed
    pub fn with_pressed(button_count: usize, pressed: &[usize], axes: Vec<f64>) -> Self {
        let mut buttons = vec![false; button_count];
        for &index in pressed {
            if let Some(button) = buttons.get_mut(index) {
                *button = true;
            }
        }
        Self::new(buttons, axes)
    }
}

/// Supplies the connected controllers once per frame
pub trait GamepadSource: Send + Sync {
    fn snapshots(&self) -> Vec<GamepadSnapshot>;

    fn is_connected(&self) -> bool {
        !self.snapshots().is_empty()
    }
}

/// Gamepad source fed from outside, e.g. by the UI forwarding what the
/// window's gamepad API reports
#[derive(Debug, Default)]
pub struct SharedGamepadSource {
    pads: RwLock<Vec<GamepadSnapshot>>,
}

impl SharedGamepadSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current frame
    pub fn update(&self, pads: Vec<GamepadSnapshot>) {
        *self.pads.write() = pads;
    }

    pub fn clear(&self) {
        self.pads.write().clear();
    }
}

impl GamepadSource for SharedGamepadSource {
    fn snapshots(&self) -> Vec<GamepadSnapshot> {
        self.pads.read().clone()
    }

    fn is_connected(&self) -> bool {
        !self.pads.read().is_empty()
    }
}
