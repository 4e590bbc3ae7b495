//! Gamepad binding capture
//!
//! While recording, every frame scans the connected controllers and the first
//! qualifying input becomes the new binding. Buttons are scanned before axes,
//! lower button indices before higher ones, earlier controllers before later
//! ones. A button that is already held when recording starts satisfies the
//! capture on the first frame.

use crate::domain::binding::device::{GamepadSnapshot, GamepadSource};
use crate::domain::binding::mapping::Binding;
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Poll period of the capture loop (one display frame at 60 Hz)
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Minimum stick deflection that counts as input
pub const AXIS_THRESHOLD: f64 = 0.7;

/// What kind of binding is being captured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Single buttons, remapped through the logical button table
    Buttons,
    /// Grouped inputs: sticks, d-pad, face buttons
    Joystick,
}

/// First qualifying input in one frame, if any
pub fn scan_frame(mode: CaptureMode, pads: &[GamepadSnapshot]) -> Option<Binding> {
    pads.iter().find_map(|pad| scan_pad(mode, pad))
}

fn scan_pad(mode: CaptureMode, pad: &GamepadSnapshot) -> Option<Binding> {
    for (index, _) in pad.buttons.iter().enumerate().filter(|(_, pressed)| **pressed) {
        match mode {
            CaptureMode::Buttons => return Some(Binding::from_button_index(index)),
            CaptureMode::Joystick => match index {
                0..=3 => return Some(Binding::FaceButtons),
                12..=15 => return Some(Binding::DPad),
                // Other buttons mean nothing to a stick-style binding
                _ => {}
            },
        }
    }

    if mode == CaptureMode::Joystick && pad.axes.len() >= 4 {
        let deflected = |axis: usize| pad.axes[axis].abs() > AXIS_THRESHOLD;

        if deflected(0) || deflected(1) {
            return Some(Binding::LeftStick);
        }
        if deflected(2) || deflected(3) {
            return Some(Binding::RightStick);
        }
    }

    None
}

/// Capture state of one binding control
#[derive(Debug, Clone)]
pub struct BindingCapture {
    mode: CaptureMode,
    current: Binding,
    default: Binding,
    recording: bool,
}

impl BindingCapture {
    pub fn new(mode: CaptureMode, current: Binding, default: Binding) -> Self {
        Self {
            mode,
            current,
            default,
            recording: false,
        }
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn current(&self) -> Binding {
        self.current
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Begin recording. Refused while no controller is connected.
    pub fn start_recording<S>(&mut self, source: &S) -> bool
    where
        S: GamepadSource + ?Sized,
    {
        if !source.is_connected() {
            debug!("No gamepad connected, not recording");
            return false;
        }

        self.recording = true;
        true
    }

    /// Pointer went down outside the capture control
    pub fn focus_lost(&mut self) {
        if self.recording {
            debug!("Binding capture lost focus");
        }
        self.recording = false;
    }

    /// Process one frame. Returns the new binding if this frame completed
    /// the capture.
    pub fn poll_frame(&mut self, pads: &[GamepadSnapshot]) -> Option<Binding> {
        if !self.recording {
            return None;
        }

        let binding = scan_frame(self.mode, pads)?;
        self.current = binding;
        self.recording = false;
        info!("Captured gamepad binding {}", binding);
        Some(binding)
    }

    /// Restore the default binding and return it
    pub fn reset_to_default(&mut self) -> Binding {
        self.current = self.default;
        self.default
    }

    /// Text shown on the capture control
    pub fn display_text(&self) -> String {
        if self.recording {
            "Press a key...".to_string()
        } else {
            self.current.label()
        }
    }

    /// Record until an input is captured or `focus_lost` resolves.
    ///
    /// Returns `None` if recording could not start or was abandoned.
    pub async fn record<S, F>(&mut self, source: &S, focus_lost: F) -> Option<Binding>
    where
        S: GamepadSource + ?Sized,
        F: Future<Output = ()>,
    {
        if !self.start_recording(source) {
            return None;
        }

        let mut frames = tokio::time::interval(FRAME_INTERVAL);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(focus_lost);

        loop {
            tokio::select! {
                _ = &mut focus_lost => {
                    self.focus_lost();
                    return None;
                }
                _ = frames.tick() => {
                    if let Some(binding) = self.poll_frame(&source.snapshots()) {
                        return Some(binding);
                    }
                }
            }
        }
    }
}
