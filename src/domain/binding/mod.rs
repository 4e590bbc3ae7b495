//! Binding bounded context - capturing controller inputs as control bindings

pub mod capture;
pub mod device;
pub mod mapping;

pub use capture::{scan_frame, BindingCapture, CaptureMode, AXIS_THRESHOLD, FRAME_INTERVAL};
pub use device::{GamepadSnapshot, GamepadSource, SharedGamepadSource};
pub use mapping::{button_label, logical_button, Binding};
