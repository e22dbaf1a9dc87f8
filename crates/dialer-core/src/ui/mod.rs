// src/ui/mod.rs
//! Dialer UI system
//!
//! - Core traits for drawable and touchable elements
//! - Tick-driven animations (springs, color sequences, easing)
//! - Components: the rotary dial and the passcode indicator
//! - Palette and colors

pub mod animation;
pub mod components;
pub mod core;
pub mod styling;

/// Panel width in pixels (landscape).
pub const DISPLAY_WIDTH_PX: u16 = 320;

/// Panel height in pixels (landscape).
pub const DISPLAY_HEIGHT_PX: u16 = 240;

// Re-export commonly used items
pub use animation::{ColorKeyframe, ColorSequence, Easing, SpringAnimation, SpringParams};
pub use components::{DialPhase, PasscodeIndicator, RotaryDial, Verdict};
pub use self::core::{
    Action, Drawable, PageId, TouchEvent, TouchPoint, TouchResult, Touchable,
};
pub use styling::DialerPalette;
