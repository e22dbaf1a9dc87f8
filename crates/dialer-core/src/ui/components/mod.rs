// src/ui/components/mod.rs
//! Dialer widgets

pub mod passcode_indicator;
pub mod rotary_dial;

pub use passcode_indicator::{PasscodeIndicator, Verdict};
pub use rotary_dial::{DialPhase, RotaryDial};
