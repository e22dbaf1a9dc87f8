//! Dialer configuration.
//!
//! The target passcode and the dial's return spring. Firmware builds bake
//! the values in (or deserialize them with serde), while the simulator reads
//! the passcode from its environment. Either way the config is validated
//! before any widget is built from it.

use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::ui::animation::SpringParams;

/// Longest passcode the indicator can display.
pub const MAX_PASSCODE_LEN: usize = 8;

/// Passcode used when none is configured.
pub const DEFAULT_PASSCODE: &str = "1357";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct DialerConfig<'a> {
    /// Digits the user must dial, in order
    pub passcode: &'a str,
    /// Spring that returns the dial to rest after a gesture
    pub return_spring: SpringParams,
}

impl Default for DialerConfig<'_> {
    fn default() -> Self {
        Self {
            passcode: DEFAULT_PASSCODE,
            return_spring: SpringParams::low_bouncy(),
        }
    }
}

impl<'a> DialerConfig<'a> {
    pub fn with_passcode(passcode: &'a str) -> Self {
        Self {
            passcode,
            ..Self::default()
        }
    }

    /// Check that the passcode is 1 to [`MAX_PASSCODE_LEN`] ASCII digits and
    /// that the spring is physical.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.passcode.is_empty() {
            return Err(ConfigError::EmptyPasscode);
        }

        if let Some((index, found)) = self
            .passcode
            .chars()
            .enumerate()
            .find(|(_, c)| !c.is_ascii_digit())
        {
            return Err(ConfigError::NonDigit { index, found });
        }

        let len = self.passcode.len();
        if len > MAX_PASSCODE_LEN {
            return Err(ConfigError::PasscodeTooLong {
                len,
                max: MAX_PASSCODE_LEN,
            });
        }

        if !self.return_spring.is_valid() {
            return Err(ConfigError::InvalidSpring);
        }

        Ok(())
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("Passcode is empty")]
    EmptyPasscode,
    #[error("Passcode has {len} digits, at most {max} are supported")]
    PasscodeTooLong { len: usize, max: usize },
    #[error("Passcode character {index} is {found:?}, expected a digit")]
    NonDigit { index: usize, found: char },
    #[error("Return spring needs positive, finite damping and stiffness")]
    InvalidSpring,
}
