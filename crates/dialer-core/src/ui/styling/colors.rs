//! Color definitions and palette management
//!
//! All colors are RGB565, the native format of the 16-bit panel.
//!
//! # RGB565 Format
//! - Red: 5 bits (0-31)
//! - Green: 6 bits (0-63)
//! - Blue: 5 bits (0-31)
//!
//! To convert from 8-bit RGB: R>>3, G>>2, B>>3

use embedded_graphics::pixelcolor::Rgb565;

// ============================================================================
// Base Colors
// ============================================================================

/// Page background - very dark gray-blue
pub const COLOR_BACKGROUND: Rgb565 = Rgb565::new(18 >> 3, 23 >> 2, 24 >> 3);

/// Dial face - pure black so the rim reads as a separate ring
pub const COLOR_DIAL_FACE: Rgb565 = Rgb565::new(0, 0, 0);

/// Indicator slot outline/background
pub const COLOR_SLOT: Rgb565 = Rgb565::new(0, 0, 0);

// ============================================================================
// Text / Foreground Colors
// ============================================================================

/// Pure white - maximum brightness in RGB565
pub const WHITE: Rgb565 = Rgb565::new(31, 63, 31);

/// Light gray - for secondary text
pub const LIGHT_GRAY: Rgb565 = Rgb565::new(21, 42, 21);

// ============================================================================
// Verdict Colors
// ============================================================================

/// Fill flash when the passcode matches
pub const COLOR_SUCCESS: Rgb565 = Rgb565::new(0, 63, 0);

/// Fill flash when the passcode is rejected
pub const COLOR_FAILURE: Rgb565 = Rgb565::new(31, 0, 0);

// ============================================================================
// Palette
// ============================================================================

/// Colors used by the passcode page and its widgets.
///
/// ```ignore
/// let palette = DialerPalette::default();
/// let dial = RotaryDial::new(bounds).with_palette(palette);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialerPalette {
    /// Page background; dial wells are "punched" to this color
    pub background: Rgb565,

    /// Dial face disc
    pub face: Rgb565,

    /// Rim ring carrying the finger wells
    pub rim: Rgb565,

    /// Digit labels and index dot
    pub label: Rgb565,

    /// Center hub
    pub hub: Rgb565,

    /// Title text
    pub text_primary: Rgb565,

    /// Hint text
    pub text_secondary: Rgb565,

    /// Empty indicator slot
    pub slot: Rgb565,

    /// Neutral indicator fill
    pub fill_neutral: Rgb565,

    /// Fill flashed on a match
    pub fill_success: Rgb565,

    /// Fill flashed on a mismatch
    pub fill_failure: Rgb565,
}

impl Default for DialerPalette {
    fn default() -> Self {
        Self {
            background: COLOR_BACKGROUND,
            face: COLOR_DIAL_FACE,
            rim: WHITE,
            label: WHITE,
            hub: WHITE,
            text_primary: WHITE,
            text_secondary: LIGHT_GRAY,
            slot: COLOR_SLOT,
            fill_neutral: WHITE,
            fill_success: COLOR_SUCCESS,
            fill_failure: COLOR_FAILURE,
        }
    }
}
