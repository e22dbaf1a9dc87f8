//! Styling for the dialer UI
//!
//! - [`colors`] - RGB565 color constants and the [`DialerPalette`]

pub mod colors;

pub use colors::{
    COLOR_BACKGROUND, COLOR_FAILURE, COLOR_SUCCESS, DialerPalette, LIGHT_GRAY, WHITE,
};
