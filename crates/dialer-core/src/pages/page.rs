// src/pages/page.rs
//! Core page abstraction.
//!
//! A [`Page`] owns one full screen: its layout, its widgets, their dirty
//! tracking, and the translation of widget results into application
//! [`Action`]s. The [`DisplayManager`](crate::display_manager::DisplayManager)
//! calls these methods in a fixed order:
//!
//! 1. **`on_activate`**: once, when the page becomes the active page.
//! 2. **`handle_touch`**: for every touch event.
//! 3. **`update`**: once per frame tick with the elapsed time.
//! 4. **`draw_page`**: when `is_dirty()` is true.

use embassy_time::Duration;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::ui::core::{Action, PageId, TouchEvent};

/// Trait that all UI pages must implement.
pub trait Page {
    /// Unique identifier used for lookup and logging.
    fn id(&self) -> PageId;

    /// Human-readable title (appears in debug logs).
    fn title(&self) -> &str;

    /// Called once when this page becomes the active page.
    fn on_activate(&mut self) {}

    /// Process a touch event and optionally return an [`Action`].
    fn handle_touch(&mut self, event: TouchEvent) -> Option<Action>;

    /// Advance animations by `dt`, optionally returning an [`Action`] that
    /// completed during this tick.
    fn update(&mut self, dt: Duration) -> Option<Action>;

    /// Render the dirty parts of the page to the given display target.
    fn draw_page<D: DrawTarget<Color = Rgb565>>(&mut self, display: &mut D)
    -> Result<(), D::Error>;

    /// Bounding rectangle of this page (typically the full screen).
    fn bounds(&self) -> Rectangle;

    /// Whether any part of the page needs redrawing.
    fn is_dirty(&self) -> bool;

    /// Clear the dirty flags after a successful draw.
    fn mark_clean(&mut self);

    /// Force a full redraw on the next frame.
    fn mark_dirty(&mut self);
}
