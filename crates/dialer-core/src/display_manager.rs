//! Display Manager for handling input, animation ticks and rendering
//!
//! This module provides a channel-driven display task that:
//! - Owns the draw target and the passcode page
//! - Routes touch events to the page
//! - Advances page animations on frame ticks
//! - Renders the page whenever something on it changed
//!
//! Producers (touch driver, frame timer) never touch the page directly; they
//! post [`DisplayRequest`]s to [`DISPLAY_CHANNEL`]. All widget state is
//! therefore mutated from a single task.

use alloc::vec::Vec;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_time::Duration;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::{debug, error, info, trace};

use crate::config::{ConfigError, DialerConfig};
use crate::pages::{Page, PasscodePage};
use crate::ui::{Action, DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX, TouchEvent};

/// Channel capacity for display requests
pub const DISPLAY_CHANNEL_CAPACITY: usize = 8;

/// Request to update the display
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayRequest {
    /// Handle a touch event on the current page
    HandleTouch(TouchEvent),
    /// Advance animations by the elapsed frame time
    Tick(Duration),
    /// Force a full redraw of the current page
    Redraw,
}

pub type DisplaySender<'a> =
    Sender<'a, CriticalSectionRawMutex, DisplayRequest, DISPLAY_CHANNEL_CAPACITY>;
pub type DisplayReceiver<'a> =
    Receiver<'a, CriticalSectionRawMutex, DisplayRequest, DISPLAY_CHANNEL_CAPACITY>;

/// Global channel for display requests
pub static DISPLAY_CHANNEL: Channel<
    CriticalSectionRawMutex,
    DisplayRequest,
    DISPLAY_CHANNEL_CAPACITY,
> = Channel::new();

/// Display manager that owns the display and the passcode page
pub struct DisplayManager<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    display: D,
    current_page: PasscodePage,
    needs_redraw: bool,
}

impl<D> DisplayManager<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    /// Create a display manager showing the passcode page for `config`
    pub fn new(display: D, config: &DialerConfig<'_>) -> Result<Self, ConfigError> {
        let bounds = Rectangle::new(
            Point::zero(),
            Size::new(DISPLAY_WIDTH_PX as u32, DISPLAY_HEIGHT_PX as u32),
        );

        let mut page = PasscodePage::new(bounds, config)?;
        page.on_activate();
        info!("Display manager showing page {:?}", page.id());

        Ok(Self {
            display,
            current_page: page,
            needs_redraw: true,
        })
    }

    pub fn page(&self) -> &PasscodePage {
        &self.current_page
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    fn handle_touch(&mut self, event: TouchEvent) -> Option<Action> {
        trace!("Received touch event: {:?}", event);
        let action = self.current_page.handle_touch(event);
        if let Some(action) = action {
            debug!("Touch resulted in action: {:?}", action);
        }
        action
    }

    fn tick(&mut self, dt: Duration) -> Option<Action> {
        let action = self.current_page.update(dt);
        if let Some(action) = action {
            debug!("Tick completed action: {:?}", action);
        }
        action
    }

    /// Render the current page if anything on it changed
    pub fn render(&mut self) -> Result<(), D::Error> {
        if self.needs_redraw {
            self.current_page.mark_dirty();
            self.needs_redraw = false;
        }

        if self.current_page.is_dirty() {
            trace!("Rendering page {}", self.current_page.title());
            self.current_page.draw_page(&mut self.display)?;
            self.current_page.mark_clean();
        }
        Ok(())
    }

    /// Process a display request, then render if needed
    pub fn process_request(&mut self, request: DisplayRequest) -> Result<Option<Action>, D::Error> {
        let action = match request {
            DisplayRequest::HandleTouch(event) => self.handle_touch(event),
            DisplayRequest::Tick(dt) => self.tick(dt),
            DisplayRequest::Redraw => {
                self.needs_redraw = true;
                None
            }
        };

        self.render()?;
        Ok(action)
    }

    /// Drain every request currently queued on `receiver` without waiting.
    ///
    /// Returns the actions produced, in order. Used by hosts that drive the
    /// manager from their own frame loop instead of an executor.
    pub fn process_pending(
        &mut self,
        receiver: &DisplayReceiver<'_>,
    ) -> Result<Vec<Action>, D::Error> {
        let mut actions = Vec::new();
        while let Ok(request) = receiver.try_receive() {
            if let Some(action) = self.process_request(request)? {
                actions.push(action);
            }
        }
        Ok(actions)
    }

    /// Run the display manager task
    ///
    /// Processes requests from the channel forever, passing every resulting
    /// action to `on_action`. Render errors are logged and the loop continues.
    pub async fn run<F>(&mut self, receiver: DisplayReceiver<'_>, mut on_action: F)
    where
        F: FnMut(Action),
        <D as DrawTarget>::Error: core::fmt::Debug,
    {
        info!("Display manager task started");

        if let Err(e) = self.render() {
            error!("Display render error: {:?}", e);
        }

        loop {
            let request = receiver.receive().await;

            match self.process_request(request) {
                Ok(Some(action)) => on_action(action),
                Ok(None) => {}
                Err(e) => error!("Error processing request: {:?}", e),
            }
        }
    }
}

/// Helper to get a display request sender
pub fn get_display_sender() -> DisplaySender<'static> {
    DISPLAY_CHANNEL.sender()
}

/// Helper to get a display request receiver
pub fn get_display_receiver() -> DisplayReceiver<'static> {
    DISPLAY_CHANNEL.receiver()
}
