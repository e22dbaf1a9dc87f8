//! Desktop simulator for the rotary passcode dialer.
//!
//! Renders the dialer-core passcode page in an SDL2 window via
//! `embedded-graphics-simulator`. The page draws into a [`FrameBuffer`]
//! through the same [`DisplayManager`] the firmware uses, and the changed
//! region is flushed to the window each frame.
//!
//! # Controls
//!
//! | Input            | Action              |
//! |------------------|---------------------|
//! | Mouse down       | Touch press         |
//! | Mouse move       | Touch drag          |
//! | Mouse up         | Touch release       |
//! | R                | Full redraw         |
//! | Q / Esc          | Quit                |
//!
//! The target passcode comes from `DIALER_PASSCODE` (default `1357`).

use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window, sdl2::Keycode,
};
use log::{error, info, warn};

use dialer_core::config::{DEFAULT_PASSCODE, DialerConfig};
use dialer_core::display_manager::{
    DisplayManager, DisplayRequest, get_display_receiver, get_display_sender,
};
use dialer_core::framebuffer::FrameBuffer;
use dialer_core::ui::{Action, DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX, TouchEvent, TouchPoint};

// ---------------------------------------------------------------------------
// Display constants
// ---------------------------------------------------------------------------

/// Pixel scale factor for the simulator window.
const WINDOW_SCALE: u32 = 2;

/// Target frame duration (~60 FPS).
const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Environment variable holding the target passcode.
const PASSCODE_ENV: &str = "DIALER_PASSCODE";

// ---------------------------------------------------------------------------
// Request plumbing
// ---------------------------------------------------------------------------

/// Convert a window coordinate into a touch point, clamping to the panel.
fn touch_point(point: Point) -> TouchPoint {
    TouchPoint::new(
        point.x.clamp(0, DISPLAY_WIDTH_PX as i32 - 1) as u16,
        point.y.clamp(0, DISPLAY_HEIGHT_PX as i32 - 1) as u16,
    )
}

/// Queue `request`, draining the channel first if it is full.
fn post(manager: &mut DisplayManager<FrameBuffer>, request: DisplayRequest) {
    let sender = get_display_sender();
    if sender.try_send(request).is_ok() {
        return;
    }

    drain(manager);
    if sender.try_send(request).is_err() {
        warn!("Display channel full, dropped {:?}", request);
    }
}

/// Process everything queued and report the resulting actions.
fn drain(manager: &mut DisplayManager<FrameBuffer>) {
    let receiver = get_display_receiver();
    let Ok(actions) = manager.process_pending(&receiver);

    for action in actions {
        match action {
            Action::DigitEntered(digit) => info!("Dialed {}", digit),
            Action::PasscodeAccepted => info!("Passcode accepted, unlocked"),
            Action::PasscodeRejected => info!("Passcode rejected, try again"),
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    info!("Starting rotary dialer simulator");
    info!(
        "Display: {}×{} (scale {}×)",
        DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX, WINDOW_SCALE
    );
    info!("Keys: R=Redraw  Q=Quit");

    let passcode = std::env::var(PASSCODE_ENV).unwrap_or_else(|_| DEFAULT_PASSCODE.into());
    let config = DialerConfig::with_passcode(&passcode);

    let mut manager = match DisplayManager::new(FrameBuffer::new(), &config) {
        Ok(manager) => manager,
        Err(e) => {
            error!("Invalid {}: {}", PASSCODE_ENV, e);
            std::process::exit(2);
        }
    };
    info!("Target passcode has {} digits", passcode.len());

    // SDL2 display and window
    let mut display = SimulatorDisplay::<Rgb565>::new(Size::new(
        DISPLAY_WIDTH_PX as u32,
        DISPLAY_HEIGHT_PX as u32,
    ));

    let output_settings = OutputSettingsBuilder::new().scale(WINDOW_SCALE).build();
    let mut window = Window::new("Rotary Dialer", &output_settings);

    // The SDL window is lazily initialized on the first `update()` call.
    // We must call `update()` once before `events()` or it will panic.
    post(&mut manager, DisplayRequest::Redraw);
    drain(&mut manager);
    let _ = manager.display_mut().flush(&mut display);
    window.update(&display);

    let mut pressed = false;
    let mut last_frame = Instant::now();

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------
    'running: loop {
        let frame_start = Instant::now();

        // --- SDL events ---------------------------------------------------
        for event in window.events() {
            let request = match event {
                SimulatorEvent::Quit => break 'running,

                SimulatorEvent::KeyDown { keycode, .. } => match keycode {
                    Keycode::Q | Keycode::Escape => break 'running,
                    Keycode::R => DisplayRequest::Redraw,
                    _ => continue,
                },

                SimulatorEvent::MouseButtonDown { point, .. } => {
                    pressed = true;
                    DisplayRequest::HandleTouch(TouchEvent::Press(touch_point(point)))
                }

                SimulatorEvent::MouseMove { point } if pressed => {
                    DisplayRequest::HandleTouch(TouchEvent::Drag(touch_point(point)))
                }

                SimulatorEvent::MouseButtonUp { point, .. } if pressed => {
                    pressed = false;
                    DisplayRequest::HandleTouch(TouchEvent::Release(touch_point(point)))
                }

                _ => continue,
            };
            post(&mut manager, request);
        }

        // --- Animation tick -----------------------------------------------
        let dt = last_frame.elapsed();
        last_frame = Instant::now();
        post(
            &mut manager,
            DisplayRequest::Tick(embassy_time::Duration::from_micros(dt.as_micros() as u64)),
        );

        // --- Render -------------------------------------------------------
        drain(&mut manager);
        let _ = manager.display_mut().flush(&mut display);
        window.update(&display);

        // --- Frame pacing -------------------------------------------------
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    info!("Simulator exiting");
}
