// src/ui/components/passcode_indicator.rs
//! Passcode indicator component
//!
//! Round slots, four to a row, one per digit of the target passcode. Entered digits
//! fill their slot. Once the entry reaches the target length the filled
//! slots flash green (match) or red twice (mismatch), and the verdict is
//! reported when the flash completes.

use embassy_time::Duration;
use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle, Rectangle};
use heapless::String;
use log::{debug, info, warn};

use crate::config::MAX_PASSCODE_LEN;
use crate::ui::animation::{ColorKeyframe, ColorSequence, Easing};
use crate::ui::core::Drawable;
use crate::ui::styling::DialerPalette;

/// Outer slot diameter in pixels.
pub const SLOT_DIAMETER: u32 = 16;

/// Filled dot diameter in pixels.
pub const FILL_DIAMETER: u32 = 12;

/// Gap between neighbouring slots in pixels.
pub const SLOT_GAP: u32 = 4;

/// Slots per row; longer passcodes wrap onto a second row.
pub const SLOTS_PER_ROW: usize = 4;

const SUCCESS_FADE_MS: u64 = 1000;
const FAILURE_FLASH_MS: u64 = 200;
const FAILURE_RECOVER_MS: u64 = 300;
const NEUTRAL_RESTORE_MS: u64 = 300;

/// Outcome of comparing a complete entry with the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected,
}

/// A color sequence in flight, optionally carrying the verdict it announces.
#[derive(Debug, Clone)]
struct FillAnimation {
    sequence: ColorSequence,
    verdict: Option<Verdict>,
}

pub struct PasscodeIndicator {
    bounds: Rectangle,
    target: String<MAX_PASSCODE_LEN>,
    entry: String<MAX_PASSCODE_LEN>,
    fill: Rgb565,
    animation: Option<FillAnimation>,
    palette: DialerPalette,
    dirty: bool,
}

impl PasscodeIndicator {
    /// Create an indicator for `target`, laid out from `top_left`.
    ///
    /// `target` is expected to be validated already; anything past
    /// [`MAX_PASSCODE_LEN`] characters is dropped.
    pub fn new(top_left: Point, target: &str) -> Self {
        let mut stored = String::new();
        for c in target.chars() {
            if stored.push(c).is_err() {
                warn!("Passcode truncated to {} digits", MAX_PASSCODE_LEN);
                break;
            }
        }

        let palette = DialerPalette::default();
        Self {
            bounds: Rectangle::new(top_left, Self::grid_size(stored.len())),
            target: stored,
            entry: String::new(),
            fill: palette.fill_neutral,
            animation: None,
            palette,
            dirty: true,
        }
    }

    pub fn with_palette(mut self, palette: DialerPalette) -> Self {
        self.fill = palette.fill_neutral;
        self.palette = palette;
        self.dirty = true;
        self
    }

    /// Size of the slot grid for `slots` slots.
    pub fn grid_size(slots: usize) -> Size {
        let columns = slots.min(SLOTS_PER_ROW) as u32;
        let rows = slots.div_ceil(SLOTS_PER_ROW) as u32;
        let span = |count: u32| count * SLOT_DIAMETER + count.saturating_sub(1) * SLOT_GAP;
        Size::new(span(columns), span(rows))
    }

    pub fn slot_count(&self) -> usize {
        self.target.len()
    }

    pub fn is_slot_filled(&self, index: usize) -> bool {
        self.entry.len() > index
    }

    /// Current fill color of the filled slots.
    pub fn fill_color(&self) -> Rgb565 {
        self.fill
    }

    /// Whether a success or failure sequence is still playing.
    pub fn is_verifying(&self) -> bool {
        self.animation
            .as_ref()
            .is_some_and(|animation| animation.verdict.is_some())
    }

    /// Show a new entry. Call on every change of the entry buffer.
    ///
    /// A complete entry starts the success or failure sequence. A shorter one
    /// interrupts whatever is playing and fades the fill back to neutral.
    pub fn set_entry(&mut self, entry: &str) {
        if self.entry.as_str() == entry {
            return;
        }

        self.entry.clear();
        for c in entry.chars() {
            if self.entry.push(c).is_err() {
                break;
            }
        }
        self.dirty = true;

        if entry.len() < self.target.len() {
            self.restore_neutral();
            return;
        }

        let verdict = if entry == self.target.as_str() {
            Verdict::Accepted
        } else {
            Verdict::Rejected
        };
        info!("Passcode entry complete: {:?}", verdict);

        let neutral = self.palette.fill_neutral;
        let sequence = match verdict {
            Verdict::Accepted => ColorSequence::new(
                self.fill,
                &[
                    ColorKeyframe::tween(self.palette.fill_success, SUCCESS_FADE_MS, Easing::Linear),
                    ColorKeyframe::snap(neutral),
                ],
            ),
            Verdict::Rejected => {
                let red = self.palette.fill_failure;
                ColorSequence::new(
                    self.fill,
                    &[
                        ColorKeyframe::tween(red, FAILURE_FLASH_MS, Easing::EaseOutCubic),
                        ColorKeyframe::tween(neutral, FAILURE_RECOVER_MS, Easing::EaseInOutCubic),
                        ColorKeyframe::tween(red, FAILURE_FLASH_MS, Easing::EaseOutCubic),
                        ColorKeyframe::tween(neutral, FAILURE_RECOVER_MS, Easing::EaseInOutCubic),
                    ],
                )
            }
        };

        self.animation = Some(FillAnimation {
            sequence,
            verdict: Some(verdict),
        });
    }

    fn restore_neutral(&mut self) {
        let neutral = self.palette.fill_neutral;
        if self.fill == neutral {
            self.animation = None;
            return;
        }

        if self.is_verifying() {
            debug!("Verdict sequence interrupted by a shorter entry");
        }
        self.animation = Some(FillAnimation {
            sequence: ColorSequence::new(
                self.fill,
                &[ColorKeyframe::tween(neutral, NEUTRAL_RESTORE_MS, Easing::EaseOutCubic)],
            ),
            verdict: None,
        });
    }

    /// Advance the fill animation by `dt`.
    ///
    /// Returns the verdict exactly once, on the tick its sequence finishes.
    pub fn update(&mut self, dt: Duration) -> Option<Verdict> {
        let animation = self.animation.as_mut()?;

        let color = animation.sequence.advance(dt);
        let finished = animation.sequence.is_finished();
        let verdict = animation.verdict;

        if color != self.fill {
            self.fill = color;
            self.dirty = true;
        }

        if finished {
            self.animation = None;
            return verdict;
        }
        None
    }

    fn slot_center(&self, index: usize) -> Point {
        let step = (SLOT_DIAMETER + SLOT_GAP) as i32;
        let radius = (SLOT_DIAMETER / 2) as i32;
        let column = (index % SLOTS_PER_ROW) as i32;
        let row = (index / SLOTS_PER_ROW) as i32;
        self.bounds.top_left + Point::new(column * step + radius, row * step + radius)
    }
}

impl Drawable for PasscodeIndicator {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        let slot_style = PrimitiveStyle::with_fill(self.palette.slot);
        let fill_style = PrimitiveStyle::with_fill(self.fill);

        for index in 0..self.slot_count() {
            let center = self.slot_center(index);
            Circle::with_center(center, SLOT_DIAMETER)
                .into_styled(slot_style)
                .draw(display)?;

            if self.is_slot_filled(index) {
                Circle::with_center(center, FILL_DIAMETER)
                    .into_styled(fill_style)
                    .draw(display)?;
            }
        }
        Ok(())
    }

    fn bounds(&self) -> Rectangle {
        self.bounds
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
