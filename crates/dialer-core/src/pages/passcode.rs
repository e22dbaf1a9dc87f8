//! Passcode page
//!
//! The only screen of the dialer. Title and indicator on the left, rotary
//! dial on the right:
//!
//! ```text
//! ┌────────────────────────────────────┐
//! │ ENTER         .-""""-.             │
//! │ PASSCODE    /  4  3   \            │
//! │            | 5       2 |           │
//! │ ● ● ○ ○    | 6   ●   1 |           │
//! │            | 7       . |           │
//! │             \ 8  9  0 /            │
//! │ hint          '-....-'             │
//! └────────────────────────────────────┘
//! ```
//!
//! Digits from the dial are appended to the entry buffer and shown by the
//! indicator. When the indicator finishes its verdict flash the buffer is
//! cleared and the page reports [`Action::PasscodeAccepted`] or
//! [`Action::PasscodeRejected`].

use embassy_time::Duration;
use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_10X20};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use heapless::String;
use log::{debug, info};

use crate::config::{ConfigError, DialerConfig, MAX_PASSCODE_LEN};
use crate::pages::Page;
use crate::ui::components::{PasscodeIndicator, RotaryDial, Verdict};
use crate::ui::core::{Action, Drawable, PageId, TouchEvent, TouchResult, Touchable};
use crate::ui::styling::DialerPalette;

/// Distance from the screen edges to the content.
const MARGIN_PX: i32 = 8;

/// Diameter of the rotary dial.
const DIAL_SIZE_PX: u32 = 224;

const TITLE_TOP_PX: i32 = 40;
const TITLE_LINE_PX: i32 = 22;
const INDICATOR_TOP_PX: i32 = 100;
const HINT_TOP_PX: i32 = 200;
const HINT_LINE_PX: i32 = 12;

const TITLE_LINES: [&str; 2] = ["ENTER", "PASSCODE"];
const HINT_LINES: [&str; 2] = ["Drag a digit", "to the stop"];

pub struct PasscodePage {
    bounds: Rectangle,
    dial: RotaryDial,
    indicator: PasscodeIndicator,
    entry: String<MAX_PASSCODE_LEN>,
    passcode_len: usize,
    palette: DialerPalette,
    /// Background and static text need repainting
    dirty: bool,
}

impl PasscodePage {
    /// Build the page for `config` inside `bounds`.
    pub fn new(bounds: Rectangle, config: &DialerConfig<'_>) -> Result<Self, ConfigError> {
        config.validate()?;

        let palette = DialerPalette::default();
        let top_left = bounds.top_left;

        let dial_bounds = Rectangle::new(
            Point::new(
                top_left.x + bounds.size.width as i32 - MARGIN_PX - DIAL_SIZE_PX as i32,
                top_left.y + (bounds.size.height as i32 - DIAL_SIZE_PX as i32) / 2,
            ),
            Size::new_equal(DIAL_SIZE_PX),
        );
        let dial = RotaryDial::new(dial_bounds)
            .with_spring(config.return_spring)
            .with_palette(palette);

        let indicator = PasscodeIndicator::new(
            top_left + Point::new(MARGIN_PX, INDICATOR_TOP_PX),
            config.passcode,
        )
        .with_palette(palette);

        info!(
            "Passcode page ready: {} digits, dial at {:?}",
            config.passcode.len(),
            dial_bounds.top_left
        );

        Ok(Self {
            bounds,
            dial,
            indicator,
            entry: String::new(),
            passcode_len: config.passcode.len(),
            palette,
            dirty: true,
        })
    }

    /// Digits entered so far.
    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn dial(&self) -> &RotaryDial {
        &self.dial
    }

    pub fn indicator(&self) -> &PasscodeIndicator {
        &self.indicator
    }

    /// Append a dialed digit unless the entry is full or being verified.
    fn enter_digit(&mut self, digit: u8) -> bool {
        if self.entry.len() >= self.passcode_len || self.indicator.is_verifying() {
            debug!("Ignoring digit {} while the entry is verified", digit);
            return false;
        }

        if self.entry.push(char::from(b'0' + digit)).is_err() {
            return false;
        }
        debug!("Entry now has {} digits", self.entry.len());
        self.indicator.set_entry(&self.entry);
        true
    }

    fn finish_entry(&mut self, verdict: Verdict) -> Action {
        self.entry.clear();
        self.indicator.set_entry(&self.entry);

        match verdict {
            Verdict::Accepted => {
                info!("Passcode accepted");
                Action::PasscodeAccepted
            }
            Verdict::Rejected => {
                info!("Passcode rejected");
                Action::PasscodeRejected
            }
        }
    }

    fn draw_text<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        let origin = self.bounds.top_left;

        let title_style = MonoTextStyle::new(&FONT_10X20, self.palette.text_primary);
        for (line, text) in TITLE_LINES.iter().enumerate() {
            let position = origin + Point::new(MARGIN_PX, TITLE_TOP_PX + line as i32 * TITLE_LINE_PX);
            Text::with_baseline(text, position, title_style, Baseline::Top).draw(display)?;
        }

        let hint_style = MonoTextStyle::new(&FONT_6X10, self.palette.text_secondary);
        for (line, text) in HINT_LINES.iter().enumerate() {
            let position = origin + Point::new(MARGIN_PX, HINT_TOP_PX + line as i32 * HINT_LINE_PX);
            Text::with_baseline(text, position, hint_style, Baseline::Top).draw(display)?;
        }
        Ok(())
    }

    fn clear_area<D: DrawTarget<Color = Rgb565>>(
        &self,
        display: &mut D,
        area: Rectangle,
    ) -> Result<(), D::Error> {
        area.into_styled(PrimitiveStyle::with_fill(self.palette.background))
            .draw(display)
    }
}

impl Page for PasscodePage {
    fn id(&self) -> PageId {
        PageId::Passcode
    }

    fn title(&self) -> &str {
        "Passcode"
    }

    fn on_activate(&mut self) {
        self.dirty = true;
    }

    fn handle_touch(&mut self, event: TouchEvent) -> Option<Action> {
        match self.dial.handle_touch(event) {
            TouchResult::Action(Action::DigitEntered(digit)) => self
                .enter_digit(digit)
                .then_some(Action::DigitEntered(digit)),
            TouchResult::Action(other) => Some(other),
            TouchResult::Handled | TouchResult::NotHandled => None,
        }
    }

    fn update(&mut self, dt: Duration) -> Option<Action> {
        self.dial.update(dt);
        let verdict = self.indicator.update(dt)?;
        Some(self.finish_entry(verdict))
    }

    fn draw_page<D: DrawTarget<Color = Rgb565>>(
        &mut self,
        display: &mut D,
    ) -> Result<(), D::Error> {
        let full = self.dirty;

        if full {
            self.clear_area(display, self.bounds)?;
            self.draw_text(display)?;
        }

        if full || self.indicator.is_dirty() {
            if !full {
                self.clear_area(display, self.indicator.bounds())?;
            }
            self.indicator.draw(display)?;
        }

        if full || self.dial.is_dirty() {
            if !full {
                self.clear_area(display, self.dial.bounds())?;
            }
            self.dial.draw(display)?;
        }

        Ok(())
    }

    fn bounds(&self) -> Rectangle {
        self.bounds
    }

    fn is_dirty(&self) -> bool {
        self.dirty || self.dial.is_dirty() || self.indicator.is_dirty()
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
        self.dial.mark_clean();
        self.indicator.mark_clean();
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::FrameBuffer;
    use crate::ui::components::DialPhase;
    use crate::ui::components::rotary_dial::geometry::normalize_deg;
    use crate::ui::core::TouchPoint;
    use crate::ui::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX};

    const FRAME: Duration = Duration::from_millis(16);

    fn screen() -> Rectangle {
        Rectangle::new(
            Point::zero(),
            Size::new(DISPLAY_WIDTH_PX as u32, DISPLAY_HEIGHT_PX as u32),
        )
    }

    fn page(passcode: &str) -> PasscodePage {
        PasscodePage::new(screen(), &DialerConfig::with_passcode(passcode)).unwrap()
    }

    fn touch_at(page: &PasscodePage, angle_deg: f32) -> TouchPoint {
        let geometry = page.dial().geometry();
        let p = geometry.polar(angle_deg, geometry.digit_circle_radius());
        TouchPoint::new(p.x as u16, p.y as u16)
    }

    /// Press `digit`'s well, drag it to the finger stop and let go.
    fn dial_digit(page: &mut PasscodePage, digit: u8) -> std::vec::Vec<Action> {
        let dial = page.dial();
        let start = dial
            .digits()
            .iter()
            .find(|d| d.value == digit)
            .map(|d| d.angle_deg())
            .unwrap();
        let sweep = normalize_deg(dial.finger_stop().center_deg() - start);

        let mut actions = std::vec::Vec::new();
        page.handle_touch(TouchEvent::Press(touch_at(page, start)));
        let mut offset = 5.0;
        while offset <= sweep {
            let point = touch_at(page, start + offset);
            actions.extend(page.handle_touch(TouchEvent::Drag(point)));
            offset += 5.0;
        }
        let end = touch_at(page, start + sweep);
        actions.extend(page.handle_touch(TouchEvent::Release(end)));
        actions
    }

    /// Tick until the dial rests and no verdict is pending.
    fn settle(page: &mut PasscodePage) -> std::vec::Vec<Action> {
        let mut actions = std::vec::Vec::new();
        for _ in 0..500 {
            actions.extend(page.update(FRAME));
            if page.dial().phase() == DialPhase::Idle && !page.indicator().is_verifying() {
                break;
            }
        }
        actions
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(matches!(
            PasscodePage::new(screen(), &DialerConfig::with_passcode("12x")),
            Err(ConfigError::NonDigit { index: 2, .. })
        ));
    }

    #[test]
    fn test_correct_passcode_is_accepted_once() {
        let mut page = page("1357");
        let mut completed = std::vec::Vec::new();

        for digit in [1, 3, 5, 7] {
            assert_eq!(dial_digit(&mut page, digit), [Action::DigitEntered(digit)]);
            completed.extend(settle(&mut page));
        }

        assert_eq!(completed, [Action::PasscodeAccepted]);
        assert_eq!(page.entry(), "");
        assert!(!page.indicator().is_slot_filled(0));
    }

    #[test]
    fn test_wrong_passcode_flashes_red_twice() {
        let mut page = page("1357");
        for digit in [1, 2, 5] {
            dial_digit(&mut page, digit);
            settle(&mut page);
        }
        assert_eq!(page.entry(), "125");
        dial_digit(&mut page, 7);

        let red = DialerPalette::default().fill_failure;
        let mut colors = std::vec::Vec::new();
        let mut completed = std::vec::Vec::new();
        for _ in 0..200 {
            completed.extend(page.update(FRAME));
            colors.push(page.indicator().fill_color());
        }

        assert_eq!(completed, [Action::PasscodeRejected]);
        let flashes = colors
            .windows(2)
            .filter(|pair| pair[0] != red && pair[1] == red)
            .count();
        assert_eq!(flashes, 2);
        assert_eq!(page.entry(), "");
    }

    #[test]
    fn test_digits_ignored_while_verifying() {
        let mut page = page("1357");
        for digit in [1, 2, 5] {
            dial_digit(&mut page, digit);
            settle(&mut page);
        }
        dial_digit(&mut page, 7);
        assert_eq!(page.entry(), "1257");

        // The dial still turns, but the digit is dropped
        assert!(dial_digit(&mut page, 9).is_empty());
        assert_eq!(page.entry(), "1257");

        // Once the verdict is out, input is accepted again
        assert_eq!(settle(&mut page), [Action::PasscodeRejected]);
        assert_eq!(dial_digit(&mut page, 4), [Action::DigitEntered(4)]);
        assert_eq!(page.entry(), "4");
    }

    #[test]
    fn test_touch_outside_dial_does_nothing() {
        let mut page = page("1357");
        assert_eq!(
            page.handle_touch(TouchEvent::Press(TouchPoint::new(20, 20))),
            None
        );
        assert_eq!(page.dial().phase(), DialPhase::Idle);
    }

    #[test]
    fn test_partial_redraw_after_full_draw() {
        let mut page = page("1357");
        let mut fb = FrameBuffer::new();

        assert!(page.is_dirty());
        page.draw_page(&mut fb).unwrap();
        page.mark_clean();
        assert!(!page.is_dirty());

        // Background is painted edge to edge
        let palette = DialerPalette::default();
        assert_eq!(fb.pixel(0, 0), Some(palette.background));

        dial_digit(&mut page, 1);
        assert!(page.is_dirty());
        page.draw_page(&mut fb).unwrap();
        page.mark_clean();

        let first_slot = page.indicator().bounds().top_left + Point::new(8, 8);
        assert_eq!(fb.pixel(first_slot.x, first_slot.y), Some(palette.fill_neutral));
    }
}
