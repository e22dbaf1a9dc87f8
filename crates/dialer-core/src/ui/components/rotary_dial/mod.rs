// src/ui/components/rotary_dial/mod.rs
//! Rotary dial component
//!
//! A touch-driven rotary phone dial. The user presses a finger well, drags
//! it clockwise to the finger stop, and the dial reports how many positions
//! were travelled as a digit. On release the face springs back to rest.
//!
//! # Gesture states
//!
//! ```text
//!             press                 release
//!   Idle ───────────────▶ Dragging ─────────▶ Returning ──(settled)──▶ Idle
//!     ▲                      ▲                    │
//!     │                      └───── press ────────┘
//! ```
//!
//! - **Dragging** follows the finger until it reaches the finger stop, where
//!   exactly one digit is committed. Later moves in the same gesture are
//!   ignored.
//! - **Returning** owns the return spring. Because the spring lives inside
//!   the state, a press that replaces the state cancels it: the drag and the
//!   spring can never write the rotation in the same frame.
//!
//! The reference angle of a gesture is captured relative to the current
//! rotation, so catching the dial mid-return continues from where the face
//! is instead of jumping, and the digit count stays relative to rest. A face
//! caught while the spring overshoots past rest is held at rest first, since
//! rotation only ever runs clockwise from zero.

pub mod geometry;
pub mod render;

use embassy_time::Duration;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::{debug, info};

use crate::ui::animation::{SpringAnimation, SpringParams};
use crate::ui::core::{Action, Drawable, TouchEvent, TouchPoint, TouchResult, Touchable};
use crate::ui::styling::DialerPalette;
use geometry::{
    DIGIT_COUNT, DialDigit, FingerStop, angular_travel, digit_layout, pointer_angle,
    resolve_digit,
};
use render::{DialGeometry, draw_dial};

/// Rotation below which a released dial is considered already at rest.
const REST_EPSILON_DEG: f32 = 0.01;

/// Internal gesture state.
#[derive(Debug, Clone, Copy)]
enum DialState {
    Idle,
    Dragging {
        /// Pointer angle that corresponds to zero rotation for this gesture
        reference_deg: f32,
        /// A digit has been emitted (or the gesture started on the stop)
        committed: bool,
    },
    Returning(SpringAnimation),
}

/// Observable gesture phase, for owners and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialPhase {
    Idle,
    Dragging { committed: bool },
    Returning,
}

/// Rotary dial widget.
///
/// # Examples
/// ```ignore
/// let mut dial = RotaryDial::new(Rectangle::new(Point::new(96, 8), Size::new(224, 224)));
///
/// if let TouchResult::Action(Action::DigitEntered(d)) = dial.handle_touch(event) {
///     entry.push(char::from(b'0' + d)).ok();
/// }
/// dial.update(frame_time);
/// ```
pub struct RotaryDial {
    bounds: Rectangle,
    geometry: DialGeometry,
    digits: [DialDigit; DIGIT_COUNT],
    finger_stop: FingerStop,
    rotation_deg: f32,
    state: DialState,
    spring: SpringParams,
    palette: DialerPalette,
    dirty: bool,
}

impl RotaryDial {
    pub fn new(bounds: Rectangle) -> Self {
        let digits = digit_layout();
        Self {
            bounds,
            geometry: DialGeometry::from_bounds(bounds),
            finger_stop: FingerStop::from_layout(&digits),
            digits,
            rotation_deg: 0.0,
            state: DialState::Idle,
            spring: SpringParams::default(),
            palette: DialerPalette::default(),
            dirty: true,
        }
    }

    /// Set the spring used to return the dial to rest.
    pub fn with_spring(mut self, spring: SpringParams) -> Self {
        self.spring = spring;
        self
    }

    pub fn with_palette(mut self, palette: DialerPalette) -> Self {
        self.palette = palette;
        self.dirty = true;
        self
    }

    /// Current rotation of the face in degrees (clockwise, 0 = rest).
    pub fn rotation(&self) -> f32 {
        self.rotation_deg
    }

    pub fn phase(&self) -> DialPhase {
        match self.state {
            DialState::Idle => DialPhase::Idle,
            DialState::Dragging { committed, .. } => DialPhase::Dragging { committed },
            DialState::Returning(_) => DialPhase::Returning,
        }
    }

    pub fn digits(&self) -> &[DialDigit; DIGIT_COUNT] {
        &self.digits
    }

    pub fn finger_stop(&self) -> FingerStop {
        self.finger_stop
    }

    pub fn geometry(&self) -> DialGeometry {
        self.geometry
    }

    /// Advance the return animation by `dt`.
    ///
    /// Returns `true` if the rotation changed and the dial needs a redraw.
    pub fn update(&mut self, dt: Duration) -> bool {
        let DialState::Returning(mut spring) = self.state else {
            return false;
        };

        let changed = self.set_rotation(spring.advance(dt));
        if spring.is_settled() {
            debug!("Dial settled at rest");
            self.state = DialState::Idle;
        } else {
            self.state = DialState::Returning(spring);
        }
        changed
    }

    fn set_rotation(&mut self, rotation_deg: f32) -> bool {
        if self.rotation_deg == rotation_deg {
            return false;
        }
        self.rotation_deg = rotation_deg;
        self.dirty = true;
        true
    }

    fn angle_of(&self, point: TouchPoint) -> Option<f32> {
        pointer_angle(
            (point.x as f32, point.y as f32),
            self.geometry.center_f32(),
        )
    }

    fn begin_gesture(&mut self, point: TouchPoint) -> TouchResult {
        if !self.contains_point(point) {
            return TouchResult::NotHandled;
        }
        let Some(theta) = self.angle_of(point) else {
            return TouchResult::NotHandled;
        };

        if let DialState::Returning(spring) = self.state {
            debug!(
                "Press cancels return animation at {:.1}° (target {:.1}°)",
                spring.value(),
                spring.target()
            );
            // Travel is measured clockwise in [0, 360); an overshoot below
            // rest would read as almost a full turn.
            self.set_rotation(self.rotation_deg.max(0.0));
        }

        // A gesture that starts on the stop has nowhere to travel.
        let committed = self.finger_stop.contains(theta);
        self.state = DialState::Dragging {
            reference_deg: theta - self.rotation_deg,
            committed,
        };
        debug!(
            "Gesture start at {:.1}° (rotation {:.1}°, inert: {})",
            theta, self.rotation_deg, committed
        );
        TouchResult::Handled
    }

    fn track_gesture(&mut self, point: TouchPoint) -> TouchResult {
        let DialState::Dragging {
            reference_deg,
            committed,
        } = self.state
        else {
            return TouchResult::NotHandled;
        };

        if committed {
            return TouchResult::Handled;
        }
        let Some(theta) = self.angle_of(point) else {
            return TouchResult::Handled;
        };

        let travel = angular_travel(reference_deg, theta);

        if self.finger_stop.contains(theta) {
            self.state = DialState::Dragging {
                reference_deg,
                committed: true,
            };
            let digit = resolve_digit(travel);
            info!("Dialed {} ({:.1}° of travel)", digit, travel);
            return TouchResult::Action(Action::DigitEntered(digit));
        }

        self.set_rotation(travel);
        TouchResult::Handled
    }

    fn end_gesture(&mut self) -> TouchResult {
        if !matches!(self.state, DialState::Dragging { .. }) {
            return TouchResult::NotHandled;
        }

        let spring = SpringAnimation::new(self.rotation_deg, 0.0, self.spring);
        if spring.is_settled() || self.rotation_deg.abs() < REST_EPSILON_DEG {
            self.set_rotation(0.0);
            self.state = DialState::Idle;
        } else {
            debug!("Returning from {:.1}°", self.rotation_deg);
            self.state = DialState::Returning(spring);
        }
        TouchResult::Handled
    }
}

impl Drawable for RotaryDial {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        draw_dial(
            display,
            &self.geometry,
            &self.digits,
            self.rotation_deg,
            &self.palette,
        )
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

impl Touchable for RotaryDial {
    fn contains_point(&self, point: TouchPoint) -> bool {
        self.geometry.contains(point.to_point())
    }

    fn handle_touch(&mut self, event: TouchEvent) -> TouchResult {
        match event {
            TouchEvent::Press(point) => self.begin_gesture(point),
            TouchEvent::Drag(point) => self.track_gesture(point),
            TouchEvent::Release(_) => self.end_gesture(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    fn dial() -> RotaryDial {
        RotaryDial::new(Rectangle::new(Point::new(0, 0), Size::new(224, 224)))
    }

    /// Touch point on the digit circle at `angle_deg`.
    fn at(dial: &RotaryDial, angle_deg: f32) -> TouchPoint {
        let geometry = dial.geometry();
        let p = geometry.polar(angle_deg, geometry.digit_circle_radius());
        TouchPoint::new(p.x as u16, p.y as u16)
    }

    /// Press at `from` and drag clockwise in 5° steps for `sweep` degrees,
    /// collecting every action.
    fn drag(dial: &mut RotaryDial, from: f32, sweep: f32) -> std::vec::Vec<Action> {
        let mut actions = std::vec::Vec::new();
        assert_eq!(dial.handle_touch(TouchEvent::Press(at(dial, from))), TouchResult::Handled);

        let mut offset = 5.0;
        while offset <= sweep {
            if let TouchResult::Action(action) =
                dial.handle_touch(TouchEvent::Drag(at(dial, from + offset)))
            {
                actions.push(action);
            }
            offset += 5.0;
        }
        actions
    }

    fn settle(dial: &mut RotaryDial) {
        for _ in 0..500 {
            dial.update(FRAME);
            if dial.phase() == DialPhase::Idle {
                return;
            }
        }
        panic!("dial did not settle");
    }

    #[test]
    fn test_each_digit_dials_itself() {
        let mut dial = dial();
        let digits = *dial.digits();

        for digit in digits {
            let start = digit.angle_deg();
            let sweep = geometry::normalize_deg(dial.finger_stop().center_deg() - start);
            let actions = drag(&mut dial, start, sweep);
            assert_eq!(
                actions,
                [Action::DigitEntered(digit.value)],
                "dialing {}",
                digit.value
            );

            dial.handle_touch(TouchEvent::Release(at(&dial, start)));
            settle(&mut dial);
        }
    }

    #[test]
    fn test_commit_happens_once_per_gesture() {
        let mut dial = dial();
        // Digit 5 rests at 220°; keep dragging well past the stop.
        let actions = drag(&mut dial, 220.0, 300.0);
        assert_eq!(actions, [Action::DigitEntered(5)]);
        assert_eq!(dial.phase(), DialPhase::Dragging { committed: true });

        let frozen = dial.rotation();
        dial.handle_touch(TouchEvent::Drag(at(&dial, 180.0)));
        assert_eq!(dial.rotation(), frozen);
    }

    #[test]
    fn test_drag_rotates_face() {
        let mut dial = dial();
        let actions = drag(&mut dial, 220.0, 60.0);
        assert!(actions.is_empty());
        assert!((dial.rotation() - 60.0).abs() < 2.0);
        assert!(dial.is_dirty());
    }

    #[test]
    fn test_release_springs_back_to_rest() {
        let mut dial = dial();
        drag(&mut dial, 220.0, 90.0);
        dial.handle_touch(TouchEvent::Release(at(&dial, 310.0)));
        assert_eq!(dial.phase(), DialPhase::Returning);

        assert!(dial.update(FRAME));
        assert!(dial.rotation() < 90.0);

        settle(&mut dial);
        assert_eq!(dial.rotation(), 0.0);
    }

    #[test]
    fn test_press_cancels_return_animation() {
        let mut dial = dial();
        drag(&mut dial, 220.0, 90.0);
        dial.handle_touch(TouchEvent::Release(at(&dial, 310.0)));
        for _ in 0..3 {
            dial.update(FRAME);
        }
        let caught_at = dial.rotation();
        assert!(caught_at > 1.0);

        // Grab the face again mid-flight
        dial.handle_touch(TouchEvent::Press(at(&dial, 200.0)));
        assert_eq!(dial.phase(), DialPhase::Dragging { committed: false });

        // The spring no longer writes the rotation
        assert!(!dial.update(FRAME));
        assert_eq!(dial.rotation(), caught_at);

        // Dragging continues from the caught angle without a jump
        dial.handle_touch(TouchEvent::Drag(at(&dial, 210.0)));
        assert!((dial.rotation() - (caught_at + 10.0)).abs() < 2.0);
    }

    /// Release and tick until the return spring has swung past rest.
    fn overshoot(dial: &mut RotaryDial) {
        drag(dial, 220.0, 90.0);
        dial.handle_touch(TouchEvent::Release(at(dial, 310.0)));
        for _ in 0..500 {
            dial.update(FRAME);
            if dial.rotation() < -0.5 {
                return;
            }
        }
        panic!("return spring never overshot rest");
    }

    #[test]
    fn test_press_during_overshoot_holds_rest() {
        let mut dial = dial();
        overshoot(&mut dial);

        dial.handle_touch(TouchEvent::Press(at(&dial, 200.0)));
        assert_eq!(dial.rotation(), 0.0);

        // Same finger position: no travel, no spin
        dial.handle_touch(TouchEvent::Drag(at(&dial, 200.0)));
        assert!(dial.rotation().abs() < 1.0, "jumped to {}", dial.rotation());

        dial.handle_touch(TouchEvent::Drag(at(&dial, 210.0)));
        assert!((dial.rotation() - 10.0).abs() < 2.0);
    }

    #[test]
    fn test_tap_during_overshoot_comes_to_rest() {
        let mut dial = dial();
        overshoot(&mut dial);

        let p = at(&dial, 200.0);
        dial.handle_touch(TouchEvent::Press(p));
        dial.handle_touch(TouchEvent::Release(p));
        assert_eq!(dial.phase(), DialPhase::Idle);
        assert_eq!(dial.rotation(), 0.0);
    }

    #[test]
    fn test_short_drag_onto_stop_dials_zero() {
        let mut dial = dial();
        // Less than half a step of travel before the stop is reached
        dial.handle_touch(TouchEvent::Press(at(&dial, 26.0)));
        assert_eq!(
            dial.handle_touch(TouchEvent::Drag(at(&dial, 37.0))),
            TouchResult::Action(Action::DigitEntered(0))
        );
    }

    #[test]
    fn test_press_resets_commit_mid_return() {
        let mut dial = dial();
        assert_eq!(drag(&mut dial, 340.0, 60.0), [Action::DigitEntered(1)]);
        dial.handle_touch(TouchEvent::Release(at(&dial, 45.0)));
        dial.update(FRAME);
        assert_eq!(dial.phase(), DialPhase::Returning);

        // A new gesture may commit again even before the dial came to rest
        dial.handle_touch(TouchEvent::Press(at(&dial, 250.0)));
        assert_eq!(dial.phase(), DialPhase::Dragging { committed: false });
    }

    #[test]
    fn test_pointer_on_center_is_ignored() {
        let mut dial = dial();
        let c = dial.geometry().center;
        let center = TouchPoint::new(c.x as u16, c.y as u16);

        assert_eq!(dial.handle_touch(TouchEvent::Press(center)), TouchResult::NotHandled);
        assert_eq!(dial.phase(), DialPhase::Idle);

        dial.handle_touch(TouchEvent::Press(at(&dial, 220.0)));
        assert_eq!(dial.handle_touch(TouchEvent::Drag(center)), TouchResult::Handled);
        assert_eq!(dial.rotation(), 0.0);
    }

    #[test]
    fn test_press_on_finger_stop_is_inert() {
        let mut dial = dial();
        let actions = drag(&mut dial, 45.0, 20.0);
        assert!(actions.is_empty());
        assert_eq!(dial.phase(), DialPhase::Dragging { committed: true });
    }

    #[test]
    fn test_touch_outside_face_is_not_handled() {
        let mut dial = dial();
        let outside = TouchPoint::new(2, 2);
        assert_eq!(dial.handle_touch(TouchEvent::Press(outside)), TouchResult::NotHandled);
        assert_eq!(dial.handle_touch(TouchEvent::Drag(outside)), TouchResult::NotHandled);
        assert_eq!(dial.handle_touch(TouchEvent::Release(outside)), TouchResult::NotHandled);
    }
}
