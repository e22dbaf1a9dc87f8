//! Angle math for the rotary dial.
//!
//! All angles are in screen space: 0° points along +x (3 o'clock) and angles
//! grow clockwise, because the display's y axis points down. This matches
//! `atan2(dy, dx)` on raw touch coordinates as well as embedded-graphics'
//! arc angles, so the tracker and the renderer share one convention.
//!
//! # Dial layout
//!
//! ```text
//!               4   3
//!          5             2
//!        6        +        1     340°
//!          7             .       40° (index dot, on the finger stop)
//!             8   9   0          70°
//! ```
//!
//! Digit 0 sits at 70° and the remaining digits follow counter-clockwise in
//! 30° steps down to digit 1 at 340°. The gap between digit 1 and digit 0
//! holds the finger stop.

use micromath::F32;

/// Number of digit positions on the dial.
pub const DIGIT_COUNT: usize = 10;

/// Angular distance between neighbouring digits, in degrees.
pub const DIGIT_STEP_DEG: f32 = 30.0;

/// Rest angle of digit 0, the first position of the layout, in degrees.
pub const FIRST_DIGIT_ANGLE_DEG: f32 = 70.0;

/// Arc leading up to digit 0 that the finger stop is carved from, in degrees.
pub const FINGER_STOP_ARC_DEG: f32 = 50.0;

/// Margin trimmed from both ends of the finger stop arc, in degrees.
pub const FINGER_STOP_MARGIN_DEG: f32 = 14.4;

/// A numbered position on the dial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialDigit {
    /// Digit value, 0-9
    pub value: u8,
    /// Rest position on the digit circle, in radians
    pub angle_rad: f32,
}

impl DialDigit {
    pub fn angle_deg(&self) -> f32 {
        self.angle_rad.to_degrees()
    }
}

/// Compute the ten digit positions, ordered 0, 9, 8, ..., 1.
pub fn digit_layout() -> [DialDigit; DIGIT_COUNT] {
    core::array::from_fn(|index| {
        let value = if index == 0 { 0 } else { (DIGIT_COUNT - index) as u8 };
        let angle_deg = FIRST_DIGIT_ANGLE_DEG + index as f32 * DIGIT_STEP_DEG;
        DialDigit {
            value,
            angle_rad: angle_deg.to_radians(),
        }
    })
}

/// Normalize any angle into `[0, 360)`.
pub fn normalize_deg(angle: f32) -> f32 {
    let wrapped = angle % 360.0;
    let wrapped = if wrapped < 0.0 { wrapped + 360.0 } else { wrapped };
    // -0.0 % 360 and tiny negatives can round up to exactly 360.0
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Polar angle of `point` around `center`, in degrees within `(-180, 180]`.
///
/// Returns `None` for a degenerate input (pointer exactly on the center, or
/// any non-finite coordinate). Callers treat `None` as "ignore this event".
pub fn pointer_angle(point: (f32, f32), center: (f32, f32)) -> Option<f32> {
    let dx = point.0 - center.0;
    let dy = point.1 - center.1;

    if dx == 0.0 && dy == 0.0 {
        return None;
    }

    let theta = F32(dy).atan2(F32(dx)).0.to_degrees();
    if !theta.is_finite() {
        return None;
    }

    // Keep the documented half-open range; -180 and 180 are the same ray.
    Some(if theta <= -180.0 { theta + 360.0 } else { theta })
}

/// Clockwise travel from `reference` to `theta`, in `[0, 360)`.
pub fn angular_travel(reference: f32, theta: f32) -> f32 {
    normalize_deg(theta - reference)
}

/// Convert clockwise travel into the digit it dials.
///
/// Each full step of travel past the first one counts one more position
/// toward 0: `round(travel / step) - 1`. Counts of ten or more wrap to 0 and
/// counts below zero (a press less than half a step before the stop) clamp to 0 as well,
/// so every travel yields a digit in `0..=9`.
pub fn resolve_digit(travel: f32) -> u8 {
    let steps = F32(travel / DIGIT_STEP_DEG).round().0 as i32 - 1;
    if (0..=9).contains(&steps) { steps as u8 } else { 0 }
}

/// The dial's finger stop: a fixed arc of absolute pointer angles.
///
/// Reaching it during a drag ends the dialing motion and commits a digit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FingerStop {
    /// First angle of the stop, in `[0, 360)`
    pub start_deg: f32,
    /// Last angle of the stop, in `[0, 360)`
    pub end_deg: f32,
}

impl FingerStop {
    /// Derive the stop from a digit layout: the [`FINGER_STOP_ARC_DEG`] arc
    /// ending at the first digit, shrunk by [`FINGER_STOP_MARGIN_DEG`] on
    /// both sides.
    pub fn from_layout(digits: &[DialDigit; DIGIT_COUNT]) -> Self {
        let first = normalize_deg(digits[0].angle_deg());

        Self {
            start_deg: normalize_deg(first - FINGER_STOP_ARC_DEG + FINGER_STOP_MARGIN_DEG),
            end_deg: normalize_deg(first - FINGER_STOP_MARGIN_DEG),
        }
    }

    /// Whether the pointer angle `theta` lies on the stop (bounds inclusive).
    pub fn contains(&self, theta: f32) -> bool {
        let theta = normalize_deg(theta);
        if self.start_deg <= self.end_deg {
            theta >= self.start_deg && theta <= self.end_deg
        } else {
            theta >= self.start_deg || theta <= self.end_deg
        }
    }

    /// Angle halfway through the stop.
    pub fn center_deg(&self) -> f32 {
        let span = normalize_deg(self.end_deg - self.start_deg);
        normalize_deg(self.start_deg + span / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: (f32, f32) = (100.0, 100.0);

    fn point_at(angle_deg: f32, radius: f32) -> (f32, f32) {
        let rad = angle_deg.to_radians();
        (CENTER.0 + radius * rad.cos(), CENTER.1 + radius * rad.sin())
    }

    #[test]
    fn test_layout_order_and_spacing() {
        let digits = digit_layout();
        let values: std::vec::Vec<u8> = digits.iter().map(|d| d.value).collect();
        assert_eq!(values, [0, 9, 8, 7, 6, 5, 4, 3, 2, 1]);

        assert!((digits[0].angle_deg() - 70.0).abs() < 1e-3);
        assert!((digits[9].angle_deg() - 340.0).abs() < 1e-3);
        for pair in digits.windows(2) {
            let step = pair[1].angle_deg() - pair[0].angle_deg();
            assert!((step - DIGIT_STEP_DEG).abs() < 1e-3);
        }
    }

    #[test]
    fn test_pointer_at_center_is_ignored() {
        assert_eq!(pointer_angle(CENTER, CENTER), None);
        assert_eq!(pointer_angle((f32::NAN, 3.0), CENTER), None);
    }

    #[test]
    fn test_pointer_angle_quadrants() {
        let right = pointer_angle((150.0, 100.0), CENTER).unwrap();
        let down = pointer_angle((100.0, 150.0), CENTER).unwrap();
        let left = pointer_angle((50.0, 100.0), CENTER).unwrap();
        let up = pointer_angle((100.0, 50.0), CENTER).unwrap();

        assert!(right.abs() < 0.5);
        assert!((down - 90.0).abs() < 0.5);
        assert!((left - 180.0).abs() < 0.5 || (left + 180.0).abs() < 0.5);
        assert!(left > -180.0 && left <= 180.0);
        assert!((up + 90.0).abs() < 0.5);
    }

    #[test]
    fn test_travel_is_clockwise_and_normalized() {
        assert!((angular_travel(-20.0, 40.0) - 60.0).abs() < 1e-4);
        assert!((angular_travel(100.0, 40.0) - 300.0).abs() < 1e-4);
        assert_eq!(angular_travel(45.0, 45.0), 0.0);
        for step in 0..720 {
            let t = angular_travel(170.0, -180.0 + step as f32 * 0.5);
            assert!((0.0..360.0).contains(&t));
        }
    }

    #[test]
    fn test_resolve_digit_covers_full_circle() {
        let mut travel = 0.0;
        while travel < 360.0 {
            let first = resolve_digit(travel);
            assert!(first <= 9, "travel {travel} gave {first}");
            assert_eq!(first, resolve_digit(travel), "not deterministic at {travel}");
            travel += 0.25;
        }
    }

    #[test]
    fn test_resolve_digit_wraps_past_nine() {
        assert_eq!(resolve_digit(60.0), 1);
        assert_eq!(resolve_digit(90.0), 2);
        assert_eq!(resolve_digit(300.0), 9);
        assert_eq!(resolve_digit(330.0), 0);
        assert_eq!(resolve_digit(355.0), 0);
        assert_eq!(resolve_digit(3.0), 0);
    }

    #[test]
    fn test_finger_stop_bounds() {
        let stop = FingerStop::from_layout(&digit_layout());
        assert!((stop.start_deg - 34.4).abs() < 1e-3);
        assert!((stop.end_deg - 55.6).abs() < 1e-3);
        assert!(stop.contains(45.0));
        assert!(stop.contains(34.4 + 1e-3));
        assert!(!stop.contains(30.0));
        assert!(!stop.contains(60.0));
        assert!(!stop.contains(-20.0));
        assert!((stop.center_deg() - 45.0).abs() < 1e-3);
    }

    #[test]
    fn test_dragging_each_digit_to_the_stop() {
        let digits = digit_layout();
        let stop = FingerStop::from_layout(&digits);

        for digit in digits.iter() {
            let press = pointer_angle(point_at(digit.angle_deg(), 70.0), CENTER).unwrap();
            let reach = pointer_angle(point_at(stop.start_deg + 0.5, 70.0), CENTER).unwrap();
            assert!(stop.contains(reach));

            let travel = angular_travel(press, reach);
            assert_eq!(
                resolve_digit(travel),
                digit.value,
                "digit {} travelled {travel}",
                digit.value
            );
        }
    }
}
