//! Dial rendering.
//!
//! Drawing is a pure function of the dial geometry, the digit layout, the
//! current rotation and the palette. Layers are painted back to front:
//!
//! 1. face disc (rotated)
//! 2. rim ring with round end caps (rotated)
//! 3. finger wells punched through the rim in the page background (rotated)
//! 4. digit labels, centered on each well's rest position (fixed)
//! 5. index dot one step past digit 1 (fixed)
//! 6. hub disc (fixed)
//!
//! embedded-graphics has no rotation transform, so "rotated" layers are
//! drawn by adding the rotation to every polar angle before projecting.

use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::geometry::Angle;
use embedded_graphics::mono_font::{MonoTextStyle, ascii::FONT_10X20};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{
    Arc, Circle, PrimitiveStyle, PrimitiveStyleBuilder, Rectangle, StrokeAlignment,
};
use embedded_graphics::text::renderer::TextRenderer;
use embedded_graphics::text::{Baseline, Text};
use micromath::F32;

use super::geometry::{
    DIGIT_COUNT, DIGIT_STEP_DEG, DialDigit, FIRST_DIGIT_ANGLE_DEG, normalize_deg,
};
use crate::ui::styling::DialerPalette;

/// Digit circle radius as a fraction of the dial radius.
const DIGIT_CIRCLE_RATIO: f32 = 0.70;

/// Finger well radius as a fraction of the dial radius.
const WELL_RADIUS_RATIO: f32 = 0.15;

/// Rim stroke width as a fraction of the dial radius.
const RIM_WIDTH_RATIO: f32 = 0.42;

/// Hub radius as a fraction of the dial radius.
const HUB_RADIUS_RATIO: f32 = 1.0 / 2.4;

/// Index dot radius as a fraction of the dial radius.
const DOT_RADIUS_RATIO: f32 = 0.05;

/// Outward nudge of the index dot (right and up) as a fraction of the radius.
const DOT_OFFSET_RATIO: f32 = 0.02;

/// Pixel geometry of a dial placed inside a bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialGeometry {
    pub center: Point,
    pub radius: f32,
}

impl DialGeometry {
    /// Largest dial that fits `bounds`, centered in it.
    pub fn from_bounds(bounds: Rectangle) -> Self {
        let diameter = bounds.size.width.min(bounds.size.height);
        Self {
            center: bounds.center(),
            radius: diameter as f32 / 2.0,
        }
    }

    /// Center as floating-point coordinates for the angle tracker.
    pub fn center_f32(&self) -> (f32, f32) {
        (self.center.x as f32, self.center.y as f32)
    }

    pub fn digit_circle_radius(&self) -> f32 {
        self.radius * DIGIT_CIRCLE_RATIO
    }

    pub fn well_radius(&self) -> f32 {
        self.radius * WELL_RADIUS_RATIO
    }

    pub fn rim_width(&self) -> u32 {
        round_px(self.radius * RIM_WIDTH_RATIO) as u32
    }

    pub fn hub_radius(&self) -> f32 {
        self.radius * HUB_RADIUS_RATIO
    }

    pub fn dot_radius(&self) -> f32 {
        self.radius * DOT_RADIUS_RATIO
    }

    /// Whether a screen point lies on the dial face.
    pub fn contains(&self, point: Point) -> bool {
        let dx = (point.x - self.center.x) as f32;
        let dy = (point.y - self.center.y) as f32;
        dx * dx + dy * dy <= self.radius * self.radius
    }

    /// Project a polar coordinate around the center onto the screen.
    pub fn polar(&self, angle_deg: f32, distance: f32) -> Point {
        let rad = angle_deg.to_radians();
        let x = self.center.x as f32 + distance * F32(rad).cos().0;
        let y = self.center.y as f32 + distance * F32(rad).sin().0;
        Point::new(round_px(x), round_px(y))
    }

    /// Screen position of the index dot.
    pub fn index_dot_center(&self) -> Point {
        let angle = FIRST_DIGIT_ANGLE_DEG + (DIGIT_COUNT + 1) as f32 * DIGIT_STEP_DEG;
        let nudge = round_px(self.radius * DOT_OFFSET_RATIO);
        self.polar(angle, self.digit_circle_radius()) + Point::new(nudge, -nudge)
    }
}

fn round_px(value: f32) -> i32 {
    F32(value).round().0 as i32
}

fn diameter(radius: f32) -> u32 {
    round_px(radius * 2.0).max(1) as u32
}

fn fill_circle<D>(display: &mut D, center: Point, radius: f32, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    Circle::with_center(center, diameter(radius))
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(display)?;
    Ok(())
}

/// Draw `label` so its measured bounding box is centered on `center`.
fn draw_centered_label<D>(
    display: &mut D,
    label: &str,
    center: Point,
    style: MonoTextStyle<'_, Rgb565>,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let bbox = style
        .measure_string(label, Point::zero(), Baseline::Top)
        .bounding_box;
    let top_left = center
        - Point::new(
            bbox.size.width as i32 / 2,
            bbox.size.height as i32 / 2,
        )
        - bbox.top_left;

    Text::with_baseline(label, top_left, style, Baseline::Top).draw(display)?;
    Ok(())
}

/// Paint the whole dial for the given rotation (degrees, clockwise).
pub fn draw_dial<D>(
    display: &mut D,
    geometry: &DialGeometry,
    digits: &[DialDigit; DIGIT_COUNT],
    rotation_deg: f32,
    palette: &DialerPalette,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let digit_radius = geometry.digit_circle_radius();

    // Face
    fill_circle(display, geometry.center, geometry.radius, palette.face)?;

    // Rim: from the first digit clockwise through the last one
    let rim_start = normalize_deg(digits[0].angle_deg() + rotation_deg);
    let rim_sweep = DIGIT_STEP_DEG * (DIGIT_COUNT - 1) as f32;
    let rim_width = geometry.rim_width();
    let rim_style = PrimitiveStyleBuilder::new()
        .stroke_color(palette.rim)
        .stroke_width(rim_width)
        .stroke_alignment(StrokeAlignment::Center)
        .build();
    Arc::with_center(
        geometry.center,
        diameter(digit_radius),
        Angle::from_degrees(rim_start),
        Angle::from_degrees(rim_sweep),
    )
    .into_styled(rim_style)
    .draw(display)?;

    let cap_radius = rim_width as f32 / 2.0;
    for cap_angle in [rim_start, rim_start + rim_sweep] {
        fill_circle(
            display,
            geometry.polar(cap_angle, digit_radius),
            cap_radius,
            palette.rim,
        )?;
    }

    // Wells
    for digit in digits {
        let center = geometry.polar(digit.angle_deg() + rotation_deg, digit_radius);
        fill_circle(display, center, geometry.well_radius(), palette.background)?;
    }

    // Labels stay put while the face turns over them
    let label_style = MonoTextStyle::new(&FONT_10X20, palette.label);
    for digit in digits {
        let mut buf = [0u8; 4];
        let label = char::from(b'0' + digit.value).encode_utf8(&mut buf);
        let center = geometry.polar(digit.angle_deg(), digit_radius);
        draw_centered_label(display, label, center, label_style)?;
    }

    fill_circle(
        display,
        geometry.index_dot_center(),
        geometry.dot_radius(),
        palette.label,
    )?;

    // Hub last, on top of everything
    fill_circle(display, geometry.center, geometry.hub_radius(), palette.hub)?;

    Ok(())
}
