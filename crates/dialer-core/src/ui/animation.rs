//! Tick-driven animation primitives.
//!
//! Animations here never sleep or spawn tasks. The owner advances them once
//! per frame with the elapsed [`Duration`] and reads back the current value,
//! which keeps the display task cooperative: each frame yields back to the
//! executor between ticks.
//!
//! - [`SpringAnimation`]: damped spring used for the dial's return to rest
//! - [`ColorSequence`]: scripted list of color keyframes for indicator flashes
//! - [`Easing`]: curves applied to keyframe progress
//!
//! # Cancellation
//!
//! Both animation types are plain values. Dropping one (or replacing it) is
//! cancellation; [`ColorSequence::cancel`] additionally freezes a sequence on
//! its current color so the owner can keep drawing it.

use embassy_time::Duration;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use heapless::Vec;
use micromath::F32;
use serde::{Deserialize, Serialize};

// =============================================================================
// Spring Constants
// =============================================================================

/// Damping ratio of a "low bouncy" spring: a single small overshoot.
pub const DAMPING_RATIO_LOW_BOUNCY: f32 = 0.75;

/// Stiffness of a "low" spring: slow, relaxed motion.
pub const STIFFNESS_LOW: f32 = 200.0;

/// Largest integration step. Larger frame deltas are split into sub-steps so
/// the integration stays stable when a frame is late.
const MAX_STEP_SECS: f32 = 0.004;

/// Distance from target (in value units) under which a spring may settle.
const SETTLE_DISTANCE: f32 = 0.1;

/// Speed (value units per second) under which a spring may settle.
const SETTLE_VELOCITY: f32 = 1.0;

/// Maximum number of keyframes in a [`ColorSequence`].
pub const MAX_KEYFRAMES: usize = 8;

// =============================================================================
// Easing
// =============================================================================

/// Easing curve applied to normalized keyframe progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    /// Fast start, gentle stop
    EaseOutCubic,
    /// Gentle start and stop
    EaseInOutCubic,
}

impl Easing {
    /// Map progress `t` in `[0, 1]` onto the curve. Input is clamped.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOutCubic => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u * u / 2.0
                }
            }
        }
    }
}

/// Fraction of `duration` covered by `elapsed`, clamped to `[0, 1]`.
///
/// A zero duration is always complete.
fn progress(elapsed: Duration, duration: Duration) -> f32 {
    let total = duration.as_micros();
    if total == 0 {
        return 1.0;
    }
    (elapsed.as_micros() as f32 / total as f32).min(1.0)
}

fn abs(value: f32) -> f32 {
    F32(value).abs().0
}

// =============================================================================
// Spring
// =============================================================================

/// Physical parameters of a damped spring (unit mass).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringParams {
    /// 1.0 is critically damped; below 1.0 overshoots
    pub damping_ratio: f32,
    /// Spring constant; higher is faster
    pub stiffness: f32,
}

impl SpringParams {
    /// Slightly bouncy, relaxed spring used to return the dial to rest.
    pub const fn low_bouncy() -> Self {
        Self {
            damping_ratio: DAMPING_RATIO_LOW_BOUNCY,
            stiffness: STIFFNESS_LOW,
        }
    }

    /// Both parameters must be finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.damping_ratio.is_finite()
            && self.stiffness.is_finite()
            && self.damping_ratio > 0.0
            && self.stiffness > 0.0
    }
}

impl Default for SpringParams {
    fn default() -> Self {
        Self::low_bouncy()
    }
}

/// A value pulled toward a target by a damped spring.
///
/// Integrated with semi-implicit Euler in sub-steps of at most 4 ms. Once the
/// value is close to the target and nearly still, it snaps exactly onto the
/// target and reports settled.
#[derive(Debug, Clone, Copy)]
pub struct SpringAnimation {
    value: f32,
    velocity: f32,
    target: f32,
    stiffness: f32,
    damping: f32,
    settled: bool,
}

impl SpringAnimation {
    pub fn new(from: f32, target: f32, params: SpringParams) -> Self {
        let damping = 2.0 * params.damping_ratio * F32(params.stiffness).sqrt().0;
        Self {
            value: from,
            velocity: 0.0,
            target,
            stiffness: params.stiffness,
            damping,
            settled: abs(from - target) < SETTLE_DISTANCE,
        }
        .snapped_if_settled()
    }

    fn snapped_if_settled(mut self) -> Self {
        if self.settled {
            self.value = self.target;
        }
        self
    }

    /// Advance by `dt` and return the new value.
    pub fn advance(&mut self, dt: Duration) -> f32 {
        if self.settled {
            return self.value;
        }

        let mut remaining = dt.as_micros() as f32 / 1_000_000.0;
        while remaining > 0.0 {
            let step = remaining.min(MAX_STEP_SECS);
            let displacement = self.value - self.target;
            let acceleration = -self.stiffness * displacement - self.damping * self.velocity;
            self.velocity += acceleration * step;
            self.value += self.velocity * step;
            remaining -= step;
        }

        if abs(self.value - self.target) < SETTLE_DISTANCE && abs(self.velocity) < SETTLE_VELOCITY
        {
            self.value = self.target;
            self.velocity = 0.0;
            self.settled = true;
        }

        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }
}

// =============================================================================
// Color Sequence
// =============================================================================

/// One step of a [`ColorSequence`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorKeyframe {
    pub target: Rgb565,
    pub duration: Duration,
    pub easing: Easing,
}

impl ColorKeyframe {
    /// Interpolate to `target` over `duration_ms`.
    pub const fn tween(target: Rgb565, duration_ms: u64, easing: Easing) -> Self {
        Self {
            target,
            duration: Duration::from_millis(duration_ms),
            easing,
        }
    }

    /// Jump straight to `target` on the next tick.
    pub const fn snap(target: Rgb565) -> Self {
        Self {
            target,
            duration: Duration::from_ticks(0),
            easing: Easing::Linear,
        }
    }
}

/// A scripted run of color keyframes played one after another.
///
/// Completing a keyframe consumes the tick that completed it: the exact
/// keyframe color is always the value for that frame, and leftover time is
/// not carried into the next keyframe.
#[derive(Debug, Clone)]
pub struct ColorSequence {
    keyframes: Vec<ColorKeyframe, MAX_KEYFRAMES>,
    index: usize,
    start: Rgb565,
    current: Rgb565,
    elapsed: Duration,
}

impl ColorSequence {
    /// Start a sequence from `from`. Keyframes past [`MAX_KEYFRAMES`] are dropped.
    pub fn new(from: Rgb565, keyframes: &[ColorKeyframe]) -> Self {
        let mut frames = Vec::new();
        for frame in keyframes {
            if frames.push(*frame).is_err() {
                log::warn!("Color sequence truncated to {} keyframes", MAX_KEYFRAMES);
                break;
            }
        }

        Self {
            keyframes: frames,
            index: 0,
            start: from,
            current: from,
            elapsed: Duration::from_ticks(0),
        }
    }

    /// Color for the current frame.
    pub fn current(&self) -> Rgb565 {
        self.current
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.keyframes.len()
    }

    /// Stop on the current color. Later calls to [`advance`](Self::advance)
    /// return it unchanged.
    pub fn cancel(&mut self) {
        self.index = self.keyframes.len();
    }

    /// Advance by `dt` and return the color for this frame.
    pub fn advance(&mut self, dt: Duration) -> Rgb565 {
        let Some(frame) = self.keyframes.get(self.index).copied() else {
            return self.current;
        };

        self.elapsed += dt;
        let t = progress(self.elapsed, frame.duration);

        if t >= 1.0 {
            self.current = frame.target;
            self.start = frame.target;
            self.index += 1;
            self.elapsed = Duration::from_ticks(0);
        } else {
            self.current = lerp_rgb565(self.start, frame.target, frame.easing.apply(t));
        }

        self.current
    }
}

// =============================================================================
// Color Interpolation
// =============================================================================

/// Linear interpolation between two RGB565 colors, channel by channel.
///
/// `t` is clamped to `[0, 1]`; `t == 0` yields `from` and `t == 1` yields `to`.
pub fn lerp_rgb565(from: Rgb565, to: Rgb565, t: f32) -> Rgb565 {
    let t = t.clamp(0.0, 1.0);

    let channel = |a: u8, b: u8| -> u8 {
        let a = a as f32;
        let b = b as f32;
        F32(a + (b - a) * t).round().0 as u8
    };

    Rgb565::new(
        channel(from.r(), to.r()),
        channel(from.g(), to.g()),
        channel(from.b(), to.b()),
    )
}
