//! Jump arc geometry.
//!
//! A jump follows a quadratic Bézier curve from the spider's take-off point
//! to its target. The single control point sits above the midpoint of the two
//! and is fixed for the whole jump, so a target that moves mid-flight is not
//! tracked.

use glam::Vec3;

use crate::vector_math::UP;

/// Evaluates `P(t) = (1-t)²·p0 + 2(1-t)t·p1 + t²·p2`.
///
/// `t` is not clamped; callers stop evaluating once a jump completes.
///
/// # Examples
/// ```
/// use glam::Vec3;
/// use spider_ai::trajectory::quadratic_bezier;
/// let p = quadratic_bezier(Vec3::ZERO, Vec3::new(5.0, 10.0, 0.0), Vec3::new(10.0, 0.0, 0.0), 0.5);
/// assert_eq!(p, Vec3::new(5.0, 5.0, 0.0));
/// ```
#[must_use]
pub fn quadratic_bezier(p0: Vec3, p1: Vec3, p2: Vec3, t: f32) -> Vec3 {
    let u = 1.0 - t;
    let uu = u * u;
    let tt = t * t;
    p0 * uu + p1 * (2.0 * u * t) + p2 * tt
}

/// Control point above the midpoint of `start` and `target`.
#[must_use]
pub fn control_point(start: Vec3, target: Vec3, arc_height: f32) -> Vec3 {
    (start + target) / 2.0 + UP * arc_height
}

/// Geometry and progress of a single jump.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrajectoryState {
    /// Take-off position.
    pub start: Vec3,
    /// Landing position captured at take-off.
    pub target: Vec3,
    /// Derived control point; see [`control_point`].
    pub control_point: Vec3,
    /// Normalised progress along the curve.
    pub elapsed: f32,
}

impl TrajectoryState {
    /// Starts a new jump cycle with progress reset to zero.
    #[must_use]
    pub fn new(start: Vec3, target: Vec3, arc_height: f32) -> Self {
        Self {
            start,
            target,
            control_point: control_point(start, target, arc_height),
            elapsed: 0.0,
        }
    }

    /// Adds `speed * delta_seconds` to the progress and returns the new value.
    ///
    /// Negative increments are ignored so progress never runs backwards
    /// within a cycle.
    pub fn advance(&mut self, delta_seconds: f32, speed: f32) -> f32 {
        let step = speed * delta_seconds;
        if step.is_finite() && step > 0.0 {
            self.elapsed += step;
        }
        self.elapsed
    }

    /// Point on the curve at progress `t`.
    #[must_use]
    pub fn point_at(&self, t: f32) -> Vec3 {
        quadratic_bezier(self.start, self.control_point, self.target, t)
    }

    /// Point on the curve at the current progress.
    #[must_use]
    pub fn current_point(&self) -> Vec3 {
        self.point_at(self.elapsed)
    }
}
