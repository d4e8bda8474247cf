//! Basic vector math helper functions.
//! Small helpers for normalising and flattening vectors without producing NaN.
use glam::Vec3;

/// World up axis used for arcs, knockback lift and yaw.
pub const UP: Vec3 = Vec3::Y;

/// Returns the unit vector in the direction of `vector`.
///
/// The function checks that all components are finite and the vector is
/// non-zero before normalising. If the input is invalid or the zero vector,
/// it returns [`Vec3::ZERO`].
///
/// # Examples
///
/// ```
/// use glam::Vec3;
/// use spider_ai::vec_normalize;
/// let n = vec_normalize(Vec3::new(3.0, 0.0, 4.0));
/// assert!((n.x - 0.6).abs() < 1e-6);
/// assert!((n.z - 0.8).abs() < 1e-6);
///
/// assert_eq!(vec_normalize(Vec3::ZERO), Vec3::ZERO);
/// ```
#[must_use]
pub fn vec_normalize(vector: Vec3) -> Vec3 {
    if !vector.is_finite() {
        return Vec3::ZERO;
    }
    vector.try_normalize().unwrap_or(Vec3::ZERO)
}

/// Drops the vertical component of `vector`.
#[must_use]
pub const fn flatten(vector: Vec3) -> Vec3 {
    Vec3::new(vector.x, 0.0, vector.z)
}

/// Distance between two points measured on the ground plane.
///
/// # Examples
/// ```
/// use glam::Vec3;
/// use spider_ai::vector_math::horizontal_distance;
/// let d = horizontal_distance(Vec3::new(0.0, 9.0, 0.0), Vec3::new(3.0, -2.0, 4.0));
/// assert!((d - 5.0).abs() < f32::EPSILON);
/// ```
#[must_use]
pub fn horizontal_distance(from: Vec3, to: Vec3) -> f32 {
    flatten(to - from).length()
}
