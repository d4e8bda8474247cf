//! Look-at and levelling helpers.
//!
//! Rotations follow the Bevy convention where an entity's forward axis is
//! `-Z` and up is `+Y`.

use glam::{EulerRot, Mat3, Quat, Vec3};

use crate::vector_math::{flatten, vec_normalize, UP};

/// Squared cross-product magnitude below which a direction counts as
/// parallel to [`UP`].
const PARALLEL_EPSILON: f32 = 1e-6;

/// Rotation that points the forward axis from `from` towards `to`.
///
/// Returns `current` unchanged when the points coincide or `to` lies directly
/// above or below `from`, where the look direction has no defined yaw.
///
/// # Examples
/// ```
/// use glam::{Quat, Vec3};
/// use spider_ai::orientation::face_towards;
/// let rotation = face_towards(Quat::IDENTITY, Vec3::ZERO, Vec3::new(0.0, 0.0, -5.0));
/// assert!(rotation.abs_diff_eq(Quat::IDENTITY, 1e-6));
/// ```
#[must_use]
pub fn face_towards(current: Quat, from: Vec3, to: Vec3) -> Quat {
    let direction = vec_normalize(to - from);
    if direction == Vec3::ZERO || UP.cross(direction).length_squared() < PARALLEL_EPSILON {
        return current;
    }
    let back = -direction;
    let right = UP.cross(back).normalize();
    let up = back.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, back))
}

/// Yaw-only variant of [`face_towards`] used while moving on the ground.
#[must_use]
pub fn yaw_towards(current: Quat, from: Vec3, to: Vec3) -> Quat {
    face_towards(current, flatten(from), flatten(to))
}

/// Removes pitch and roll from `rotation`, preserving its yaw.
///
/// # Examples
/// ```
/// use glam::{EulerRot, Quat};
/// use spider_ai::orientation::level;
/// let tilted = Quat::from_euler(EulerRot::YXZ, 0.5, 0.3, -0.2);
/// assert!(level(tilted).abs_diff_eq(Quat::from_rotation_y(0.5), 1e-5));
/// ```
#[must_use]
pub fn level(rotation: Quat) -> Quat {
    let (yaw, _pitch, _roll) = rotation.to_euler(EulerRot::YXZ);
    Quat::from_rotation_y(yaw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    fn faces_along_positive_x() {
        let rotation = face_towards(Quat::IDENTITY, Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0));
        let forward = rotation * Vec3::NEG_Z;
        assert_relative_eq!(forward.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(forward.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(forward.z, 0.0, epsilon = 1e-5);
    }

    #[rstest]
    fn pitches_down_towards_lower_target() {
        let rotation = face_towards(Quat::IDENTITY, Vec3::new(0.0, 5.0, 0.0), Vec3::new(5.0, 0.0, 0.0));
        let forward = rotation * Vec3::NEG_Z;
        assert!(forward.y < 0.0);
        assert!(forward.x > 0.0);
    }

    #[rstest]
    #[case::coincident(Vec3::ZERO)]
    #[case::above(Vec3::new(0.0, 4.0, 0.0))]
    #[case::below(Vec3::new(0.0, -4.0, 0.0))]
    fn degenerate_targets_keep_rotation(#[case] to: Vec3) {
        let current = Quat::from_rotation_y(1.2);
        assert_eq!(face_towards(current, Vec3::ZERO, to), current);
    }

    #[rstest]
    #[case(0.0, 0.0, 0.0)]
    #[case(1.0, 0.4, 0.0)]
    #[case(-2.5, -0.7, 0.9)]
    #[case(3.0, 1.2, -1.4)]
    fn level_keeps_only_yaw(#[case] yaw: f32, #[case] pitch: f32, #[case] roll: f32) {
        let leveled = level(Quat::from_euler(EulerRot::YXZ, yaw, pitch, roll));
        let (out_yaw, out_pitch, out_roll) = leveled.to_euler(EulerRot::YXZ);
        assert_relative_eq!(out_yaw, yaw, epsilon = 1e-4);
        assert_relative_eq!(out_pitch, 0.0, epsilon = 1e-5);
        assert_relative_eq!(out_roll, 0.0, epsilon = 1e-5);
    }

    #[rstest]
    fn yaw_towards_ignores_height() {
        let rotation = yaw_towards(Quat::IDENTITY, Vec3::ZERO, Vec3::new(0.0, 10.0, 4.0));
        let forward = rotation * Vec3::NEG_Z;
        assert_relative_eq!(forward.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(forward.z, 1.0, epsilon = 1e-5);
    }
}
