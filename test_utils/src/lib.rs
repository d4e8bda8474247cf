//! Utility helpers for tests.
pub mod app;
pub mod samples;

pub use app::{advance, authority_app, forward_frames, pose_of_entity, replica_app};
pub use samples::{enemy, player, player_filter};

use glam::Vec3;

/// Assert that `actual` lies within `tolerance` of `expected` on every axis.
///
/// # Panics
/// Panics with both vectors in the message when any axis differs by more
/// than `tolerance`.
pub fn assert_vec3_near(actual: Vec3, expected: Vec3, tolerance: f32) {
    assert!(
        actual.abs_diff_eq(expected, tolerance),
        "expected {expected:?}, got {actual:?} (tolerance {tolerance})"
    );
}
