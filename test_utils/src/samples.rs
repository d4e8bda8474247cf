//! Convenience constructors for actor samples used in tests.

use glam::Vec3;
use spider_ai::{ActorCategory, ActorFilter, ActorSample, NetId};

/// A player sample on every layer.
///
/// # Examples
/// ```
/// use test_utils::player;
/// let p = player(1, 2.0, 0.0, 0.0);
/// assert_eq!(p.id.0, 1);
/// ```
pub fn player(id: u32, x: f32, y: f32, z: f32) -> ActorSample {
    ActorSample::new(NetId(id), Vec3::new(x, y, z), ActorCategory::Player)
}

/// An enemy sample on every layer.
pub fn enemy(id: u32, x: f32, y: f32, z: f32) -> ActorSample {
    ActorSample::new(NetId(id), Vec3::new(x, y, z), ActorCategory::Enemy)
}

/// Filter matching players on every layer.
pub fn player_filter() -> ActorFilter {
    ActorFilter::category(ActorCategory::Player)
}
