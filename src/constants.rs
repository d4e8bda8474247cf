//! Default tuning values for the spider behaviour.
//!
//! These mirror the designer-facing defaults and seed [`crate::SpiderConfig`]
//! when a field is absent from a configuration file.

/// Normalised trajectory progress gained per second of jump.
pub const JUMP_SPEED: f32 = 1.0;
/// Height of the Bézier control point above the start/target midpoint.
pub const ARC_HEIGHT: f32 = 10.0;
/// Scale applied to the knockback direction each second.
pub const KNOCKBACK_FORCE: f32 = 1.0;
/// Upward component added to the flattened knockback direction.
pub const KNOCKBACK_HEIGHT: f32 = 5.0;
/// Radius of the knockback overlap sphere.
pub const KNOCKBACK_RADIUS: f32 = 5.0;
/// Layer mask matching every actor layer.
pub const ALL_LAYERS: u32 = u32::MAX;
/// Distance at which an idle spider notices a player.
pub const DETECTION_RADIUS: f32 = 20.0;
/// Horizontal chase speed in units per second.
pub const CHASE_SPEED: f32 = 4.0;
/// Distance at which a chasing spider launches its jump.
pub const JUMP_RANGE: f32 = 8.0;
/// Seconds between the end of one jump and the start of the next.
pub const JUMP_COOLDOWN: f32 = 1.5;
/// Normalised time at which a jump counts as finished.
pub const JUMP_COMPLETE_AT: f32 = 1.0;
/// Frames the authority outbox holds before dropping the oldest.
pub const OUTBOX_FRAME_LIMIT: usize = 256;
