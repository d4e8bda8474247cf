//! Headless app builders driven by a manually advanced clock.

use std::time::Duration;

use bevy::prelude::*;
use spider_ai::{advance_clock, Pose, SpiderAiPlugin, SpiderConfig};

/// Authority app with `config` and no time plugin.
pub fn authority_app(config: SpiderConfig) -> App {
    let mut app = App::new();
    app.add_plugins(SpiderAiPlugin::authority(config));
    app
}

/// Replica app with no time plugin.
pub fn replica_app() -> App {
    let mut app = App::new();
    app.add_plugins(SpiderAiPlugin::replica());
    app
}

/// Advance the app clock by `seconds` and run one update.
pub fn advance(app: &mut App, seconds: f32) {
    advance_clock(app, Duration::from_secs_f32(seconds));
}

/// Move every queued frame from `authority`'s outbox to `replica`'s inbox.
///
/// Returns the number of frames moved.
pub fn forward_frames(authority: &mut App, replica: &mut App) -> usize {
    spider_ai::forward_frames(authority.world_mut(), replica.world_mut())
}

/// Pose of `entity`.
///
/// # Panics
/// Panics if the entity has no `Transform`.
pub fn pose_of_entity(app: &App, entity: Entity) -> Pose {
    let transform = app
        .world()
        .get::<Transform>(entity)
        .unwrap_or_else(|| panic!("{entity:?} has no Transform"));
    spider_ai::components::pose_of(transform)
}
