//! Bevy plugin wiring the spider behaviour into the schedule.

use std::time::Duration;

use bevy::ecs::prelude::On;
use bevy::prelude::*;
use log::error;
use thiserror::Error;

use crate::components::{Actor, NetId, ReplicatedSpider, Spider};
use crate::config::SpiderConfig;
use crate::replication::{ReplicaState, ReplicationInbox, ReplicationOutbox};
use crate::systems::{
    advance_tick_system, apply_snapshots_system, drive_spiders_system, is_authority, is_replica,
    publish_snapshots_system,
};

/// Whether this instance owns the simulation or mirrors it.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimulationRole {
    /// Runs behaviour and publishes snapshots.
    #[default]
    Authority,
    /// Applies snapshots only.
    Replica,
}

/// Authority tick counter stamped on every snapshot.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimTick(pub u64);

/// Context carried by [`SpiderAiError`] events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiderAiErrorContext {
    /// Failure while installing the plugin.
    Init,
    /// Failure while encoding the authority's snapshots.
    Publish,
    /// Failure while applying snapshots on a replica.
    Apply,
}

/// Event raised when the simulation sync path hits an error.
#[derive(Event, Debug, Clone, Error)]
#[error("{context:?}: {detail}")]
pub struct SpiderAiError {
    /// Where the failure occurred.
    pub context: SpiderAiErrorContext,
    /// Description of the underlying error.
    pub detail: String,
}

impl SpiderAiError {
    /// Convenience constructor used by systems to emit error events.
    #[must_use]
    pub fn new(context: SpiderAiErrorContext, detail: impl Into<String>) -> Self {
        Self {
            context,
            detail: detail.into(),
        }
    }
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "Observer systems must accept On<T> by value for Events V2."
)]
fn log_spider_ai_error(event: On<SpiderAiError>) {
    let SpiderAiError { context, detail } = event.event();
    error!("spider AI error during {context:?}: {detail}");
}

/// Installs the spider simulation for one role.
///
/// The authority runs `advance_tick_system`, `drive_spiders_system` and
/// `publish_snapshots_system` in order; a replica only runs
/// `apply_snapshots_system`. Both sets are gated by [`SimulationRole`], so
/// flipping the resource switches an app between roles.
#[derive(Debug, Clone, Default)]
pub struct SpiderAiPlugin {
    /// Initial role.
    pub role: SimulationRole,
    /// Tunables shared by every spider spawned through this app.
    pub config: SpiderConfig,
}

impl SpiderAiPlugin {
    /// Authoritative plugin using `config`.
    #[must_use]
    pub const fn authority(config: SpiderConfig) -> Self {
        Self {
            role: SimulationRole::Authority,
            config,
        }
    }

    /// Replica plugin with default tunables.
    #[must_use]
    pub fn replica() -> Self {
        Self {
            role: SimulationRole::Replica,
            config: SpiderConfig::default(),
        }
    }
}

impl Plugin for SpiderAiPlugin {
    fn build(&self, app: &mut App) {
        app.add_observer(log_spider_ai_error);

        let config = match self.config.clone().validate() {
            Ok(config) => config,
            Err(e) => {
                app.world_mut().trigger(SpiderAiError::new(
                    SpiderAiErrorContext::Init,
                    e.to_string(),
                ));
                return;
            }
        };

        app.insert_resource(config)
            .insert_resource(self.role)
            .init_resource::<Time>()
            .init_resource::<SimTick>()
            .init_resource::<ReplicationOutbox>()
            .init_resource::<ReplicationInbox>()
            .init_resource::<ReplicaState>();

        app.add_systems(
            Update,
            (
                advance_tick_system,
                drive_spiders_system,
                publish_snapshots_system,
            )
                .chain()
                .run_if(is_authority),
        );
        app.add_systems(Update, apply_snapshots_system.run_if(is_replica));
    }
}

/// Advances the app clock by `delta` and runs one update.
///
/// Apps built without a time plugin are stepped this way, which keeps the
/// frame time exact and independent of the wall clock.
pub fn advance_clock(app: &mut App, delta: Duration) {
    app.world_mut().resource_mut::<Time>().advance_by(delta);
    app.update();
}

/// Spawns an idle authoritative spider at `position`.
///
/// Uses the app's [`SpiderConfig`] when present.
pub fn spawn_spider(world: &mut World, id: NetId, position: Vec3) -> Entity {
    let config = world
        .get_resource::<SpiderConfig>()
        .cloned()
        .unwrap_or_default();
    world
        .spawn((id, Spider::new(&config), Transform::from_translation(position)))
        .id()
}

/// Spawns an actor that spiders can sense.
pub fn spawn_actor(world: &mut World, id: NetId, actor: Actor, position: Vec3) -> Entity {
    world
        .spawn((id, actor, Transform::from_translation(position)))
        .id()
}

/// Spawns the replica-side mirror of a spider.
pub fn spawn_replica_spider(world: &mut World, id: NetId, position: Vec3) -> Entity {
    world
        .spawn((
            id,
            ReplicatedSpider::default(),
            Transform::from_translation(position),
        ))
        .id()
}
