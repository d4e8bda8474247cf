//! Systems bridging the ECS world with the spider behaviour core.
//!
//! On the authority, actors are cached into an [`Arena`], every spider's
//! state machine is stepped against it, and the arena's displaced actors are
//! written back. Snapshots of the result are then queued for replicas.

use bevy::prelude::*;
use bevy_ecs::system::SystemParam;
use hashbrown::HashMap;
use log::{debug, info, warn};

use crate::arena::{ActorSample, Arena};
use crate::components::{pose_of, write_pose, Actor, NetId, ReplicatedSpider, Spider};
use crate::fsm::BehaviourContext;
use crate::plugin::{SimTick, SimulationRole, SpiderAiError, SpiderAiErrorContext};
use crate::replication::{
    decode_batch, encode_batch, PoseSnapshot, ReplicaState, ReplicationInbox, ReplicationOutbox,
};

type SpiderRow<'w> = (&'w NetId, &'w mut Transform, &'w mut Spider);
type ActorRow<'w> = (Entity, &'w NetId, &'w mut Transform, &'w Actor);

/// Run condition: only the authoritative instance simulates behaviour.
#[must_use]
#[expect(
    clippy::needless_pass_by_value,
    reason = "Run conditions receive `Res<T>` by value."
)]
pub fn is_authority(role: Res<SimulationRole>) -> bool {
    *role == SimulationRole::Authority
}

/// Run condition: replicas only apply snapshots.
#[must_use]
#[expect(
    clippy::needless_pass_by_value,
    reason = "Run conditions receive `Res<T>` by value."
)]
pub fn is_replica(role: Res<SimulationRole>) -> bool {
    *role == SimulationRole::Replica
}

/// Advances the authority tick counter.
pub fn advance_tick_system(mut tick: ResMut<SimTick>) {
    tick.0 += 1;
}

/// Steps every spider's behaviour for this frame.
///
/// Actors are cached into an [`Arena`] first so that knockback from several
/// spiders accumulates on the same positions; the displaced positions are
/// written back once all spiders have run.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy system parameters use `Res<T>` by value."
)]
pub fn drive_spiders_system(
    time: Res<Time>,
    mut spiders: Query<SpiderRow<'_>>,
    mut actors: Query<ActorRow<'_>, Without<Spider>>,
) {
    let delta_seconds = time.delta_secs();
    let (mut arena, id_map) = sync::cache_actors(&actors);

    for (id, mut transform, mut spider) in &mut spiders {
        let mut body = spider.body(&transform);
        let mut ctx = BehaviourContext {
            body: &mut body,
            actors: &mut arena,
            delta_seconds,
        };
        if let Some((from, to)) = spider.machine.tick(&mut ctx) {
            info!("spider {id:?}: {from} -> {to}");
        }
        spider.attacking = body.attacking;
        if pose_of(&transform) != body.pose {
            write_pose(&mut transform, body.pose);
        }
    }

    sync::apply_moved(&arena, &id_map, &mut actors);
}

/// Read-only queries needed to publish snapshots.
#[derive(SystemParam)]
pub struct SnapshotQueries<'w, 's> {
    /// Authoritative spiders.
    pub spiders: Query<'w, 's, (&'static NetId, &'static Transform, &'static Spider)>,
    /// Actors whose transform changed this frame.
    pub moved_actors: Query<
        'w,
        's,
        (&'static NetId, &'static Transform),
        (With<Actor>, Without<Spider>, Changed<Transform>),
    >,
}

/// Queues this tick's snapshots for replicas.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems receive queries by value."
)]
pub fn publish_snapshots_system(
    tick: Res<SimTick>,
    queries: SnapshotQueries,
    mut outbox: ResMut<ReplicationOutbox>,
    mut commands: Commands,
) {
    let mut batch: Vec<PoseSnapshot> = queries
        .spiders
        .iter()
        .map(|(id, transform, spider)| {
            PoseSnapshot::spider(
                *id,
                tick.0,
                pose_of(transform),
                spider.machine.phase(),
                spider.attacking,
            )
        })
        .collect();
    batch.extend(
        queries
            .moved_actors
            .iter()
            .map(|(id, transform)| PoseSnapshot::actor(*id, tick.0, pose_of(transform))),
    );
    if batch.is_empty() {
        return;
    }
    batch.sort_by_key(|s| s.id);

    match encode_batch(&batch) {
        Ok(frame) => outbox.push(frame),
        Err(e) => commands.trigger(SpiderAiError::new(
            SpiderAiErrorContext::Publish,
            e.to_string(),
        )),
    }
}

/// Applies received snapshots on a replica.
///
/// Snapshots that are not newer than the last one applied for the same
/// entity are dropped, as are snapshots for unknown entities.
pub fn apply_snapshots_system(
    mut inbox: ResMut<ReplicationInbox>,
    mut state: ResMut<ReplicaState>,
    mut targets: Query<(Entity, &NetId, &mut Transform, Option<&mut ReplicatedSpider>)>,
    mut commands: Commands,
) {
    if inbox.is_empty() {
        return;
    }
    let id_map: HashMap<NetId, Entity> = targets.iter().map(|(e, id, _, _)| (*id, e)).collect();

    for frame in inbox.drain() {
        let batch = match decode_batch(&frame) {
            Ok(batch) => batch,
            Err(e) => {
                commands.trigger(SpiderAiError::new(
                    SpiderAiErrorContext::Apply,
                    e.to_string(),
                ));
                continue;
            }
        };
        for snapshot in batch {
            let Some(&entity) = id_map.get(&snapshot.id) else {
                warn!("snapshot for unknown entity {:?}", snapshot.id);
                continue;
            };
            if !state.accept(&snapshot) {
                debug!("dropping stale snapshot for {:?} at tick {}", snapshot.id, snapshot.tick);
                continue;
            }
            let Ok((_, _, mut transform, mirror)) = targets.get_mut(entity) else {
                continue;
            };
            write_pose(&mut transform, snapshot.pose());
            if let (Some(mut mirror), Some(phase)) = (mirror, snapshot.phase) {
                mirror.phase = phase;
                mirror.attacking = snapshot.attacking;
            }
        }
    }
}

mod sync {
    use super::*;

    pub(super) fn cache_actors(
        query: &Query<ActorRow<'_>, Without<Spider>>,
    ) -> (Arena, HashMap<NetId, Entity>) {
        let mut id_map = HashMap::new();
        let samples = query.iter().map(|(entity, id, transform, actor)| {
            if let Some(previous) = id_map.insert(*id, entity) {
                warn!("NetId {id:?} shared by {previous:?} and {entity:?}");
            }
            ActorSample {
                id: *id,
                position: transform.translation,
                category: actor.category,
                layers: actor.layers,
            }
        });
        let arena = Arena::from_samples(samples);
        (arena, id_map)
    }

    pub(super) fn apply_moved(
        arena: &Arena,
        id_map: &HashMap<NetId, Entity>,
        query: &mut Query<ActorRow<'_>, Without<Spider>>,
    ) {
        for sample in arena.moved() {
            let Some(&entity) = id_map.get(&sample.id) else {
                continue;
            };
            let Ok((_, _, mut transform, _)) = query.get_mut(entity) else {
                continue;
            };
            transform.translation = sample.position;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;
    use rstest::rstest;

    #[rstest]
    #[case(SimulationRole::Authority, true)]
    #[case(SimulationRole::Replica, false)]
    fn authority_condition(#[case] role: SimulationRole, #[case] expected: bool) {
        let mut world = World::new();
        world.insert_resource(role);
        let authority = world
            .run_system_once(is_authority)
            .expect("condition should run");
        let replica = world.run_system_once(is_replica).expect("condition should run");
        assert_eq!(authority, expected);
        assert_eq!(replica, !expected);
    }
}
