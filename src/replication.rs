//! Explicit state replication from the authority to replicas.
//!
//! The authority serialises one [`PoseSnapshot`] per spider, plus one per
//! actor whose transform it changed, into a JSON frame each tick. Replicas
//! decode frames and write the poses back; they never run behaviour logic.

use std::collections::VecDeque;

use bevy::prelude::{Resource, World};
use glam::{Quat, Vec3};
use hashbrown::HashMap;
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::body::Pose;
use crate::components::NetId;
use crate::fsm::SpiderPhase;
use crate::OUTBOX_FRAME_LIMIT;

/// Errors raised while encoding or decoding snapshot frames.
#[derive(Debug, Error)]
pub enum ReplicationError {
    /// Serialisation failed.
    #[error("failed to encode snapshot frame: {0}")]
    Encode(#[source] serde_json::Error),
    /// The frame is not a valid snapshot batch.
    #[error("failed to decode snapshot frame: {0}")]
    Decode(#[source] serde_json::Error),
    /// A snapshot holds NaN or infinite values.
    #[error("snapshot for {id:?} at tick {tick} carries non-finite values")]
    NonFinite {
        /// Entity the snapshot describes.
        id: NetId,
        /// Tick it was taken on.
        tick: u64,
    },
}

/// Authoritative pose of one entity at one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseSnapshot {
    /// Entity described.
    pub id: NetId,
    /// Authority tick the snapshot was taken on.
    pub tick: u64,
    /// World position.
    pub translation: [f32; 3],
    /// Rotation as `[x, y, z, w]`.
    pub rotation: [f32; 4],
    /// Spider phase; `None` for plain actors.
    pub phase: Option<SpiderPhase>,
    /// Spider attacking flag.
    pub attacking: bool,
}

impl PoseSnapshot {
    /// Snapshot of a plain actor.
    #[must_use]
    pub fn actor(id: NetId, tick: u64, pose: Pose) -> Self {
        Self {
            id,
            tick,
            translation: pose.translation.to_array(),
            rotation: pose.rotation.to_array(),
            phase: None,
            attacking: false,
        }
    }

    /// Snapshot of a spider.
    #[must_use]
    pub fn spider(id: NetId, tick: u64, pose: Pose, phase: SpiderPhase, attacking: bool) -> Self {
        Self {
            phase: Some(phase),
            attacking,
            ..Self::actor(id, tick, pose)
        }
    }

    /// Pose carried by the snapshot.
    #[must_use]
    pub fn pose(&self) -> Pose {
        Pose {
            translation: Vec3::from_array(self.translation),
            rotation: Quat::from_array(self.rotation),
        }
    }

    /// `true` when every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.translation.iter().chain(self.rotation.iter()).all(|v| v.is_finite())
    }
}

/// Serialises a batch into one frame.
///
/// # Errors
/// Returns [`ReplicationError::NonFinite`] when a snapshot holds NaN or
/// infinity, which JSON cannot represent, and [`ReplicationError::Encode`]
/// if serialisation fails.
pub fn encode_batch(batch: &[PoseSnapshot]) -> Result<String, ReplicationError> {
    if let Some(bad) = batch.iter().find(|s| !s.is_finite()) {
        return Err(ReplicationError::NonFinite {
            id: bad.id,
            tick: bad.tick,
        });
    }
    serde_json::to_string(batch).map_err(ReplicationError::Encode)
}

/// Parses one frame.
///
/// # Errors
/// Returns [`ReplicationError::Decode`] for malformed frames and
/// [`ReplicationError::NonFinite`] when a value overflows `f32`.
pub fn decode_batch(frame: &str) -> Result<Vec<PoseSnapshot>, ReplicationError> {
    let batch: Vec<PoseSnapshot> = serde_json::from_str(frame).map_err(ReplicationError::Decode)?;
    if let Some(bad) = batch.iter().find(|s| !s.is_finite()) {
        return Err(ReplicationError::NonFinite {
            id: bad.id,
            tick: bad.tick,
        });
    }
    Ok(batch)
}

/// Frames produced by the authority, waiting to be sent.
///
/// Draining is the transport's job; see [`forward`]. When nothing drains
/// it, the outbox keeps only the newest `limit` frames. Dropping old frames
/// is safe because every frame carries the full pose of each entity it
/// names and replicas ignore anything older than what they applied.
#[derive(Resource, Debug)]
pub struct ReplicationOutbox {
    frames: VecDeque<String>,
    limit: usize,
    dropped: u64,
}

impl Default for ReplicationOutbox {
    fn default() -> Self {
        Self::with_limit(OUTBOX_FRAME_LIMIT)
    }
}

impl ReplicationOutbox {
    /// Outbox holding at most `limit` frames (at least one).
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            frames: VecDeque::new(),
            limit: limit.max(1),
            dropped: 0,
        }
    }

    /// Queues an encoded frame, evicting the oldest one when full.
    pub fn push(&mut self, frame: String) {
        if self.frames.len() >= self.limit {
            self.frames.pop_front();
            self.dropped += 1;
            if self.dropped == 1 || self.dropped % 1000 == 0 {
                warn!(
                    "replication outbox full ({} frames); {} dropped so far",
                    self.limit, self.dropped
                );
            }
        }
        self.frames.push_back(frame);
    }

    /// Takes every queued frame, oldest first.
    pub fn drain(&mut self) -> Vec<String> {
        self.frames.drain(..).collect()
    }

    /// Number of queued frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` when nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames evicted because the outbox was full.
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Moves every queued frame from `outbox` to `inbox`, preserving order.
///
/// Returns the number of frames moved.
pub fn forward(outbox: &mut ReplicationOutbox, inbox: &mut ReplicationInbox) -> usize {
    let frames = outbox.drain();
    let count = frames.len();
    for frame in frames {
        inbox.push(frame);
    }
    count
}

/// [`forward`] between the resources of two worlds, an in-process stand-in
/// for a network link.
///
/// Returns zero when either world lacks its replication resource.
pub fn forward_frames(authority: &mut World, replica: &mut World) -> usize {
    let Some(mut outbox) = authority.get_resource_mut::<ReplicationOutbox>() else {
        return 0;
    };
    let Some(mut inbox) = replica.get_resource_mut::<ReplicationInbox>() else {
        return 0;
    };
    forward(&mut outbox, &mut inbox)
}

/// Frames received by a replica, waiting to be applied.
#[derive(Resource, Debug, Default)]
pub struct ReplicationInbox {
    frames: VecDeque<String>,
}

impl ReplicationInbox {
    /// Queues a received frame.
    pub fn push(&mut self, frame: impl Into<String>) {
        self.frames.push_back(frame.into());
    }

    /// Takes every queued frame in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = String> + '_ {
        self.frames.drain(..)
    }

    /// Returns `true` when nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Replica bookkeeping used to drop stale or duplicate snapshots.
#[derive(Resource, Debug, Default)]
pub struct ReplicaState {
    last_tick: HashMap<NetId, u64>,
}

impl ReplicaState {
    /// Records `snapshot` and returns `true` if it is newer than the last
    /// one applied for the same entity.
    pub fn accept(&mut self, snapshot: &PoseSnapshot) -> bool {
        match self.last_tick.get(&snapshot.id) {
            Some(&last) if last >= snapshot.tick => false,
            _ => {
                self.last_tick.insert(snapshot.id, snapshot.tick);
                true
            }
        }
    }

    /// Tick of the last snapshot applied for `id`.
    #[must_use]
    pub fn last_tick(&self, id: NetId) -> Option<u64> {
        self.last_tick.get(&id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn spider_snapshot(tick: u64) -> PoseSnapshot {
        PoseSnapshot::spider(
            NetId(3),
            tick,
            Pose::at(Vec3::new(1.0, 2.0, 3.0)),
            SpiderPhase::JumpAttacking,
            true,
        )
    }

    #[rstest]
    fn frame_format_is_stable() {
        let frame = encode_batch(&[spider_snapshot(7)]).expect("encodes");
        assert_eq!(
            frame,
            r#"[{"id":3,"tick":7,"translation":[1.0,2.0,3.0],"rotation":[0.0,0.0,0.0,1.0],"phase":"jump_attacking","attacking":true}]"#
        );
    }

    #[rstest]
    fn rejects_non_finite_before_encoding() {
        let mut snapshot = spider_snapshot(1);
        snapshot.translation[1] = f32::NAN;
        let err = encode_batch(&[snapshot]).expect_err("NaN cannot be encoded");
        assert!(matches!(err, ReplicationError::NonFinite { id: NetId(3), tick: 1 }));
    }

    #[rstest]
    #[case::garbage("not json")]
    #[case::wrong_shape(r#"{"id":1}"#)]
    #[case::null_component(r#"[{"id":1,"tick":1,"translation":[null,0.0,0.0],"rotation":[0.0,0.0,0.0,1.0],"phase":null,"attacking":false}]"#)]
    fn decode_rejects_malformed(#[case] frame: &str) {
        assert!(matches!(decode_batch(frame), Err(ReplicationError::Decode(_))));
    }

    #[rstest]
    fn decode_rejects_overflowing_values() {
        let frame = r#"[{"id":2,"tick":9,"translation":[1e300,0.0,0.0],"rotation":[0.0,0.0,0.0,1.0],"phase":null,"attacking":false}]"#;
        assert!(matches!(
            decode_batch(frame),
            Err(ReplicationError::NonFinite { id: NetId(2), tick: 9 })
        ));
    }

    #[rstest]
    fn replica_state_drops_stale_and_duplicates() {
        let mut state = ReplicaState::default();
        assert!(state.accept(&spider_snapshot(5)));
        assert!(!state.accept(&spider_snapshot(5)));
        assert!(!state.accept(&spider_snapshot(4)));
        assert!(state.accept(&spider_snapshot(6)));
        assert_eq!(state.last_tick(NetId(3)), Some(6));
    }

    #[rstest]
    fn full_outbox_keeps_newest_frames() {
        let mut outbox = ReplicationOutbox::with_limit(2);
        for frame in ["a", "b", "c", "d"] {
            outbox.push(frame.to_owned());
        }
        assert_eq!(outbox.len(), 2);
        assert_eq!(outbox.dropped(), 2);
        assert_eq!(outbox.drain(), vec!["c".to_owned(), "d".to_owned()]);
    }

    #[rstest]
    fn default_outbox_is_bounded() {
        let mut outbox = ReplicationOutbox::default();
        for tick in 0..(OUTBOX_FRAME_LIMIT + 10) {
            outbox.push(tick.to_string());
        }
        assert_eq!(outbox.len(), OUTBOX_FRAME_LIMIT);
        assert_eq!(outbox.drain().first(), Some(&"10".to_owned()));
    }

    #[rstest]
    fn forward_moves_frames_in_order() {
        let mut outbox = ReplicationOutbox::default();
        let mut inbox = ReplicationInbox::default();
        outbox.push("first".to_owned());
        outbox.push("second".to_owned());
        assert_eq!(forward(&mut outbox, &mut inbox), 2);
        assert!(outbox.is_empty());
        assert_eq!(inbox.drain().collect::<Vec<_>>(), vec!["first", "second"]);
    }

    #[rstest]
    fn forward_frames_needs_both_resources() {
        let mut authority = World::new();
        authority.init_resource::<ReplicationOutbox>();
        authority.resource_mut::<ReplicationOutbox>().push("x".to_owned());
        let mut bare = World::new();
        assert_eq!(forward_frames(&mut authority, &mut bare), 0);

        let mut replica = World::new();
        replica.init_resource::<ReplicationInbox>();
        assert_eq!(forward_frames(&mut authority, &mut replica), 1);
        assert!(!replica.resource::<ReplicationInbox>().is_empty());
    }

    #[rstest]
    fn outbox_drains_in_order() {
        let mut outbox = ReplicationOutbox::default();
        outbox.push("a".to_owned());
        outbox.push("b".to_owned());
        assert_eq!(outbox.len(), 2);
        assert_eq!(outbox.drain(), vec!["a".to_owned(), "b".to_owned()]);
        assert!(outbox.is_empty());
    }
}
