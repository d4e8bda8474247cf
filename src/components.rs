//! ECS component types used by the spider simulation.
//! Includes network identities, actor descriptors and the spider brain.
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::body::{Pose, SpiderBody};
use crate::config::SpiderConfig;
use crate::fsm::{SpiderPhase, StateMachine};
use crate::knockback::ActorCategory;

/// Network identity shared by the authority and its replicas.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NetId(pub u32);

/// Marks an entity that spiders can sense and knock back.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Gameplay category.
    pub category: ActorCategory,
    /// Layer bits for filtering.
    pub layers: u32,
}

impl Actor {
    /// A player on every layer.
    #[must_use]
    pub const fn player() -> Self {
        Self {
            category: ActorCategory::Player,
            layers: u32::MAX,
        }
    }
}

/// Authoritative spider brain.
///
/// Only present on the authority; replicas carry [`ReplicatedSpider`]
/// instead.
#[derive(Component, Debug, Clone)]
pub struct Spider {
    /// Behaviour state machine.
    pub machine: StateMachine,
    /// Raised while a jump attack is in progress.
    pub attacking: bool,
}

impl Spider {
    /// Idle spider using `config`.
    #[must_use]
    pub fn new(config: &SpiderConfig) -> Self {
        Self {
            machine: StateMachine::new(config),
            attacking: false,
        }
    }

    /// Combines this brain's flag with `transform` into a [`SpiderBody`].
    #[must_use]
    pub fn body(&self, transform: &Transform) -> SpiderBody {
        SpiderBody {
            pose: pose_of(transform),
            attacking: self.attacking,
        }
    }
}

/// Replica-side mirror of an authoritative spider's phase and flag.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplicatedSpider {
    /// Last replicated phase.
    pub phase: SpiderPhase,
    /// Last replicated attacking flag.
    pub attacking: bool,
}

/// Reads the translation and rotation of a [`Transform`].
#[must_use]
pub const fn pose_of(transform: &Transform) -> Pose {
    Pose {
        translation: transform.translation,
        rotation: transform.rotation,
    }
}

/// Writes `pose` into `transform`, leaving the scale untouched.
pub fn write_pose(transform: &mut Transform, pose: Pose) {
    transform.translation = pose.translation;
    transform.rotation = pose.rotation;
}
