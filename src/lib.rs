//! Library crate providing the spider jump-attack behaviour.
//! Re-exports the behaviour core, its ECS integration and replication types
//! for the simulation binary and tests.
pub mod arena;
pub mod body;
pub mod components;
pub mod config;
pub mod constants;
pub mod fsm;
pub mod jump;
pub mod knockback;
pub mod logging;
pub mod orientation;
pub mod plugin;
pub mod replication;
pub mod systems;
pub mod trajectory;
pub mod vector_math;
pub use constants::*;

// Re-export commonly used items
pub use arena::{ActorSample, Arena};
pub use body::{Pose, SpiderBody};
pub use components::{Actor, NetId, ReplicatedSpider, Spider};
pub use config::{ConfigError, SpiderConfig};
pub use fsm::{BehaviourContext, BehaviourState, SpiderPhase, StateMachine, Transition};
pub use jump::{JumpArcController, JumpOutcome};
pub use knockback::{apply_knockback, ActorCategory, ActorFilter, ActorQuery, KnockbackParams};
pub use logging::init as init_logging;
pub use plugin::{
    advance_clock, spawn_actor, spawn_replica_spider, spawn_spider, SimTick, SimulationRole,
    SpiderAiError, SpiderAiErrorContext, SpiderAiPlugin,
};
pub use replication::{
    decode_batch, encode_batch, forward, forward_frames, PoseSnapshot, ReplicaState,
    ReplicationError, ReplicationInbox, ReplicationOutbox,
};
pub use trajectory::{control_point, quadratic_bezier, TrajectoryState};
pub use vector_math::vec_normalize;

pub mod prelude {
    //! Prelude exports used in documentation examples.
    //!
    //! ```rust,no_run
    //! use spider_ai::prelude::*;
    //! ```

    pub use crate::Actor;
    pub use crate::NetId;
    pub use crate::SimulationRole;
    pub use crate::SpiderAiPlugin;
    pub use crate::SpiderConfig;
    pub use crate::SpiderPhase;
    pub use crate::{spawn_actor, spawn_replica_spider, spawn_spider};
}
