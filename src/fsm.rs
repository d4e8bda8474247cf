//! Behaviour state machine for a spider.
//!
//! Each phase is a [`BehaviourState`] with `enter`/`update`/`exit` hooks.
//! [`StateMachine`] runs the current state once per frame and, when it asks
//! for a transition, exits the old state before entering the new one.
//!
//! ```text
//! Idle --player detected--> Chasing --in range, cooled down--> JumpAttacking
//!  ^                          |  ^                                   |
//!  +------player lost---------+  +-----------jump complete-----------+
//! ```

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::body::SpiderBody;
use crate::config::SpiderConfig;
use crate::jump::{JumpArcController, JumpOutcome};
use crate::knockback::{ActorFilter, ActorQuery};
use crate::orientation::yaw_towards;
use crate::vector_math::{flatten, horizontal_distance, vec_normalize};

/// Phase tag shared by the authority and replicas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpiderPhase {
    /// Waiting for a player to come near.
    #[default]
    Idle,
    /// Walking towards the nearest player.
    Chasing,
    /// Following a jump arc.
    JumpAttacking,
}

impl fmt::Display for SpiderPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Chasing => "chasing",
            Self::JumpAttacking => "jump-attacking",
        };
        f.write_str(name)
    }
}

/// What a state wants after its update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// Remain in the current state.
    Stay,
    /// Switch to another phase.
    To(SpiderPhase),
    /// Jump at the given position.
    JumpAt(Vec3),
}

/// Mutable view handed to states for one frame.
pub struct BehaviourContext<'a> {
    /// The spider itself.
    pub body: &'a mut SpiderBody,
    /// Actors the spider can sense and push.
    pub actors: &'a mut dyn ActorQuery,
    /// Frame time in seconds.
    pub delta_seconds: f32,
}

/// Capability implemented by every behaviour phase.
pub trait BehaviourState: fmt::Debug {
    /// Phase this state represents.
    fn phase(&self) -> SpiderPhase;

    /// Runs once when the state becomes active.
    fn enter(&mut self, _ctx: &mut BehaviourContext<'_>) {}

    /// Runs every frame while the state is active.
    fn update(&mut self, ctx: &mut BehaviourContext<'_>) -> Transition;

    /// Runs once when the state is left.
    fn exit(&mut self, _ctx: &mut BehaviourContext<'_>) {}
}

/// Ranges and speeds used by the ground behaviours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChaseSettings {
    /// Which actors are hunted.
    pub filter: ActorFilter,
    /// Distance at which players are noticed or lost.
    pub detection_radius: f32,
    /// Ground speed while chasing.
    pub chase_speed: f32,
    /// Horizontal distance at which a jump is launched.
    pub jump_range: f32,
    /// Seconds between landing and the next jump.
    pub jump_cooldown: f32,
}

impl From<&SpiderConfig> for ChaseSettings {
    fn from(config: &SpiderConfig) -> Self {
        Self {
            filter: config.target_filter(),
            detection_radius: config.detection_radius,
            chase_speed: config.chase_speed,
            jump_range: config.jump_range,
            jump_cooldown: config.jump_cooldown,
        }
    }
}

/// Waits until a player is within detection range.
#[derive(Debug, Clone)]
pub struct IdleState {
    settings: ChaseSettings,
}

impl BehaviourState for IdleState {
    fn phase(&self) -> SpiderPhase {
        SpiderPhase::Idle
    }

    fn update(&mut self, ctx: &mut BehaviourContext<'_>) -> Transition {
        let from = ctx.body.pose.translation;
        match ctx
            .actors
            .nearest(from, self.settings.detection_radius, &self.settings.filter)
        {
            Some(_) => Transition::To(SpiderPhase::Chasing),
            None => Transition::Stay,
        }
    }
}

/// Walks towards the nearest player and decides when to jump.
#[derive(Debug, Clone)]
pub struct ChasingState {
    settings: ChaseSettings,
    cooldown_remaining: f32,
    ground_height: Option<f32>,
}

impl ChasingState {
    /// Blocks jumping for the configured cooldown.
    pub fn restart_cooldown(&mut self) {
        self.cooldown_remaining = self.settings.jump_cooldown;
    }

    /// Seconds left before the next jump is allowed.
    #[must_use]
    pub const fn cooldown_remaining(&self) -> f32 {
        self.cooldown_remaining
    }

    /// Height the spider walks at, captured the first time it chases.
    #[must_use]
    pub const fn ground_height(&self) -> Option<f32> {
        self.ground_height
    }

    /// Puts the body back on the ground after a landing.
    ///
    /// A jump ends at its last airborne sample, above the ground.
    fn settle(&mut self, body: &mut SpiderBody) {
        let ground = *self
            .ground_height
            .get_or_insert(body.pose.translation.y);
        body.pose.translation.y = ground;
    }
}

impl BehaviourState for ChasingState {
    fn phase(&self) -> SpiderPhase {
        SpiderPhase::Chasing
    }

    fn enter(&mut self, ctx: &mut BehaviourContext<'_>) {
        self.settle(ctx.body);
    }

    fn update(&mut self, ctx: &mut BehaviourContext<'_>) -> Transition {
        self.settle(ctx.body);
        let dt = ctx.delta_seconds.max(0.0);
        self.cooldown_remaining = (self.cooldown_remaining - dt).max(0.0);

        let from = ctx.body.pose.translation;
        let Some((_, target)) =
            ctx.actors
                .nearest(from, self.settings.detection_radius, &self.settings.filter)
        else {
            return Transition::To(SpiderPhase::Idle);
        };

        let distance = horizontal_distance(from, target);
        if distance <= self.settings.jump_range && self.cooldown_remaining <= 0.0 {
            return Transition::JumpAt(target);
        }

        let travel = (self.settings.chase_speed * dt).min(distance);
        let heading = vec_normalize(flatten(target - from));
        ctx.body.pose.translation += heading * travel;
        ctx.body.pose.rotation = yaw_towards(ctx.body.pose.rotation, from, target);
        Transition::Stay
    }
}

/// Runs a [`JumpArcController`] for one attack.
#[derive(Debug, Clone)]
pub struct JumpAttackState {
    controller: JumpArcController,
}

impl JumpAttackState {
    /// Controller driving the arc.
    #[must_use]
    pub const fn controller(&self) -> &JumpArcController {
        &self.controller
    }

    /// Mutable access, used to hand over the jump target.
    pub fn controller_mut(&mut self) -> &mut JumpArcController {
        &mut self.controller
    }
}

impl BehaviourState for JumpAttackState {
    fn phase(&self) -> SpiderPhase {
        SpiderPhase::JumpAttacking
    }

    fn enter(&mut self, ctx: &mut BehaviourContext<'_>) {
        ctx.body.attacking = true;
        self.controller.begin(ctx.body);
    }

    fn update(&mut self, ctx: &mut BehaviourContext<'_>) -> Transition {
        match self
            .controller
            .update(&mut *ctx.body, ctx.delta_seconds, &mut *ctx.actors)
        {
            JumpOutcome::Airborne(_) => Transition::Stay,
            JumpOutcome::Complete => Transition::To(SpiderPhase::Chasing),
        }
    }

    fn exit(&mut self, ctx: &mut BehaviourContext<'_>) {
        self.controller.exit(ctx.body);
    }
}

/// Owns the three behaviour states and the active phase.
#[derive(Debug, Clone)]
pub struct StateMachine {
    phase: SpiderPhase,
    idle: IdleState,
    chasing: ChasingState,
    jump: JumpAttackState,
}

impl StateMachine {
    /// Builds an idle machine from designer tuning.
    #[must_use]
    pub fn new(config: &SpiderConfig) -> Self {
        let settings = ChaseSettings::from(config);
        Self {
            phase: SpiderPhase::Idle,
            idle: IdleState { settings },
            chasing: ChasingState {
                settings,
                cooldown_remaining: 0.0,
                ground_height: None,
            },
            jump: JumpAttackState {
                controller: JumpArcController::new(
                    config.jump_speed,
                    config.arc_height,
                    config.knockback_params(),
                ),
            },
        }
    }

    /// Active phase.
    #[must_use]
    pub const fn phase(&self) -> SpiderPhase {
        self.phase
    }

    /// The jump controller, for inspecting the current arc.
    #[must_use]
    pub const fn jump(&self) -> &JumpArcController {
        self.jump.controller()
    }

    /// The chasing state, for inspecting its cooldown.
    #[must_use]
    pub const fn chasing(&self) -> &ChasingState {
        &self.chasing
    }

    fn state_mut(&mut self, phase: SpiderPhase) -> &mut dyn BehaviourState {
        match phase {
            SpiderPhase::Idle => &mut self.idle,
            SpiderPhase::Chasing => &mut self.chasing,
            SpiderPhase::JumpAttacking => &mut self.jump,
        }
    }

    /// Runs the active state for one frame.
    ///
    /// Returns the `(from, to)` phases when a transition happened.
    pub fn tick(&mut self, ctx: &mut BehaviourContext<'_>) -> Option<(SpiderPhase, SpiderPhase)> {
        let phase = self.phase;
        match self.state_mut(phase).update(ctx) {
            Transition::Stay => None,
            Transition::To(next) => self.switch(next, ctx),
            Transition::JumpAt(target) => {
                self.jump.controller_mut().set_target(target);
                self.switch(SpiderPhase::JumpAttacking, ctx)
            }
        }
    }

    /// Leaves the active state and enters `next`.
    ///
    /// Switching to the active phase is a no-op.
    pub fn switch(
        &mut self,
        next: SpiderPhase,
        ctx: &mut BehaviourContext<'_>,
    ) -> Option<(SpiderPhase, SpiderPhase)> {
        let previous = self.phase;
        if previous == next {
            return None;
        }
        self.state_mut(previous).exit(ctx);
        if previous == SpiderPhase::JumpAttacking {
            self.chasing.restart_cooldown();
        }
        self.phase = next;
        self.state_mut(next).enter(ctx);
        Some((previous, next))
    }
}
