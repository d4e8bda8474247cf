//! Jump-attack controller.
//!
//! [`JumpArcController`] owns one attack cycle: it captures the take-off and
//! target positions on entry, moves the spider along the arc each frame while
//! pushing nearby players away, and levels the spider again on exit.

use glam::Vec3;
use log::debug;

use crate::body::SpiderBody;
use crate::knockback::{apply_knockback, ActorQuery, KnockbackParams};
use crate::orientation::{face_towards, level};
use crate::trajectory::TrajectoryState;
use crate::JUMP_COMPLETE_AT;

/// Result of advancing a jump by one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JumpOutcome {
    /// Still in flight; holds the position written this frame.
    Airborne(Vec3),
    /// The arc is finished and the caller should leave the jump state.
    Complete,
}

/// Drives a spider along its jump arc.
#[derive(Debug, Clone, PartialEq)]
pub struct JumpArcController {
    jump_speed: f32,
    arc_height: f32,
    knockback: KnockbackParams,
    pending_target: Vec3,
    trajectory: Option<TrajectoryState>,
}

impl JumpArcController {
    /// Creates a controller with fixed tuning.
    #[must_use]
    pub const fn new(jump_speed: f32, arc_height: f32, knockback: KnockbackParams) -> Self {
        Self {
            jump_speed,
            arc_height,
            knockback,
            pending_target: Vec3::ZERO,
            trajectory: None,
        }
    }

    /// Records where the next jump should land.
    ///
    /// Called by the chasing behaviour before the jump starts; changing the
    /// target mid-flight has no effect on the current arc.
    pub fn set_target(&mut self, position: Vec3) {
        self.pending_target = position;
    }

    /// Target recorded by [`Self::set_target`].
    #[must_use]
    pub const fn pending_target(&self) -> Vec3 {
        self.pending_target
    }

    /// Geometry of the jump in progress, if any.
    #[must_use]
    pub const fn trajectory(&self) -> Option<&TrajectoryState> {
        self.trajectory.as_ref()
    }

    /// Knockback tuning used while airborne.
    #[must_use]
    pub const fn knockback(&self) -> &KnockbackParams {
        &self.knockback
    }

    /// Starts a cycle from `start` to `target` with an explicit arc height.
    pub fn enter(&mut self, start: Vec3, target: Vec3, arc_height: f32) {
        self.pending_target = target;
        self.trajectory = Some(TrajectoryState::new(start, target, arc_height));
    }

    /// Starts a cycle from the body's position to the pending target.
    pub fn begin(&mut self, body: &SpiderBody) {
        self.enter(body.pose.translation, self.pending_target, self.arc_height);
    }

    /// Advances the jump by `delta_seconds`.
    ///
    /// Once progress reaches the end of the arc the attacking flag is cleared
    /// and [`JumpOutcome::Complete`] is returned without touching the pose.
    /// Otherwise the body is moved onto the curve, turned towards the target
    /// and every matching actor in range is knocked back.
    pub fn update<Q>(&mut self, body: &mut SpiderBody, delta_seconds: f32, actors: &mut Q) -> JumpOutcome
    where
        Q: ActorQuery + ?Sized,
    {
        let Some(trajectory) = self.trajectory.as_mut() else {
            return JumpOutcome::Complete;
        };
        let t = trajectory.advance(delta_seconds, self.jump_speed);
        if t >= JUMP_COMPLETE_AT {
            debug!("jump complete at t={t}");
            body.attacking = false;
            return JumpOutcome::Complete;
        }

        let position = trajectory.point_at(t);
        body.pose.translation = position;
        body.pose.rotation = face_towards(body.pose.rotation, position, trajectory.target);
        apply_knockback(position, &self.knockback, delta_seconds, actors);
        JumpOutcome::Airborne(position)
    }

    /// Ends the cycle: levels the body, keeping its yaw, and lowers the
    /// attacking flag.
    pub fn exit(&mut self, body: &mut SpiderBody) {
        body.pose.rotation = level(body.pose.rotation);
        body.attacking = false;
        self.trajectory = None;
    }
}
