//! Radial knockback applied while a spider is airborne.
//!
//! Knockback is a sustained push: every frame the spider overlaps an actor,
//! that actor is displaced by `direction * force * delta_seconds`. Repeated
//! frames accumulate. Displacements are additive, so the order in which
//! matched actors are visited does not matter.

use glam::Vec3;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::components::NetId;
use crate::vector_math::{vec_normalize, UP};

/// Gameplay category of an actor, checked in addition to its layer bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorCategory {
    /// Player-controlled character.
    #[default]
    Player,
    /// Hostile creature.
    Enemy,
    /// Inert scenery that may still carry a collider.
    Prop,
}

/// Predicate selecting which actors a proximity query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorFilter {
    /// Layer bits; an actor matches when any of its layers is set here.
    pub layer_mask: u32,
    /// Required category.
    pub category: ActorCategory,
}

impl ActorFilter {
    /// Filter matching `category` on every layer.
    #[must_use]
    pub const fn category(category: ActorCategory) -> Self {
        Self {
            layer_mask: u32::MAX,
            category,
        }
    }

    /// Returns `true` when an actor with `layers` and `category` passes.
    #[must_use]
    pub const fn matches(&self, layers: u32, category: ActorCategory) -> bool {
        self.layer_mask & layers != 0 && self.category as u8 == category as u8
    }
}

/// Immutable knockback tuning for one behaviour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnockbackParams {
    /// Displacement scale per second.
    pub force: f32,
    /// Upward lift added to the flattened push direction.
    pub height: f32,
    /// Overlap sphere radius; actors exactly on the boundary are included.
    pub radius: f32,
    /// Which actors are pushed.
    pub filter: ActorFilter,
}

/// Proximity queries and writes against the actors surrounding a spider.
///
/// This is the seam where a physics broad-phase would plug in; the
/// simulation uses [`crate::Arena`].
#[cfg_attr(test, mockall::automock)]
pub trait ActorQuery {
    /// Identifiers of actors within `radius` of `center` that pass `filter`.
    fn overlap_sphere(&self, center: Vec3, radius: f32, filter: &ActorFilter) -> Vec<NetId>;

    /// Current position of `id`, if it is known.
    fn position_of(&self, id: NetId) -> Option<Vec3>;

    /// Moves `id` by `delta`.
    fn displace(&mut self, id: NetId, delta: Vec3);

    /// Closest actor passing `filter` within `radius` of `from`.
    fn nearest(&self, from: Vec3, radius: f32, filter: &ActorFilter) -> Option<(NetId, Vec3)> {
        self.overlap_sphere(from, radius, filter)
            .into_iter()
            .filter_map(|id| self.position_of(id).map(|position| (id, position)))
            .min_by(|(_, lhs), (_, rhs)| {
                lhs.distance_squared(from)
                    .total_cmp(&rhs.distance_squared(from))
            })
    }
}

/// Displacement applied to an actor at `actor` by a source at `source`.
///
/// The horizontal push direction is the normalised offset with its vertical
/// component dropped afterwards; an actor coincident with the source gets no
/// horizontal push, only lift.
///
/// # Examples
/// ```
/// use glam::Vec3;
/// use spider_ai::knockback::{knockback_displacement, ActorCategory, ActorFilter, KnockbackParams};
/// let params = KnockbackParams {
///     force: 2.0,
///     height: 5.0,
///     radius: 5.0,
///     filter: ActorFilter::category(ActorCategory::Player),
/// };
/// assert_eq!(knockback_displacement(Vec3::ZERO, Vec3::ZERO, &params, 1.0), Vec3::new(0.0, 10.0, 0.0));
/// ```
#[must_use]
pub fn knockback_displacement(
    source: Vec3,
    actor: Vec3,
    params: &KnockbackParams,
    delta_seconds: f32,
) -> Vec3 {
    let mut direction = vec_normalize(actor - source);
    direction.y = 0.0;
    direction += UP * params.height;
    direction * params.force * delta_seconds
}

/// Pushes every matching actor around `source` and returns how many moved.
pub fn apply_knockback<Q>(
    source: Vec3,
    params: &KnockbackParams,
    delta_seconds: f32,
    actors: &mut Q,
) -> usize
where
    Q: ActorQuery + ?Sized,
{
    let hits = actors.overlap_sphere(source, params.radius, &params.filter);
    let mut pushed = 0;
    for id in hits {
        let Some(position) = actors.position_of(id) else {
            continue;
        };
        let delta = knockback_displacement(source, position, params, delta_seconds);
        debug!("knockback on {id:?}: {delta:?}");
        actors.displace(id, delta);
        pushed += 1;
    }
    pushed
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mockall::predicate::{always, eq};
    use rstest::{fixture, rstest};

    #[fixture]
    fn params() -> KnockbackParams {
        KnockbackParams {
            force: 2.0,
            height: 5.0,
            radius: 5.0,
            filter: ActorFilter::category(ActorCategory::Player),
        }
    }

    #[rstest]
    fn pushes_away_and_up(params: KnockbackParams) {
        let delta = knockback_displacement(Vec3::ZERO, Vec3::new(3.0, 0.0, 4.0), &params, 0.5);
        assert_relative_eq!(delta.x, 0.6);
        assert_relative_eq!(delta.y, 5.0);
        assert_relative_eq!(delta.z, 0.8);
    }

    #[rstest]
    fn vertical_offset_shrinks_horizontal_push(params: KnockbackParams) {
        // Normalisation happens before the vertical component is dropped.
        let delta = knockback_displacement(Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0), &params, 1.0);
        assert_relative_eq!(delta.x, 1.2);
        assert_relative_eq!(delta.y, 10.0);
        assert_relative_eq!(delta.z, 0.0);
    }

    #[rstest]
    fn filter_requires_layer_and_category() {
        let filter = ActorFilter {
            layer_mask: 0b0100,
            category: ActorCategory::Player,
        };
        assert!(filter.matches(0b0110, ActorCategory::Player));
        assert!(!filter.matches(0b0010, ActorCategory::Player));
        assert!(!filter.matches(0b0100, ActorCategory::Enemy));
    }

    #[rstest]
    fn applies_to_each_hit(params: KnockbackParams) {
        let mut actors = MockActorQuery::new();
        actors
            .expect_overlap_sphere()
            .with(eq(Vec3::ZERO), eq(5.0), always())
            .times(1)
            .returning(|_, _, _| vec![NetId(1), NetId(2)]);
        actors
            .expect_position_of()
            .with(eq(NetId(1)))
            .returning(|_| Some(Vec3::new(1.0, 0.0, 0.0)));
        actors.expect_position_of().with(eq(NetId(2))).returning(|_| None);
        actors
            .expect_displace()
            .with(eq(NetId(1)), eq(Vec3::new(2.0, 10.0, 0.0)))
            .times(1)
            .return_const(());

        let pushed = apply_knockback(Vec3::ZERO, &params, 1.0, &mut actors);
        assert_eq!(pushed, 1);
    }

    #[rstest]
    fn no_hits_means_no_writes(params: KnockbackParams) {
        let mut actors = MockActorQuery::new();
        actors.expect_overlap_sphere().returning(|_, _, _| Vec::new());
        actors.expect_displace().never();
        assert_eq!(apply_knockback(Vec3::ZERO, &params, 1.0, &mut actors), 0);
    }
}
