//! Per-frame snapshot of the actors a spider can sense and push.
//!
//! The authority caches candidate actors from the ECS world into an
//! [`Arena`] before stepping spiders, then writes back the positions of the
//! actors that knockback moved.

use glam::Vec3;
use hashbrown::{HashMap, HashSet};

use crate::components::NetId;
use crate::knockback::{ActorCategory, ActorFilter, ActorQuery};

/// One candidate actor as seen by the authority this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorSample {
    /// Stable network identity.
    pub id: NetId,
    /// World position.
    pub position: Vec3,
    /// Gameplay category.
    pub category: ActorCategory,
    /// Layer bits matched against [`ActorFilter::layer_mask`].
    pub layers: u32,
}

impl ActorSample {
    /// Convenience constructor for a sample on every layer.
    #[must_use]
    pub const fn new(id: NetId, position: Vec3, category: ActorCategory) -> Self {
        Self {
            id,
            position,
            category,
            layers: u32::MAX,
        }
    }
}

/// In-memory actor set implementing [`ActorQuery`].
#[derive(Debug, Clone, Default)]
pub struct Arena {
    actors: Vec<ActorSample>,
    index: HashMap<NetId, usize>,
    moved: HashSet<NetId>,
}

impl Arena {
    /// Builds an arena from `samples`.
    ///
    /// When two samples share a [`NetId`] the later one wins.
    #[must_use]
    pub fn from_samples(samples: impl IntoIterator<Item = ActorSample>) -> Self {
        let mut arena = Self::default();
        for sample in samples {
            arena.insert(sample);
        }
        arena
    }

    /// Adds or replaces an actor.
    pub fn insert(&mut self, sample: ActorSample) {
        if let Some(slot) = self
            .index
            .get(&sample.id)
            .and_then(|&i| self.actors.get_mut(i))
        {
            *slot = sample;
            return;
        }
        self.index.insert(sample.id, self.actors.len());
        self.actors.push(sample);
    }

    /// All actors in insertion order.
    #[must_use]
    pub fn actors(&self) -> &[ActorSample] {
        &self.actors
    }

    /// Looks up a single actor.
    #[must_use]
    pub fn get(&self, id: NetId) -> Option<&ActorSample> {
        self.index.get(&id).and_then(|&i| self.actors.get(i))
    }

    /// Actors displaced since the arena was built.
    pub fn moved(&self) -> impl Iterator<Item = &ActorSample> {
        self.actors.iter().filter(|a| self.moved.contains(&a.id))
    }
}

impl ActorQuery for Arena {
    fn overlap_sphere(&self, center: Vec3, radius: f32, filter: &ActorFilter) -> Vec<NetId> {
        let radius_sq = radius * radius;
        self.actors
            .iter()
            .filter(|a| filter.matches(a.layers, a.category))
            .filter(|a| a.position.distance_squared(center) <= radius_sq)
            .map(|a| a.id)
            .collect()
    }

    fn position_of(&self, id: NetId) -> Option<Vec3> {
        self.get(id).map(|a| a.position)
    }

    fn displace(&mut self, id: NetId, delta: Vec3) {
        let Some(actor) = self.index.get(&id).and_then(|&i| self.actors.get_mut(i)) else {
            return;
        };
        actor.position += delta;
        self.moved.insert(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn arena() -> Arena {
        Arena::from_samples([
            ActorSample::new(NetId(1), Vec3::new(1.0, 0.0, 0.0), ActorCategory::Player),
            ActorSample::new(NetId(2), Vec3::new(5.0, 0.0, 0.0), ActorCategory::Player),
            ActorSample::new(NetId(3), Vec3::new(0.5, 0.0, 0.0), ActorCategory::Enemy),
            ActorSample {
                layers: 0b10,
                ..ActorSample::new(NetId(4), Vec3::ZERO, ActorCategory::Player)
            },
        ])
    }

    #[rstest]
    fn overlap_includes_boundary(arena: Arena) {
        let filter = ActorFilter {
            layer_mask: 0b01,
            category: ActorCategory::Player,
        };
        let hits = arena.overlap_sphere(Vec3::ZERO, 5.0, &filter);
        assert_eq!(hits, vec![NetId(1), NetId(2)]);
    }

    #[rstest]
    fn nearest_respects_filter(arena: Arena) {
        let filter = ActorFilter::category(ActorCategory::Player);
        let nearest = arena.nearest(Vec3::new(0.2, 0.0, 0.0), 10.0, &filter);
        assert_eq!(nearest.map(|(id, _)| id), Some(NetId(4)));
    }

    #[rstest]
    fn displace_tracks_moved(mut arena: Arena) {
        arena.displace(NetId(2), Vec3::Y);
        arena.displace(NetId(99), Vec3::Y);
        let moved: Vec<_> = arena.moved().map(|a| (a.id, a.position)).collect();
        assert_eq!(moved, vec![(NetId(2), Vec3::new(5.0, 1.0, 0.0))]);
    }

    #[rstest]
    fn insert_replaces_duplicate_ids() {
        let arena = Arena::from_samples([
            ActorSample::new(NetId(7), Vec3::ZERO, ActorCategory::Player),
            ActorSample::new(NetId(7), Vec3::X, ActorCategory::Player),
        ]);
        assert_eq!(arena.actors().len(), 1);
        assert_eq!(arena.position_of(NetId(7)), Some(Vec3::X));
    }
}
