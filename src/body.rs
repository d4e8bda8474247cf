//! The acting spider's own mutable state as seen by behaviour code.

use glam::{Quat, Vec3};

/// Position and orientation of an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// World position.
    pub translation: Vec3,
    /// World rotation; forward is `-Z`.
    pub rotation: Quat,
}

impl Pose {
    /// Unrotated pose at `translation`.
    #[must_use]
    pub const fn at(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

/// Everything a behaviour state may mutate on the spider itself.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpiderBody {
    /// Current transform.
    pub pose: Pose,
    /// Raised while a jump attack is in progress.
    pub attacking: bool,
}

impl SpiderBody {
    /// Grounded, non-attacking body at `translation`.
    #[must_use]
    pub const fn at(translation: Vec3) -> Self {
        Self {
            pose: Pose::at(translation),
            attacking: false,
        }
    }
}
