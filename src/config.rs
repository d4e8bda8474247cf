//! Designer tuning loaded from JSON.
//!
//! Every field is optional in the file; missing values fall back to the
//! defaults in [`crate::constants`].

use std::fs;
use std::path::{Path, PathBuf};

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::knockback::{ActorCategory, ActorFilter, KnockbackParams};
use crate::{
    ALL_LAYERS, ARC_HEIGHT, CHASE_SPEED, DETECTION_RADIUS, JUMP_COOLDOWN, JUMP_RANGE, JUMP_SPEED,
    KNOCKBACK_FORCE, KNOCKBACK_HEIGHT, KNOCKBACK_RADIUS,
};

/// Errors raised while loading a [`SpiderConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid JSON for this schema.
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value is out of range.
    #[error("`{field}` must be {requirement}, got {value}")]
    Invalid {
        /// Offending field name.
        field: &'static str,
        /// Human readable constraint.
        requirement: &'static str,
        /// Value found.
        value: f32,
    },
}

/// Tunable scalars for the spider behaviour.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpiderConfig {
    /// Normalised arc progress per second.
    pub jump_speed: f32,
    /// Height of the arc's control point above the midpoint.
    pub arc_height: f32,
    /// Knockback displacement scale per second.
    pub knockback_force: f32,
    /// Upward lift added to the knockback direction.
    pub knockback_height: f32,
    /// Knockback overlap radius.
    pub knockback_radius: f32,
    /// Layers that knockback and targeting consider.
    pub player_layer_mask: u32,
    /// Category that knockback and targeting consider.
    pub target_category: ActorCategory,
    /// Distance at which a player is noticed.
    pub detection_radius: f32,
    /// Ground speed while chasing.
    pub chase_speed: f32,
    /// Horizontal distance at which the spider jumps.
    pub jump_range: f32,
    /// Seconds between jumps.
    pub jump_cooldown: f32,
}

impl Default for SpiderConfig {
    fn default() -> Self {
        Self {
            jump_speed: JUMP_SPEED,
            arc_height: ARC_HEIGHT,
            knockback_force: KNOCKBACK_FORCE,
            knockback_height: KNOCKBACK_HEIGHT,
            knockback_radius: KNOCKBACK_RADIUS,
            player_layer_mask: ALL_LAYERS,
            target_category: ActorCategory::Player,
            detection_radius: DETECTION_RADIUS,
            chase_speed: CHASE_SPEED,
            jump_range: JUMP_RANGE,
            jump_cooldown: JUMP_COOLDOWN,
        }
    }
}

impl SpiderConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown fields and
    /// [`ConfigError::Invalid`] for out-of-range values.
    ///
    /// # Examples
    /// ```
    /// use spider_ai::SpiderConfig;
    /// let config = SpiderConfig::from_json_str(r#"{ "arc_height": 4.0 }"#).unwrap();
    /// assert_eq!(config.arc_height, 4.0);
    /// assert_eq!(config.jump_speed, spider_ai::JUMP_SPEED);
    /// ```
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()
    }

    /// Reads, parses and validates the file at `path`.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise
    /// the errors of [`Self::from_json_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Checks that every scalar is finite and in range.
    ///
    /// # Errors
    /// Returns the first [`ConfigError::Invalid`] found.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if !(self.jump_speed.is_finite() && self.jump_speed > 0.0) {
            return Err(ConfigError::Invalid {
                field: "jump_speed",
                requirement: "finite and positive",
                value: self.jump_speed,
            });
        }
        if !self.arc_height.is_finite() {
            return Err(ConfigError::Invalid {
                field: "arc_height",
                requirement: "finite",
                value: self.arc_height,
            });
        }
        let non_negative = [
            ("knockback_force", self.knockback_force),
            ("knockback_height", self.knockback_height),
            ("knockback_radius", self.knockback_radius),
            ("detection_radius", self.detection_radius),
            ("chase_speed", self.chase_speed),
            ("jump_range", self.jump_range),
            ("jump_cooldown", self.jump_cooldown),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    requirement: "finite and non-negative",
                    value,
                });
            }
        }
        Ok(self)
    }

    /// Actors the spider hunts and pushes.
    #[must_use]
    pub const fn target_filter(&self) -> ActorFilter {
        ActorFilter {
            layer_mask: self.player_layer_mask,
            category: self.target_category,
        }
    }

    /// Knockback tuning derived from this configuration.
    #[must_use]
    pub const fn knockback_params(&self) -> KnockbackParams {
        KnockbackParams {
            force: self.knockback_force,
            height: self.knockback_height,
            radius: self.knockback_radius,
            filter: self.target_filter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn empty_document_uses_defaults() {
        let config = SpiderConfig::from_json_str("{}").expect("defaults are valid");
        assert_eq!(config, SpiderConfig::default());
    }

    #[rstest]
    fn category_parses_snake_case() {
        let config = SpiderConfig::from_json_str(r#"{ "target_category": "enemy" }"#)
            .expect("category should parse");
        assert_eq!(config.target_filter().category, ActorCategory::Enemy);
    }

    #[rstest]
    #[case::zero_speed(r#"{ "jump_speed": 0.0 }"#, "jump_speed")]
    #[case::negative_radius(r#"{ "knockback_radius": -1.0 }"#, "knockback_radius")]
    #[case::negative_cooldown(r#"{ "jump_cooldown": -0.5 }"#, "jump_cooldown")]
    fn rejects_out_of_range(#[case] text: &str, #[case] expected: &str) {
        match SpiderConfig::from_json_str(text) {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected),
            other => panic!("expected invalid {expected}, got {other:?}"),
        }
    }

    #[rstest]
    fn rejects_unknown_fields() {
        let result = SpiderConfig::from_json_str(r#"{ "jump_sped": 2.0 }"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[rstest]
    fn missing_file_reports_path() {
        let path = Path::new("definitely/not/here.json");
        let err = SpiderConfig::load(path).expect_err("file is missing");
        assert!(err.to_string().contains("definitely/not/here.json"));
    }

    #[rstest]
    fn knockback_params_follow_fields() {
        let config = SpiderConfig {
            knockback_force: 2.0,
            knockback_height: 3.0,
            knockback_radius: 4.0,
            player_layer_mask: 0b1,
            ..SpiderConfig::default()
        };
        let params = config.knockback_params();
        assert_eq!(params.force, 2.0);
        assert_eq!(params.height, 3.0);
        assert_eq!(params.radius, 4.0);
        assert_eq!(params.filter.layer_mask, 0b1);
    }
}
