//! Physics tuning
//!
//! Stored as JSON. Every field has a default, so partial files are fine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{BALL_RADIUS, DISPLACEMENT_COEF, REFLECTION_DAMPING};

/// Tunable physics constants for a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Ball radius, screen units
    pub radius: f32,
    /// Displacement-to-screen scale
    pub coef: f32,
    /// Velocity divisor on bounce (> 1 loses energy)
    pub damping: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            radius: BALL_RADIUS,
            coef: DISPLACEMENT_COEF,
            damping: REFLECTION_DAMPING,
        }
    }
}

impl PhysicsSettings {
    /// Parse from a JSON document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Replace unusable fields with their defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let usable = |v: f32| v.is_finite() && v > 0.0;

        if !usable(self.radius) {
            log::warn!("Invalid radius {}, using {}", self.radius, defaults.radius);
            self.radius = defaults.radius;
        }
        if !usable(self.coef) {
            log::warn!("Invalid coef {}, using {}", self.coef, defaults.coef);
            self.coef = defaults.coef;
        }
        if !usable(self.damping) {
            log::warn!("Invalid damping {}, using {}", self.damping, defaults.damping);
            self.damping = defaults.damping;
        }
        self
    }

    /// Load from a JSON file, falling back to defaults on any failure
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded physics settings from {}", path.display());
                    settings.sanitized()
                }
                Err(e) => {
                    log::warn!("Bad physics settings in {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::info!("Using default physics settings ({}: {})", path.display(), e);
                Self::default()
            }
        }
    }
}
