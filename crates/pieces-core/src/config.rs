use crate::document;
use crate::error::Result;
use crate::paths;
use crate::types::SkillProfile;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Profile used when a selection request names none.
    #[serde(default = "default_profile")]
    pub default_profile: SkillProfile,
    /// Problems per piece when a selection request names no count.
    #[serde(default = "default_total")]
    pub default_total: u64,
    /// Gap between neighbouring keys below which a move logs a warning.
    #[serde(default = "default_precision_floor")]
    pub precision_floor: f64,
}

fn default_profile() -> SkillProfile {
    SkillProfile::MidTarget
}

fn default_total() -> u64 {
    10
}

fn default_precision_floor() -> f64 {
    1e-9
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: default_profile(),
            default_total: default_total(),
            precision_floor: default_precision_floor(),
        }
    }
}

impl Config {
    /// Load `.pieces/config.yaml`, falling back to defaults when absent.
    pub fn load(root: &Path) -> Result<Self> {
        let config = document::read_yaml(&paths::config_path(root))?;
        Ok(config.unwrap_or_default())
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        document::write_yaml(&paths::config_path(root), self)
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if !self.precision_floor.is_finite() || self.precision_floor <= 0.0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "precision_floor must be a positive number, got {}",
                    self.precision_floor
                ),
            });
        }
        if self.default_total == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "default_total is 0: selections without an explicit count are empty"
                    .to_string(),
            });
        }
        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
