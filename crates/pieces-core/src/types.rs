use crate::error::{PiecesError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Low,
    Mid,
    High,
}

impl Tier {
    /// All tiers in redistribution priority order.
    pub fn all() -> &'static [Tier] {
        &[Tier::Low, Tier::Mid, Tier::High]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Low => "low",
            Tier::Mid => "mid",
            Tier::High => "high",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = PiecesError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "low" => Ok(Tier::Low),
            "mid" => Ok(Tier::Mid),
            "high" => Ok(Tier::High),
            _ => Err(PiecesError::InvalidTier(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// TierRatios
// ---------------------------------------------------------------------------

const RATIO_TOLERANCE: f64 = 1e-9;

/// Share of a batch assigned to each tier. Always sums to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierRatios {
    low: f64,
    mid: f64,
    high: f64,
}

impl TierRatios {
    pub fn new(low: f64, mid: f64, high: f64) -> Result<Self> {
        let sum = low + mid + high;
        let parts_ok = [low, mid, high].iter().all(|r| r.is_finite() && *r >= 0.0);
        if !parts_ok || !sum.is_finite() || (sum - 1.0).abs() > RATIO_TOLERANCE {
            return Err(PiecesError::RatioSum(sum));
        }
        Ok(Self { low, mid, high })
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn mid(&self) -> f64 {
        self.mid
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn get(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Low => self.low,
            Tier::Mid => self.mid,
            Tier::High => self.high,
        }
    }
}

// ---------------------------------------------------------------------------
// SkillProfile
// ---------------------------------------------------------------------------

/// Named target profile. Each preset maps to a fixed ratio triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillProfile {
    #[serde(rename = "high")]
    HighTarget,
    #[serde(rename = "mid")]
    MidTarget,
    #[serde(rename = "low")]
    LowTarget,
}

impl SkillProfile {
    pub fn all() -> &'static [SkillProfile] {
        &[
            SkillProfile::HighTarget,
            SkillProfile::MidTarget,
            SkillProfile::LowTarget,
        ]
    }

    pub fn ratios(self) -> TierRatios {
        // Literal presets; each triple sums to exactly 1.0.
        let (low, mid, high) = match self {
            SkillProfile::HighTarget => (0.20, 0.30, 0.50),
            SkillProfile::MidTarget => (0.25, 0.50, 0.25),
            SkillProfile::LowTarget => (0.50, 0.30, 0.20),
        };
        TierRatios { low, mid, high }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SkillProfile::HighTarget => "high",
            SkillProfile::MidTarget => "mid",
            SkillProfile::LowTarget => "low",
        }
    }
}

impl fmt::Display for SkillProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SkillProfile {
    type Err = PiecesError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "high" => Ok(SkillProfile::HighTarget),
            "mid" => Ok(SkillProfile::MidTarget),
            "low" => Ok(SkillProfile::LowTarget),
            _ => Err(PiecesError::InvalidProfile(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
