//! Tier distribution planning.
//!
//! Splits a requested problem count across the three difficulty tiers
//! according to a skill profile, then clamps the split to what each tier can
//! actually supply. Pure computation; fetching the concrete problems is the
//! caller's job.

use crate::error::{PiecesError, Result};
use crate::types::{SkillProfile, Tier};
use serde::Serialize;

// ---------------------------------------------------------------------------
// AvailableCounts
// ---------------------------------------------------------------------------

/// Number of currently selectable problems in each tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AvailableCounts {
    pub low: u64,
    pub mid: u64,
    pub high: u64,
}

impl AvailableCounts {
    /// Build from signed counts as they come back from a count query.
    pub fn new(low: i64, mid: i64, high: i64) -> Result<Self> {
        Ok(Self {
            low: non_negative("low", low)?,
            mid: non_negative("mid", mid)?,
            high: non_negative("high", high)?,
        })
    }

    /// Every tier can supply `n` problems.
    pub fn uniform(n: u64) -> Self {
        Self {
            low: n,
            mid: n,
            high: n,
        }
    }

    pub fn get(&self, tier: Tier) -> u64 {
        match tier {
            Tier::Low => self.low,
            Tier::Mid => self.mid,
            Tier::High => self.high,
        }
    }

    /// Total supply across tiers, saturating at `u64::MAX`.
    pub fn sum(&self) -> u64 {
        self.low.saturating_add(self.mid).saturating_add(self.high)
    }

    pub fn is_empty(&self) -> bool {
        self.low == 0 && self.mid == 0 && self.high == 0
    }
}

// ---------------------------------------------------------------------------
// DistributionQuota
// ---------------------------------------------------------------------------

/// How many problems to draw from each tier. `low + mid + high == total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DistributionQuota {
    low: u64,
    mid: u64,
    high: u64,
    total: u64,
}

impl DistributionQuota {
    pub fn new(low: i64, mid: i64, high: i64, total: i64) -> Result<Self> {
        let low = non_negative("low", low)?;
        let mid = non_negative("mid", mid)?;
        let high = non_negative("high", high)?;
        let total = non_negative("total", total)?;
        let sum = low.saturating_add(mid).saturating_add(high);
        if sum != total {
            return Err(PiecesError::QuotaSumMismatch { sum, total });
        }
        Ok(Self {
            low,
            mid,
            high,
            total,
        })
    }

    pub fn empty() -> Self {
        Self {
            low: 0,
            mid: 0,
            high: 0,
            total: 0,
        }
    }

    pub fn low(&self) -> u64 {
        self.low
    }

    pub fn mid(&self) -> u64 {
        self.mid
    }

    pub fn high(&self) -> u64 {
        self.high
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn get(&self, tier: Tier) -> u64 {
        match tier {
            Tier::Low => self.low,
            Tier::Mid => self.mid,
            Tier::High => self.high,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

fn non_negative(field: &'static str, value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| PiecesError::NegativeCount { field, value })
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

// Absorbs float noise such as 0.3 * n landing just below an integer.
const FLOOR_EPSILON: f64 = 1e-9;

fn floor_share(total: u64, ratio: f64) -> u64 {
    (total as f64 * ratio + FLOOR_EPSILON).floor() as u64
}

/// Compute the per-tier quota for `requested_total` problems.
///
/// The returned total is never larger than `requested_total`; when the tiers
/// together cannot supply the request the total shrinks instead of failing.
pub fn plan_distribution(
    profile: SkillProfile,
    requested_total: u64,
    available: AvailableCounts,
) -> DistributionQuota {
    if requested_total == 0 || available.is_empty() {
        return DistributionQuota::empty();
    }

    let ratios = profile.ratios();
    let ideal_low = floor_share(requested_total, ratios.low()).min(requested_total);
    let ideal_mid = floor_share(requested_total, ratios.mid()).min(requested_total - ideal_low);
    let ideal_high = requested_total - ideal_low - ideal_mid;

    let mut planned = [
        ideal_low.min(available.low),
        ideal_mid.min(available.mid),
        ideal_high.min(available.high),
    ];
    let mut shortfall = requested_total - planned.iter().sum::<u64>();

    for (slot, &tier) in planned.iter_mut().zip(Tier::all()) {
        if shortfall == 0 {
            break;
        }
        let spare = available.get(tier) - *slot;
        let take = spare.min(shortfall);
        *slot += take;
        shortfall -= take;
    }

    let [low, mid, high] = planned;
    let total = requested_total - shortfall;

    tracing::debug!(
        %profile,
        requested_total,
        ideal = ?(ideal_low, ideal_mid, ideal_high),
        planned = ?(low, mid, high),
        "planned tier distribution"
    );
    if shortfall > 0 {
        tracing::warn!(
            %profile,
            requested_total,
            total,
            "tiers cannot supply the full request; distribution degraded"
        );
    }

    DistributionQuota {
        low,
        mid,
        high,
        total,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn unlimited() -> AvailableCounts {
        AvailableCounts::uniform(1_000)
    }

    #[test]
    fn high_target_eleven_unlimited() {
        let q = plan_distribution(SkillProfile::HighTarget, 11, unlimited());
        assert_eq!((q.low(), q.mid(), q.high(), q.total()), (2, 3, 6, 11));
    }

    #[test]
    fn mid_shortage_redistributes_to_low_first() {
        let available = AvailableCounts::new(10, 1, 10).unwrap();
        let q = plan_distribution(SkillProfile::HighTarget, 10, available);
        assert_eq!((q.low(), q.mid(), q.high(), q.total()), (4, 1, 5, 10));
    }

    #[test]
    fn shortfall_falls_through_to_next_tier() {
        // Ideal for mid target of 8 is 2/4/2. Low and mid are short.
        let available = AvailableCounts::new(1, 2, 10).unwrap();
        let q = plan_distribution(SkillProfile::MidTarget, 8, available);
        assert_eq!((q.low(), q.mid(), q.high(), q.total()), (1, 2, 5, 8));
    }

    #[test]
    fn undersupply_shrinks_total() {
        let available = AvailableCounts::new(1, 1, 1).unwrap();
        let q = plan_distribution(SkillProfile::LowTarget, 10, available);
        assert_eq!((q.low(), q.mid(), q.high(), q.total()), (1, 1, 1, 3));
    }

    #[test]
    fn zero_request_is_empty() {
        let q = plan_distribution(SkillProfile::MidTarget, 0, unlimited());
        assert_eq!(q, DistributionQuota::empty());
    }

    #[test]
    fn no_availability_is_empty() {
        let q = plan_distribution(SkillProfile::HighTarget, 25, AvailableCounts::default());
        assert_eq!(q, DistributionQuota::empty());
        assert!(q.is_empty());
    }

    #[test]
    fn exact_products_are_not_floored_down() {
        // 0.3 * 10 and 0.3 * 20 must floor to 3 and 6.
        let q = plan_distribution(SkillProfile::HighTarget, 10, unlimited());
        assert_eq!((q.low(), q.mid(), q.high()), (2, 3, 5));
        let q = plan_distribution(SkillProfile::LowTarget, 20, unlimited());
        assert_eq!((q.low(), q.mid(), q.high()), (10, 6, 4));
    }

    #[test]
    fn near_max_availability_does_not_overflow() {
        let available = AvailableCounts::new(i64::MAX, i64::MAX, i64::MAX).unwrap();
        let q = plan_distribution(SkillProfile::HighTarget, 10, available);
        assert_eq!((q.low(), q.mid(), q.high(), q.total()), (2, 3, 5, 10));

        let huge = AvailableCounts {
            low: u64::MAX,
            mid: 1,
            high: 0,
        };
        assert_eq!(huge.sum(), u64::MAX);
        assert!(!huge.is_empty());
        let q = plan_distribution(SkillProfile::LowTarget, 10, huge);
        assert_eq!((q.low(), q.mid(), q.high(), q.total()), (9, 1, 0, 10));
    }

    #[test]
    fn counts_reject_negative() {
        let err = AvailableCounts::new(3, -1, 0).unwrap_err();
        assert!(matches!(
            err,
            PiecesError::NegativeCount {
                field: "mid",
                value: -1
            }
        ));
    }

    #[test]
    fn quota_rejects_sum_mismatch() {
        assert!(matches!(
            DistributionQuota::new(1, 2, 3, 7),
            Err(PiecesError::QuotaSumMismatch { sum: 6, total: 7 })
        ));
        assert!(DistributionQuota::new(-1, 2, 3, 4).is_err());
        assert!(matches!(
            DistributionQuota::new(i64::MAX, i64::MAX, i64::MAX, 1),
            Err(PiecesError::QuotaSumMismatch { .. })
        ));
        let q = DistributionQuota::new(1, 2, 3, 6).unwrap();
        assert_eq!(q.get(Tier::Mid), 2);
    }
}
