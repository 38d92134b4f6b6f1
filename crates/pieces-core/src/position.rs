//! Fractional position keys.
//!
//! An item's place in a group is a positive real number. Moving an item means
//! picking a fresh key between its new neighbours, so no other row is touched.

use crate::error::{PiecesError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Key given to the first item of an empty group.
pub const DEFAULT_POSITION: f64 = 1.0;

// ---------------------------------------------------------------------------
// PositionKey
// ---------------------------------------------------------------------------

/// Finite, strictly positive sort key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct PositionKey(f64);

impl PositionKey {
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() || value <= 0.0 {
            return Err(PiecesError::InvalidPosition(value));
        }
        Ok(Self(value))
    }

    pub fn first() -> Self {
        Self(DEFAULT_POSITION)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

// NaN is rejected at construction, so total_cmp agrees with numeric order.
impl Eq for PositionKey {}

impl PartialOrd for PositionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PositionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl TryFrom<f64> for PositionKey {
    type Error = PiecesError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PositionKey> for f64 {
    fn from(key: PositionKey) -> f64 {
        key.0
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

/// Pick a key strictly after `before` and strictly before `after`.
///
/// Open ends are allowed on either side. When the two bounds are so close that
/// no representable key lies between them, returns
/// [`PiecesError::PositionExhausted`] rather than a key equal to a neighbour.
pub fn between(before: Option<PositionKey>, after: Option<PositionKey>) -> Result<PositionKey> {
    let candidate = match (before, after) {
        (None, None) => return Ok(PositionKey::first()),
        (None, Some(a)) => a.0 / 2.0,
        (Some(b), None) => b.0 + 1.0,
        (Some(b), Some(a)) => {
            if b >= a {
                return Err(PiecesError::OrderingViolation {
                    before: b.0,
                    after: a.0,
                });
            }
            b.0 + (a.0 - b.0) / 2.0
        }
    };

    let exhausted = || PiecesError::PositionExhausted {
        before: before.map(f64::from),
        after: after.map(f64::from),
    };
    let key = PositionKey::new(candidate).map_err(|_| exhausted())?;
    let above_lower = before.map_or(true, |b| key > b);
    let below_upper = after.map_or(true, |a| key < a);
    if !(above_lower && below_upper) {
        tracing::warn!(?before, ?after, "position keys exhausted between neighbours");
        return Err(exhausted());
    }
    Ok(key)
}

/// Key for appending after the current last item (or the first key when empty).
pub fn append_after(last: Option<PositionKey>) -> Result<PositionKey> {
    between(last, None)
}

/// True when the gap between two keys has shrunk below `floor`.
pub fn gap_is_tight(before: Option<PositionKey>, after: Option<PositionKey>, floor: f64) -> bool {
    match (before, after) {
        (Some(b), Some(a)) => (a.0 - b.0).abs() < floor,
        (None, Some(a)) => a.0 < floor,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
