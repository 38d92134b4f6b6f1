//! Entry points used by calling services: tiered selection and reorder.

use crate::distribution::{plan_distribution, DistributionQuota};
use crate::error::Result;
use crate::ordering::ReorderCoordinator;
use crate::position::PositionKey;
use crate::store::{AvailabilitySource, GroupMemberSource, PersistenceSink};
use crate::types::{SkillProfile, Tier};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Reorder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReorderOutcome {
    pub moved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_position: Option<PositionKey>,
}

impl ReorderOutcome {
    pub fn unchanged() -> Self {
        Self {
            moved: false,
            new_position: None,
        }
    }
}

/// Move one item of `group_id` between two neighbours and persist it.
///
/// Writes at most one row. A failed validation writes nothing.
pub fn reorder<S>(
    store: &mut S,
    group_id: &str,
    moving_id: &str,
    before_id: Option<&str>,
    after_id: Option<&str>,
) -> Result<ReorderOutcome>
where
    S: GroupMemberSource + PersistenceSink,
{
    let planned = ReorderCoordinator::new(&*store).move_to(group_id, moving_id, before_id, after_id)?;
    let Some(item) = planned else {
        return Ok(ReorderOutcome::unchanged());
    };
    store.save_item(&item)?;
    tracing::info!(
        group = group_id,
        record = moving_id,
        position = %item.position,
        "reordered item"
    );
    Ok(ReorderOutcome {
        moved: true,
        new_position: Some(item.position),
    })
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SelectedProblem {
    pub tier: Tier,
    pub problem_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Selection {
    pub quota: DistributionQuota,
    pub problems: Vec<SelectedProblem>,
}

/// Plan a tiered batch of `requested_total` problems and fetch them.
pub fn select_problems<A>(
    source: &A,
    profile: SkillProfile,
    requested_total: u64,
) -> Result<Selection>
where
    A: AvailabilitySource + ?Sized,
{
    let available = source.available_counts()?;
    let quota = plan_distribution(profile, requested_total, available);

    // Counts come from the source, so they size nothing up front.
    let mut problems = Vec::new();
    for &tier in Tier::all() {
        let want = quota.get(tier);
        if want == 0 {
            continue;
        }
        let fetched = source.items_for_tier(tier, want)?;
        let limit = usize::try_from(want).unwrap_or(usize::MAX);
        if fetched.len() > limit {
            tracing::warn!(%tier, want, got = fetched.len(), "source returned more problems than asked");
        }
        problems.extend(
            fetched
                .into_iter()
                .take(limit)
                .map(|problem_id| SelectedProblem { tier, problem_id }),
        );
    }
    Ok(Selection { quota, problems })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
