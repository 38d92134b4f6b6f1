use crate::output::print_json;
use anyhow::Context;
use clap::Args;
use pieces_core::catalog::Catalog;
use pieces_core::config::Config;
use pieces_core::store::AvailabilitySource;
use pieces_core::{plan_distribution, AvailableCounts, SkillProfile};
use std::path::Path;

#[derive(Args)]
pub struct PlanArgs {
    /// Skill profile: low, mid or high (default from config)
    #[arg(long)]
    profile: Option<SkillProfile>,
    /// Number of problems requested (default from config)
    #[arg(long)]
    total: Option<u64>,
    /// Override available LOW problems (default: count from the catalog)
    #[arg(long)]
    low: Option<u64>,
    /// Override available MID problems
    #[arg(long)]
    mid: Option<u64>,
    /// Override available HIGH problems
    #[arg(long)]
    high: Option<u64>,
}

pub fn run(root: &Path, args: PlanArgs, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let profile = args.profile.unwrap_or(config.default_profile);
    let total = args.total.unwrap_or(config.default_total);

    let counted = if args.low.is_some() && args.mid.is_some() && args.high.is_some() {
        AvailableCounts::default()
    } else {
        Catalog::load(root)
            .context("failed to load catalog")?
            .available_counts()?
    };
    let available = AvailableCounts {
        low: args.low.unwrap_or(counted.low),
        mid: args.mid.unwrap_or(counted.mid),
        high: args.high.unwrap_or(counted.high),
    };

    let quota = plan_distribution(profile, total, available);

    if json {
        let value = serde_json::json!({
            "profile": profile,
            "requested": total,
            "available": available,
            "quota": quota,
        });
        return print_json(&value);
    }

    println!("Profile:   {profile}");
    println!(
        "Available: low {}  mid {}  high {}",
        available.low, available.mid, available.high
    );
    println!(
        "Quota:     low {}  mid {}  high {}  (total {} of {total})",
        quota.low(),
        quota.mid(),
        quota.high(),
        quota.total()
    );
    if quota.total() < total {
        println!("Note: only {} of {total} problems can be supplied.", quota.total());
    }
    Ok(())
}
