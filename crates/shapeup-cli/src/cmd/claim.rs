use crate::cmd::{ensure_saved, open_store_for_week, PlannerStore};
use crate::output::print_json;
use clap::Subcommand;
use shapeup_core::types::MAX_VACATION_WEEKS;
use std::path::Path;

#[derive(Subcommand)]
pub enum ClaimSubcommand {
    /// Flip the claim on a week
    Toggle { week_id: String },
}

#[derive(Debug, Clone, Copy)]
pub enum Claim {
    Vacation,
    Cooldown,
}

impl Claim {
    fn label(self) -> &'static str {
        match self {
            Claim::Vacation => "vacation",
            Claim::Cooldown => "cooldown",
        }
    }
}

pub fn run(root: &Path, claim: Claim, subcmd: ClaimSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ClaimSubcommand::Toggle { week_id } => toggle(root, claim, &week_id, json),
    }
}

/// Why turning `claim` on for this week would be refused, if it would be.
fn refusal(store: &PlannerStore, claim: Claim, week_id: &str) -> Option<String> {
    let week = store.week(week_id)?;
    if week.sprint_id.is_some() {
        return Some(format!("{week_id} belongs to a sprint"));
    }
    match claim {
        Claim::Vacation if week.is_cooldown => Some(format!("{week_id} is a cooldown week")),
        Claim::Vacation if !store.can_add_vacation() => Some(format!(
            "vacation limit of {MAX_VACATION_WEEKS} weeks reached"
        )),
        Claim::Cooldown if week.is_vacation => Some(format!("{week_id} is a vacation week")),
        _ => None,
    }
}

fn toggle(root: &Path, claim: Claim, week_id: &str, json: bool) -> anyhow::Result<()> {
    let mut store = open_store_for_week(root, week_id)?;
    let reason = refusal(&store, claim, week_id);

    let applied = match claim {
        Claim::Vacation => store.toggle_vacation(week_id),
        Claim::Cooldown => store.toggle_cooldown(week_id),
    };
    if !applied {
        let reason = reason.unwrap_or_else(|| "change refused".to_string());
        anyhow::bail!("cannot mark {week_id} as {}: {reason}", claim.label());
    }
    ensure_saved(&store)?;

    let on = store.week(week_id).is_some_and(|w| match claim {
        Claim::Vacation => w.is_vacation,
        Claim::Cooldown => w.is_cooldown,
    });

    if json {
        print_json(&serde_json::json!({
            "week_id": week_id,
            "claim": claim.label(),
            "on": on,
            "vacation_weeks": store.vacation_count(),
            "cooldown_weeks": store.cooldown_count(),
        }))?;
        return Ok(());
    }

    let state = if on { "on" } else { "off" };
    match claim {
        Claim::Vacation => println!(
            "Vacation {state} for {week_id} ({}/{MAX_VACATION_WEEKS} used)",
            store.vacation_count()
        ),
        Claim::Cooldown => println!(
            "Cooldown {state} for {week_id} ({} cooldown weeks)",
            store.cooldown_count()
        ),
    }
    Ok(())
}
