use crate::cmd::{ensure_saved, open_storage, open_store};
use crate::output::{print_json, print_table};
use clap::Subcommand;
use shapeup_core::types::MAX_VACATION_WEEKS;
use shapeup_core::{calendar, PlannerError};
use std::path::Path;

#[derive(Subcommand)]
pub enum YearSubcommand {
    /// Summarize the current year
    Show,
    /// List every stored year
    List,
    /// Make a year current, generating it if needed
    Switch { year: i32 },
    /// Delete a stored year
    Delete { year: i32 },
}

pub fn run(root: &Path, subcmd: YearSubcommand, year: Option<i32>, json: bool) -> anyhow::Result<()> {
    match subcmd {
        YearSubcommand::Show => show(root, year, json),
        YearSubcommand::List => list(root, json),
        YearSubcommand::Switch { year } => switch(root, year, json),
        YearSubcommand::Delete { year } => delete(root, year, json),
    }
}

fn show(root: &Path, year: Option<i32>, json: bool) -> anyhow::Result<()> {
    let store = open_store(root, year)?;
    let data = store.data();
    let current_week = calendar::current_week_id();
    let current_week = data.week(&current_week).map(|w| w.id.clone());
    let mode = store.cycle_mode();

    if json {
        print_json(&serde_json::json!({
            "year": data.year,
            "weeks": data.weeks.len(),
            "sprints": data.sprints.len(),
            "vacation_weeks": data.vacation_count(),
            "max_vacation_weeks": MAX_VACATION_WEEKS,
            "cooldown_weeks": data.cooldown_count(),
            "free_weeks": data.available_weeks().len(),
            "cycle_mode": mode,
            "current_week": current_week,
        }))?;
        return Ok(());
    }

    println!("Year:       {}", data.year);
    println!("Weeks:      {}", data.weeks.len());
    println!("Sprints:    {}", data.sprints.len());
    println!(
        "Vacation:   {}/{MAX_VACATION_WEEKS}",
        data.vacation_count()
    );
    println!("Cooldown:   {}", data.cooldown_count());
    println!("Free:       {}", data.available_weeks().len());
    println!("Cycle mode: {} ({})", mode.info().label, mode.info().description);
    if let Some(id) = current_week {
        println!("This week:  {id}");
    }
    Ok(())
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let storage = open_storage(root)?;
    let years = storage.list_stored_years();
    let current = storage.load_current_year();

    if json {
        print_json(&serde_json::json!({ "years": years, "current": current }))?;
        return Ok(());
    }
    if years.is_empty() {
        println!("No stored years.");
        return Ok(());
    }
    let rows = years
        .iter()
        .map(|y| {
            let marker = if Some(*y) == current { "*" } else { "" };
            vec![y.to_string(), marker.to_string()]
        })
        .collect();
    print_table(&["YEAR", "CURRENT"], rows);
    Ok(())
}

fn switch(root: &Path, year: i32, json: bool) -> anyhow::Result<()> {
    let mut store = open_store(root, None)?;
    store.set_year(year)?;
    ensure_saved(&store)?;

    if json {
        print_json(&serde_json::json!({ "year": year, "weeks": store.weeks().len() }))?;
    } else {
        println!("Switched to {year} ({} weeks)", store.weeks().len());
    }
    Ok(())
}

fn delete(root: &Path, year: i32, json: bool) -> anyhow::Result<()> {
    let mut storage = open_storage(root)?;
    if !storage.has_year(year) {
        return Err(PlannerError::YearNotFound(year).into());
    }
    if !storage.delete_year(year) {
        anyhow::bail!("failed to delete year {year}");
    }

    if json {
        print_json(&serde_json::json!({ "year": year, "deleted": true }))?;
    } else {
        println!("Deleted {year}");
    }
    Ok(())
}
