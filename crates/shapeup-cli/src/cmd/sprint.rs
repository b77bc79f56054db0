use crate::cmd::{ensure_saved, open_store, open_store_for_week, resolve_id, PlannerStore};
use crate::output::{date_range, print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use shapeup_core::allocator;
use shapeup_core::sprint::{Sprint, SprintPatch};
use shapeup_core::types::SprintColor;
use shapeup_core::{task, PlannerError};
use std::path::Path;

#[derive(Subcommand)]
pub enum SprintSubcommand {
    /// Claim six free weeks starting at a week
    Create {
        /// First week, e.g. 2026-W03
        week_id: String,
        #[arg(long)]
        title: Option<String>,
    },
    /// List sprints in calendar order
    List,
    /// Show a sprint and its weeks
    Show { id: String },
    /// Edit a sprint's title, goal pitch or color
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        goal: Option<String>,
        /// crimson, amber, emerald, azure, violet, slate, rose or cyan
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a sprint and free its weeks
    Delete { id: String },
}

pub fn run(
    root: &Path,
    subcmd: SprintSubcommand,
    year: Option<i32>,
    json: bool,
) -> anyhow::Result<()> {
    match subcmd {
        SprintSubcommand::Create { week_id, title } => {
            create(root, &week_id, title.as_deref(), json)
        }
        SprintSubcommand::List => list(root, year, json),
        SprintSubcommand::Show { id } => show(root, year, &id, json),
        SprintSubcommand::Update {
            id,
            title,
            goal,
            color,
        } => update(root, year, &id, title, goal, color.as_deref(), json),
        SprintSubcommand::Delete { id } => delete(root, year, &id, json),
    }
}

fn find_sprint(store: &PlannerStore, query: &str) -> anyhow::Result<String> {
    let ids = store.sprints().iter().map(|s| s.id.as_str());
    match resolve_id(ids, query) {
        Ok(id) => Ok(id),
        Err(candidates) if candidates.is_empty() => {
            Err(PlannerError::SprintNotFound(query.to_string()).into())
        }
        Err(candidates) => anyhow::bail!(
            "sprint id '{query}' is ambiguous ({} matches)",
            candidates.len()
        ),
    }
}

fn span(store: &PlannerStore, sprint: &Sprint) -> String {
    let first = sprint.week_ids.first().map(String::as_str).unwrap_or("?");
    let last = sprint.week_ids.last().map(String::as_str).unwrap_or("?");
    let dates = match (
        sprint.week_ids.first().and_then(|id| store.week(id)),
        sprint.week_ids.last().and_then(|id| store.week(id)),
    ) {
        (Some(a), Some(b)) => format!(
            " ({} to {})",
            a.start_date.format("%b %d"),
            b.end_date.format("%b %d")
        ),
        _ => String::new(),
    };
    format!("{first}..{last}{dates}")
}

fn create(root: &Path, week_id: &str, title: Option<&str>, json: bool) -> anyhow::Result<()> {
    let mut store = open_store_for_week(root, week_id)?;
    let sprint = allocator::create_sprint(&mut store, week_id, title)
        .with_context(|| format!("cannot create a sprint at {week_id}"))?;
    ensure_saved(&store)?;

    if json {
        print_json(&sprint)?;
    } else {
        println!(
            "Created sprint [{}] {}: {} [{}]",
            sprint.id,
            sprint.title,
            span(&store, &sprint),
            sprint.color_theme
        );
    }
    Ok(())
}

fn list(root: &Path, year: Option<i32>, json: bool) -> anyhow::Result<()> {
    let store = open_store(root, year)?;
    let sprints = allocator::sorted_sprints(store.data());

    if json {
        print_json(&sprints)?;
        return Ok(());
    }
    if sprints.is_empty() {
        println!("No sprints in {}.", store.year());
        return Ok(());
    }
    let rows = sprints
        .iter()
        .map(|s| {
            vec![
                s.id.clone(),
                s.title.clone(),
                s.color_theme.to_string(),
                span(&store, s),
                s.goal_pitch.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "TITLE", "COLOR", "WEEKS", "GOAL"], rows);
    Ok(())
}

fn show(root: &Path, year: Option<i32>, query: &str, json: bool) -> anyhow::Result<()> {
    let store = open_store(root, year)?;
    let id = find_sprint(&store, query)?;
    let Some(sprint) = store.data().sprint(&id) else {
        return Err(PlannerError::SprintNotFound(id).into());
    };
    let weeks = store.weeks_by_sprint(&id);

    if json {
        print_json(&serde_json::json!({ "sprint": sprint, "weeks": weeks }))?;
        return Ok(());
    }

    println!("Sprint: {} [{}]", sprint.title, sprint.id);
    println!("Color:  {}", sprint.color_theme);
    println!("Weeks:  {}", span(&store, sprint));
    if !sprint.goal_pitch.is_empty() {
        println!("Goal:   {}", sprint.goal_pitch);
    }
    println!();
    let rows = weeks
        .iter()
        .map(|w| vec![w.id.clone(), date_range(w), task::summarize(&w.tasks)])
        .collect();
    print_table(&["WEEK", "DATES", "TASKS"], rows);
    Ok(())
}

fn update(
    root: &Path,
    year: Option<i32>,
    query: &str,
    title: Option<String>,
    goal: Option<String>,
    color: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let color_theme = color.map(str::parse::<SprintColor>).transpose()?;
    let patch = SprintPatch {
        title,
        goal_pitch: goal,
        color_theme,
    };
    if patch.is_empty() {
        anyhow::bail!("nothing to update: pass --title, --goal or --color");
    }

    let mut store = open_store(root, year)?;
    let id = find_sprint(&store, query)?;
    if !allocator::update_sprint(&mut store, &id, &patch) {
        return Err(PlannerError::SprintNotFound(id).into());
    }
    ensure_saved(&store)?;

    let Some(sprint) = store.data().sprint(&id) else {
        return Err(PlannerError::SprintNotFound(id).into());
    };
    if json {
        print_json(sprint)?;
    } else {
        println!("Updated sprint [{}] {}", sprint.id, sprint.title);
    }
    Ok(())
}

fn delete(root: &Path, year: Option<i32>, query: &str, json: bool) -> anyhow::Result<()> {
    let mut store = open_store(root, year)?;
    let id = find_sprint(&store, query)?;
    if !allocator::delete_sprint(&mut store, &id) {
        return Err(PlannerError::SprintNotFound(id).into());
    }
    ensure_saved(&store)?;

    if json {
        print_json(&serde_json::json!({ "sprint_id": id, "deleted": true }))?;
    } else {
        println!("Deleted sprint [{id}]");
    }
    Ok(())
}
