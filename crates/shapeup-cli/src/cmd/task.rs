use crate::cmd::{ensure_saved, open_store_for_week, parse_week, resolve_id, PlannerStore};
use crate::output::{print_json, print_table};
use clap::Subcommand;
use shapeup_core::task::{self as task_ops, TaskPatch};
use shapeup_core::PlannerError;
use std::path::Path;

#[derive(Subcommand)]
pub enum TaskSubcommand {
    /// Add a task to a week
    Add {
        week_id: String,
        #[arg(required = true)]
        title: Vec<String>,
    },
    /// List a week's tasks
    List { week_id: String },
    /// Rename a task
    Edit {
        week_id: String,
        task_id: String,
        #[arg(long)]
        title: String,
    },
    /// Mark a task completed
    Done { week_id: String, task_id: String },
    /// Mark a task not completed
    Undone { week_id: String, task_id: String },
    /// Delete a task
    Delete { week_id: String, task_id: String },
    /// Move a task to another week of the same year
    Move {
        task_id: String,
        from: String,
        to: String,
    },
}

pub fn run(root: &Path, subcmd: TaskSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        TaskSubcommand::Add { week_id, title } => add(root, &week_id, &title.join(" "), json),
        TaskSubcommand::List { week_id } => list(root, &week_id, json),
        TaskSubcommand::Edit {
            week_id,
            task_id,
            title,
        } => edit(root, &week_id, &task_id, TaskPatch::title(title), json),
        TaskSubcommand::Done { week_id, task_id } => {
            edit(root, &week_id, &task_id, TaskPatch::completed(true), json)
        }
        TaskSubcommand::Undone { week_id, task_id } => {
            edit(root, &week_id, &task_id, TaskPatch::completed(false), json)
        }
        TaskSubcommand::Delete { week_id, task_id } => delete(root, &week_id, &task_id, json),
        TaskSubcommand::Move { task_id, from, to } => move_task(root, &task_id, &from, &to, json),
    }
}

fn find_task(store: &PlannerStore, week_id: &str, query: &str) -> anyhow::Result<String> {
    let tasks = store
        .week(week_id)
        .map(|w| w.tasks.as_slice())
        .unwrap_or_default();
    match resolve_id(tasks.iter().map(|t| t.id.as_str()), query) {
        Ok(id) => Ok(id),
        Err(candidates) if candidates.is_empty() => {
            Err(PlannerError::TaskNotFound(query.to_string()).into())
        }
        Err(candidates) => anyhow::bail!(
            "task id '{query}' is ambiguous in {week_id} ({} matches)",
            candidates.len()
        ),
    }
}

fn add(root: &Path, week_id: &str, title: &str, json: bool) -> anyhow::Result<()> {
    let mut store = open_store_for_week(root, week_id)?;
    let Some(task) = store.add_task(week_id, title) else {
        anyhow::bail!("task title must not be empty");
    };
    ensure_saved(&store)?;

    if json {
        print_json(&task)?;
    } else {
        println!("Added task [{}] to {week_id}: {}", task.id, task.title);
    }
    Ok(())
}

fn list(root: &Path, week_id: &str, json: bool) -> anyhow::Result<()> {
    let store = open_store_for_week(root, week_id)?;
    let tasks = store
        .week(week_id)
        .map(|w| w.tasks.as_slice())
        .unwrap_or_default();

    if json {
        print_json(&tasks)?;
        return Ok(());
    }
    if tasks.is_empty() {
        println!("No tasks in {week_id}.");
        return Ok(());
    }
    let rows = tasks
        .iter()
        .map(|t| {
            let done = if t.completed { "yes" } else { "no" };
            vec![t.id.clone(), done.to_string(), t.title.clone()]
        })
        .collect();
    print_table(&["ID", "DONE", "TITLE"], rows);
    println!("{}", task_ops::summarize(tasks));
    Ok(())
}

fn edit(
    root: &Path,
    week_id: &str,
    query: &str,
    patch: TaskPatch,
    json: bool,
) -> anyhow::Result<()> {
    let mut store = open_store_for_week(root, week_id)?;
    let task_id = find_task(&store, week_id, query)?;
    if !store.update_task(week_id, &task_id, &patch) {
        return Err(PlannerError::TaskNotFound(task_id).into());
    }
    ensure_saved(&store)?;

    let Some(task) = store.data().find_task(&task_id) else {
        return Err(PlannerError::TaskNotFound(task_id).into());
    };
    if json {
        print_json(task)?;
    } else {
        let mark = if task.completed { "x" } else { " " };
        println!("Updated task [{}] [{mark}] {}", task.id, task.title);
    }
    Ok(())
}

fn delete(root: &Path, week_id: &str, query: &str, json: bool) -> anyhow::Result<()> {
    let mut store = open_store_for_week(root, week_id)?;
    let task_id = find_task(&store, week_id, query)?;
    if !store.delete_task(week_id, &task_id) {
        return Err(PlannerError::TaskNotFound(task_id).into());
    }
    ensure_saved(&store)?;

    if json {
        print_json(&serde_json::json!({ "week_id": week_id, "task_id": task_id, "deleted": true }))?;
    } else {
        println!("Deleted task [{task_id}] from {week_id}");
    }
    Ok(())
}

fn move_task(root: &Path, query: &str, from: &str, to: &str, json: bool) -> anyhow::Result<()> {
    let (from_year, _) = parse_week(from)?;
    let (to_year, _) = parse_week(to)?;
    if from_year != to_year {
        anyhow::bail!("tasks can only move within one year ({from} -> {to})");
    }
    let mut store = open_store_for_week(root, from)?;
    if store.week(to).is_none() {
        return Err(PlannerError::WeekNotFound(to.to_string()).into());
    }
    let task_id = find_task(&store, from, query)?;
    if !store.move_task(&task_id, from, to) {
        return Err(PlannerError::TaskNotFound(task_id).into());
    }
    ensure_saved(&store)?;

    if json {
        print_json(&serde_json::json!({ "task_id": task_id, "from": from, "to": to }))?;
    } else {
        println!("Moved task [{task_id}] from {from} to {to}");
    }
    Ok(())
}
