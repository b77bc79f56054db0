use crate::cmd::{open_store, open_store_for_week};
use crate::output::{date_range, print_json, print_table, week_status};
use clap::Subcommand;
use shapeup_core::{calendar, task};
use std::path::Path;

#[derive(Subcommand)]
pub enum WeekSubcommand {
    /// List the year's weeks
    List {
        /// Only weeks with no sprint, vacation or cooldown claim
        #[arg(long)]
        free: bool,
    },
    /// Show one week and its tasks
    Show { week_id: String },
    /// Show the week containing today
    Current,
}

pub fn run(root: &Path, subcmd: WeekSubcommand, year: Option<i32>, json: bool) -> anyhow::Result<()> {
    match subcmd {
        WeekSubcommand::List { free } => list(root, year, free, json),
        WeekSubcommand::Show { week_id } => show(root, &week_id, json),
        WeekSubcommand::Current => show(root, &calendar::current_week_id(), json),
    }
}

fn list(root: &Path, year: Option<i32>, free: bool, json: bool) -> anyhow::Result<()> {
    let store = open_store(root, year)?;
    let data = store.data();
    let weeks: Vec<_> = if free {
        data.available_weeks()
    } else {
        data.weeks.iter().collect()
    };

    if json {
        print_json(&weeks)?;
        return Ok(());
    }
    if weeks.is_empty() {
        println!("No free weeks in {}.", data.year);
        return Ok(());
    }
    let rows = weeks
        .iter()
        .map(|w| {
            vec![
                w.id.clone(),
                date_range(w),
                week_status(data, w),
                task::summarize(&w.tasks),
            ]
        })
        .collect();
    print_table(&["WEEK", "DATES", "STATUS", "TASKS"], rows);
    Ok(())
}

fn show(root: &Path, week_id: &str, json: bool) -> anyhow::Result<()> {
    let store = open_store_for_week(root, week_id)?;
    let data = store.data();
    let Some(week) = data.week(week_id) else {
        anyhow::bail!("week '{week_id}' not found");
    };

    if json {
        print_json(week)?;
        return Ok(());
    }

    println!("Week:   {}", week.id);
    println!("Dates:  {}", date_range(week));
    println!("Status: {}", week_status(data, week));
    if week.tasks.is_empty() {
        println!("Tasks:  none");
    } else {
        println!("Tasks:  {}", task::summarize(&week.tasks));
        for t in &week.tasks {
            let mark = if t.completed { "x" } else { " " };
            println!("  [{mark}] {}  {}", t.id, t.title);
        }
    }
    Ok(())
}
