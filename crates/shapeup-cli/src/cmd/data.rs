use crate::cmd::open_storage;
use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use shapeup_core::io;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum DataSubcommand {
    /// Write every stored year as one JSON document
    Export {
        /// Write to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Load an export document, overwriting the years it contains
    Import { file: PathBuf },
    /// Delete every stored year
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(root: &Path, subcmd: DataSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        DataSubcommand::Export { output } => export(root, output.as_deref(), json),
        DataSubcommand::Import { file } => import(root, &file, json),
        DataSubcommand::Clear { yes } => clear(root, yes, json),
    }
}

fn export(root: &Path, output: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let storage = open_storage(root)?;
    let doc = storage.export_json().context("failed to export data")?;

    let Some(path) = output else {
        println!("{doc}");
        return Ok(());
    };
    io::atomic_write(path, doc.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    let years = storage.list_stored_years();
    if json {
        print_json(&serde_json::json!({ "path": path, "years": years }))?;
    } else {
        println!("Exported {} year(s) to {}", years.len(), path.display());
    }
    Ok(())
}

fn import(root: &Path, file: &Path, json: bool) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let mut storage = open_storage(root)?;
    let count = storage.import_json(&text)?;

    if json {
        print_json(&serde_json::json!({ "imported": count }))?;
    } else {
        println!("Imported {count} year(s) from {}", file.display());
    }
    Ok(())
}

fn clear(root: &Path, yes: bool, json: bool) -> anyhow::Result<()> {
    if !yes {
        anyhow::bail!("refusing to delete all planner data without --yes");
    }
    let mut storage = open_storage(root)?;
    let years = storage.list_stored_years();
    if !storage.clear_all() {
        anyhow::bail!("failed to clear stored data");
    }

    if json {
        print_json(&serde_json::json!({ "cleared": years }))?;
    } else {
        println!("Cleared {} year(s)", years.len());
    }
    Ok(())
}
