use crate::cmd::open_storage;
use crate::output::print_json;
use clap::Subcommand;
use shapeup_core::storage::{RedbKv, Storage};
use shapeup_core::types::CycleMode;
use std::path::Path;

#[derive(Subcommand)]
pub enum ModeSubcommand {
    /// Show the cycle mode
    Show,
    /// Set the cycle mode: 6-cycles or 8-cycles
    Set { mode: String },
    /// Switch between 6-cycles and 8-cycles
    Toggle,
}

pub fn run(root: &Path, subcmd: ModeSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ModeSubcommand::Show => {
            let storage = open_storage(root)?;
            print_mode(storage.load_cycle_mode(), json)
        }
        ModeSubcommand::Set { mode } => {
            let mode: CycleMode = mode.parse()?;
            let mut storage = open_storage(root)?;
            save_mode(&mut storage, mode, json)
        }
        ModeSubcommand::Toggle => {
            let mut storage = open_storage(root)?;
            let mode = storage.load_cycle_mode().toggled();
            save_mode(&mut storage, mode, json)
        }
    }
}

fn save_mode(storage: &mut Storage<RedbKv>, mode: CycleMode, json: bool) -> anyhow::Result<()> {
    if !storage.save_cycle_mode(mode) {
        anyhow::bail!("failed to save cycle mode");
    }
    tracing::debug!(%mode, "cycle mode saved");
    print_mode(mode, json)
}

fn print_mode(mode: CycleMode, json: bool) -> anyhow::Result<()> {
    let info = mode.info();
    if json {
        print_json(&serde_json::json!({ "mode": mode, "info": info }))?;
    } else {
        println!("{mode}: {} ({})", info.label, info.description);
    }
    Ok(())
}
