use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use shapeup_core::config::{Config, WarnLevel};
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective configuration
    Show,

    /// Check config.yaml for unusable settings
    Validate,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Validate => validate(root, json),
    }
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    if json {
        print_json(&serde_json::json!({
            "root": root,
            "database_path": config.database_path(root),
            "config": config,
        }))?;
    } else {
        println!("Root:        {}", root.display());
        println!("Database:    {}", config.database_path(root).display());
        println!("Key prefix:  {}", config.storage.key_prefix);
        println!("Undo depth:  {}", config.undo_depth);
    }
    Ok(())
}

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let warnings = config.validate();

    if json {
        print_json(&serde_json::json!({ "warnings": warnings }))?;
    } else if warnings.is_empty() {
        println!("{}: ok", root.join(shapeup_core::paths::CONFIG_FILE).display());
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config has errors; fix config.yaml before continuing");
    }
    Ok(())
}
