pub mod claim;
pub mod config;
pub mod data;
pub mod mode;
pub mod plan;
pub mod sprint;
pub mod task;
pub mod week;
pub mod year;

use anyhow::Context;
use shapeup_core::calendar;
use shapeup_core::config::Config;
use shapeup_core::storage::{RedbKv, Storage};
use shapeup_core::store::YearStore;
use shapeup_core::PlannerError;
use std::path::Path;

pub type PlannerStore = YearStore<RedbKv>;

/// Open the gateway over the configured database without loading a year.
pub fn open_storage(root: &Path) -> anyhow::Result<Storage<RedbKv>> {
    let config = Config::load(root).context("failed to load config")?;
    storage_from(root, &config)
}

fn storage_from(root: &Path, config: &Config) -> anyhow::Result<Storage<RedbKv>> {
    let db = config.database_path(root);
    let kv = RedbKv::open(&db)
        .with_context(|| format!("failed to open database {}", db.display()))?;
    Ok(Storage::with_prefix(kv, config.storage.key_prefix.clone()))
}

/// Open the live store on `year`, or on the stored current year.
pub fn open_store(root: &Path, year: Option<i32>) -> anyhow::Result<PlannerStore> {
    let config = Config::load(root).context("failed to load config")?;
    let storage = storage_from(root, &config)?;
    Ok(YearStore::open(storage, year)?.with_undo_depth(config.undo_depth))
}

/// Validate a `YYYY-Wnn` id and open the store on its year.
pub fn open_store_for_week(root: &Path, week_id: &str) -> anyhow::Result<PlannerStore> {
    let (year, _) = parse_week(week_id)?;
    let store = open_store(root, Some(year))?;
    if store.week(week_id).is_none() {
        return Err(PlannerError::WeekNotFound(week_id.to_string()).into());
    }
    Ok(store)
}

pub fn parse_week(week_id: &str) -> anyhow::Result<(i32, u32)> {
    calendar::parse_week_id(week_id)
        .ok_or_else(|| PlannerError::InvalidWeekId(week_id.to_string()).into())
}

/// Fail when the last write did not reach the database.
pub fn ensure_saved(store: &PlannerStore) -> anyhow::Result<()> {
    if !store.last_persist_ok() {
        anyhow::bail!("change applied but could not be saved to the database");
    }
    Ok(())
}

/// Match `query` against `ids` exactly, or as a unique prefix.
pub fn resolve_id<'a>(
    ids: impl IntoIterator<Item = &'a str>,
    query: &str,
) -> Result<String, Vec<String>> {
    let mut matches = Vec::new();
    for id in ids {
        if id == query {
            return Ok(id.to_string());
        }
        if id.starts_with(query) {
            matches.push(id.to_string());
        }
    }
    match matches.len() {
        1 => Ok(matches.remove(0)),
        _ => Err(matches),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_exact_and_prefix() {
        let ids = ["a1b2", "a1c3", "ffee"];
        assert_eq!(resolve_id(ids, "ffee").unwrap(), "ffee");
        assert_eq!(resolve_id(ids, "ff").unwrap(), "ffee");
        assert_eq!(resolve_id(ids, "a1").unwrap_err().len(), 2);
        assert!(resolve_id(ids, "zz").unwrap_err().is_empty());
    }

    #[test]
    fn parse_week_rejects_bad_ids() {
        assert_eq!(parse_week("2026-W07").unwrap(), (2026, 7));
        assert!(parse_week("2026-7").is_err());
        assert!(parse_week("2026-W53").is_err());
    }
}
