use crate::cmd::{ensure_saved, open_store};
use crate::output::print_json;
use shapeup_core::allocator;
use std::path::Path;

/// Lay the cycle mode's sprint template over the year.
pub fn seed(root: &Path, year: Option<i32>, json: bool) -> anyhow::Result<()> {
    let mut store = open_store(root, year)?;
    let mode = store.cycle_mode();
    let created = allocator::seed_year_pattern(&mut store);
    ensure_saved(&store)?;

    if json {
        print_json(&serde_json::json!({
            "year": store.year(),
            "mode": mode,
            "sprints": created,
            "cooldown_weeks": store.cooldown_count(),
        }))?;
    } else {
        println!(
            "Seeded {} with {created} sprints ({})",
            store.year(),
            mode.info().description
        );
    }
    Ok(())
}

pub fn undo(root: &Path, year: Option<i32>, json: bool) -> anyhow::Result<()> {
    let mut store = open_store(root, year)?;
    if !store.undo() {
        anyhow::bail!("nothing to undo in {}", store.year());
    }
    ensure_saved(&store)?;

    if json {
        print_json(&serde_json::json!({
            "year": store.year(),
            "remaining": store.undo_len(),
        }))?;
    } else {
        println!("Undone ({} more step(s) available)", store.undo_len());
    }
    Ok(())
}
