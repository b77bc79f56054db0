//! Upgrades for persisted and imported year snapshots.
//!
//! Snapshots written before cooldowns existed have neither `cooldownWeekIds`
//! nor per-week `isCooldown`; serde defaults fill both in (`[]` / `false`).
//! [`upgrade_year`] then rebuilds the denormalized indices from the per-week
//! flags so a drifted record can never load in an inconsistent state.

use std::collections::BTreeMap;

use crate::calendar;
use crate::error::{PlannerError, Result};
use crate::model::YearData;

/// Decode one stored year and bring it up to the current shape.
pub fn parse_year(bytes: &[u8]) -> Result<YearData> {
    let data: YearData = serde_json::from_slice(bytes)?;
    Ok(upgrade_year(data))
}

pub fn upgrade_year(mut data: YearData) -> YearData {
    if data.rebuild_indices() {
        tracing::warn!(year = data.year, "rebuilt vacation/cooldown indices from week flags");
    }
    let problems = data.check_invariants();
    if !problems.is_empty() {
        tracing::warn!(
            year = data.year,
            count = problems.len(),
            first = %problems[0],
            "year data violates planner invariants"
        );
    }
    data
}

/// Parse a complete export document (`{"2026": {...}, ...}`).
///
/// Either every entry parses or the whole document is rejected with a single
/// [`PlannerError::InvalidImport`].
pub fn parse_export(text: &str) -> Result<BTreeMap<i32, YearData>> {
    let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(text)
        .map_err(|e| PlannerError::InvalidImport(format!("not an export document: {e}")))?;

    let mut out = BTreeMap::new();
    for (key, value) in raw {
        let year: i32 = key
            .trim()
            .parse()
            .map_err(|_| PlannerError::InvalidImport(format!("'{key}' is not a year")))?;
        if !calendar::is_supported_year(year) {
            return Err(PlannerError::InvalidImport(format!(
                "year {year} is outside the supported range"
            )));
        }
        let mut data: YearData = serde_json::from_value(value)
            .map_err(|e| PlannerError::InvalidImport(format!("year {year}: {e}")))?;
        data.year = year;
        out.insert(year, upgrade_year(data));
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
