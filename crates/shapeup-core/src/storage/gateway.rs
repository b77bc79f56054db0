use std::collections::BTreeMap;

use crate::error::{PlannerError, Result};
use crate::migrations;
use crate::model::YearData;
use crate::paths;
use crate::types::CycleMode;

use super::KvStore;

/// Maps planner snapshots and preferences onto a [`KvStore`].
///
/// Every year lives under `"{prefix}-{year}"` as compact JSON. Failures are
/// logged and reported as `false` / `None`; callers keep their in-memory
/// state regardless.
pub struct Storage<K: KvStore> {
    backend: K,
    prefix: String,
}

impl<K: KvStore> Storage<K> {
    pub fn new(backend: K) -> Self {
        Self::with_prefix(backend, paths::DEFAULT_KEY_PREFIX)
    }

    pub fn with_prefix(backend: K, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn backend(&self) -> &K {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut K {
        &mut self.backend
    }

    pub fn year_key(&self, year: i32) -> String {
        paths::year_key(&self.prefix, year)
    }

    // -----------------------------------------------------------------------
    // Years
    // -----------------------------------------------------------------------

    pub fn save_year(&mut self, data: &YearData) -> bool {
        let key = self.year_key(data.year);
        let result = serde_json::to_vec(data)
            .map_err(PlannerError::from)
            .and_then(|bytes| self.backend.set(&key, &bytes));
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(year = data.year, error = %e, "failed to save year data");
                false
            }
        }
    }

    pub fn load_year(&self, year: i32) -> Option<YearData> {
        let bytes = match self.backend.get(&self.year_key(year)) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::error!(year, error = %e, "failed to read year data");
                return None;
            }
        };
        match migrations::parse_year(&bytes) {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::error!(year, error = %e, "stored year data is unreadable");
                None
            }
        }
    }

    pub fn has_year(&self, year: i32) -> bool {
        matches!(self.backend.get(&self.year_key(year)), Ok(Some(_)))
    }

    /// Remove a stored year along with any undo snapshots of it.
    pub fn delete_year(&mut self, year: i32) -> bool {
        let key = self.year_key(year);
        match self.backend.remove(&key) {
            Ok(()) => self.drop_undo_for(&[year]),
            Err(e) => {
                tracing::error!(year, error = %e, "failed to delete year data");
                false
            }
        }
    }

    /// Every stored year, ascending.
    pub fn list_stored_years(&self) -> Vec<i32> {
        let keys = match self.backend.keys() {
            Ok(keys) => keys,
            Err(e) => {
                tracing::error!(error = %e, "failed to list stored years");
                return Vec::new();
            }
        };
        let mut years: Vec<i32> = keys
            .iter()
            .filter_map(|k| paths::parse_year_key(&self.prefix, k))
            .collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Remove every stored year. Preferences are left in place.
    pub fn clear_all(&mut self) -> bool {
        let mut ok = true;
        for year in self.list_stored_years() {
            ok &= self.delete_year(year);
        }
        ok &= self.remove_setting(paths::UNDO_SUFFIX);
        ok
    }

    // -----------------------------------------------------------------------
    // Preferences
    // -----------------------------------------------------------------------

    pub fn save_current_year(&mut self, year: i32) -> bool {
        self.write_setting(paths::CURRENT_YEAR_SUFFIX, year.to_string().as_bytes())
    }

    pub fn load_current_year(&self) -> Option<i32> {
        let raw = self.read_setting(paths::CURRENT_YEAR_SUFFIX)?;
        std::str::from_utf8(&raw).ok()?.trim().parse().ok()
    }

    pub fn save_cycle_mode(&mut self, mode: CycleMode) -> bool {
        self.write_setting(paths::CYCLE_MODE_SUFFIX, mode.as_str().as_bytes())
    }

    /// Stored cycle mode, or the default (`8-cycles`) when absent or malformed.
    pub fn load_cycle_mode(&self) -> CycleMode {
        self.read_setting(paths::CYCLE_MODE_SUFFIX)
            .and_then(|raw| String::from_utf8(raw).ok())
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or_default()
    }

    pub fn save_undo(&mut self, history: &[YearData]) -> bool {
        if history.is_empty() {
            return self.remove_setting(paths::UNDO_SUFFIX);
        }
        match serde_json::to_vec(history) {
            Ok(bytes) => self.write_setting(paths::UNDO_SUFFIX, &bytes),
            Err(e) => {
                tracing::error!(error = %e, "failed to encode undo history");
                false
            }
        }
    }

    pub fn load_undo(&self) -> Vec<YearData> {
        let Some(raw) = self.read_setting(paths::UNDO_SUFFIX) else {
            return Vec::new();
        };
        match serde_json::from_slice::<Vec<YearData>>(&raw) {
            Ok(history) => history.into_iter().map(migrations::upgrade_year).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable undo history");
                Vec::new()
            }
        }
    }

    /// Forget undo snapshots of `years`, whose stored data was replaced
    /// outside the store.
    fn drop_undo_for(&mut self, years: &[i32]) -> bool {
        let history = self.load_undo();
        let kept: Vec<YearData> = history
            .iter()
            .filter(|snapshot| !years.contains(&snapshot.year))
            .cloned()
            .collect();
        if kept.len() == history.len() {
            return true;
        }
        tracing::debug!(dropped = history.len() - kept.len(), "dropped stale undo snapshots");
        self.save_undo(&kept)
    }

    fn read_setting(&self, suffix: &str) -> Option<Vec<u8>> {
        match self.backend.get(&paths::setting_key(&self.prefix, suffix)) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(setting = suffix, error = %e, "failed to read setting");
                None
            }
        }
    }

    fn write_setting(&mut self, suffix: &str, value: &[u8]) -> bool {
        let key = paths::setting_key(&self.prefix, suffix);
        match self.backend.set(&key, value) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(setting = suffix, error = %e, "failed to write setting");
                false
            }
        }
    }

    fn remove_setting(&mut self, suffix: &str) -> bool {
        let key = paths::setting_key(&self.prefix, suffix);
        match self.backend.remove(&key) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(setting = suffix, error = %e, "failed to remove setting");
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Export / import
    // -----------------------------------------------------------------------

    pub fn export_all(&self) -> BTreeMap<i32, YearData> {
        self.list_stored_years()
            .into_iter()
            .filter_map(|year| self.load_year(year).map(|data| (year, data)))
            .collect()
    }

    /// Write every year in `data`, overwriting stored years. The map key wins
    /// over the snapshot's own `year` field. Undo snapshots of the overwritten
    /// years are discarded.
    pub fn import_all(&mut self, data: BTreeMap<i32, YearData>) -> bool {
        let years: Vec<i32> = data.keys().copied().collect();
        let mut ok = self.drop_undo_for(&years);
        for (year, mut year_data) in data {
            year_data.year = year;
            ok &= self.save_year(&year_data);
        }
        if !ok {
            tracing::error!("import did not complete; some years were not written");
        }
        ok
    }

    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export_all())?)
    }

    /// Parse a whole export document, then write it. Nothing is written when
    /// the document is malformed. Returns the number of years imported.
    pub fn import_json(&mut self, text: &str) -> Result<usize> {
        let parsed = migrations::parse_export(text)?;
        let count = parsed.len();
        if !self.import_all(parsed) {
            return Err(PlannerError::Storage(
                "import could not be written to storage".to_string(),
            ));
        }
        Ok(count)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::generate_year;
    use crate::storage::{MemoryKv, RedbKv};
    use tempfile::TempDir;

    fn storage() -> Storage<MemoryKv> {
        Storage::new(MemoryKv::new())
    }

    #[test]
    fn year_roundtrip() {
        let mut s = storage();
        let mut data = generate_year(2026).unwrap();
        data.toggle_vacation("2026-W30");
        assert!(s.save_year(&data));
        assert!(s.has_year(2026));
        assert_eq!(s.load_year(2026), Some(data));
        assert_eq!(s.load_year(2027), None);
    }

    #[test]
    fn list_stored_years_is_sorted_and_ignores_settings() {
        let mut s = storage();
        for y in [2027, 2025, 2026] {
            s.save_year(&generate_year(y).unwrap());
        }
        s.save_current_year(2026);
        s.save_cycle_mode(CycleMode::SixCycles);
        s.backend_mut().set("unrelated-2020", b"{}").unwrap();
        assert_eq!(s.list_stored_years(), [2025, 2026, 2027]);
    }

    #[test]
    fn delete_and_clear() {
        let mut s = storage();
        s.save_year(&generate_year(2025).unwrap());
        s.save_year(&generate_year(2026).unwrap());
        s.save_cycle_mode(CycleMode::SixCycles);
        assert!(s.delete_year(2025));
        assert_eq!(s.list_stored_years(), [2026]);
        assert!(s.clear_all());
        assert!(s.list_stored_years().is_empty());
        assert_eq!(s.load_cycle_mode(), CycleMode::SixCycles);
    }

    #[test]
    fn preferences() {
        let mut s = storage();
        assert_eq!(s.load_current_year(), None);
        assert_eq!(s.load_cycle_mode(), CycleMode::EightCycles);

        s.save_current_year(2031);
        s.save_cycle_mode(CycleMode::SixCycles);
        assert_eq!(s.load_current_year(), Some(2031));
        assert_eq!(s.load_cycle_mode(), CycleMode::SixCycles);
    }

    #[test]
    fn malformed_cycle_mode_falls_back_to_default() {
        let mut s = storage();
        s.backend_mut()
            .set("shapeup-planner-cycle-mode", b"12-cycles")
            .unwrap();
        assert_eq!(s.load_cycle_mode(), CycleMode::EightCycles);
    }

    #[test]
    fn unreadable_year_loads_as_absent() {
        let mut s = storage();
        s.backend_mut().set("shapeup-planner-2026", b"not json").unwrap();
        assert!(s.has_year(2026));
        assert_eq!(s.load_year(2026), None);
    }

    #[test]
    fn save_failure_is_reported_not_raised() {
        let mut s = Storage::new(MemoryKv::with_quota(64));
        assert!(!s.save_year(&generate_year(2026).unwrap()));
        assert!(!s.has_year(2026));
    }

    #[test]
    fn export_import_is_byte_identical() {
        let mut a = storage();
        let mut y2026 = generate_year(2026).unwrap();
        y2026.toggle_vacation("2026-W05");
        y2026.toggle_cooldown("2026-W20");
        y2026.add_task("2026-W03", "Write the pitch").unwrap();
        a.save_year(&y2026);
        a.save_year(&generate_year(2027).unwrap());

        let json = a.export_json().unwrap();
        let mut b = storage();
        assert_eq!(b.import_json(&json).unwrap(), 2);

        for year in [2026, 2027] {
            let key = a.year_key(year);
            assert_eq!(
                a.backend().get(&key).unwrap(),
                b.backend().get(&key).unwrap(),
                "year {year}"
            );
        }
    }

    #[test]
    fn import_overwrites_and_uses_map_key() {
        let mut s = storage();
        let mut old = generate_year(2026).unwrap();
        old.toggle_vacation("2026-W01");
        s.save_year(&old);

        let mut incoming = BTreeMap::new();
        incoming.insert(2026, generate_year(2026).unwrap());
        let mut mislabeled = generate_year(2028).unwrap();
        mislabeled.year = 1999;
        incoming.insert(2028, mislabeled);
        assert!(s.import_all(incoming));

        assert!(s.load_year(2026).unwrap().vacation_week_ids.is_empty());
        assert_eq!(s.load_year(2028).unwrap().year, 2028);
        assert!(!s.has_year(1999));
    }

    #[test]
    fn malformed_import_writes_nothing() {
        let mut s = storage();
        let good = serde_json::to_value(generate_year(2026).unwrap()).unwrap();
        let doc = serde_json::json!({ "2026": good, "2027": { "year": "oops" } });
        let err = s.import_json(&doc.to_string()).unwrap_err();
        assert!(matches!(err, PlannerError::InvalidImport(_)));
        assert!(s.list_stored_years().is_empty());

        assert!(matches!(
            s.import_json("[1, 2, 3]"),
            Err(PlannerError::InvalidImport(_))
        ));
    }

    #[test]
    fn undo_history_roundtrip() {
        let mut s = storage();
        assert!(s.load_undo().is_empty());
        let snapshots = vec![generate_year(2026).unwrap(), generate_year(2026).unwrap()];
        assert!(s.save_undo(&snapshots));
        assert_eq!(s.load_undo().len(), 2);
        assert!(s.save_undo(&[]));
        assert!(s.load_undo().is_empty());
    }

    #[test]
    fn import_discards_undo_for_overwritten_years() {
        let mut s = storage();
        assert!(s.save_undo(&[generate_year(2026).unwrap(), generate_year(2027).unwrap()]));

        let mut incoming = generate_year(2026).unwrap();
        assert!(incoming.toggle_vacation("2026-W10"));
        assert!(s.import_all(BTreeMap::from([(2026, incoming)])));

        let remaining: Vec<i32> = s.load_undo().iter().map(|d| d.year).collect();
        assert_eq!(remaining, [2027]);
        assert_eq!(s.load_year(2026).unwrap().vacation_week_ids, ["2026-W10"]);
    }

    #[test]
    fn delete_year_discards_its_undo() {
        let mut s = storage();
        s.save_year(&generate_year(2026).unwrap());
        assert!(s.save_undo(&[generate_year(2026).unwrap()]));

        assert!(s.delete_year(2026));
        assert!(s.load_undo().is_empty());
        assert!(!s.has_year(2026));
        // Deleting a year with no history leaves other snapshots alone.
        assert!(s.save_undo(&[generate_year(2027).unwrap()]));
        assert!(s.delete_year(2028));
        assert_eq!(s.load_undo().len(), 1);
    }

    #[test]
    fn works_over_redb() {
        let dir = TempDir::new().unwrap();
        let kv = RedbKv::open(&dir.path().join("planner.redb")).unwrap();
        let mut s = Storage::new(kv);
        s.save_year(&generate_year(2026).unwrap());
        s.save_current_year(2026);
        assert_eq!(s.list_stored_years(), [2026]);
        assert_eq!(s.load_year(2026).unwrap().weeks.len(), 52);
        assert_eq!(s.load_current_year(), Some(2026));
    }
}
