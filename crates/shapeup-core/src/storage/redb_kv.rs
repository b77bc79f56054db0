//! File-backed [`KvStore`] using redb.
//!
//! A single `kv` table maps string keys to opaque byte values. Every write is
//! its own committed transaction, so a crash never leaves a half-written
//! snapshot behind.

use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition};

use crate::error::{PlannerError, Result};

use super::KvStore;

const KV: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

fn db_err(e: impl std::fmt::Display) -> PlannerError {
    PlannerError::Storage(e.to_string())
}

pub struct RedbKv {
    db: Database,
}

impl RedbKv {
    /// Open or create the database at `path`, creating parent directories and
    /// the `kv` table as needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            crate::io::ensure_dir(parent)?;
        }
        let db = Database::create(path).map_err(db_err)?;
        let wt = db.begin_write().map_err(db_err)?;
        wt.open_table(KV).map_err(db_err)?;
        wt.commit().map_err(db_err)?;
        Ok(Self { db })
    }
}

impl KvStore for RedbKv {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = rt.open_table(KV).map_err(db_err)?;
        let value = table.get(key).map_err(db_err)?;
        Ok(value.map(|v| v.value().to_vec()))
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let wt = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = wt.open_table(KV).map_err(db_err)?;
            table.insert(key, value).map_err(db_err)?;
        }
        wt.commit().map_err(db_err)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let wt = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = wt.open_table(KV).map_err(db_err)?;
            table.remove(key).map_err(db_err)?;
        }
        wt.commit().map_err(db_err)?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = rt.open_table(KV).map_err(db_err)?;

        let mut result = Vec::new();
        for entry in table.iter().map_err(db_err)? {
            let (k, _) = entry.map_err(db_err)?;
            result.push(k.value().to_string());
        }
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_tmp() -> (TempDir, RedbKv) {
        let dir = TempDir::new().unwrap();
        let kv = RedbKv::open(&dir.path().join("data/test.redb")).unwrap();
        (dir, kv)
    }

    #[test]
    fn set_get_remove() {
        let (_dir, mut kv) = open_tmp();
        assert!(kv.get("missing").unwrap().is_none());

        kv.set("shapeup-planner-2026", b"{}").unwrap();
        assert_eq!(
            kv.get("shapeup-planner-2026").unwrap().as_deref(),
            Some(&b"{}"[..])
        );

        kv.set("shapeup-planner-2026", b"[]").unwrap();
        assert_eq!(kv.get("shapeup-planner-2026").unwrap().unwrap(), b"[]");

        kv.remove("shapeup-planner-2026").unwrap();
        assert!(kv.get("shapeup-planner-2026").unwrap().is_none());
    }

    #[test]
    fn keys_are_sorted() {
        let (_dir, mut kv) = open_tmp();
        kv.set("b", b"2").unwrap();
        kv.set("a", b"1").unwrap();
        assert_eq!(kv.keys().unwrap(), ["a", "b"]);
    }

    #[test]
    fn data_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("planner.redb");
        {
            let mut kv = RedbKv::open(&path).unwrap();
            kv.set("k", b"v").unwrap();
        }
        let kv = RedbKv::open(&path).unwrap();
        assert_eq!(kv.get("k").unwrap().unwrap(), b"v");
    }
}
