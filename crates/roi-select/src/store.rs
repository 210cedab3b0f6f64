//! Per-user measurement history.
//!
//! Records live under `usuarios/{user}/mediciones`. Every append prunes the
//! history to the [`MAX_RECORDS`] most recent entries by timestamp.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// History length kept per user.
pub const MAX_RECORDS: usize = 30;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid user code {0:?}")]
    InvalidUser(String),
    #[error("measurement value must be finite, got {0}")]
    InvalidValue(f64),
}

/// One analysis result as stored in the history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    /// Test kind, e.g. `"nitrite"`.
    pub tipo: String,
    pub valor: f64,
    /// Human-readable date as shown in the history list.
    pub fecha: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Order {
    #[default]
    Ascending,
    NewestFirst,
}

/// Storage key for a user's history.
pub fn store_path(user: &str) -> Result<String, StoreError> {
    if user.is_empty() || user.contains('/') {
        return Err(StoreError::InvalidUser(user.to_owned()));
    }
    Ok(format!("usuarios/{user}/mediciones"))
}

pub trait MeasurementStore {
    /// Append a record, then prune to [`MAX_RECORDS`].
    fn append(&mut self, user: &str, record: MeasurementRecord) -> Result<(), StoreError>;

    /// All records of `user`, oldest first.
    fn records(&self, user: &str) -> Result<Vec<MeasurementRecord>, StoreError>;

    /// Records of `user`, optionally restricted to one test kind.
    fn query(
        &self,
        user: &str,
        tipo: Option<&str>,
        order: Order,
    ) -> Result<Vec<MeasurementRecord>, StoreError> {
        let mut out: Vec<_> = self
            .records(user)?
            .into_iter()
            .filter(|r| tipo.is_none_or(|t| r.tipo == t))
            .collect();
        if order == Order::NewestFirst {
            out.reverse();
        }
        Ok(out)
    }
}

type Tree = BTreeMap<String, Vec<MeasurementRecord>>;

fn insert_pruned(tree: &mut Tree, user: &str, record: MeasurementRecord) -> Result<(), StoreError> {
    if !record.valor.is_finite() {
        return Err(StoreError::InvalidValue(record.valor));
    }
    let key = store_path(user)?;
    let list = tree.entry(key).or_default();
    list.push(record);
    list.sort_by_key(|r| r.timestamp);
    if list.len() > MAX_RECORDS {
        let excess = list.len() - MAX_RECORDS;
        list.drain(..excess);
        log::debug!("pruned {excess} old measurement(s) for {user}");
    }
    Ok(())
}

fn read_sorted(tree: &Tree, user: &str) -> Result<Vec<MeasurementRecord>, StoreError> {
    let key = store_path(user)?;
    Ok(tree.get(&key).cloned().unwrap_or_default())
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tree: Tree,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MeasurementStore for MemoryStore {
    fn append(&mut self, user: &str, record: MeasurementRecord) -> Result<(), StoreError> {
        insert_pruned(&mut self.tree, user, record)
    }

    fn records(&self, user: &str) -> Result<Vec<MeasurementRecord>, StoreError> {
        read_sorted(&self.tree, user)
    }
}

/// Store persisted as one pretty JSON object keyed by storage path.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Tree, StoreError> {
        if !self.path.exists() {
            return Ok(Tree::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, tree: &Tree) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(tree)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl MeasurementStore for JsonFileStore {
    fn append(&mut self, user: &str, record: MeasurementRecord) -> Result<(), StoreError> {
        let mut tree = self.load()?;
        insert_pruned(&mut tree, user, record)?;
        self.save(&tree)
    }

    fn records(&self, user: &str) -> Result<Vec<MeasurementRecord>, StoreError> {
        read_sorted(&self.load()?, user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(tipo: &str, valor: f64, timestamp: i64) -> MeasurementRecord {
        MeasurementRecord {
            tipo: tipo.into(),
            valor,
            fecha: format!("t{timestamp}"),
            timestamp,
        }
    }

    #[test]
    fn history_is_pruned_to_most_recent() {
        let mut store = MemoryStore::new();
        for t in 0..40 {
            store.append("U1", rec("ph", t as f64, t)).unwrap();
        }
        let all = store.records("U1").unwrap();
        assert_eq!(all.len(), MAX_RECORDS);
        assert_eq!(all.first().unwrap().timestamp, 10);
        assert_eq!(all.last().unwrap().timestamp, 39);
    }

    #[test]
    fn out_of_order_appends_are_sorted() {
        let mut store = MemoryStore::new();
        store.append("U1", rec("ph", 7.0, 300)).unwrap();
        store.append("U1", rec("nitrite", 0.5, 100)).unwrap();
        store.append("U1", rec("ph", 7.2, 200)).unwrap();

        let ph = store.query("U1", Some("ph"), Order::Ascending).unwrap();
        assert_eq!(ph.iter().map(|r| r.timestamp).collect::<Vec<_>>(), [200, 300]);

        let newest = store.query("U1", None, Order::NewestFirst).unwrap();
        assert_eq!(newest[0].timestamp, 300);
        assert_eq!(newest[2].tipo, "nitrite");
    }

    #[test]
    fn users_are_isolated_and_validated() {
        let mut store = MemoryStore::new();
        store.append("A", rec("ph", 7.0, 1)).unwrap();
        assert!(store.records("B").unwrap().is_empty());
        assert!(matches!(
            store.append("", rec("ph", 7.0, 1)),
            Err(StoreError::InvalidUser(_))
        ));
        assert!(matches!(
            store.append("a/b", rec("ph", 7.0, 1)),
            Err(StoreError::InvalidUser(_))
        ));
        assert!(matches!(
            store.append("A", rec("ph", f64::NAN, 2)),
            Err(StoreError::InvalidValue(_))
        ));
        assert_eq!(store_path("A").unwrap(), "usuarios/A/mediciones");
    }
}
