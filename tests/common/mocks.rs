use async_trait::async_trait;
use medsync::application::ports::RemoteBackend;
use medsync::RemoteError;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// What the backend would fail with, applied to every call while set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailMode {
    Network,
    Auth,
}

/// Recording in-memory stand-in for the hosted backend. Rows are stored per
/// remote table name, keyed by their `id` column.
#[derive(Default)]
pub struct MockRemoteBackend {
    pub calls: Mutex<Vec<String>>,
    tables: Mutex<HashMap<String, Vec<Value>>>,
    fail_mode: Mutex<Option<FailMode>>,
    next_id: AtomicU64,
}

impl MockRemoteBackend {
    pub fn set_fail_mode(&self, mode: Option<FailMode>) {
        *self.fail_mode.lock().unwrap() = mode;
    }

    pub fn seed_rows(&self, table: &str, rows: Vec<Value>) {
        self.tables.lock().unwrap().insert(table.into(), rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls_matching(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn check_failure(&self) -> Result<(), RemoteError> {
        match *self.fail_mode.lock().unwrap() {
            Some(FailMode::Network) => Err(RemoteError::Network("connection refused".into())),
            Some(FailMode::Auth) => Err(RemoteError::Auth("token expired".into())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteBackend for MockRemoteBackend {
    async fn upsert(&self, table: &str, row: Value) -> Result<Value, RemoteError> {
        self.calls.lock().unwrap().push(format!("upsert:{table}"));
        self.check_failure()?;

        let mut stored = row;
        let map = stored
            .as_object_mut()
            .ok_or_else(|| RemoteError::Schema("row is not an object".into()))?;
        let id = match map.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                let id = format!("srv-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
                map.insert("id".into(), json!(id));
                id
            }
        };

        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        match rows
            .iter_mut()
            .find(|r| r.get("id").and_then(Value::as_str) == Some(id.as_str()))
        {
            Some(existing) => *existing = stored.clone(),
            None => rows.push(stored.clone()),
        }
        Ok(stored)
    }

    async fn update(&self, table: &str, patch: Value, key: &str) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(format!("update:{table}"));
        self.check_failure()?;

        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        let row = rows
            .iter_mut()
            .find(|r| r.get("id").and_then(Value::as_str) == Some(key))
            .ok_or_else(|| RemoteError::Schema(format!("{table}: no row {key}")))?;
        if let (Some(target), Some(fields)) = (row.as_object_mut(), patch.as_object()) {
            for (k, v) in fields {
                target.insert(k.clone(), v.clone());
            }
        }
        Ok(())
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(format!("delete:{table}"));
        self.check_failure()?;

        let mut tables = self.tables.lock().unwrap();
        if let Some(rows) = tables.get_mut(table) {
            rows.retain(|r| r.get("id").and_then(Value::as_str) != Some(id));
        }
        Ok(())
    }

    async fn select(&self, table: &str, limit: u32) -> Result<Vec<Value>, RemoteError> {
        self.calls.lock().unwrap().push(format!("select:{table}"));
        self.check_failure()?;

        Ok(self
            .rows(table)
            .into_iter()
            .take(limit as usize)
            .collect())
    }
}
