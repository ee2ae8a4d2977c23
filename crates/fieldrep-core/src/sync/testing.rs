//! In-memory gateway for coordinator tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Notify;

use super::gateway::{FetchFilter, GatewayError, GatewayResult, RemoteGateway};
use crate::models::{RecordId, Table};

/// Pauses the first upsert until the test releases it.
#[derive(Default)]
pub(crate) struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

#[derive(Default)]
struct RemoteState {
    tables: HashMap<Table, BTreeMap<String, Value>>,
    failing_records: HashSet<String>,
    failing_fetches: HashSet<Table>,
    calls: Vec<String>,
    gate_used: bool,
}

/// Id-keyed remote authority with scripted failures and a call log.
#[derive(Default)]
pub(crate) struct ScriptedGateway {
    state: Mutex<RemoteState>,
    gate: Option<Arc<Gate>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated() -> (Self, Arc<Gate>) {
        let gate = Arc::new(Gate::default());
        let gateway = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (gateway, gate)
    }

    fn state(&self) -> MutexGuard<'_, RemoteState> {
        self.state.lock().unwrap()
    }

    pub fn seed(&self, table: Table, rows: Vec<Value>) {
        let mut state = self.state();
        let stored = state.tables.entry(table).or_default();
        for row in rows {
            let id = row["id"].as_str().unwrap().to_string();
            stored.insert(id, row);
        }
    }

    pub fn fail_record(&self, id: &RecordId) {
        self.state().failing_records.insert(id.to_string());
    }

    pub fn heal_record(&self, id: &RecordId) {
        self.state().failing_records.remove(id.as_str());
    }

    pub fn fail_fetch(&self, table: Table) {
        self.state().failing_fetches.insert(table);
    }

    pub fn rows(&self, table: Table) -> Vec<Value> {
        self.state()
            .tables
            .get(&table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default()
    }

    /// `"upsert visits/<id>"`, `"delete visits/<id>"`, `"fetch clients"` in call order.
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    async fn wait_at_gate(&self) {
        let Some(gate) = &self.gate else {
            return;
        };
        {
            let mut state = self.state();
            if state.gate_used {
                return;
            }
            state.gate_used = true;
        }
        gate.entered.notify_one();
        gate.release.notified().await;
    }
}

#[async_trait]
impl RemoteGateway for ScriptedGateway {
    async fn upsert(&self, table: Table, record: &Value) -> GatewayResult<Value> {
        self.wait_at_gate().await;

        let id = record["id"]
            .as_str()
            .ok_or_else(|| GatewayError::Rejected("record without id".to_string()))?
            .to_string();
        let mut state = self.state();
        state.calls.push(format!("upsert {table}/{id}"));
        if state.failing_records.contains(&id) {
            return Err(GatewayError::Rejected(format!("scripted failure for {id}")));
        }
        state.tables.entry(table).or_default().insert(id, record.clone());
        Ok(record.clone())
    }

    async fn fetch(&self, table: Table, filter: Option<&FetchFilter>) -> GatewayResult<Vec<Value>> {
        let mut state = self.state();
        state.calls.push(format!("fetch {table}"));
        if state.failing_fetches.contains(&table) {
            return Err(GatewayError::Unavailable(format!("scripted outage for {table}")));
        }
        let rows = state.tables.get(&table).map(|rows| {
            rows.values()
                .filter(|row| {
                    filter.is_none_or(|filter| row[&filter.column] == filter.value.as_str())
                })
                .cloned()
                .collect()
        });
        Ok(rows.unwrap_or_default())
    }

    async fn delete(&self, table: Table, record_id: &RecordId) -> GatewayResult<()> {
        let mut state = self.state();
        state.calls.push(format!("delete {table}/{record_id}"));
        if state.failing_records.contains(record_id.as_str()) {
            return Err(GatewayError::Rejected(format!("scripted failure for {record_id}")));
        }
        if let Some(rows) = state.tables.get_mut(&table) {
            rows.remove(record_id.as_str());
        }
        Ok(())
    }
}
