//! テスト用のインメモリストア

#![allow(dead_code)]

use async_trait::async_trait;
use contact_tidy::airtable::{Record, RecordStore};
use contact_tidy::error::{ContactTidyError, Result};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<Record>>,
    failing: HashSet<String>,
    /// 一覧取得を失敗させる
    fetch_error: bool,
    /// update が呼ばれたレコードID（呼び出し順）
    calls: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    /// 指定IDの更新を失敗させる
    pub fn failing(mut self, ids: &[&str]) -> Self {
        self.failing = ids.iter().map(|id| id.to_string()).collect();
        self
    }

    /// 一覧取得を失敗させる
    pub fn unreachable(mut self) -> Self {
        self.fetch_error = true;
        self
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn text(&self, id: &str, field: &str) -> String {
        self.records()
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.text(field))
            .unwrap_or_default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch_all(&self) -> Result<Vec<Record>> {
        if self.fetch_error {
            return Err(ContactTidyError::Fetch("503 Service Unavailable".to_string()));
        }
        Ok(self.records())
    }

    async fn get(&self, id: &str) -> Result<Record> {
        self.records()
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| ContactTidyError::Fetch(format!("not found: {}", id)))
    }

    async fn update(&self, id: &str, fields: &Map<String, Value>) -> Result<()> {
        self.calls.lock().unwrap().push(id.to_string());

        if self.failing.contains(id) {
            return Err(ContactTidyError::Update {
                record: id.to_string(),
                message: "422 INVALID_VALUE_FOR_COLUMN".to_string(),
            });
        }

        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ContactTidyError::Fetch(format!("not found: {}", id)))?;
        for (name, value) in fields {
            record.fields.insert(name.clone(), value.clone());
        }
        Ok(())
    }
}

/// JSONオブジェクトからレコードを作る
pub fn record(id: &str, fields: Value) -> Record {
    match fields {
        Value::Object(map) => Record::new(id, map),
        _ => Record::new(id, Map::new()),
    }
}
