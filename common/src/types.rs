//! 正規化エンジンの型定義
//!
//! - FieldValue: レコードに格納された生の値（文字列 or リスト）
//! - RecordRef: レコードIDと表示名
//! - NormalizationGroup: 正規化キーが一致する値のグループ
//! - ChangeSet: 書き戻すべき変更の一覧

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};

/// レコードの参照（IDと表示名）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordRef {
    pub id: String,
    pub label: String,
}

impl RecordRef {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// フィールドの生の値
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    #[default]
    Empty,
}

impl FieldValue {
    /// JSONセルから変換（文字列・配列以外は空扱い）
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => FieldValue::Text(s.clone()),
            Some(Value::Array(items)) => FieldValue::List(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ),
            _ => FieldValue::Empty,
        }
    }

    /// 書き戻し用のJSON値
    ///
    /// タグリストは0件ならnull、1件なら文字列、2件以上なら配列
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::List(items) => match items.len() {
                0 => Value::Null,
                1 => Value::String(items[0].clone()),
                _ => Value::Array(items.iter().cloned().map(Value::String).collect()),
            },
            FieldValue::Empty => Value::Null,
        }
    }

    /// 空白のみの文字列でなければ値を返す
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.iter().all(|s| s.trim().is_empty()),
            FieldValue::Empty => true,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::List(items) => write!(f, "[{}]", items.join(", ")),
            FieldValue::Empty => write!(f, "(空)"),
        }
    }
}

/// グループのメンバー（レコードと元の値）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub record: RecordRef,
    pub original: String,
}

/// 正規化キーでまとめた値のグループ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizationGroup {
    pub key: String,
    /// 入力順を保持
    pub members: Vec<Member>,
}

impl NormalizationGroup {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            members: Vec::new(),
        }
    }

    /// 異なる元の値（ソート済み）
    pub fn distinct_values(&self) -> BTreeSet<&str> {
        self.members.iter().map(|m| m.original.as_str()).collect()
    }

    /// 表記揺れを含むグループか
    pub fn is_variant_bearing(&self) -> bool {
        self.distinct_values().len() > 1
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// 1レコード分の変更
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub record: RecordRef,
    pub from: FieldValue,
    pub to: FieldValue,
}

/// 書き戻す変更の一覧（1レコードにつき最大1件）
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChangeSet {
    entries: Vec<ChangeEntry>,
    #[serde(skip)]
    seen: HashSet<String>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 変更を追加（同じレコードが既にあれば追加せずfalse）
    pub fn push(&mut self, entry: ChangeEntry) -> bool {
        if !self.seen.insert(entry.record.id.clone()) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn entries(&self) -> &[ChangeEntry] {
        &self.entries
    }

    pub fn get(&self, record_id: &str) -> Option<&ChangeEntry> {
        self.entries.iter().find(|e| e.record.id == record_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChangeEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a ChangeEntry;
    type IntoIter = std::slice::Iter<'a, ChangeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
