//! タグ移行マップ
//!
//! 旧タグ → 新タグ（または削除）の明示的な対応表。
//! マップにあるタグは頻度による統一を経ずにそのまま置き換える。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 旧タグ → 新タグ（`None` は削除）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MigrationMap {
    rules: BTreeMap<String, Option<String>>,
}

/// 1レコード分の移行結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagMigration {
    /// 移行後のタグ（重複なし・初出順）
    pub tokens: Vec<String>,
    /// マップにないため残したタグ
    pub unknown: Vec<String>,
}

impl MigrationMap {
    /// 組み込みプリセットを取得
    pub fn from_preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" | "contacts" => Some(Self::contacts_preset()),
            _ => None,
        }
    }

    /// JSONファイルから読み込み
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let map: Self = serde_json::from_str(json)?;
        if map.rules.keys().any(|k| k.trim().is_empty()) {
            return Err(Error::Config("移行マップに空のタグがあります".into()));
        }
        Ok(map)
    }

    /// 連絡先ディレクトリの分類見直し用
    fn contacts_preset() -> Self {
        let mut map = Self::default();

        map.insert("Doer", Some("Founder"));
        map.insert("Frontier", Some("Frontier"));
        map.insert("Engineer / Lead", Some("Engineer"));
        map.insert("Investor", Some("Investor"));
        map.insert("Student", Some("Student"));
        map.insert("Professor", Some("Academic"));
        map.insert("VP", Some("Executive"));
        map.insert("lawyer", Some("Professional"));

        // 職業分類ではないもの
        map.insert("非会员", None);
        map.insert("House Owner", None);

        map
    }

    pub fn insert(&mut self, from: &str, to: Option<&str>) {
        self.rules.insert(from.to_string(), to.map(str::to_string));
    }

    /// ルールを取得（マップにない場合は `None`）
    pub fn get(&self, token: &str) -> Option<Option<&str>> {
        self.rules.get(token).map(|to| to.as_deref())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.rules.contains_key(token)
    }

    /// マップをマージ（後から追加したルールが優先）
    pub fn merge(&mut self, other: &MigrationMap) {
        self.rules.extend(other.rules.clone());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// タグ列を移行する
    pub fn migrate<'a, I>(&self, tokens: I) -> TagMigration
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut result = TagMigration::default();

        for token in tokens {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }

            let target = match self.get(token) {
                Some(Some(to)) => to,
                Some(None) => continue,
                None => {
                    if !result.unknown.iter().any(|u| u == token) {
                        result.unknown.push(token.to_string());
                    }
                    token
                }
            };

            if !result.tokens.iter().any(|t| t == target) {
                result.tokens.push(target.to_string());
            }
        }

        result
    }
}
