use crate::error::{ContactTidyError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const TOKEN_ENV: &str = "AIRTABLE_TOKEN";
pub const BASE_ID_ENV: &str = "AIRTABLE_BASE_ID";
pub const TABLE_ID_ENV: &str = "AIRTABLE_TABLE_ID";

/// 対象テーブルの列名
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FieldNames {
    /// 氏名（母語表記）
    pub name: String,
    /// 別名（ローマ字表記）
    pub alias_name: String,
    /// 役職
    pub title: String,
    /// 勤務先
    pub company: String,
    /// タグ
    pub tags: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            name: "您的姓名".into(),
            alias_name: "别名/英文名".into(),
            title: "Title".into(),
            company: "目前就职".into(),
            tags: "标签".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub airtable_token: Option<String>,
    pub base_id: Option<String>,
    pub table_id: Option<String>,
    pub fields: FieldNames,
    /// プレビューに表示するグループ数
    pub preview_limit: usize,
    /// 書き込み間の待機時間（ミリ秒）
    pub write_interval_ms: u64,
    pub timeout_seconds: u64,
}

/// Airtable接続情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub base_id: String,
    pub table_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            airtable_token: None,
            base_id: None,
            table_id: None,
            fields: FieldNames::default(),
            preview_limit: 20,
            write_interval_ms: 200,
            timeout_seconds: 30,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// 指定パスから読み込み（なければデフォルト）
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ContactTidyError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("contact-tidy").join("config.json"))
    }

    /// 接続情報を取得（環境変数を優先）
    pub fn credentials(&self) -> Result<Credentials> {
        Ok(Credentials {
            token: resolve(TOKEN_ENV, self.airtable_token.as_deref())?,
            base_id: resolve(BASE_ID_ENV, self.base_id.as_deref())?,
            table_id: resolve(TABLE_ID_ENV, self.table_id.as_deref())?,
        })
    }
}

fn resolve(var: &'static str, stored: Option<&str>) -> Result<String> {
    if let Ok(value) = std::env::var(var) {
        if !value.trim().is_empty() {
            return Ok(value.trim().to_string());
        }
    }

    stored
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ContactTidyError::MissingCredential(var))
}
