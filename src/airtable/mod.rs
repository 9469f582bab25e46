//! Airtable連携モジュール
//!
//! - RecordStore: 取得・更新の境界（テストでは差し替える）
//! - AirtableClient: REST API実装（100件ずつページング、1件ずつPATCH）

mod types;

pub use types::{ListResponse, Record, RecordUpdate};

use crate::config::Credentials;
use crate::error::{ContactTidyError, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde_json::{json, Map, Value};
use std::time::Duration;

const API_BASE_URL: &str = "https://api.airtable.com/v0";
const PAGE_SIZE: usize = 100;

/// レコードの取得・更新
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 全レコードを取得
    async fn fetch_all(&self) -> Result<Vec<Record>>;

    /// 1レコードを取得
    async fn get(&self, id: &str) -> Result<Record>;

    /// 指定フィールドだけを更新
    async fn update(&self, id: &str, fields: &Map<String, Value>) -> Result<()>;
}

pub struct AirtableClient {
    http: reqwest::Client,
    credentials: Credentials,
    base_url: String,
    verbose: bool,
}

impl AirtableClient {
    pub fn new(credentials: Credentials, timeout_seconds: u64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            credentials,
            base_url: API_BASE_URL.to_string(),
            verbose: false,
        })
    }

    /// 接続先を変更（プロキシ・テスト用）
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// テーブル（またはレコード）のURL
    pub fn url(&self, record_id: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ContactTidyError::Config(format!("不正なAPI URL '{}': {}", self.base_url, e)))?;

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ContactTidyError::Config(format!("不正なAPI URL '{}'", self.base_url)))?;
            segments
                .pop_if_empty()
                .push(&self.credentials.base_id)
                .push(&self.credentials.table_id);
            if let Some(id) = record_id {
                segments.push(id);
            }
        }

        Ok(url)
    }

    /// 先頭から最大 `max_records` 件を取得（`None` で全件）
    pub async fn fetch_records(&self, max_records: Option<usize>) -> Result<Vec<Record>> {
        let url = self.url(None)?;
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut query: Vec<(&str, String)> = vec![("pageSize", PAGE_SIZE.to_string())];
            if let Some(max) = max_records {
                query.push(("maxRecords", max.to_string()));
            }
            if let Some(ref cursor) = offset {
                query.push(("offset", cursor.clone()));
            }

            if self.verbose {
                println!("  GET {} (取得済み {}件)", url, records.len());
            }

            let response = self
                .http
                .get(url.clone())
                .bearer_auth(&self.credentials.token)
                .query(&query)
                .send()
                .await?;
            let body = check_status(response).await?;
            let page: ListResponse = serde_json::from_str(&body)
                .map_err(|e| ContactTidyError::ApiParse(format!("一覧レスポンス: {}", e)))?;

            records.extend(page.records);

            match page.offset {
                Some(next) if max_records.map_or(true, |max| records.len() < max) => offset = Some(next),
                _ => break,
            }
        }

        if let Some(max) = max_records {
            records.truncate(max);
        }

        Ok(records)
    }

    async fn patch_record(&self, id: &str, fields: &Map<String, Value>) -> Result<()> {
        let url = self.url(Some(id))?;
        if self.verbose {
            println!("  PATCH {}", url);
        }

        let response = self
            .http
            .patch(url)
            .bearer_auth(&self.credentials.token)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for AirtableClient {
    async fn fetch_all(&self) -> Result<Vec<Record>> {
        self.fetch_records(None)
            .await
            .map_err(|e| ContactTidyError::Fetch(e.to_string()))
    }

    async fn get(&self, id: &str) -> Result<Record> {
        let response = self
            .http
            .get(self.url(Some(id))?)
            .bearer_auth(&self.credentials.token)
            .send()
            .await?;
        let body = check_status(response).await?;
        serde_json::from_str(&body).map_err(|e| ContactTidyError::ApiParse(format!("レコード {}: {}", id, e)))
    }

    async fn update(&self, id: &str, fields: &Map<String, Value>) -> Result<()> {
        self.patch_record(id, fields)
            .await
            .map_err(|e| ContactTidyError::Update {
                record: id.to_string(),
                message: e.to_string(),
            })
    }
}

/// 失敗ステータスならレスポンス本文付きでエラーにする
async fn check_status(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let preview: String = body.chars().take(300).collect();
        return Err(ContactTidyError::ApiCall(format!("{}: {}", status, preview)));
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AirtableClient {
        AirtableClient::new(
            Credentials {
                token: "pat-test".into(),
                base_id: "appBASE".into(),
                table_id: "Contacts Table".into(),
            },
            5,
        )
        .unwrap()
    }

    #[test]
    fn test_table_url_encodes_segments() {
        let url = client().url(None).unwrap();
        assert_eq!(url.as_str(), "https://api.airtable.com/v0/appBASE/Contacts%20Table");
    }

    #[test]
    fn test_record_url() {
        let url = client().url(Some("rec123")).unwrap();
        assert!(url.as_str().ends_with("/appBASE/Contacts%20Table/rec123"));
    }

    #[test]
    fn test_custom_base_url_with_trailing_slash() {
        let url = client().with_base_url("http://localhost:8080/v0/").url(None).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/v0/appBASE/Contacts%20Table");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = client().with_base_url("not a url").url(None).unwrap_err();
        assert!(matches!(err, ContactTidyError::Config(_)));
    }

    #[tokio::test]
    async fn test_update_failure_names_record() {
        let err = client()
            .with_base_url("not a url")
            .update("rec1", &Map::new())
            .await
            .unwrap_err();
        match err {
            ContactTidyError::Update { record, message } => {
                assert_eq!(record, "rec1");
                assert!(message.contains("不正なAPI URL"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_is_fetch_error() {
        let err = client().with_base_url("not a url").fetch_all().await.unwrap_err();
        assert!(matches!(err, ContactTidyError::Fetch(_)));
    }

    #[test]
    fn test_parse_list_response() {
        let body = r#"{"records": [{"id": "rec1", "createdTime": "2024-01-01T00:00:00.000Z", "fields": {"Title": "CEO"}}], "offset": "itr1"}"#;
        let page: ListResponse = serde_json::from_str(body).unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].text("Title"), "CEO");
        assert_eq!(page.offset.as_deref(), Some("itr1"));
    }
}
