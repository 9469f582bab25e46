use contact_tidy_common::{FieldValue, RecordRef};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Airtableのレコード
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,

    #[serde(default)]
    pub created_time: Option<String>,

    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            created_time: None,
            fields,
        }
    }

    pub fn field(&self, name: &str) -> FieldValue {
        FieldValue::from_json(self.fields.get(name))
    }

    /// 文字列フィールド（前後の空白除去済み、空なら空文字列）
    pub fn text(&self, name: &str) -> String {
        self.field(name).as_text().map(|s| s.trim().to_string()).unwrap_or_default()
    }

    /// 表示名付きの参照
    pub fn to_ref(&self, label_field: &str) -> RecordRef {
        let label = self.text(label_field);
        RecordRef::new(
            self.id.clone(),
            if label.is_empty() { "Unknown".to_string() } else { label },
        )
    }
}

/// 一覧APIのレスポンス
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default)]
    pub offset: Option<String>,
}

/// 1レコード分の更新内容
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordUpdate {
    pub record: RecordRef,
    pub fields: Map<String, Value>,
}

impl RecordUpdate {
    pub fn single(record: RecordRef, field: &str, value: Value) -> Self {
        let mut fields = Map::new();
        fields.insert(field.to_string(), value);
        Self { record, fields }
    }
}
