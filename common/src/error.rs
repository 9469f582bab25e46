//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::MigrationMap;

    #[test]
    fn test_missing_map_file_is_io_error() {
        let err = MigrationMap::from_file(std::path::Path::new("/nonexistent/tag-map.json")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().starts_with("IO error: "));
    }

    #[test]
    fn test_malformed_map_is_json_error() {
        let err = MigrationMap::from_json(r#"{"Doer": "#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));

        // 値は文字列かnullのみ
        let err = MigrationMap::from_json(r#"{"Doer": 1}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_blank_tag_is_config_error() {
        let err = MigrationMap::from_json(r#"{"": null}"#).unwrap_err();
        assert_eq!(err.to_string(), "Config error: 移行マップに空のタグがあります");
    }
}
