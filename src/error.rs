use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContactTidyError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("{0} が設定されていません。環境変数か `contact-tidy config` で設定してください")]
    MissingCredential(&'static str),

    #[error("レコード取得エラー: {0}")]
    Fetch(String),

    #[error("レコード更新エラー ({record}): {message}")]
    Update { record: String, message: String },

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("CLI実行エラー: {0}")]
    CliExecution(String),

    #[error(transparent)]
    Common(#[from] contact_tidy_common::Error),
}

pub type Result<T> = std::result::Result<T, ContactTidyError>;
