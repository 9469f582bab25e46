//! contact-tidy: Airtable上の連絡先ディレクトリを正規化する
//!
//! 正規化エンジン本体は `contact_tidy_common`、このクレートは
//! 取得・書き戻し・CLIを担当する。

pub mod airtable;
pub mod analyze;
pub mod cli;
pub mod commands;
pub mod config;
pub mod confirm;
pub mod error;
pub mod normalizer;
pub mod report;
pub mod writeback;
