use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "contact-tidy")]
#[command(about = "連絡先ディレクトリ（Airtable）の表記揺れ正規化ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// ドライラン（変更を適用せずプレビュー）
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// 確認せずに書き込む
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// プレビューに表示するグループ数
    #[arg(long, global = true)]
    pub preview: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 役職の表記揺れを統一
    Titles {
        /// 正規形を整形してから書き戻す（" & " 区切り・大文字化）
        #[arg(long)]
        format: bool,

        /// 変更一覧をJSONで保存
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// 会社名の表記揺れを統一
    Companies {
        /// 変更一覧をJSONで保存
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// 氏名の表記揺れを統一
    Names {
        /// 変更一覧をJSONで保存
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// タグを移行マップで整理（--votes で頻度統一）
    Tags {
        /// 移行マッププリセット (default)
        #[arg(long)]
        preset: Option<String>,

        /// カスタム移行マップ（JSON）
        #[arg(long)]
        map: Option<PathBuf>,

        /// 移行マップを使わず頻度で表記揺れを統一
        #[arg(long, conflicts_with_all = ["preset", "map"])]
        votes: bool,

        /// 変更一覧をJSONで保存
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// 氏名列と別名列の取り違えを修正
    NameColumns {
        /// 変更一覧をJSONで保存
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// 列構造とタグ分布を表示
    Analyze {
        /// タグ分布だけを表示
        #[arg(long)]
        tags: bool,
    },

    /// 接続確認（先頭のレコードを表示）
    Check {
        /// 表示件数
        #[arg(short, long, default_value = "3")]
        count: usize,
    },

    /// 設定を表示/編集
    Config {
        /// Airtableトークンを設定
        #[arg(long)]
        set_token: Option<String>,

        /// ベースIDを設定
        #[arg(long)]
        set_base: Option<String>,

        /// テーブルIDを設定
        #[arg(long)]
        set_table: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
