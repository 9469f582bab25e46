//! 変更の書き戻し
//!
//! 1件ずつ更新し、失敗しても残りの処理を続ける。再試行はしない
//! （変更一覧は冪等なので、失敗分は再実行で拾える）。

use crate::airtable::{RecordStore, RecordUpdate};
use contact_tidy_common::{ChangeSet, RecordRef};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

/// 書き戻しオプション
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// 書き込み間の待機時間
    pub interval: Duration,
    /// 進捗バーを表示する
    pub show_progress: bool,
    pub verbose: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(200),
            show_progress: true,
            verbose: false,
        }
    }
}

/// 更新に失敗したレコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedWrite {
    pub record: RecordRef,
    pub message: String,
}

/// 書き戻し結果
#[derive(Debug, Clone, Default)]
pub struct WriteReport {
    pub updated: usize,
    pub failed: Vec<FailedWrite>,
}

impl WriteReport {
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

/// 変更一覧を単一フィールドの更新に変換
pub fn change_set_updates(change_set: &ChangeSet, field: &str) -> Vec<RecordUpdate> {
    change_set
        .iter()
        .map(|entry| RecordUpdate::single(entry.record.clone(), field, entry.to.to_json()))
        .collect()
}

/// 更新を1件ずつ適用する
pub async fn apply_updates<S>(store: &S, updates: &[RecordUpdate], options: &WriteOptions) -> WriteReport
where
    S: RecordStore + ?Sized,
{
    let mut report = WriteReport::default();

    let progress = if options.show_progress {
        let pb = ProgressBar::new(updates.len() as u64);
        if let Ok(style) = ProgressStyle::with_template("  {bar:40} {pos}/{len} {msg}") {
            pb.set_style(style);
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    for (i, update) in updates.iter().enumerate() {
        if update.fields.is_empty() {
            progress.inc(1);
            continue;
        }

        if i > 0 && !options.interval.is_zero() {
            tokio::time::sleep(options.interval).await;
        }

        progress.set_message(update.record.label.clone());

        match store.update(&update.record.id, &update.fields).await {
            Ok(()) => {
                report.updated += 1;
                if options.verbose {
                    progress.println(format!("  ✔ {} ({})", update.record.label, update.record.id));
                }
            }
            Err(e) => {
                progress.println(format!(
                    "  ✗ 更新エラー {} (ID: {}): {}",
                    update.record.label, update.record.id, e
                ));
                report.failed.push(FailedWrite {
                    record: update.record.clone(),
                    message: e.to_string(),
                });
            }
        }

        progress.inc(1);
    }

    progress.finish_and_clear();
    report
}
