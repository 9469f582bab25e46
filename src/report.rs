//! 実行結果の表示・保存

use crate::airtable::RecordUpdate;
use crate::error::Result;
use crate::writeback::{FailedWrite, WriteReport};
use contact_tidy_common::{Canonicalization, ChangeSet, GroupPreview};
use serde::Serialize;
use std::path::Path;

const RULE: &str = "================================================================================";

/// 実行サマリー
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// グループ数
    pub groups_found: usize,
    /// 表記揺れのあるグループ数
    pub variant_groups: usize,
    /// 変更対象のレコード数
    pub records_affected: usize,
    /// 更新したレコード数
    pub records_updated: usize,
    /// 更新に失敗したレコード数
    pub records_failed: usize,
    /// 更新に失敗したレコード（保存時は別欄に出す）
    #[serde(skip)]
    pub failed: Vec<FailedWrite>,
}

impl RunSummary {
    pub fn from_canonicalization(result: &Canonicalization) -> Self {
        Self {
            groups_found: result.group_count(),
            variant_groups: result.variant_group_count(),
            records_affected: result.change_set.len(),
            ..Default::default()
        }
    }

    pub fn with_writes(mut self, report: &WriteReport) -> Self {
        self.records_updated = report.updated;
        self.records_failed = report.failed_count();
        self.failed = report.failed.clone();
        self
    }
}

pub fn print_rule() {
    println!("{}", RULE);
}

/// 表記揺れの多いグループを表示
pub fn print_preview(title: &str, previews: &[GroupPreview], total: usize) {
    if previews.is_empty() {
        return;
    }

    println!("\n{}", title);
    print_rule();

    for (i, preview) in previews.iter().enumerate() {
        println!("\n{}. 正規化キー: '{}'", i + 1, preview.key);
        println!("   表記: {:?}", preview.variants);
        println!("   正規形: '{}'", preview.canonical);
        println!("   レコード数: {}", preview.records);
    }

    if total > previews.len() {
        println!("\n... 他 {} グループ", total - previews.len());
    }
}

/// 変更内容を表示（最大 `limit` 件）
pub fn print_changes(change_set: &ChangeSet, limit: usize) {
    for entry in change_set.iter().take(limit) {
        println!("  {}: {} → {}", entry.record.label, entry.from, entry.to);
    }
    if change_set.len() > limit {
        println!("  ... 他 {}件", change_set.len() - limit);
    }
}

/// サマリーの表示行
///
/// グループ化しない実行（タグ移行・氏名列）ではグループ数を出さない。
pub fn summary_lines(summary: &RunSummary, dry_run: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if summary.groups_found > 0 {
        lines.push(format!("グループ数: {}", summary.groups_found));
        lines.push(format!("表記揺れのあるグループ: {}", summary.variant_groups));
    }
    lines.push(format!("変更対象レコード: {}", summary.records_affected));

    if !dry_run {
        lines.push(format!("更新成功: {}", summary.records_updated));
        if summary.records_failed > 0 {
            lines.push(format!("更新失敗: {} (再実行で再試行できます)", summary.records_failed));
            for failure in &summary.failed {
                lines.push(format!(
                    "  ✗ {} (ID: {}): {}",
                    failure.record.label, failure.record.id, failure.message
                ));
            }
        }
    }
    lines
}

pub fn print_summary(summary: &RunSummary, dry_run: bool) {
    println!();
    print_rule();
    for line in summary_lines(summary, dry_run) {
        println!("{}", line);
    }
}

/// 保存用レポート
#[derive(Debug, Serialize)]
struct SavedReport<'a> {
    generated_at: String,
    command: &'a str,
    dry_run: bool,
    summary: &'a RunSummary,
    changes: &'a [RecordUpdate],
    failed: &'a [FailedWrite],
}

/// 変更一覧をJSONで保存
pub fn save_report(
    path: &Path,
    command: &str,
    dry_run: bool,
    summary: &RunSummary,
    changes: &[RecordUpdate],
) -> Result<()> {
    let report = SavedReport {
        generated_at: chrono::Local::now().to_rfc3339(),
        command,
        dry_run,
        summary,
        changes,
        failed: &summary.failed,
    };

    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contact_tidy_common::{canonicalize, FieldKind, RecordRef};

    #[test]
    fn test_summary_from_canonicalization() {
        let pairs = vec![
            (RecordRef::new("a", "A"), "OpenAI".to_string()),
            (RecordRef::new("b", "B"), "openai".to_string()),
            (RecordRef::new("c", "C"), "Anthropic".to_string()),
        ];
        let result = canonicalize(&FieldKind::CompanyName, pairs);
        let summary = RunSummary::from_canonicalization(&result);

        assert_eq!(summary.groups_found, 2);
        assert_eq!(summary.variant_groups, 1);
        assert_eq!(summary.records_affected, 1);
    }

    #[test]
    fn test_summary_with_writes() {
        let report = WriteReport {
            updated: 3,
            failed: vec![crate::writeback::FailedWrite {
                record: RecordRef::new("x", "X"),
                message: "422".into(),
            }],
        };
        let summary = RunSummary::default().with_writes(&report);
        assert_eq!(summary.records_updated, 3);
        assert_eq!(summary.records_failed, 1);
        assert_eq!(summary.failed[0].record.id, "x");
    }

    #[test]
    fn test_summary_lines_list_failed_records() {
        let report = WriteReport {
            updated: 1,
            failed: vec![crate::writeback::FailedWrite {
                record: RecordRef::new("rec9", "张三"),
                message: "422 INVALID_VALUE_FOR_COLUMN".into(),
            }],
        };
        let summary = RunSummary {
            groups_found: 2,
            variant_groups: 1,
            records_affected: 2,
            ..Default::default()
        }
        .with_writes(&report);

        let lines = summary_lines(&summary, false);
        assert!(lines.contains(&"更新失敗: 1 (再実行で再試行できます)".to_string()));
        assert!(lines.contains(&"  ✗ 张三 (ID: rec9): 422 INVALID_VALUE_FOR_COLUMN".to_string()));

        // ドライランでは更新結果を出さない
        assert!(summary_lines(&summary, true).iter().all(|l| !l.contains("更新")));
    }

    #[test]
    fn test_summary_lines_without_groups() {
        let summary = RunSummary {
            records_affected: 3,
            ..Default::default()
        };
        let lines = summary_lines(&summary, true);
        assert_eq!(lines, vec!["変更対象レコード: 3".to_string()]);
    }

    #[test]
    fn test_saved_report_includes_failures() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("report.json");
        let summary = RunSummary::default().with_writes(&WriteReport {
            updated: 0,
            failed: vec![crate::writeback::FailedWrite {
                record: RecordRef::new("rec1", "A"),
                message: "timeout".into(),
            }],
        });

        save_report(&path, "役職", false, &summary, &[]).unwrap();

        let saved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["summary"]["records_failed"], serde_json::json!(1));
        assert_eq!(saved["failed"][0]["record"]["id"], serde_json::json!("rec1"));
        assert_eq!(saved["failed"][0]["message"], serde_json::json!("timeout"));
        assert!(saved["summary"].get("failed").is_none());
    }
}
