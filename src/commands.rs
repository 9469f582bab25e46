//! サブコマンドの実行
//!
//! 取得 → 計画 → プレビュー → 確認 → 書き戻し → サマリー の流れを
//! 各サブコマンドで共有する。ストアは `RecordStore` で差し替えられる。

use crate::airtable::{Record, RecordStore, RecordUpdate};
use crate::analyze;
use crate::config::FieldNames;
use crate::confirm::confirm_apply;
use crate::error::{ContactTidyError, Result};
use crate::normalizer::{self, NormalizationOptions};
use crate::report::{self, RunSummary};
use crate::writeback::{apply_updates, WriteOptions};
use contact_tidy_common::{FieldKind, MigrationMap, TagOutcome, TagPlan};
use std::path::{Path, PathBuf};

/// 実行時の共通設定
#[derive(Debug, Clone)]
pub struct RunContext {
    pub dry_run: bool,
    /// 確認なしで書き込む
    pub yes: bool,
    pub verbose: bool,
    pub preview_limit: usize,
    /// 変更一覧の保存先
    pub report: Option<PathBuf>,
    pub write: WriteOptions,
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            dry_run: false,
            yes: false,
            verbose: false,
            preview_limit: 20,
            report: None,
            write: WriteOptions::default(),
        }
    }
}

/// タグの正規化方法
#[derive(Debug, Clone)]
pub enum TagMode {
    /// 移行マップで置き換える
    Migrate(MigrationMap),
    /// 頻度で表記揺れを統一する
    Votes,
}

impl TagMode {
    /// プリセットとカスタムマップから移行モードを作る（カスタム側が優先）
    ///
    /// どちらも指定がなければ `default` プリセットを使う。
    pub fn from_sources(preset: Option<&str>, map_path: Option<&Path>) -> Result<Self> {
        let mut map = match (preset, map_path) {
            (None, Some(_)) => MigrationMap::default(),
            (name, _) => {
                let name = name.unwrap_or("default");
                MigrationMap::from_preset(name)
                    .ok_or_else(|| ContactTidyError::Config(format!("不明なプリセット: {}", name)))?
            }
        };

        if let Some(path) = map_path {
            map.merge(&MigrationMap::from_file(path)?);
        }

        Ok(TagMode::Migrate(map))
    }
}

async fn fetch<S: RecordStore + ?Sized>(store: &S, step: &str) -> Result<Vec<Record>> {
    println!("{} レコードを取得中...", step);
    let records = store.fetch_all().await?;
    println!("✔ {}件のレコードを取得\n", records.len());
    Ok(records)
}

/// 役職・会社名・氏名の表記揺れを統一する
pub async fn run_field<S: RecordStore + ?Sized>(
    store: &S,
    fields: &FieldNames,
    kind: FieldKind,
    options: &NormalizationOptions,
    ctx: &RunContext,
) -> Result<RunSummary> {
    let records = fetch(store, "[1/3]").await?;

    println!("[2/3] {}の表記揺れを分析中...", kind);
    let plan = normalizer::plan_field(&records, kind, fields, options);
    let summary = RunSummary::from_canonicalization(&plan.result);

    let values: usize = plan.result.groups.values().map(|g| g.len()).sum();
    println!("✔ {}件の{}を{}グループに分類", values, kind, summary.groups_found);
    println!("  表記揺れのあるグループ: {}", summary.variant_groups);
    println!("  変更対象レコード: {}", summary.records_affected);

    let previews = plan.result.preview(ctx.preview_limit);
    report::print_preview(
        &format!("表記揺れの多い{} (上位{}件):", kind, previews.len()),
        &previews,
        summary.variant_groups,
    );

    if ctx.verbose && !plan.result.change_set.is_empty() {
        println!("\n変更内容:");
        report::print_changes(&plan.result.change_set, ctx.preview_limit);
    }

    let updates = plan.updates();
    finish(store, &kind.to_string(), &updates, summary, ctx, "[3/3]").await
}

/// タグを整理する
pub async fn run_tags<S: RecordStore + ?Sized>(
    store: &S,
    fields: &FieldNames,
    mode: &TagMode,
    ctx: &RunContext,
) -> Result<RunSummary> {
    let records = fetch(store, "[1/3]").await?;

    println!("[2/3] タグを分析中...");
    let plan = match mode {
        TagMode::Migrate(map) => normalizer::plan_tags(&records, fields, map),
        TagMode::Votes => normalizer::plan_tag_variants(&records, fields),
    };

    print_tag_plan(&plan, ctx.preview_limit);

    let mut summary = match &plan.votes {
        Some(votes) => RunSummary::from_canonicalization(votes),
        None => RunSummary::default(),
    };
    summary.records_affected = plan.change_set.len();

    if ctx.verbose && !plan.change_set.is_empty() {
        println!("\n変更内容:");
        report::print_changes(&plan.change_set, ctx.preview_limit);
    }

    let updates = normalizer::tag_updates(&plan, fields);
    finish(store, "タグ", &updates, summary, ctx, "[3/3]").await
}

fn print_tag_plan(plan: &TagPlan, limit: usize) {
    println!("✔ タグのあるレコード: {}", plan.records.len());
    println!("  変更なし: {}", plan.count(TagOutcome::Unchanged));
    println!("  書き換え: {}", plan.count(TagOutcome::Migrate));
    println!("  全削除: {}", plan.count(TagOutcome::RemoveAll));

    if !plan.unknown.is_empty() {
        println!(
            "\n⚠ 移行マップにないタグ: {}種類 / {}件 (そのまま残します)",
            plan.unknown.len(),
            plan.unknown_occurrences()
        );
        for (tag, records) in plan.unknown.iter().take(limit) {
            println!("  '{}': {}件", tag, records.len());
        }
    }

    if let Some(votes) = &plan.votes {
        let previews = votes.preview(limit);
        report::print_preview("表記揺れの多いタグ:", &previews, votes.variant_group_count());
    }

    let new_distribution = plan.new_distribution();
    if !new_distribution.is_empty() {
        println!("\n整理後のタグ分布:");
        for (tag, count) in new_distribution.iter().take(limit) {
            println!("  {}: {}", tag, count);
        }
    }
}

/// 氏名列・別名列を整理する
pub async fn run_name_columns<S: RecordStore + ?Sized>(
    store: &S,
    fields: &FieldNames,
    ctx: &RunContext,
) -> Result<RunSummary> {
    let records = fetch(store, "[1/3]").await?;

    println!("[2/3] 氏名列を分析中...");
    let fixes = normalizer::plan_name_columns(&records, fields);
    println!("✔ 修正が必要なレコード: {}", fixes.len());

    for fix in fixes.iter().take(ctx.preview_limit) {
        println!("\n  {} (ID: {})", fix.record.label, fix.record.id);
        println!("    氏名: '{}' → '{}'", fix.primary_before, fix.repair.primary);
        println!("    別名: '{}' → '{}'", fix.alias_before, fix.repair.alias);
        for reason in &fix.repair.reasons {
            println!("    - {}", reason);
        }
    }
    if fixes.len() > ctx.preview_limit {
        println!("\n  ... 他 {}件", fixes.len() - ctx.preview_limit);
    }

    let updates = normalizer::name_column_updates(&fixes, fields);
    let summary = RunSummary {
        records_affected: updates.len(),
        ..Default::default()
    };
    finish(store, "氏名列", &updates, summary, ctx, "[3/3]").await
}

/// 確認・書き戻し・サマリー表示
///
/// 書き込み後の失敗（個別の更新・レポート保存）は表示だけして `Ok` を返す。
async fn finish<S: RecordStore + ?Sized>(
    store: &S,
    command: &str,
    updates: &[RecordUpdate],
    summary: RunSummary,
    ctx: &RunContext,
    step: &str,
) -> Result<RunSummary> {
    if updates.is_empty() {
        println!("\n✓ 変更はありません");
        report::print_summary(&summary, true);
        return Ok(summary);
    }

    if ctx.dry_run {
        println!("\n[ドライラン] 変更は適用されません");
        report::print_summary(&summary, true);
        save_report(ctx, command, true, &summary, updates);
        return Ok(summary);
    }

    if !ctx.yes && !confirm_apply(updates.len())? {
        println!("キャンセルしました");
        return Ok(summary);
    }

    println!("\n{} {}件を更新中...", step, updates.len());
    let writes = apply_updates(store, updates, &ctx.write).await;
    let summary = summary.with_writes(&writes);

    report::print_summary(&summary, false);
    save_report(ctx, command, false, &summary, updates);

    println!("\n✅ 完了");
    Ok(summary)
}

fn save_report(ctx: &RunContext, command: &str, dry_run: bool, summary: &RunSummary, updates: &[RecordUpdate]) {
    let Some(path) = &ctx.report else {
        return;
    };

    match report::save_report(path, command, dry_run, summary, updates) {
        Ok(()) => println!("✔ 変更一覧を保存: {}", path.display()),
        Err(e) => eprintln!("⚠ 変更一覧を保存できませんでした ({}): {}", path.display(), e),
    }
}

/// 列構造とタグ分布を表示する（読み取りのみ）
pub async fn run_analyze<S: RecordStore + ?Sized>(
    store: &S,
    fields: &FieldNames,
    tags_only: bool,
    ctx: &RunContext,
) -> Result<()> {
    let records = fetch(store, "[1/2]").await?;

    println!("[2/2] 分析中...");
    if !tags_only {
        let stats = analyze::field_stats(&records, 3);
        analyze::print_field_stats(&stats);
    }

    let tags = analyze::tag_report(&records, fields);
    analyze::print_tag_report(&tags, ctx.preview_limit);
    Ok(())
}
