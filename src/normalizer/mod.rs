//! 取得済みレコードの正規化計画
//!
//! Airtableのレコードから対象列の値を取り出し、共通ライブラリの
//! エンジンに渡して変更一覧（書き戻し用の更新内容）を作る。
//!
//! ## 処理フロー
//! 1. 対象列の値を (レコード, 値) の組として抽出
//! 2. 正規化キーでグループ化し、正規形を選ぶ
//! 3. 正規形と異なるレコードだけを更新対象にする

use crate::airtable::{Record, RecordUpdate};
use crate::config::FieldNames;
use crate::writeback::change_set_updates;
use contact_tidy_common::{
    canonicalize, format_title, plan_tag_migration, plan_tag_votes, repair_name_columns,
    Canonicalization, FieldKind, FieldValue, MigrationMap, NameRepair, RecordRef,
    TagPlan,
};
use serde_json::{Map, Value};

/// 正規化オプション
#[derive(Debug, Clone, Default)]
pub struct NormalizationOptions {
    /// 役職の正規形を整形してから書き戻す
    pub format_titles: bool,
}

/// 1列分の正規化計画
#[derive(Debug, Clone)]
pub struct FieldPlan {
    pub kind: FieldKind,
    pub field: String,
    pub result: Canonicalization,
}

impl FieldPlan {
    pub fn updates(&self) -> Vec<RecordUpdate> {
        change_set_updates(&self.result.change_set, &self.field)
    }
}

/// 氏名列の修正（1レコード分）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameColumnFix {
    pub record: RecordRef,
    pub primary_before: String,
    pub alias_before: String,
    pub repair: NameRepair,
}

/// 対象種別の列名
pub fn field_for(kind: FieldKind, fields: &FieldNames) -> &str {
    match kind {
        FieldKind::PersonName => &fields.name,
        FieldKind::JobTitle => &fields.title,
        FieldKind::CompanyName => &fields.company,
        FieldKind::Tag => &fields.tags,
    }
}

/// 文字列値を持つレコードだけを (参照, 値) として抽出
///
/// 前後の空白は除いた値を元の値として扱う。
pub fn text_pairs(records: &[Record], field: &str, label_field: &str) -> Vec<(RecordRef, String)> {
    records
        .iter()
        .filter_map(|record| {
            let value = record.field(field);
            let text = value.as_text()?.trim();
            if text.is_empty() {
                None
            } else {
                Some((record.to_ref(label_field), text.to_string()))
            }
        })
        .collect()
}

/// 列の値をそのまま抽出（タグ用）
pub fn field_values(records: &[Record], field: &str, label_field: &str) -> Vec<(RecordRef, FieldValue)> {
    records
        .iter()
        .map(|record| (record.to_ref(label_field), record.field(field)))
        .collect()
}

/// 単一値の列を正規化する
pub fn plan_field(
    records: &[Record],
    kind: FieldKind,
    fields: &FieldNames,
    options: &NormalizationOptions,
) -> FieldPlan {
    let field = field_for(kind, fields).to_string();
    let pairs = text_pairs(records, &field, &fields.name);
    let mut result = canonicalize(&kind, pairs);

    if options.format_titles && kind == FieldKind::JobTitle {
        result = result.map_canonical(format_title);
    }

    FieldPlan { kind, field, result }
}

/// 移行マップでタグを置き換える
pub fn plan_tags(records: &[Record], fields: &FieldNames, map: &MigrationMap) -> TagPlan {
    plan_tag_migration(&field_values(records, &fields.tags, &fields.name), map)
}

/// 頻度でタグの表記揺れを統一する
pub fn plan_tag_variants(records: &[Record], fields: &FieldNames) -> TagPlan {
    plan_tag_votes(&FieldKind::Tag, &field_values(records, &fields.tags, &fields.name))
}

/// タグ計画を書き戻し用の更新に変換
pub fn tag_updates(plan: &TagPlan, fields: &FieldNames) -> Vec<RecordUpdate> {
    change_set_updates(&plan.change_set, &fields.tags)
}

/// 氏名列・別名列を整理する
pub fn plan_name_columns(records: &[Record], fields: &FieldNames) -> Vec<NameColumnFix> {
    records
        .iter()
        .filter_map(|record| {
            let primary = record.text(&fields.name);
            let alias = record.text(&fields.alias_name);
            let repair = repair_name_columns(&primary, &alias)?;

            // ラベルは修正前の氏名、なければ別名
            let label = if primary.trim().is_empty() { alias.trim() } else { primary.trim() };
            let label = if label.is_empty() { "Unknown" } else { label };

            Some(NameColumnFix {
                record: RecordRef::new(&record.id, label),
                primary_before: primary,
                alias_before: alias,
                repair,
            })
        })
        .collect()
}

/// 変わった列だけを更新に含める
pub fn name_column_updates(fixes: &[NameColumnFix], fields: &FieldNames) -> Vec<RecordUpdate> {
    fixes
        .iter()
        .map(|fix| {
            let mut changed = Map::new();
            if fix.repair.primary != fix.primary_before {
                changed.insert(fields.name.clone(), text_value(&fix.repair.primary));
            }
            if fix.repair.alias != fix.alias_before {
                changed.insert(fields.alias_name.clone(), text_value(&fix.repair.alias));
            }
            RecordUpdate {
                record: fix.record.clone(),
                fields: changed,
            }
        })
        .filter(|update| !update.fields.is_empty())
        .collect()
}

fn text_value(text: &str) -> Value {
    if text.is_empty() {
        Value::Null
    } else {
        Value::String(text.to_string())
    }
}
