//! 列構造・タグ分布の分析（読み取りのみ）

use crate::airtable::Record;
use crate::config::FieldNames;
use crate::report::print_rule;
use contact_tidy_common::{distribution, tag_tokens};
use serde_json::Value;
use std::collections::BTreeMap;

/// 1列分の統計
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldStats {
    pub name: String,
    /// 値の種類ごとの件数
    pub types: BTreeMap<&'static str, usize>,
    pub non_empty: usize,
    pub total: usize,
    pub samples: Vec<String>,
}

impl FieldStats {
    /// 最も多い値の種類
    pub fn dominant_type(&self) -> &'static str {
        self.types
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(kind, _)| *kind)
            .unwrap_or("-")
    }

    pub fn fill_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.non_empty as f64 / self.total as f64 * 100.0
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Number(_) => "number",
        Value::Bool(_) => "boolean",
        Value::Object(_) => "object",
        Value::Null => "null",
    }
}

fn is_filled(value: &Value) -> bool {
    match value {
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Null => false,
        _ => true,
    }
}

fn sample(value: &Value) -> String {
    match value {
        Value::String(s) => s.chars().take(100).collect(),
        Value::Array(items) => {
            let head: Vec<String> = items.iter().take(2).map(|v| v.to_string()).collect();
            format!("[{}]", head.join(", "))
        }
        other => other.to_string(),
    }
}

/// 全列の統計（列名順）
pub fn field_stats(records: &[Record], sample_limit: usize) -> Vec<FieldStats> {
    let mut stats: BTreeMap<&str, FieldStats> = BTreeMap::new();

    for record in records {
        for (name, value) in &record.fields {
            let entry = stats.entry(name.as_str()).or_insert_with(|| FieldStats {
                name: name.clone(),
                types: BTreeMap::new(),
                non_empty: 0,
                total: records.len(),
                samples: Vec::new(),
            });

            *entry.types.entry(value_kind(value)).or_insert(0) += 1;
            if is_filled(value) {
                entry.non_empty += 1;
                if entry.samples.len() < sample_limit {
                    entry.samples.push(sample(value));
                }
            }
        }
    }

    stats.into_values().collect()
}

/// 同じ氏名のレコード（多い順）
pub fn duplicate_names(records: &[Record], name_field: &str) -> Vec<(String, usize)> {
    let names: Vec<String> = records
        .iter()
        .map(|r| r.text(name_field))
        .filter(|n| !n.is_empty())
        .collect();

    distribution(names.iter())
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .collect()
}

/// タグの集計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagReport {
    pub with_tags: usize,
    pub without_tags: usize,
    pub instances: usize,
    pub distribution: Vec<(String, usize)>,
    pub duplicate_names: Vec<(String, usize)>,
}

pub fn tag_report(records: &[Record], fields: &FieldNames) -> TagReport {
    let mut report = TagReport::default();
    let mut all = Vec::new();

    for record in records {
        let tokens = tag_tokens(&record.field(&fields.tags));
        if tokens.is_empty() {
            report.without_tags += 1;
        } else {
            report.with_tags += 1;
            all.extend(tokens);
        }
    }

    report.instances = all.len();
    report.distribution = distribution(all.iter());
    report.duplicate_names = duplicate_names(records, &fields.name);
    report
}

pub fn print_field_stats(stats: &[FieldStats]) {
    println!("\n列構造:");
    print_rule();

    for field in stats {
        println!("\n列: {}", field.name);
        println!("  型: {}", field.dominant_type());
        println!("  入力済み: {}/{} ({:.1}%)", field.non_empty, field.total, field.fill_rate());
        if !field.samples.is_empty() {
            println!("  値の例:");
            for value in &field.samples {
                println!("    - {}", value);
            }
        }
    }
}

pub fn print_tag_report(report: &TagReport, limit: usize) {
    println!("\nタグ分布:");
    print_rule();
    println!("タグあり: {}", report.with_tags);
    println!("タグなし: {}", report.without_tags);
    println!("タグ総数: {}", report.instances);
    println!("種類: {}\n", report.distribution.len());

    for (tag, count) in report.distribution.iter().take(limit) {
        println!("  {:<30} {}", tag, count);
    }
    if report.distribution.len() > limit {
        println!("  ... 他 {}種類", report.distribution.len() - limit);
    }

    if !report.duplicate_names.is_empty() {
        println!("\n⚠ 重複している氏名: {}件", report.duplicate_names.len());
        for (name, count) in report.duplicate_names.iter().take(limit) {
            println!("  {}: {}件", name, count);
        }
    }
}
