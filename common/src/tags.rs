//! タグ（複数値フィールド）の正規化
//!
//! - 区切り文字で分割（最初に見つかった区切り文字だけを使う）
//! - 移行マップによる置き換え・削除
//! - 頻度による表記揺れの統一

use crate::alias::MigrationMap;
use crate::canonical::{canonicalize, Canonicalization};
use crate::policy::FieldPolicy;
use crate::types::{ChangeEntry, ChangeSet, FieldValue, RecordRef};
use std::collections::{BTreeMap, HashMap};

/// 区切り文字（優先順）
const DELIMITERS: &[char] = &[',', ';', '|', '\n'];

/// 文字列のタグを分割する
///
/// 最初に見つかった区切り文字で文字列全体を分割する。
/// `"Founder, Investor; Engineer"` は `,` だけで分割され、
/// `"Investor; Engineer"` が1つのタグとして残る。
pub fn split_tags(raw: &str) -> Vec<String> {
    let tokens: Vec<&str> = match DELIMITERS.iter().find(|d| raw.contains(**d)) {
        Some(delimiter) => raw.split(*delimiter).collect(),
        None => vec![raw],
    };

    tokens
        .into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// フィールド値をタグ列に変換
pub fn tag_tokens(value: &FieldValue) -> Vec<String> {
    match value {
        FieldValue::List(items) => items
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        FieldValue::Text(raw) => split_tags(raw),
        FieldValue::Empty => Vec::new(),
    }
}

/// レコード単位の判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOutcome {
    /// 変更なし
    Unchanged,
    /// タグを書き換える
    Migrate,
    /// 全タグを削除
    RemoveAll,
}

/// 1レコード分の計画
#[derive(Debug, Clone)]
pub struct TagRecordPlan {
    pub record: RecordRef,
    pub old: Vec<String>,
    pub new: Vec<String>,
    pub outcome: TagOutcome,
}

/// タグ正規化の計画
#[derive(Debug, Clone, Default)]
pub struct TagPlan {
    pub records: Vec<TagRecordPlan>,
    pub change_set: ChangeSet,
    /// マップにないタグ → 該当レコード
    pub unknown: BTreeMap<String, Vec<RecordRef>>,
    /// 頻度統一モードのグループ情報
    pub votes: Option<Canonicalization>,
}

impl TagPlan {
    pub fn count(&self, outcome: TagOutcome) -> usize {
        self.records.iter().filter(|r| r.outcome == outcome).count()
    }

    pub fn unknown_occurrences(&self) -> usize {
        self.unknown.values().map(Vec::len).sum()
    }

    /// 移行前のタグ分布（多い順）
    pub fn old_distribution(&self) -> Vec<(String, usize)> {
        distribution(self.records.iter().flat_map(|r| r.old.iter()))
    }

    /// 移行後のタグ分布（多い順）
    pub fn new_distribution(&self) -> Vec<(String, usize)> {
        distribution(self.records.iter().flat_map(|r| r.new.iter()))
    }

    fn push(&mut self, record: RecordRef, from: &FieldValue, old: Vec<String>, new: Vec<String>) {
        let outcome = if old == new {
            TagOutcome::Unchanged
        } else if new.is_empty() {
            TagOutcome::RemoveAll
        } else {
            TagOutcome::Migrate
        };

        if outcome != TagOutcome::Unchanged {
            self.change_set.push(ChangeEntry {
                record: record.clone(),
                from: from.clone(),
                to: FieldValue::List(new.clone()),
            });
        }

        self.records.push(TagRecordPlan { record, old, new, outcome });
    }
}

/// タグの出現回数（多い順、同数はタグ名順）
pub fn distribution<'a>(tags: impl Iterator<Item = &'a String>) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for tag in tags {
        *counts.entry(tag.as_str()).or_insert(0) += 1;
    }

    let mut sorted: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(tag, count)| (tag.to_string(), count))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));
    sorted
}

/// 移行マップでタグを置き換える計画を作る
///
/// タグが空のレコードは対象外。
pub fn plan_tag_migration(records: &[(RecordRef, FieldValue)], map: &MigrationMap) -> TagPlan {
    let mut plan = TagPlan::default();

    for (record, value) in records {
        let old = tag_tokens(value);
        if old.is_empty() {
            continue;
        }

        let migration = map.migrate(old.iter().map(String::as_str));
        for tag in migration.unknown {
            plan.unknown.entry(tag).or_default().push(record.clone());
        }

        plan.push(record.clone(), value, old, migration.tokens);
    }

    plan
}

/// 頻度でタグの表記揺れを統一する計画を作る
pub fn plan_tag_votes<P: FieldPolicy + ?Sized>(
    policy: &P,
    records: &[(RecordRef, FieldValue)],
) -> TagPlan {
    let tokenized: Vec<(&RecordRef, &FieldValue, Vec<String>)> = records
        .iter()
        .map(|(record, value)| (record, value, tag_tokens(value)))
        .filter(|(_, _, tokens)| !tokens.is_empty())
        .collect();

    let votes = canonicalize(
        policy,
        tokenized
            .iter()
            .flat_map(|(record, _, tokens)| tokens.iter().map(move |t| ((*record).clone(), t.clone()))),
    );

    let canonical_by_key: HashMap<&str, &str> = votes
        .choices
        .values()
        .map(|c| (c.key.as_str(), c.canonical.as_str()))
        .collect();

    let mut plan = TagPlan::default();

    for (record, value, old) in &tokenized {
        let mut new: Vec<String> = Vec::with_capacity(old.len());
        for token in old {
            let key = policy.normalize_key(token);
            let target = canonical_by_key.get(key.as_str()).copied().unwrap_or(token.as_str());
            if !new.iter().any(|t| t == target) {
                new.push(target.to_string());
            }
        }

        plan.push((*record).clone(), value, old.clone(), new);
    }

    plan.votes = Some(votes);
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::FieldKind;

    fn rec(id: &str) -> RecordRef {
        RecordRef::new(id, id.to_uppercase())
    }

    #[test]
    fn test_split_first_delimiter_only() {
        assert_eq!(
            split_tags("Founder, Investor; Engineer / Lead"),
            vec!["Founder", "Investor; Engineer / Lead"]
        );
    }

    #[test]
    fn test_split_priority_and_single_token() {
        assert_eq!(split_tags("A; B|C"), vec!["A", "B|C"]);
        assert_eq!(split_tags("A|B"), vec!["A", "B"]);
        assert_eq!(split_tags("A\nB"), vec!["A", "B"]);
        assert_eq!(split_tags("  Engineer / Lead "), vec!["Engineer / Lead"]);
        assert!(split_tags(" , ").is_empty());
    }

    #[test]
    fn test_tag_tokens_from_list() {
        let value = FieldValue::List(vec![" Founder ".into(), "".into(), "Investor".into()]);
        assert_eq!(tag_tokens(&value), vec!["Founder", "Investor"]);
        assert!(tag_tokens(&FieldValue::Empty).is_empty());
    }

    #[test]
    fn test_plan_migration_outcomes() {
        let map = MigrationMap::from_json(r#"{"Doer": "Founder", "House Owner": null, "Investor": "Investor"}"#).unwrap();
        let records = vec![
            (rec("a"), FieldValue::List(vec!["Doer".into(), "House Owner".into(), "Investor".into()])),
            (rec("b"), FieldValue::Text("House Owner".into())),
            (rec("c"), FieldValue::Text("Investor".into())),
            (rec("d"), FieldValue::Empty),
            (rec("e"), FieldValue::Text("Mentor".into())),
        ];

        let plan = plan_tag_migration(&records, &map);

        assert_eq!(plan.records.len(), 4);
        assert_eq!(plan.count(TagOutcome::Migrate), 1);
        assert_eq!(plan.count(TagOutcome::RemoveAll), 1);
        assert_eq!(plan.count(TagOutcome::Unchanged), 2);
        assert_eq!(plan.change_set.len(), 2);
        assert_eq!(
            plan.change_set.get("a").unwrap().to,
            FieldValue::List(vec!["Founder".into(), "Investor".into()])
        );
        assert_eq!(plan.change_set.get("b").unwrap().to.to_json(), serde_json::Value::Null);
        assert_eq!(plan.unknown.keys().collect::<Vec<_>>(), vec!["Mentor"]);
    }

    #[test]
    fn test_plan_votes_unifies_case_variants() {
        let records = vec![
            (rec("a"), FieldValue::List(vec!["Founder".into(), "Investor".into()])),
            (rec("b"), FieldValue::Text("founder, Investor".into())),
            (rec("c"), FieldValue::Text("Founder".into())),
        ];

        let plan = plan_tag_votes(&FieldKind::Tag, &records);

        assert_eq!(plan.change_set.len(), 1);
        assert_eq!(
            plan.change_set.get("b").unwrap().to,
            FieldValue::List(vec!["Founder".into(), "Investor".into()])
        );
        assert_eq!(plan.votes.as_ref().unwrap().variant_group_count(), 1);
    }

    #[test]
    fn test_distribution_sorted() {
        let tags: Vec<String> = vec!["B".into(), "A".into(), "B".into(), "C".into()];
        let dist = distribution(tags.iter());
        assert_eq!(dist[0], ("B".to_string(), 2));
        assert_eq!(dist[1], ("A".to_string(), 1));
    }
}
