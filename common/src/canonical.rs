//! 表記揺れの統一（正規化エンジン）
//!
//! ## 処理フロー
//! 1. 正規化キーで値をグループ化
//! 2. 表記揺れのあるグループごとに正規形を1つ選ぶ
//! 3. 正規形と異なるレコードだけを変更一覧に出す
//!
//! I/Oは行わない。書き戻しは呼び出し側の責務。

use crate::policy::FieldPolicy;
use crate::types::{ChangeEntry, ChangeSet, FieldValue, Member, NormalizationGroup, RecordRef};
use std::collections::BTreeMap;

/// グループごとに選ばれた正規形
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalChoice {
    pub key: String,
    pub canonical: String,
}

/// プレビュー表示用のグループ情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPreview {
    pub key: String,
    pub variants: Vec<String>,
    pub canonical: String,
    pub records: usize,
}

/// 1回の正規化結果
#[derive(Debug, Clone, Default)]
pub struct Canonicalization {
    /// キー順に並んだ全グループ
    pub groups: BTreeMap<String, NormalizationGroup>,
    /// 表記揺れのあるグループの正規形
    pub choices: BTreeMap<String, CanonicalChoice>,
    pub change_set: ChangeSet,
}

impl Canonicalization {
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn variant_group_count(&self) -> usize {
        self.choices.len()
    }

    /// 正規形に置き換えた後に適用する整形（役職の書式統一など）
    ///
    /// 変更一覧は整形後の値で作り直す。
    pub fn map_canonical<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String,
    {
        for choice in self.choices.values_mut() {
            choice.canonical = f(&choice.canonical);
        }
        self.change_set = build_change_set(&self.groups, &self.choices);
        self
    }

    /// メンバー数の多い順に表記揺れグループを最大 `limit` 件
    pub fn preview(&self, limit: usize) -> Vec<GroupPreview> {
        let mut previews: Vec<GroupPreview> = self
            .choices
            .values()
            .filter_map(|choice| {
                let group = self.groups.get(&choice.key)?;
                Some(GroupPreview {
                    key: choice.key.clone(),
                    variants: group.distinct_values().into_iter().map(str::to_string).collect(),
                    canonical: choice.canonical.clone(),
                    records: group.len(),
                })
            })
            .collect();

        // BTreeMap由来でキー昇順なので安定ソートで十分
        previews.sort_by(|a, b| b.records.cmp(&a.records));
        previews.truncate(limit);
        previews
    }
}

/// 正規化キーを生成
pub fn normalize_key<P: FieldPolicy + ?Sized>(policy: &P, value: &str) -> String {
    policy.normalize_key(value)
}

/// (レコード, 値) の組をキーごとにグループ化
///
/// 空白のみの値はどのグループにも入らない。
pub fn group<P, I>(policy: &P, pairs: I) -> BTreeMap<String, NormalizationGroup>
where
    P: FieldPolicy + ?Sized,
    I: IntoIterator<Item = (RecordRef, String)>,
{
    let mut groups: BTreeMap<String, NormalizationGroup> = BTreeMap::new();

    for (record, original) in pairs {
        if original.trim().is_empty() {
            continue;
        }

        let key = policy.normalize_key(&original);
        if key.is_empty() {
            continue;
        }

        groups
            .entry(key.clone())
            .or_insert_with(|| NormalizationGroup::new(key))
            .members
            .push(Member { record, original });
    }

    groups
}

/// グループの正規形を選ぶ
///
/// 1. 出現回数が最大のもの
/// 2. ポリシーのタイブレーク（大文字始まり、`&` など）
/// 3. 文字数が最短のもの
/// 4. 辞書順で最初のもの
///
/// 入力順には依存しない。
pub fn choose_canonical<P: FieldPolicy + ?Sized>(
    policy: &P,
    group: &NormalizationGroup,
) -> Option<CanonicalChoice> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for member in &group.members {
        *counts.entry(member.original.as_str()).or_insert(0) += 1;
    }

    let max_count = counts.values().copied().max()?;
    let mut candidates: Vec<&str> = counts
        .into_iter()
        .filter(|(_, count)| *count == max_count)
        .map(|(value, _)| value)
        .collect();

    for rule in policy.tie_breaks() {
        if candidates.len() == 1 {
            break;
        }
        if candidates.iter().any(|c| rule.accepts(c)) {
            candidates.retain(|c| rule.accepts(c));
        }
    }

    let canonical = candidates
        .into_iter()
        .min_by(|a, b| a.chars().count().cmp(&b.chars().count()).then_with(|| a.cmp(b)))?;

    Some(CanonicalChoice {
        key: group.key.clone(),
        canonical: canonical.to_string(),
    })
}

/// 正規形と異なるレコードの変更一覧を作る
pub fn build_change_set(
    groups: &BTreeMap<String, NormalizationGroup>,
    choices: &BTreeMap<String, CanonicalChoice>,
) -> ChangeSet {
    let mut change_set = ChangeSet::new();

    for group in groups.values() {
        if !group.is_variant_bearing() {
            continue;
        }
        let Some(choice) = choices.get(&group.key) else {
            continue;
        };

        for member in &group.members {
            if member.original != choice.canonical {
                change_set.push(ChangeEntry {
                    record: member.record.clone(),
                    from: FieldValue::Text(member.original.clone()),
                    to: FieldValue::Text(choice.canonical.clone()),
                });
            }
        }
    }

    change_set
}

/// グループ化から変更一覧までを一括実行
pub fn canonicalize<P, I>(policy: &P, pairs: I) -> Canonicalization
where
    P: FieldPolicy + ?Sized,
    I: IntoIterator<Item = (RecordRef, String)>,
{
    let groups = group(policy, pairs);

    let choices: BTreeMap<String, CanonicalChoice> = groups
        .values()
        .filter(|g| g.is_variant_bearing())
        .filter_map(|g| choose_canonical(policy, g))
        .map(|choice| (choice.key.clone(), choice))
        .collect();

    let change_set = build_change_set(&groups, &choices);

    Canonicalization {
        groups,
        choices,
        change_set,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::FieldKind;

    fn pairs(values: &[&str]) -> Vec<(RecordRef, String)> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (RecordRef::new(format!("rec{}", i), format!("Person {}", i)), v.to_string()))
            .collect()
    }

    fn group_of(kind: FieldKind, values: &[&str]) -> NormalizationGroup {
        let groups = group(&kind, pairs(values));
        assert_eq!(groups.len(), 1, "全て同じキーになるはず: {:?}", groups.keys());
        groups.into_values().next().unwrap()
    }

    #[test]
    fn test_group_skips_blank_values() {
        let groups = group(&FieldKind::CompanyName, pairs(&["OpenAI", "  ", "", "openai"]));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups["openai"].len(), 2);
    }

    #[test]
    fn test_group_keeps_input_order() {
        let groups = group(&FieldKind::CompanyName, pairs(&["openai", "OpenAI", "OPENAI"]));
        let ids: Vec<&str> = groups["openai"].members.iter().map(|m| m.record.id.as_str()).collect();
        assert_eq!(ids, vec!["rec0", "rec1", "rec2"]);
    }

    #[test]
    fn test_frequency_wins_over_capitalization() {
        let g = group_of(FieldKind::CompanyName, &["openai", "openai", "OpenAI"]);
        assert_eq!(choose_canonical(&FieldKind::CompanyName, &g).unwrap().canonical, "openai");
    }

    #[test]
    fn test_ampersand_preferred_for_titles() {
        let g = group_of(FieldKind::JobTitle, &["Founder and CEO", "Founder & CEO"]);
        assert_eq!(choose_canonical(&FieldKind::JobTitle, &g).unwrap().canonical, "Founder & CEO");
    }

    #[test]
    fn test_shortest_then_lexicographic() {
        let g = group_of(FieldKind::JobTitle, &["VP, Sales", "VP Sales"]);
        assert_eq!(choose_canonical(&FieldKind::JobTitle, &g).unwrap().canonical, "VP Sales");

        // 同じ長さなら辞書順
        let g = group_of(FieldKind::Tag, &["founder", "Founder"]);
        assert_eq!(choose_canonical(&FieldKind::Tag, &g).unwrap().canonical, "Founder");
    }

    #[test]
    fn test_change_set_skips_canonical_members() {
        let result = canonicalize(&FieldKind::CompanyName, pairs(&["OpenAI", "openai", "OpenAI"]));
        assert_eq!(result.variant_group_count(), 1);
        assert_eq!(result.change_set.len(), 1);
        assert_eq!(result.change_set.entries()[0].record.id, "rec1");
        assert_eq!(result.change_set.entries()[0].to, FieldValue::Text("OpenAI".into()));
    }

    #[test]
    fn test_map_canonical_rebuilds_change_set() {
        let result = canonicalize(&FieldKind::JobTitle, pairs(&["ceo", "ceo", "Ceo"]))
            .map_canonical(|c| c.to_uppercase());
        assert_eq!(result.choices["ceo"].canonical, "CEO");
        assert_eq!(result.change_set.len(), 3);
    }

    #[test]
    fn test_preview_orders_by_size_and_limits() {
        let result = canonicalize(
            &FieldKind::CompanyName,
            pairs(&["Acme", "acme", "Beta", "beta", "BETA", "Gamma", "gamma"]),
        );
        let preview = result.preview(2);
        assert_eq!(preview.len(), 2);
        assert_eq!(preview[0].key, "beta");
        assert_eq!(preview[0].records, 3);
        // 同数ならキー順
        assert_eq!(preview[1].key, "acme");
    }
}
