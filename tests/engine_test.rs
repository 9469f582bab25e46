//! 正規化エンジンの性質テスト
//!
//! 冪等性・入力順への非依存・変更一覧の網羅性と、代表的な入力例

use contact_tidy_common::{
    canonicalize, split_tags, ChangeSet, FieldKind, FieldValue, MigrationMap, RecordRef,
};
use std::collections::{BTreeMap, HashSet};

fn pairs(values: &[&str]) -> Vec<(RecordRef, String)> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| (RecordRef::new(format!("rec{}", i), format!("R{}", i)), v.to_string()))
        .collect()
}

/// 変更一覧を適用した後の値
fn apply(pairs: &[(RecordRef, String)], change_set: &ChangeSet) -> Vec<(RecordRef, String)> {
    pairs
        .iter()
        .map(|(record, value)| match change_set.get(&record.id).map(|e| &e.to) {
            Some(FieldValue::Text(canonical)) => (record.clone(), canonical.clone()),
            _ => (record.clone(), value.clone()),
        })
        .collect()
}

fn canonical_map(pairs: &[(RecordRef, String)], kind: FieldKind) -> BTreeMap<String, String> {
    canonicalize(&kind, pairs.to_vec())
        .choices
        .into_values()
        .map(|c| (c.key, c.canonical))
        .collect()
}

#[test]
fn test_title_tie_resolved_by_capitalization_then_ampersand() {
    let input = pairs(&["Co-Founder and CEO", "Co-Founder & CEO", "co-founder & ceo"]);
    let result = canonicalize(&FieldKind::JobTitle, input);

    assert_eq!(result.group_count(), 1);
    let choice = result.choices.values().next().unwrap();
    assert_eq!(choice.canonical, "Co-Founder & CEO");

    let changed: Vec<&str> = result.change_set.iter().map(|e| e.record.id.as_str()).collect();
    assert_eq!(changed, vec!["rec0", "rec2"]);
    assert!(result.change_set.get("rec1").is_none());
}

#[test]
fn test_tag_split_uses_first_delimiter_only() {
    assert_eq!(
        split_tags("Founder, Investor; Engineer / Lead"),
        vec!["Founder", "Investor; Engineer / Lead"]
    );
}

#[test]
fn test_migration_map_replaces_and_removes_in_order() {
    let map = MigrationMap::from_json(r#"{"Doer": "Founder", "House Owner": null}"#).unwrap();
    let migrated = map.migrate(["Doer", "House Owner", "Investor"]);
    assert_eq!(migrated.tokens, vec!["Founder", "Investor"]);
    assert_eq!(migrated.unknown, vec!["Investor"]);
}

#[test]
fn test_company_capitalization_beats_lowercase() {
    let result = canonicalize(&FieldKind::CompanyName, pairs(&["OpenAI", "openai"]));
    assert_eq!(result.group_count(), 1);
    assert_eq!(result.choices.values().next().unwrap().canonical, "OpenAI");
    assert_eq!(result.change_set.len(), 1);
    assert_eq!(result.change_set.entries()[0].record.id, "rec1");
}

#[test]
fn test_applying_change_set_twice_is_a_no_op() {
    let kinds = [FieldKind::JobTitle, FieldKind::CompanyName, FieldKind::PersonName];
    let input = pairs(&[
        "VP of Engineering",
        "vp of engineering",
        "VP  of Engineering",
        "Founder / CEO",
        "founder and ceo",
        "Founder & CEO",
        "Google",
        "google",
        "GOOGLE",
        "许润沁",
    ]);

    for kind in kinds {
        let first = canonicalize(&kind, input.clone());
        let applied = apply(&input, &first.change_set);
        let second = canonicalize(&kind, applied);
        assert!(second.change_set.is_empty(), "{} で2回目にも変更が出た", kind);
    }
}

#[test]
fn test_canonical_choice_independent_of_input_order() {
    let values = [
        "Co-Founder and CEO",
        "Co-Founder & CEO",
        "co-founder & ceo",
        "Stripe",
        "stripe",
        "STRIPE",
        "Product Manager",
        "product manager",
    ];
    let forward = pairs(&values);
    let mut reversed = forward.clone();
    reversed.reverse();
    let mut rotated = forward.clone();
    rotated.rotate_left(3);

    for kind in [FieldKind::JobTitle, FieldKind::CompanyName] {
        let expected = canonical_map(&forward, kind);
        assert_eq!(canonical_map(&reversed, kind), expected);
        assert_eq!(canonical_map(&rotated, kind), expected);
    }
}

#[test]
fn test_change_set_covers_every_variant_exactly_once() {
    let input = pairs(&["Stripe", "stripe", "Stripe", "STRIPE", "Anthropic", "", "  "]);
    let result = canonicalize(&FieldKind::CompanyName, input.clone());

    let ids: Vec<&str> = result.change_set.iter().map(|e| e.record.id.as_str()).collect();
    let unique: HashSet<&str> = ids.iter().copied().collect();
    assert_eq!(ids.len(), unique.len());

    // 正規形と異なるメンバーはすべて含まれる
    for (record, value) in &input {
        let key = value.trim().to_lowercase();
        match result.choices.get(&key) {
            Some(choice) if choice.canonical != *value => assert!(result.change_set.get(&record.id).is_some()),
            _ => assert!(result.change_set.get(&record.id).is_none()),
        }
    }
}

#[test]
fn test_groups_without_variants_produce_no_changes() {
    let result = canonicalize(&FieldKind::CompanyName, pairs(&["Anthropic", "Anthropic", "OpenAI"]));
    assert_eq!(result.group_count(), 2);
    assert_eq!(result.variant_group_count(), 0);
    assert!(result.change_set.is_empty());
}

#[test]
fn test_frequency_beats_other_rules() {
    let result = canonicalize(&FieldKind::JobTitle, pairs(&["founder and ceo", "founder and ceo", "Founder & CEO"]));
    assert_eq!(result.choices.values().next().unwrap().canonical, "founder and ceo");
}

#[test]
fn test_person_names_keep_script() {
    let result = canonicalize(&FieldKind::PersonName, pairs(&["Kelly Xu", "kelly  xu", "许润沁", "Kelly Xu"]));
    assert_eq!(result.group_count(), 2);
    assert_eq!(result.change_set.len(), 1);
    assert_eq!(result.change_set.entries()[0].to, FieldValue::Text("Kelly Xu".to_string()));
}
