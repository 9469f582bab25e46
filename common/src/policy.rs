//! フィールド種別ごとの正規化ポリシー
//!
//! | 種別 | キー生成 | タイブレーク |
//! |------|----------|--------------|
//! | 氏名 | 空白統一・小文字化（文字種はそのまま） | なし |
//! | 役職 | 空白統一・小文字化・`.`/`,`除去・`and`/`/`→`&` | 大文字始まり → `&` |
//! | 会社名 | 空白統一・小文字化 | 大文字始まり |
//! | タグ | 空白統一・小文字化 | なし |

use regex::Regex;

/// 頻度で決まらない場合の絞り込みルール
///
/// 条件を満たす候補が1つ以上あればそれだけを残す。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    /// 先頭文字が大文字
    Capitalized,
    /// 単語 `and` より `&` を使っている
    Ampersand,
}

impl TieBreak {
    pub fn accepts(&self, candidate: &str) -> bool {
        match self {
            TieBreak::Capitalized => candidate.chars().next().is_some_and(char::is_uppercase),
            TieBreak::Ampersand => candidate.contains('&'),
        }
    }
}

/// 正規化ポリシー
pub trait FieldPolicy {
    /// グループ化用のキーを生成（書き戻しには使わない）
    fn normalize_key(&self, value: &str) -> String;

    /// 頻度の次に適用するタイブレーク（優先順）
    fn tie_breaks(&self) -> &[TieBreak];
}

/// フィールド種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    PersonName,
    JobTitle,
    CompanyName,
    Tag,
}

impl FieldPolicy for FieldKind {
    fn normalize_key(&self, value: &str) -> String {
        match self {
            FieldKind::PersonName | FieldKind::CompanyName | FieldKind::Tag => fold_case(value),
            FieldKind::JobTitle => title_key(value),
        }
    }

    fn tie_breaks(&self) -> &[TieBreak] {
        match self {
            FieldKind::JobTitle => &[TieBreak::Capitalized, TieBreak::Ampersand],
            FieldKind::CompanyName => &[TieBreak::Capitalized],
            FieldKind::PersonName | FieldKind::Tag => &[],
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::PersonName => write!(f, "氏名"),
            FieldKind::JobTitle => write!(f, "役職"),
            FieldKind::CompanyName => write!(f, "会社名"),
            FieldKind::Tag => write!(f, "タグ"),
        }
    }
}

/// 前後の空白除去・連続空白の統一
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 空白統一 + 小文字化
fn fold_case(value: &str) -> String {
    collapse_whitespace(value).to_lowercase()
}

/// 役職のキー: 区切り記号の揺れを `&` に寄せる
fn title_key(value: &str) -> String {
    lazy_static::lazy_static! {
        static ref SLASH_RE: Regex = Regex::new(r"\s*/\s*").unwrap();
        static ref AND_RE: Regex = Regex::new(r"\s+and\s+").unwrap();
        static ref AMP_RE: Regex = Regex::new(r"\s*&\s*").unwrap();
    }

    let lowered = fold_case(value).replace(['.', ','], "");
    let folded = SLASH_RE.replace_all(&lowered, " & ");
    let folded = AND_RE.replace_all(&folded, " & ");
    let folded = AMP_RE.replace_all(&folded, " & ");

    collapse_whitespace(&folded)
}
