//! 氏名列の整理
//!
//! 氏名（母語表記）列と別名（ローマ字表記）列の取り違え・混入を修正する。
//!
//! - ローマ字だけの氏名 → 別名列へ移動
//! - 漢字を含む別名 → 氏名列へ移動
//! - 経歴文のような長文 → 削除
//! - 末尾の役職（Founder, CEO, 企业家 など）→ 除去
//! - ローマ字名の大文字・小文字を統一

use crate::format::{capitalize, has_cjk};
use crate::policy::collapse_whitespace;
use regex::Regex;

/// 大文字のまま残す略語
const ACRONYMS: &[&str] = &["CEO", "CTO", "COO", "CPO", "CMO", "VP", "AI", "AWS"];

/// 全角カンマの後にこれがあれば役職とみなす
const TITLE_KEYWORDS: &[&str] = &[
    "founder", "ceo", "cto", "scientist", "engineer", "aws", "research", "director",
];

/// 1レコード分の修正結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRepair {
    pub primary: String,
    pub alias: String,
    pub reasons: Vec<String>,
}

/// ローマ字主体の名前か
pub fn is_latin_name(text: &str) -> bool {
    let cleaned: Vec<char> = text.chars().filter(|c| c.is_alphanumeric() || *c == '_').collect();
    if cleaned.is_empty() || has_cjk(text) {
        return false;
    }
    let latin = cleaned.iter().filter(|c| c.is_ascii_alphabetic()).count();
    latin as f64 / cleaned.len() as f64 > 0.7
}

/// 名前ではなく経歴・説明文に見えるか
pub fn looks_like_bio(text: &str) -> bool {
    lazy_static::lazy_static! {
        static ref YEAR_RE: Regex = Regex::new(r"\d{4}").unwrap();
        static ref CITATION_RE: Regex = Regex::new(r"\[\d+\]").unwrap();
    }

    if text.is_empty() {
        return false;
    }
    if text.chars().count() > 100 {
        return true;
    }
    if text.matches('.').count() > 2 || text.matches('，').count() > 2 || text.matches('。').count() > 1 {
        return true;
    }
    YEAR_RE.is_match(text) || CITATION_RE.is_match(text)
}

/// ローマ字名を整形する（経歴文なら `None`）
pub fn normalize_latin_name(name: &str) -> Option<String> {
    lazy_static::lazy_static! {
        static ref TRAILING_PUNCT_RE: Regex = Regex::new(r"[?.,;:!]+$").unwrap();
        static ref TITLE_SUFFIX_RE: Regex = Regex::new(
            r"(?i)\s+(Founder|CEO|CTO|COO|CPO|CMO|VP|President|Director|Manager|Engineer|Scientist|Professor|Entrepreneur|Research).*$"
        ).unwrap();
        static ref CJK_TITLE_SUFFIX_RE: Regex = Regex::new(r"\s+(企业家|连续创业者).*$").unwrap();
        static ref COMMA_TITLE_RE: Regex = Regex::new(
            r"(?i)[，,]\s*(Founder|CEO|CTO|Scientist|Engineer|aws|Research).*$"
        ).unwrap();
        static ref PAREN_RE: Regex = Regex::new(r"(\([^)]+\))").unwrap();
    }

    let name = collapse_whitespace(name);
    let name = TRAILING_PUNCT_RE.replace(&name, "").into_owned();

    if looks_like_bio(&name) {
        return None;
    }

    let mut stripped = name.clone();

    // 「名前，役職」形式
    if let Some((head, tail)) = stripped.split_once('，') {
        let tail = tail.trim().to_lowercase();
        if TITLE_KEYWORDS.iter().any(|k| tail.contains(k)) {
            stripped = head.trim().to_string();
        }
    }

    stripped = TITLE_SUFFIX_RE.replace(&stripped, "").into_owned();
    stripped = CJK_TITLE_SUFFIX_RE.replace(&stripped, "").into_owned();

    // 削りすぎた場合はカンマ区切りの役職だけを落とす
    if stripped.trim().chars().count() < 2 {
        stripped = COMMA_TITLE_RE.replace(&name, "").into_owned();
    }

    // "Last, First" → "First Last"
    if stripped.contains(',') && !stripped.contains('(') {
        let parts: Vec<&str> = stripped.split(',').map(str::trim).collect();
        stripped = match parts.as_slice() {
            [last, first] if !last.contains(' ') && !first.contains(' ') => format!("{} {}", first, last),
            _ => parts.join(" "),
        };
    }

    if stripped.contains('(') && stripped.contains(')') {
        let mut pieces = Vec::new();
        let mut cursor = 0;
        for m in PAREN_RE.find_iter(&stripped) {
            pieces.push(capitalize_words(&stripped[cursor..m.start()]));
            let inner = &stripped[m.start() + 1..m.end() - 1];
            if has_cjk(inner) {
                pieces.push(format!("({})", inner));
            } else {
                pieces.push(format!("({})", capitalize(inner)));
            }
            cursor = m.end();
        }
        pieces.push(capitalize_words(&stripped[cursor..]));
        return Some(collapse_whitespace(&pieces.join(" ")));
    }

    Some(capitalize_words(&stripped))
}

fn capitalize_words(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let upper = word.to_uppercase();
            if ACRONYMS.contains(&upper.as_str()) {
                upper
            } else {
                capitalize(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// 漢字名を整形する（空白統一・末尾の役職除去）
pub fn normalize_cjk_name(name: &str) -> String {
    lazy_static::lazy_static! {
        static ref TITLE_SUFFIX_RE: Regex =
            Regex::new(r"(?i)\s+(企业家|连续创业者|Co-Founder|Founder|CEO|CTO).*$").unwrap();
        static ref SLASH_SUFFIX_RE: Regex = Regex::new(r"\s+/\s+.*$").unwrap();
    }

    let name = TITLE_SUFFIX_RE.replace(name.trim(), "");
    let name = SLASH_SUFFIX_RE.replace(&name, "");
    collapse_whitespace(&name)
}

/// 氏名列と別名列を整理する
///
/// 変更がなければ `None`。
pub fn repair_name_columns(primary: &str, alias: &str) -> Option<NameRepair> {
    let primary_orig = primary.trim();
    let alias_orig = alias.trim();

    let mut primary_fixed = primary_orig.to_string();
    let mut alias_fixed = alias_orig.to_string();
    let mut reasons = Vec::new();

    // ローマ字名が氏名列にある
    if !primary_orig.is_empty() && is_latin_name(primary_orig) {
        let source = if alias_orig.is_empty() { primary_orig } else { alias_orig };
        alias_fixed = normalize_latin_name(source).unwrap_or_default();
        primary_fixed.clear();
        reasons.push(format!("ローマ字名を別名列へ移動: '{}'", primary_orig));
    }

    // 漢字名が別名列にある
    if !alias_orig.is_empty() && has_cjk(alias_orig) {
        if primary_fixed.is_empty() {
            primary_fixed = normalize_cjk_name(alias_orig);
        }
        alias_fixed.clear();
        reasons.push(format!("漢字名を氏名列へ移動: '{}'", alias_orig));
    }

    // 別名列の経歴文
    if !alias_fixed.is_empty() && looks_like_bio(&alias_fixed) {
        let preview: String = alias_fixed.chars().take(50).collect();
        alias_fixed.clear();
        reasons.push(format!("別名列の経歴文を削除: '{}...'", preview));
    }

    if !alias_fixed.is_empty() && is_latin_name(&alias_fixed) {
        match normalize_latin_name(&alias_fixed) {
            Some(normalized) if normalized != alias_fixed => {
                reasons.push(format!("表記を修正: '{}' → '{}'", alias_fixed, normalized));
                alias_fixed = normalized;
            }
            Some(_) => {}
            None => {
                alias_fixed.clear();
                reasons.push("別名列の経歴文を削除".to_string());
            }
        }
    }

    if !primary_fixed.is_empty() {
        let normalized = normalize_cjk_name(&primary_fixed);
        if normalized != primary_fixed {
            reasons.push(format!("氏名を整理: '{}' → '{}'", primary_fixed, normalized));
            primary_fixed = normalized;
        }
    }

    if !primary_fixed.is_empty() && primary_fixed == alias_fixed {
        alias_fixed.clear();
        reasons.push("別名列の重複を削除".to_string());
    }

    if primary_fixed == primary && alias_fixed == alias {
        return None;
    }

    Some(NameRepair {
        primary: primary_fixed,
        alias: alias_fixed,
        reasons,
    })
}
