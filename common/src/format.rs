//! 役職の書式統一
//!
//! 正規形を選んだ後に任意で適用する。区切り記号を ` & ` に揃え、
//! 単語の大文字・小文字を整える。略語や中国語はそのまま残す。

use regex::Regex;

/// 小文字のまま残す前置詞・冠詞
const LOWERCASE_WORDS: &[&str] = &["of", "at", "the", "a", "an", "in", "on"];

/// CJK統合漢字を含むか
pub fn has_cjk(text: &str) -> bool {
    text.chars().any(|c| ('\u{4e00}'..='\u{9fff}').contains(&c))
}

/// 先頭を大文字、残りを小文字に
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// 役職の書式を統一する
pub fn format_title(title: &str) -> String {
    lazy_static::lazy_static! {
        static ref AND_RE: Regex = Regex::new(r"(?i)\s+and\s+").unwrap();
        static ref AMP_RE: Regex = Regex::new(r"\s*&\s*").unwrap();
        static ref SLASH_RE: Regex = Regex::new(r"\s*/\s*").unwrap();
    }

    let trimmed = title.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }

    let mut text = AND_RE.replace_all(trimmed, " & ").into_owned();
    text = AMP_RE.replace_all(&text, " & ").into_owned();

    // 中国語の役職では `/` が意味を持つことがある
    if !has_cjk(&text) {
        text = SLASH_RE.replace_all(&text, " & ").into_owned();
    }

    text.split_whitespace()
        .enumerate()
        .map(|(i, word)| format_word(i, word))
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_word(index: usize, word: &str) -> String {
    let alphabetic = word.chars().all(char::is_alphabetic);
    let char_count = word.chars().count();

    // 略語 (CEO, VP)
    if char_count >= 2 && alphabetic && word.chars().all(|c| !c.is_lowercase()) {
        return word.to_string();
    }
    // 社名など大文字混じりの語 (ByteDance)
    if char_count > 1
        && alphabetic
        && word.chars().next().is_some_and(char::is_uppercase)
        && word.chars().skip(1).any(char::is_uppercase)
    {
        return word.to_string();
    }
    if has_cjk(word) {
        return word.to_string();
    }

    let lower = word.to_lowercase();
    if let Some(rest) = lower.strip_prefix("co-") {
        return if rest.is_empty() {
            capitalize(word)
        } else {
            format!("Co-{}", capitalize(rest))
        };
    }
    if index > 0 && LOWERCASE_WORDS.contains(&lower.as_str()) {
        return lower;
    }

    capitalize(word)
}
