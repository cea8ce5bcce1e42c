//! Text normalization and trigger phrase matching.
//!
//! Prompts are NFC-normalized and case-folded but otherwise left alone:
//! whitespace and punctuation stay in place. Trigger phrases are additionally
//! trimmed and single-spaced. A phrase matches at word boundaries, where a
//! word character is alphanumeric or `_`. The phrase may be followed by a
//! plural `s`, or by `es` when it ends in a sibilant (`class` -> `classes`).

use unicode_normalization::UnicodeNormalization;

const SIBILANT_ENDINGS: [&str; 5] = ["s", "x", "z", "ch", "sh"];

/// NFC followed by lower-casing, with the common full case folds that
/// `to_lowercase` alone leaves distinct.
fn fold_case(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.nfc() {
        match c {
            'ß' | 'ẞ' => folded.push_str("ss"),
            'İ' => folded.push('i'),
            'ς' => folded.push('σ'),
            'ſ' => folded.push('s'),
            _ => folded.extend(c.to_lowercase()),
        }
    }
    folded
}

/// Normalize a prompt for matching.
pub fn normalize_prompt(prompt: &str) -> String {
    fold_case(prompt)
}

/// Normalize a trigger phrase for matching.
pub fn normalize_phrase(phrase: &str) -> String {
    fold_case(phrase)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn plural_suffixes(phrase: &str) -> &'static [&'static str] {
    if SIBILANT_ENDINGS.iter().any(|ending| phrase.ends_with(ending)) {
        &["s", "es"]
    } else {
        &["s"]
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn closes_word(rest: &str) -> bool {
    rest.chars().next().map_or(true, |c| !is_word_char(c))
}

fn opens_word(before: &str) -> bool {
    before.chars().next_back().map_or(true, |c| !is_word_char(c))
}

/// Whether a normalized phrase occurs in normalized text at word boundaries.
///
/// Every occurrence is considered, including overlapping ones, so an early
/// rejected occurrence ("reactor") never hides a later valid one ("react").
pub fn phrase_occurs(text: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }

    let suffixes = plural_suffixes(phrase);
    let mut from = 0;
    while let Some(offset) = text[from..].find(phrase) {
        let start = from + offset;
        let end = start + phrase.len();

        if opens_word(&text[..start]) {
            let rest = &text[end..];
            if closes_word(rest)
                || suffixes
                    .iter()
                    .filter_map(|suffix| rest.strip_prefix(suffix))
                    .any(closes_word)
            {
                return true;
            }
        }

        // Advance by one char so overlapping occurrences are still visited.
        let step = text[start..].chars().next().map_or(1, char::len_utf8);
        from = start + step;
    }
    false
}
