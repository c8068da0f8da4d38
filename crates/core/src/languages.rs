//! Splits the language catalog by presence in the current result page.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::codec::ANY_SENTINEL;
use crate::types::{LanguageEntry, RawMovie};

/// Code the catalog uses for "no linguistic content".
const NO_LANGUAGE_CODE: &str = "xx";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LanguagePartition {
    pub available_now: Vec<LanguageEntry>,
    pub others: Vec<LanguageEntry>,
}

/// Entries whose code matches the original language of at least one item
/// go to `available_now`, the rest to `others`. Both sides are sorted by
/// name. The `Any` sentinel and blank codes are dropped.
pub fn partition(languages: &[LanguageEntry], items: &[RawMovie]) -> LanguagePartition {
    let present: HashSet<String> = items
        .iter()
        .filter_map(|m| m.original_language.as_deref())
        .map(|code| code.trim().to_ascii_lowercase())
        .filter(|code| !code.is_empty())
        .collect();

    let (mut available_now, mut others): (Vec<_>, Vec<_>) = languages
        .iter()
        .filter(|l| !l.code.trim().is_empty() && !l.code.eq_ignore_ascii_case(ANY_SENTINEL))
        .cloned()
        .partition(|l| present.contains(&l.code.trim().to_ascii_lowercase()));

    sort_by_name(&mut available_now);
    sort_by_name(&mut others);

    LanguagePartition {
        available_now,
        others,
    }
}

fn sort_by_name(entries: &mut [LanguageEntry]) {
    entries.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.code.cmp(&b.code))
    });
}

/// One entry of the catalog's language configuration payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawLanguage {
    pub iso_639_1: Option<String>,
    pub english_name: Option<String>,
    pub name: Option<String>,
}

/// Cleans the catalog's language list into sorted [`LanguageEntry`] values.
pub fn normalize_languages(raw: &[RawLanguage]) -> Vec<LanguageEntry> {
    let mut seen = HashSet::new();
    let mut entries: Vec<LanguageEntry> = raw
        .iter()
        .filter_map(|l| {
            let code = l.iso_639_1.as_deref()?.trim().to_ascii_lowercase();
            if code.is_empty() || code == NO_LANGUAGE_CODE || !seen.insert(code.clone()) {
                return None;
            }
            let name = [&l.english_name, &l.name]
                .into_iter()
                .flatten()
                .map(|n| n.trim())
                .find(|n| !n.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| code.to_ascii_uppercase());
            Some(LanguageEntry { code, name })
        })
        .collect();
    sort_by_name(&mut entries);
    entries
}

/// Used when the catalog cannot provide its language list.
pub fn fallback_languages() -> Vec<LanguageEntry> {
    let mut entries: Vec<LanguageEntry> = [
        ("en", "English"),
        ("es", "Spanish"),
        ("fr", "French"),
        ("de", "German"),
        ("hi", "Hindi"),
        ("ja", "Japanese"),
        ("ko", "Korean"),
        ("zh", "Chinese"),
        ("it", "Italian"),
        ("pt", "Portuguese"),
        ("ru", "Russian"),
    ]
    .into_iter()
    .map(|(code, name)| LanguageEntry {
        code: code.to_string(),
        name: name.to_string(),
    })
    .collect();
    sort_by_name(&mut entries);
    entries
}
