//! Domain types: the persisted word record and validated language codes.

use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

/// A word stored in a language partition.
///
/// Identified by `(language, name)`. Translations only ever grow: once a
/// target language has an entry it is not replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRecord {
    pub name: String,
    pub language: String,
    #[serde(default)]
    pub definitions: Vec<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub translations: BTreeMap<String, String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

impl WordRecord {
    /// Create an empty record for `name` in the `language` partition
    pub fn new(name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
            definitions: Vec::new(),
            synonyms: Vec::new(),
            translations: BTreeMap::new(),
            examples: Vec::new(),
        }
    }

    /// Builder-style helper to attach a translation
    pub fn with_translation(mut self, target: impl Into<String>, text: impl Into<String>) -> Self {
        self.add_translation(target, text);
        self
    }

    pub fn translation_for(&self, target: &str) -> Option<&str> {
        self.translations.get(target).map(String::as_str)
    }

    /// Add a translation if the target language has none yet.
    ///
    /// Returns `true` if the entry was inserted, `false` if one already existed
    /// (the existing text is kept).
    pub fn add_translation(&mut self, target: impl Into<String>, text: impl Into<String>) -> bool {
        match self.translations.entry(target.into()) {
            Entry::Vacant(slot) => {
                slot.insert(text.into());
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Copy of this record exposing only the `target` translation.
    ///
    /// Returns `None` if the record has no translation for `target`.
    pub fn narrowed_to(&self, target: &str) -> Option<WordRecord> {
        let text = self.translations.get(target)?;

        let mut narrowed = self.clone();
        narrowed.translations = BTreeMap::from([(target.to_string(), text.clone())]);
        Some(narrowed)
    }
}

/// Error returned when a path segment is not a two-letter language code
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid language code '{0}': expected two ASCII letters")]
pub struct InvalidLanguageCode(pub String);

/// Two-letter language code naming a partition (e.g. "es", "en").
///
/// Case is preserved: "es" and "ES" are different partitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn from_code(code: &str) -> Result<Self, InvalidLanguageCode> {
        if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code.to_string()))
        } else {
            Err(InvalidLanguageCode(code.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
