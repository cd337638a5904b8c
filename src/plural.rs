//! Plural form selection.
//!
//! A plural rule maps a count to the index of the form to use. Rules follow the gettext
//! `Plural-Forms` families; the built-in table is shared by every translator.

use std::collections::HashMap;
use std::sync::{
    Arc,
    LazyLock,
};

use crate::error::TranslateError;
use crate::types::{
    Form,
    Translation,
    is_grouped,
};

/// Maps a count to a form index.
pub type PluralRule = fn(u64) -> usize;

/// Languages with a single form
fn one_form(_n: u64) -> usize {
    0
}

/// `n != 1`
fn one_other(n: u64) -> usize {
    usize::from(n != 1)
}

/// `n > 1`: zero takes the singular
fn zero_one_other(n: u64) -> usize {
    usize::from(n > 1)
}

fn east_slavic(n: u64) -> usize {
    if n % 10 == 1 && n % 100 != 11 {
        0
    } else if (2..=4).contains(&(n % 10)) && !(12..=14).contains(&(n % 100)) {
        1
    } else {
        2
    }
}

fn czech(n: u64) -> usize {
    match n {
        1 => 0,
        2..=4 => 1,
        _ => 2,
    }
}

fn polish(n: u64) -> usize {
    if n == 1 {
        0
    } else if (2..=4).contains(&(n % 10)) && !(12..=14).contains(&(n % 100)) {
        1
    } else {
        2
    }
}

fn lithuanian(n: u64) -> usize {
    if n % 10 == 1 && n % 100 != 11 {
        0
    } else if n % 10 >= 2 && !(10..20).contains(&(n % 100)) {
        1
    } else {
        2
    }
}

fn latvian(n: u64) -> usize {
    if n % 10 == 1 && n % 100 != 11 {
        0
    } else if n != 0 {
        1
    } else {
        2
    }
}

fn romanian(n: u64) -> usize {
    if n == 1 {
        0
    } else if n == 0 || (1..20).contains(&(n % 100)) {
        1
    } else {
        2
    }
}

fn slovenian(n: u64) -> usize {
    match n % 100 {
        1 => 0,
        2 => 1,
        3 | 4 => 2,
        _ => 3,
    }
}

fn irish(n: u64) -> usize {
    match n {
        1 => 0,
        2 => 1,
        0 | 3..=6 => 2,
        7..=10 => 3,
        _ => 4,
    }
}

fn welsh(n: u64) -> usize {
    match n {
        1 => 0,
        2 => 1,
        8 | 11 => 3,
        _ => 2,
    }
}

fn arabic(n: u64) -> usize {
    match (n, n % 100) {
        (0, _) => 0,
        (1, _) => 1,
        (2, _) => 2,
        (_, 3..=10) => 3,
        (_, 11..=99) => 4,
        _ => 5,
    }
}

fn icelandic(n: u64) -> usize {
    usize::from(n % 10 != 1 || n % 100 == 11)
}

fn macedonian(n: u64) -> usize {
    usize::from(!(n % 10 == 1 && n % 100 != 11))
}

fn maltese(n: u64) -> usize {
    if n == 1 {
        0
    } else if n == 0 || (2..=10).contains(&(n % 100)) {
        1
    } else if (11..=19).contains(&(n % 100)) {
        2
    } else {
        3
    }
}

/// Built-in rules, keyed by normalized language code
static BUILTIN: LazyLock<Arc<PluralRules>> = LazyLock::new(|| {
    let mut rules = PluralRules::new();
    rules.insert_all(
        &[
            "ay", "bo", "dz", "fa", "id", "ja", "jbo", "ka", "kk", "km", "ko", "ky", "lo", "ms",
            "my", "su", "th", "tt", "ug", "vi", "wo", "zh",
        ],
        one_form,
    );
    rules.insert_all(
        &[
            "af", "an", "ast", "az", "bg", "bn", "ca", "da", "de", "el", "en", "eo", "es", "et",
            "eu", "fi", "fo", "fur", "fy", "gl", "gu", "ha", "he", "hi", "hu", "hy", "ia", "it",
            "kn", "ku", "lb", "ml", "mn", "mr", "nah", "nap", "nb", "ne", "nl", "nn", "no", "nso",
            "or", "pa", "pap", "pms", "ps", "pt", "rm", "sco", "se", "si", "so", "son", "sq", "sv",
            "sw", "ta", "te", "tk", "ur", "yo",
        ],
        one_other,
    );
    rules.insert_all(
        &[
            "ach", "ak", "am", "arn", "br", "fil", "fr", "gun", "ln", "mfe", "mg", "mi", "oc",
            "pt_br", "tg", "ti", "tr", "uz", "wa",
        ],
        zero_one_other,
    );
    rules.insert_all(&["be", "bs", "hr", "ru", "sr", "uk"], east_slavic);
    rules.insert_all(&["cs", "sk"], czech);
    rules.insert_all(&["pl"], polish);
    rules.insert_all(&["lt"], lithuanian);
    rules.insert_all(&["lv"], latvian);
    rules.insert_all(&["ro"], romanian);
    rules.insert_all(&["sl"], slovenian);
    rules.insert_all(&["ga"], irish);
    rules.insert_all(&["cy"], welsh);
    rules.insert_all(&["ar"], arabic);
    rules.insert_all(&["is"], icelandic);
    rules.insert_all(&["mk"], macedonian);
    rules.insert_all(&["mt"], maltese);
    Arc::new(rules)
});

/// Normalize language code (lowercase and replace - with _)
fn normalize_language_code(code: &str) -> String {
    code.to_lowercase().replace('-', "_")
}

/// Plural rules by language.
#[derive(Debug, Clone, Default)]
pub struct PluralRules {
    rules: HashMap<String, PluralRule>,
}

impl PluralRules {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide built-in table.
    #[must_use]
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    /// Registers (or replaces) the rule of a language.
    pub fn insert(&mut self, language: &str, rule: PluralRule) {
        self.rules.insert(normalize_language_code(language), rule);
    }

    /// Registers one rule for several languages.
    pub fn insert_all(&mut self, languages: &[&str], rule: PluralRule) {
        for language in languages {
            self.insert(language, rule);
        }
    }

    /// Builder form of [`PluralRules::insert`].
    #[must_use]
    pub fn with_rule(mut self, language: &str, rule: PluralRule) -> Self {
        self.insert(language, rule);
        self
    }

    /// Finds the rule of a language, falling back from a region tag to its base language.
    ///
    /// `pt-BR` uses its own rule, `en-US` falls back to `en`.
    #[must_use]
    pub fn rule_for(&self, language: &str) -> Option<PluralRule> {
        let code = normalize_language_code(language);
        if let Some(rule) = self.rules.get(&code) {
            return Some(*rule);
        }
        let base = code.split('_').next()?;
        self.rules.get(base).copied()
    }

    #[must_use]
    pub fn contains(&self, language: &str) -> bool {
        self.rule_for(language).is_some()
    }

    /// Computes the form index for `count`.
    ///
    /// # Errors
    /// `UnknownLanguage` if no rule applies to the language.
    pub fn form_index(&self, language: &str, count: u64) -> Result<usize, TranslateError> {
        let rule =
            self.rule_for(language).ok_or_else(|| TranslateError::UnknownLanguage(language.into()))?;
        Ok(rule(count))
    }
}

/// Selects the form at `index`.
///
/// Flat entries yield the string at that index. Grouped entries yield the string at that index
/// of every group, in group order; a plain string inside a grouped entry counts as a
/// one-element group. A group left empty by comment stripping yields an empty string.
///
/// # Errors
/// `MissingPluralForm` if the entry (or one of its groups) has no form at `index`.
pub fn select_form(entry: &[Form], index: usize) -> Result<Translation, TranslateError> {
    if !is_grouped(entry) {
        return match entry.get(index) {
            Some(Form::Text(text)) => Ok(Translation::Text(text.clone())),
            _ => Err(TranslateError::MissingPluralForm { index, available: entry.len() }),
        };
    }

    entry
        .iter()
        .map(|form| {
            let forms = match form {
                Form::Text(text) => std::slice::from_ref(text),
                Form::Group(group) => group.as_slice(),
            };
            if forms.is_empty() {
                return Ok(String::new());
            }
            forms
                .get(index)
                .cloned()
                .ok_or(TranslateError::MissingPluralForm { index, available: forms.len() })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Translation::List)
}
