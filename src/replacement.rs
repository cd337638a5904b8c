//! `%name%` placeholder expansion.

use std::collections::HashMap;

use crate::types::Params;

/// Delimiter around placeholder names
const PLACEHOLDER_DELIMITER: char = '%';

/// Translator-wide placeholder values.
#[derive(Debug, Clone, Default)]
pub struct Replacements {
    values: HashMap<String, String>,
}

impl Replacements {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a value for `%name%`, replacing any previous one.
    pub fn add(&mut self, name: impl Into<String>, value: impl ToString) {
        self.values.insert(name.into(), value.to_string());
    }

    /// Removes the value of `%name%`, returning it.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.values.remove(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Expands placeholders, looking names up in `local` first and then in the registry.
    ///
    /// Unresolved placeholders are left as written.
    #[must_use]
    pub fn expand(&self, template: &str, local: &Params) -> String {
        expand_with(template, |name| local.get(name).map(String::as_str).or_else(|| self.get(name)))
    }
}

/// Expands placeholders using `params` only.
#[must_use]
pub fn apply_replacements(template: &str, params: &Params) -> String {
    expand_with(template, |name| params.get(name).map(String::as_str))
}

/// Single left-to-right pass; substituted values are not expanded again.
fn expand_with<'a, F>(template: &str, resolve: F) -> String
where
    F: Fn(&str) -> Option<&'a str>,
{
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some((before, after)) = rest.split_once(PLACEHOLDER_DELIMITER) {
        result.push_str(before);

        match after.split_once(PLACEHOLDER_DELIMITER) {
            Some((name, remainder)) if is_placeholder_name(name) => {
                match resolve(name) {
                    Some(value) => result.push_str(value),
                    None => {
                        // Unresolved placeholders stay whole; their closing `%` opens nothing.
                        result.push(PLACEHOLDER_DELIMITER);
                        result.push_str(name);
                        result.push(PLACEHOLDER_DELIMITER);
                    }
                }
                rest = remainder;
            }
            _ => {
                result.push(PLACEHOLDER_DELIMITER);
                rest = after;
            }
        }
    }

    result.push_str(rest);
    result
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
