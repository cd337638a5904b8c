//! Message resolution.
//!
//! [`Translator`] ties the pipeline together: key expansion and parsing, cached dictionary
//! lookup, plural form selection and placeholder expansion.

use std::collections::HashMap;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use crate::cache::{
    CacheStorage,
    DictionaryCache,
    storage_from_settings,
};
use crate::config::TranslatorSettings;
use crate::dictionary::{
    Dictionary,
    load_dictionary,
};
use crate::error::TranslateError;
use crate::key::{
    MessageInfo,
    composite_key,
};
use crate::plural::{
    PluralRules,
    select_form,
};
use crate::replacement::{
    self,
    Replacements,
};
use crate::types::{
    CountOrParams,
    Entry,
    Form,
    Params,
    Translation,
    is_grouped,
};

/// Placeholder that carries the plural count
const COUNT_PARAM: &str = "count";

/// Delimiter around literal text (`:not.a.key:`)
const LITERAL_DELIMITER: char = ':';

/// Resolves message keys of one language against a dictionary directory.
#[derive(Debug)]
pub struct Translator {
    /// Root directory of the dictionary files
    directory: PathBuf,
    /// Current language
    language: String,
    plurals: Arc<PluralRules>,
    replacements: Replacements,
    cache: DictionaryCache,
}

impl Translator {
    /// Creates a translator using the built-in plural rules.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self::with_plural_rules(directory, language, PluralRules::builtin())
    }

    /// Creates a translator using a custom plural rule table.
    #[must_use]
    pub fn with_plural_rules(
        directory: impl Into<PathBuf>,
        language: impl Into<String>,
        plurals: Arc<PluralRules>,
    ) -> Self {
        Self {
            directory: directory.into(),
            language: language.into(),
            plurals,
            replacements: Replacements::new(),
            cache: DictionaryCache::new(),
        }
    }

    /// Creates a translator from settings, building the configured cache storage.
    ///
    /// # Errors
    /// `InvalidStorage` if the cache storage cannot be built.
    pub fn from_settings(settings: &TranslatorSettings) -> Result<Self, TranslateError> {
        let mut translator = Self::new(&settings.directory, &settings.language);
        if let Some(storage) = storage_from_settings(&settings.cache)? {
            translator.set_cache_storage(storage)?;
        }
        Ok(translator)
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Switches the language. Cached dictionaries of other languages are kept.
    pub fn set_language(&mut self, language: impl Into<String>) {
        self.language = language.into();
    }

    #[must_use]
    pub fn plural_rules(&self) -> &PluralRules {
        &self.plurals
    }

    #[must_use]
    pub const fn cache(&self) -> &DictionaryCache {
        &self.cache
    }

    /// Persists the cache through `storage`.
    ///
    /// # Errors
    /// `InvalidStorage` if the backend cannot be used.
    pub fn set_cache_storage(
        &mut self,
        storage: Box<dyn CacheStorage>,
    ) -> Result<(), TranslateError> {
        self.cache.configure(storage)
    }

    /// Registers a translator-wide `%name%` value.
    pub fn add_replacement(&mut self, name: impl Into<String>, value: impl ToString) {
        self.replacements.add(name, value);
    }

    pub fn remove_replacement(&mut self, name: &str) -> Option<String> {
        self.replacements.remove(name)
    }

    /// Drops every cached dictionary. See [`crate::cache`] for what is served afterwards.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    /// Returns the dictionary of a category in the current language, loading it on a miss.
    ///
    /// A missing dictionary file yields an empty dictionary.
    ///
    /// # Errors
    /// Returns error if the dictionary file exists but cannot be loaded.
    pub fn load_category(
        &mut self,
        path: &str,
        category: &str,
    ) -> Result<&Dictionary, TranslateError> {
        let key = composite_key(&self.language, path, category);
        let directory = &self.directory;
        let language = &self.language;

        let record =
            self.cache.get_or_load(&key, || load_dictionary(directory, path, category, language))?;
        Ok(&record.data)
    }

    /// Returns the normalized entry of a message, `None` if it does not exist.
    ///
    /// # Errors
    /// `MalformedKey`, or a dictionary loading error.
    pub fn find_translation(&mut self, key: &str) -> Result<Option<Entry>, TranslateError> {
        let info = MessageInfo::parse(key)?;
        let dictionary = self.load_category(&info.path, &info.category)?;
        Ok(dictionary.get(&info.name).cloned())
    }

    /// Selects the form of `entry` matching `count` in the current language.
    ///
    /// # Errors
    /// `UnknownLanguage` or `MissingPluralForm`.
    pub fn pluralize(&self, entry: &[Form], count: u64) -> Result<Translation, TranslateError> {
        let index = self.plurals.form_index(&self.language, count)?;
        select_form(entry, index)
    }

    /// Expands placeholders using `params` and then the registered replacements.
    #[must_use]
    pub fn prepare_translation(&self, template: &str, params: &Params) -> String {
        self.replacements.expand(template, params)
    }

    /// Expands placeholders using `params` only.
    #[must_use]
    pub fn apply_replacements(&self, template: &str, params: &Params) -> String {
        replacement::apply_replacements(template, params)
    }

    /// Resolves a message.
    ///
    /// - `:text:` is returned as `text` without any lookup.
    /// - `Count(n)` selects the plural form for `n` and is available as `%count%`.
    /// - `Params(map)` provides placeholder values; a numeric `count` in it selects the plural
    ///   form of entries that have several forms.
    /// - Without a count the first form is used.
    ///
    /// Placeholders in the key are expanded before it is parsed.
    ///
    /// # Errors
    /// `MalformedKey`, `MissingPluralForm`, `UnknownLanguage` or a dictionary loading error.
    /// A message that does not exist is `Ok(None)`.
    pub fn translate(
        &mut self,
        key: &str,
        count_or_params: Option<CountOrParams>,
        params: &Params,
    ) -> Result<Option<Translation>, TranslateError> {
        if let Some(literal) = literal_text(key) {
            return Ok(Some(Translation::Text(literal.to_string())));
        }

        let (count, local) = merge_params(count_or_params, params);
        let key = self.replacements.expand(key, &local);

        let Some(entry) = self.find_translation(&key)? else {
            tracing::debug!(key = %key, language = %self.language, "Translation not found");
            return Ok(None);
        };
        if entry.is_empty() {
            tracing::debug!(key = %key, "Message has only comments, treated as untranslated");
            return Ok(None);
        }

        let translation = match count.or_else(|| implicit_count(&entry, &local)) {
            Some(count) => self.pluralize(&entry, count)?,
            None => select_form(&entry, 0)?,
        };

        Ok(Some(translation.map(|text| self.replacements.expand(&text, &local))))
    }

    /// Zips the lists `{base}.{keys_field}` and `{base}.{values_field}` into a mapping.
    ///
    /// # Errors
    /// - `TypeMismatch` if either message is missing or is not a list
    /// - `LengthMismatch` if the lists differ in length
    pub fn translate_pairs(
        &mut self,
        base: &str,
        keys_field: &str,
        values_field: &str,
    ) -> Result<HashMap<String, String>, TranslateError> {
        let keys = self.translate_list(&format!("{base}.{keys_field}"))?;
        let values = self.translate_list(&format!("{base}.{values_field}"))?;

        if keys.len() != values.len() {
            return Err(TranslateError::LengthMismatch { keys: keys.len(), values: values.len() });
        }

        Ok(keys.into_iter().zip(values).collect())
    }

    fn translate_list(&mut self, key: &str) -> Result<Vec<String>, TranslateError> {
        match self.translate(key, None, &Params::new())? {
            Some(Translation::List(items)) => Ok(items),
            _ => Err(TranslateError::TypeMismatch { key: key.to_string() }),
        }
    }
}

/// Inner text of a `:literal:` key.
fn literal_text(key: &str) -> Option<&str> {
    key.strip_prefix(LITERAL_DELIMITER)?.strip_suffix(LITERAL_DELIMITER)
}

/// Splits the call arguments into an explicit count and the local placeholder values.
///
/// A mapping passed in place of the count overrides `params`; an explicit count overrides a
/// `count` parameter.
fn merge_params(count_or_params: Option<CountOrParams>, params: &Params) -> (Option<u64>, Params) {
    let mut local = params.clone();
    match count_or_params {
        Some(CountOrParams::Count(count)) => {
            local.insert(COUNT_PARAM.to_string(), count.to_string());
            (Some(count), local)
        }
        Some(CountOrParams::Params(overrides)) => {
            local.extend(overrides);
            (None, local)
        }
        None => (None, local),
    }
}

/// Count taken from a `count` parameter, for entries that have forms to choose from.
///
/// A grouped entry qualifies only if one of its groups has several forms, so `-- list`
/// entries with one form per row are never pluralized.
fn implicit_count(entry: &[Form], params: &Params) -> Option<u64> {
    let has_choice = if is_grouped(entry) {
        entry.iter().any(|form| matches!(form, Form::Group(group) if group.len() > 1))
    } else {
        entry.len() > 1
    };
    if !has_choice {
        return None;
    }
    params.get(COUNT_PARAM)?.trim().parse().ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::cache::FileStorage;
    use crate::test_utils::{
        copy_fixtures,
        fixtures_dir,
        params,
    };

    fn translator() -> Translator {
        Translator::new(fixtures_dir(), "en")
    }

    fn text(value: &str) -> Form {
        Form::Text(value.to_string())
    }

    #[googletest::test]
    fn load_category_returns_normalized_dictionary() {
        let mut translator = translator();

        let dictionary = translator.load_category("web/pages/homepage", "simple").unwrap();

        expect_that!(dictionary.len(), eq(1));
        expect_that!(dictionary.get("title"), some(eq(&vec![text("Title of promo box")])));
    }

    #[googletest::test]
    fn load_category_of_missing_dictionary_is_empty() {
        let mut translator = translator();

        let dictionary = translator.load_category("some/unknown", "translation").unwrap();

        expect_that!(dictionary.is_empty(), eq(true));
    }

    #[googletest::test]
    fn find_translation_returns_entry() {
        let mut translator = translator();

        let entry = translator.find_translation("web.pages.homepage.promo.title").unwrap();

        expect_that!(entry, some(eq(&vec![text("Title of promo box")])));
        expect_that!(translator.find_translation("some.unknown.translation").unwrap(), none());
    }

    #[googletest::test]
    fn find_translation_rejects_malformed_key() {
        let mut translator = translator();

        let result = translator.find_translation("promo.title");

        assert!(matches!(result, Err(TranslateError::MalformedKey { .. })));
    }

    #[rstest]
    #[case(1, "1 car")]
    #[case(4, "%count% cars")]
    #[case(0, "%count% cars")]
    fn pluralize_flat_entry(#[case] count: u64, #[case] expected: &str) {
        let cars = vec![text("1 car"), text("%count% cars")];

        let result = translator().pluralize(&cars, count).unwrap();

        assert_eq!(result, Translation::from(expected));
    }

    #[rstest]
    fn pluralize_grouped_entry() {
        let translator = translator();
        let fruits = vec![
            Form::Group(vec!["1 apple".to_string(), "%count% apples".to_string()]),
            Form::Group(vec!["1 orange".to_string(), "%count% oranges".to_string()]),
        ];

        assert_eq!(
            translator.pluralize(&fruits, 1).unwrap(),
            Translation::from(vec!["1 apple", "1 orange"])
        );
        assert_eq!(
            translator.pluralize(&fruits, 4).unwrap(),
            Translation::from(vec!["%count% apples", "%count% oranges"])
        );
    }

    #[googletest::test]
    fn pluralize_unknown_language_fails() {
        let mut translator = translator();
        translator.set_language("tlh");

        let result = translator.pluralize(&[text("a")], 1);

        assert!(matches!(result, Err(TranslateError::UnknownLanguage(_))));
    }

    #[googletest::test]
    fn prepare_translation_uses_registered_replacements() {
        let mut translator = translator();
        translator.add_replacement("item", "car");

        let result = translator
            .prepare_translation("%item% has got %count% %append%.", &params(&[
                ("count", "5"),
                ("append", "things"),
            ]));

        expect_that!(result, eq("car has got 5 things."));
        expect_that!(translator.remove_replacement("item"), some(eq("car")));
    }

    #[googletest::test]
    fn apply_replacements_ignores_registered_replacements() {
        let mut translator = translator();
        translator.add_replacement("three", 3);

        let result =
            translator.apply_replacements("%one% %two% %three%", &params(&[("one", "1"), ("two", "2")]));

        expect_that!(result, eq("1 2 %three%"));
    }

    #[rstest]
    #[case(":do.not.translate.me:", "do.not.translate.me")]
    #[case("::", "")]
    fn translate_literal_text(#[case] key: &str, #[case] expected: &str) {
        let mut translator = Translator::new("/nonexistent", "en");

        let result = translator.translate(key, None, &Params::new()).unwrap();

        assert_eq!(result, Some(Translation::from(expected)));
        assert!(translator.cache().is_empty());
    }

    #[googletest::test]
    fn translate_missing_message_is_none() {
        let mut translator = translator();

        let result = translator.translate("web.pages.homepage.promo.unknown", None, &Params::new());

        expect_that!(result.unwrap(), none());
    }

    #[rstest]
    #[case(1, "1 auto")]
    #[case(3, "3 auta")]
    #[case(5, "5 aut")]
    fn translate_uses_language_plural_rule(#[case] count: u64, #[case] expected: &str) {
        let mut translator = translator();
        translator.set_language("cs");

        let result =
            translator.translate("web.pages.homepage.promo.cars", Some(count.into()), &Params::new());

        assert_eq!(result.unwrap(), Some(Translation::from(expected)));
    }

    #[rstest]
    #[case("3", "3 cars")]
    #[case("1", "1 car")]
    #[case("many", "1 car")]
    fn translate_count_parameter_selects_plural_form(
        #[case] count: &str,
        #[case] expected: &str,
    ) {
        let mut translator = translator();
        let mapping = params(&[("count", count)]);

        let result =
            translator.translate("web.pages.homepage.promo.cars", Some(mapping.into()), &Params::new());

        assert_eq!(result.unwrap(), Some(Translation::from(expected)));
    }

    #[rstest]
    #[case("3")]
    #[case("1")]
    fn translate_count_parameter_leaves_lists_whole(#[case] count: &str) {
        let mut translator = translator();
        let mapping = params(&[("count", count)]);

        let result =
            translator.translate("web.pages.homepage.promo.list", Some(mapping.into()), &Params::new());

        assert_eq!(
            result.unwrap(),
            Some(Translation::from(vec!["1st item", "2nd item", "3rd item", "4th item", "5th item"]))
        );
    }

    #[googletest::test]
    fn comment_only_messages() {
        let temp_dir = copy_fixtures();
        fs::write(
            temp_dir.path().join("web/pages/homepage/en.draft.json"),
            r##"{"todo": ["# not translated yet #"], "grp": [["# x #"], ["a"]]}"##,
        )
        .unwrap();
        let mut translator = Translator::new(temp_dir.path(), "en");

        let todo = translator.translate("web.pages.homepage.draft.todo", None, &Params::new());
        let grp = translator.translate("web.pages.homepage.draft.grp", None, &Params::new());

        expect_that!(todo.unwrap(), none());
        expect_that!(grp.unwrap(), some(eq(&Translation::from(vec!["", "a"]))));
    }

    #[googletest::test]
    fn explicit_count_wins_over_count_parameter() {
        let mut translator = translator();

        let result = translator.translate(
            "web.pages.homepage.promo.cars",
            Some(CountOrParams::Count(1)),
            &params(&[("count", "7")]),
        );

        expect_that!(result.unwrap(), some(eq(&Translation::from("1 car"))));
    }

    #[googletest::test]
    fn switching_language_keeps_other_records() {
        let mut translator = translator();
        translator.translate("web.pages.homepage.promo.title", None, &Params::new()).unwrap();
        translator.set_language("cs");

        let result = translator.translate("web.pages.homepage.promo.title", None, &Params::new());

        expect_that!(result.unwrap(), some(eq(&Translation::from("Titulek propagace"))));
        expect_that!(translator.cache().len(), eq(2));
    }

    #[googletest::test]
    fn translate_pairs_rejects_missing_list() {
        let mut translator = translator();

        let result = translator.translate_pairs("web.pages.homepage.promo", "unknown", "values");

        assert!(matches!(result, Err(TranslateError::TypeMismatch { key }) if key.ends_with("unknown")));
    }

    #[googletest::test]
    fn from_settings_builds_file_storage() {
        let temp_dir = copy_fixtures();
        let cache_dir = temp_dir.path().join("cache");
        let settings = TranslatorSettings {
            directory: temp_dir.path().to_path_buf(),
            language: "en".to_string(),
            cache: crate::config::CacheSettings {
                storage: "file".to_string(),
                path: Some(cache_dir.clone()),
            },
        };

        let mut translator = Translator::from_settings(&settings).unwrap();
        translator.translate("web.pages.homepage.simple.title", None, &Params::new()).unwrap();

        expect_that!(translator.cache().has_storage(), eq(true));
        expect_that!(FileStorage::new(&cache_dir).snapshot_path().exists(), eq(true));
    }

    #[googletest::test]
    fn from_settings_rejects_unknown_storage() {
        let settings = TranslatorSettings {
            cache: crate::config::CacheSettings { storage: "array".to_string(), path: None },
            ..TranslatorSettings::default()
        };

        let result = Translator::from_settings(&settings);

        assert!(matches!(result, Err(TranslateError::InvalidStorage(_))));
    }

    #[googletest::test]
    fn broken_dictionary_is_an_error() {
        let temp_dir = copy_fixtures();
        fs::write(temp_dir.path().join("web/pages/homepage/en.broken.json"), "[1, 2]").unwrap();
        let mut translator = Translator::new(temp_dir.path(), "en");

        let result = translator.translate("web.pages.homepage.broken.title", None, &Params::new());

        assert!(matches!(result, Err(TranslateError::Dictionary { .. })));
    }
}
