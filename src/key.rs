//! Message key parsing.
//!
//! `web.pages.homepage.promo.title` addresses the `title` message of the `promo`
//! category stored under `web/pages/homepage`.

use crate::error::TranslateError;

/// Separator between key segments
const KEY_SEPARATOR: char = '.';

/// Where a message lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageInfo {
    /// Directory path of the dictionary, segments joined by `/`
    pub path: String,
    /// Dictionary category (file) name
    pub category: String,
    /// Message name inside the category
    pub name: String,
}

impl MessageInfo {
    /// Splits a dotted key into path, category and name.
    ///
    /// # Errors
    /// `MalformedKey` if the key has fewer than three segments or an empty segment.
    pub fn parse(key: &str) -> Result<Self, TranslateError> {
        let malformed = || TranslateError::MalformedKey { key: key.to_string() };

        if key.split(KEY_SEPARATOR).any(str::is_empty) {
            return Err(malformed());
        }

        let mut segments = key.rsplitn(3, KEY_SEPARATOR);
        let (Some(name), Some(category), Some(path)) =
            (segments.next(), segments.next(), segments.next())
        else {
            return Err(malformed());
        };

        let info = Self {
            path: path.replace(KEY_SEPARATOR, "/"),
            category: category.to_string(),
            name: name.to_string(),
        };
        tracing::trace!(key, ?info, "Parsed message key");
        Ok(info)
    }

    /// Cache address of this message's dictionary for `language`.
    #[must_use]
    pub fn composite_key(&self, language: &str) -> String {
        composite_key(language, &self.path, &self.category)
    }
}

/// Builds the `language:path/category` cache address.
#[must_use]
pub fn composite_key(language: &str, path: &str, category: &str) -> String {
    format!("{language}:{path}/{category}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[googletest::test]
    fn parse_splits_path_category_and_name() {
        let info = MessageInfo::parse("web.pages.homepage.promo.title").unwrap();

        expect_that!(info.path, eq("web/pages/homepage"));
        expect_that!(info.category, eq("promo"));
        expect_that!(info.name, eq("title"));
    }

    #[rstest]
    #[case("web.promo.title", "web", "promo", "title")]
    #[case("a.b.c.d", "a/b", "c", "d")]
    fn parse_valid_keys(
        #[case] key: &str,
        #[case] path: &str,
        #[case] category: &str,
        #[case] name: &str,
    ) {
        let info = MessageInfo::parse(key).unwrap();
        assert_eq!(
            info,
            MessageInfo {
                path: path.to_string(),
                category: category.to_string(),
                name: name.to_string()
            }
        );
    }

    #[rstest]
    #[case("")]
    #[case("title")]
    #[case("promo.title")]
    #[case("web..title")]
    #[case("web.promo.")]
    #[case(".web.promo.title")]
    fn parse_rejects_malformed_keys(#[case] key: &str) {
        let result = MessageInfo::parse(key);
        assert!(matches!(result, Err(TranslateError::MalformedKey { .. })), "{key}: {result:?}");
    }

    #[rstest]
    fn composite_key_joins_language_path_and_category() {
        let info = MessageInfo::parse("web.pages.homepage.promo.title").unwrap();
        assert_that!(info.composite_key("en"), eq("en:web/pages/homepage/promo"));
    }
}
