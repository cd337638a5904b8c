//! dictionary-translator
//!
//! Resolves dotted message keys into localized text from per-category JSON dictionaries,
//! with plural form selection, `%name%` placeholders and a version-aware dictionary cache.
//!
//! ```no_run
//! use dictionary_translator::{
//!     Translator,
//!     types::Params,
//! };
//!
//! let mut translator = Translator::new("translations", "en");
//! let title = translator.translate("web.pages.homepage.promo.title", None, &Params::new())?;
//! # Ok::<(), dictionary_translator::TranslateError>(())
//! ```

pub mod cache;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod indexer;
pub mod key;
pub mod plural;
pub mod replacement;
pub mod translator;
pub mod types;

mod test_utils;

pub use error::TranslateError;
pub use translator::Translator;
