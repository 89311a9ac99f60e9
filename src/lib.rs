pub(crate) mod aho;
pub(crate) mod config;
pub(crate) mod confusables;
pub(crate) mod detect;
pub(crate) mod fuzzy;
pub(crate) mod lang;
pub(crate) mod matcher;
pub(crate) mod mtch;
pub(crate) mod normalize;
pub(crate) mod phrase;
pub(crate) mod script;
pub(crate) mod trie;

pub use config::{
    Algorithm, Config, ConfigError, DetectionOptions, LanguageOptions, MaskingOptions,
};
pub use detect::{Detector, ProfaneStr};
pub use lang::{BuiltinPack, Pack};
pub use mtch::{Detection, Match};

// Facilitate experimentation with different hash collections.
pub(crate) type Map<K, V> = rustc_hash::FxHashMap<K, V>;

pub(crate) type Set<V> = rustc_hash::FxHashSet<V>;

/// Returns true iff the character is a word character: a Unicode letter, a
/// Unicode number, or an underscore.
///
/// Whole-word boundaries, tokenization, and the token-bounded fuzzy scan all
/// share this definition.
pub fn is_word_char(c: char) -> bool {
    use finl_unicode::categories::CharacterCategories;

    c == '_' || c.is_letter() || c.is_number()
}


doc_comment::doctest!("../README.md");
