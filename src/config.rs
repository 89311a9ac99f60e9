use crate::{is_word_char, Set};
use thiserror::Error;

/// Back-end used by the exact multi-pattern stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Algorithm {
    /// Prefix tree, scanned from every start position.
    #[default]
    Trie,
    /// Aho–Corasick automaton with failure links.
    Aho,
}

/// Immutable configuration snapshot held by a [`crate::Detector`].
///
/// The detector copies the configuration at construction, so a `Config`
/// value can be reused and mutated freely without affecting detectors
/// already built from it.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    pub masking: MaskingOptions,
    pub detection: DetectionOptions,
    pub languages: LanguageOptions,
}

/// How [`crate::Detector::sanitize`] redacts matched spans.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MaskingOptions {
    /// Master switch; when off, `sanitize` returns the input unchanged.
    pub enabled: bool,
    /// Substituted for each masked code point.
    pub pattern_char: char,
    /// Mask code point for code point instead of collapsing the span.
    pub preserve_length: bool,
    /// Keep the first code point of each masked span.
    pub preserve_first: bool,
    /// Keep the last code point of each masked span.
    pub preserve_last: bool,
}

impl Default for MaskingOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            pattern_char: '*',
            preserve_length: true,
            preserve_first: true,
            preserve_last: false,
        }
    }
}

/// Knobs of the matching pipeline.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DetectionOptions {
    /// Edit-distance budget for the approximate fallback; zero disables it.
    pub max_edit_distance: usize,
    pub case_sensitive: bool,
    /// Reject spans whose neighbors are letters, digits, or underscores.
    pub whole_words_only: bool,
    /// Extra words added to the fallback language at construction.
    pub custom_words: Vec<String>,
    /// Map look-alikes (`$` → `s`, `1` → `i`, …) before matching.
    pub confusable_mapping: bool,
    /// Code points the exact matchers skip, e.g. `s.h.i.t`.
    pub ignore_separators: Set<char>,
    pub strip_diacritics: bool,
    /// Whole-string NFKC before scanning; only honored when
    /// `length_preserving` is off.
    pub use_compat_form: bool,
    /// Normalize one code point to exactly one code point, keeping match
    /// spans valid in raw-input coordinates.
    pub length_preserving: bool,
    /// Substitute away zero-width and other invisible characters.
    pub strip_invisible: bool,
    /// Also match `word+suffix` for each inflection suffix.
    pub enable_inflections: bool,
    pub inflection_suffixes: Vec<String>,
    /// Words never reported, compared in normalized form.
    pub allowlist: Set<String>,
    /// Approximate scan only starts at token boundaries.
    pub token_bounded_fuzzy: bool,
    /// Tokens the phrase matcher may consume without advancing.
    pub phrase_stopwords: Set<String>,
    /// Stop-word skips allowed per phrase attempt.
    pub phrase_max_skips: usize,
    pub algorithm: Algorithm,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            max_edit_distance: 1,
            case_sensitive: false,
            whole_words_only: false,
            custom_words: Vec::new(),
            confusable_mapping: true,
            ignore_separators: [' ', '.', '-', '_', '*'].into_iter().collect(),
            strip_diacritics: true,
            use_compat_form: false,
            length_preserving: true,
            strip_invisible: true,
            enable_inflections: true,
            inflection_suffixes: ["s", "es", "ed", "ing", "er", "ers"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            allowlist: Set::default(),
            token_bounded_fuzzy: true,
            phrase_stopwords: ["of", "the", "a", "an", "and", "to"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            phrase_max_skips: 2,
            algorithm: Algorithm::Trie,
        }
    }
}

/// Which language dictionaries are consulted, and in what order.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LanguageOptions {
    /// Active codes; priority equals list order.
    pub enabled: Vec<String>,
    /// Use script-range heuristics to pick candidate languages per input.
    pub auto_detect: bool,
    /// Code receiving custom words and `add_word` calls without a code.
    pub fallback: String,
}

impl Default for LanguageOptions {
    fn default() -> Self {
        Self {
            enabled: vec!["en".to_owned()],
            auto_detect: false,
            fallback: "en".to_owned(),
        }
    }
}

/// Rejected configurations. Everything else is best-effort: detection never
/// fails on arbitrary Unicode input.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A separator that is also a word character would swallow real letters.
    #[error("ignored separator {0:?} is a word character")]
    SeparatorIsWordChar(char),
    /// A letter mask would let sanitized output re-match the dictionary.
    #[error("masking pattern character {0:?} is a word character")]
    PatternIsWordChar(char),
    #[error("inflection suffixes may not be empty")]
    EmptySuffix,
    #[error("fallback language code may not be empty")]
    EmptyFallback,
}

impl Config {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if let Some(&sep) = self
            .detection
            .ignore_separators
            .iter()
            .find(|&&sep| is_word_char(sep))
        {
            return Err(ConfigError::SeparatorIsWordChar(sep));
        }
        if is_word_char(self.masking.pattern_char) {
            return Err(ConfigError::PatternIsWordChar(self.masking.pattern_char));
        }
        if self.detection.inflection_suffixes.iter().any(String::is_empty) {
            return Err(ConfigError::EmptySuffix);
        }
        if self.languages.fallback.is_empty() {
            return Err(ConfigError::EmptyFallback);
        }
        Ok(())
    }
}
