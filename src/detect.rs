use crate::config::{Algorithm, Config, ConfigError};
use crate::fuzzy::{self, FuzzyParams};
use crate::lang::{BuiltinPack, Pack, Registry};
use crate::mtch::{Detection, Match};
use crate::normalize::{self, NormalizeOptions};
use crate::phrase::{self, PhraseTrie};
use crate::script;
use crate::Set;
use tracing::debug;

/// Detector is a configurable multi-language profanity filter.
///
/// `detect` and `sanitize` take `&self` and never touch internal state, so a
/// detector behind a shared reference can serve any number of threads.
/// Mutators rebuild the affected matchers before returning; a matcher is
/// replaced wholesale, never observable half-built.
pub struct Detector {
    config: Config,
    registry: Registry,
    /// Canonical (normalized, space-joined) phrases.
    phrases: Set<String>,
    phrase_trie: PhraseTrie,
    /// Allowlist entries in normalized form.
    allow: Set<String>,
    pack: Box<dyn Pack>,
}

impl Default for Detector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector {
    /// A detector over the built-in packs with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default()).expect("default configuration is valid")
    }

    /// A detector over the built-in packs.
    pub fn with_config(config: Config) -> Result<Self, ConfigError> {
        Self::with_pack(config, Box::new(BuiltinPack))
    }

    /// A detector over a caller-supplied pack table.
    pub fn with_pack(config: Config, pack: Box<dyn Pack>) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut detector = Self {
            config,
            registry: Registry::new(),
            phrases: Set::default(),
            phrase_trie: PhraseTrie::default(),
            allow: Set::default(),
            pack,
        };

        let enabled = detector.config.languages.enabled.clone();
        detector
            .registry
            .load(enabled.iter().map(String::as_str), &*detector.pack, &detector.config.detection);

        let nopts = NormalizeOptions::of(&detector.config.detection);
        detector.allow = detector
            .config
            .detection
            .allowlist
            .iter()
            .map(|word| normalize::normalize_pattern(word, &nopts))
            .collect();

        for word in detector.config.detection.custom_words.clone() {
            detector.add_word(&word, None);
        }

        detector.ensure_auto_detect_coverage();
        Ok(detector)
    }

    /// With auto-detection on and nothing loaded, every pack code is loaded
    /// eagerly here so `detect` can stay read-only.
    fn ensure_auto_detect_coverage(&mut self) {
        if self.config.languages.auto_detect && !self.registry.any_loaded() {
            let codes = self.pack.codes().to_vec();
            self.registry
                .load(codes.iter().copied(), &*self.pack, &self.config.detection);
        }
    }

    /// Runs the matching pipeline: exact per-language search, then phrases,
    /// then the approximate fallback. Spans are code-point positions in the
    /// normalized text, identical to input positions under the default
    /// length-preserving normalization.
    pub fn detect(&self, text: &str) -> Detection {
        let d = &self.config.detection;
        let chars = normalize::normalize(text, &NormalizeOptions::of(d));
        let candidates = self.candidate_languages(text);

        let mut matches: Vec<Match> = Vec::new();

        // Exact stage. The first language with matches wins; priority is
        // candidate order.
        for code in &candidates {
            let Some(entry) = self.registry.get(code) else {
                continue;
            };
            let found: Vec<Match> = entry
                .matcher
                .find_all(&chars, d.whole_words_only, &d.ignore_separators)
                .into_iter()
                .filter(|m| !self.allow.contains(&m.word))
                .map(|m| Match {
                    length: m.end - m.start + 1,
                    word: m.word,
                    start: m.start,
                    language: code.clone(),
                })
                .collect();
            if !found.is_empty() {
                matches = found;
                break;
            }
        }

        // Phrase stage.
        if matches.is_empty() && !self.phrases.is_empty() {
            let tokens = phrase::tokenize(&chars);
            for hit in self
                .phrase_trie
                .find_all(&tokens, &d.phrase_stopwords, d.phrase_max_skips)
            {
                if self.allow.contains(&hit.phrase) {
                    continue;
                }
                let start = tokens[hit.start_token].start;
                let end = tokens[hit.end_token].end;
                matches.push(Match {
                    word: hit.phrase,
                    start,
                    length: end - start,
                    language: self.config.languages.fallback.clone(),
                });
            }
        }

        // Approximate stage: first positive word per language, first
        // language with a hit.
        if matches.is_empty() && d.max_edit_distance > 0 {
            let params = FuzzyParams {
                max_edit_distance: d.max_edit_distance,
                token_bounded: d.token_bounded_fuzzy,
                whole_words_only: d.whole_words_only,
            };
            'languages: for code in &candidates {
                let Some(entry) = self.registry.get(code) else {
                    continue;
                };
                for word in &entry.words {
                    if self.allow.contains(word) {
                        continue;
                    }
                    let word_chars: Vec<char> = word.chars().collect();
                    if let Some((start, length)) = fuzzy::find_word(&chars, &word_chars, &params) {
                        matches.push(Match {
                            word: word.clone(),
                            start,
                            length,
                            language: code.clone(),
                        });
                        break 'languages;
                    }
                }
            }
        }

        Detection {
            has_profanity: !matches.is_empty(),
            matches,
        }
    }

    /// A masked rendition of the input. Non-overlapping spans are masked in
    /// ascending order; a span overlapping an already-masked region is
    /// skipped.
    pub fn sanitize(&self, text: &str) -> String {
        let detection = self.detect(text);
        if !self.config.masking.enabled || detection.matches.is_empty() {
            return text.to_owned();
        }

        // Length-preserving normalization keeps spans aligned with the raw
        // input. Without it, spans only address the normalized text, so
        // that is what gets masked.
        let mut chars: Vec<char> = if self.config.detection.length_preserving {
            text.chars().collect()
        } else {
            normalize::normalize(text, &NormalizeOptions::of(&self.config.detection))
        };

        let mut spans: Vec<(usize, usize)> = detection
            .matches
            .iter()
            .map(|m| (m.start, m.length))
            .collect();
        spans.sort_unstable();

        let mut masked_until = 0;
        for (start, length) in spans {
            if length == 0 || start < masked_until || start >= chars.len() {
                continue;
            }
            let end = (start + length).min(chars.len());
            self.mask_span(&mut chars[start..end]);
            masked_until = end;
        }
        chars.into_iter().collect()
    }

    fn mask_span(&self, span: &mut [char]) {
        let m = &self.config.masking;
        if !m.preserve_length {
            span.fill(m.pattern_char);
            return;
        }
        let last = span.len() - 1;
        for (i, c) in span.iter_mut().enumerate() {
            let keep = (m.preserve_first && i == 0) || (m.preserve_last && i == last);
            if !keep {
                *c = m.pattern_char;
            }
        }
    }

    /// Candidate languages for one input, in priority order.
    fn candidate_languages(&self, text: &str) -> Vec<String> {
        let languages = &self.config.languages;
        if !languages.auto_detect {
            return languages.enabled.clone();
        }
        let likely = script::likely_languages(text);
        let candidates: Vec<String> = likely
            .iter()
            .filter(|code| self.registry.is_loaded(code))
            .map(|code| (*code).to_owned())
            .collect();
        if !candidates.is_empty() {
            return candidates;
        }
        if self.registry.any_loaded() {
            return self.registry.loaded_in_priority_order();
        }
        languages.enabled.clone()
    }

    /// Loads packs for the given codes and marks them active. Unknown codes
    /// produce empty entries, silently.
    pub fn load_languages<'a, I>(&mut self, codes: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.registry
            .load(codes, &*self.pack, &self.config.detection);
    }

    /// Replaces the active language list (and optionally the fallback),
    /// loading packs for any code not yet present.
    pub fn set_languages<'a, I>(&mut self, codes: I, fallback: Option<&str>)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let codes: Vec<String> = codes.into_iter().map(str::to_owned).collect();
        if let Some(fallback) = fallback {
            self.config.languages.fallback = fallback.to_owned();
        }
        self.registry.set_active(
            codes.iter().map(String::as_str),
            &*self.pack,
            &self.config.detection,
        );
        self.config.languages.enabled = codes;
        self.ensure_auto_detect_coverage();
        debug!(languages = ?self.config.languages.enabled, "active languages replaced");
    }

    /// Switches the exact-search back-end and rebuilds every loaded
    /// language; the previous back-end's matchers are dropped.
    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        self.config.detection.algorithm = algorithm;
        self.registry.rebuild_all(&self.config.detection);
        debug!(?algorithm, "exact matcher back-end switched");
    }

    /// Adds a word to the given language (the fallback language when no
    /// code is given) and rebuilds that language's matcher.
    pub fn add_word(&mut self, word: &str, code: Option<&str>) {
        let code = code.unwrap_or(&self.config.languages.fallback).to_owned();
        self.registry.add_word(word, &code, &self.config.detection);
    }

    /// Removes a word from the given language (the fallback language when
    /// no code is given) and rebuilds that language's matcher.
    pub fn remove_word(&mut self, word: &str, code: Option<&str>) {
        let code = code.unwrap_or(&self.config.languages.fallback).to_owned();
        self.registry.remove_word(word, &code, &self.config.detection);
    }

    /// Registers a multi-word phrase and rebuilds the phrase tree.
    pub fn add_phrase(&mut self, phrase: &str) {
        let tokens = self.phrase_tokens(phrase);
        if tokens.is_empty() {
            return;
        }
        if self.phrases.insert(tokens.join(" ")) {
            self.rebuild_phrases();
        }
    }

    /// Unregisters a phrase and rebuilds the phrase tree.
    pub fn remove_phrase(&mut self, phrase: &str) {
        let tokens = self.phrase_tokens(phrase);
        if self.phrases.remove(&tokens.join(" ")) {
            self.rebuild_phrases();
        }
    }

    fn phrase_tokens(&self, phrase: &str) -> Vec<String> {
        let opts = NormalizeOptions::of(&self.config.detection);
        let normalized = normalize::normalize_pattern(phrase, &opts);
        let chars: Vec<char> = normalized.chars().collect();
        phrase::tokenize(&chars)
            .into_iter()
            .map(|token| token.text)
            .collect()
    }

    fn rebuild_phrases(&mut self) {
        let mut trie = PhraseTrie::default();
        for canonical in &self.phrases {
            let tokens: Vec<String> = canonical.split(' ').map(str::to_owned).collect();
            trie.insert(&tokens, canonical);
        }
        self.phrase_trie = trie;
        debug!(phrases = self.phrases.len(), "phrase tree rebuilt");
    }
}

/// ProfaneStr makes it easy to screen a `&str` inline under the default
/// configuration.
pub trait ProfaneStr: Sized {
    /// Returns `true` if the text contains profanity.
    fn is_profane(self) -> bool;

    /// The output is a newly allocated, masked string.
    fn sanitized(self) -> String;
}

impl ProfaneStr for &str {
    fn is_profane(self) -> bool {
        Detector::new().detect(self).has_profanity
    }

    fn sanitized(self) -> String {
        Detector::new().sanitize(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mtch::Match;

    fn detector() -> Detector {
        Detector::new()
    }

    fn spans(detection: &Detection) -> Vec<(usize, usize)> {
        detection.matches.iter().map(|m| (m.start, m.length)).collect()
    }

    #[test]
    fn plain_profanity_is_found() {
        let detection = detector().detect("you are a bitch");
        assert!(detection.has_profanity);
        assert_eq!(spans(&detection), vec![(10, 5)]);
        assert_eq!(detection.matches[0].word, "bitch");
        assert_eq!(detection.matches[0].language, "en");
    }

    #[test]
    fn clean_text_is_clean() {
        let detection = detector().detect("what a lovely morning");
        assert!(!detection.has_profanity);
        assert!(detection.matches.is_empty());
    }

    #[test]
    fn default_masking_preserves_first_and_length() {
        assert_eq!(detector().sanitize("shit happens"), "s*** happens");
    }

    #[test]
    fn confusables_match_at_original_offsets() {
        let detection = detector().detect("sh1t happens");
        assert_eq!(spans(&detection), vec![(0, 4)]);
    }

    #[test]
    fn separators_are_skipped_and_span_covers_them() {
        let detection = detector().detect("s*h-i t happens");
        assert_eq!(spans(&detection), vec![(0, 7)]);
        assert_eq!(detection.matches[0].word, "shit");
    }

    #[test]
    fn invisibles_do_not_hide_profanity() {
        let detection = detector().detect("s\u{200B}h\u{200D}i\u{FEFF}t");
        assert!(detection.has_profanity);
        assert_eq!(detection.matches[0].word, "shit");
        assert_eq!(detection.matches[0].start, 0);
    }

    #[test]
    fn phrase_with_stopword_skips() {
        // Phrase tokens outside the dictionary, so the phrase stage itself
        // produces the match.
        let mut detector = detector();
        detector.add_phrase("load of garbage");
        let text = "what a load of the a   garbage indeed";
        let detection = detector.detect(text);
        assert!(detection.has_profanity);
        let m = &detection.matches[0];
        assert_eq!(m.word, "load of garbage");
        // The span runs from "load" through "garbage".
        let covered: String = text.chars().skip(m.start).take(m.length).collect();
        assert_eq!(covered, "load of the a   garbage");
    }

    #[test]
    fn phrase_whose_last_word_is_profane() {
        // "bitch" is a dictionary word, so the exact stage claims it before
        // the phrase stage is consulted.
        let mut detector = detector();
        detector.add_phrase("son of a bitch");
        let detection = detector.detect("you are a son of the a   bitch indeed");
        assert!(detection.has_profanity);
        assert_eq!(detection.matches[0].word, "bitch");
    }

    #[test]
    fn fuzzy_fallback_finds_near_miss() {
        let detection = detector().detect("what a bastsrd");
        assert!(detection.has_profanity);
        assert_eq!(detection.matches.len(), 1);
        assert_eq!(detection.matches[0].word, "bastard");
        assert_eq!(spans(&detection), vec![(7, 7)]);
    }

    #[test]
    fn fuzzy_respects_zero_distance() {
        let mut config = Config::default();
        config.detection.max_edit_distance = 0;
        let detector = Detector::with_config(config).unwrap();
        assert!(!detector.detect("what a bastsrd").has_profanity);
        // The exact stage still works.
        assert!(detector.detect("what a bastard").has_profanity);
    }

    #[test]
    fn sanitize_is_a_projection() {
        let detector = detector();
        for text in [
            "shit happens",
            "you are a bitch",
            "s*h-i t happens",
            "clean text stays clean",
            "fuck shit ass",
        ] {
            let once = detector.sanitize(text);
            let twice = detector.sanitize(&once);
            assert_eq!(once, twice, "input {:?}", text);
        }
    }

    #[test]
    fn sanitize_preserves_length() {
        let detector = detector();
        for text in ["shit happens", "you are a bitch", "fuck shit ass", "clean"] {
            assert_eq!(
                detector.sanitize(text).chars().count(),
                text.chars().count(),
                "input {:?}",
                text
            );
        }
    }

    #[test]
    fn masking_variants() {
        let mut config = Config::default();
        config.masking.preserve_first = false;
        config.masking.preserve_last = true;
        let detector = Detector::with_config(config).unwrap();
        assert_eq!(detector.sanitize("shit"), "***t");

        let mut config = Config::default();
        config.masking.preserve_length = false;
        let detector = Detector::with_config(config).unwrap();
        assert_eq!(detector.sanitize("shit"), "****");

        let mut config = Config::default();
        config.masking.enabled = false;
        let detector = Detector::with_config(config).unwrap();
        assert_eq!(detector.sanitize("shit"), "shit");

        let mut config = Config::default();
        config.masking.pattern_char = '#';
        let detector = Detector::with_config(config).unwrap();
        assert_eq!(detector.sanitize("shit"), "s###");
    }

    #[test]
    fn overlapping_spans_mask_once() {
        // "asses" and a later overlapping hit: ascending application with
        // overlap skipping must not panic or double-mask.
        let mut detector = detector();
        detector.add_word("sses", None);
        let sanitized = detector.sanitize("asses");
        assert_eq!(sanitized.chars().count(), 5);
        assert!(sanitized.contains('*'));
    }

    #[test]
    fn word_addition_is_monotonic() {
        let texts = ["grond is fine", "total grond alert", "nothing here"];
        let mut detector = detector();
        let before: Vec<usize> = texts
            .iter()
            .map(|t| detector.detect(t).matches.len())
            .collect();
        detector.add_word("grond", None);
        for (text, before) in texts.iter().zip(before) {
            assert!(detector.detect(text).matches.len() >= before);
        }
        assert!(detector.detect("total grond alert").has_profanity);
    }

    #[test]
    fn removed_word_stops_matching() {
        let mut detector = detector();
        assert!(detector.detect("shit").has_profanity);
        detector.remove_word("shit", None);
        assert!(!detector.detect("shit").has_profanity);
        assert!(detector.detect("bitch").has_profanity);
    }

    #[test]
    fn allowlist_suppresses_reports() {
        let mut config = Config::default();
        config.detection.allowlist.insert("bitch".to_owned());
        let detector = Detector::with_config(config).unwrap();
        assert!(!detector.detect("you bitch").has_profanity);
        assert!(detector.detect("you shit").has_profanity);
    }

    #[test]
    fn custom_words_land_in_fallback_language() {
        let mut config = Config::default();
        config.detection.custom_words.push("grond".to_owned());
        let detector = Detector::with_config(config).unwrap();
        let detection = detector.detect("grond!");
        assert!(detection.has_profanity);
        assert_eq!(detection.matches[0].language, "en");
    }

    #[test]
    fn algorithm_equivalence_on_exact_stage() {
        let texts = [
            "you are a bitch",
            "sh1t happens",
            "s*h-i t happens",
            "asses everywhere",
            "clean as a whistle",
            "ФУ сука идиот",
        ];
        for whole_words in [false, true] {
            for inflections in [false, true] {
                let mut config = Config::default();
                config.detection.whole_words_only = whole_words;
                config.detection.enable_inflections = inflections;
                config.detection.max_edit_distance = 0;
                let trie = Detector::with_config(config.clone()).unwrap();
                let mut config = config;
                config.detection.algorithm = Algorithm::Aho;
                let aho = Detector::with_config(config).unwrap();
                for text in texts {
                    let mut left: Vec<Match> = trie.detect(text).matches;
                    let mut right: Vec<Match> = aho.detect(text).matches;
                    left.sort_by_key(|m| (m.start, m.length));
                    right.sort_by_key(|m| (m.start, m.length));
                    assert_eq!(left, right, "text {:?}", text);
                }
            }
        }
    }

    #[test]
    fn set_algorithm_rebuilds_in_place() {
        let mut detector = detector();
        let before = detector.detect("total bullshit");
        detector.set_algorithm(Algorithm::Aho);
        let after = detector.detect("total bullshit");
        assert_eq!(before, after);
        detector.set_algorithm(Algorithm::Trie);
        assert_eq!(detector.detect("total bullshit"), before);
    }

    #[test]
    fn separator_transparency() {
        let detector = detector();
        for separator in [' ', '.', '-', '_', '*'] {
            let text: String = format!("b{separator}i{separator}t{separator}c{separator}h");
            let detection = detector.detect(&text);
            assert!(detection.has_profanity, "separator {:?}", separator);
            assert_eq!(detection.matches[0].start, 0, "separator {:?}", separator);
        }
    }

    #[test]
    fn whole_words_only_boundaries_are_sound() {
        let mut config = Config::default();
        config.detection.whole_words_only = true;
        config.detection.max_edit_distance = 0;
        let detector = Detector::with_config(config).unwrap();
        assert!(!detector.detect("classic").has_profanity);
        assert!(!detector.detect("shitake_x").has_profanity);
        let detection = detector.detect("pure shit!");
        assert!(detection.has_profanity);
        for m in &detection.matches {
            let chars: Vec<char> = "pure shit!".chars().collect();
            if m.start > 0 {
                assert!(!crate::is_word_char(chars[m.start - 1]));
            }
            let end = m.start + m.length;
            if end < chars.len() {
                assert!(!crate::is_word_char(chars[end]));
            }
        }
    }

    #[test]
    fn language_switching() {
        let mut detector = detector();
        assert!(!detector.detect("сука").has_profanity);
        detector.set_languages(["ru"], None);
        assert!(detector.detect("сука").has_profanity);
        assert!(!detector.detect("shit").has_profanity);
        detector.set_languages(["en", "ru"], None);
        assert!(detector.detect("shit").has_profanity);
        assert!(detector.detect("сука").has_profanity);
    }

    #[test]
    fn language_priority_is_enabled_order() {
        // "merda" is both Italian and Portuguese; the first enabled
        // language that matches claims it.
        let mut detector = detector();
        detector.set_languages(["it", "pt"], None);
        let detection = detector.detect("che merda");
        assert_eq!(detection.matches[0].language, "it");

        detector.set_languages(["pt", "it"], None);
        let detection = detector.detect("che merda");
        assert_eq!(detection.matches[0].language, "pt");
    }

    #[test]
    fn auto_detect_routes_by_script() {
        let mut config = Config::default();
        config.languages.auto_detect = true;
        let mut detector = Detector::with_config(config).unwrap();
        detector.load_languages(["ru", "ko", "en"]);
        assert!(detector.detect("ах ты сука").has_profanity);
        assert!(detector.detect("이 씨발").has_profanity);
        // Latin input falls back to the loaded languages.
        assert!(detector.detect("oh shit").has_profanity);
    }

    #[test]
    fn auto_detect_with_nothing_enabled_loads_every_pack() {
        let mut config = Config::default();
        config.languages.auto_detect = true;
        config.languages.enabled.clear();
        let detector = Detector::with_config(config).unwrap();
        assert!(detector.detect("ควย").has_profanity);
        assert!(detector.detect("चूतिया").has_profanity);
    }

    #[test]
    fn unknown_languages_are_silently_empty() {
        let mut detector = detector();
        detector.set_languages(["tlh", "en"], None);
        assert!(detector.detect("shit").has_profanity);
        detector.add_word("petaq", Some("tlh"));
        assert!(detector.detect("you petaq").has_profanity);
    }

    #[test]
    fn phrase_lifecycle() {
        let mut detector = detector();
        detector.add_phrase("piece of garbage");
        assert!(detector.detect("utter piece of garbage").has_profanity);
        detector.remove_phrase("piece of garbage");
        assert!(!detector.detect("utter piece of garbage").has_profanity);
    }

    #[test]
    fn case_sensitivity_is_honored() {
        let mut config = Config::default();
        config.detection.case_sensitive = true;
        let detector = Detector::with_config(config).unwrap();
        assert!(detector.detect("shit").has_profanity);
        assert!(!detector.detect("SHIT").has_profanity);

        let detector = Detector::new();
        assert!(detector.detect("SHIT").has_profanity);
    }

    #[test]
    fn profane_str_trait() {
        assert!("you are a bitch".is_profane());
        assert!(!"have a nice day".is_profane());
        assert_eq!("shit happens".sanitized(), "s*** happens");
    }

    #[test]
    fn arbitrary_unicode_never_panics() {
        use rand::{distributions::Standard, Rng};

        let detector = detector();
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let input: String = (&mut rng)
                .sample_iter::<char, _>(Standard)
                .take(80)
                .collect();
            let _ = detector.detect(&input);
            let sanitized = detector.sanitize(&input);
            assert_eq!(sanitized.chars().count(), input.chars().count());
        }
    }

    #[test]
    fn detector_is_shareable_across_threads() {
        let detector = std::sync::Arc::new(detector());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let detector = detector.clone();
                std::thread::spawn(move || detector.detect("oh shit").has_profanity)
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
