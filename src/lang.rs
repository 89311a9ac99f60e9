use crate::config::DetectionOptions;
use crate::matcher::WordMatcher;
use crate::normalize::{self, NormalizeOptions};
use crate::Map;
use lazy_static::lazy_static;
use std::collections::BTreeSet;
use tracing::debug;

/// Read-only table of raw word lists keyed by language code. The detector
/// consults it synchronously; implementations must not block.
pub trait Pack: Send + Sync {
    /// Raw (unnormalized) words for a code, if the pack ships any.
    fn words(&self, code: &str) -> Option<&[&'static str]>;

    /// Every code this pack can supply.
    fn codes(&self) -> &[&'static str];
}

/// Codes shipped with the crate, in script-heuristic-friendly order.
const BUILTIN_CODES: &[&str] = &[
    "en", "es", "fr", "de", "it", "pt", "ru", "ar", "fa", "he", "hi", "th", "zh", "ja", "ko",
];

lazy_static! {
    static ref BUILTIN: Map<&'static str, Vec<&'static str>> = {
        fn lines(raw: &'static str) -> Vec<&'static str> {
            raw.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .collect()
        }

        let mut packs = Map::default();
        packs.insert("en", lines(include_str!("data/en.txt")));
        packs.insert("es", lines(include_str!("data/es.txt")));
        packs.insert("fr", lines(include_str!("data/fr.txt")));
        packs.insert("de", lines(include_str!("data/de.txt")));
        packs.insert("it", lines(include_str!("data/it.txt")));
        packs.insert("pt", lines(include_str!("data/pt.txt")));
        packs.insert("ru", lines(include_str!("data/ru.txt")));
        packs.insert("ar", lines(include_str!("data/ar.txt")));
        packs.insert("fa", lines(include_str!("data/fa.txt")));
        packs.insert("he", lines(include_str!("data/he.txt")));
        packs.insert("hi", lines(include_str!("data/hi.txt")));
        packs.insert("th", lines(include_str!("data/th.txt")));
        packs.insert("zh", lines(include_str!("data/zh.txt")));
        packs.insert("ja", lines(include_str!("data/ja.txt")));
        packs.insert("ko", lines(include_str!("data/ko.txt")));
        packs
    };
}

/// The compact word lists shipped with the crate. Real deployments are
/// expected to bring their own [`Pack`] with fuller lists.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinPack;

impl Pack for BuiltinPack {
    fn words(&self, code: &str) -> Option<&[&'static str]> {
        BUILTIN.get(code).map(Vec::as_slice)
    }

    fn codes(&self) -> &[&'static str] {
        BUILTIN_CODES
    }
}

/// One loaded language: its base word set and the compiled matcher.
///
/// The matcher always reflects the word set and the current configuration;
/// every mutation rebuilds it before returning. It is replaced wholesale,
/// never patched.
pub(crate) struct LanguageEntry {
    /// Normalized, deduplicated base forms. Ordered, so the fuzzy stage
    /// scans words deterministically.
    pub words: BTreeSet<String>,
    pub matcher: WordMatcher,
}

/// Holds every loaded language and the ordered active list.
pub(crate) struct Registry {
    entries: Map<String, LanguageEntry>,
    active: Vec<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: Map::default(),
            active: Vec::new(),
        }
    }

    pub fn get(&self, code: &str) -> Option<&LanguageEntry> {
        self.entries.get(code)
    }

    pub fn is_loaded(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    pub fn any_loaded(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Every loaded code: the active list first, the rest in stable order.
    pub fn loaded_in_priority_order(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .active
            .iter()
            .filter(|code| self.entries.contains_key(*code))
            .cloned()
            .collect();
        let mut rest: Vec<&String> = self
            .entries
            .keys()
            .filter(|code| !out.contains(code))
            .collect();
        rest.sort();
        out.extend(rest.into_iter().cloned());
        out
    }

    /// Loads packs for the given codes and marks them active. Codes the
    /// pack does not know produce empty entries, silently; `add_word` can
    /// populate them later.
    pub fn load<'a, I>(&mut self, codes: I, pack: &dyn Pack, opts: &DetectionOptions)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for code in codes {
            if !self.entries.contains_key(code) {
                let raw = pack.words(code).unwrap_or(&[]);
                let words = normalize_word_set(raw, opts);
                let matcher = build_matcher(&words, opts);
                debug!(code, words = words.len(), "loaded language");
                self.entries
                    .insert(code.to_owned(), LanguageEntry { words, matcher });
            }
            if !self.active.iter().any(|active| active == code) {
                self.active.push(code.to_owned());
            }
        }
    }

    /// Replaces the active list. Entries already loaded are kept as-is;
    /// missing ones are loaded from the pack.
    pub fn set_active<'a, I>(&mut self, codes: I, pack: &dyn Pack, opts: &DetectionOptions)
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.active.clear();
        self.load(codes, pack, opts);
    }

    pub fn add_word(&mut self, word: &str, code: &str, opts: &DetectionOptions) {
        let normalized = normalize::normalize_pattern(word, &NormalizeOptions::of(opts));
        if normalized.is_empty() {
            return;
        }
        let entry = self
            .entries
            .entry(code.to_owned())
            .or_insert_with(|| LanguageEntry {
                words: BTreeSet::new(),
                matcher: build_matcher(&BTreeSet::new(), opts),
            });
        if entry.words.insert(normalized) {
            entry.matcher = build_matcher(&entry.words, opts);
            debug!(code, words = entry.words.len(), "rebuilt after word insert");
        }
    }

    pub fn remove_word(&mut self, word: &str, code: &str, opts: &DetectionOptions) {
        let normalized = normalize::normalize_pattern(word, &NormalizeOptions::of(opts));
        if let Some(entry) = self.entries.get_mut(code) {
            if entry.words.remove(&normalized) {
                entry.matcher = build_matcher(&entry.words, opts);
                debug!(code, words = entry.words.len(), "rebuilt after word removal");
            }
        }
    }

    /// Rebuilds every loaded language under the current configuration. The
    /// previous matchers are dropped with their back-end.
    pub fn rebuild_all(&mut self, opts: &DetectionOptions) {
        for (code, entry) in self.entries.iter_mut() {
            entry.matcher = build_matcher(&entry.words, opts);
            debug!(code = code.as_str(), "rebuilt matcher");
        }
    }
}

fn normalize_word_set(raw: &[&str], opts: &DetectionOptions) -> BTreeSet<String> {
    let nopts = NormalizeOptions::of(opts);
    raw.iter()
        .map(|word| normalize::normalize_pattern(word, &nopts))
        .filter(|word| !word.is_empty())
        .collect()
}

/// Matcher entries for a word set: each base form, its sharp-s variant, and
/// (when inflections are on) every `word+suffix` surface form, all as
/// separate entries.
fn expanded_entries(words: &BTreeSet<String>, opts: &DetectionOptions) -> Vec<String> {
    let mut out = Vec::with_capacity(words.len());
    let mut push = |word: String| {
        if let Some(variant) = normalize::eszett_variant(&word) {
            out.push(variant);
        }
        out.push(word);
    };
    for word in words {
        push(word.clone());
        if opts.enable_inflections {
            for suffix in &opts.inflection_suffixes {
                push(format!("{word}{suffix}"));
            }
        }
    }
    out
}

fn build_matcher(words: &BTreeSet<String>, opts: &DetectionOptions) -> WordMatcher {
    let mut matcher = WordMatcher::new(opts.algorithm);
    matcher.insert_all(expanded_entries(words, opts));
    matcher.finalize();
    matcher
}
