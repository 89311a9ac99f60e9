use crate::aho::AhoCorasick;
use crate::config::Algorithm;
use crate::trie::Trie;
use crate::Set;

/// One exact-stage hit, in code-point indices of the scanned text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RawMatch {
    pub word: String,
    pub start: usize,
    /// Inclusive end position.
    pub end: usize,
}

/// The exact-search back-end selected by the configuration. Both variants
/// honor the same contract: `insert_all`, one `finalize`, then any number of
/// `find_all` calls.
pub(crate) enum WordMatcher {
    Trie(Trie),
    Aho(AhoCorasick),
}

impl WordMatcher {
    pub fn new(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Trie => Self::Trie(Trie::default()),
            Algorithm::Aho => Self::Aho(AhoCorasick::new()),
        }
    }

    pub fn insert_all<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match self {
            Self::Trie(trie) => trie.insert_all(words),
            Self::Aho(aho) => aho.insert_all(words),
        }
    }

    pub fn finalize(&mut self) {
        if let Self::Aho(aho) = self {
            aho.build();
        }
    }

    pub fn find_all(
        &self,
        text: &[char],
        whole_words_only: bool,
        separators: &Set<char>,
    ) -> Vec<RawMatch> {
        match self {
            Self::Trie(trie) => trie.find_all(text, whole_words_only, separators),
            Self::Aho(aho) => aho.find_all(text, whole_words_only, separators),
        }
    }
}
