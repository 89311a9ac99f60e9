use crate::{is_word_char, Map, Set};

/// A maximal run of word characters with its code-point span.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Token {
    pub text: String,
    /// Position of the first code point.
    pub start: usize,
    /// Position one past the last code point.
    pub end: usize,
}

pub(crate) fn tokenize(text: &[char]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < text.len() {
        if is_word_char(text[i]) {
            let start = i;
            while i < text.len() && is_word_char(text[i]) {
                i += 1;
            }
            tokens.push(Token {
                text: text[start..i].iter().collect(),
                start,
                end: i,
            });
        } else {
            i += 1;
        }
    }
    tokens
}

/// A phrase hit, in token indices (both inclusive).
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PhraseMatch {
    pub phrase: String,
    pub start_token: usize,
    pub end_token: usize,
}

/// Token-keyed tree over normalized phrases.
#[derive(Debug, Default)]
pub(crate) struct PhraseTrie {
    root: PhraseNode,
}

#[derive(Debug, Default)]
struct PhraseNode {
    children: Map<String, PhraseNode>,
    /// The canonical phrase that terminates here, if any.
    phrase: Option<Box<str>>,
}

impl PhraseTrie {
    pub fn insert(&mut self, tokens: &[String], phrase: &str) {
        if tokens.is_empty() {
            return;
        }
        let mut node = &mut self.root;
        for token in tokens {
            node = node.children.entry(token.clone()).or_default();
        }
        node.phrase = Some(phrase.into());
    }

    /// Walks children by consecutive tokens from every start. A token with
    /// no child edge is consumed as a skip if it is a stop word and the skip
    /// budget allows; the earliest terminal wins per start.
    pub fn find_all(
        &self,
        tokens: &[Token],
        stopwords: &Set<String>,
        max_skips: usize,
    ) -> Vec<PhraseMatch> {
        let mut out = Vec::new();
        for start in 0..tokens.len() {
            let mut node = match self.root.children.get(&tokens[start].text) {
                Some(node) => node,
                None => continue,
            };
            let mut skips = 0;
            let mut current = start;
            loop {
                if let Some(phrase) = node.phrase.as_deref() {
                    out.push(PhraseMatch {
                        phrase: phrase.to_owned(),
                        start_token: start,
                        end_token: current,
                    });
                    break;
                }
                current += 1;
                let Some(token) = tokens.get(current) else {
                    break;
                };
                if let Some(next) = node.children.get(&token.text) {
                    node = next;
                } else if stopwords.contains(&token.text) && skips < max_skips {
                    skips += 1;
                } else {
                    break;
                }
            }
        }
        out
    }
}
