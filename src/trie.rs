use crate::matcher::RawMatch;
use crate::{is_word_char, Map, Set};

/// Prefix tree over code points, one of the two exact-search back-ends.
#[derive(Debug, Default)]
pub(crate) struct Trie {
    root: Node,
}

#[derive(Debug, Default)]
struct Node {
    children: Children,
    /// The pattern that terminates at this node, if any.
    word: Option<Box<str>>,
}

/// Child storage: a dense slot array while every edge is an ASCII lowercase
/// letter, a hash map as soon as a rarer edge appears.
#[derive(Debug)]
enum Children {
    Dense([Option<Box<Node>>; 26]),
    Sparse(Map<char, Node>),
}

impl Default for Children {
    fn default() -> Self {
        Self::Dense(Default::default())
    }
}

impl Children {
    fn dense_index(key: char) -> Option<usize> {
        ('a' <= key && key <= 'z').then(|| key as usize - 'a' as usize)
    }

    fn get(&self, key: char) -> Option<&Node> {
        match self {
            Self::Dense(slots) => Self::dense_index(key).and_then(|i| slots[i].as_deref()),
            Self::Sparse(map) => map.get(&key),
        }
    }

    fn get_or_insert(&mut self, key: char) -> &mut Node {
        if Self::dense_index(key).is_none() {
            if let Self::Dense(slots) = self {
                let mut map = Map::default();
                for (i, slot) in slots.iter_mut().enumerate() {
                    if let Some(node) = slot.take() {
                        map.insert((b'a' + i as u8) as char, *node);
                    }
                }
                *self = Self::Sparse(map);
            }
        }
        match self {
            Self::Dense(slots) => slots[Self::dense_index(key).unwrap()]
                .get_or_insert_with(Default::default),
            Self::Sparse(map) => map.entry(key).or_default(),
        }
    }
}

impl Trie {
    pub fn insert(&mut self, word: &str) {
        if word.is_empty() {
            return;
        }
        let mut current = &mut self.root;
        for c in word.chars() {
            current = current.children.get_or_insert(c);
        }
        current.word = Some(word.into());
    }

    pub fn insert_all<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            self.insert(word.as_ref());
        }
    }

    /// Left-anchored scan from every start position. From each start the
    /// longest terminal wins; separators are skipped without advancing the
    /// tree, so the reported span covers them.
    pub fn find_all(
        &self,
        text: &[char],
        whole_words_only: bool,
        separators: &Set<char>,
    ) -> Vec<RawMatch> {
        let mut out = Vec::new();
        for start in 0..text.len() {
            if separators.contains(&text[start]) {
                continue;
            }
            // A start inside a word cannot begin a whole word.
            if whole_words_only && start > 0 && is_word_char(text[start - 1]) {
                continue;
            }

            let mut node = &self.root;
            let mut best: Option<(usize, &str)> = None;
            let mut i = start;
            while i < text.len() {
                let c = text[i];
                if let Some(next) = node.children.get(c) {
                    node = next;
                    if let Some(word) = node.word.as_deref() {
                        let right_ok = !whole_words_only
                            || text.get(i + 1).map_or(true, |&n| !is_word_char(n));
                        if right_ok {
                            best = Some((i, word));
                        }
                    }
                } else if !separators.contains(&c) {
                    break;
                }
                i += 1;
            }

            if let Some((end, word)) = best {
                out.push(RawMatch {
                    word: word.to_owned(),
                    start,
                    end,
                });
            }
        }
        out
    }
}
