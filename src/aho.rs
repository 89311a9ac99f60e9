use crate::matcher::RawMatch;
use crate::{is_word_char, Map, Set};
use std::collections::VecDeque;

/// Aho–Corasick automaton, the linear-time exact-search back-end.
///
/// Lifecycle: `insert` while building, then exactly one `build`, then
/// `find_all`. Consulting the automaton before `build` is a programmer
/// error.
pub(crate) struct AhoCorasick {
    /// Node arena; index 0 is the root.
    nodes: Vec<AhoNode>,
    patterns: Vec<Pattern>,
    built: bool,
}

struct Pattern {
    word: Box<str>,
    /// Length in code points.
    len: usize,
}

#[derive(Default)]
struct AhoNode {
    children: Map<char, u32>,
    /// Deepest state that is a proper suffix of this one.
    fail: u32,
    /// Patterns ending here, own terminals plus those reachable via failure
    /// links.
    outputs: Vec<u32>,
}

impl AhoCorasick {
    pub fn new() -> Self {
        Self {
            nodes: vec![AhoNode::default()],
            patterns: Vec::new(),
            built: false,
        }
    }

    pub fn insert(&mut self, word: &str) {
        assert!(!self.built, "insert after build");
        if word.is_empty() {
            return;
        }
        let mut state = 0usize;
        for c in word.chars() {
            state = match self.nodes[state].children.get(&c) {
                Some(&next) => next as usize,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(AhoNode::default());
                    self.nodes[state].children.insert(c, next as u32);
                    next
                }
            };
        }
        let duplicate = self.nodes[state]
            .outputs
            .iter()
            .any(|&p| &*self.patterns[p as usize].word == word);
        if !duplicate {
            let id = self.patterns.len() as u32;
            self.patterns.push(Pattern {
                word: word.into(),
                len: word.chars().count(),
            });
            self.nodes[state].outputs.push(id);
        }
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

    /// Breadth-first failure-link construction. Depth-1 states fail to the
    /// root; deeper states fail to the deepest proper-suffix state, whose
    /// output list they absorb.
    pub fn build(&mut self) {
        let mut queue = VecDeque::new();
        for &child in self.nodes[0].children.values() {
            queue.push_back(child);
        }
        while let Some(u) = queue.pop_front() {
            let edges: Vec<(char, u32)> = self.nodes[u as usize]
                .children
                .iter()
                .map(|(&c, &v)| (c, v))
                .collect();
            for (c, v) in edges {
                let mut f = self.nodes[u as usize].fail;
                let fail_v = loop {
                    if let Some(&w) = self.nodes[f as usize].children.get(&c) {
                        break w;
                    }
                    if f == 0 {
                        break 0;
                    }
                    f = self.nodes[f as usize].fail;
                };
                let inherited = self.nodes[fail_v as usize].outputs.clone();
                let node = &mut self.nodes[v as usize];
                node.fail = fail_v;
                node.outputs.extend(inherited);
                queue.push_back(v);
            }
        }
        self.built = true;
    }

    /// Automaton walk over the text with separators compacted away. Raw hits
    /// are collapsed to the longest hit per start position so the reported
    /// set matches the trie back-end.
    pub fn find_all(
        &self,
        text: &[char],
        whole_words_only: bool,
        separators: &Set<char>,
    ) -> Vec<RawMatch> {
        assert!(self.built, "find_all before build");

        let mut compact = Vec::with_capacity(text.len());
        let mut original_index = Vec::with_capacity(text.len());
        for (i, &c) in text.iter().enumerate() {
            if !separators.contains(&c) {
                compact.push(c);
                original_index.push(i);
            }
        }

        let mut hits: Vec<RawMatch> = Vec::new();
        let mut state = 0u32;
        for (i, &c) in compact.iter().enumerate() {
            loop {
                if let Some(&next) = self.nodes[state as usize].children.get(&c) {
                    state = next;
                    break;
                }
                if state == 0 {
                    break;
                }
                state = self.nodes[state as usize].fail;
            }
            for &pid in &self.nodes[state as usize].outputs {
                let pattern = &self.patterns[pid as usize];
                let (start, end) = (original_index[i + 1 - pattern.len], original_index[i]);
                if whole_words_only {
                    let left_ok = start == 0 || !is_word_char(text[start - 1]);
                    let right_ok = end + 1 >= text.len() || !is_word_char(text[end + 1]);
                    if !left_ok || !right_ok {
                        continue;
                    }
                }
                hits.push(RawMatch {
                    word: pattern.word.to_string(),
                    start,
                    end,
                });
            }
        }

        hits.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
        hits.dedup_by_key(|m| m.start);
        hits
    }
}
