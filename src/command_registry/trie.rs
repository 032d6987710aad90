//! Prefix Trie
//!
//! 命令名前缀树，用于未识别子命令的补全建议

use std::collections::BTreeMap;

const ROOT: usize = 0;

/// A single node in the trie arena
#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: BTreeMap<char, usize>,
    value: Option<String>,
}

/// Arena-backed prefix trie mapping string keys to string values.
///
/// Nodes are stored in a `Vec` and addressed by index, the root is always at
/// index 0. Children are kept in a `BTreeMap`, so every traversal visits
/// siblings in ascending character order and [`PrefixTrie::prefix_match`]
/// returns values ordered by their keys.
#[derive(Debug, Clone)]
pub struct PrefixTrie {
    nodes: Vec<TrieNode>,
    len: usize,
}

impl PrefixTrie {
    /// Create an empty trie holding only the root node
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            len: 0,
        }
    }

    /// Insert `key`, marking its last node terminal with `value`.
    ///
    /// Inserting an existing key replaces its value.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        let mut current = ROOT;
        for ch in key.chars() {
            current = match self.nodes[current].children.get(&ch) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    self.nodes[current].children.insert(ch, child);
                    child
                }
            };
        }

        if self.nodes[current].value.replace(value.into()).is_none() {
            self.len += 1;
        }
    }

    /// Collect every value whose key starts with `prefix`.
    ///
    /// Returns an empty vector when no key has this prefix. An empty prefix
    /// returns every value in the trie.
    pub fn prefix_match(&self, prefix: &str) -> Vec<String> {
        let Some(start) = self.find(prefix) else {
            return Vec::new();
        };

        let mut matches = Vec::new();
        let mut stack = vec![start];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if let Some(value) = &node.value {
                matches.push(value.clone());
            }
            // reversed so the smallest character is popped first
            stack.extend(node.children.values().rev().copied());
        }
        matches
    }

    /// Look up the value stored for an exact key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.find(key)
            .and_then(|index| self.nodes[index].value.as_deref())
    }

    /// Check whether an exact key has been inserted
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of terminal entries
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn find(&self, prefix: &str) -> Option<usize> {
        prefix.chars().try_fold(ROOT, |index, ch| {
            self.nodes[index].children.get(&ch).copied()
        })
    }
}

impl Default for PrefixTrie {
    fn default() -> Self {
        Self::new()
    }
}
