//! Prefix Trie over Filter Strings
//!
//! Stores every `"tagName:tagValue"` string observed during ingestion so the
//! catalog of available filters can be searched by prefix. One node per
//! character; a leaf flag marks nodes where a complete string ends.
//!
//! Both insertion and enumeration are iterative, so depth is bounded only by
//! the heap, not the call stack.
//!
//! # Performance
//!
//! - Insert: O(|word|)
//! - Prefix search: O(|prefix| + total length of matching words)
//!
//! Result order follows child-map iteration and is unspecified.

use std::collections::HashMap;

/// A single trie node
#[derive(Debug, Default)]
struct TrieNode {
    children: HashMap<char, TrieNode>,
    is_leaf: bool,
}

/// Character trie of filter strings supporting prefix enumeration
#[derive(Debug, Default)]
pub struct FilterTrie {
    root: TrieNode,
    words: usize,
}

impl FilterTrie {
    /// Create an empty trie
    pub fn new() -> Self {
        Self {
            root: TrieNode::default(),
            words: 0,
        }
    }

    /// Insert a word
    ///
    /// Idempotent. Returns true if the word was not stored before. The empty
    /// string marks the root as a leaf.
    pub fn insert(&mut self, word: &str) -> bool {
        let mut node = &mut self.root;
        for ch in word.chars() {
            node = node.children.entry(ch).or_default();
        }
        if node.is_leaf {
            return false;
        }
        node.is_leaf = true;
        self.words += 1;
        true
    }

    /// Check whether `word` was inserted as a complete string
    pub fn contains(&self, word: &str) -> bool {
        self.find(word).is_some_and(|node| node.is_leaf)
    }

    /// All stored words starting with `prefix`
    ///
    /// An empty prefix enumerates the whole trie. A prefix that leaves the
    /// trie yields an empty vector.
    pub fn search_prefix(&self, prefix: &str) -> Vec<String> {
        let Some(start) = self.find(prefix) else {
            return Vec::new();
        };

        let mut words = Vec::new();
        let mut stack: Vec<(&TrieNode, String)> = vec![(start, prefix.to_string())];
        while let Some((node, word)) = stack.pop() {
            for (ch, child) in &node.children {
                let mut next = String::with_capacity(word.len() + ch.len_utf8());
                next.push_str(&word);
                next.push(*ch);
                stack.push((child, next));
            }
            if node.is_leaf {
                words.push(word);
            }
        }
        words
    }

    /// Number of distinct stored words
    pub fn len(&self) -> usize {
        self.words
    }

    /// Check if no word was stored
    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    /// Walk `path` from the root
    fn find(&self, path: &str) -> Option<&TrieNode> {
        let mut node = &self.root;
        for ch in path.chars() {
            node = node.children.get(&ch)?;
        }
        Some(node)
    }
}
