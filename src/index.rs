//! Trie index over fixed-length words with occurrence counts.
//!
//! Every length-L window of both strands is inserted once per occurrence, so a
//! word's counter is the number of genomic positions carrying it. Two queries
//! are supported: prefix enumeration ([`PrimerIndex::query`]) and bounded
//! Hamming search ([`PrimerIndex::search_within_distance`]).
//!
//! Nodes live in a single arena and refer to their children by index; there are
//! no parent links. The index is built once and only read afterwards.
//!
//! # Examples
//! ```
//! use primerscout::index::PrimerIndex;
//! let mut idx = PrimerIndex::new(4);
//! for w in ["ACGT", "ACGA", "TTTT"] { idx.insert(w.as_bytes()).unwrap(); }
//! let hits = idx.search_within_distance(b"ACGT", 1).unwrap();
//! assert_eq!(hits.into_iter().collect::<Vec<_>>(), vec!["ACGA", "ACGT"]);
//! ```
use std::collections::BTreeSet;

use crate::error::{PrimerError, Result};
use crate::sequence::SequenceProvider;

const ROOT: usize = 0;

#[derive(Clone, Debug, Default)]
struct Node {
    /// `(byte, child index)` kept sorted by byte so traversal order is stable.
    children: Vec<(u8, usize)>,
    is_end: bool,
    count: usize,
}

impl Node {
    #[inline]
    fn child(&self, b: u8) -> Option<usize> {
        self.children
            .binary_search_by_key(&b, |&(c, _)| c)
            .ok()
            .map(|i| self.children[i].1)
    }
}

/// Arena-backed trie of fixed-length words.
#[derive(Clone, Debug)]
pub struct PrimerIndex {
    nodes: Vec<Node>,
    word_len: usize,
    distinct: usize,
    insertions: usize,
}

impl PrimerIndex {
    /// Empty index accepting words of exactly `word_len` bytes.
    pub fn new(word_len: usize) -> Self {
        PrimerIndex { nodes: vec![Node::default()], word_len, distinct: 0, insertions: 0 }
    }

    /// Index every length-`word_len` window of both (unmasked) strands.
    pub fn from_genome<P: SequenceProvider + ?Sized>(genome: &P, word_len: usize) -> Self {
        let mut idx = PrimerIndex::new(word_len);
        for strand in [genome.forward_strand(), genome.reverse_strand()] {
            for (_, w) in strand.windows(word_len) {
                idx.insert_unchecked(w);
            }
        }
        log::debug!(
            "index: {} distinct words of length {} from {} windows ({} nodes)",
            idx.distinct,
            word_len,
            idx.insertions,
            idx.nodes.len()
        );
        idx
    }

    /// Insert one occurrence of `word`.
    ///
    /// # Errors
    /// [`PrimerError::InvalidQueryLength`] if `word` is not `word_len` long.
    pub fn insert(&mut self, word: &[u8]) -> Result<()> {
        self.check_len("insert", word)?;
        self.insert_unchecked(word);
        Ok(())
    }

    fn insert_unchecked(&mut self, word: &[u8]) {
        let mut node = ROOT;
        for &b in word {
            node = match self.nodes[node].child(b) {
                Some(next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(Node::default());
                    let children = &mut self.nodes[node].children;
                    let at = children.partition_point(|&(c, _)| c < b);
                    children.insert(at, (b, next));
                    next
                }
            };
        }
        let end = &mut self.nodes[node];
        if !end.is_end {
            end.is_end = true;
            self.distinct += 1;
        }
        end.count += 1;
        self.insertions += 1;
    }

    fn check_len(&self, operation: &'static str, word: &[u8]) -> Result<()> {
        if word.len() != self.word_len {
            return Err(PrimerError::InvalidQueryLength {
                operation,
                expected: self.word_len,
                actual: word.len(),
            });
        }
        Ok(())
    }

    fn walk(&self, prefix: &[u8]) -> Option<usize> {
        prefix.iter().try_fold(ROOT, |node, &b| self.nodes[node].child(b))
    }

    /// Number of times `word` was inserted (0 when absent).
    pub fn count(&self, word: &[u8]) -> usize {
        match self.walk(word) {
            Some(n) if self.nodes[n].is_end => self.nodes[n].count,
            _ => 0,
        }
    }

    /// `true` when `word` was inserted at least once.
    pub fn contains(&self, word: &[u8]) -> bool {
        self.count(word) > 0
    }

    /// All inserted words starting with `prefix`, paired with their counts,
    /// rarest first. An empty prefix lists everything; an unknown prefix yields
    /// an empty list.
    pub fn query(&self, prefix: &[u8]) -> Vec<(String, usize)> {
        let Some(start) = self.walk(prefix) else {
            return Vec::new();
        };
        let mut path = prefix.to_vec();
        let mut out = Vec::new();
        self.collect(start, &mut path, &mut out);
        // Stable: equal counts keep lexicographic order from the traversal.
        out.sort_by_key(|&(_, c)| c);
        out
    }

    fn collect(&self, node: usize, path: &mut Vec<u8>, out: &mut Vec<(String, usize)>) {
        let n = &self.nodes[node];
        if n.is_end {
            out.push((String::from_utf8_lossy(path).into_owned(), n.count));
        }
        for &(b, child) in &n.children {
            path.push(b);
            self.collect(child, path, out);
            path.pop();
        }
    }

    /// Every inserted word within Hamming distance `max_mismatches` of `query`,
    /// the query itself included when present.
    ///
    /// # Errors
    /// [`PrimerError::InvalidQueryLength`] if `query` is not `word_len` long.
    pub fn search_within_distance(&self, query: &[u8], max_mismatches: usize) -> Result<BTreeSet<String>> {
        self.check_len("search_within_distance", query)?;
        let mut search = HammingSearch {
            query,
            max_mismatches,
            path: Vec::with_capacity(query.len()),
            hits: BTreeSet::new(),
        };
        self.descend(ROOT, 0, &mut search);
        Ok(search.hits)
    }

    fn descend(&self, node: usize, mismatches: usize, s: &mut HammingSearch<'_>) {
        let depth = s.path.len();
        if depth == s.query.len() {
            if self.nodes[node].is_end {
                s.hits.insert(String::from_utf8_lossy(&s.path).into_owned());
            }
            return;
        }
        let want = s.query[depth];
        for &(b, child) in &self.nodes[node].children {
            let cost = mismatches + usize::from(b != want);
            if cost > s.max_mismatches {
                continue;
            }
            s.path.push(b);
            self.descend(child, cost, s);
            s.path.pop();
        }
    }

    /// `true` when another indexed word lies within `max_mismatches` of `word`.
    pub fn has_similar(&self, word: &[u8], max_mismatches: usize) -> Result<bool> {
        let hits = self.search_within_distance(word, max_mismatches)?;
        Ok(hits.iter().any(|w| w.as_bytes() != word))
    }

    /// Length every stored word has.
    pub fn word_len(&self) -> usize {
        self.word_len
    }

    /// Distinct words stored.
    pub fn len(&self) -> usize {
        self.distinct
    }

    pub fn is_empty(&self) -> bool {
        self.distinct == 0
    }

    /// Total occurrences inserted, duplicates included.
    pub fn total_insertions(&self) -> usize {
        self.insertions
    }

    /// Trie nodes allocated, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Accumulator threaded through the mismatch search.
struct HammingSearch<'q> {
    query: &'q [u8],
    max_mismatches: usize,
    path: Vec<u8>,
    hits: BTreeSet<String>,
}
