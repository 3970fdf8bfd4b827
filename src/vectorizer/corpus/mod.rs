pub mod pass;

use std::sync::atomic::{AtomicU64, Ordering};

use ahash::RandomState;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::vectorizer::document::{Document, TermId};

/// keep document count and per-term document frequencies in a thread-safe way
///
/// One instance is shared by reference across a whole corpus pass. Documents
/// bump a term at most once (on its first occurrence), so `get` is the number
/// of distinct documents containing the term.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct DocumentFrequency {
    /// number of documents registered
    pub doc_num: AtomicU64,
    /// documents containing each term
    pub term_counts: DashMap<TermId, u64, RandomState>,
}

impl Clone for DocumentFrequency {
    fn clone(&self) -> Self {
        Self {
            doc_num: AtomicU64::new(self.doc_num.load(Ordering::Acquire)),
            term_counts: self.term_counts.clone(),
        }
    }
}

impl DocumentFrequency {
    /// Create a new instance
    pub fn new() -> Self {
        Self {
            doc_num: AtomicU64::new(0),
            term_counts: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Record that one more document contains `term`
    #[inline]
    pub fn bump(&self, term: TermId) {
        self.term_counts
            .entry(term)
            .and_modify(|count| *count += 1)
            .or_insert(1);
    }

    /// Register a finished document
    pub fn add_doc(&self) {
        self.doc_num.fetch_add(1, Ordering::Relaxed);
    }

    /// Withdraw a document previously counted, e.g. before re-tokenizing it
    pub fn sub_doc(&self, doc: &Document) {
        let _ = self
            .doc_num
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
        // decrement and removal happen under one shard lock
        for &term in doc.frequencies().keys() {
            if let Entry::Occupied(mut entry) = self.term_counts.entry(term) {
                if *entry.get() > 1 {
                    *entry.get_mut() -= 1;
                } else {
                    entry.remove();
                }
            }
        }
    }

    /// Get the number of documents registered
    pub fn get_doc_num(&self) -> u64 {
        self.doc_num.load(Ordering::Relaxed)
    }

    /// Number of documents containing `term`
    pub fn get(&self, term: TermId) -> u64 {
        self.term_counts.get(&term).map_or(0, |count| *count)
    }

    /// Get the current vocabulary size (number of unique terms)
    #[inline]
    pub fn vocab_size(&self) -> usize {
        self.term_counts.len()
    }

    /// (term, document frequency) pairs in ascending term order
    pub fn sorted_counts(&self) -> Vec<(TermId, u64)> {
        let mut counts: Vec<(TermId, u64)> = self
            .term_counts
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect();
        counts.sort_unstable_by_key(|&(term, _)| term);
        counts
    }

    /// Merge another counter into self, e.g. from a separate pass over
    /// a disjoint set of documents
    pub fn merge(&self, other: &DocumentFrequency) {
        for entry in other.term_counts.iter() {
            let count_other = *entry.value();
            self.term_counts
                .entry(*entry.key())
                .and_modify(|count| *count += count_other)
                .or_insert(count_other);
        }
        self.doc_num
            .fetch_add(other.doc_num.load(Ordering::Relaxed), Ordering::Relaxed);
    }
}
