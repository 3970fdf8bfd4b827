use std::collections::HashMap;
use std::hash::{BuildHasher, Hash, Hasher};

use ahash::RandomState;

use crate::error::{Result, VectorizerError};
use crate::vectorizer::corpus::DocumentFrequency;
use crate::vectorizer::document::{Document, TermId};
use crate::vectorizer::tokenizer::{advance, Tokenizer};

// fixed seeds keep ids stable between runs
const SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

/// Word n-gram tokenizer with feature hashing
///
/// Splits the document text on whitespace, lowercases each word and hashes
/// every window of `order` consecutive words into one of `buckets` ids. The
/// id space is fixed, so `vocabulary_size()` is `buckets` before any
/// document is seen.
#[derive(Debug, Clone)]
pub struct HashingNgramTokenizer {
    order: usize,
    buckets: u64,
    hasher: RandomState,
}

impl HashingNgramTokenizer {
    /// # Arguments
    /// * `order` - words per n-gram, at least 1
    /// * `buckets` - size of the id space, at least 1
    pub fn new(order: usize, buckets: u64) -> Result<Self> {
        if order == 0 || buckets == 0 {
            return Err(VectorizerError::Config(format!(
                "n-gram order ({order}) and bucket count ({buckets}) must be positive"
            )));
        }
        Ok(Self {
            order,
            buckets,
            hasher: RandomState::with_seeds(SEEDS[0], SEEDS[1], SEEDS[2], SEEDS[3]),
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Local id of one n-gram.
    pub fn bucket<T: AsRef<str>>(&self, gram: &[T]) -> TermId {
        let mut hasher = self.hasher.build_hasher();
        for word in gram {
            word.as_ref().hash(&mut hasher);
        }
        hasher.finish() % self.buckets
    }

    /// Local id -> count for `text`.
    pub fn local_counts(&self, text: &str) -> HashMap<TermId, u64> {
        let words: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
        let mut counts = HashMap::new();
        for gram in words.windows(self.order) {
            *counts.entry(self.bucket(gram)).or_insert(0) += 1;
        }
        counts
    }
}

impl Tokenizer for HashingNgramTokenizer {
    fn tokenize(
        &self,
        document: &mut Document,
        offset: TermId,
        doc_freq: Option<&DocumentFrequency>,
    ) -> Result<()> {
        advance(offset, self.buckets)?;
        let counts = self.local_counts(&document.text()?);
        for (local, count) in counts {
            document.increment(offset + local, count, doc_freq)?;
        }
        Ok(())
    }

    fn vocabulary_size(&self) -> u64 {
        self.buckets
    }
}
