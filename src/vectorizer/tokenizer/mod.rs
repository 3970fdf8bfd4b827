pub mod multi;
pub mod ngram;

use std::fmt::Debug;

use crate::error::{Result, VectorizerError};
use crate::vectorizer::corpus::DocumentFrequency;
use crate::vectorizer::document::{Document, TermId};

/// Tokenizer capability
///
/// A tokenizer owns a local, 0-based term id space of `vocabulary_size()`
/// ids and writes `local id + offset` into the document through
/// `Document::increment`, forwarding `doc_freq` so first occurrences are
/// counted corpus-wide.
///
/// `vocabulary_size` may be fixed up front or grow while tokenizing; callers
/// read it after `tokenize` returns. Every id a tokenizer emits must be
/// below `offset + vocabulary_size()`.
///
/// Implementations are shared across threads when a corpus is tokenized in
/// parallel.
pub trait Tokenizer: Send + Sync + Debug {
    fn tokenize(
        &self,
        document: &mut Document,
        offset: TermId,
        doc_freq: Option<&DocumentFrequency>,
    ) -> Result<()>;

    fn vocabulary_size(&self) -> u64;
}

impl<T> Tokenizer for Box<T>
where
    T: Tokenizer + ?Sized,
{
    fn tokenize(
        &self,
        document: &mut Document,
        offset: TermId,
        doc_freq: Option<&DocumentFrequency>,
    ) -> Result<()> {
        (**self).tokenize(document, offset, doc_freq)
    }

    fn vocabulary_size(&self) -> u64 {
        (**self).vocabulary_size()
    }
}

/// `offset + vocabulary_size`, or `TermIdOverflow`.
pub(crate) fn advance(offset: TermId, vocabulary_size: u64) -> Result<TermId> {
    offset
        .checked_add(vocabulary_size)
        .ok_or(VectorizerError::TermIdOverflow {
            offset,
            vocabulary_size,
        })
}
