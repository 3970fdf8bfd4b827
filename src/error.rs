//! Error types for tf-doc-vectorizer.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::vectorizer::document::TermId;

/// Top-level error type.
///
/// Frequency lookups and similarity never produce one of these: absent terms
/// count as zero and degenerate similarity inputs score zero. Only structural
/// contract violations and I/O surface here.
#[derive(Debug, Error)]
pub enum VectorizerError {
    /// The path cannot yield a file name or category.
    #[error("invalid document path {path:?}: {reason}")]
    InvalidPath {
        path: String,
        reason: &'static str,
    },

    /// A tokenizer emitted a term id outside of `[offset, offset + vocabulary_size)`.
    #[error(
        "tokenizer #{tokenizer} emitted term {term} outside its range \
         [{offset}, {offset} + {vocabulary_size})"
    )]
    VocabularySizeMismatch {
        tokenizer: usize,
        term: TermId,
        offset: TermId,
        vocabulary_size: u64,
    },

    /// Combined vocabulary sizes do not fit into the term id space.
    #[error("term id space overflow at offset {offset} (+{vocabulary_size})")]
    TermIdOverflow { offset: TermId, vocabulary_size: u64 },

    /// Counting more occurrences would overflow the document length.
    #[error("count overflow adding {amount} occurrences of term {term}")]
    CountOverflow { term: TermId, amount: u64 },

    /// A serialized document is internally inconsistent.
    #[error("malformed document {path:?}: {reason}")]
    MalformedDocument { path: String, reason: String },

    /// Every positive label id is already taken.
    #[error("label id space exhausted")]
    LabelsExhausted,

    /// The document list file is unreadable or not UTF-8.
    #[error("malformed list file {path:?}: {source}")]
    MalformedListFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A learning-data line could not be parsed.
    #[error("malformed learning data {line:?}: {reason}")]
    MalformedLearningData { line: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("cbor error: {0}")]
    Cbor(#[from] serde_cbor::Error),
}

/// Result type for vectorizer operations.
pub type Result<T> = std::result::Result<T, VectorizerError>;
