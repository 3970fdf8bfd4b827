/// This crate turns documents into sparse term frequency vectors over one
/// shared term id space, fed by any number of tokenizers.
pub mod vectorizer;
pub mod utils;
pub mod config;
pub mod error;

/// Document
/// A single corpus document: its path, the file name and category derived
/// from that path, and a sparse term id -> count map.
///
/// The category is the name of the directory containing the file and serves
/// as the classification label on export.
///
/// Counts only grow through `increment`, which keeps `length` equal to the
/// sum of all counts and reports first occurrences to an optional shared
/// `DocumentFrequency`.
pub use vectorizer::document::{Document, FrequencyMap, TermId};

/// Document Frequency counter
/// Number of documents in which each term occurs, shared by reference across
/// a corpus pass.
///
/// # Thread Safety
/// This struct is thread-safe and can be updated concurrently from multiple
/// threads. Implemented using DashMap and atomics.
pub use vectorizer::corpus::DocumentFrequency;

/// Corpus pass helpers
/// - `tokenize_corpus`: parallel tokenization of a document collection
/// - `learning_data_lines` / `write_learning_data`: classifier-ready export
pub use vectorizer::corpus::pass::{learning_data_lines, tokenize_corpus, write_learning_data};

/// Tokenizer capability and MultiTokenizer
/// A `Tokenizer` writes ids of its own local id space, shifted by an offset,
/// into a `Document`. `MultiTokenizer` chains tokenizers so that their id
/// ranges never overlap.
///
/// `HashingNgramTokenizer` is a word n-gram tokenizer with a fixed, hashed
/// id space.
pub use vectorizer::tokenizer::{multi::MultiTokenizer, ngram::HashingNgramTokenizer, Tokenizer};

/// Similarity functions
/// - Cosine similarity over term counts
/// - Jaccard similarity over term sets
///
/// Both are symmetric and return 0 for empty documents.
pub use vectorizer::compute::compare::{cosine_similarity, jaccard_similarity};

/// Label mapping and learning data
/// `LabelMapping` assigns numeric class ids to categories;
/// `LearningRecord` parses exported lines back.
pub use vectorizer::label::LabelMapping;
pub use vectorizer::learning::LearningRecord;

pub use config::VectorizerConfig;
pub use error::{Result, VectorizerError};
