//! Corpus pass configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, VectorizerError};
use crate::vectorizer::tokenizer::multi::MultiTokenizer;
use crate::vectorizer::tokenizer::ngram::HashingNgramTokenizer;

/// Settings for one load -> tokenize -> export pass.
///
/// Missing fields in a JSON file fall back to `Default`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// File listing one document path per line.
    pub list_file: PathBuf,
    /// Prepended (with `/`) to every listed path.
    pub prefix: String,
    /// One hashing n-gram tokenizer per order, in this order.
    pub ngram_orders: Vec<usize>,
    /// Id space of each n-gram tokenizer.
    pub hash_buckets: u64,
    /// Emit class labels starting at 0 instead of 1.
    pub zero_indexed_labels: bool,
    /// CBOR label mapping, loaded if present and saved after export.
    pub label_mapping: Option<PathBuf>,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            list_file: PathBuf::from("corpus.list"),
            prefix: ".".to_string(),
            ngram_orders: vec![1, 2],
            hash_buckets: 1 << 18,
            zero_indexed_labels: false,
            label_mapping: None,
        }
    }
}

impl VectorizerConfig {
    /// Read and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| VectorizerError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ngram_orders.is_empty() {
            return Err(VectorizerError::Config("ngram_orders is empty".to_string()));
        }
        if self.ngram_orders.contains(&0) {
            return Err(VectorizerError::Config("ngram_orders contains 0".to_string()));
        }
        if self.hash_buckets == 0 {
            return Err(VectorizerError::Config("hash_buckets must be positive".to_string()));
        }
        Ok(())
    }

    /// One `HashingNgramTokenizer` per configured order.
    pub fn build_tokenizer(&self) -> Result<MultiTokenizer> {
        let mut multi = MultiTokenizer::default();
        for &order in &self.ngram_orders {
            multi.push(Box::new(HashingNgramTokenizer::new(order, self.hash_buckets)?))?;
        }
        Ok(multi)
    }
}
