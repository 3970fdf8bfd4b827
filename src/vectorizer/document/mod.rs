pub mod loader;

use std::borrow::Cow;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use ahash::RandomState;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VectorizerError};
use crate::vectorizer::compute::compare;
use crate::vectorizer::corpus::DocumentFrequency;

/// Integer handle for a vocabulary entry.
pub type TermId = u64;

/// Sparse term id -> occurrence count map of one document.
/// A term that never occurred has no entry; stored counts are never zero.
pub type FrequencyMap = HashMap<TermId, u64, RandomState>;

/// Document struct
/// A single document of a corpus, represented as a sparse term frequency map.
///
/// It manages:
/// - The source path, with the file name and category derived from it
/// - The occurrence count of each term id
/// - The total number of counted tokens (`length`)
///
/// The category is the name of the directory directly containing the file,
/// e.g. `corpus/sports/article1.txt` belongs to `sports`.
///
/// # Examples
/// ```
/// use tf_doc_vectorizer::Document;
/// let mut doc = Document::new("corpus/sports/article1.txt").unwrap();
/// doc.increment(5, 2, None).unwrap();
/// doc.increment(5, 3, None).unwrap();
///
/// assert_eq!(doc.name(), "article1.txt");
/// assert_eq!(doc.category(), Some("sports"));
/// assert_eq!(doc.frequency(5), 5);
/// assert_eq!(doc.length(), 5);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(try_from = "DocumentData")]
pub struct Document {
    path: String,
    name: String,
    category: Option<String>,
    /// in-memory text, read instead of the file at `path` when present
    #[serde(skip)]
    content: Option<Arc<str>>,
    frequencies: FrequencyMap,
    length: u64,
}

impl Document {
    /// Create an empty document for `path`.
    ///
    /// Fails with `InvalidPath` when the path has no file name (empty, or
    /// ending in `/`). A path without a parent directory is accepted; its
    /// category is `None`.
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let name = Self::name_of(&path);
        if name.is_empty() {
            return Err(VectorizerError::InvalidPath {
                path,
                reason: "no file name",
            });
        }
        let name = name.to_string();
        let category = Self::category_of(&path).map(str::to_string);
        Ok(Self {
            path,
            name,
            category,
            content: None,
            frequencies: FrequencyMap::default(),
            length: 0,
        })
    }

    /// Create an empty document for `path` that tokenizes `content`
    /// instead of reading the file.
    pub fn with_content(path: impl Into<String>, content: impl Into<Arc<str>>) -> Result<Self> {
        let mut doc = Self::new(path)?;
        doc.content = Some(content.into());
        Ok(doc)
    }

    /// Substring after the last `/`.
    pub fn name_of(path: &str) -> &str {
        let start = path.rfind('/').map_or(0, |idx| idx + 1);
        &path[start..]
    }

    /// Name of the directory containing the file, if there is one.
    pub fn category_of(path: &str) -> Option<&str> {
        let idx = path.rfind('/')?;
        let category = Self::name_of(&path[..idx]);
        (!category.is_empty()).then_some(category)
    }

    /// Empty copy sharing path, name, category and content. When there is no
    /// in-memory content the file is read once here, so every tokenizer run
    /// against the copy shares the same text. An unreadable file is left for
    /// the tokenizer to report.
    pub(crate) fn detached_with_text(&self) -> Self {
        let mut doc = self.detached();
        if doc.content.is_none() {
            doc.content = fs::read_to_string(&self.path).ok().map(Arc::from);
        }
        doc
    }

    /// Empty copy sharing path, name, category and content.
    pub(crate) fn detached(&self) -> Self {
        Self {
            path: self.path.clone(),
            name: self.name.clone(),
            category: self.category.clone(),
            content: self.content.clone(),
            frequencies: FrequencyMap::default(),
            length: 0,
        }
    }
}

/// Frequency map updates
impl Document {
    /// Count `amount` more occurrences of `term`.
    ///
    /// The first occurrence of a term in this document bumps its entry in
    /// `doc_freq` by exactly one; later occurrences leave the counter alone.
    /// A zero amount is a no-op: it neither creates an entry nor counts
    /// towards document frequency.
    ///
    /// # Arguments
    /// * `term` - term id
    /// * `amount` - number of occurrences
    /// * `doc_freq` - optional corpus-wide document frequency counter
    ///
    /// # Errors
    /// * `CountOverflow` - `length` would exceed `u64::MAX`; nothing is changed
    #[inline]
    pub fn increment(
        &mut self,
        term: TermId,
        amount: u64,
        doc_freq: Option<&DocumentFrequency>,
    ) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        // every count is bounded by length, so only length needs the check
        let length = self
            .length
            .checked_add(amount)
            .ok_or(VectorizerError::CountOverflow { term, amount })?;
        match self.frequencies.entry(term) {
            Entry::Occupied(mut entry) => *entry.get_mut() += amount,
            Entry::Vacant(entry) => {
                entry.insert(amount);
                if let Some(doc_freq) = doc_freq {
                    doc_freq.bump(term);
                }
            }
        }
        self.length = length;
        Ok(())
    }
}

/// Accessors
impl Document {
    /// Occurrence count of `term`, 0 when absent.
    #[inline]
    pub fn frequency(&self, term: TermId) -> u64 {
        self.frequencies.get(&term).copied().unwrap_or(0)
    }

    #[inline]
    pub fn frequencies(&self) -> &FrequencyMap {
        &self.frequencies
    }

    /// Total number of counted tokens.
    #[inline]
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Number of distinct terms.
    #[inline]
    pub fn unique_terms(&self) -> usize {
        self.frequencies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Category, or `InvalidPath` when the path has no parent directory.
    pub(crate) fn required_category(&self) -> Result<&str> {
        self.category().ok_or_else(|| VectorizerError::InvalidPath {
            path: self.path.clone(),
            reason: "no parent directory to use as category",
        })
    }

    /// Raw text of the document: the in-memory content when present,
    /// otherwise the contents of the file at `path`.
    pub fn text(&self) -> Result<Cow<'_, str>> {
        match &self.content {
            Some(content) => Ok(Cow::Borrowed(content.as_ref())),
            None => Ok(Cow::Owned(fs::read_to_string(&self.path)?)),
        }
    }
}

/// Serialized form of a `Document`. Name and category are derived from
/// `path` again, and counts must be positive and add up to `length`.
#[derive(Deserialize)]
struct DocumentData {
    path: String,
    #[serde(default)]
    frequencies: FrequencyMap,
    #[serde(default)]
    length: u64,
}

impl TryFrom<DocumentData> for Document {
    type Error = VectorizerError;

    fn try_from(data: DocumentData) -> Result<Self> {
        let mut doc = Document::new(data.path)?;
        let mut sum = 0u64;
        for (&term, &count) in &data.frequencies {
            if count == 0 {
                return Err(VectorizerError::MalformedDocument {
                    path: doc.path,
                    reason: format!("term {term} has a zero count"),
                });
            }
            sum = sum.checked_add(count).ok_or(VectorizerError::CountOverflow { term, amount: count })?;
        }
        if sum != data.length {
            return Err(VectorizerError::MalformedDocument {
                path: doc.path,
                reason: format!("length {} does not match the count total {sum}", data.length),
            });
        }
        doc.frequencies = data.frequencies;
        doc.length = sum;
        Ok(doc)
    }
}

/// Similarity between documents
impl Document {
    /// Cosine similarity of the two frequency maps.
    pub fn cosine_similarity(a: &Document, b: &Document) -> f64 {
        compare::cosine_similarity(&a.frequencies, &b.frequencies)
    }

    /// Jaccard similarity of the two term sets.
    pub fn jaccard_similarity(a: &Document, b: &Document) -> f64 {
        compare::jaccard_similarity(&a.frequencies, &b.frequencies)
    }
}

impl Document {
    /// One document per non-empty line of `list_file`, at `prefix/line`.
    pub fn load_docs(list_file: impl AsRef<Path>, prefix: &str) -> Result<Vec<Document>> {
        loader::load_docs(list_file, prefix)
    }
}
