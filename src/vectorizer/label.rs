use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::num::NonZeroU32;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VectorizerError};
use crate::utils::datastruct::InvertibleMap;

/// Category label <-> numeric class id mapping
///
/// Ids are positive and assigned on first sight: a new category receives the
/// smallest positive id not used yet. The mapping only grows, so the id of a
/// category never changes once assigned. A stored id of 0 fails to load.
///
/// Exporting learning data mutates the mapping; share one instance per corpus
/// and assign labels from a single writer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelMapping {
    labels: InvertibleMap<Box<str>, NonZeroU32>,
    /// every id in `1..next_free` is taken
    #[serde(skip)]
    next_free: u32,
}

impl LabelMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for `category`, assigning the next free id when it is new.
    ///
    /// # Errors
    /// * `LabelsExhausted` - every id up to `u32::MAX` is taken
    pub fn get_or_assign(&mut self, category: &str) -> Result<NonZeroU32> {
        if let Some(&id) = self.labels.get_by_key(category) {
            return Ok(id);
        }
        let mut id = NonZeroU32::new(self.next_free).unwrap_or(NonZeroU32::MIN);
        while self.labels.contains_value(&id) {
            id = id.checked_add(1).ok_or(VectorizerError::LabelsExhausted)?;
        }
        self.labels.insert(category.into(), id);
        self.next_free = id.get().saturating_add(1);
        Ok(id)
    }

    /// Pin `category` to `id`. Returns false when either is already mapped
    /// or `id` is 0.
    pub fn insert(&mut self, category: &str, id: u32) -> bool {
        NonZeroU32::new(id).is_some_and(|id| self.labels.insert(category.into(), id))
    }

    pub fn id(&self, category: &str) -> Option<NonZeroU32> {
        self.labels.get_by_key(category).copied()
    }

    pub fn label(&self, id: u32) -> Option<&str> {
        let id = NonZeroU32::new(id)?;
        self.labels.get_by_value(&id).map(|label| &**label)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// (category, id) pairs in assignment order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.labels.iter().map(|(label, &id)| (&**label, id.get()))
    }

    /// Write the mapping as CBOR.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_cbor::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Read a mapping written by `save`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_cbor::from_reader(reader)?)
    }
}
