use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VectorizerError};
use crate::vectorizer::document::{Document, FrequencyMap, TermId};
use crate::vectorizer::label::LabelMapping;

/// Classifier-ready export (libsvm / liblinear line format)
impl Document {
    /// Render this document as one learning-data line:
    /// `<label> <id+1>:<count> <id+1>:<count> ...\n`
    ///
    /// Feature indices are term ids shifted by one (index 0 is reserved by
    /// the consumers) in ascending order. The label is the category's id in
    /// `mapping`, assigned if the category is new; with `zero_indexed` it is
    /// decremented so classes start at 0 (sLDA) instead of 1 (liblinear).
    ///
    /// # Errors
    /// * `InvalidPath` - the document path has no category
    /// * `LabelsExhausted` - the category is new and no id is left
    pub fn learning_data(&self, mapping: &mut LabelMapping, zero_indexed: bool) -> Result<String> {
        let label = mapping.get_or_assign(self.required_category()?)?;
        Ok(self.render_learning_line(label, zero_indexed))
    }

    pub(crate) fn render_learning_line(&self, label: NonZeroU32, zero_indexed: bool) -> String {
        let mut features: Vec<(TermId, u64)> = self
            .frequencies()
            .iter()
            .map(|(&term, &count)| (term, count))
            .collect();
        features.sort_unstable_by_key(|&(term, _)| term);

        let label = if zero_indexed { label.get() - 1 } else { label.get() };
        let mut line = label.to_string();
        for (term, count) in features {
            line.push(' ');
            line.push_str(&(u128::from(term) + 1).to_string());
            line.push(':');
            line.push_str(&count.to_string());
        }
        line.push('\n');
        line
    }
}

/// One parsed learning-data line.
///
/// `features` hold term ids (the +1 shift undone) in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningRecord {
    pub label: u32,
    pub features: Vec<(TermId, u64)>,
}

impl LearningRecord {
    /// Parse `<label> <idx>:<count> ...`.
    ///
    /// Indices must be 1-based and strictly ascending, counts positive.
    pub fn parse(line: &str) -> Result<Self> {
        let malformed = |reason: String| VectorizerError::MalformedLearningData {
            line: line.to_string(),
            reason,
        };

        let mut fields = line.split_whitespace();
        let label = fields
            .next()
            .ok_or_else(|| malformed("missing label".to_string()))?;
        let label = label
            .parse::<u32>()
            .map_err(|e| malformed(format!("label {label:?}: {e}")))?;

        let mut features: Vec<(TermId, u64)> = Vec::new();
        for field in fields {
            let (index, count) = field
                .split_once(':')
                .ok_or_else(|| malformed(format!("feature {field:?} is not idx:count")))?;
            let index = index
                .parse::<u64>()
                .map_err(|e| malformed(format!("index {index:?}: {e}")))?;
            let count = count
                .parse::<u64>()
                .map_err(|e| malformed(format!("count {count:?}: {e}")))?;
            if index == 0 {
                return Err(malformed("feature index 0 is reserved".to_string()));
            }
            if count == 0 {
                return Err(malformed(format!("zero count for index {index}")));
            }
            let term = index - 1;
            if features.last().is_some_and(|&(last, _)| last >= term) {
                return Err(malformed(format!("index {index} is not ascending")));
            }
            features.push((term, count));
        }
        Ok(Self { label, features })
    }

    /// Total token count of the record.
    pub fn length(&self) -> u64 {
        self.features.iter().map(|&(_, count)| count).sum()
    }

    pub fn frequencies(&self) -> FrequencyMap {
        self.features.iter().copied().collect()
    }
}
