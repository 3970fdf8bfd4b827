use std::io::Write;
use std::num::NonZeroU32;

use rayon::prelude::*;
use tracing::info;

use crate::error::Result;
use crate::vectorizer::corpus::DocumentFrequency;
use crate::vectorizer::document::Document;
use crate::vectorizer::label::LabelMapping;
use crate::vectorizer::tokenizer::Tokenizer;

/// Tokenize every document of a corpus in parallel.
///
/// Each document is owned by exactly one worker; the only shared state is
/// `doc_freq`, which takes concurrent updates. Every successfully tokenized
/// document is registered with `doc_freq`. The first error aborts the pass.
pub fn tokenize_corpus<T>(
    docs: &mut [Document],
    tokenizer: &T,
    doc_freq: Option<&DocumentFrequency>,
) -> Result<()>
where
    T: Tokenizer + ?Sized,
{
    info!(docs = docs.len(), vocabulary_size = tokenizer.vocabulary_size(), "tokenizing corpus");
    docs.par_iter_mut().try_for_each(|doc| -> Result<()> {
        tokenizer.tokenize(doc, 0, doc_freq)?;
        if let Some(doc_freq) = doc_freq {
            doc_freq.add_doc();
        }
        Ok(())
    })?;
    if let Some(doc_freq) = doc_freq {
        info!(docs = doc_freq.get_doc_num(), terms = doc_freq.vocab_size(), "corpus tokenized");
    }
    Ok(())
}

/// Learning-data lines for `docs`, in order.
///
/// Labels are assigned serially in document order, so ids are deterministic
/// for a given corpus; lines are then rendered in parallel.
pub fn learning_data_lines(
    docs: &[Document],
    mapping: &mut LabelMapping,
    zero_indexed: bool,
) -> Result<Vec<String>> {
    let labels = docs
        .iter()
        .map(|doc| mapping.get_or_assign(doc.required_category()?))
        .collect::<Result<Vec<NonZeroU32>>>()?;

    Ok(docs
        .par_iter()
        .zip(labels.par_iter())
        .map(|(doc, &label)| doc.render_learning_line(label, zero_indexed))
        .collect())
}

/// Write the learning data of `docs` to `out`, one line per document.
pub fn write_learning_data<W: Write>(
    docs: &[Document],
    mapping: &mut LabelMapping,
    zero_indexed: bool,
    mut out: W,
) -> Result<()> {
    for line in learning_data_lines(docs, mapping, zero_indexed)? {
        out.write_all(line.as_bytes())?;
    }
    out.flush()?;
    Ok(())
}
