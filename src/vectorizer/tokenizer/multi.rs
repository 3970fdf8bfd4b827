use std::ops::Range;

use tracing::debug;

use crate::error::{Result, VectorizerError};
use crate::vectorizer::corpus::DocumentFrequency;
use crate::vectorizer::document::{Document, TermId};
use crate::vectorizer::tokenizer::{advance, Tokenizer};

/// Several tokenizers writing into one term id space
///
/// Useful for combined feature sets, e.g. word n-grams plus parse tree
/// rewrite rules. Tokenizer `i` gets the id range that starts where the
/// range of tokenizer `i - 1` ends, so ids of different components never
/// collide and every term of a document can be traced back to the component
/// that produced it (`source_of`).
///
/// Ranges are fixed when a component is added, from the vocabulary size it
/// declares at that moment. Every document of a corpus is therefore laid out
/// the same way, and a component that later emits ids past its declared size
/// is rejected instead of shifting the components after it.
///
/// `MultiTokenizer` is a `Tokenizer` itself, so it nests.
#[derive(Debug, Default)]
pub struct MultiTokenizer {
    tokenizers: Vec<Box<dyn Tokenizer>>,
    /// id range of each component relative to offset 0
    ranges: Vec<Range<TermId>>,
}

impl MultiTokenizer {
    /// Combine `tokenizers` in order.
    ///
    /// # Errors
    /// * `TermIdOverflow` - the declared sizes add up past `u64::MAX`
    pub fn new(tokenizers: Vec<Box<dyn Tokenizer>>) -> Result<Self> {
        let mut multi = Self {
            tokenizers: Vec::with_capacity(tokenizers.len()),
            ranges: Vec::with_capacity(tokenizers.len()),
        };
        for tokenizer in tokenizers {
            multi.push(tokenizer)?;
        }
        Ok(multi)
    }

    /// Append a component after the existing ones. Nothing is added when its
    /// range would overflow the id space.
    pub fn push(&mut self, tokenizer: Box<dyn Tokenizer>) -> Result<()> {
        let start = self.ranges.last().map_or(0, |range| range.end);
        let end = advance(start, tokenizer.vocabulary_size())?;
        self.ranges.push(start..end);
        self.tokenizers.push(tokenizer);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tokenizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokenizers.is_empty()
    }

    /// Id range of each component, starting at `base`.
    pub fn partition(&self, base: TermId) -> Result<Vec<Range<TermId>>> {
        self.ranges
            .iter()
            .map(|range| -> Result<Range<TermId>> {
                let size = range.end - range.start;
                let start = advance(base, range.start)?;
                Ok(start..advance(start, size)?)
            })
            .collect()
    }

    /// Index of the component whose range holds `term` (base offset 0).
    pub fn source_of(&self, term: TermId) -> Option<usize> {
        self.ranges.iter().position(|range| range.contains(&term))
    }

    /// Tokenize `document` with every component and return the id range each
    /// one was given.
    ///
    /// Components run in order, each into an empty scratch copy of the
    /// document at its own offset; a file-backed document is read once and
    /// the text shared by all of them. A component whose ids fall outside its
    /// range fails the whole call with `VocabularySizeMismatch` and `document`
    /// is left untouched. Once all components pass, their counts are merged
    /// through `Document::increment`, so `doc_freq` sees one bump per new term.
    pub fn tokenize_partitioned(
        &self,
        document: &mut Document,
        base: TermId,
        doc_freq: Option<&DocumentFrequency>,
    ) -> Result<Vec<Range<TermId>>> {
        let ranges = self.partition(base)?;
        let source = document.detached_with_text();

        let mut parts = Vec::with_capacity(ranges.len());
        for (index, (tokenizer, range)) in self.tokenizers.iter().zip(&ranges).enumerate() {
            let mut scratch = source.detached();
            tokenizer.tokenize(&mut scratch, range.start, None)?;

            if let Some(term) = scratch
                .frequencies()
                .keys()
                .copied()
                .filter(|term| !range.contains(term))
                .max()
            {
                return Err(VectorizerError::VocabularySizeMismatch {
                    tokenizer: index,
                    term,
                    offset: range.start,
                    vocabulary_size: range.end - range.start,
                });
            }
            debug!(
                tokenizer = index,
                offset = range.start,
                vocabulary_size = range.end - range.start,
                terms = scratch.unique_terms(),
                path = document.path(),
                "component tokenized"
            );
            parts.push(scratch);
        }

        // check the merged length up front so a failure leaves `document` as is
        parts.iter().zip(&ranges).try_fold(document.length(), |length, (scratch, range)| {
            length.checked_add(scratch.length()).ok_or(VectorizerError::CountOverflow {
                term: range.start,
                amount: scratch.length(),
            })
        })?;
        for scratch in &parts {
            for (&term, &count) in scratch.frequencies() {
                document.increment(term, count, doc_freq)?;
            }
        }
        Ok(ranges)
    }
}

impl Tokenizer for MultiTokenizer {
    fn tokenize(
        &self,
        document: &mut Document,
        offset: TermId,
        doc_freq: Option<&DocumentFrequency>,
    ) -> Result<()> {
        self.tokenize_partitioned(document, offset, doc_freq).map(|_| ())
    }

    /// Sum of the component sizes declared when they were added.
    fn vocabulary_size(&self) -> u64 {
        self.ranges.last().map_or(0, |range| range.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorizer::tokenizer::ngram::HashingNgramTokenizer;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Emits fixed local ids, ignoring the text.
    #[derive(Debug)]
    struct FixedTokenizer {
        emits: Vec<(TermId, u64)>,
        declared: u64,
    }

    impl FixedTokenizer {
        fn boxed(emits: &[(TermId, u64)], declared: u64) -> Box<dyn Tokenizer> {
            Box::new(Self {
                emits: emits.to_vec(),
                declared,
            })
        }
    }

    impl Tokenizer for FixedTokenizer {
        fn tokenize(
            &self,
            document: &mut Document,
            offset: TermId,
            doc_freq: Option<&DocumentFrequency>,
        ) -> Result<()> {
            for &(local, count) in &self.emits {
                document.increment(offset + local, count, doc_freq)?;
            }
            Ok(())
        }

        fn vocabulary_size(&self) -> u64 {
            self.declared
        }
    }

    /// Vocabulary that grows as ids are handed out.
    #[derive(Debug, Default)]
    struct GrowingTokenizer {
        seen: AtomicU64,
    }

    impl GrowingTokenizer {
        fn starting_at(size: u64) -> Self {
            Self { seen: AtomicU64::new(size) }
        }
    }

    impl Tokenizer for GrowingTokenizer {
        fn tokenize(
            &self,
            document: &mut Document,
            offset: TermId,
            doc_freq: Option<&DocumentFrequency>,
        ) -> Result<()> {
            // hands out the newest id, then grows
            let local = self.seen.fetch_add(1, Ordering::Relaxed) - 1;
            document.increment(offset + local, 1, doc_freq)?;
            Ok(())
        }

        fn vocabulary_size(&self) -> u64 {
            self.seen.load(Ordering::Relaxed)
        }
    }

    #[test]
    fn components_get_consecutive_ranges() {
        let multi = MultiTokenizer::new(vec![
            FixedTokenizer::boxed(&[(0, 1), (2, 5)], 3),
            FixedTokenizer::boxed(&[(0, 2), (1, 1)], 2),
            FixedTokenizer::boxed(&[(0, 7)], 10),
        ])
        .unwrap();
        let doc_freq = DocumentFrequency::new();
        let mut doc = Document::new("c/a.txt").unwrap();
        let ranges = multi.tokenize_partitioned(&mut doc, 0, Some(&doc_freq)).unwrap();

        assert_eq!(ranges, vec![0..3, 3..5, 5..15]);
        assert_eq!(doc.frequency(0), 1);
        assert_eq!(doc.frequency(2), 5);
        assert_eq!(doc.frequency(3), 2);
        assert_eq!(doc.frequency(4), 1);
        assert_eq!(doc.frequency(5), 7);
        assert_eq!(doc.length(), 16);
        assert_eq!(doc_freq.vocab_size(), 5);
        assert_eq!(multi.vocabulary_size(), 15);
        assert_eq!(multi.source_of(4), Some(1));
        assert_eq!(multi.source_of(14), Some(2));
        assert_eq!(multi.source_of(15), None);
    }

    #[test]
    fn understated_vocabulary_is_a_contract_violation() {
        let multi = MultiTokenizer::new(vec![
            FixedTokenizer::boxed(&[(0, 1)], 1),
            FixedTokenizer::boxed(&[(0, 1), (4, 1)], 2),
            FixedTokenizer::boxed(&[(0, 1)], 1),
        ])
        .unwrap();
        let doc_freq = DocumentFrequency::new();
        let mut doc = Document::new("c/a.txt").unwrap();
        let err = multi.tokenize(&mut doc, 0, Some(&doc_freq)).unwrap_err();

        match err {
            VectorizerError::VocabularySizeMismatch {
                tokenizer,
                term,
                offset,
                vocabulary_size,
            } => {
                assert_eq!((tokenizer, term, offset, vocabulary_size), (1, 5, 1, 2));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(doc.is_empty());
        assert_eq!(doc_freq.vocab_size(), 0);
    }

    #[test]
    fn ids_below_the_offset_are_rejected() {
        #[derive(Debug)]
        struct IgnoresOffset;
        impl Tokenizer for IgnoresOffset {
            fn tokenize(&self, document: &mut Document, _: TermId, _: Option<&DocumentFrequency>) -> Result<()> {
                document.increment(0, 1, None)?;
                Ok(())
            }
            fn vocabulary_size(&self) -> u64 {
                1
            }
        }

        let multi =
            MultiTokenizer::new(vec![FixedTokenizer::boxed(&[(0, 1)], 1), Box::new(IgnoresOffset)]).unwrap();
        let mut doc = Document::new("c/a.txt").unwrap();
        let err = multi.tokenize(&mut doc, 0, None).unwrap_err();
        assert!(matches!(err, VectorizerError::VocabularySizeMismatch { tokenizer: 1, term: 0, .. }));
    }

    #[test]
    fn ranges_are_fixed_when_components_are_added() {
        let multi = MultiTokenizer::new(vec![
            Box::new(GrowingTokenizer::starting_at(1)),
            FixedTokenizer::boxed(&[(0, 1)], 1),
        ])
        .unwrap();
        assert_eq!(multi.vocabulary_size(), 2);

        // first document stays within the declared size
        let mut a = Document::new("c/a.txt").unwrap();
        let ranges = multi.tokenize_partitioned(&mut a, 0, None).unwrap();
        assert_eq!(ranges, vec![0..1, 1..2]);
        assert_eq!(a.frequency(0), 1);
        assert_eq!(a.frequency(1), 1);

        // second document: the component grew and would collide with the next one
        let mut b = Document::new("c/b.txt").unwrap();
        let err = multi.tokenize_partitioned(&mut b, 0, None).unwrap_err();
        assert!(matches!(
            err,
            VectorizerError::VocabularySizeMismatch { tokenizer: 0, term: 1, offset: 0, vocabulary_size: 1 }
        ));
        assert!(b.is_empty());
        assert_eq!(multi.vocabulary_size(), 2);
        assert_eq!(multi.source_of(1), Some(1));
        assert_eq!(multi.partition(0).unwrap(), vec![0..1, 1..2]);
    }

    #[test]
    fn every_document_gets_the_same_ranges() {
        let multi = MultiTokenizer::new(vec![
            FixedTokenizer::boxed(&[(1, 1)], 2),
            FixedTokenizer::boxed(&[(0, 3)], 4),
        ])
        .unwrap();
        let mut a = Document::new("c/a.txt").unwrap();
        let mut b = Document::new("c/b.txt").unwrap();
        let first = multi.tokenize_partitioned(&mut a, 10, None).unwrap();
        let second = multi.tokenize_partitioned(&mut b, 10, None).unwrap();
        assert_eq!(first, vec![10..12, 12..16]);
        assert_eq!(first, second);
        assert_eq!(a.frequencies(), b.frequencies());
    }

    #[test]
    fn components_share_one_read_of_the_file() {
        /// Reads the text on every call; fails once the file is gone.
        #[derive(Debug)]
        struct RemovesFile(std::path::PathBuf);
        impl Tokenizer for RemovesFile {
            fn tokenize(&self, document: &mut Document, offset: TermId, _: Option<&DocumentFrequency>) -> Result<()> {
                let words = document.text()?.split_whitespace().count() as u64;
                let _ = std::fs::remove_file(&self.0);
                document.increment(offset, words, None)
            }
            fn vocabulary_size(&self) -> u64 {
                1
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "one two three").unwrap();
        let multi = MultiTokenizer::new(vec![
            Box::new(RemovesFile(path.clone())),
            Box::new(RemovesFile(path.clone())),
        ])
        .unwrap();

        let mut doc = Document::new(path.to_str().unwrap()).unwrap();
        multi.tokenize(&mut doc, 0, None).unwrap();
        assert_eq!(doc.frequency(0), 3);
        assert_eq!(doc.frequency(1), 3);

        // unreadable file surfaces from the component that needs the text
        let mut missing = Document::new(path.to_str().unwrap()).unwrap();
        assert!(matches!(multi.tokenize(&mut missing, 0, None), Err(VectorizerError::Io(_))));
    }

    #[test]
    fn length_overflow_leaves_the_document_untouched() {
        let multi = MultiTokenizer::new(vec![
            FixedTokenizer::boxed(&[(0, u64::MAX)], 1),
            FixedTokenizer::boxed(&[(0, 1)], 1),
        ])
        .unwrap();
        let mut doc = Document::new("c/a.txt").unwrap();
        assert!(matches!(
            multi.tokenize(&mut doc, 0, None),
            Err(VectorizerError::CountOverflow { .. })
        ));
        assert!(doc.is_empty());
    }

    #[test]
    fn doc_freq_counts_each_term_once_per_document() {
        let multi = MultiTokenizer::new(vec![
            Box::new(HashingNgramTokenizer::new(1, 1024).unwrap()),
            Box::new(HashingNgramTokenizer::new(2, 1024).unwrap()),
        ])
        .unwrap();
        let doc_freq = DocumentFrequency::new();
        for path in ["c/a.txt", "c/b.txt"] {
            let mut doc = Document::with_content(path, "to be or not to be").unwrap();
            multi.tokenize(&mut doc, 0, Some(&doc_freq)).unwrap();
            assert_eq!(doc.length(), 6 + 5);
        }
        assert!(doc_freq.sorted_counts().iter().all(|&(_, count)| count == 2));
        assert!(doc_freq.sorted_counts().iter().any(|&(term, _)| term >= 1024));
    }

    #[test]
    fn nested_multi_tokenizers_offset_as_a_block() {
        let inner = MultiTokenizer::new(vec![
            FixedTokenizer::boxed(&[(1, 1)], 2),
            FixedTokenizer::boxed(&[(0, 1)], 2),
        ])
        .unwrap();
        let outer = MultiTokenizer::new(vec![FixedTokenizer::boxed(&[(0, 1)], 3), Box::new(inner)]).unwrap();
        let mut doc = Document::new("c/a.txt").unwrap();
        let ranges = outer.tokenize_partitioned(&mut doc, 0, None).unwrap();

        assert_eq!(ranges, vec![0..3, 3..7]);
        let mut terms: Vec<TermId> = doc.frequencies().keys().copied().collect();
        terms.sort_unstable();
        assert_eq!(terms, vec![0, 4, 5]);
    }

    #[test]
    fn overflowing_id_space_is_reported() {
        let err = MultiTokenizer::new(vec![
            FixedTokenizer::boxed(&[], u64::MAX),
            FixedTokenizer::boxed(&[], 1),
        ])
        .unwrap_err();
        assert!(matches!(err, VectorizerError::TermIdOverflow { .. }));

        let mut multi = MultiTokenizer::new(vec![FixedTokenizer::boxed(&[], u64::MAX)]).unwrap();
        assert!(multi.push(FixedTokenizer::boxed(&[], 1)).is_err());
        assert_eq!(multi.len(), 1);
        assert_eq!(multi.vocabulary_size(), u64::MAX);

        let mut doc = Document::new("c/a.txt").unwrap();
        assert!(matches!(
            multi.tokenize(&mut doc, 1, None),
            Err(VectorizerError::TermIdOverflow { .. })
        ));
        assert!(multi.partition(1).is_err());
    }

    fn arb_component() -> impl Strategy<Value = (Vec<(TermId, u64)>, u64)> {
        (1u64..50).prop_flat_map(|size| {
            (prop::collection::vec((0..size, 1u64..5), 0..20), Just(size))
        })
    }

    proptest! {
        #[test]
        fn component_terms_are_disjoint(components in prop::collection::vec(arb_component(), 1..6)) {
            let multi = MultiTokenizer::new(
                components
                    .iter()
                    .map(|(emits, size)| FixedTokenizer::boxed(emits, *size))
                    .collect(),
            )
            .unwrap();
            let mut doc = Document::new("c/a.txt").unwrap();
            let ranges = multi.tokenize_partitioned(&mut doc, 0, None).unwrap();

            for pair in ranges.windows(2) {
                prop_assert_eq!(pair[0].end, pair[1].start);
            }
            for (index, (emits, _)) in components.iter().enumerate() {
                for &(local, _) in emits {
                    let term = ranges[index].start + local;
                    prop_assert_eq!(multi.source_of(term), Some(index));
                    prop_assert!(doc.frequency(term) > 0);
                }
            }
            let expected: u64 = components.iter().flat_map(|(emits, _)| emits.iter().map(|&(_, c)| c)).sum();
            prop_assert_eq!(doc.length(), expected);
        }
    }
}
