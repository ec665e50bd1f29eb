//! Matching batch responses back to input rows.

use std::collections::HashMap;

use crate::client::{TranscriptConsequenceSummary, VariantAnnotation};
use crate::location::GenomicLocation;

/// Outcome of looking up one row in a batch response
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    /// The service returned a consequence summary for the row
    Found {
        annotation: &'a VariantAnnotation,
        summary: &'a TranscriptConsequenceSummary,
    },
    /// The location is known but carries no consequence summary
    FoundWithoutSummary(&'a VariantAnnotation),
    /// No annotation matches the row's location
    NotFound,
}

impl Lookup<'_> {
    /// Whether the row gets formatted annotation cells
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found { .. })
    }
}

/// Batch response indexed by canonical location key
#[derive(Debug, Default)]
pub struct AnnotationIndex {
    by_key: HashMap<String, VariantAnnotation>,
}

impl AnnotationIndex {
    /// Index annotations by the key of their summary location.
    ///
    /// Later annotations for the same key replace earlier ones. Annotations
    /// without a summary location cannot be keyed and are dropped.
    pub fn new(annotations: Vec<VariantAnnotation>) -> Self {
        let mut by_key = HashMap::with_capacity(annotations.len());
        for annotation in annotations {
            match annotation.genomic_location().map(GenomicLocation::key) {
                Some(key) => {
                    by_key.insert(key, annotation);
                }
                None => tracing::debug!(
                    query = annotation.original_variant_query.as_deref().unwrap_or(""),
                    "dropping annotation without genomic location"
                ),
            }
        }
        Self { by_key }
    }

    /// Look up a row's location
    pub fn lookup(&self, location: &GenomicLocation) -> Lookup<'_> {
        match self.by_key.get(&location.key()) {
            Some(annotation) => match annotation.transcript_consequence_summary() {
                Some(summary) => Lookup::Found {
                    annotation,
                    summary,
                },
                None => Lookup::FoundWithoutSummary(annotation),
            },
            None => Lookup::NotFound,
        }
    }

    /// Number of keyed annotations
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Whether no annotation could be keyed
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(gene: &str) -> TranscriptConsequenceSummary {
        TranscriptConsequenceSummary {
            hugo_gene_symbol: Some(gene.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_lookup_variants() {
        let found = GenomicLocation::new("7", 140453136, 140453136, "A", "T");
        let bare = GenomicLocation::new("17", 7577120, 7577120, "C", "T");
        let missing = GenomicLocation::new("1", 1, 1, "A", "G");

        let index = AnnotationIndex::new(vec![
            VariantAnnotation::with_summary(found.clone(), Some(summary("BRAF"))),
            VariantAnnotation::with_summary(bare.clone(), None),
        ]);
        assert_eq!(index.len(), 2);

        match index.lookup(&found) {
            Lookup::Found { summary, .. } => {
                assert_eq!(summary.hugo_gene_symbol.as_deref(), Some("BRAF"))
            }
            other => panic!("expected Found, got {:?}", other),
        }
        assert!(matches!(
            index.lookup(&bare),
            Lookup::FoundWithoutSummary(_)
        ));
        assert_eq!(index.lookup(&missing), Lookup::NotFound);
    }

    #[test]
    fn test_later_duplicate_wins() {
        let location = GenomicLocation::new("7", 140453136, 140453136, "A", "T");
        let index = AnnotationIndex::new(vec![
            VariantAnnotation::with_summary(location.clone(), Some(summary("FIRST"))),
            VariantAnnotation::with_summary(location.clone(), Some(summary("SECOND"))),
        ]);
        assert_eq!(index.len(), 1);
        match index.lookup(&location) {
            Lookup::Found { summary, .. } => {
                assert_eq!(summary.hugo_gene_symbol.as_deref(), Some("SECOND"))
            }
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn test_unkeyed_annotations_dropped() {
        let index = AnnotationIndex::new(vec![VariantAnnotation::default()]);
        assert!(index.is_empty());
    }

    #[test]
    fn test_lookup_uses_aliased_chromosome() {
        let location = GenomicLocation::new("X", 100, 100, "A", "T");
        let index =
            AnnotationIndex::new(vec![VariantAnnotation::with_summary(location, Some(summary("G")))]);
        let row = GenomicLocation::from_maf_fields("23", "100", "100", "A", "T");
        assert!(index.lookup(&row).is_found());
    }
}
