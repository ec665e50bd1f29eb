//! In-memory annotation client for testing.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use super::{AnnotationClient, LookupOptions, TranscriptConsequenceSummary, VariantAnnotation};
use crate::error::NexusError;
use crate::location::GenomicLocation;

/// Annotation client serving canned annotations.
///
/// Batched calls return the annotations known for the requested locations
/// (unknown locations are omitted, as the service does) and record every
/// request so tests can inspect batching.
#[derive(Debug, Default)]
pub struct MockAnnotationClient {
    by_location: HashMap<String, VariantAnnotation>,
    by_hgvs: HashMap<String, VariantAnnotation>,
    failing_batches: HashSet<usize>,
    always_fail: bool,
    calls: Cell<usize>,
    requests: RefCell<Vec<Vec<GenomicLocation>>>,
}

impl MockAnnotationClient {
    /// Create an empty mock client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an annotation keyed by the location in its summary.
    ///
    /// Annotations without a summary location are ignored.
    pub fn add_annotation(&mut self, annotation: VariantAnnotation) {
        if let Some(location) = annotation.genomic_location() {
            self.by_location.insert(location.key(), annotation);
        }
    }

    /// Add an annotation for `location` with an optional consequence summary.
    pub fn add_location(
        &mut self,
        location: GenomicLocation,
        summary: Option<TranscriptConsequenceSummary>,
    ) {
        self.add_annotation(VariantAnnotation::with_summary(location, summary));
    }

    /// Add an annotation served for an HGVS query.
    pub fn add_variant(&mut self, hgvs: impl Into<String>, annotation: VariantAnnotation) {
        self.by_hgvs.insert(hgvs.into(), annotation);
    }

    /// Make the batched call with this 0-based index fail.
    pub fn fail_batch(&mut self, index: usize) {
        self.failing_batches.insert(index);
    }

    /// Make every call fail.
    pub fn fail_always(&mut self) {
        self.always_fail = true;
    }

    /// Locations sent in each batched call, in call order.
    pub fn requests(&self) -> Vec<Vec<GenomicLocation>> {
        self.requests.borrow().clone()
    }

    /// Number of batched calls made.
    pub fn batch_calls(&self) -> usize {
        self.calls.get()
    }
}

impl AnnotationClient for MockAnnotationClient {
    fn annotate_variant(
        &self,
        hgvs: &str,
        _options: &LookupOptions,
    ) -> Result<VariantAnnotation, NexusError> {
        if self.always_fail {
            return Err(NexusError::lookup("mock failure"));
        }
        self.by_hgvs
            .get(hgvs)
            .cloned()
            .ok_or_else(|| NexusError::lookup(format!("HTTP 404 Not Found for {}", hgvs)))
    }

    fn annotate_genomic_location(
        &self,
        location: &GenomicLocation,
        _options: &LookupOptions,
    ) -> Result<VariantAnnotation, NexusError> {
        if self.always_fail {
            return Err(NexusError::lookup("mock failure"));
        }
        self.by_location
            .get(&location.key())
            .cloned()
            .ok_or_else(|| NexusError::lookup(format!("HTTP 404 Not Found for {}", location)))
    }

    fn annotate_genomic_locations(
        &self,
        locations: &[GenomicLocation],
        _options: &LookupOptions,
    ) -> Result<Vec<VariantAnnotation>, NexusError> {
        let index = self.calls.get();
        self.calls.set(index + 1);
        self.requests.borrow_mut().push(locations.to_vec());

        if self.always_fail || self.failing_batches.contains(&index) {
            return Err(NexusError::lookup(format!("mock failure for batch {}", index)));
        }

        Ok(locations
            .iter()
            .filter_map(|location| self.by_location.get(&location.key()).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn braf() -> GenomicLocation {
        GenomicLocation::new("7", 140453136, 140453136, "A", "T")
    }

    #[test]
    fn test_batch_returns_known_locations() {
        let mut client = MockAnnotationClient::new();
        client.add_location(braf(), None);

        let unknown = GenomicLocation::new("1", 1, 1, "A", "G");
        let annotations = client
            .annotate_genomic_locations(&[unknown, braf()], &LookupOptions::for_batch())
            .unwrap();
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].genomic_location(), Some(&braf()));
        assert_eq!(client.batch_calls(), 1);
        assert_eq!(client.requests()[0].len(), 2);
    }

    #[test]
    fn test_failing_batch() {
        let mut client = MockAnnotationClient::new();
        client.fail_batch(1);
        let options = LookupOptions::for_batch();

        assert!(client.annotate_genomic_locations(&[braf()], &options).is_ok());
        assert!(client.annotate_genomic_locations(&[braf()], &options).is_err());
        assert!(client.annotate_genomic_locations(&[braf()], &options).is_ok());
        assert_eq!(client.batch_calls(), 3);
    }

    #[test]
    fn test_single_lookups() {
        let mut client = MockAnnotationClient::new();
        client.add_location(braf(), None);
        client.add_variant("7:g.140453136A>T", VariantAnnotation::default());
        let options = LookupOptions::for_variant();

        assert!(client.annotate_genomic_location(&braf(), &options).is_ok());
        assert!(client.annotate_variant("7:g.140453136A>T", &options).is_ok());
        assert!(client.annotate_variant("1:g.1A>G", &options).is_err());
    }

    #[test]
    fn test_fail_always() {
        let mut client = MockAnnotationClient::new();
        client.add_location(braf(), None);
        client.fail_always();
        assert!(client
            .annotate_genomic_location(&braf(), &LookupOptions::for_variant())
            .is_err());
    }
}
