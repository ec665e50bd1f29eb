//! Annotation service clients
//!
//! The pipeline only talks to the service through the [`AnnotationClient`]
//! trait, so callers choose the implementation:
//! - [`GenomeNexusClient`] for the real HTTP service
//! - [`MockAnnotationClient`] for tests
//!
//! # Example
//!
//! ```
//! use genome_nexus::client::{AnnotationClient, LookupOptions, MockAnnotationClient};
//! use genome_nexus::location::GenomicLocation;
//!
//! let location = GenomicLocation::new("7", 140453136, 140453136, "A", "T");
//! let mut client = MockAnnotationClient::new();
//! client.add_location(location.clone(), None);
//!
//! let annotations = client
//!     .annotate_genomic_locations(&[location], &LookupOptions::for_batch())
//!     .unwrap();
//! assert_eq!(annotations.len(), 1);
//! ```

mod genome_nexus;
mod mock;
mod types;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::NexusError;
use crate::location::GenomicLocation;

pub use genome_nexus::{GenomeNexusClient, DEFAULT_GENOME_NEXUS_URL, DEFAULT_TIMEOUT_SECONDS};
pub use mock::MockAnnotationClient;
pub use types::{
    AnnotationSummary, Citation, Drug, IndicatorQueryResp, OncokbAnnotation, Treatment,
    TranscriptConsequenceSummary, VariantAnnotation,
};

/// Field carrying the consequence summary
pub const FIELD_ANNOTATION_SUMMARY: &str = "annotation_summary";
/// Field carrying functional impact predictions
pub const FIELD_MUTATION_ASSESSOR: &str = "mutation_assessor";
/// Field carrying aggregated population data
pub const FIELD_MY_VARIANT_INFO: &str = "my_variant_info";
/// Field carrying the knowledge-base annotation
pub const FIELD_ONCOKB: &str = "oncokb";

/// Transcript naming convention the service should prefer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IsoformOverrideSource {
    #[default]
    Mskcc,
    Uniprot,
    Ensembl,
}

impl IsoformOverrideSource {
    /// The query-parameter value
    pub fn as_str(&self) -> &'static str {
        match self {
            IsoformOverrideSource::Mskcc => "mskcc",
            IsoformOverrideSource::Uniprot => "uniprot",
            IsoformOverrideSource::Ensembl => "ensembl",
        }
    }
}

impl fmt::Display for IsoformOverrideSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IsoformOverrideSource {
    type Err = NexusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mskcc" => Ok(IsoformOverrideSource::Mskcc),
            "uniprot" => Ok(IsoformOverrideSource::Uniprot),
            "ensembl" => Ok(IsoformOverrideSource::Ensembl),
            other => Err(NexusError::InvalidArgument {
                msg: format!(
                    "unknown isoform override source '{}' (expected mskcc, uniprot or ensembl)",
                    other
                ),
            }),
        }
    }
}

/// Query parameters shared by every lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupOptions {
    /// Transcript naming convention
    pub isoform_override_source: IsoformOverrideSource,
    /// Response fields to request
    pub fields: Vec<String>,
    /// Access tokens, as a JSON map such as `{"oncokb":"..."}`
    pub token: Option<String>,
}

impl LookupOptions {
    /// Options for single-variant lookups
    pub fn for_variant() -> Self {
        Self {
            isoform_override_source: IsoformOverrideSource::default(),
            fields: vec![
                FIELD_ANNOTATION_SUMMARY.to_string(),
                FIELD_MUTATION_ASSESSOR.to_string(),
                FIELD_MY_VARIANT_INFO.to_string(),
            ],
            token: None,
        }
    }

    /// Options for batched lookups
    pub fn for_batch() -> Self {
        Self {
            isoform_override_source: IsoformOverrideSource::default(),
            fields: vec![FIELD_ANNOTATION_SUMMARY.to_string()],
            token: None,
        }
    }

    /// Set the isoform override source
    pub fn with_isoform_override_source(mut self, source: IsoformOverrideSource) -> Self {
        self.isoform_override_source = source;
        self
    }

    /// Set access tokens; an `oncokb` token also requests the knowledge-base field
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        if self.has_knowledge_base() && !self.fields.iter().any(|f| f == FIELD_ONCOKB) {
            self.fields.push(FIELD_ONCOKB.to_string());
        }
        self
    }

    /// Whether knowledge-base data is requested
    ///
    /// True only when the token map carries an `oncokb` entry.
    pub fn has_knowledge_base(&self) -> bool {
        self.token.as_deref().is_some_and(has_oncokb_token)
    }

    /// Query string pairs in the order the service documents them
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![(
            "isoformOverrideSource",
            self.isoform_override_source.as_str().to_string(),
        )];
        if !self.fields.is_empty() {
            pairs.push(("fields", self.fields.join(",")));
        }
        if let Some(token) = &self.token {
            pairs.push(("token", token.clone()));
        }
        pairs
    }
}

fn has_oncokb_token(token: &str) -> bool {
    serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(token)
        .map(|tokens| tokens.contains_key(FIELD_ONCOKB))
        .unwrap_or(false)
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self::for_batch()
    }
}

/// A source of variant annotations
///
/// Implementations might include:
/// - GenomeNexusClient for the public web service
/// - MockAnnotationClient for testing
pub trait AnnotationClient {
    /// Annotate one variant given as an HGVS genomic description
    /// (e.g., `17:g.41242962_41242963insGA`)
    fn annotate_variant(
        &self,
        hgvs: &str,
        options: &LookupOptions,
    ) -> Result<VariantAnnotation, NexusError>;

    /// Annotate one genomic location
    fn annotate_genomic_location(
        &self,
        location: &GenomicLocation,
        options: &LookupOptions,
    ) -> Result<VariantAnnotation, NexusError>;

    /// Annotate many genomic locations in one call
    ///
    /// The response may omit locations and is not guaranteed to follow
    /// request order; callers match results by location key.
    fn annotate_genomic_locations(
        &self,
        locations: &[GenomicLocation],
        options: &LookupOptions,
    ) -> Result<Vec<VariantAnnotation>, NexusError>;
}

impl<C: AnnotationClient + ?Sized> AnnotationClient for &C {
    fn annotate_variant(
        &self,
        hgvs: &str,
        options: &LookupOptions,
    ) -> Result<VariantAnnotation, NexusError> {
        (**self).annotate_variant(hgvs, options)
    }

    fn annotate_genomic_location(
        &self,
        location: &GenomicLocation,
        options: &LookupOptions,
    ) -> Result<VariantAnnotation, NexusError> {
        (**self).annotate_genomic_location(location, options)
    }

    fn annotate_genomic_locations(
        &self,
        locations: &[GenomicLocation],
        options: &LookupOptions,
    ) -> Result<Vec<VariantAnnotation>, NexusError> {
        (**self).annotate_genomic_locations(locations, options)
    }
}
