//! HTTP client for the Genome Nexus annotation service.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use super::{AnnotationClient, LookupOptions, VariantAnnotation};
use crate::error::NexusError;
use crate::location::GenomicLocation;

/// Public Genome Nexus instance
pub const DEFAULT_GENOME_NEXUS_URL: &str = "https://www.genomenexus.org/";

/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// Blocking HTTP client for the Genome Nexus REST API.
pub struct GenomeNexusClient {
    client: Client,
    base_url: String,
}

impl GenomeNexusClient {
    /// Create a client for `base_url` with the default timeout.
    pub fn new(base_url: &str) -> Result<Self, NexusError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECONDS))
    }

    /// Create a client with an explicit request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, NexusError> {
        let base_url = base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(NexusError::InvalidArgument {
                msg: format!("API URL must start with http:// or https://: {}", base_url),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("genome-nexus-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NexusError::Io {
                msg: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn variant_url(&self, hgvs: &str) -> String {
        format!("{}/annotation/{}", self.base_url, urlencoding::encode(hgvs))
    }

    fn genomic_location_url(&self, location: &GenomicLocation) -> String {
        format!(
            "{}/annotation/genomic/{}",
            self.base_url,
            urlencoding::encode(&location.key())
        )
    }

    fn genomic_locations_url(&self) -> String {
        format!("{}/annotation/genomic", self.base_url)
    }

    /// Send a request and decode a JSON body, mapping every failure to a lookup error.
    fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T, NexusError> {
        let response = request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .map_err(|e| NexusError::lookup(format!("HTTP request for {} failed: {}", what, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NexusError::lookup(format!("HTTP {} for {}", status, what)));
        }

        response
            .json::<T>()
            .map_err(|e| NexusError::lookup(format!("Failed to parse response for {}: {}", what, e)))
    }
}

impl AnnotationClient for GenomeNexusClient {
    fn annotate_variant(
        &self,
        hgvs: &str,
        options: &LookupOptions,
    ) -> Result<VariantAnnotation, NexusError> {
        let url = self.variant_url(hgvs);
        tracing::debug!(%url, "annotating variant");
        self.send(self.client.get(&url).query(&options.query_pairs()), hgvs)
    }

    fn annotate_genomic_location(
        &self,
        location: &GenomicLocation,
        options: &LookupOptions,
    ) -> Result<VariantAnnotation, NexusError> {
        let url = self.genomic_location_url(location);
        tracing::debug!(%url, "annotating genomic location");
        self.send(
            self.client.get(&url).query(&options.query_pairs()),
            &location.key(),
        )
    }

    fn annotate_genomic_locations(
        &self,
        locations: &[GenomicLocation],
        options: &LookupOptions,
    ) -> Result<Vec<VariantAnnotation>, NexusError> {
        if locations.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.genomic_locations_url();
        tracing::debug!(%url, count = locations.len(), "annotating genomic locations");
        self.send(
            self.client
                .post(&url)
                .query(&options.query_pairs())
                .json(locations),
            &format!("{} genomic locations", locations.len()),
        )
    }
}
