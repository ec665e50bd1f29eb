//! Configuration file support for genome-nexus.
//!
//! Settings shared by every command can be kept in a TOML file instead of
//! being repeated on the command line.
//!
//! # Example Configuration
//!
//! ```toml
//! api_url = "https://www.genomenexus.org/"
//! chunk_size = 200
//! isoform_override_source = "uniprot"
//! timeout_seconds = 120
//!
//! [tokens]
//! oncokb = "my-oncokb-token"
//! ```
//!
//! # Config File Locations
//!
//! Configuration is searched in this order (first found wins):
//! 1. the path given with `--config`
//! 2. `.genome-nexus.toml` in current directory
//! 3. `~/.config/genome-nexus/config.toml`
//!
//! CLI flags take precedence over config file settings.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::batch::DEFAULT_CHUNK_SIZE;
use crate::client::{IsoformOverrideSource, DEFAULT_GENOME_NEXUS_URL, DEFAULT_TIMEOUT_SECONDS};
use crate::error::NexusError;

/// File name searched in the working directory
pub const LOCAL_CONFIG_FILE: &str = ".genome-nexus.toml";

/// Parsed configuration from a `.genome-nexus.toml` file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NexusConfig {
    /// Annotation service base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    /// Rows per batched lookup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,
    /// Transcript naming convention.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isoform_override_source: Option<IsoformOverrideSource>,
    /// HTTP timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    /// Access tokens by knowledge-base name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tokens: BTreeMap<String, String>,
}

impl NexusConfig {
    /// Load configuration from an explicit path or the default locations.
    ///
    /// An explicit path must exist. Missing default files yield the
    /// built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, NexusError> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }

        for path in Self::default_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading configuration");
                return Self::load_from_path(&path);
            }
        }

        Ok(Self::default())
    }

    /// Candidate config files, in search order.
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(home) = dirs_home() {
            paths.push(
                home.join(".config")
                    .join("genome-nexus")
                    .join("config.toml"),
            );
        }
        paths
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self, NexusError> {
        let content = fs::read_to_string(path).map_err(|e| NexusError::Config {
            msg: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::parse(&content).map_err(|e| match e {
            NexusError::Config { msg } => NexusError::Config {
                msg: format!("{}: {}", path.display(), msg),
            },
            other => other,
        })
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, NexusError> {
        let config: NexusConfig = toml::from_str(content).map_err(|e| NexusError::Config {
            msg: e.message().to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that can never work.
    pub fn validate(&self) -> Result<(), NexusError> {
        if self.chunk_size == Some(0) {
            return Err(NexusError::Config {
                msg: "chunk_size must be a positive integer".to_string(),
            });
        }
        if self.timeout_seconds == Some(0) {
            return Err(NexusError::Config {
                msg: "timeout_seconds must be a positive integer".to_string(),
            });
        }
        Ok(())
    }

    /// Service URL, falling back to the public instance.
    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_GENOME_NEXUS_URL)
    }

    /// Rows per batched lookup, falling back to the default.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE)
    }

    /// Isoform override source, falling back to the default.
    pub fn isoform_override_source(&self) -> IsoformOverrideSource {
        self.isoform_override_source.unwrap_or_default()
    }

    /// HTTP timeout in seconds, falling back to the default.
    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    /// Tokens as the JSON object the service expects, if any are set.
    pub fn token_json(&self) -> Option<String> {
        if self.tokens.is_empty() {
            None
        } else {
            serde_json::to_string(&self.tokens).ok()
        }
    }

    /// Overlay values set in `other` on top of this configuration.
    pub fn merge(mut self, other: NexusConfig) -> Self {
        if other.api_url.is_some() {
            self.api_url = other.api_url;
        }
        if other.chunk_size.is_some() {
            self.chunk_size = other.chunk_size;
        }
        if other.isoform_override_source.is_some() {
            self.isoform_override_source = other.isoform_override_source;
        }
        if other.timeout_seconds.is_some() {
            self.timeout_seconds = other.timeout_seconds;
        }
        if !other.tokens.is_empty() {
            self.tokens = other.tokens;
        }
        self
    }
}

/// Get the user's home directory.
fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_full_config() {
        let config = NexusConfig::parse(
            r#"
api_url = "http://localhost:8888"
chunk_size = 250
isoform_override_source = "uniprot"
timeout_seconds = 5

[tokens]
oncokb = "secret"
"#,
        )
        .unwrap();

        assert_eq!(config.api_url(), "http://localhost:8888");
        assert_eq!(config.chunk_size(), 250);
        assert_eq!(
            config.isoform_override_source(),
            IsoformOverrideSource::Uniprot
        );
        assert_eq!(config.timeout_seconds(), 5);
        assert_eq!(config.token_json().as_deref(), Some(r#"{"oncokb":"secret"}"#));
    }

    #[test]
    fn test_defaults() {
        let config = NexusConfig::parse("").unwrap();
        assert_eq!(config.api_url(), DEFAULT_GENOME_NEXUS_URL);
        assert_eq!(config.chunk_size(), DEFAULT_CHUNK_SIZE);
        assert_eq!(config.isoform_override_source(), IsoformOverrideSource::Mskcc);
        assert_eq!(config.timeout_seconds(), DEFAULT_TIMEOUT_SECONDS);
        assert_eq!(config.token_json(), None);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            NexusConfig::parse("chunk_size = ["),
            Err(NexusError::Config { .. })
        ));
        assert!(matches!(
            NexusConfig::parse("unknown_key = 1"),
            Err(NexusError::Config { .. })
        ));
        assert!(matches!(
            NexusConfig::parse("isoform_override_source = \"refseq\""),
            Err(NexusError::Config { .. })
        ));
    }

    #[test]
    fn test_zero_values_rejected() {
        assert!(NexusConfig::parse("chunk_size = 0").is_err());
        assert!(NexusConfig::parse("timeout_seconds = 0").is_err());
    }

    #[test]
    fn test_merge_prefers_overlay() {
        let base = NexusConfig::parse("chunk_size = 10\napi_url = \"http://a\"").unwrap();
        let overlay = NexusConfig {
            chunk_size: Some(20),
            ..Default::default()
        };
        let merged = base.merge(overlay);
        assert_eq!(merged.chunk_size(), 20);
        assert_eq!(merged.api_url(), "http://a");
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chunk_size = 42").unwrap();
        let config = NexusConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.chunk_size(), 42);
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let err = NexusConfig::load(Some(Path::new("/nonexistent/genome-nexus.toml")))
            .unwrap_err();
        assert!(matches!(err, NexusError::Config { .. }));
    }
}
