//! Argument parsing utilities for CLI operations

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::NexusError;
use crate::location::GenomicLocation;

/// Parse the `--tokens` argument
///
/// Accepts the JSON object the service expects (`{"oncokb":"..."}`) or a
/// comma-separated `name=value` list.
///
/// # Examples
///
/// ```
/// use genome_nexus::cli::parse_tokens;
///
/// let tokens = parse_tokens(r#"{"oncokb":"abc"}"#).unwrap();
/// assert_eq!(tokens["oncokb"], "abc");
///
/// let tokens = parse_tokens("oncokb=abc").unwrap();
/// assert_eq!(tokens["oncokb"], "abc");
/// ```
pub fn parse_tokens(input: &str) -> Result<BTreeMap<String, String>, NexusError> {
    let input = input.trim();
    let invalid = |reason: &str| NexusError::InvalidArgument {
        msg: format!("invalid tokens '{}': {}", input, reason),
    };

    if input.starts_with('{') {
        let value: Value = serde_json::from_str(input).map_err(|e| invalid(&e.to_string()))?;
        let Value::Object(map) = value else {
            return Err(invalid("expected a JSON object"));
        };
        return map
            .into_iter()
            .map(|(name, value)| match value {
                Value::String(token) => Ok((name, token)),
                _ => Err(invalid("token values must be strings")),
            })
            .collect();
    }

    input
        .split(',')
        .filter(|pair| !pair.trim().is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((name, token)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), token.trim().to_string()))
            }
            _ => Err(invalid("expected name=value")),
        })
        .collect()
}

/// Parse a genomic location argument such as `7,140453136,140453136,A,T`
///
/// Numeric sex-chromosome aliases are resolved. The location must be
/// submittable to the service.
pub fn parse_location(input: &str) -> Result<GenomicLocation, NexusError> {
    let parsed: GenomicLocation = input.trim().parse()?;
    let start = parsed.start.map(|p| p.to_string()).unwrap_or_default();
    let end = parsed.end.map(|p| p.to_string()).unwrap_or_default();
    let location = GenomicLocation::from_maf_fields(
        &parsed.chromosome,
        &start,
        &end,
        &parsed.reference_allele,
        &parsed.variant_allele,
    );

    if location.is_valid() {
        Ok(location)
    } else {
        Err(NexusError::InvalidLocation {
            input: input.to_string(),
        })
    }
}

/// Parse the `--chunk-size` argument as a positive integer
///
/// Returns a `String` error for use as a clap value parser.
pub fn parse_chunk_size(input: &str) -> Result<usize, String> {
    match input.trim().parse::<usize>() {
        Ok(0) => Err("chunk size must be a positive integer".to_string()),
        Ok(size) => Ok(size),
        Err(e) => Err(format!("invalid chunk size '{}': {}", input, e)),
    }
}
