//! Output formatting utilities for single-variant lookups

use std::io::Write;
use std::str::FromStr;

use crate::client::VariantAnnotation;
use crate::error::NexusError;

/// Output format for lookup results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON (default)
    #[default]
    Json,
    /// Single-line JSON
    Compact,
    /// Tab-separated consequence summary
    Text,
}

impl FromStr for OutputFormat {
    type Err = NexusError;

    /// Parse an output format from a string
    ///
    /// # Examples
    ///
    /// ```
    /// use genome_nexus::cli::OutputFormat;
    ///
    /// assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
    /// assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
    /// assert!("xml".parse::<OutputFormat>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "compact" => Ok(OutputFormat::Compact),
            "text" => Ok(OutputFormat::Text),
            other => Err(NexusError::InvalidArgument {
                msg: format!("unknown output format '{}'", other),
            }),
        }
    }
}

/// Write one annotation
///
/// Text output is `query`, gene, protein change, cDNA change and
/// classification separated by tabs, with empty cells for absent values.
///
/// # Examples
///
/// ```
/// use genome_nexus::cli::{output_annotation, OutputFormat};
/// use genome_nexus::client::VariantAnnotation;
///
/// let mut buffer = Vec::new();
/// output_annotation(&mut buffer, "1:g.5A>G", &VariantAnnotation::default(), OutputFormat::Text).unwrap();
/// assert_eq!(String::from_utf8(buffer).unwrap(), "1:g.5A>G\t\t\t\t\n");
/// ```
pub fn output_annotation<W: Write>(
    writer: &mut W,
    query: &str,
    annotation: &VariantAnnotation,
    format: OutputFormat,
) -> Result<(), NexusError> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, annotation)?;
            writeln!(writer)?;
        }
        OutputFormat::Compact => {
            serde_json::to_writer(&mut *writer, annotation)?;
            writeln!(writer)?;
        }
        OutputFormat::Text => {
            let summary = annotation.transcript_consequence_summary();
            let field = |value: Option<&Option<String>>| {
                value
                    .and_then(|v| v.as_deref())
                    .unwrap_or_default()
                    .to_string()
            };
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}",
                query,
                field(summary.map(|s| &s.hugo_gene_symbol)),
                field(summary.map(|s| &s.hgvsp_short)),
                field(summary.map(|s| &s.hgvsc)),
                field(summary.map(|s| &s.variant_classification)),
            )?;
        }
    }
    Ok(())
}

/// Write an error for a failed lookup
pub fn output_error<W: Write>(
    writer: &mut W,
    query: &str,
    error: &NexusError,
    format: OutputFormat,
) -> Result<(), NexusError> {
    match format {
        OutputFormat::Json | OutputFormat::Compact => {
            let value = serde_json::json!({
                "query": query,
                "error": error.to_string(),
                "code": error.code().as_str(),
            });
            if format == OutputFormat::Json {
                serde_json::to_writer_pretty(&mut *writer, &value)?;
            } else {
                serde_json::to_writer(&mut *writer, &value)?;
            }
            writeln!(writer)?;
        }
        OutputFormat::Text => {
            writeln!(writer, "{}\tERROR\t{}", query, error.detailed_message())?;
        }
    }
    Ok(())
}
