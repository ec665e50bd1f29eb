//! Batch annotation processor implementation.

use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

use super::format::{OutputLayout, API_ERROR};
use super::index::{AnnotationIndex, Lookup};
use crate::client::{AnnotationClient, LookupOptions};
use crate::error::NexusError;
use crate::location::GenomicLocation;
use crate::maf::MafColumns;

/// Rows submitted per batched call unless configured otherwise
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Configuration for batch annotation.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Rows per batched lookup.
    pub chunk_size: usize,
    /// Drop rows of failed batches from the primary output.
    pub exclude_failed: bool,
    /// Query parameters sent with every batch.
    pub options: LookupOptions,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            exclude_failed: false,
            options: LookupOptions::for_batch(),
        }
    }
}

impl BatchConfig {
    /// Create a new batch configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of rows per batched lookup.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Configure whether rows of failed batches are left out of the output.
    pub fn exclude_failed(mut self, exclude_failed: bool) -> Self {
        self.exclude_failed = exclude_failed;
        self
    }

    /// Set the lookup options.
    pub fn options(mut self, options: LookupOptions) -> Self {
        self.options = options;
        self
    }
}

/// Counters for one annotation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchStats {
    /// Data rows read.
    pub rows: usize,
    /// Rows written with annotation cells.
    pub annotated: usize,
    /// Valid rows the service returned nothing usable for.
    pub not_found: usize,
    /// Rows whose location could not be submitted.
    pub invalid: usize,
    /// Rows belonging to failed batches.
    pub failed_rows: usize,
    /// Batched calls that failed.
    pub failed_batches: usize,
    /// Batches flushed, including failed ones.
    pub batches: usize,
    /// Time elapsed since the run started.
    pub elapsed: Duration,
}

impl BatchStats {
    /// Rows processed per second.
    pub fn rows_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs < f64::EPSILON {
            0.0
        } else {
            self.rows as f64 / secs
        }
    }

    /// Whether any batch failed.
    pub fn has_failures(&self) -> bool {
        self.failed_batches > 0
    }
}

/// One buffered data row, kept as the raw input bytes.
#[derive(Debug, Clone)]
struct PendingRow {
    line: Vec<u8>,
    location: GenomicLocation,
}

/// Annotates MAF rows in fixed-size batches.
///
/// Rows are buffered until `chunk_size` is reached, looked up with one
/// batched call, and written in input order before the next batch is read.
/// A failed call never aborts the run: its rows are written with empty
/// annotation cells (or left out) and copied to the failure sink.
pub struct MafAnnotator<C: AnnotationClient> {
    client: C,
    config: BatchConfig,
    layout: OutputLayout,
}

impl<C: AnnotationClient> MafAnnotator<C> {
    /// Create an annotator with the default configuration.
    pub fn new(client: C) -> Self {
        Self::with_config(client, BatchConfig::default())
    }

    /// Create an annotator with a custom configuration.
    pub fn with_config(client: C, config: BatchConfig) -> Self {
        let layout = OutputLayout::new(config.options.has_knowledge_base());
        Self {
            client,
            config,
            layout,
        }
    }

    /// Annotate a MAF stream.
    ///
    /// # Errors
    ///
    /// Fails on a zero chunk size, a missing header or required column, and
    /// I/O errors on any sink. Lookup failures are absorbed per batch.
    pub fn annotate<R: BufRead, W: Write>(
        &self,
        input: R,
        output: &mut W,
        failed: Option<&mut dyn Write>,
    ) -> Result<BatchStats, NexusError> {
        self.annotate_with_progress(input, output, failed, |_| {})
    }

    /// Annotate a MAF stream, calling `progress` after every batch.
    ///
    /// Lines are read as bytes; only the five location cells are decoded
    /// (lossily), so a row that is not valid UTF-8 is still written back
    /// unchanged.
    pub fn annotate_with_progress<R, W, F>(
        &self,
        mut input: R,
        output: &mut W,
        mut failed: Option<&mut dyn Write>,
        mut progress: F,
    ) -> Result<BatchStats, NexusError>
    where
        R: BufRead,
        W: Write,
        F: FnMut(&BatchStats),
    {
        if self.config.chunk_size == 0 {
            return Err(NexusError::InvalidArgument {
                msg: "chunk size must be a positive integer".to_string(),
            });
        }

        let start = Instant::now();
        let mut stats = BatchStats::default();
        let mut columns: Option<MafColumns> = None;
        let mut batch: Vec<PendingRow> = Vec::with_capacity(self.config.chunk_size);

        let mut buf = Vec::new();
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = trim_line_end(&buf);

            let Some(maf_columns) = columns else {
                if line.starts_with(b"#") {
                    write_line(output, line)?;
                } else if !is_blank(line) {
                    columns = Some(MafColumns::from_header(&String::from_utf8_lossy(line))?);
                    write_line(output, &self.layout.header(line))?;
                    if let Some(sink) = failed.as_deref_mut() {
                        write_line(sink, &self.layout.failure_header(line))?;
                    }
                }
                continue;
            };

            if is_blank(line) {
                continue;
            }

            stats.rows += 1;
            batch.push(PendingRow {
                line: line.to_vec(),
                location: maf_columns.genomic_location(&String::from_utf8_lossy(line)),
            });

            if batch.len() >= self.config.chunk_size {
                self.flush_batch(&batch, output, failed.as_deref_mut(), &mut stats)?;
                batch.clear();
                stats.elapsed = start.elapsed();
                progress(&stats);
            }
        }

        if columns.is_none() {
            return Err(NexusError::missing_column(crate::maf::CHROMOSOME));
        }

        if !batch.is_empty() {
            self.flush_batch(&batch, output, failed.as_deref_mut(), &mut stats)?;
            stats.elapsed = start.elapsed();
            progress(&stats);
        }

        output.flush()?;
        stats.elapsed = start.elapsed();
        tracing::info!(
            rows = stats.rows,
            annotated = stats.annotated,
            not_found = stats.not_found,
            invalid = stats.invalid,
            failed_rows = stats.failed_rows,
            batches = stats.batches,
            failed_batches = stats.failed_batches,
            "annotation finished"
        );

        Ok(stats)
    }

    /// Look up one batch and write its rows.
    fn flush_batch<W: Write, S: Write + ?Sized>(
        &self,
        batch: &[PendingRow],
        output: &mut W,
        failed: Option<&mut S>,
        stats: &mut BatchStats,
    ) -> Result<(), NexusError> {
        let batch_number = stats.batches;
        stats.batches += 1;

        let mut seen = HashSet::new();
        let locations: Vec<GenomicLocation> = batch
            .iter()
            .filter(|row| row.location.is_valid())
            .filter(|row| seen.insert(row.location.key()))
            .map(|row| row.location.clone())
            .collect();

        tracing::debug!(
            batch = batch_number,
            rows = batch.len(),
            submitted = locations.len(),
            "flushing batch"
        );

        let response = if locations.is_empty() {
            Ok(Vec::new())
        } else {
            self.client
                .annotate_genomic_locations(&locations, &self.config.options)
        };

        match response {
            Ok(annotations) => {
                let index = AnnotationIndex::new(annotations);
                for row in batch {
                    let lookup = if row.location.is_valid() {
                        index.lookup(&row.location)
                    } else {
                        stats.invalid += 1;
                        Lookup::NotFound
                    };

                    let row_bytes = match lookup {
                        Lookup::Found {
                            annotation,
                            summary,
                        } => {
                            stats.annotated += 1;
                            self.layout.annotated_row(&row.line, annotation, summary)
                        }
                        Lookup::FoundWithoutSummary(_) | Lookup::NotFound => {
                            if row.location.is_valid() {
                                stats.not_found += 1;
                            }
                            self.layout.placeholder_row(&row.line)
                        }
                    };
                    write_line(output, &row_bytes)?;
                }
            }
            Err(e) => {
                tracing::warn!(
                    batch = batch_number,
                    rows = batch.len(),
                    "batch lookup failed: {}",
                    e
                );
                stats.failed_batches += 1;
                stats.failed_rows += batch.len();

                if !self.config.exclude_failed {
                    for row in batch {
                        write_line(output, &self.layout.placeholder_row(&row.line))?;
                    }
                }
                if let Some(sink) = failed {
                    for row in batch {
                        write_line(sink, &self.layout.failed_row(&row.line, API_ERROR))?;
                    }
                    sink.flush()?;
                }
            }
        }

        output.flush()?;
        Ok(())
    }
}

/// Strip trailing line terminators
fn trim_line_end(mut line: &[u8]) -> &[u8] {
    while let [rest @ .., b'\r' | b'\n'] = line {
        line = rest;
    }
    line
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}

fn write_line<W: Write + ?Sized>(out: &mut W, line: &[u8]) -> io::Result<()> {
    out.write_all(line)?;
    out.write_all(b"\n")
}
