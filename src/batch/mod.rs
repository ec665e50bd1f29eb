//! Batch annotation of MAF files.
//!
//! Rows are read from a MAF stream, grouped into fixed-size batches, looked up
//! with one batched call per group, and written back with annotation columns
//! appended. Output preserves input order, and every row keeps the same
//! column count whether it was annotated, not found, or part of a failed
//! batch.
//!
//! # Examples
//!
//! ```
//! use genome_nexus::batch::{BatchConfig, MafAnnotator};
//! use genome_nexus::client::MockAnnotationClient;
//!
//! let client = MockAnnotationClient::new();
//! let annotator = MafAnnotator::with_config(&client, BatchConfig::new().chunk_size(50));
//!
//! let input = "Chromosome\tStart_Position\tEnd_Position\tReference_Allele\tTumor_Seq_Allele2\n\
//!              7\t140453136\t140453136\tA\tT\n";
//! let mut output = Vec::new();
//! let stats = annotator.annotate(input.as_bytes(), &mut output, None).unwrap();
//! assert_eq!(stats.rows, 1);
//! assert_eq!(stats.not_found, 1);
//! ```
//!
//! # Failure handling
//!
//! - A failed batched call never aborts the run
//! - Rows of a failed batch get empty annotation cells, or are left out with
//!   [`BatchConfig::exclude_failed`]
//! - A failure sink receives those rows with a trailing error code

mod format;
mod index;
mod processor;

pub use format::{
    OutputLayout, ANNOTATION_COLUMNS, API_ERROR, ERROR_CODE_COLUMN, KNOWLEDGE_BASE_COLUMNS,
};
pub use index::{AnnotationIndex, Lookup};
pub use processor::{BatchConfig, BatchStats, MafAnnotator, DEFAULT_CHUNK_SIZE};
