// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! genome-nexus: VCF to MAF conversion and batched variant annotation
//!
//! # Example
//!
//! ```
//! use genome_nexus::{vcf_to_maf, VcfRecord};
//!
//! // Convert a VCF deletion into MAF coordinates
//! let record = VcfRecord::new("17", 7577120, "TGA", "T");
//! let maf = vcf_to_maf(&record).unwrap().unwrap();
//! assert_eq!(maf.reference_allele, "GA");
//! assert_eq!(maf.tumor_seq_allele, "-");
//!
//! // The MAF row keys the annotation lookup
//! let location = maf.genomic_location();
//! assert_eq!(location.key(), "17,7577121,7577122,GA,-");
//! assert!(location.is_valid());
//! ```

pub mod batch;
pub mod cli;
pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod location;
pub mod maf;
pub mod vcf;

// Re-export commonly used types
pub use batch::{BatchConfig, BatchStats, MafAnnotator};
pub use client::{AnnotationClient, GenomeNexusClient, LookupOptions, MockAnnotationClient};
pub use convert::{convert_vcf, vcf_to_maf, ConvertOptions};
pub use error::{ErrorCode, NexusError};
pub use location::GenomicLocation;
pub use maf::MafRecord;
pub use vcf::VcfRecord;

/// Result type for genome-nexus operations
pub type Result<T> = std::result::Result<T, NexusError>;
