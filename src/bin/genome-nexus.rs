// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! genome-nexus CLI
//!
//! Command-line interface for VCF to MAF conversion and variant annotation.

use clap::{Args, Parser, Subcommand};
use genome_nexus::batch::{BatchConfig, BatchStats, MafAnnotator};
use genome_nexus::cli::{
    open_input, open_output, output_annotation, output_error, parse_chunk_size, parse_location,
    parse_tokens, OutputFormat,
};
use genome_nexus::client::{
    AnnotationClient, GenomeNexusClient, IsoformOverrideSource, LookupOptions, VariantAnnotation,
};
use genome_nexus::config::NexusConfig;
use genome_nexus::convert::{convert_vcf, ConvertOptions};
use genome_nexus::NexusError;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "genome-nexus")]
#[command(author, version, about = "VCF to MAF conversion and Genome Nexus annotation")]
#[command(
    long_about = "Convert VCF files to MAF and annotate variants with the Genome Nexus service.

Examples:
  genome-nexus convert input.vcf -o input.maf
  genome-nexus annotate maf input.maf -o annotated.maf --output-file-failed failed.maf
  genome-nexus annotate variant '7:g.140453136A>T'
  genome-nexus annotate location 7,140453136,140453136,A,T"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Annotation service URL [default: https://www.genomenexus.org/]
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Access tokens, e.g. '{"oncokb":"TOKEN"}' or oncokb=TOKEN
    #[arg(long, global = true)]
    tokens: Option<String>,

    /// Transcript naming convention (mskcc, uniprot or ensembl) [default: mskcc]
    #[arg(long, global = true)]
    isoform_override_source: Option<IsoformOverrideSource>,

    /// HTTP timeout in seconds [default: 60]
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Configuration file (default: .genome-nexus.toml or ~/.config/genome-nexus/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level or filter directive (e.g. info, genome_nexus=debug)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a VCF file to MAF
    Convert {
        /// Input VCF file (use - for stdin, .gz is decompressed)
        input: PathBuf,

        /// Output MAF file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip malformed records instead of failing
        #[arg(long)]
        skip_malformed: bool,
    },

    /// Annotate variants with the annotation service
    Annotate {
        #[command(subcommand)]
        target: AnnotateCommand,
    },
}

#[derive(Subcommand)]
enum AnnotateCommand {
    /// Annotate one variant given in HGVS genomic notation
    Variant {
        /// Variant (e.g., 17:g.41242962_41242963insGA)
        hgvs: String,

        /// Output format (json, compact or text)
        #[arg(short = 'f', long, default_value = "json")]
        format: OutputFormat,
    },

    /// Annotate one genomic location
    Location {
        /// Location as CHR,START,END,REF,ALT
        location: String,

        /// Output format (json, compact or text)
        #[arg(short = 'f', long, default_value = "json")]
        format: OutputFormat,
    },

    /// Annotate every row of a MAF file
    Maf {
        /// Input MAF file (use - for stdin, .gz is decompressed)
        input: PathBuf,

        /// Output MAF file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rows per batched request [default: 100]
        #[arg(short, long, value_parser = parse_chunk_size)]
        chunk_size: Option<usize>,

        /// Write rows of failed batches to this file with an error code
        #[arg(long)]
        output_file_failed: Option<PathBuf>,

        /// Leave rows of failed batches out of the main output
        #[arg(long)]
        exclude_failed: bool,

        /// Show a progress spinner on stderr
        #[arg(long)]
        progress: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(&cli.global.log_level) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e.detailed_message());
            ExitCode::FAILURE
        }
    }
}

/// Route logs to stderr so stdout stays a clean data stream.
fn init_tracing(level: &str) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter =
        EnvFilter::try_new(level).map_err(|e| format!("Invalid log level '{}': {}", level, e))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .try_init()?;

    tracing::debug!("Tracing initialized with level: {}", level);

    Ok(())
}

fn run(cli: Cli) -> Result<ExitCode, NexusError> {
    let global = cli.global;

    match cli.command {
        Commands::Convert {
            input,
            output,
            skip_malformed,
        } => run_convert(&input, output.as_deref(), skip_malformed),
        Commands::Annotate { target } => match target {
            AnnotateCommand::Variant { hgvs, format } => {
                let config = load_config(&global, None)?;
                let client = build_client(&config)?;
                let result = client.annotate_variant(&hgvs, &lookup_options(&config, false));
                print_lookup(&hgvs, result, format)
            }
            AnnotateCommand::Location { location, format } => {
                let location = parse_location(&location)?;
                let config = load_config(&global, None)?;
                let client = build_client(&config)?;
                let result =
                    client.annotate_genomic_location(&location, &lookup_options(&config, false));
                print_lookup(&location.key(), result, format)
            }
            AnnotateCommand::Maf {
                input,
                output,
                chunk_size,
                output_file_failed,
                exclude_failed,
                progress,
            } => {
                let config = load_config(&global, chunk_size)?;
                run_annotate_maf(
                    &config,
                    &input,
                    output.as_deref(),
                    output_file_failed.as_deref(),
                    exclude_failed,
                    progress,
                )
            }
        },
    }
}

/// Merge CLI flags over the configuration file.
fn load_config(global: &GlobalArgs, chunk_size: Option<usize>) -> Result<NexusConfig, NexusError> {
    let file = NexusConfig::load(global.config.as_deref())?;
    let flags = NexusConfig {
        api_url: global.api_url.clone(),
        chunk_size,
        isoform_override_source: global.isoform_override_source,
        timeout_seconds: global.timeout,
        tokens: global
            .tokens
            .as_deref()
            .map(parse_tokens)
            .transpose()?
            .unwrap_or_default(),
    };

    let config = file.merge(flags);
    config.validate()?;
    tracing::debug!(
        api_url = config.api_url(),
        chunk_size = config.chunk_size(),
        isoform_override_source = %config.isoform_override_source(),
        timeout_seconds = config.timeout_seconds(),
        tokens = config.tokens.len(),
        "effective configuration"
    );
    Ok(config)
}

fn build_client(config: &NexusConfig) -> Result<GenomeNexusClient, NexusError> {
    GenomeNexusClient::with_timeout(
        config.api_url(),
        Duration::from_secs(config.timeout_seconds()),
    )
}

fn lookup_options(config: &NexusConfig, batch: bool) -> LookupOptions {
    let options = if batch {
        LookupOptions::for_batch()
    } else {
        LookupOptions::for_variant()
    };
    options
        .with_isoform_override_source(config.isoform_override_source())
        .with_token(config.token_json())
}

fn print_lookup(
    query: &str,
    result: Result<VariantAnnotation, NexusError>,
    format: OutputFormat,
) -> Result<ExitCode, NexusError> {
    match result {
        Ok(annotation) => {
            let mut stdout = io::stdout().lock();
            output_annotation(&mut stdout, query, &annotation, format)?;
            stdout.flush()?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            output_error(&mut io::stderr().lock(), query, &e, format)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_convert(
    input: &Path,
    output: Option<&Path>,
    skip_malformed: bool,
) -> Result<ExitCode, NexusError> {
    let reader = open_input(input)?;
    let mut writer = open_output(output)?;
    let options = ConvertOptions::new().skip_malformed(skip_malformed);

    let stats = convert_vcf(reader, &mut writer, &options)?;
    if stats.malformed > 0 {
        eprintln!("Skipped {} malformed record(s)", stats.malformed);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_annotate_maf(
    config: &NexusConfig,
    input: &Path,
    output: Option<&Path>,
    output_file_failed: Option<&Path>,
    exclude_failed: bool,
    progress: bool,
) -> Result<ExitCode, NexusError> {
    let client = build_client(config)?;
    let batch_config = BatchConfig::new()
        .chunk_size(config.chunk_size())
        .exclude_failed(exclude_failed)
        .options(lookup_options(config, true));
    let annotator = MafAnnotator::with_config(client, batch_config);

    let reader = open_input(input)?;
    let mut writer = open_output(output)?;
    let mut failed = match output_file_failed {
        Some(path) => Some(open_output(Some(path))?),
        None => None,
    };

    let pb = if progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        Some(pb)
    } else {
        None
    };

    let stats = annotator.annotate_with_progress(
        reader,
        &mut writer,
        failed.as_mut().map(|w| w as &mut dyn Write),
        |stats: &BatchStats| {
            if let Some(pb) = &pb {
                pb.set_message(format!(
                    "{} rows, {} batches ({} failed), {:.0} rows/s",
                    stats.rows,
                    stats.batches,
                    stats.failed_batches,
                    stats.rows_per_second()
                ));
                pb.tick();
            }
        },
    )?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    if let Some(failed) = failed.as_mut() {
        failed.flush()?;
    }

    if stats.has_failures() {
        tracing::warn!(
            failed_batches = stats.failed_batches,
            failed_rows = stats.failed_rows,
            "some batches could not be annotated"
        );
    }
    eprintln!(
        "Annotated {}/{} rows in {} batch(es) ({} not found, {} invalid, {} failed)",
        stats.annotated,
        stats.rows,
        stats.batches,
        stats.not_found,
        stats.invalid,
        stats.failed_rows
    );

    Ok(ExitCode::SUCCESS)
}
