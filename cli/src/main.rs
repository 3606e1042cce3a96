//! otelgate CLI
//!
//! Command-line companion of the otelgate ingestion gateway.
//!
//! # Usage
//!
//! ```bash
//! otelgate --help
//! otelgate digest --secret "$OTELGATE_TOKEN_SECRET" my-raw-token
//! otelgate inspect --signal logs export.pb
//! ```

#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use shared::ingest::IngestSummary;
use shared::models::SignalKind;
use shared::otlp::conversions::{
    convert_logs_request, convert_metrics_request, convert_trace_request, Conversion,
};
use shared::otlp::payload::{decode_request, PayloadFormat};
use shared::tenancy::TokenDigester;
use std::io::Write;
use std::path::{Path, PathBuf};

/// otelgate CLI - token digests and offline OTLP payload inspection
#[derive(Parser)]
#[command(name = "otelgate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token-store key of a raw access token
    Digest {
        /// Secret keying the digest
        #[arg(long, env = "OTELGATE_TOKEN_SECRET", hide_env_values = true)]
        secret: String,

        /// Raw access token
        token: String,
    },

    /// Convert an OTLP export request file and print the documents as JSON lines
    Inspect {
        /// Signal kind of the export request
        #[arg(long, value_enum)]
        signal: Signal,

        /// Body encoding; guessed from the file extension when omitted
        #[arg(long, value_enum)]
        format: Option<Format>,

        /// Export request file
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Signal {
    Traces,
    Metrics,
    Logs,
}

impl From<Signal> for SignalKind {
    fn from(signal: Signal) -> Self {
        match signal {
            Signal::Traces => Self::Traces,
            Signal::Metrics => Self::Metrics,
            Signal::Logs => Self::Logs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Protobuf,
    Json,
}

impl From<Format> for PayloadFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Protobuf => Self::Protobuf,
            Format::Json => Self::Json,
        }
    }
}

/// Picks the body encoding from a file extension.
fn format_for(path: &Path) -> PayloadFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => PayloadFormat::Json,
        _ => PayloadFormat::Protobuf,
    }
}

fn write_documents<T: Serialize>(
    conversion: Conversion<T>,
    out: &mut impl Write,
) -> Result<IngestSummary> {
    for record in &conversion.records {
        serde_json::to_writer(&mut *out, record)?;
        writeln!(out)?;
    }
    Ok(IngestSummary {
        accepted: conversion.records.len(),
        rejected: conversion.rejected_count(),
        errors: conversion.rejected.iter().map(ToString::to_string).collect(),
    })
}

/// Decodes and converts an export request body, writing one JSON document per line.
fn inspect(
    signal: SignalKind,
    body: &[u8],
    format: PayloadFormat,
    out: &mut impl Write,
) -> Result<IngestSummary> {
    match signal {
        SignalKind::Traces => {
            write_documents(convert_trace_request(&decode_request(body, format)?), out)
        }
        SignalKind::Metrics => {
            write_documents(convert_metrics_request(&decode_request(body, format)?), out)
        }
        SignalKind::Logs => {
            write_documents(convert_logs_request(&decode_request(body, format)?), out)
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Digest { secret, token }) => {
            let digester = TokenDigester::new(secret)?;
            println!("{}", digester.digest(&token));
        }
        Some(Commands::Inspect {
            signal,
            format,
            file,
        }) => {
            let body = std::fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let format = format.map_or_else(|| format_for(&file), PayloadFormat::from);

            let stdout = std::io::stdout();
            let summary = inspect(signal.into(), &body, format, &mut stdout.lock())?;

            eprintln!("{}", serde_json::to_string(&summary)?);
        }
        None => {
            println!("otelgate CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
