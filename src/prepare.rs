//! One-shot pipeline: split a graph-text file and encode every partition.
//!
//! Mirrors the manual workflow of running `split`, then `encode` per
//! partition, then optionally the external compressed-graph encoder on each
//! CSR file. The external encoder is an opaque collaborator invoked as
//! `encoder --input_path <csr> --output_path <out>`; it is never
//! reimplemented here.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::csr;
use crate::error::{HopperError, Result};
use crate::partition::{self, partition_path, GRAPH_TEXT_EXT};

/// Options for the prepare pipeline.
#[derive(Clone, Debug, Default)]
pub struct PrepareOptions {
    /// External encoder binary to run on each partition's CSR file. When
    /// absent the pipeline stops after CSR conversion.
    pub encoder: Option<PathBuf>,
}

/// Report generated after a prepare run completes.
#[derive(Debug, Clone, Serialize)]
pub struct PrepareReport {
    /// Row count of the input graph.
    pub rows: u32,
    /// Partitions produced and encoded.
    pub blocks: u32,
    /// Wall-clock duration of the whole pipeline in milliseconds.
    pub duration_ms: f64,
    /// Per-partition artifacts, indexed by tid.
    pub partitions: Vec<PartitionArtifacts>,
}

/// Paths produced for one partition.
#[derive(Debug, Clone, Serialize)]
pub struct PartitionArtifacts {
    /// Partition id.
    pub tid: u32,
    /// Row-aligned graph-text shard.
    pub graph_text: String,
    /// CSR binary encoding of the shard.
    pub csr: String,
    /// External encoder output, when an encoder was configured.
    pub encoded: Option<String>,
}

/// Runs split, per-partition CSR conversion, and the optional external
/// encoder over `input`.
pub fn run(input: impl AsRef<Path>, blocks: u32, opts: &PrepareOptions) -> Result<PrepareReport> {
    let input = input.as_ref();
    let start = Instant::now();
    let split_report = partition::split(input, blocks)?;

    let mut partitions = Vec::with_capacity(blocks as usize);
    for tid in 0..blocks {
        let graph_text = partition_path(input, blocks, tid)?;
        let csr_path = with_suffix(&graph_text, ".csr")?;
        csr::encode_file(&graph_text, &csr_path)?;

        let encoded = match &opts.encoder {
            Some(encoder) => {
                let out = with_suffix(&graph_text, ".csrz")?;
                run_encoder(encoder, &csr_path, &out)?;
                Some(out.display().to_string())
            }
            None => None,
        };
        partitions.push(PartitionArtifacts {
            tid,
            graph_text: graph_text.display().to_string(),
            csr: csr_path.display().to_string(),
            encoded,
        });
    }

    let report = PrepareReport {
        rows: split_report.rows,
        blocks,
        duration_ms: start.elapsed().as_secs_f64() * 1_000.0,
        partitions,
    };
    info!(
        input = %input.display(),
        rows = report.rows,
        blocks = report.blocks,
        encoder = opts.encoder.is_some(),
        duration_ms = report.duration_ms,
        "prepare.completed"
    );
    Ok(report)
}

/// Swaps a partition file's `.graph-text` extension for `suffix`.
fn with_suffix(path: &Path, suffix: &str) -> Result<PathBuf> {
    let name = path.to_str().ok_or_else(|| {
        HopperError::InvalidArgument(format!("path is not valid UTF-8: {}", path.display()))
    })?;
    match name.strip_suffix(GRAPH_TEXT_EXT) {
        Some(base) => Ok(PathBuf::from(format!("{base}{suffix}"))),
        None => Err(HopperError::InvalidArgument(format!(
            "expected a {GRAPH_TEXT_EXT} path: {name}"
        ))),
    }
}

fn run_encoder(encoder: &Path, input: &Path, output: &Path) -> Result<()> {
    debug!(
        encoder = %encoder.display(),
        input = %input.display(),
        output = %output.display(),
        "running external encoder"
    );
    let status = Command::new(encoder)
        .arg("--input_path")
        .arg(input)
        .arg("--output_path")
        .arg(output)
        .status()
        .map_err(|err| {
            HopperError::Encoder(format!("failed to run {}: {err}", encoder.display()))
        })?;
    if !status.success() {
        return Err(HopperError::Encoder(format!(
            "{} failed ({status}) for {}",
            encoder.display(),
            input.display()
        )));
    }
    Ok(())
}
