//! Row-aligned partitioning of graph-text files.
//!
//! `split` shards one graph-text file into `blocks` output files. Every
//! output declares the source's full row count and carries exactly that many
//! data lines: the contiguous range a partition owns is copied verbatim, all
//! other rows are blank. Each partition can then feed an independent
//! downstream encoder job with no coordination between jobs.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{HopperError, Result};
use crate::text::LineReader;

/// Extension required of partitioner inputs and carried by its outputs.
pub const GRAPH_TEXT_EXT: &str = ".graph-text";

/// Output path for partition `tid` of `blocks`:
/// `{basename}.{blocks}.{tid}.graph-text`.
///
/// The input must end in `.graph-text`; the basename is everything before
/// that extension.
pub fn partition_path(input: impl AsRef<Path>, blocks: u32, tid: u32) -> Result<PathBuf> {
    let input = input.as_ref();
    let name = input.to_str().ok_or_else(|| {
        HopperError::InvalidArgument(format!(
            "partitioner input path is not valid UTF-8: {}",
            input.display()
        ))
    })?;
    let base = name.strip_suffix(GRAPH_TEXT_EXT).ok_or_else(|| {
        HopperError::InvalidArgument(format!(
            "partitioner input must end in {GRAPH_TEXT_EXT}: {name}"
        ))
    })?;
    Ok(PathBuf::from(format!("{base}.{blocks}.{tid}{GRAPH_TEXT_EXT}")))
}

/// Summary of one partitioning run.
#[derive(Debug, Clone, Serialize)]
pub struct SplitReport {
    /// Row count declared by the input and by every output.
    pub rows: u32,
    /// Number of partition files produced.
    pub blocks: u32,
    /// Rows owned by each partition; the last partition may own fewer.
    pub row_block_size: u32,
    /// Paths of the produced partition files, indexed by tid.
    pub outputs: Vec<String>,
}

/// One open partition file and the bookkeeping needed to finish it.
///
/// Row counts are tracked in u64 so the pre-pad arithmetic cannot wrap for
/// degenerate block geometries.
#[derive(Debug)]
struct BlockWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    rows_written: u64,
}

impl BlockWriter {
    /// Creates the file, writes the `rows` header, and pre-pads the blank
    /// rows preceding the owned range.
    fn create(path: PathBuf, rows: u32, prepad: u64) -> Result<Self> {
        let mut writer = BufWriter::new(File::create(&path)?);
        writeln!(writer, "{rows}")?;
        for _ in 0..prepad {
            writer.write_all(b"\n")?;
        }
        Ok(Self {
            writer,
            path,
            rows_written: prepad,
        })
    }

    fn write_row(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.rows_written += 1;
        Ok(())
    }

    /// Pads blank rows up to `rows` and closes the file.
    fn finish(mut self, rows: u32) -> Result<PathBuf> {
        while self.rows_written < u64::from(rows) {
            self.writer.write_all(b"\n")?;
            self.rows_written += 1;
        }
        assert_eq!(
            self.rows_written,
            u64::from(rows),
            "partition {} closed with the wrong row count",
            self.path.display()
        );
        self.writer.flush()?;
        Ok(self.path)
    }
}

enum BlockState {
    Between,
    Writing { writer: BlockWriter, to_read: u32 },
}

/// Splits a graph-text file into `blocks` row-aligned partition files next to
/// the input.
///
/// Partition `tid` owns rows `[tid * row_block_size, (tid + 1) *
/// row_block_size)` clamped to `rows`, where `row_block_size =
/// ceil(rows / blocks)`. The input is consumed in a single sequential pass
/// and owned lines are copied byte-for-byte.
///
/// # Errors
///
/// `blocks` outside `1..=rows` is rejected up front, as is a geometry whose
/// ceil-rounded block size leaves a trailing block with no rows, as is an
/// input whose data-line count disagrees with its declared row count. Those
/// three checks leave the closing count assertions as purely internal
/// invariants.
pub fn split(input: impl AsRef<Path>, blocks: u32) -> Result<SplitReport> {
    let input = input.as_ref();
    // Resolve the naming scheme before touching the input so a bad extension
    // fails before any output exists.
    partition_path(input, blocks, 0)?;

    let mut lines = LineReader::open(input)?;
    let header = match lines.next() {
        Some(line) => line?,
        None => {
            return Err(HopperError::Format(format!(
                "{}: empty file, expected a row count header",
                input.display()
            )))
        }
    };
    let rows = header.trim().parse::<u32>().map_err(|_| {
        HopperError::Format(format!("invalid row count {:?} at {}:1", header, input.display()))
    })?;

    if blocks == 0 {
        return Err(HopperError::InvalidArgument("blocks must be at least 1".into()));
    }
    if blocks > rows {
        return Err(HopperError::InvalidArgument(format!(
            "cannot split {rows} rows into {blocks} blocks"
        )));
    }
    let row_block_size = rows.div_ceil(blocks);
    // ceil rounding can starve trailing blocks, e.g. 5 rows over 4 blocks
    // gives blocks of 2 and nothing left for the last one.
    if u64::from(blocks - 1) * u64::from(row_block_size) >= u64::from(rows) {
        return Err(HopperError::InvalidArgument(format!(
            "cannot split {rows} rows into {blocks} blocks: block {} would own no rows",
            blocks - 1
        )));
    }
    debug!(
        input = %input.display(),
        rows,
        blocks,
        row_block_size,
        "splitting graph-text file"
    );

    let mut outputs: Vec<PathBuf> = Vec::with_capacity(blocks as usize);
    let mut state = BlockState::Between;
    let mut next_tid = 0u32;
    let mut seen = 0u64;

    for line in lines {
        let line = line?;
        seen += 1;
        if seen > u64::from(rows) {
            return Err(HopperError::Format(format!(
                "{}: more than the declared {rows} data lines",
                input.display()
            )));
        }
        state = match state {
            BlockState::Between => {
                let path = partition_path(input, blocks, next_tid)?;
                let prepad = u64::from(next_tid) * u64::from(row_block_size);
                let mut writer = BlockWriter::create(path, rows, prepad)?;
                writer.write_row(&line)?;
                next_tid += 1;
                if row_block_size == 1 {
                    outputs.push(writer.finish(rows)?);
                    BlockState::Between
                } else {
                    BlockState::Writing {
                        writer,
                        to_read: row_block_size - 1,
                    }
                }
            }
            BlockState::Writing { mut writer, to_read } => {
                writer.write_row(&line)?;
                if to_read == 1 {
                    outputs.push(writer.finish(rows)?);
                    BlockState::Between
                } else {
                    BlockState::Writing {
                        writer,
                        to_read: to_read - 1,
                    }
                }
            }
        };
    }

    if seen < u64::from(rows) {
        return Err(HopperError::Format(format!(
            "{}: declares {rows} rows but contains {seen}",
            input.display()
        )));
    }
    if let BlockState::Writing { writer, .. } = state {
        outputs.push(writer.finish(rows)?);
    }
    assert_eq!(
        outputs.len(),
        blocks as usize,
        "produced {} partitions, expected {blocks}",
        outputs.len()
    );

    info!(
        input = %input.display(),
        rows,
        blocks,
        row_block_size,
        "split.completed"
    );
    Ok(SplitReport {
        rows,
        blocks,
        row_block_size,
        outputs: outputs
            .iter()
            .map(|path| path.display().to_string())
            .collect(),
    })
}
