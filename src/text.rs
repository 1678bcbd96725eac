//! Line model for the graph-text format.
//!
//! A graph-text file declares its total row count on line 1 and then carries
//! one line per node: the whitespace-separated destination ids of that node's
//! outgoing edges, or an empty line for a node with none. Every line must be
//! newline-terminated, including the last.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{HopperError, Result};

/// Raw line access to a graph-text file.
///
/// Yields each line with its trailing newline stripped and fails with a
/// format error on a line that is not newline-terminated. Single pass,
/// forward only; reopen the file to iterate again.
#[derive(Debug)]
pub struct LineReader {
    reader: BufReader<File>,
    path: PathBuf,
    line_no: u64,
}

impl LineReader {
    /// Opens the file without consuming any of it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        Ok(Self {
            reader: BufReader::new(file),
            path,
            line_no: 0,
        })
    }
}

impl Iterator for LineReader {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                self.line_no += 1;
                if line.ends_with('\n') {
                    line.pop();
                    Some(Ok(line))
                } else {
                    Some(Err(HopperError::Format(format!(
                        "missing trailing newline at {}:{}",
                        self.path.display(),
                        self.line_no
                    ))))
                }
            }
            Err(err) => Some(Err(err.into())),
        }
    }
}

/// Parsed row access: the declared row count up front, then one integer row
/// per subsequent line.
#[derive(Debug)]
pub struct RowReader {
    lines: LineReader,
    rows: u32,
}

impl RowReader {
    /// Opens the file and consumes the header line eagerly.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut lines = LineReader::open(path)?;
        let header = match lines.next() {
            Some(line) => line?,
            None => {
                return Err(HopperError::Format(format!(
                    "{}: empty file, expected a row count header",
                    lines.path.display()
                )))
            }
        };
        let rows = header.trim().parse::<u32>().map_err(|_| {
            HopperError::Format(format!(
                "invalid row count {:?} at {}:1",
                header,
                lines.path.display()
            ))
        })?;
        Ok(Self { lines, rows })
    }

    /// Declared total row count from the header line.
    pub fn rows(&self) -> u32 {
        self.rows
    }
}

impl Iterator for RowReader {
    type Item = Result<Vec<u32>>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = match self.lines.next()? {
            Ok(line) => line,
            Err(err) => return Some(Err(err)),
        };
        let mut row = Vec::new();
        for token in line.split_whitespace() {
            match token.parse::<u32>() {
                Ok(id) => row.push(id),
                Err(_) => {
                    return Some(Err(HopperError::Format(format!(
                        "invalid node id {:?} at {}:{}",
                        token,
                        self.lines.path.display(),
                        self.lines.line_no
                    ))))
                }
            }
        }
        Some(Ok(row))
    }
}

/// Counts physical lines without parsing tokens.
///
/// The trailing-newline rule still applies to every line, so a file whose
/// last line is unterminated fails rather than being undercounted.
pub fn num_lines(path: impl AsRef<Path>) -> Result<u64> {
    let reader = LineReader::open(path)?;
    let mut count = 0u64;
    for line in reader {
        line?;
        count += 1;
    }
    Ok(count)
}

/// Fully buffered graph: node count plus one ordered adjacency list per node.
///
/// Edge targets are passed through verbatim; nothing checks them against
/// `nnodes`, that is the downstream consumer's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    /// Declared node count, equal to `adjacency.len()`.
    pub nnodes: u32,
    /// `adjacency[i]` holds node `i`'s outgoing destination ids in order.
    pub adjacency: Vec<Vec<u32>>,
}

impl Graph {
    /// Reads and buffers a whole graph-text file.
    ///
    /// Fails when the declared row count disagrees with the number of data
    /// lines actually present.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = RowReader::open(path)?;
        let nnodes = reader.rows();
        // Every data line is at least one byte, so the file length caps the
        // row count no matter what the header claims.
        let cap = u64::from(nnodes).min(fs::metadata(path)?.len()) as usize;
        let mut adjacency = Vec::with_capacity(cap);
        for row in reader {
            adjacency.push(row?);
        }
        if adjacency.len() != nnodes as usize {
            return Err(HopperError::Format(format!(
                "{} declares {} rows but contains {}",
                path.display(),
                nnodes,
                adjacency.len()
            )));
        }
        debug!(path = %path.display(), nnodes, "graph-text loaded");
        Ok(Self { nnodes, adjacency })
    }

    /// Writes the graph back out as a well-formed graph-text file.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "{}", self.nnodes)?;
        for adj in &self.adjacency {
            let line = adj
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(writer, "{line}")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Total number of edges across all adjacency lists.
    pub fn edge_count(&self) -> u64 {
        self.adjacency.iter().map(|adj| adj.len() as u64).sum()
    }
}
