//! CSR binary format: the flat on-disk layout handed to the downstream
//! compressed-graph encoder.
//!
//! Layout, all integers little-endian:
//!
//! | offset | size          | field                                    |
//! |--------|---------------|------------------------------------------|
//! | 0      | 4             | `edge_width_tag`, always 132             |
//! | 4      | 4             | `node_width_tag`, always 0               |
//! | 8      | 4             | `nnodes`                                 |
//! | 12     | 8*(nnodes+1)  | `offsets`, cumulative edge counts        |
//! | ...    | 4*offsets[nnodes] | `edges`, adjacency lists in node order |
//!
//! The two tag fields are historical format discriminators whose upstream
//! meaning is undocumented; they are preserved bit-exactly and never
//! interpreted.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{HopperError, Result};
use crate::text::Graph;

/// Edge-id width tag written by the encoder.
pub const EDGE_WIDTH_TAG: u32 = 132;
/// Node-id width tag written by the encoder.
pub const NODE_WIDTH_TAG: u32 = 0;
/// Bytes preceding the offsets array: two tags plus the node count.
pub const HEADER_LEN: usize = 12;

/// Encodes a buffered graph into a CSR binary file, creating or overwriting
/// `path`.
///
/// The complete offsets table precedes all edge data in the file, so the
/// adjacency structure is traversed twice: once accumulating offsets, once
/// emitting edge ids. Output is deterministic; re-encoding the same graph
/// yields byte-identical files.
pub fn write(graph: &Graph, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);

    let mut header = [0u8; HEADER_LEN];
    header[0..4].copy_from_slice(&EDGE_WIDTH_TAG.to_le_bytes());
    header[4..8].copy_from_slice(&NODE_WIDTH_TAG.to_le_bytes());
    header[8..12].copy_from_slice(&graph.nnodes.to_le_bytes());
    writer.write_all(&header)?;

    // Offsets pass.
    let mut acc = 0u64;
    writer.write_all(&acc.to_le_bytes())?;
    for adj in &graph.adjacency {
        acc += adj.len() as u64;
        writer.write_all(&acc.to_le_bytes())?;
    }

    // Edges pass.
    for adj in &graph.adjacency {
        for target in adj {
            writer.write_all(&target.to_le_bytes())?;
        }
    }
    writer.flush()?;

    debug!(path = %path.display(), nnodes = graph.nnodes, edges = acc, "csr file written");
    Ok(())
}

/// Reads a graph-text file and writes its CSR binary encoding.
pub fn encode_file(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
    let graph = Graph::read(input)?;
    write(&graph, output)
}

/// Decoded contents of a CSR binary file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrFile {
    /// Edge-id width tag, preserved verbatim from the header.
    pub edge_width_tag: u32,
    /// Node-id width tag, preserved verbatim from the header.
    pub node_width_tag: u32,
    /// Node count.
    pub nnodes: u32,
    /// Cumulative edge counts; `nnodes + 1` entries starting at 0.
    pub offsets: Vec<u64>,
    /// Concatenated adjacency lists, `offsets[nnodes]` entries.
    pub edges: Vec<u32>,
}

impl CsrFile {
    /// Decodes a CSR binary file.
    ///
    /// Truncation anywhere in the declared header or arrays is corruption, as
    /// is an offsets table that does not start at 0 or decreases. Bytes after
    /// the declared arrays are tolerated; they only show up as an
    /// expected/actual length mismatch in [`inspect`].
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        let mut header = [0u8; HEADER_LEN];
        read_exact_value(&mut reader, &mut header, "header")?;
        let edge_width_tag = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let node_width_tag = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        let nnodes = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);

        // The declared counts are untrusted until the arrays are read;
        // reservation hints are bounded by the bytes actually present.
        let body_len = file_len.saturating_sub(HEADER_LEN as u64);
        let offsets_len = u64::from(nnodes) + 1;
        let mut offsets = Vec::with_capacity(offsets_len.min(body_len / 8) as usize);
        let mut buf8 = [0u8; 8];
        for i in 0..=u64::from(nnodes) {
            read_exact_value(&mut reader, &mut buf8, "offsets array")?;
            let offset = u64::from_le_bytes(buf8);
            if i == 0 && offset != 0 {
                return Err(HopperError::Corruption(format!(
                    "{}: first offset is {offset}, expected 0",
                    path.display()
                )));
            }
            if let Some(prev) = offsets.last() {
                if offset < *prev {
                    return Err(HopperError::Corruption(format!(
                        "{}: offsets decrease at entry {i} ({prev} -> {offset})",
                        path.display()
                    )));
                }
            }
            offsets.push(offset);
        }

        let nedges = offsets[nnodes as usize];
        let edges_body = body_len.saturating_sub(8 * offsets_len);
        let mut edges = Vec::with_capacity(nedges.min(edges_body / 4) as usize);
        let mut buf4 = [0u8; 4];
        for _ in 0..nedges {
            read_exact_value(&mut reader, &mut buf4, "edge array")?;
            edges.push(u32::from_le_bytes(buf4));
        }

        Ok(Self {
            edge_width_tag,
            node_width_tag,
            nnodes,
            offsets,
            edges,
        })
    }

    /// Adjacency list of `node`: `edges[offsets[node]..offsets[node + 1]]`.
    ///
    /// # Panics
    ///
    /// Panics if `node >= nnodes`.
    pub fn neighbors(&self, node: u32) -> &[u32] {
        let lo = self.offsets[node as usize] as usize;
        let hi = self.offsets[node as usize + 1] as usize;
        &self.edges[lo..hi]
    }

    /// Length a well-formed file with these contents occupies on disk.
    pub fn expected_file_len(&self) -> u64 {
        HEADER_LEN as u64 + 8 * (u64::from(self.nnodes) + 1) + 4 * self.edges.len() as u64
    }
}

/// Everything `hopper inspect` reports about a CSR file.
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    /// Input path as given.
    pub path: String,
    /// Edge-id width tag from the header.
    pub edge_width_tag: u32,
    /// Node-id width tag from the header.
    pub node_width_tag: u32,
    /// Node count.
    pub nnodes: u32,
    /// Total edge entries.
    pub edge_count: u64,
    /// File length implied by the declared contents.
    pub expected_len: u64,
    /// File length actually on disk.
    pub actual_len: u64,
    /// Full offsets table.
    pub offsets: Vec<u64>,
    /// Per-node adjacency lists, when requested.
    pub adjacency: Option<Vec<Vec<u32>>>,
}

/// Decodes a CSR file and gathers the fields the inspect command prints.
///
/// A length mismatch between declared contents and the on-disk file is
/// logged and reported, not failed; the decode itself already established
/// structural consistency.
pub fn inspect(path: impl AsRef<Path>, include_adjacency: bool) -> Result<InspectReport> {
    let path = path.as_ref();
    let csr = CsrFile::read(path)?;
    let actual_len = fs::metadata(path)?.len();
    let expected_len = csr.expected_file_len();
    if expected_len != actual_len {
        warn!(
            path = %path.display(),
            expected_len,
            actual_len,
            "file length differs from declared contents"
        );
    }

    let edge_count = csr.edges.len() as u64;
    let adjacency = if include_adjacency {
        Some(
            (0..csr.nnodes)
                .map(|node| csr.neighbors(node).to_vec())
                .collect(),
        )
    } else {
        None
    };

    Ok(InspectReport {
        path: path.display().to_string(),
        edge_width_tag: csr.edge_width_tag,
        node_width_tag: csr.node_width_tag,
        nnodes: csr.nnodes,
        edge_count,
        expected_len,
        actual_len,
        offsets: csr.offsets,
        adjacency,
    })
}

fn read_exact_value(reader: &mut impl Read, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|err| {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            HopperError::Corruption(format!("truncated CSR file while reading {what}"))
        } else {
            HopperError::Io(err)
        }
    })
}
