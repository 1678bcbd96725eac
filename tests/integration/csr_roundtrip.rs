#![allow(missing_docs)]

use std::fs;

use hopper::{
    csr::{self, CsrFile},
    error::{HopperError, Result},
    text::Graph,
};
use tempfile::tempdir;

// "3\n1 2\n\n0\n" encoded by hand: tags 132 and 0, three nodes,
// ps=[0,2,2,3], ds=[1,2,0].
const GOLDEN_TEXT: &str = "3\n1 2\n\n0\n";
const GOLDEN_CSR: [u8; 56] = [
    0x84, 0x00, 0x00, 0x00, // edge_width_tag = 132
    0x00, 0x00, 0x00, 0x00, // node_width_tag = 0
    0x03, 0x00, 0x00, 0x00, // nnodes = 3
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // ps[0] = 0
    0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // ps[1] = 2
    0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // ps[2] = 2
    0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // ps[3] = 3
    0x01, 0x00, 0x00, 0x00, // ds[0] = 1
    0x02, 0x00, 0x00, 0x00, // ds[1] = 2
    0x00, 0x00, 0x00, 0x00, // ds[2] = 0
];

#[test]
fn golden_graph_encodes_to_the_documented_bytes() -> Result<()> {
    let dir = tempdir()?;
    let text_path = dir.path().join("golden.graph-text");
    fs::write(&text_path, GOLDEN_TEXT)?;

    let csr_path = dir.path().join("golden.csr");
    csr::encode_file(&text_path, &csr_path)?;

    let bytes = fs::read(&csr_path)?;
    assert_eq!(bytes, GOLDEN_CSR, "encoded bytes differ from the golden file");
    Ok(())
}

#[test]
fn golden_bytes_decode_to_the_documented_arrays() -> Result<()> {
    let dir = tempdir()?;
    let csr_path = dir.path().join("golden.csr");
    fs::write(&csr_path, GOLDEN_CSR)?;

    let decoded = CsrFile::read(&csr_path)?;
    assert_eq!(decoded.edge_width_tag, 132);
    assert_eq!(decoded.node_width_tag, 0);
    assert_eq!(decoded.nnodes, 3);
    assert_eq!(decoded.offsets, vec![0, 2, 2, 3]);
    assert_eq!(decoded.edges, vec![1, 2, 0]);
    Ok(())
}

#[test]
fn encode_then_decode_reproduces_every_adjacency() -> Result<()> {
    let dir = tempdir()?;
    let text_path = dir.path().join("web.graph-text");
    fs::write(&text_path, "5\n1 2 3\n\n0 4\n4 4\n\n")?;

    let csr_path = dir.path().join("web.csr");
    csr::encode_file(&text_path, &csr_path)?;

    let graph = Graph::read(&text_path)?;
    let decoded = CsrFile::read(&csr_path)?;
    assert_eq!(decoded.nnodes, graph.nnodes);
    assert_eq!(decoded.offsets.len() as u32, decoded.nnodes + 1);
    assert_eq!(decoded.edges.len() as u64, decoded.offsets[decoded.nnodes as usize]);
    for (node, adj) in graph.adjacency.iter().enumerate() {
        assert_eq!(
            decoded.neighbors(node as u32),
            adj.as_slice(),
            "adjacency of node {node}"
        );
    }
    Ok(())
}

#[test]
fn repeated_nodes_and_self_loops_pass_through_verbatim() -> Result<()> {
    let dir = tempdir()?;
    let text_path = dir.path().join("loops.graph-text");
    fs::write(&text_path, "2\n0 0 1 1 0\n1\n")?;

    let csr_path = dir.path().join("loops.csr");
    csr::encode_file(&text_path, &csr_path)?;

    let decoded = CsrFile::read(&csr_path)?;
    assert_eq!(decoded.neighbors(0), &[0, 0, 1, 1, 0]);
    assert_eq!(decoded.neighbors(1), &[1]);
    Ok(())
}

#[test]
fn encoding_twice_is_byte_identical() -> Result<()> {
    let dir = tempdir()?;
    let text_path = dir.path().join("web.graph-text");
    fs::write(&text_path, "4\n1 2\n3\n\n0 1 2\n")?;

    let first = dir.path().join("first.csr");
    let second = dir.path().join("second.csr");
    csr::encode_file(&text_path, &first)?;
    csr::encode_file(&text_path, &second)?;

    assert_eq!(fs::read(&first)?, fs::read(&second)?);
    Ok(())
}

#[test]
fn zero_node_graph_encodes_and_decodes() -> Result<()> {
    let dir = tempdir()?;
    let text_path = dir.path().join("empty.graph-text");
    fs::write(&text_path, "0\n")?;

    let csr_path = dir.path().join("empty.csr");
    csr::encode_file(&text_path, &csr_path)?;

    // Header plus the single ps[0] = 0 entry.
    assert_eq!(fs::metadata(&csr_path)?.len(), 20);
    let decoded = CsrFile::read(&csr_path)?;
    assert_eq!(decoded.nnodes, 0);
    assert_eq!(decoded.offsets, vec![0]);
    assert!(decoded.edges.is_empty());
    Ok(())
}

#[test]
fn header_only_truncation_is_corruption() -> Result<()> {
    let dir = tempdir()?;
    let csr_path = dir.path().join("short.csr");
    fs::write(&csr_path, &GOLDEN_CSR[..10])?;

    let err = CsrFile::read(&csr_path).expect_err("partial header must fail");
    assert!(
        matches!(err, HopperError::Corruption(ref msg) if msg.contains("header")),
        "unexpected error: {err}"
    );
    Ok(())
}

#[test]
fn offsets_truncation_is_corruption() -> Result<()> {
    let dir = tempdir()?;
    let csr_path = dir.path().join("short_ps.csr");
    fs::write(&csr_path, &GOLDEN_CSR[..30])?;

    let err = CsrFile::read(&csr_path).expect_err("partial offsets must fail");
    assert!(
        matches!(err, HopperError::Corruption(ref msg) if msg.contains("offsets")),
        "unexpected error: {err}"
    );
    Ok(())
}
