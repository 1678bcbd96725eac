//! Graph input preparation for a downstream compressed-graph encoder.
//!
//! Converts line-oriented adjacency-list graph text into the flat binary CSR
//! layout the encoder consumes, and shards graph-text files into row-aligned
//! partitions so several encoder jobs can run in parallel on one graph.

#![warn(missing_docs)]

pub mod csr;
pub mod error;
pub mod invec;
pub mod logging;
pub mod partition;
pub mod prepare;
pub mod text;
