//! Test-vector generation for exercising the downstream encoder.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;

/// Writes `nnodes` consecutive little-endian `f64` values to `path`, value at
/// index `i` equal to `i % 10`. Deterministic and independent of the CSR
/// format.
pub fn write(nnodes: u64, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    for i in 0..nnodes {
        let value = (i % 10) as f64;
        writer.write_all(&value.to_le_bytes())?;
    }
    writer.flush()?;
    debug!(path = %path.display(), nnodes, "test vector written");
    Ok(())
}

/// Default output name for a test vector of `nnodes` values: `invec{nnodes}`
/// in the working directory.
pub fn default_path(nnodes: u64) -> PathBuf {
    PathBuf::from(format!("invec{nnodes}"))
}
