//! Generation report.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use zstdgen_targets::{ResolutionShape, TargetSpec};

use crate::error::Result;

/// A SHA-256 hex digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ContentHash(pub String);

impl ContentHash {
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentHash(hex_encode(&hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// One emitted source file.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedFile {
    pub target: TargetSpec,
    pub path: PathBuf,
    pub bytes: u64,
    pub sha256: ContentHash,
    /// `CC` override used while transpiling, if any.
    pub compiler: Option<String>,
}

impl GeneratedFile {
    /// Describe a file the transpiler just wrote.
    pub fn inspect(target: &TargetSpec, path: &Path, compiler: Option<&str>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Ok(Self {
            target: target.clone(),
            path: path.to_path_buf(),
            bytes: data.len() as u64,
            sha256: ContentHash::compute(&data),
            compiler: compiler.map(str::to_string),
        })
    }
}

/// Summary of a completed generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub shape: ResolutionShape,
    /// Kept after the run for inspection.
    pub workdir: PathBuf,
    pub combined_source: PathBuf,
    pub files: Vec<GeneratedFile>,
    pub duration_ms: u64,
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Generation Report ===")?;
        writeln!(f, "Resolution: {}", self.shape)?;
        writeln!(f, "Workdir:    {}", self.workdir.display())?;
        writeln!(f, "Combined:   {}", self.combined_source.display())?;
        writeln!(f, "Duration:   {} ms", self.duration_ms)?;
        writeln!(f)?;
        writeln!(f, "--- Generated ({} files) ---", self.files.len())?;
        for file in &self.files {
            writeln!(
                f,
                "  {:<16} {} ({} bytes, sha256 {})",
                file.target.to_string(),
                file.path.display(),
                file.bytes,
                file.sha256,
            )?;
        }
        Ok(())
    }
}
