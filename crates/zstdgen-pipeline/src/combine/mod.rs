//! Single-file combination of the library sources.
//!
//! Two combiners share one [`CombineSpec`]: the upstream `combine.py` script,
//! and a native reimplementation of the same inlining rules.

mod native;
mod script;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub use native::NativeCombiner;
pub use script::ScriptCombiner;

use crate::error::Result;
use crate::fetch::Workdir;

/// What to combine and where to put it. Paths are relative to the checkout
/// unless noted otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombineSpec {
    /// Directory holding the combiner script and its input.
    pub script_dir: PathBuf,
    /// Entry translation unit, relative to `script_dir`.
    pub input: PathBuf,
    /// Include search roots.
    pub roots: Vec<PathBuf>,
    /// Headers never inlined, relative to a root.
    pub excludes: Vec<PathBuf>,
    /// Keep `#include` directives for excluded headers instead of dropping them.
    pub keep_excluded: bool,
    /// Output file name, placed in the workdir root.
    pub output: PathBuf,
}

impl Default for CombineSpec {
    fn default() -> Self {
        Self {
            script_dir: PathBuf::from("build/single_file_libs"),
            input: PathBuf::from("zstd-in.c"),
            roots: vec![PathBuf::from("lib")],
            excludes: vec![PathBuf::from("legacy/zstd_legacy.h")],
            keep_excluded: false,
            output: PathBuf::from("zstd.c"),
        }
    }
}

impl CombineSpec {
    /// Absolute path of the combined translation unit.
    pub fn output_path(&self, workdir: &Workdir) -> PathBuf {
        workdir.root().join(&self.output)
    }
}

/// Flattens a multi-file C tree into one translation unit.
pub trait Combiner {
    /// Combine the checkout in `workdir`, returning the output path.
    fn combine(&self, workdir: &Workdir, spec: &CombineSpec) -> Result<PathBuf>;
}

/// Which combiner implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinerKind {
    /// `python3 combine.py` from the upstream tree.
    Script,
    /// [`NativeCombiner`].
    Native,
}

impl CombinerKind {
    pub fn build(self) -> Box<dyn Combiner> {
        match self {
            CombinerKind::Script => Box::new(ScriptCombiner::default()),
            CombinerKind::Native => Box::new(NativeCombiner),
        }
    }
}

impl fmt::Display for CombinerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombinerKind::Script => f.write_str("script"),
            CombinerKind::Native => f.write_str("native"),
        }
    }
}

impl FromStr for CombinerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "script" => Ok(CombinerKind::Script),
            "native" => Ok(CombinerKind::Native),
            other => Err(format!(
                "unknown combiner '{other}' (expected script or native)"
            )),
        }
    }
}
