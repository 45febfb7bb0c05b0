//! Pipeline errors.
//!
//! Every stage has its own variant so callers can tell a transient fetch
//! failure from permanent drift between the pinned revision and the patch.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use zstdgen_targets::TargetError;

use crate::exec::ExecError;
use crate::transpile::TranspileFailure;

/// Pipeline stage names, used in logs and error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Fetch,
    Patch,
    Combine,
    Transpile,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Config => "config",
            Stage::Fetch => "fetch",
            Stage::Patch => "patch",
            Stage::Combine => "combine",
            Stage::Transpile => "transpile",
        };
        f.write_str(s)
    }
}

/// Errors that can occur while generating bindings.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("invalid configuration: {message}")]
    Config { message: String },

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error("fetching upstream source failed: {0}")]
    Fetch(#[source] ExecError),

    #[error("patch file not found: {}", path.display())]
    PatchMissing { path: PathBuf },

    #[error("patch {} no longer applies to the pinned revision; refresh it by hand", path.display())]
    PatchDrift { path: PathBuf },

    #[error("applying patch failed: {0}")]
    Patch(#[source] ExecError),

    #[error("combining sources failed: {message}")]
    Combine { message: String },

    #[error("combiner process failed: {0}")]
    CombineProcess(#[source] ExecError),

    #[error("transpiling for {target} failed: {source}")]
    Transpile {
        target: String,
        #[source]
        source: TranspileFailure,
    },

    #[error("transpiler reported success for {target} but {} was not written", path.display())]
    MissingOutput { target: String, path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GenError {
    /// The stage this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            GenError::Config { .. } | GenError::Target(_) | GenError::Io(_) => Stage::Config,
            GenError::Fetch(_) => Stage::Fetch,
            GenError::PatchMissing { .. } | GenError::PatchDrift { .. } | GenError::Patch(_) => {
                Stage::Patch
            }
            GenError::Combine { .. } | GenError::CombineProcess(_) => Stage::Combine,
            GenError::Transpile { .. } | GenError::MissingOutput { .. } => Stage::Transpile,
        }
    }

    /// Whether retrying the same run could plausibly succeed.
    ///
    /// Only network fetches are treated as transient.
    pub fn is_transient(&self) -> bool {
        matches!(self, GenError::Fetch(_))
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, GenError>;
