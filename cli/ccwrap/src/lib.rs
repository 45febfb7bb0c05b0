//! Compiler wrapper shim.
//!
//! `ccwrap` stands in wherever a C compiler command is expected. It resolves
//! the real compiler and a list of extra arguments from the environment,
//! prepends the extras to the arguments it received, and runs the compiler
//! with stdio connected straight through.
//!
//! | Variable | Meaning |
//! |---|---|
//! | `CCWRAP_CC` → `CC` → `cc` | Compiler to run |
//! | `CCWRAP_EXT_ARGS` → `EXT_ARGS` | Space-separated arguments to prepend |
//! | `CCWRAP_SPLIT` | `strict` (default) or `legacy` extra-argument splitting |
//! | `CCWRAP_LOG` | `tracing` filter for the shim's own diagnostics on stderr (default `warn`) |

use std::ffi::OsString;
use std::process::Command;

use thiserror::Error;
use tracing::debug;
use zstdgen_targets::EnvSnapshot;

pub const COMPILER_CHAIN: [&str; 2] = ["CCWRAP_CC", "CC"];
pub const DEFAULT_COMPILER: &str = "cc";
pub const EXTRA_ARGS_CHAIN: [&str; 2] = ["CCWRAP_EXT_ARGS", "EXT_ARGS"];
pub const SPLIT_MODE_VAR: &str = "CCWRAP_SPLIT";

/// Errors raised by the shim.
#[derive(Debug, Error)]
pub enum WrapperError {
    #[error("unknown CCWRAP_SPLIT value '{value}' (expected strict or legacy)")]
    UnknownSplitMode { value: String },

    #[error("failed to launch {compiler}: {source}")]
    Launch {
        compiler: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{compiler} failed ({})", code.map_or("killed by signal".to_string(), |c| format!("exit status {c}")))]
    Failed { compiler: String, code: Option<i32> },
}

/// How the extra-arguments string is split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitMode {
    /// Unset or empty yields no arguments; empty tokens are dropped.
    #[default]
    Strict,
    /// Split verbatim on every space. Unset yields a single empty argument,
    /// which reaches the compiler as a literal `""`.
    Legacy,
}

impl SplitMode {
    pub fn from_env(env: &EnvSnapshot) -> Result<Self, WrapperError> {
        match env.get(SPLIT_MODE_VAR) {
            None | Some("strict") => Ok(SplitMode::Strict),
            Some("legacy") => Ok(SplitMode::Legacy),
            Some(other) => Err(WrapperError::UnknownSplitMode {
                value: other.to_string(),
            }),
        }
    }
}

/// Split the configured extra-arguments string on single spaces.
pub fn split_extra_args(raw: Option<&str>, mode: SplitMode) -> Vec<String> {
    match mode {
        SplitMode::Strict => raw
            .unwrap_or("")
            .split(' ')
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        SplitMode::Legacy => raw.unwrap_or("").split(' ').map(str::to_string).collect(),
    }
}

/// Resolved wrapper configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperConfig {
    pub compiler: String,
    pub extra_args: Vec<String>,
}

impl WrapperConfig {
    pub fn from_env(env: &EnvSnapshot) -> Result<Self, WrapperError> {
        let mode = SplitMode::from_env(env)?;
        Ok(Self {
            compiler: env
                .first_set_or(&COMPILER_CHAIN, DEFAULT_COMPILER)
                .to_string(),
            extra_args: split_extra_args(env.first_set(&EXTRA_ARGS_CHAIN), mode),
        })
    }

    /// Extra arguments followed by the received ones, order preserved.
    pub fn argv<I>(&self, received: I) -> Vec<OsString>
    where
        I: IntoIterator<Item = OsString>,
    {
        self.extra_args
            .iter()
            .map(OsString::from)
            .chain(received)
            .collect()
    }

    /// The compiler command, with stdio inherited from the shim.
    pub fn command<I>(&self, received: I) -> Command
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut cmd = Command::new(&self.compiler);
        cmd.args(self.argv(received));
        cmd
    }
}

/// Run the wrapped compiler to completion.
///
/// Any failure is reported as an error. The compiler's own exit status is
/// not forwarded; callers only learn that it failed.
pub fn run<I>(config: &WrapperConfig, received: I) -> Result<(), WrapperError>
where
    I: IntoIterator<Item = OsString>,
{
    let mut cmd = config.command(received);
    debug!(compiler = %config.compiler, args = ?cmd.get_args().collect::<Vec<_>>(), "exec");
    let status = cmd.status().map_err(|source| WrapperError::Launch {
        compiler: config.compiler.clone(),
        source,
    })?;
    if status.success() {
        Ok(())
    } else {
        Err(WrapperError::Failed {
            compiler: config.compiler.clone(),
            code: status.code(),
        })
    }
}
