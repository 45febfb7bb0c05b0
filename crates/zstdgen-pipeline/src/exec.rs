//! Blocking child-process execution.
//!
//! All external tools run synchronously with their output streamed straight
//! to ours. No timeouts are applied.

use std::process::Command;

use thiserror::Error;
use tracing::debug;

/// A child process could not be started or exited unsuccessfully.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {}", describe_code(*code))]
    Status { program: String, code: Option<i32> },
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Program name of a command, for diagnostics.
pub fn program_name(cmd: &Command) -> String {
    cmd.get_program().to_string_lossy().into_owned()
}

/// Render a command line for logging.
pub fn display_command(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|a| a.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run `cmd` to completion, inheriting stdio.
pub fn run(cmd: &mut Command) -> Result<(), ExecError> {
    let program = program_name(cmd);
    debug!(
        command = %display_command(cmd),
        dir = ?cmd.get_current_dir(),
        "running"
    );
    let status = cmd.status().map_err(|source| ExecError::Spawn {
        program: program.clone(),
        source,
    })?;
    if status.success() {
        Ok(())
    } else {
        Err(ExecError::Status {
            program,
            code: status.code(),
        })
    }
}
