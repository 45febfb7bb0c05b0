//! Transpiler seam.
//!
//! The transpiler is an external collaborator. The pipeline only needs a
//! blocking call that takes a target, an option list, and output sinks, and
//! reports success or a structured failure.

use std::io::{self, Read, Write};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Sender};
use std::thread;

use thiserror::Error;
use tracing::debug;
use zstdgen_targets::TargetSpec;

use crate::exec::{self, ExecError};

/// Environment variable the transpiler's toolchain probing consults.
pub const COMPILER_VAR: &str = "CC";

/// One transpiler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranspileTask<'a> {
    pub target: &'a TargetSpec,
    /// Options, without the program name.
    pub args: Vec<String>,
    /// `CC` for the transpiler's toolchain probing, e.g. the `ccwrap` shim.
    pub compiler: Option<&'a str>,
}

/// Why a transpile call failed.
#[derive(Debug, Error)]
pub enum TranspileFailure {
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// A failure described by the transpiler itself rather than by a
    /// process exit status, for implementations that run in-process.
    #[error("{0}")]
    Reported(String),

    #[error("forwarding transpiler output: {0}")]
    Output(#[source] std::io::Error),
}

/// A C-to-Go transpiler.
pub trait Transpiler {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Run one task to completion.
    fn transpile(
        &self,
        task: &TranspileTask<'_>,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<(), TranspileFailure>;
}

/// Runs `ccgo` (v4 command line) as a child process.
#[derive(Debug, Clone)]
pub struct CcgoTranspiler {
    pub program: String,
}

impl CcgoTranspiler {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The child command for `task`. The target and compiler are passed via
    /// the child's environment; ours is left untouched.
    pub fn command(&self, task: &TranspileTask<'_>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&task.args)
            .env("TARGET_GOOS", task.target.os.as_str())
            .env("TARGET_GOARCH", &task.target.arch);
        if let Some(cc) = task.compiler {
            cmd.env(COMPILER_VAR, cc);
        }
        cmd
    }
}

impl Default for CcgoTranspiler {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_TRANSPILER)
    }
}

impl Transpiler for CcgoTranspiler {
    fn name(&self) -> &str {
        &self.program
    }

    fn transpile(
        &self,
        task: &TranspileTask<'_>,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<(), TranspileFailure> {
        let mut cmd = self.command(task);
        debug!(command = %exec::display_command(&cmd), cc = ?task.compiler, "transpiling");
        let mut child = cmd
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExecError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let (tx, rx) = mpsc::channel();
        let child_out = child.stdout.take();
        let child_err = child.stderr.take();
        let forwarded = thread::scope(|s| {
            if let Some(r) = child_out {
                let tx = tx.clone();
                s.spawn(move || pump(r, &tx, Chunk::Out));
            }
            if let Some(r) = child_err {
                let tx = tx.clone();
                s.spawn(move || pump(r, &tx, Chunk::Err));
            }
            drop(tx);
            let forwarded = forward(rx, stdout, stderr);
            if forwarded.is_err() {
                // Closes the pipes so the readers can be joined.
                let _ = child.kill();
            }
            forwarded
        });
        if let Err(e) = forwarded {
            let _ = child.wait();
            return Err(e);
        }

        let status = child.wait().map_err(|source| ExecError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        if !status.success() {
            return Err(ExecError::Status {
                program: self.program.clone(),
                code: status.code(),
            }
            .into());
        }
        Ok(())
    }
}

/// A piece of child output, tagged with the stream it came from.
enum Chunk {
    Out(Vec<u8>),
    Err(Vec<u8>),
    Failed(io::Error),
}

/// Read `r` until EOF, sending each piece as soon as it is available.
/// Stops early once the receiving side is gone.
fn pump(mut r: impl Read, tx: &Sender<Chunk>, tag: fn(Vec<u8>) -> Chunk) {
    let mut buf = [0u8; 8192];
    loop {
        let chunk = match r.read(&mut buf) {
            Ok(0) => return,
            Ok(n) => tag(buf[..n].to_vec()),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => Chunk::Failed(e),
        };
        let failed = matches!(chunk, Chunk::Failed(_));
        if tx.send(chunk).is_err() || failed {
            return;
        }
    }
}

/// Write chunks to the sinks in arrival order until both streams close.
fn forward(
    rx: mpsc::Receiver<Chunk>,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Result<(), TranspileFailure> {
    for chunk in rx {
        match chunk {
            Chunk::Out(bytes) => stdout.write_all(&bytes).and_then(|()| stdout.flush()),
            Chunk::Err(bytes) => stderr.write_all(&bytes).and_then(|()| stderr.flush()),
            Chunk::Failed(e) => Err(e),
        }
        .map_err(TranspileFailure::Output)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use zstdgen_targets::TargetOs;

    fn env_of<'c>(cmd: &'c Command, key: &str) -> Option<&'c OsStr> {
        cmd.get_envs()
            .find(|(k, _)| *k == key)
            .and_then(|(_, v)| v)
    }

    #[test]
    fn command_carries_target_and_compiler() {
        let target = TargetSpec::new(TargetOs::Darwin, "arm64");
        let task = TranspileTask {
            target: &target,
            args: vec!["--package-name".into(), "libzstd".into()],
            compiler: Some("/usr/local/bin/ccwrap"),
        };
        let cmd = CcgoTranspiler::default().command(&task);
        assert_eq!(cmd.get_program(), "ccgo");
        assert_eq!(env_of(&cmd, "TARGET_GOOS"), Some(OsStr::new("darwin")));
        assert_eq!(env_of(&cmd, "TARGET_GOARCH"), Some(OsStr::new("arm64")));
        assert_eq!(env_of(&cmd, "CC"), Some(OsStr::new("/usr/local/bin/ccwrap")));
    }

    #[test]
    fn no_compiler_leaves_cc_alone() {
        let target = TargetSpec::new(TargetOs::Linux, "amd64");
        let task = TranspileTask {
            target: &target,
            args: Vec::new(),
            compiler: None,
        };
        let cmd = CcgoTranspiler::default().command(&task);
        assert!(cmd.get_envs().all(|(k, _)| k != "CC"));
    }

    #[test]
    fn missing_transpiler_is_spawn_failure() {
        let target = TargetSpec::new(TargetOs::Linux, "amd64");
        let task = TranspileTask {
            target: &target,
            args: Vec::new(),
            compiler: None,
        };
        let t = CcgoTranspiler::new("zstdgen-no-such-transpiler");
        let err = t
            .transpile(&task, &mut std::io::sink(), &mut std::io::sink())
            .unwrap_err();
        assert!(matches!(err, TranspileFailure::Exec(ExecError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn output_is_forwarded_to_sinks() {
        let target = TargetSpec::new(TargetOs::Linux, "amd64");
        let task = TranspileTask {
            target: &target,
            args: vec!["-c".into(), "echo out; echo err >&2; exit 2".into()],
            compiler: None,
        };
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = CcgoTranspiler::new("sh").transpile(&task, &mut out, &mut err);
        assert!(matches!(
            result,
            Err(TranspileFailure::Exec(ExecError::Status { code: Some(2), .. }))
        ));
        assert_eq!(out, b"out\n");
        assert_eq!(err, b"err\n");
    }

    /// Tags every write with its stream so interleaving can be checked.
    #[derive(Clone)]
    struct Journal {
        tag: &'static str,
        log: std::rc::Rc<std::cell::RefCell<Vec<String>>>,
    }

    impl Write for Journal {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let text = String::from_utf8_lossy(buf);
            for line in text.lines() {
                self.log.borrow_mut().push(format!("{}:{line}", self.tag));
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[cfg(unix)]
    #[test]
    fn output_is_forwarded_as_it_arrives() {
        let target = TargetSpec::new(TargetOs::Linux, "amd64");
        let task = TranspileTask {
            target: &target,
            args: vec![
                "-c".into(),
                "echo one; sleep 0.3; echo two >&2; sleep 0.3; echo three".into(),
            ],
            compiler: None,
        };
        let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut out = Journal { tag: "out", log: log.clone() };
        let mut err = Journal { tag: "err", log: log.clone() };
        CcgoTranspiler::new("sh")
            .transpile(&task, &mut out, &mut err)
            .unwrap();
        assert_eq!(*log.borrow(), ["out:one", "err:two", "out:three"]);
    }

    #[cfg(unix)]
    #[test]
    fn sink_failure_stops_the_child() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let target = TargetSpec::new(TargetOs::Linux, "amd64");
        let task = TranspileTask {
            target: &target,
            args: vec!["-c".into(), "echo out; exec sleep 30".into()],
            compiler: None,
        };
        let started = std::time::Instant::now();
        let result = CcgoTranspiler::new("sh").transpile(&task, &mut Broken, &mut io::sink());
        assert!(matches!(result, Err(TranspileFailure::Output(_))));
        assert!(started.elapsed() < std::time::Duration::from_secs(20));
    }
}
