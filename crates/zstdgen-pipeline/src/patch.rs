//! Static compatibility patch application.

use std::path::Path;
use std::process::{Command, Stdio};

use tracing::info;

use crate::error::{GenError, Result};
use crate::exec;
use crate::fetch::Workdir;
use crate::report::ContentHash;

/// Applies the stored patch onto a fresh checkout.
pub trait Patcher {
    fn apply(&self, workdir: &Workdir, patch: &Path) -> Result<()>;
}

/// `git apply`, preceded by a `--check` dry run so drift is reported as such.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitPatcher;

impl GitPatcher {
    pub fn apply_command(workdir: &Workdir, patch: &Path, check_only: bool) -> Command {
        let mut cmd = Command::new("git");
        cmd.current_dir(workdir.source_dir()).arg("apply");
        if check_only {
            cmd.arg("--check");
        }
        cmd.arg(patch);
        cmd
    }
}

impl Patcher for GitPatcher {
    fn apply(&self, workdir: &Workdir, patch: &Path) -> Result<()> {
        let bytes = std::fs::read(patch).map_err(|_| GenError::PatchMissing {
            path: patch.to_path_buf(),
        })?;
        info!(
            patch = %patch.display(),
            sha256 = %ContentHash::compute(&bytes),
            "applying patch"
        );

        // The dry run's own complaints go to stderr; a failure here means
        // the pin and the patch have drifted apart.
        let check = Self::apply_command(workdir, patch, true)
            .stdout(Stdio::null())
            .status()
            .map_err(|source| {
                GenError::Patch(exec::ExecError::Spawn {
                    program: "git".into(),
                    source,
                })
            })?;
        if !check.success() {
            return Err(GenError::PatchDrift {
                path: patch.to_path_buf(),
            });
        }

        exec::run(&mut Self::apply_command(workdir, patch, false)).map_err(GenError::Patch)
    }
}
