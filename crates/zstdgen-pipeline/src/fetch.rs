//! Source acquisition.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

use crate::config::Upstream;
use crate::error::{GenError, Result};
use crate::exec;

/// Name of the checkout directory inside a workdir.
pub const CHECKOUT_DIR: &str = "zstd";

/// An ephemeral working directory holding the upstream checkout.
///
/// It is never removed automatically so a failed run can be inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workdir {
    root: PathBuf,
}

impl Workdir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The upstream checkout, `<root>/zstd`.
    pub fn source_dir(&self) -> PathBuf {
        self.root.join(CHECKOUT_DIR)
    }
}

/// Produces a fresh workdir containing the upstream source.
pub trait Fetcher {
    fn fetch(&self, upstream: &Upstream) -> Result<Workdir>;
}

/// Shallow, single-branch `git clone` into a new temporary directory.
#[derive(Debug, Clone, Default)]
pub struct GitFetcher {
    /// Parent for the temporary directory; the system temp dir when `None`.
    pub parent: Option<PathBuf>,
}

impl GitFetcher {
    /// Create a uniquely named `zstd-build-*` directory that outlives the run.
    pub fn create_workdir(&self) -> Result<Workdir> {
        let parent = self.parent.clone().unwrap_or_else(std::env::temp_dir);
        let dir = tempfile::Builder::new()
            .prefix("zstd-build-")
            .tempdir_in(parent)?;
        Ok(Workdir::new(dir.keep()))
    }

    /// The clone command for `upstream` run inside `workdir`.
    pub fn clone_command(workdir: &Workdir, upstream: &Upstream) -> Command {
        let mut cmd = Command::new("git");
        cmd.current_dir(workdir.root()).args([
            "clone",
            "-b",
            upstream.rev.as_str(),
            "--depth=1",
            "--single-branch",
            upstream.repo.as_str(),
            CHECKOUT_DIR,
        ]);
        cmd
    }
}

impl Fetcher for GitFetcher {
    fn fetch(&self, upstream: &Upstream) -> Result<Workdir> {
        let workdir = self.create_workdir()?;
        info!(
            workdir = %workdir.root().display(),
            repo = %upstream.repo,
            rev = %upstream.rev,
            "fetching upstream source"
        );
        exec::run(&mut Self::clone_command(&workdir, upstream)).map_err(GenError::Fetch)?;
        Ok(workdir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workdir_is_unique_and_kept() {
        let parent = tempfile::tempdir().unwrap();
        let fetcher = GitFetcher {
            parent: Some(parent.path().to_path_buf()),
        };
        let a = fetcher.create_workdir().unwrap();
        let b = fetcher.create_workdir().unwrap();
        assert_ne!(a, b);
        assert!(a.root().is_dir());
        assert!(a
            .root()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("zstd-build-"));
        assert_eq!(a.source_dir(), a.root().join("zstd"));
    }

    #[test]
    fn clone_is_shallow_single_branch_at_pin() {
        let workdir = Workdir::new("/tmp/zstd-build-x");
        let cmd = GitFetcher::clone_command(&workdir, &Upstream::default());
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(cmd.get_program(), "git");
        assert_eq!(
            args,
            [
                "clone",
                "-b",
                "v1.5.7",
                "--depth=1",
                "--single-branch",
                "https://github.com/facebook/zstd.git",
                "zstd",
            ]
        );
        assert_eq!(cmd.get_current_dir(), Some(Path::new("/tmp/zstd-build-x")));
    }
}
