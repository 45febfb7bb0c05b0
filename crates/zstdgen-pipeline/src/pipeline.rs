//! Generation pipeline orchestrator.

use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

use tracing::info;
use zstdgen_targets::{TargetEntry, TargetMatrix};

use crate::combine::Combiner;
use crate::config::GenConfig;
use crate::error::{GenError, Result};
use crate::fetch::{Fetcher, GitFetcher};
use crate::flags::FlagSet;
use crate::patch::{GitPatcher, Patcher};
use crate::report::{GeneratedFile, GenerationReport};
use crate::transpile::{CcgoTranspiler, TranspileTask, Transpiler};

/// The four stages, run strictly in sequence.
pub struct Pipeline {
    pub fetcher: Box<dyn Fetcher>,
    pub patcher: Box<dyn Patcher>,
    pub combiner: Box<dyn Combiner>,
    pub transpiler: Box<dyn Transpiler>,
}

impl Pipeline {
    pub fn new(
        fetcher: Box<dyn Fetcher>,
        patcher: Box<dyn Patcher>,
        combiner: Box<dyn Combiner>,
        transpiler: Box<dyn Transpiler>,
    ) -> Self {
        Self {
            fetcher,
            patcher,
            combiner,
            transpiler,
        }
    }

    /// The real stages: git clone, git apply, the configured combiner, ccgo.
    pub fn from_config(config: &GenConfig) -> Self {
        Self::new(
            Box::new(GitFetcher::default()),
            Box::new(GitPatcher),
            config.combiner.build(),
            Box::new(CcgoTranspiler::new(&config.transpile.program)),
        )
    }

    /// Run every stage, forwarding transpiler output to our stdout/stderr.
    pub fn run(&self, config: &GenConfig, matrix: &TargetMatrix) -> Result<GenerationReport> {
        self.run_with_output(config, matrix, &mut io::stdout(), &mut io::stderr())
    }

    /// Run every stage: fetch -> patch -> combine -> transpile each target.
    ///
    /// The first failure aborts the run. Targets already emitted stay on disk,
    /// as does the workdir.
    pub fn run_with_output(
        &self,
        config: &GenConfig,
        matrix: &TargetMatrix,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<GenerationReport> {
        let start = Instant::now();
        if matrix.is_empty() {
            return Err(GenError::Config {
                message: "no targets resolved".into(),
            });
        }
        std::fs::create_dir_all(&config.out_dir)?;

        // Stage 1: fetch
        let workdir = self.fetcher.fetch(&config.upstream)?;

        // Stage 2: patch
        self.patcher.apply(&workdir, &config.patch_path)?;

        // Stage 3: combine
        let combined = self.combiner.combine(&workdir, &config.combine)?;
        info!(combined = %combined.display(), "combined translation unit ready");

        // Stage 4: transpile, one target at a time
        let mut files = Vec::with_capacity(matrix.len());
        for entry in &matrix.entries {
            let flags = FlagSet::build(
                &entry.target,
                matrix.shape,
                &combined,
                &config.out_dir,
                &config.transpile,
            )?;
            files.push(self.transpile_one(entry, &flags, stdout, stderr)?);
        }

        Ok(GenerationReport {
            shape: matrix.shape,
            workdir: workdir.root().to_path_buf(),
            combined_source: combined,
            files,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn transpile_one(
        &self,
        entry: &TargetEntry,
        flags: &FlagSet,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<GeneratedFile> {
        let task = TranspileTask {
            target: &entry.target,
            args: flags.to_args(),
            compiler: entry.compiler.as_deref(),
        };
        info!(
            target = %entry.target,
            transpiler = self.transpiler.name(),
            output = %flags.output.display(),
            "transpiling"
        );
        self.transpiler
            .transpile(&task, stdout, stderr)
            .map_err(|source| GenError::Transpile {
                target: entry.target.key(),
                source,
            })?;

        let output: &Path = &flags.output;
        if !output.is_file() {
            return Err(GenError::MissingOutput {
                target: entry.target.key(),
                path: output.to_path_buf(),
            });
        }
        let file = GeneratedFile::inspect(&entry.target, output, task.compiler)?;
        info!(target = %entry.target, sha256 = %file.sha256, bytes = file.bytes, "generated");
        Ok(file)
    }
}
