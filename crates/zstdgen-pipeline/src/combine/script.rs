//! Upstream `combine.py` driver.

use std::path::PathBuf;
use std::process::Command;

use tracing::info;

use super::{CombineSpec, Combiner};
use crate::error::{GenError, Result};
use crate::exec;
use crate::fetch::Workdir;

/// Runs the combiner script shipped in the upstream tree.
#[derive(Debug, Clone)]
pub struct ScriptCombiner {
    pub python: String,
    pub script: String,
}

impl Default for ScriptCombiner {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            script: "combine.py".to_string(),
        }
    }
}

impl ScriptCombiner {
    pub fn command(&self, workdir: &Workdir, spec: &CombineSpec) -> Command {
        let source = workdir.source_dir();
        let mut cmd = Command::new(&self.python);
        cmd.current_dir(source.join(&spec.script_dir)).arg(&self.script);
        for root in &spec.roots {
            cmd.arg("-r").arg(source.join(root));
        }
        for exclude in &spec.excludes {
            cmd.arg("-x").arg(exclude);
        }
        if spec.keep_excluded {
            cmd.arg("-k");
        }
        cmd.arg("-o").arg(spec.output_path(workdir)).arg(&spec.input);
        cmd
    }
}

impl Combiner for ScriptCombiner {
    fn combine(&self, workdir: &Workdir, spec: &CombineSpec) -> Result<PathBuf> {
        let out = spec.output_path(workdir);
        info!(output = %out.display(), "combining sources with {}", self.script);
        exec::run(&mut self.command(workdir, spec)).map_err(GenError::CombineProcess)?;
        if !out.is_file() {
            return Err(GenError::Combine {
                message: format!("{} produced no output at {}", self.script, out.display()),
            });
        }
        Ok(out)
    }
}
