//! Generator configuration resolved from an [`EnvSnapshot`].

use std::path::PathBuf;

use zstdgen_targets::EnvSnapshot;

use crate::combine::{CombineSpec, CombinerKind};
use crate::error::{GenError, Result};

pub const DEFAULT_REPO: &str = "https://github.com/facebook/zstd.git";
pub const DEFAULT_REV: &str = "v1.5.7";
pub const DEFAULT_TRANSPILER: &str = "ccgo";
pub const PATCH_FILE_NAME: &str = "0001-fix-zstd-ccgo-build.patch";

/// The pinned upstream revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstream {
    pub repo: String,
    /// Tag or branch, cloned shallowly as a single branch.
    pub rev: String,
}

impl Default for Upstream {
    fn default() -> Self {
        Self {
            repo: DEFAULT_REPO.to_string(),
            rev: DEFAULT_REV.to_string(),
        }
    }
}

/// Fixed transpiler settings shared by every target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranspileSettings {
    /// Transpiler executable.
    pub program: String,
    /// Package name of the generated source.
    pub package_name: String,
    /// C standard flag.
    pub c_std: String,
    /// Generated files are named `<stem>_<os>_<arch>.<ext>`.
    pub output_stem: String,
    pub output_ext: String,
}

impl Default for TranspileSettings {
    fn default() -> Self {
        Self {
            program: DEFAULT_TRANSPILER.to_string(),
            package_name: "libzstd".to_string(),
            c_std: "-std=c17".to_string(),
            output_stem: "zstd".to_string(),
            output_ext: "go".to_string(),
        }
    }
}

/// Values the caller supplies because only the binary knows them.
#[derive(Debug, Clone)]
pub struct ConfigDefaults {
    /// Where the stored patch lives when `ZSTD_GEN_PATCH` is unset.
    pub patch_path: PathBuf,
    /// Where generated files go when `ZSTD_GEN_OUT_DIR` is unset.
    pub out_dir: PathBuf,
}

/// Full generator configuration.
#[derive(Debug, Clone)]
pub struct GenConfig {
    pub upstream: Upstream,
    pub patch_path: PathBuf,
    pub out_dir: PathBuf,
    pub combiner: CombinerKind,
    pub combine: CombineSpec,
    pub transpile: TranspileSettings,
}

impl GenConfig {
    /// Configuration with every value at its default.
    pub fn new(defaults: ConfigDefaults) -> Self {
        Self {
            upstream: Upstream::default(),
            patch_path: defaults.patch_path,
            out_dir: defaults.out_dir,
            combiner: CombinerKind::Script,
            combine: CombineSpec::default(),
            transpile: TranspileSettings::default(),
        }
    }

    /// Resolve configuration from environment overrides on top of `defaults`.
    pub fn from_env(env: &EnvSnapshot, defaults: ConfigDefaults) -> Result<Self> {
        let mut config = Self::new(defaults);
        if let Some(repo) = env.get("ZSTD_GEN_REPO") {
            config.upstream.repo = repo.to_string();
        }
        if let Some(rev) = env.get("ZSTD_GEN_REV") {
            config.upstream.rev = rev.to_string();
        }
        if let Some(patch) = env.get("ZSTD_GEN_PATCH") {
            config.patch_path = PathBuf::from(patch);
        }
        if let Some(out) = env.get("ZSTD_GEN_OUT_DIR") {
            config.out_dir = PathBuf::from(out);
        }
        if let Some(kind) = env.get("ZSTD_GEN_COMBINER") {
            config.combiner = kind.parse().map_err(|message| GenError::Config { message })?;
        }
        if let Some(program) = env.get("ZSTD_GEN_TRANSPILER") {
            config.transpile.program = program.to_string();
        }
        Ok(config)
    }
}
