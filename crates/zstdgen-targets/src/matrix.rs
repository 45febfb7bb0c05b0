//! Target matrix resolution.
//!
//! Two historical shapes exist and are kept apart:
//!
//! - **Legacy matrix**: `ZSTD_GEN_TARGETS` is a `;`-separated list of
//!   `os_arch` tokens and `ZSTD_GEN_CCS` an index-aligned list of compiler
//!   overrides. The pair is folded into self-contained [`TargetEntry`] values
//!   and validated before anything runs.
//! - **Single target**: one OS from `TARGET_GOOS` → `GOOS` → host and one
//!   architecture from `TARGET_GOARCH` → `GOARCH` → host.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::env::EnvSnapshot;
use crate::error::{Result, TargetError};
use crate::os::{host_arch_name, host_os_name, TargetOs};
use crate::spec::TargetSpec;

pub const TARGETS_VAR: &str = "ZSTD_GEN_TARGETS";
pub const COMPILERS_VAR: &str = "ZSTD_GEN_CCS";
pub const MODE_VAR: &str = "ZSTD_GEN_MODE";
pub const SINGLE_CC_VAR: &str = "ZSTD_GEN_CC";
pub const OS_CHAIN: [&str; 2] = ["TARGET_GOOS", "GOOS"];
pub const ARCH_CHAIN: [&str; 2] = ["TARGET_GOARCH", "GOARCH"];

/// Which resolution shape produced a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionShape {
    /// Parallel `ZSTD_GEN_TARGETS` / `ZSTD_GEN_CCS` lists.
    LegacyMatrix,
    /// `TARGET_GOOS`/`TARGET_GOARCH` precedence chain.
    SingleTarget,
}

impl ResolutionShape {
    /// Pick the shape from `ZSTD_GEN_MODE`, or infer it from whether a
    /// target or compiler list is present.
    pub fn select(env: &EnvSnapshot) -> Result<Self> {
        match env.get(MODE_VAR) {
            Some("matrix") | Some("legacy") => Ok(Self::LegacyMatrix),
            Some("single") | Some("current") => Ok(Self::SingleTarget),
            Some(other) => Err(TargetError::UnknownMode {
                value: other.to_string(),
            }),
            None if env.get(TARGETS_VAR).is_some() || env.get(COMPILERS_VAR).is_some() => {
                Ok(Self::LegacyMatrix)
            }
            None => Ok(Self::SingleTarget),
        }
    }

    /// Whether targets for `os` may be produced under this shape.
    ///
    /// The legacy matrix predates Windows support and only ever generated
    /// for linux and darwin.
    pub fn supports(self, os: TargetOs) -> bool {
        match self {
            Self::LegacyMatrix => matches!(os, TargetOs::Linux | TargetOs::Darwin),
            Self::SingleTarget => true,
        }
    }
}

impl fmt::Display for ResolutionShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LegacyMatrix => f.write_str("matrix"),
            Self::SingleTarget => f.write_str("single"),
        }
    }
}

/// The platform used when configuration names no target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub os: String,
    pub arch: String,
}

impl Host {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// The platform this binary was built for, in Go spelling.
    pub fn current() -> Self {
        Self::new(host_os_name(), host_arch_name())
    }

    fn key(&self) -> String {
        format!("{}_{}", self.os, self.arch)
    }
}

/// One self-contained generation target with its optional compiler override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEntry {
    pub target: TargetSpec,
    /// Value for `CC` while transpiling this target, if any.
    pub compiler: Option<String>,
}

/// An ordered, validated list of targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetMatrix {
    pub shape: ResolutionShape,
    pub entries: Vec<TargetEntry>,
}

impl TargetMatrix {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn targets(&self) -> impl Iterator<Item = &TargetSpec> {
        self.entries.iter().map(|e| &e.target)
    }
}

/// Resolve the target matrix using the shape selected by the environment.
pub fn resolve(env: &EnvSnapshot, host: &Host) -> Result<TargetMatrix> {
    match ResolutionShape::select(env)? {
        ResolutionShape::LegacyMatrix => resolve_legacy(env, host),
        ResolutionShape::SingleTarget => resolve_single(env, host),
    }
}

/// Resolve the legacy parallel-list form.
pub fn resolve_legacy(env: &EnvSnapshot, host: &Host) -> Result<TargetMatrix> {
    let mut tokens: Vec<String> = env
        .raw(TARGETS_VAR)
        .unwrap_or("")
        .split(';')
        .map(str::to_string)
        .collect();
    if tokens[0].is_empty() {
        tokens[0] = host.key();
    }

    let compilers: Vec<Option<String>> = match env.get(COMPILERS_VAR) {
        None => vec![None; tokens.len()],
        Some(list) => list
            .split(';')
            .map(|cc| (!cc.is_empty()).then(|| cc.to_string()))
            .collect(),
    };
    if compilers.len() != tokens.len() {
        return Err(TargetError::CompilerListMismatch {
            targets: tokens.len(),
            compilers: compilers.len(),
        });
    }

    let shape = ResolutionShape::LegacyMatrix;
    let entries = tokens
        .iter()
        .zip(compilers)
        .map(|(token, compiler)| {
            let target: TargetSpec = token.parse()?;
            check_shape(shape, &target)?;
            Ok(TargetEntry { target, compiler })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TargetMatrix { shape, entries })
}

/// Resolve the current single-target precedence chain.
pub fn resolve_single(env: &EnvSnapshot, host: &Host) -> Result<TargetMatrix> {
    let os: TargetOs = env.first_set_or(&OS_CHAIN, &host.os).parse()?;
    let arch = env.first_set_or(&ARCH_CHAIN, &host.arch);
    let target = TargetSpec::new(os, arch);

    let shape = ResolutionShape::SingleTarget;
    check_shape(shape, &target)?;
    Ok(TargetMatrix {
        shape,
        entries: vec![TargetEntry {
            target,
            compiler: env.get(SINGLE_CC_VAR).map(str::to_string),
        }],
    })
}

fn check_shape(shape: ResolutionShape, target: &TargetSpec) -> Result<()> {
    if shape.supports(target.os) {
        Ok(())
    } else {
        Err(TargetError::UnsupportedByShape {
            target: target.key(),
            shape: shape.to_string(),
        })
    }
}
