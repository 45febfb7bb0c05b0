//! Target operating systems.
//!
//! The OS is the only target dimension with platform-specific transpiler
//! behavior; architectures are forwarded verbatim.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TargetError;

/// An operating system generation can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetOs {
    Linux,
    Darwin,
    Windows,
}

impl TargetOs {
    /// All supported operating systems.
    pub const ALL: [TargetOs; 3] = [TargetOs::Linux, TargetOs::Darwin, TargetOs::Windows];

    /// The Go-style OS name used in generated file names.
    pub fn as_str(self) -> &'static str {
        match self {
            TargetOs::Linux => "linux",
            TargetOs::Darwin => "darwin",
            TargetOs::Windows => "windows",
        }
    }

    /// The OS this binary was compiled for.
    pub fn host() -> Result<Self, TargetError> {
        host_os_name().parse()
    }
}

impl fmt::Display for TargetOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetOs {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linux" => Ok(TargetOs::Linux),
            "darwin" => Ok(TargetOs::Darwin),
            "windows" => Ok(TargetOs::Windows),
            other => Err(TargetError::UnsupportedOs {
                os: other.to_string(),
            }),
        }
    }
}

/// Host OS name in Go spelling.
pub fn host_os_name() -> &'static str {
    go_os_name(std::env::consts::OS)
}

/// Host architecture name in Go spelling.
pub fn host_arch_name() -> &'static str {
    go_arch_name(std::env::consts::ARCH)
}

/// Map a Rust `target_os` value to its Go equivalent.
pub fn go_os_name(rust_os: &'static str) -> &'static str {
    match rust_os {
        "macos" => "darwin",
        other => other,
    }
}

/// Map a Rust `target_arch` value to its Go equivalent.
pub fn go_arch_name(rust_arch: &'static str) -> &'static str {
    match rust_arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        "powerpc64" => "ppc64",
        other => other,
    }
}
