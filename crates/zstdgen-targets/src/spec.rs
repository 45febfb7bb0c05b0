//! A single generation target.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TargetError;
use crate::os::TargetOs;

/// Identifies one generation target: an OS and an opaque architecture name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetSpec {
    pub os: TargetOs,
    pub arch: String,
}

impl TargetSpec {
    pub fn new(os: TargetOs, arch: impl Into<String>) -> Self {
        Self {
            os,
            arch: arch.into(),
        }
    }

    /// `<os>_<arch>`, the suffix used for generated file names.
    pub fn key(&self) -> String {
        format!("{}_{}", self.os, self.arch)
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

impl FromStr for TargetSpec {
    type Err = TargetError;

    /// Parse an `os_arch` token. The split happens at the first underscore so
    /// architectures such as `mips64_le` survive intact.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let (os, arch) = token
            .split_once('_')
            .filter(|(os, arch)| !os.is_empty() && !arch.is_empty())
            .ok_or_else(|| TargetError::MalformedTarget {
                token: token.to_string(),
            })?;
        Ok(Self::new(os.parse()?, arch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_os_arch_token() {
        let t: TargetSpec = "darwin_arm64".parse().unwrap();
        assert_eq!(t.os, TargetOs::Darwin);
        assert_eq!(t.arch, "arm64");
        assert_eq!(t.key(), "darwin_arm64");
        assert_eq!(t.to_string(), "darwin/arm64");
    }

    #[test]
    fn arch_is_forwarded_verbatim() {
        let t: TargetSpec = "linux_mips64_le".parse().unwrap();
        assert_eq!(t.arch, "mips64_le");
    }

    #[test]
    fn malformed_tokens() {
        for token in ["linux", "_amd64", "linux_", ""] {
            assert!(
                matches!(
                    token.parse::<TargetSpec>(),
                    Err(TargetError::MalformedTarget { .. })
                ),
                "{token:?} should be malformed"
            );
        }
    }

    #[test]
    fn unknown_os_in_token() {
        assert!(matches!(
            "plan9_386".parse::<TargetSpec>(),
            Err(TargetError::UnsupportedOs { .. })
        ));
    }
}
