//! Target resolution errors.

/// Errors raised while resolving the target matrix.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    /// The OS name is not one generation knows how to handle.
    #[error("unsupported target OS '{os}' (expected linux, darwin, or windows)")]
    UnsupportedOs { os: String },

    /// The target token is not of the form `os_arch`.
    #[error("malformed target '{token}': expected <os>_<arch>")]
    MalformedTarget { token: String },

    /// The target is valid but the selected resolution shape cannot produce it.
    #[error("target {target} is not supported by the {shape} resolution shape")]
    UnsupportedByShape { target: String, shape: String },

    /// The legacy target list and compiler list have different lengths.
    #[error("ZSTD_GEN_TARGETS has {targets} entries but ZSTD_GEN_CCS has {compilers}")]
    CompilerListMismatch { targets: usize, compilers: usize },

    /// `ZSTD_GEN_MODE` holds an unknown value.
    #[error("unknown resolution mode '{value}' (expected matrix or single)")]
    UnknownMode { value: String },
}

/// Result type alias for target resolution.
pub type Result<T> = std::result::Result<T, TargetError>;
