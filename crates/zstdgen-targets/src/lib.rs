//! Environment snapshot and target matrix resolution for zstdgen.
//!
//! Every other zstdgen component receives its configuration through an
//! [`EnvSnapshot`] captured once at process start, never by reading the
//! ambient environment itself.
//!
//! - [`env`]: Environment snapshot and precedence chains
//! - [`os`]: Supported target operating systems and host detection
//! - [`spec`]: The `(os, arch)` pair identifying one generation target
//! - [`matrix`]: Legacy matrix and current single-target resolution

pub mod env;
pub mod error;
pub mod matrix;
pub mod os;
pub mod spec;

pub use env::EnvSnapshot;
pub use error::{Result, TargetError};
pub use matrix::{resolve, Host, ResolutionShape, TargetEntry, TargetMatrix};
pub use os::TargetOs;
pub use spec::TargetSpec;
