//! Generation pipeline for zstd source bindings.
//!
//! Fetches a pinned zstd revision, applies the stored compatibility patch,
//! flattens the library into one translation unit, and transpiles that unit
//! once per resolved target:
//!
//! fetch -> patch -> combine -> { per target: flags -> transpile -> emit }
//!
//! Each stage sits behind an object-safe trait so the orchestration can be
//! exercised with fakes, without network access or an installed toolchain.

pub mod combine;
pub mod config;
pub mod error;
pub mod exec;
pub mod fetch;
pub mod flags;
pub mod patch;
pub mod pipeline;
pub mod report;
pub mod transpile;

pub use combine::{CombineSpec, Combiner, CombinerKind, NativeCombiner, ScriptCombiner};
pub use config::{ConfigDefaults, GenConfig, TranspileSettings, Upstream};
pub use error::{GenError, Result, Stage};
pub use fetch::{Fetcher, GitFetcher, Workdir};
pub use flags::{FlagSet, Tolerance};
pub use patch::{GitPatcher, Patcher};
pub use pipeline::Pipeline;
pub use report::{ContentHash, GeneratedFile, GenerationReport};
pub use transpile::{CcgoTranspiler, TranspileFailure, TranspileTask, Transpiler};
