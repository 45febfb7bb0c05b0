//! Transpiler flag construction.
//!
//! Every target gets the same base options. On top of that, each OS gets its
//! own tolerances for known transpiler limitations. Branches never mix.

use std::path::{Path, PathBuf};

use zstdgen_targets::{ResolutionShape, TargetError, TargetOs, TargetSpec};

use crate::config::TranspileSettings;

/// Include guards of the x86 intrinsic headers suppressed on Windows.
/// Predefining a guard makes the header a no-op.
pub const WINDOWS_INTRINSIC_GUARDS: [&str; 10] = [
    "_MMINTRIN_H_INCLUDED",
    "_XMMINTRIN_H_INCLUDED",
    "_EMMINTRIN_H_INCLUDED",
    "_PMMINTRIN_H_INCLUDED",
    "_TMMINTRIN_H_INCLUDED",
    "_SMMINTRIN_H_INCLUDED",
    "_NMMINTRIN_H_INCLUDED",
    "_WMMINTRIN_H_INCLUDED",
    "_IMMINTRIN_H_INCLUDED",
    "_X86INTRIN_H_INCLUDED",
];

const IGNORE_LINK_ERRORS: &str = "-ignore-link-errors";
const IGNORE_UNSUPPORTED_ALIGNMENT: &str = "-ignore-unsupported-alignment";

/// A known transpiler limitation accepted for one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tolerance {
    /// The darwin runtime layer has no `qsort_r`.
    MissingQsortR,
    /// `__darwin_arm_neon_state64` uses `__int128`, which is over-aligned.
    UnsupportedAlignment,
    /// The windows runtime layer has no `qsort_s`.
    MissingQsortS,
    /// The windows runtime layer has no `clock_gettime`.
    MissingClock,
    /// Predefine an intrinsic header's include guard.
    SuppressIntrinsicHeader(&'static str),
}

impl Tolerance {
    /// The tolerances required for `os`.
    pub fn for_os(os: TargetOs) -> Vec<Tolerance> {
        match os {
            TargetOs::Linux => Vec::new(),
            TargetOs::Darwin => vec![Tolerance::MissingQsortR, Tolerance::UnsupportedAlignment],
            TargetOs::Windows => {
                let mut t = vec![Tolerance::MissingQsortS, Tolerance::MissingClock];
                t.extend(
                    WINDOWS_INTRINSIC_GUARDS
                        .iter()
                        .map(|g| Tolerance::SuppressIntrinsicHeader(*g)),
                );
                t
            }
        }
    }

    /// The transpiler option implementing this tolerance.
    pub fn option(&self) -> String {
        match self {
            Tolerance::MissingQsortR | Tolerance::MissingQsortS | Tolerance::MissingClock => {
                IGNORE_LINK_ERRORS.to_string()
            }
            Tolerance::UnsupportedAlignment => IGNORE_UNSUPPORTED_ALIGNMENT.to_string(),
            Tolerance::SuppressIntrinsicHeader(guard) => format!("-D{guard}"),
        }
    }
}

/// Ordered transpiler options for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSet {
    pub package_name: String,
    pub c_std: String,
    pub tolerances: Vec<Tolerance>,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl FlagSet {
    /// Build the flag set for `target` transpiling `input` into `out_dir`.
    ///
    /// Fails if the resolution shape that produced the target cannot serve it.
    pub fn build(
        target: &TargetSpec,
        shape: ResolutionShape,
        input: &Path,
        out_dir: &Path,
        settings: &TranspileSettings,
    ) -> Result<Self, TargetError> {
        if !shape.supports(target.os) {
            return Err(TargetError::UnsupportedByShape {
                target: target.key(),
                shape: shape.to_string(),
            });
        }
        Ok(Self {
            package_name: settings.package_name.clone(),
            c_std: settings.c_std.clone(),
            tolerances: Tolerance::for_os(target.os),
            input: input.to_path_buf(),
            output: output_path(out_dir, target, settings),
        })
    }

    /// Render to an argument list, without the program name.
    ///
    /// Several tolerances share `-ignore-link-errors`; it is emitted once.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "--package-name".to_string(),
            self.package_name.clone(),
            self.c_std.clone(),
        ];
        for option in self.tolerances.iter().map(Tolerance::option) {
            if !args.contains(&option) {
                args.push(option);
            }
        }
        args.push(self.input.to_string_lossy().into_owned());
        args.push("-o".to_string());
        args.push(self.output.to_string_lossy().into_owned());
        args
    }
}

/// `<out_dir>/<stem>_<os>_<arch>.<ext>`
pub fn output_path(out_dir: &Path, target: &TargetSpec, settings: &TranspileSettings) -> PathBuf {
    out_dir.join(format!(
        "{}_{}.{}",
        settings.output_stem,
        target.key(),
        settings.output_ext
    ))
}
