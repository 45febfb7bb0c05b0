//! In-process combiner following the rules of upstream `combine.py`.
//!
//! Quoted includes are resolved against the including file's directory and
//! then each root. A resolved file is inlined the first time it is seen and
//! replaced by a marker afterwards; excluded files are never inlined.
//! `#pragma once` lines are dropped. Angle includes and quoted includes that
//! resolve nowhere are copied through unchanged.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::{CombineSpec, Combiner};
use crate::error::{GenError, Result};
use crate::fetch::Workdir;

#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCombiner;

impl Combiner for NativeCombiner {
    fn combine(&self, workdir: &Workdir, spec: &CombineSpec) -> Result<PathBuf> {
        let source = workdir.source_dir();
        let roots: Vec<PathBuf> = spec.roots.iter().map(|r| source.join(r)).collect();
        let input = source.join(&spec.script_dir).join(&spec.input);
        let out = spec.output_path(workdir);
        info!(input = %input.display(), output = %out.display(), "combining sources natively");

        let combined = combine_file(&input, &roots, &spec.excludes, spec.keep_excluded)?;
        fs::write(&out, combined)?;
        Ok(out)
    }
}

/// Combine `input` and everything it includes into a single string.
pub fn combine_file(
    input: &Path,
    roots: &[PathBuf],
    excludes: &[PathBuf],
    keep_excluded: bool,
) -> Result<String> {
    let mut inliner = Inliner {
        roots,
        excludes: HashSet::new(),
        keep_excluded,
        found: HashSet::new(),
        out: String::new(),
    };
    for exclude in excludes {
        match inliner.resolve(exclude, None) {
            Some(path) => {
                inliner.excludes.insert(path);
            }
            None => warn!(exclude = %exclude.display(), "excluded file not found in any root"),
        }
    }

    let input = canonical(input)?;
    inliner.add_file(&input)?;
    Ok(inliner.out)
}

struct Inliner<'a> {
    roots: &'a [PathBuf],
    excludes: HashSet<PathBuf>,
    keep_excluded: bool,
    found: HashSet<PathBuf>,
    out: String,
}

impl Inliner<'_> {
    fn resolve(&self, name: &Path, parent: Option<&Path>) -> Option<PathBuf> {
        parent
            .into_iter()
            .chain(self.roots.iter().map(PathBuf::as_path))
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.is_file())
            .and_then(|found| found.canonicalize().ok())
    }

    fn add_file(&mut self, file: &Path) -> Result<()> {
        self.found.insert(file.to_path_buf());
        let text = fs::read_to_string(file).map_err(|e| GenError::Combine {
            message: format!("reading {}: {e}", file.display()),
        })?;

        for line in text.split_inclusive('\n') {
            let Some(name) = match_include(line) else {
                if !is_pragma_once(line) {
                    self.out.push_str(line);
                }
                continue;
            };

            let Some(inc) = self.resolve(Path::new(name), file.parent()) else {
                self.out.push_str(line);
                continue;
            };

            if self.excludes.contains(&inc) {
                debug!(include = name, "excluding");
                if self.keep_excluded {
                    self.marker("*NOT* inlining", name);
                    self.out.push_str(line);
                    self.terminate_line();
                } else {
                    self.marker("skipping file:", name);
                }
            } else if !self.found.contains(&inc) {
                self.marker("start inlining", name);
                self.add_file(&inc)?;
                self.terminate_line();
                self.marker("ended inlining", name);
            } else {
                self.marker("skipping file:", name);
            }
        }
        Ok(())
    }

    fn marker(&mut self, what: &str, name: &str) {
        self.out.push_str(&format!("/**** {what} {name} ****/\n"));
    }

    fn terminate_line(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }
}

fn canonical(path: &Path) -> Result<PathBuf> {
    path.canonicalize().map_err(|e| GenError::Combine {
        message: format!("{}: {e}", path.display()),
    })
}

/// The file name of a `#include "name"` line.
fn match_include(line: &str) -> Option<&str> {
    let rest = directive(line)?.strip_prefix("include")?.trim_start();
    let rest = rest.strip_prefix('"')?;
    let end = rest.find('"')?;
    Some(&rest[..end]).filter(|name| !name.is_empty())
}

fn is_pragma_once(line: &str) -> bool {
    directive(line)
        .and_then(|d| d.strip_prefix("pragma"))
        .map(|rest| rest.trim_start().starts_with("once"))
        .unwrap_or(false)
}

/// The text after `#` on a preprocessor line, with leading space removed.
fn directive(line: &str) -> Option<&str> {
    Some(line.trim_start().strip_prefix('#')?.trim_start())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: &str = "#define LEGACY_ONLY_SYMBOL 0xdeadbeef\nint legacy_decode(void);\n";

    /// lib/zstd-in.c -> common/a.h, legacy/zstd_legacy.h, common/a.h again, b.c
    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let lib = dir.path().join("lib");
        fs::create_dir_all(lib.join("common")).unwrap();
        fs::create_dir_all(lib.join("legacy")).unwrap();
        fs::write(
            lib.join("zstd-in.c"),
            "#include <stdio.h>\n#include \"common/a.h\"\n#include \"legacy/zstd_legacy.h\"\n#include \"common/a.h\"\n#include \"b.c\"\n",
        )
        .unwrap();
        fs::write(
            lib.join("common/a.h"),
            "#pragma once\n#  include \"inner.h\"\nint a(void);\n",
        )
        .unwrap();
        fs::write(lib.join("common/inner.h"), "int inner(void);").unwrap();
        fs::write(lib.join("legacy/zstd_legacy.h"), LEGACY).unwrap();
        fs::write(lib.join("b.c"), "int b(void) { return 1; }\n").unwrap();
        dir
    }

    fn combine(dir: &Path, keep_excluded: bool) -> String {
        let lib = dir.join("lib");
        combine_file(
            &lib.join("zstd-in.c"),
            &[lib.clone()],
            &[PathBuf::from("legacy/zstd_legacy.h")],
            keep_excluded,
        )
        .unwrap()
    }

    #[test]
    fn excludes_legacy_header_and_keeps_everything_else() {
        let dir = tree();
        let out = combine(dir.path(), false);

        assert!(!out.contains(LEGACY));
        assert!(!out.contains("LEGACY_ONLY_SYMBOL"));
        assert!(!out.contains("#include \"legacy/zstd_legacy.h\""));
        assert!(out.contains("/**** skipping file: legacy/zstd_legacy.h ****/\n"));

        assert!(out.contains("int a(void);\n"));
        assert!(out.contains("int inner(void);\n"));
        assert!(out.contains("int b(void) { return 1; }\n"));
        assert!(out.starts_with("#include <stdio.h>\n"));
    }

    #[test]
    fn each_file_is_inlined_once() {
        let dir = tree();
        let out = combine(dir.path(), false);
        assert_eq!(out.matches("int a(void);").count(), 1);
        assert_eq!(out.matches("/**** start inlining common/a.h ****/").count(), 1);
        assert!(out.contains("/**** skipping file: common/a.h ****/"));
    }

    #[test]
    fn nested_includes_resolve_relative_to_parent() {
        let dir = tree();
        let out = combine(dir.path(), false);
        assert!(out.contains(
            "/**** start inlining inner.h ****/\nint inner(void);\n/**** ended inlining inner.h ****/\n"
        ));
    }

    #[test]
    fn pragma_once_is_stripped() {
        let dir = tree();
        let out = combine(dir.path(), false);
        assert!(!out.contains("#pragma once"));
    }

    #[test]
    fn keep_excluded_retains_directive() {
        let dir = tree();
        let out = combine(dir.path(), true);
        assert!(out.contains(
            "/**** *NOT* inlining legacy/zstd_legacy.h ****/\n#include \"legacy/zstd_legacy.h\"\n"
        ));
        assert!(!out.contains("LEGACY_ONLY_SYMBOL"));
    }

    #[test]
    fn unresolved_quoted_include_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.c");
        fs::write(&input, "#include \"nowhere.h\"\nint x;\n").unwrap();
        let out = combine_file(&input, &[], &[], false).unwrap();
        assert_eq!(out, "#include \"nowhere.h\"\nint x;\n");
    }

    #[test]
    fn combiner_writes_to_workdir_root() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("zstd");
        fs::create_dir_all(source.join("build/single_file_libs")).unwrap();
        fs::create_dir_all(source.join("lib/legacy")).unwrap();
        fs::write(
            source.join("build/single_file_libs/zstd-in.c"),
            "#include \"zstd.h\"\n#include \"legacy/zstd_legacy.h\"\n",
        )
        .unwrap();
        fs::write(source.join("lib/zstd.h"), "int ZSTD_versionNumber(void);\n").unwrap();
        fs::write(source.join("lib/legacy/zstd_legacy.h"), LEGACY).unwrap();

        let workdir = Workdir::new(dir.path());
        let out = NativeCombiner
            .combine(&workdir, &CombineSpec::default())
            .unwrap();
        assert_eq!(out, dir.path().join("zstd.c"));
        let text = fs::read_to_string(out).unwrap();
        assert!(text.contains("int ZSTD_versionNumber(void);"));
        assert!(!text.contains("LEGACY_ONLY_SYMBOL"));
    }

    #[test]
    fn directive_matching() {
        assert_eq!(match_include("  #  include \"x/y.h\" // c\n"), Some("x/y.h"));
        assert_eq!(match_include("#include <x.h>\n"), None);
        assert_eq!(match_include("// #include \"x.h\"\n"), None);
        assert!(is_pragma_once("#pragma once\n"));
        assert!(is_pragma_once("  # pragma   once  \n"));
        assert!(!is_pragma_once("#pragma pack(1)\n"));
    }
}
