//! `zstdgen targets`: show the resolved target matrix without running it.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use serde::Serialize;
use zstdgen_pipeline::{ConfigDefaults, FlagSet, GenConfig};
use zstdgen_targets::{matrix::Host, resolve, EnvSnapshot, ResolutionShape, TargetMatrix};

#[derive(Debug, Serialize)]
struct TargetsView {
    shape: ResolutionShape,
    targets: Vec<TargetView>,
}

#[derive(Debug, Serialize)]
struct TargetView {
    os: String,
    arch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    compiler: Option<String>,
    output: PathBuf,
    args: Vec<String>,
}

pub fn run(env: &EnvSnapshot, defaults: ConfigDefaults, format: &str) -> Result<()> {
    let config = GenConfig::from_env(env, defaults)?;
    let matrix = resolve(env, &Host::current())?;
    print!("{}", render(&matrix, &config, format)?);
    Ok(())
}

fn view(matrix: &TargetMatrix, config: &GenConfig) -> Result<TargetsView> {
    // The combined source does not exist yet; show where it will land.
    let input = Path::new("<workdir>").join(&config.combine.output);
    let targets = matrix
        .entries
        .iter()
        .map(|entry| {
            let flags = FlagSet::build(
                &entry.target,
                matrix.shape,
                &input,
                &config.out_dir,
                &config.transpile,
            )?;
            Ok(TargetView {
                os: entry.target.os.to_string(),
                arch: entry.target.arch.clone(),
                compiler: entry.compiler.clone(),
                output: flags.output.clone(),
                args: flags.to_args(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(TargetsView {
        shape: matrix.shape,
        targets,
    })
}

fn render(matrix: &TargetMatrix, config: &GenConfig, format: &str) -> Result<String> {
    let view = view(matrix, config)?;
    match format {
        "human" => {
            let mut out = format!(
                "Resolution: {} ({} target(s))\n",
                view.shape,
                view.targets.len()
            );
            for t in &view.targets {
                out.push_str(&format!("\n  {}/{}\n", t.os, t.arch));
                if let Some(cc) = &t.compiler {
                    out.push_str(&format!("    CC:     {cc}\n"));
                }
                out.push_str(&format!("    output: {}\n", t.output.display()));
                out.push_str(&format!("    flags:  {}\n", t.args.join(" ")));
            }
            Ok(out)
        }
        "json" => Ok(serde_json::to_string_pretty(&view)? + "\n"),
        "toml" => Ok(toml::to_string_pretty(&view)?),
        other => bail!("unknown format '{other}' (expected human, json, or toml)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GenConfig {
        GenConfig::new(ConfigDefaults {
            patch_path: PathBuf::from("/src/patches/p.patch"),
            out_dir: PathBuf::from("/out"),
        })
    }

    fn matrix(pairs: &[(&str, &str)]) -> TargetMatrix {
        resolve(
            &EnvSnapshot::from_pairs(pairs.iter().copied()),
            &Host::new("linux", "amd64"),
        )
        .unwrap()
    }

    #[test]
    fn human_output_lists_flags() {
        let m = matrix(&[("ZSTD_GEN_TARGETS", "darwin_arm64"), ("ZSTD_GEN_CCS", "o64-clang")]);
        let text = render(&m, &config(), "human").unwrap();
        assert!(text.starts_with("Resolution: matrix (1 target(s))"));
        assert!(text.contains("darwin/arm64"));
        assert!(text.contains("CC:     o64-clang"));
        assert!(text.contains("-ignore-unsupported-alignment"));
        assert!(text.contains("/out/zstd_darwin_arm64.go"));
    }

    #[test]
    fn json_output_is_structured() {
        let m = matrix(&[("TARGET_GOOS", "windows"), ("TARGET_GOARCH", "arm64")]);
        let text = render(&m, &config(), "json").unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["shape"], "single-target");
        assert_eq!(value["targets"][0]["os"], "windows");
        assert!(value["targets"][0].get("compiler").is_none());
    }

    #[test]
    fn toml_output_parses() {
        let m = matrix(&[]);
        let text = render(&m, &config(), "toml").unwrap();
        let value: toml::Value = toml::from_str(&text).unwrap();
        assert_eq!(value["targets"][0]["os"].as_str(), Some("linux"));
    }

    #[test]
    fn unknown_format_errors() {
        assert!(render(&matrix(&[]), &config(), "yaml").is_err());
    }
}
