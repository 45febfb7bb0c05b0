//! `zstdgen doctor`: toolchain diagnostics.

use std::process::Command;

use anyhow::Result;
use zstdgen_pipeline::{ConfigDefaults, ContentHash, GenConfig};
use zstdgen_targets::{matrix::Host, resolve, EnvSnapshot};

/// Print what a generation run would use and whether the tools exist.
pub fn run(env: &EnvSnapshot, defaults: ConfigDefaults) -> Result<()> {
    let config = GenConfig::from_env(env, defaults)?;

    println!("=== zstdgen doctor ===");
    println!();
    println!("zstdgen version: {}", env!("CARGO_PKG_VERSION"));
    println!("Upstream:        {} @ {}", config.upstream.repo, config.upstream.rev);
    println!("Output dir:      {}", config.out_dir.display());
    println!("Combiner:        {}", config.combiner);
    println!();

    println!("--- External Tools ---");
    print_tool_status("git", &["--version"]);
    print_tool_status("python3", &["--version"]);
    print_tool_status(&config.transpile.program, &["-version"]);
    println!();

    println!("--- Patch ---");
    match std::fs::read(&config.patch_path) {
        Ok(bytes) => {
            println!("  {}", config.patch_path.display());
            println!("  sha256: {}", ContentHash::compute(&bytes));
        }
        Err(e) => println!("  {}: {e}", config.patch_path.display()),
    }
    println!();

    println!("--- Targets ---");
    match resolve(env, &Host::current()) {
        Ok(matrix) => {
            println!("  Resolution: {}", matrix.shape);
            for entry in &matrix.entries {
                match &entry.compiler {
                    Some(cc) => println!("  {} (CC={cc})", entry.target),
                    None => println!("  {}", entry.target),
                }
            }
        }
        Err(e) => println!("  error: {e}"),
    }

    Ok(())
}

fn print_tool_status(name: &str, args: &[&str]) {
    match Command::new(name).args(args).output() {
        Ok(output) => {
            // python3 reported its version on stderr before 3.4.
            let text = if output.stdout.is_empty() {
                String::from_utf8_lossy(&output.stderr)
            } else {
                String::from_utf8_lossy(&output.stdout)
            };
            let first_line = text.lines().next().unwrap_or("(unknown version)");
            println!("  {name}: {first_line}");
        }
        Err(_) => {
            println!("  {name}: not found");
        }
    }
}
