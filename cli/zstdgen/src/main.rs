//! zstdgen: generates per-target Go sources for zstd by transpiling the
//! upstream C library.
//!
//! All configuration comes from environment variables; see `zstdgen --help`.

mod commands;

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use zstdgen_pipeline::config::PATCH_FILE_NAME;
use zstdgen_pipeline::ConfigDefaults;
use zstdgen_targets::EnvSnapshot;

const ENV_HELP: &str = "\
Environment:
  TARGET_GOOS, GOOS / TARGET_GOARCH, GOARCH   single target (default: host)
  ZSTD_GEN_TARGETS, ZSTD_GEN_CCS              legacy ';'-separated target matrix
  ZSTD_GEN_MODE                               matrix | single
  ZSTD_GEN_CC                                 CC for the single target
  ZSTD_GEN_OUT_DIR                            output directory (default: .)
  ZSTD_GEN_PATCH                              compatibility patch
  ZSTD_GEN_REPO, ZSTD_GEN_REV                 upstream pin
  ZSTD_GEN_COMBINER                           script | native
  ZSTD_GEN_TRANSPILER                         transpiler executable (default: ccgo)
  ZSTD_GEN_LOG                                log filter (default: info)";

#[derive(Parser)]
#[command(
    name = "zstdgen",
    version,
    about = "Generate zstd Go sources for a matrix of targets",
    after_help = ENV_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, patch, combine, and transpile (the default)
    Generate,
    /// Show the resolved targets and their transpiler flags
    Targets {
        /// Output format (human, json, toml)
        #[arg(long, default_value = "human")]
        format: String,
    },
    /// Check that the external tools are available
    Doctor,
}

fn main() {
    let cli = Cli::parse();
    let env = EnvSnapshot::from_process();
    init_logging(&env);

    if let Err(e) = run(cli, &env) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli, env: &EnvSnapshot) -> Result<()> {
    let defaults = default_config()?;
    match cli.command.unwrap_or(Commands::Generate) {
        Commands::Generate => commands::generate::run(env, defaults),
        Commands::Targets { format } => commands::targets::run(env, defaults, &format),
        Commands::Doctor => commands::doctor::run(env, defaults),
    }
}

/// The stored patch next to this crate's sources, and the current directory.
fn default_config() -> Result<ConfigDefaults> {
    let patch_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("patches")
        .join(PATCH_FILE_NAME);
    let out_dir = std::env::current_dir().context("reading current directory")?;
    Ok(ConfigDefaults {
        patch_path,
        out_dir,
    })
}

fn init_logging(env: &EnvSnapshot) {
    let filter = env.get("ZSTD_GEN_LOG").unwrap_or("info");
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
