//! `ccwrap`: compiler wrapper shim.

use std::process;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use zstdgen_targets::EnvSnapshot;

fn main() {
    let env = EnvSnapshot::from_process();
    init_logging(&env);

    if let Err(e) = run(&env) {
        eprintln!("ccwrap: {e:#}");
        process::exit(1);
    }
}

fn run(env: &EnvSnapshot) -> anyhow::Result<()> {
    let config = ccwrap::WrapperConfig::from_env(env)?;
    ccwrap::run(&config, std::env::args_os().skip(1))
        .with_context(|| format!("running {}", config.compiler))
}

/// Log to stderr only, so compiler output on stdout stays untouched.
fn init_logging(env: &EnvSnapshot) {
    let filter = env.get("CCWRAP_LOG").unwrap_or("warn");
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}
