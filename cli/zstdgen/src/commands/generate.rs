//! `zstdgen generate`: run the full pipeline.

use anyhow::{Context, Result};
use tracing::info;
use zstdgen_pipeline::{ConfigDefaults, GenConfig, Pipeline};
use zstdgen_targets::{matrix::Host, resolve, EnvSnapshot};

/// Resolve configuration and targets, then generate every target in turn.
pub fn run(env: &EnvSnapshot, defaults: ConfigDefaults) -> Result<()> {
    let config = GenConfig::from_env(env, defaults)?;
    let matrix = resolve(env, &Host::current()).context("resolving targets")?;
    info!(
        shape = %matrix.shape,
        targets = %matrix.targets().map(|t| t.key()).collect::<Vec<_>>().join(","),
        rev = %config.upstream.rev,
        combiner = %config.combiner,
        "starting generation"
    );

    let pipeline = Pipeline::from_config(&config);
    let report = pipeline.run(&config, &matrix).map_err(|e| {
        let stage = e.stage();
        anyhow::Error::new(e).context(format!("{stage} stage failed"))
    })?;

    println!("{report}");
    Ok(())
}
