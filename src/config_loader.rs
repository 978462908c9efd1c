use crate::config::ViewerConfig;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{debug, info};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Load and validate viewer configuration from a YAML (or JSON) file
pub fn load_config(config_path: &Path) -> Result<ViewerConfig> {
    info!("Loading viewer configuration from: {:?}", config_path);

    let file = File::open(config_path).wrap_err_with(|| {
        format!("Failed to open configuration file '{}'", config_path.display())
    })?;

    // YAML is a superset of JSON, so both formats go through serde_yaml
    let config: ViewerConfig =
        serde_yaml::from_reader(BufReader::new(file)).wrap_err_with(|| {
            format!("Failed to parse configuration file '{}'", config_path.display())
        })?;

    config.validate()?;
    debug!("Viewer configuration: {:?}", config);

    Ok(config)
}

/// Read and decode a topology document
///
/// Only JSON decoding happens here; structural validation is left to
/// `graph::parse_topology` so that schema errors surface from the core.
pub fn load_topology(topology_path: &Path) -> Result<Value> {
    info!("Reading topology from: {:?}", topology_path);

    let file = File::open(topology_path)
        .wrap_err_with(|| format!("Failed to open topology file '{}'", topology_path.display()))?;

    serde_json::from_reader(BufReader::new(file))
        .wrap_err_with(|| format!("'{}' is not valid JSON", topology_path.display()))
}

/// CLI arguments that can override configuration file settings
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub seed: Option<u64>,
    pub iterations: Option<usize>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// Apply CLI overrides to a viewer configuration
pub fn apply_cli_overrides(config: &mut ViewerConfig, overrides: &CliOverrides) -> Result<()> {
    if let Some(seed) = overrides.seed {
        info!("Layout seed overridden from command line: {}", seed);
        config.layout.seed = seed;
    }

    if let Some(iterations) = overrides.iterations {
        info!("Layout iteration cap overridden from command line: {}", iterations);
        config.layout.max_iterations = iterations;
    }

    if let Some(width) = overrides.width {
        config.style.width = width;
    }

    if let Some(height) = overrides.height {
        config.style.height = height;
    }

    // Re-validate after applying overrides
    config.validate()?;

    Ok(())
}
