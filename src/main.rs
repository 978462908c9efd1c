use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use env_logger::Env;
use log::{debug, info};
use std::path::PathBuf;
use std::process::ExitCode;

use tgraph::config_loader::{self, CliOverrides};
use tgraph::{ExportFormat, RenderTarget, Topology, ViewerConfig};

/// Visualize a network topology described by a JSON file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the topology JSON file
    filepath: PathBuf,

    /// Viewer configuration file (YAML or JSON) with layout and style settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a static rendering to this path instead of opening a view
    #[arg(short, long, conflicts_with = "text")]
    export: Option<PathBuf>,

    /// Export format (svg, dot, txt, json); inferred from --export when omitted
    #[arg(short, long)]
    format: Option<ExportFormat>,

    /// Print the text rendering to standard output
    #[arg(long)]
    text: bool,

    /// Seed for the layout's initial jitter
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum number of layout iterations
    #[arg(long)]
    iterations: Option<usize>,

    /// Canvas width for image exports
    #[arg(long)]
    width: Option<f64>,

    /// Canvas height for image exports
    #[arg(long)]
    height: Option<f64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn target(&self) -> Result<RenderTarget> {
        if let Some(path) = &self.export {
            let format = match self.format {
                Some(format) => format,
                None => ExportFormat::from_path(path)?,
            };
            return Ok(RenderTarget::File {
                path: path.clone(),
                format,
            });
        }
        if self.text {
            return Ok(RenderTarget::Stdout(self.format.unwrap_or(ExportFormat::Txt)));
        }
        if let Some(format) = self.format {
            return Err(eyre!("--format {} needs --export or --text", format));
        }
        Ok(RenderTarget::Interactive)
    }

    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            seed: self.seed,
            iterations: self.iterations,
            width: self.width,
            height: self.height,
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let mut viewer = match &args.config {
        Some(path) => config_loader::load_config(path)?,
        None => ViewerConfig::default(),
    };
    config_loader::apply_cli_overrides(&mut viewer, &args.overrides())?;

    let target = args.target()?;
    let document = config_loader::load_topology(&args.filepath)?;

    let mut topology = Topology::new(document)
        .with_viewer_config(viewer)?
        .with_target(target);
    topology.view()?;

    info!("Done");
    Ok(())
}

fn main() -> ExitCode {
    // Initialize error handling
    if let Err(err) = color_eyre::install() {
        eprintln!("Failed to install error handler: {}", err);
    }

    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging with default filter level of "warn" ("debug" with --verbose)
    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    info!("Topology file: {:?}", args.filepath);

    // Errors are reported as a plain message chain, without a backtrace
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!("{:?}", err);
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
