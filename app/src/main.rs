use std::path::PathBuf;

use clap::{Parser, Subcommand};
use common::config::{Config, Settings};
use eyre::{Context, Result};
use hyperfine::{ResultSet, discover_result_files};
use regex::Regex;
use tracing::{debug, error};
use tracing_subscriber::{
    EnvFilter,
    fmt::{layer, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

mod config;

/// Workspace crates that get the same log level as the binary
const MODULES: &[&str] = &["common", "hyperfine", "hyperfine_basic"];

#[derive(Parser)]
#[command(author, version, about = "Combine and plot hyperfine benchmark results")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Config file, `config.yaml` is used when present
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Extra tracing directives, ie. `hyperfine=debug`
    #[arg(short, long, global = true)]
    log: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Combine all result files into one
    Combine {
        /// Directory holding the hyperfine json exports
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Generate plots from the combined results
    Plot {
        /// Combined results file
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Directory the plots are written to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// List result files that would be combined
    Ls {
        /// Directory holding the hyperfine json exports
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();
    let config = config::load_config(args.config.as_deref())?;
    init_logging(&config.settings, &args.log)?;

    let result = match args.command {
        Commands::Combine { dir } => combine(config, dir),
        Commands::Plot { input, output_dir } => plot(config, input, output_dir),
        Commands::Ls { dir } => list_results(config, dir),
    };
    if let Err(err) = result {
        error!("{err:#?}");
        return Err(err);
    }
    Ok(())
}

fn init_logging(settings: &Settings, directives: &[String]) -> Result<()> {
    let log_level = std::env::var("RUST_LOG").unwrap_or(settings.log.clone());
    let mut env_filter = EnvFilter::new(format!("hyperfine_plots={log_level}"));

    for log in directives {
        env_filter = env_filter.add_directive(log.parse()?);
    }

    for module in MODULES {
        if !directives.iter().any(|x| x.starts_with(module)) {
            env_filter = env_filter.add_directive(format!("{module}={log_level}").parse()?);
        }
    }

    let file_layer = match &settings.log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(std::path::Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("Invalid log file {}", path.display()))?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            Some(layer().with_ansi(false).with_writer(appender))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            layer()
                .with_timer(ChronoLocal::new("%v %k:%M:%S %z".to_owned()))
                .compact(),
        )
        .with(file_layer)
        .init();
    Ok(())
}

fn combine(config: Config, dir: Option<PathBuf>) -> Result<()> {
    let mut settings = config.settings;
    if let Some(dir) = dir {
        settings.results_dir = dir;
    }

    let summary = hyperfine::combine(&settings).context("Combine results")?;
    println!(
        "Combined {} records from {} files into {}",
        summary.records,
        summary.files.len(),
        summary.output.display()
    );
    Ok(())
}

fn plot(config: Config, input: Option<PathBuf>, output_dir: Option<PathBuf>) -> Result<()> {
    let mut settings = config.settings;
    if let Some(output_dir) = output_dir {
        settings.output_dir = output_dir;
    }
    let combined_path = input.unwrap_or_else(|| settings.combined_path());
    let plots = config
        .plots
        .or_else(|| Some(hyperfine_basic::default_plots()));
    debug!("Plotting {} into {}", combined_path.display(), settings.output_dir.display());

    let written = common::plot::plot(&plots, &combined_path, &settings.output_dir, &settings)?;
    for path in &written {
        println!("{}", path.display());
    }
    if written.is_empty() {
        println!("No results to plot in {}", combined_path.display());
    }
    Ok(())
}

fn list_results(config: Config, dir: Option<PathBuf>) -> Result<()> {
    let settings = config.settings;
    let dir = dir.unwrap_or(settings.results_dir);
    let pattern = Regex::new(&settings.file_pattern)
        .context(format!("Invalid file pattern {}", settings.file_pattern))?;

    for file in discover_result_files(&dir, &pattern, &settings.combined_file)? {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match ResultSet::from_path(&file) {
            Ok(set) => println!("{name} -> {} records", set.len()),
            Err(err) => println!("{name} -> invalid: {err}"),
        }
    }
    Ok(())
}
