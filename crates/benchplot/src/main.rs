use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use benchplot::{Cli, report};
use benchplot_core::PlotConfig;

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .target(env_logger::Target::Stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => PlotConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PlotConfig::builtin().context("built-in config is invalid")?,
    };

    let request = cli.to_request();
    let output = report::run(&request, &config).with_context(|| {
        format!("{} plot for {}/{} failed", request.plot_type, request.domain, request.subdomain)
    })?;
    log::info!("{} rows, {} files written", output.rows, output.files.len());
    Ok(())
}
