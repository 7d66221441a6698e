//! Weaver cockpit CLI entry point.

use clap::Parser;

use weaver_cockpit::cli::{self, Cli, CliContext};
use weaver_cockpit::infrastructure::config::ConfigLoader;
use weaver_cockpit::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => cli::handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&LogConfig::from(&config.logging)) {
        Ok(logger) => Some(logger),
        Err(err) => {
            eprintln!("warning: logging disabled: {err:#}");
            None
        }
    };

    let ctx = CliContext::new(config, cli.project, cli.json).await;

    if let Err(err) = cli::commands::dispatch(cli.command, &ctx).await {
        cli::handle_error(err, ctx.json);
    }
}
