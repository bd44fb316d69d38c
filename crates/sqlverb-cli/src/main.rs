use clap::Parser;
use sqlverb_cli::cli::Cli;
use sqlverb_cli::config::{self, ConfigBuilder};
use sqlverb_cli::{commands, observability};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // CLI arguments first so the file and env layers override them
    let mut builder = ConfigBuilder::new().json_logs(cli.json_logs);
    if let Some(ref dsn) = cli.dsn {
        builder = builder.dsn_str(dsn)?;
    }
    if cli.verbose {
        builder = builder.log_level("debug".to_string());
    }

    let builder = if let Some(ref path) = cli.config {
        config::load_config_from_path(path, builder)?
    } else {
        config::load_config(builder)?
    };
    let config = builder.build()?;

    observability::init_logging(&config.telemetry);
    tracing::debug!(?config, "configuration loaded");

    let output = commands::run(&config, &cli.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
