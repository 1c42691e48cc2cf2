//! OrthoEvidence CLI - derive evidence tables from clinical research and
//! score orthodontic treatment necessity.

use clap::Parser;
use ortho_cli::{commands, Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> ortho_cli::Result<()> {
    let cli = Cli::parse();

    // Load or create config
    let config = Config::load(cli.config.as_deref()).or_else(|_| {
        let cfg = Config::default();
        cfg.save().ok();
        Ok::<_, ortho_cli::CliError>(cfg)
    })?;

    let format = cli.format.unwrap_or(ortho_cli::cli::CliFormat::Table);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Init(args) => commands::execute_init(args, &config, &formatter)?,
        Command::Classify => commands::execute_classify(&config, &formatter)?,
        Command::Aggregate => commands::execute_aggregate(&config, &formatter)?,
        Command::Worker(args) => commands::execute_worker(args, &config).await?,
        Command::Score(args) => commands::execute_score(args, &config, &formatter)?,
        Command::Evidence(args) => commands::execute_evidence(args, &config, &formatter)?,
        Command::Reports => commands::execute_reports(&config, &formatter)?,
    }

    Ok(())
}
