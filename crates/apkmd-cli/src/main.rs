//! CLI entry point - the composition root.
//!
//! This is the ONLY place where infrastructure is wired together via
//! bootstrap. Command dispatch routes to handlers.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use apkmd_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli).await {
        if let Some(cli_err) = err.downcast_ref::<CliError>() {
            eprintln!("Error: {cli_err}");
            std::process::exit(cli_err.exit_code());
        }
        return Err(err);
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        // No command provided - show help
        Cli::command().print_help()?;
        return Ok(());
    };

    // Bootstrap the CLI context (composition root)
    let config = CliConfig::from_env(cli.failure_store)?;
    let ctx = bootstrap(config)?;

    match command {
        Commands::Download(args) => {
            let cancel = ctx.cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            });
            handlers::download::execute(&ctx, &args).await?;
        }
        Commands::Failures { command } => {
            handlers::failures::execute(&ctx.failure_store_path, &command)?;
        }
        Commands::Paths => {
            handlers::paths::execute(&ctx.failure_store_path)?;
        }
    }

    Ok(())
}
