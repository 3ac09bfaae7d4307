use clap::Parser;
use previewctl::config::{Args, Command};
use previewctl::{Application, Config, launcher, prereq, telemetry};

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI args
    let args = Args::parse();

    // Load configuration (defaults <- file <- environment <- CLI flags)
    let config = Config::load(&args)?;

    // If --validate flag is set, exit successfully after config validation
    if args.validate {
        println!("Configuration is valid.");
        return Ok(());
    }

    telemetry::init_telemetry()?;

    tracing::debug!("{:?}", args);

    let command = args.command.unwrap_or(Command::Serve {
        port: None,
        dir: None,
    });

    match command {
        Command::Serve { .. } => {
            // Flag overrides were already folded into the config by Config::load
            Application::new(config)?.serve(shutdown_signal()).await?;
        }
        Command::Build => {
            launcher::run_build(&config.app_dir).await?;
        }
        Command::Dev => {
            launcher::run_dev(&config.app_dir, shutdown_signal()).await?;
        }
        Command::Check => {
            for found in prereq::check_all().await? {
                println!("{} {}", found.tool, found.version);
            }
        }
    }

    Ok(())
}
