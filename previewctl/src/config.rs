//! Configuration loading and validation.
//!
//! Configuration is layered: built-in defaults, then an optional YAML file,
//! then `PREVIEWCTL_`-prefixed environment variables, then CLI flags. The CLI
//! flags always win so that `previewctl serve --port 8080` behaves the same
//! regardless of what a config file says.
//!
//! ```yaml
//! # previewctl.yaml
//! port: 8080
//! build_dir: dist
//! ```
//!
//! ```bash
//! # Or override individual values from the environment
//! PREVIEWCTL_PORT=8080
//! PREVIEWCTL_CORS_ENABLED=false
//! ```

use clap::{Parser, Subcommand};
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::Error;

/// CLI surface: global options plus one subcommand (defaults to `serve`).
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "PREVIEWCTL_CONFIG", default_value = "previewctl.yaml")]
    pub config: String,

    /// Validate configuration and exit without running a command.
    #[arg(long)]
    pub validate: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve the production build output over HTTP
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Build output directory to serve
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Run the front-end production build
    Build,
    /// Run the front-end development server until interrupted
    Dev,
    /// Check that required external tools are installed
    Check,
}

/// Main application configuration.
///
/// All fields have defaults, so an empty config file (or none at all) gives a
/// working setup: serve `./dist` on `127.0.0.1:3000` with CORS enabled.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Host to bind the preview server to
    pub host: String,
    /// Port to bind the preview server to
    pub port: u16,
    /// Directory containing the production build output
    pub build_dir: PathBuf,
    /// Directory containing the front-end sources (where `package.json` lives)
    pub app_dir: PathBuf,
    /// Attach permissive CORS headers to every response
    pub cors_enabled: bool,
    /// How long in-flight requests may drain after a shutdown signal (seconds)
    pub shutdown_grace_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            build_dir: PathBuf::from("dist"),
            app_dir: PathBuf::from("."),
            cors_enabled: true,
            shutdown_grace_secs: 5,
        }
    }
}

impl Config {
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        // CLI flags win over file and environment
        if let Some(Command::Serve { port, dir }) = &args.command {
            if let Some(port) = port {
                config.port = *port;
            }
            if let Some(dir) = dir {
                config.build_dir = dir.clone();
            }
        }

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values.
            // PREVIEWCTL_CONFIG belongs to clap, not to the Config struct.
            .merge(Env::prefixed("PREVIEWCTL_").ignore(&["config"]))
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.port == 0 {
            return Err(Error::Config {
                message: "port must be non-zero".to_string(),
            });
        }

        if self.shutdown_grace_secs > 600 {
            return Err(Error::Config {
                message: format!(
                    "shutdown_grace_secs ({}) must be at most 600",
                    self.shutdown_grace_secs
                ),
            });
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}
