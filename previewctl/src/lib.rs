//! # previewctl: local preview tooling for the Kanban front-end
//!
//! `previewctl` wraps the operational chores around a separately-built React
//! front-end: serve the production bundle for a local preview, run the
//! production build, launch the dev server, and check that the external
//! toolchain is installed at all.
//!
//! ## The preview server
//!
//! The one component with a real contract is the static build server. It
//! serves the build output directory (`dist` by default) over plain HTTP and
//! attaches permissive CORS headers to **every** response, so the preview can
//! be embedded or fetched from any origin during development:
//!
//! - `Access-Control-Allow-Origin: *`
//! - `Access-Control-Allow-Methods: GET, POST, OPTIONS`
//! - `Access-Control-Allow-Headers: Content-Type`
//!
//! Failures are never retried. A missing build directory fails before any
//! socket is touched, and a taken port is reported as exactly that. An
//! interrupt (Ctrl+C / SIGTERM) is a clean stop, not an error; on shutdown,
//! in-flight requests get a bounded grace period to drain before the listener
//! is dropped.
//!
//! ## Quick start
//!
//! ```no_run
//! use clap::Parser;
//! use previewctl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = previewctl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     previewctl::telemetry::init_telemetry()?;
//!
//!     // Serve the build output with graceful shutdown on Ctrl+C
//!     Application::new(config)?
//!         .serve(async {
//!             tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!         })
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! The launchers ([`launcher`]) and prerequisite probes ([`prereq`]) shell out
//! to npm and report typed errors; they never run as part of the server.

pub mod config;
pub mod errors;
pub mod launcher;
pub mod prereq;
pub mod static_files;
pub mod telemetry;

pub use config::Config;
pub use errors::{Error, Result};

use axum::Router;
use axum::http::{HeaderValue, header};
use axum::routing::get;
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};

use static_files::{ServeRoot, serve_asset};

/// The header trio attached to every response when CORS is enabled.
fn cors_headers() -> [(header::HeaderName, HeaderValue); 3] {
    [
        (
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, OPTIONS"),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ),
    ]
}

/// Build the preview router: asset fallback, CORS headers, request tracing.
pub fn build_router(config: &Config) -> Router {
    let root = Arc::new(ServeRoot::new(&config.build_dir));
    let mut router = Router::new().fallback(get(serve_asset)).with_state(root);

    if config.cors_enabled {
        // SetResponseHeaderLayer applies to every response that passes
        // through, 404s included. CorsLayer would only emit the method and
        // header allowances on preflight responses, which is not the contract
        // here.
        for (name, value) in cors_headers() {
            router = router.layer(SetResponseHeaderLayer::overriding(name, value));
        }
    }

    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

/// Top-level container for the preview server.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] checks preconditions and assembles the
///    router. A missing build directory fails here, before any socket exists.
/// 2. **Serve**: [`Application::serve`] binds the TCP port and blocks until
///    the shutdown future resolves or serving fails.
#[derive(Debug)]
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Check preconditions and assemble the router.
    ///
    /// Fails with [`Error::BuildMissing`] when the build output directory
    /// does not exist; no socket is bound in that case.
    pub fn new(config: Config) -> Result<Self> {
        if !config.build_dir.is_dir() {
            return Err(Error::BuildMissing {
                path: config.build_dir.clone(),
            });
        }

        let router = build_router(&config);
        Ok(Self { router, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Bind the listener and serve until `shutdown` resolves.
    ///
    /// A taken port maps to [`Error::PortInUse`], any other bind failure to
    /// [`Error::BindFailed`]; neither is retried. Once `shutdown` fires, the
    /// listener stops accepting and in-flight requests may drain for the
    /// configured grace period; whatever is still running after that is
    /// dropped together with the listener.
    pub async fn serve<F>(self, shutdown: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let port = self.config.port;
        let grace = self.config.shutdown_grace();

        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AddrInUse => Error::PortInUse { port },
                _ => Error::BindFailed { source: e },
            })?;
        info!("preview server listening on http://{bind_addr}");

        // Mirror the shutdown signal so the drain timer only starts counting
        // once the signal has actually fired
        let (signal_tx, signal_rx) = tokio::sync::oneshot::channel::<()>();
        let shutdown = async move {
            shutdown.await;
            let _ = signal_tx.send(());
        };

        let server = axum::serve(listener, self.router).with_graceful_shutdown(shutdown);
        let mut server = std::pin::pin!(server.into_future());

        tokio::select! {
            result = &mut server => result?,
            _ = async {
                let _ = signal_rx.await;
                tokio::time::sleep(grace).await;
            } => {
                info!("drain period of {grace:?} elapsed, dropping in-flight requests");
            }
        }

        info!("preview server stopped");
        Ok(())
    }
}
