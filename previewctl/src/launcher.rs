//! Launchers for the external front-end toolchain.
//!
//! Both launchers follow the same shape: probe the required tools, shell out
//! to npm with stdio forwarded, and surface the exit status as a typed
//! result. Dependency installation and browser launching are the operator's
//! business, not ours.

use std::path::Path;
use std::process::ExitStatus;
use tokio::process::{Child, Command};
use tracing::info;

use crate::errors::{Error, Result};
use crate::prereq;

/// Run the production build (`npm run build`) in `app_dir`.
pub async fn run_build(app_dir: &Path) -> Result<()> {
    prereq::check_all().await?;

    info!("building front-end in {}", app_dir.display());
    let status = Command::new("npm")
        .args(["run", "build"])
        .current_dir(app_dir)
        .status()
        .await?;

    if !status.success() {
        return Err(Error::BuildFailed { status });
    }

    info!("front-end build complete");
    Ok(())
}

/// Run the development server (`npm run dev`) until it exits or `shutdown`
/// resolves. An interrupt-driven stop is success, not an error.
pub async fn run_dev<F>(app_dir: &Path, shutdown: F) -> Result<()>
where
    F: std::future::Future<Output = ()>,
{
    prereq::check_all().await?;

    info!("starting front-end dev server in {}", app_dir.display());
    let child = Command::new("npm")
        .args(["run", "dev"])
        .current_dir(app_dir)
        .spawn()?;

    match supervise(child, shutdown).await? {
        Some(status) if !status.success() => Err(Error::DevServerFailed { status }),
        Some(_) => Ok(()),
        None => {
            info!("dev server stopped");
            Ok(())
        }
    }
}

/// Drive a child process to completion, killing it if `shutdown` fires first.
///
/// Returns the exit status when the child finished on its own, `None` when it
/// was stopped by the shutdown signal.
async fn supervise<F>(mut child: Child, shutdown: F) -> Result<Option<ExitStatus>>
where
    F: std::future::Future<Output = ()>,
{
    tokio::select! {
        status = child.wait() => Ok(Some(status?)),
        _ = shutdown => {
            child.start_kill()?;
            let _ = child.wait().await;
            Ok(None)
        }
    }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn supervise_reports_the_exit_status() {
        let child = Command::new("sh").args(["-c", "exit 3"]).spawn().unwrap();

        let status = supervise(child, std::future::pending())
            .await
            .unwrap()
            .expect("child should finish on its own");

        assert_eq!(status.code(), Some(3));
    }

    #[tokio::test]
    async fn supervise_passes_success_through() {
        let child = Command::new("true").spawn().unwrap();

        let status = supervise(child, std::future::pending()).await.unwrap();

        assert!(status.unwrap().success());
    }

    #[tokio::test]
    async fn supervise_kills_the_child_on_shutdown() {
        let child = Command::new("sleep").arg("30").spawn().unwrap();

        let status = supervise(child, std::future::ready(())).await.unwrap();

        assert!(status.is_none());
    }
}
