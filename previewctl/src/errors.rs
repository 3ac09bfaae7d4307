use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Build output directory does not exist
    #[error("build output not found at {path}; run `previewctl build` first", path = .path.display())]
    BuildMissing { path: PathBuf },

    /// Requested port is already bound by another process
    #[error("port {port} is already in use; pick a different port or stop the process holding it")]
    PortInUse { port: u16 },

    /// Listener bind failed for a reason other than a port conflict
    #[error("failed to bind listener: {source}")]
    BindFailed {
        #[source]
        source: io::Error,
    },

    /// Required external tool is not installed
    #[error("{tool} is not installed or not on PATH")]
    ToolMissing { tool: &'static str },

    /// External tool is present but its version probe failed
    #[error("`{tool} --version` exited with {status}")]
    ToolFailed {
        tool: &'static str,
        status: ExitStatus,
    },

    /// The front-end build tool exited with a non-zero status
    #[error("front-end build failed with {status}")]
    BuildFailed { status: ExitStatus },

    /// The front-end dev server exited with a non-zero status
    #[error("dev server exited with {status}")]
    DevServerFailed { status: ExitStatus },

    /// Invalid configuration
    #[error("invalid configuration: {message}")]
    Config { message: String },

    /// Unexpected I/O error
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_in_use_message_names_the_port() {
        let err = Error::PortInUse { port: 3000 };
        assert!(err.to_string().contains("3000"));
    }

    #[test]
    fn build_missing_message_points_at_the_build_step() {
        let err = Error::BuildMissing {
            path: PathBuf::from("dist"),
        };
        let message = err.to_string();
        assert!(message.contains("dist"));
        assert!(message.contains("previewctl build"));
    }
}
