use std::path::PathBuf;
use std::process::ExitStatus;

use docgen_resolve::ResolveError;

/// Error returned while building the site.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// An output file or directory could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// An input file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The dependency command could not be started.
    #[error("Failed to run `{command}` for {}: {source}", module.display())]
    DependencyCommand {
        command: String,
        module: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The dependency command exited unsuccessfully.
    #[error("`{command}` failed for {} ({status}): {stderr}", module.display())]
    DependencyStatus {
        command: String,
        module: PathBuf,
        status: ExitStatus,
        stderr: String,
    },
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("Failed to serialize export database: {0}")]
    Json(#[from] serde_json::Error),
}
