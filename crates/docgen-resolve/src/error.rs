use std::path::PathBuf;

/// Error returned by identifier resolution and corpus lookups.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A source file is not under any of the configured roots.
    #[error("Cannot resolve {} against any root. Tried:\n{tried}", file.display())]
    NoMatchingRoot {
        /// Raw path that failed to resolve.
        file: PathBuf,
        /// Candidate roots, one ` - path` line each.
        tried: String,
    },
    /// A package manifest could not be read.
    #[error("Failed to read manifest {}: {source}", path.display())]
    ManifestIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A package manifest is not valid TOML or lacks a package name.
    #[error("Invalid manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// A name is in the name-location table but its declaration is missing.
    #[error("No declaration for {name} in {module}")]
    MissingDeclaration {
        /// Name that was looked up.
        name: String,
        /// Module the name table points to.
        module: String,
    },
}
