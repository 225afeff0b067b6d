//! CLI error types.

use docgen_bib::BibError;
use docgen_config::ConfigError;
use docgen_export::ExportError;
use docgen_resolve::ResolveError;
use docgen_site::BuildError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Export(#[from] ExportError),

    #[error("{0}")]
    Resolve(#[from] ResolveError),

    #[error("{0}")]
    Bibliography(#[from] BibError),

    #[error("{0}")]
    Build(#[from] BuildError),
}
