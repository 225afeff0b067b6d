use std::path::PathBuf;

/// Error returned while loading a bibliography.
#[derive(Debug, thiserror::Error)]
pub enum BibError {
    /// The database is not valid BibTeX.
    #[error("BibTeX syntax error on line {line}: {message}")]
    Syntax { line: usize, message: String },
    /// The `.bib` file could not be read.
    #[error("Failed to read bibliography {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
