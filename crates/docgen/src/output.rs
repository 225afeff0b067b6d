//! Build progress lines on stderr.

use std::path::Path;

use console::{Term, style};
use docgen_site::BuildSummary;

use crate::error::CliError;

/// Reports a build to the terminal. Write failures are ignored.
pub(crate) struct Output {
    term: Term,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    /// Where the build reads from and writes to.
    pub(crate) fn plan(&self, export: &Path, output_dir: &Path) {
        let _ = self.term.write_line(&format!("Export: {}", export.display()));
        let _ = self.term.write_line(&format!("Output: {}", output_dir.display()));
    }

    pub(crate) fn built(&self, summary: &BuildSummary, output_dir: &Path) {
        let line = summary_line(summary, output_dir);
        let _ = self.term.write_line(&style(line).green().to_string());
    }

    pub(crate) fn failed(&self, err: &CliError) {
        let _ = self.term.write_line(&style(format!("Error: {err}")).red().to_string());
    }
}

fn summary_line(summary: &BuildSummary, output_dir: &Path) -> String {
    format!(
        "Built {} pages, {} redirects and {} declaration entries in {}",
        summary.pages,
        summary.redirects,
        summary.declarations,
        output_dir.display()
    )
}
