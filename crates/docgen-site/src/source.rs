//! Links to module sources in upstream repositories.

use std::collections::BTreeMap;
use std::fmt::Write;

use docgen_resolve::Identifier;

/// Source URL root per project.
#[derive(Clone, Debug, Default)]
pub struct SourceLinks {
    roots: BTreeMap<String, String>,
}

impl SourceLinks {
    /// Roots such as `https://github.com/org/repo/blob/<rev>/src/`. A missing
    /// trailing slash is added.
    pub fn new(roots: impl IntoIterator<Item = (String, String)>) -> Self {
        let roots = roots
            .into_iter()
            .map(|(project, mut root)| {
                if !root.ends_with('/') {
                    root.push('/');
                }
                (project, root)
            })
            .collect();
        Self { roots }
    }

    /// Source URL of a module, optionally anchored at a line.
    ///
    /// Empty for projects without a configured root; templates treat an
    /// empty link as a link to the current page.
    pub fn library_link(&self, id: &Identifier, line: Option<u32>) -> String {
        let Some(root) = self.roots.get(id.project()) else {
            return String::new();
        };
        let mut url = format!("{root}{}.lean", id.path_segments().join("/"));
        if let Some(line) = line {
            let _ = write!(url, "#L{line}");
        }
        url
    }
}
