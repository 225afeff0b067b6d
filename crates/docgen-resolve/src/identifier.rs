//! Resolved module identity.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The `(project, module path)` identity of a source file.
///
/// Cheap to clone: all clones share one allocation. Equality, hashing and
/// ordering consider only the project and path segments, never the source
/// path.
#[derive(Clone)]
pub struct Identifier {
    inner: Arc<Inner>,
}

struct Inner {
    project: String,
    path_segments: Vec<String>,
    source_path: PathBuf,
}

impl Identifier {
    /// Create an identifier.
    pub fn new(
        project: impl Into<String>,
        path_segments: Vec<String>,
        source_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                project: project.into(),
                path_segments,
                source_path: source_path.into(),
            }),
        }
    }

    /// Owning project name.
    pub fn project(&self) -> &str {
        &self.inner.project
    }

    /// Module path within the project.
    pub fn path_segments(&self) -> &[String] {
        &self.inner.path_segments
    }

    /// Absolute path of the source file this identifier was resolved from.
    pub fn source_path(&self) -> &Path {
        &self.inner.source_path
    }

    /// Module name, e.g. `algebra.group`.
    pub fn dotted_name(&self) -> String {
        self.inner.path_segments.join(".")
    }

    /// Page URL relative to the site root, e.g. `algebra/group.html`.
    pub fn url(&self) -> String {
        format!("{}.html", self.inner.path_segments.join("/"))
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.project() == other.project() && self.path_segments() == other.path_segments()
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.project().hash(state);
        self.path_segments().hash(state);
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.project()
            .cmp(other.project())
            .then_with(|| self.path_segments().cmp(other.path_segments()))
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identifier")
            .field("project", &self.inner.project)
            .field("path_segments", &self.inner.path_segments)
            .field("source_path", &self.inner.source_path)
            .finish()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.project(), self.dotted_name())
    }
}
