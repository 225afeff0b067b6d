//! Mapping raw source paths to identifiers.

use std::fmt::Write;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use crate::ResolveError;
use crate::identifier::Identifier;

/// Project name for the prover's bundled library.
pub const CORE_PROJECT: &str = "core";
/// Project name used when a root has no recognizable manifest.
pub const UNKNOWN_PROJECT: &str = "<unknown>";

/// Package manifest file expected next to a project root.
const MANIFEST_FILENAME: &str = "leanpkg.toml";

/// Relative suffixes identifying the bundled core library.
const CORE_SUFFIXES: [&str; 2] = ["bin/../lib/lean/library", "bin/../library"];

/// A candidate root directory and the project that owns it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectRoot {
    /// Directory files are resolved against.
    pub path: PathBuf,
    /// Owning project name.
    pub project: String,
}

/// Resolves raw export filenames against an ordered list of project roots.
///
/// Roots are tried in order and the first prefix match wins, so deeper roots
/// must come before their ancestors. Use [`RootResolver::sorted_by_depth`] when
/// the supplied order cannot be trusted.
#[derive(Clone, Debug, Default)]
pub struct RootResolver {
    roots: Vec<ProjectRoot>,
}

#[derive(Deserialize)]
struct Manifest {
    package: ManifestPackage,
}

#[derive(Deserialize)]
struct ManifestPackage {
    name: String,
}

impl RootResolver {
    /// Build a resolver from root directories, detecting each root's project.
    ///
    /// Roots are canonicalized when they exist on disk; project names are
    /// detected from the paths as given.
    pub fn new<I>(roots: I) -> Result<Self, ResolveError>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let roots = roots
            .into_iter()
            .map(|path| {
                let project = project_name_for_root(&path)?;
                let path = std::fs::canonicalize(&path).unwrap_or(path);
                Ok(ProjectRoot { path, project })
            })
            .collect::<Result<Vec<_>, ResolveError>>()?;
        Ok(Self::from_roots(roots))
    }

    /// Build a resolver from roots whose projects are already known.
    pub fn from_roots(roots: Vec<ProjectRoot>) -> Self {
        for root in &roots {
            tracing::debug!(path = %root.path.display(), project = %root.project, "Project root");
        }
        Self { roots }
    }

    /// Like [`RootResolver::new`], but with roots sorted deepest first.
    ///
    /// The sort is stable, so roots of equal depth keep their supplied order.
    pub fn sorted_by_depth<I>(roots: I) -> Result<Self, ResolveError>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut resolver = Self::new(roots)?;
        resolver
            .roots
            .sort_by_key(|root| std::cmp::Reverse(root.path.components().count()));
        Ok(resolver)
    }

    /// Candidate roots in the order they are tried.
    pub fn roots(&self) -> &[ProjectRoot] {
        &self.roots
    }

    /// Resolve a raw export filename to its identifier.
    ///
    /// The path relative to the first matching root, without its extension,
    /// becomes the identifier's path segments.
    pub fn resolve(&self, filename: &str) -> Result<Identifier, ResolveError> {
        let file = Path::new(filename);
        for root in &self.roots {
            let Ok(relative) = file.strip_prefix(&root.path) else {
                continue;
            };
            let segments = relative
                .with_extension("")
                .components()
                .filter_map(|c| match c {
                    Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect();
            return Ok(Identifier::new(root.project.clone(), segments, file));
        }

        let mut tried = String::new();
        for root in &self.roots {
            let _ = writeln!(tried, " - {}", root.path.display());
        }
        Err(ResolveError::NoMatchingRoot {
            file: file.to_path_buf(),
            tried,
        })
    }
}

/// Detect the project owning a root directory.
///
/// The bundled core library is recognized by its fixed location relative to
/// the prover binary. Otherwise the package name is read from the manifest in
/// the root's parent directory.
pub fn project_name_for_root(root: &Path) -> Result<String, ResolveError> {
    if CORE_SUFFIXES.iter().any(|suffix| root.ends_with(suffix)) {
        return Ok(CORE_PROJECT.to_owned());
    }

    let manifest_path = root.join("..").join(MANIFEST_FILENAME);
    let content = match std::fs::read_to_string(&manifest_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(UNKNOWN_PROJECT.to_owned());
        }
        Err(source) => {
            return Err(ResolveError::ManifestIo {
                path: manifest_path,
                source,
            });
        }
    };
    let manifest: Manifest =
        toml::from_str(&content).map_err(|source| ResolveError::Manifest {
            path: manifest_path,
            source,
        })?;
    Ok(manifest.package.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn resolver(roots: &[(&str, &str)]) -> RootResolver {
        RootResolver::from_roots(
            roots
                .iter()
                .map(|&(path, project)| ProjectRoot {
                    path: PathBuf::from(path),
                    project: project.to_owned(),
                })
                .collect(),
        )
    }

    #[test]
    fn test_resolve_strips_root_and_extension() {
        let r = resolver(&[("/deps/mathlib/src", "mathlib")]);
        let id = r.resolve("/deps/mathlib/src/algebra/group.lean").unwrap();
        assert_eq!(id.project(), "mathlib");
        assert_eq!(id.path_segments(), ["algebra", "group"]);
        assert_eq!(id.url(), "algebra/group.html");
        assert_eq!(
            id.source_path(),
            Path::new("/deps/mathlib/src/algebra/group.lean")
        );
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let r = resolver(&[("/deps/mathlib/src", "mathlib")]);
        let a = r.resolve("/deps/mathlib/src/data/nat/basic.lean").unwrap();
        let b = r.resolve("/deps/mathlib/src/data/nat/basic.lean").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.url(), "data/nat/basic.html");
    }

    #[test]
    fn test_resolve_first_match_wins() {
        // A shallow root listed first captures files under deeper roots.
        let r = resolver(&[("/deps", "outer"), ("/deps/mathlib/src", "mathlib")]);
        let id = r.resolve("/deps/mathlib/src/logic/basic.lean").unwrap();
        assert_eq!(id.project(), "outer");
        assert_eq!(id.path_segments(), ["mathlib", "src", "logic", "basic"]);
    }

    #[test]
    fn test_resolve_matches_whole_components_only() {
        let r = resolver(&[("/deps/math", "math")]);
        assert!(r.resolve("/deps/mathlib/src/a.lean").is_err());
    }

    #[test]
    fn test_resolve_no_match_lists_all_roots() {
        let r = resolver(&[("/a/src", "a"), ("/b/src", "b")]);
        let err = r.resolve("/c/src/x.lean").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("/c/src/x.lean"));
        assert!(message.contains(" - /a/src"));
        assert!(message.contains(" - /b/src"));
    }

    #[test]
    fn test_project_name_core_suffixes() {
        assert_eq!(
            project_name_for_root(Path::new("/opt/lean/bin/../lib/lean/library")).unwrap(),
            CORE_PROJECT
        );
        assert_eq!(
            project_name_for_root(Path::new("/opt/lean/bin/../library")).unwrap(),
            CORE_PROJECT
        );
    }

    #[test]
    fn test_project_name_from_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir(&src).unwrap();
        fs::write(
            dir.path().join(MANIFEST_FILENAME),
            "[package]\nname = \"mathlib\"\nversion = \"0.1\"\n",
        )
        .unwrap();
        assert_eq!(project_name_for_root(&src).unwrap(), "mathlib");
    }

    #[test]
    fn test_project_name_unknown_without_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir(&src).unwrap();
        assert_eq!(project_name_for_root(&src).unwrap(), UNKNOWN_PROJECT);
    }

    #[test]
    fn test_project_name_malformed_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir(&src).unwrap();
        fs::write(dir.path().join(MANIFEST_FILENAME), "[package]\n").unwrap();
        assert!(matches!(
            project_name_for_root(&src),
            Err(ResolveError::Manifest { .. })
        ));
    }

    #[test]
    fn test_new_resolves_against_canonical_root() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir(&src).unwrap();
        fs::write(dir.path().join(MANIFEST_FILENAME), "[package]\nname = \"demo\"\n").unwrap();

        let r = RootResolver::new([src.clone()]).unwrap();
        let canonical = fs::canonicalize(&src).unwrap();
        let file = canonical.join("topology/basic.lean");
        let id = r.resolve(&file.to_string_lossy()).unwrap();
        assert_eq!(id.project(), "demo");
        assert_eq!(id.dotted_name(), "topology.basic");
    }

    #[test]
    fn test_sorted_by_depth_puts_deeper_roots_first() {
        let dir = tempfile::tempdir().unwrap();
        let outer = dir.path().to_path_buf();
        let inner = dir.path().join("pkg").join("src");
        fs::create_dir_all(&inner).unwrap();

        let r = RootResolver::sorted_by_depth([outer, inner]).unwrap();
        let inner = fs::canonicalize(dir.path().join("pkg/src")).unwrap();
        assert_eq!(r.roots()[0].path, inner);
        let id = r
            .resolve(&inner.join("a/b.lean").to_string_lossy())
            .unwrap();
        assert_eq!(id.path_segments(), ["a", "b"]);
    }
}
