//! Module import graph.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::process::Command;

use docgen_resolve::{Corpus, Identifier};
use rayon::prelude::*;

use crate::error::BuildError;

/// Lists the direct imports of a module.
pub trait DependencyQuery: Send + Sync {
    /// Source paths of the modules `module` imports. Extensions are ignored.
    fn dependencies(&self, module: &Identifier) -> Result<Vec<PathBuf>, BuildError>;
}

/// Runs an external command with the module's source path appended and reads
/// whitespace-separated paths from its standard output.
#[derive(Clone, Debug)]
pub struct CommandDependencyQuery {
    program: String,
    args: Vec<String>,
}

impl CommandDependencyQuery {
    /// Query running `command`, or `None` if it is empty.
    pub fn new(command: impl IntoIterator<Item = String>) -> Option<Self> {
        let mut command = command.into_iter();
        let program = command.next()?;
        Some(Self {
            program,
            args: command.collect(),
        })
    }

    fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl DependencyQuery for CommandDependencyQuery {
    fn dependencies(&self, module: &Identifier) -> Result<Vec<PathBuf>, BuildError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(module.source_path())
            .output()
            .map_err(|source| BuildError::DependencyCommand {
                command: self.display(),
                module: module.source_path().to_owned(),
                source,
            })?;
        if !output.status.success() {
            return Err(BuildError::DependencyStatus {
                command: self.display(),
                module: module.source_path().to_owned(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .split_whitespace()
            .map(PathBuf::from)
            .collect())
    }
}

/// Query that reports no imports, giving an edgeless graph.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDependencies;

impl DependencyQuery for NoDependencies {
    fn dependencies(&self, _module: &Identifier) -> Result<Vec<PathBuf>, BuildError> {
        Ok(Vec::new())
    }
}

/// Directed graph over modules. An edge `a -> b` means `a` imports `b`.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    imports: BTreeMap<Identifier, BTreeSet<Identifier>>,
    imported_by: BTreeMap<Identifier, BTreeSet<Identifier>>,
}

impl DependencyGraph {
    fn add_node(&mut self, id: &Identifier) {
        self.imports.entry(id.clone()).or_default();
    }

    fn add_edge(&mut self, from: &Identifier, to: &Identifier) {
        self.imports
            .entry(from.clone())
            .or_default()
            .insert(to.clone());
        self.imported_by
            .entry(to.clone())
            .or_default()
            .insert(from.clone());
    }

    /// All modules, in order.
    pub fn nodes(&self) -> impl Iterator<Item = &Identifier> {
        self.imports.keys()
    }

    pub fn node_count(&self) -> usize {
        self.imports.len()
    }

    pub fn edge_count(&self) -> usize {
        self.imports.values().map(BTreeSet::len).sum()
    }

    /// Modules imported by `id`.
    pub fn imports(&self, id: &Identifier) -> impl Iterator<Item = &Identifier> {
        self.imports.get(id).into_iter().flatten()
    }

    /// Modules importing `id`.
    pub fn imported_by(&self, id: &Identifier) -> impl Iterator<Item = &Identifier> {
        self.imported_by.get(id).into_iter().flatten()
    }

    pub fn has_edge(&self, from: &Identifier, to: &Identifier) -> bool {
        self.imports.get(from).is_some_and(|deps| deps.contains(to))
    }
}

/// Build the import graph of every module in `corpus`.
///
/// Queries run in parallel. Each returned path gets a `.lean` extension and
/// is matched against the raw source paths of the corpus; unmatched paths are
/// logged and dropped. A failing query aborts the build.
pub fn build_dependency_graph(
    corpus: &Corpus,
    query: &dyn DependencyQuery,
) -> Result<DependencyGraph, BuildError> {
    let modules: Vec<&Identifier> = corpus.modules().collect();
    let results: Vec<_> = modules
        .par_iter()
        .map(|id| query.dependencies(id))
        .collect();

    let mut graph = DependencyGraph::default();
    let mut total = 0usize;
    let mut resolved = 0usize;
    for (id, deps) in modules.into_iter().zip(results) {
        graph.add_node(id);
        for dep in deps? {
            total += 1;
            let path = dep.with_extension("lean");
            match corpus.module_by_path(&path.to_string_lossy()) {
                Some(target) => {
                    graph.add_edge(id, target);
                    resolved += 1;
                }
                None => tracing::warn!(path = %dep.display(), "Dependency path not recognized"),
            }
        }
    }
    tracing::info!(resolved, total, "Processed {resolved} / {total} dependency links");
    Ok(graph)
}
