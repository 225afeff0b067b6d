//! Navigation tree over resolved modules.

use std::collections::BTreeSet;

use docgen_resolve::Identifier;
use serde::Serialize;

/// Kind of a navigation tree node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Project,
    Dir,
    File,
}

/// Navigation tree node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SiteNode {
    pub kind: NodeKind,
    /// Last path segment, or the project name.
    pub name: String,
    /// Path relative to the site root, without the project. Files end in
    /// `.html`.
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SiteNode>,
}

/// Build the navigation tree: projects, then directories, then modules.
///
/// At every level directories come before files and both are sorted by code
/// point.
pub fn build_site_tree<'a>(modules: impl IntoIterator<Item = &'a Identifier>) -> Vec<SiteNode> {
    let paths: Vec<Vec<&str>> = modules
        .into_iter()
        .map(|id| {
            std::iter::once(id.project())
                .chain(id.path_segments().iter().map(String::as_str))
                .collect()
        })
        .collect();
    let refs: Vec<&[&str]> = paths.iter().map(Vec::as_slice).collect();
    tree_level(&refs, &[])
}

fn tree_level(paths: &[&[&str]], prefix: &[&str]) -> Vec<SiteNode> {
    let mut dirs = BTreeSet::new();
    let mut files = BTreeSet::new();
    for path in paths {
        match path {
            [name] => {
                files.insert(*name);
            }
            [name, ..] => {
                dirs.insert(*name);
            }
            [] => {}
        }
    }

    let mut nodes = Vec::with_capacity(dirs.len() + files.len());
    for dir in dirs {
        let children: Vec<&[&str]> = paths
            .iter()
            .filter(|p| p.len() > 1 && p[0] == dir)
            .map(|p| &p[1..])
            .collect();
        let full = [prefix, &[dir]].concat();
        nodes.push(SiteNode {
            kind: if prefix.is_empty() {
                NodeKind::Project
            } else {
                NodeKind::Dir
            },
            name: dir.to_owned(),
            path: full[1..].join("/"),
            children: tree_level(&children, &full),
        });
    }
    for file in files {
        let full = [prefix, &[file]].concat();
        nodes.push(SiteNode {
            kind: NodeKind::File,
            name: file.to_owned(),
            path: format!("{}.html", full[1..].join("/")),
            children: Vec::new(),
        });
    }
    nodes
}
