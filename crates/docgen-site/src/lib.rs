//! Site structure and static output for docgen.
//!
//! This crate provides:
//! - [`build_site_tree`]: the navigation tree of projects, directories and
//!   module files
//! - [`build_dependency_graph`]: module import edges from an injected
//!   [`DependencyQuery`]
//! - [`SiteBuilder`]: writes module pages, tactic lists, notes, references,
//!   standalone markdown pages, redirects, the sitemap and the export
//!   database
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::{Path, PathBuf};
//! use docgen_bib::Bibliography;
//! use docgen_export::Export;
//! use docgen_resolve::{Corpus, RootResolver};
//! use docgen_site::{
//!     AssetMode, BuildConfig, NoDependencies, SiteBuilder, SiteInputs, SourceLinks,
//!     build_dependency_graph,
//! };
//!
//! let export = Export::load(Path::new("export.json"))?;
//! let resolver = RootResolver::new([PathBuf::from("_target/deps/mathlib/src")])?;
//! let corpus = Corpus::separate(export.decls, export.mod_docs, &resolver, ".")?;
//! let graph = build_dependency_graph(&corpus, &NoDependencies)?;
//!
//! let builder = SiteBuilder::new(BuildConfig {
//!     output_dir: PathBuf::from("html"),
//!     site_root: "/".to_owned(),
//!     test_project: "docgen_test".to_owned(),
//!     sources: SourceLinks::default(),
//!     extra_docs: Vec::new(),
//!     data_files: Vec::new(),
//!     assets: AssetMode::Embedded,
//! });
//! let summary = builder.build(SiteInputs {
//!     corpus,
//!     graph,
//!     notes: export.notes,
//!     instances: export.instances,
//!     tactic_docs: export.tactic_docs,
//!     bibliography: Bibliography::load(Path::new("docs/references.bib"))?,
//! })?;
//! println!("{} pages", summary.pages);
//! # Ok(())
//! # }
//! ```

mod builder;
mod error;
mod export_db;
mod graph;
mod pages;
mod source;
mod template;
mod tree;

pub use builder::{
    ASSETS_DIR, AssetMode, BuildConfig, BuildSummary, ExtraDoc, SiteBuilder, SiteInputs,
};
pub use error::BuildError;
pub use export_db::{ExportDbEntry, build_export_db, write_export_db};
pub use graph::{
    CommandDependencyQuery, DependencyGraph, DependencyQuery, NoDependencies,
    build_dependency_graph,
};
pub use pages::{PageContent, PageRenderer, category_title, extra_doc_page, not_found_page};
pub use source::SourceLinks;
pub use template::{HEADER_PAGES, PageData, render_page};
pub use tree::{NodeKind, SiteNode, build_site_tree};
