//! Writes the complete static site to an output directory.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
#[cfg(unix)]
use std::os::unix::fs::symlink as symlink_file;
#[cfg(windows)]
use std::os::windows::fs::symlink_file;
use std::path::{Path, PathBuf};

use docgen_bib::Bibliography;
use docgen_export::{Note, TacticCategory, TacticDoc};
use docgen_links::{NoteRegistry, Origin, RewriteContext};
use docgen_renderer::escape_html;
use docgen_resolve::Corpus;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::error::BuildError;
use crate::export_db::{build_export_db, write_export_db};
use crate::graph::DependencyGraph;
use crate::pages::{PageContent, PageRenderer, category_title, extra_doc_page, not_found_page};
use crate::source::SourceLinks;
use crate::template::{PageData, render_page};
use crate::tree::{SiteNode, build_site_tree};

/// Characters kept unescaped in redirect targets.
const URL_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// Static files every page references, by output name.
const ASSETS: [(&str, &str); 2] = [
    ("style.css", include_str!("../assets/style.css")),
    ("nav.js", include_str!("../assets/nav.js")),
];

/// Source directory of the embedded assets, for symlinked development builds.
pub const ASSETS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets");

/// Pages listed in the sitemap besides module pages.
const SITEMAP_PAGES: [&str; 7] = [
    "index",
    "tactics",
    "commands",
    "hole_commands",
    "attributes",
    "notes",
    "references",
];

/// Output settings for one build.
#[derive(Clone, Debug)]
pub struct BuildConfig {
    pub output_dir: PathBuf,
    /// URL prefix ending in `/`.
    pub site_root: String,
    /// Project whose modules leave no backreferences.
    pub test_project: String,
    pub sources: SourceLinks,
    /// Standalone markdown pages, written after the generated ones.
    pub extra_docs: Vec<ExtraDoc>,
    /// Files copied unchanged into the output root under their file name.
    pub data_files: Vec<PathBuf>,
    pub assets: AssetMode,
}

/// A markdown file published as `{name}.html`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtraDoc {
    pub name: String,
    /// Page title.
    pub title: String,
    pub source: PathBuf,
}

impl ExtraDoc {
    fn file(&self) -> String {
        format!("{}.html", self.name)
    }
}

/// How `style.css` and `nav.js` reach the output directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AssetMode {
    /// Write the copies compiled into the binary.
    #[default]
    Embedded,
    /// Symlink to the files of the same name in this directory, so edits
    /// show up without a rebuild.
    Symlink(PathBuf),
}

/// Everything the site is generated from.
#[derive(Debug)]
pub struct SiteInputs {
    pub corpus: Corpus,
    pub graph: DependencyGraph,
    pub notes: Vec<Note>,
    pub instances: BTreeMap<String, Vec<String>>,
    pub tactic_docs: Vec<TacticDoc>,
    pub bibliography: Bibliography,
}

/// Counts reported after a build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// HTML pages, excluding redirects.
    pub pages: usize,
    pub redirects: usize,
    /// Entries in the export database.
    pub declarations: usize,
}

pub struct SiteBuilder {
    config: BuildConfig,
}

impl SiteBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Render and write every output file.
    ///
    /// Module pages are rewritten in identifier order, then tactic pages,
    /// then note bodies, so backreference lists come out in a stable order.
    pub fn build(&self, inputs: SiteInputs) -> Result<BuildSummary, BuildError> {
        let SiteInputs {
            corpus,
            graph,
            notes,
            instances,
            tactic_docs,
            bibliography,
        } = inputs;
        let out = &self.config.output_dir;
        let root = self.config.site_root.as_str();
        create_dir(out)?;

        let tree = build_site_tree(corpus.modules());
        let renderer = PageRenderer::new(&corpus, &graph, &instances, &self.config.sources, root);
        let mut ctx = RewriteContext::new(NoteRegistry::new(notes), bibliography);
        let mut summary = BuildSummary::default();

        let names: Vec<&str> = corpus.names().names().collect();
        write_file(&out.join("decl.txt"), &names.join("\n"))?;

        for id in corpus.modules() {
            ctx.set_origin(Origin::module(id, &self.config.test_project));
            let page = renderer.module_page(id, &mut ctx);
            self.write_page(&tree, &id.url(), &id.dotted_name(), page)?;
            summary.pages += 1;
        }
        tracing::info!(modules = summary.pages, "Wrote module pages");

        for category in TacticCategory::ALL {
            let file = format!("{}.html", category.page_name());
            let title = category_title(category);
            let entries: Vec<&TacticDoc> =
                tactic_docs.iter().filter(|t| t.category == category).collect();
            ctx.set_origin(Origin::page(file.as_str(), title));
            let page = renderer.tactic_page(category, &entries, &mut ctx);
            self.write_page(&tree, &file, title, page)?;
            summary.pages += 1;
        }

        ctx.set_origin(Origin::page("notes.html", "Library notes"));
        let bodies = renderer.note_bodies(&mut ctx);
        let (notes, bibliography) = ctx.into_parts();

        let fixed = [
            ("notes.html", "Library notes", renderer.notes_page(&notes, &bodies)),
            ("references.html", "References", renderer.references_page(&bibliography)),
            ("index.html", "mathlib documentation", renderer.index_page(&tree)),
            ("404.html", "Page not found", not_found_page()),
        ];
        for (file, title, page) in fixed {
            self.write_page(&tree, file, title, page)?;
            summary.pages += 1;
        }

        for doc in &self.config.extra_docs {
            let markdown = fs::read_to_string(&doc.source).map_err(|source| BuildError::Read {
                path: doc.source.clone(),
                source,
            })?;
            self.write_page(&tree, &doc.file(), &doc.title, extra_doc_page(&markdown))?;
            summary.pages += 1;
        }

        summary.redirects = self.write_redirects(&corpus)?;

        let db = build_export_db(&corpus, &self.config.sources, root, |decl| {
            renderer.decl_header(decl)
        });
        summary.declarations = db.len();
        write_export_db(&out.join("export_db.json.gz"), &db)?;

        let sitemap: Vec<String> = corpus
            .modules()
            .map(|id| format!("{root}{}", id.url()))
            .chain(SITEMAP_PAGES.iter().map(|page| format!("{root}{page}.html")))
            .chain(self.config.extra_docs.iter().map(|doc| format!("{root}{}", doc.file())))
            .collect();
        write_file(&out.join("sitemap.txt"), &(sitemap.join("\n") + "\n"))?;

        self.copy_data_files()?;
        self.write_assets()?;

        tracing::info!(
            pages = summary.pages,
            redirects = summary.redirects,
            declarations = summary.declarations,
            output = %out.display(),
            "Site written"
        );
        Ok(summary)
    }

    fn write_page(
        &self,
        tree: &[SiteNode],
        path: &str,
        title: &str,
        page: PageContent,
    ) -> Result<(), BuildError> {
        let PageContent {
            html,
            toc,
            description,
        } = page;
        let data = PageData {
            title: title.to_owned(),
            description,
            active_path: path.to_owned(),
            html_content: html,
            toc,
            navigation: tree,
            site_root: &self.config.site_root,
        };
        write_file(&self.config.output_dir.join(path), &render_page(&data))
    }

    /// `find/{name}/` redirects to the docs anchor, `find/{name}/src/` to
    /// the source line. Returns the number of names redirected.
    fn write_redirects(&self, corpus: &Corpus) -> Result<usize, BuildError> {
        let root = &self.config.site_root;
        let find = self.config.output_dir.join("find");
        let mut count = 0;
        for (name, owner) in corpus.names().iter() {
            if cfg!(windows) && name.starts_with("con.") {
                continue;
            }
            let dir = find.join(name);
            let docs = format!(
                "{root}{}#{}",
                owner.url(),
                utf8_percent_encode(name, URL_SAFE)
            );
            write_file(&dir.join("index.html"), &redirect(&docs))?;

            let line = corpus.find_declaration(name)?.map(|decl| decl.line);
            let source = self.config.sources.library_link(owner, line);
            write_file(&dir.join("src").join("index.html"), &redirect(&source))?;
            count += 1;
        }
        Ok(count)
    }

    fn copy_data_files(&self) -> Result<(), BuildError> {
        for path in &self.config.data_files {
            let Some(name) = path.file_name() else {
                tracing::warn!(path = %path.display(), "Skipping data file without a file name");
                continue;
            };
            let dest = self.config.output_dir.join(name);
            fs::copy(path, &dest).map_err(|source| BuildError::Copy {
                from: path.clone(),
                to: dest,
                source,
            })?;
        }
        Ok(())
    }

    fn write_assets(&self) -> Result<(), BuildError> {
        for (name, contents) in ASSETS {
            let dest = self.config.output_dir.join(name);
            match &self.config.assets {
                AssetMode::Embedded => write_file(&dest, contents)?,
                AssetMode::Symlink(dir) => symlink_asset(&dir.join(name), &dest)?,
            }
        }
        Ok(())
    }
}

/// Replace `link` with a symlink to the absolute path of `target`.
fn symlink_asset(target: &Path, link: &Path) -> Result<(), BuildError> {
    let target = fs::canonicalize(target).map_err(|source| BuildError::Read {
        path: target.to_owned(),
        source,
    })?;
    let write_error = |source| BuildError::Write {
        path: link.to_owned(),
        source,
    };
    if let Err(err) = fs::remove_file(link)
        && err.kind() != ErrorKind::NotFound
    {
        return Err(write_error(err));
    }
    symlink_file(&target, link).map_err(write_error)
}

fn redirect(url: &str) -> String {
    format!(
        r#"<meta http-equiv="refresh" content="0;url={}">"#,
        escape_html(url)
    )
}

fn create_dir(path: &Path) -> Result<(), BuildError> {
    fs::create_dir_all(path).map_err(|source| BuildError::Write {
        path: path.to_owned(),
        source,
    })
}

fn write_file(path: &Path, contents: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        create_dir(parent)?;
    }
    fs::write(path, contents).map_err(|source| BuildError::Write {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use docgen_export::Export;
    use docgen_resolve::{ProjectRoot, RootResolver};
    use flate2::read::GzDecoder;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::graph::{DependencyQuery, build_dependency_graph};

    const BIB: &str = "@article{Ser79, author = {Jean-Pierre Serre}, title = {Local Fields}, \
        journal = {GTM}, year = 1979}";

    fn export() -> Export {
        let decl = |name: &str, file: &str, line: u32, doc: &str| {
            json!({
                "name": name,
                "filename": file,
                "kind": "def",
                "is_meta": false,
                "line": line,
                "doc_string": doc,
                "args": [],
                "type": "Type",
                "attributes": [],
                "equations": [],
                "structure_fields": [],
                "constructors": []
            })
        };
        let value = json!({
            "decls": [
                decl("group", "/m/src/algebra/group.lean", 10, "See Note [axioms] and [Ser79]."),
                decl("monoid", "/m/src/algebra/monoid.lean", 3, "Used by `group`."),
                decl("test_decl", "/t/src/test/basic.lean", 1, "Note [axioms]"),
            ],
            "mod_docs": {
                "/m/src/algebra/group.lean": [{"doc": "# Groups\n\n## Main results", "line": 1}]
            },
            "notes": [["axioms", "The axioms."]],
            "instances": {},
            "tactic_docs": [{
                "name": "simp",
                "category": "tactic",
                "decl_names": ["group"],
                "tags": ["simplification"],
                "description": "Simplify. See Note [axioms].",
                "import": ""
            }]
        });
        Export::from_json(&value.to_string()).unwrap()
    }

    struct GroupImportsMonoid;

    impl DependencyQuery for GroupImportsMonoid {
        fn dependencies(
            &self,
            module: &docgen_resolve::Identifier,
        ) -> Result<Vec<PathBuf>, BuildError> {
            Ok(if module.dotted_name() == "algebra.group" {
                vec![PathBuf::from("/m/src/algebra/monoid.olean")]
            } else {
                Vec::new()
            })
        }
    }

    fn build(out: &Path) -> BuildSummary {
        build_with(out, Vec::new(), Vec::new(), AssetMode::Embedded)
    }

    fn build_with(
        out: &Path,
        extra_docs: Vec<ExtraDoc>,
        data_files: Vec<PathBuf>,
        assets: AssetMode,
    ) -> BuildSummary {
        let export = export();
        let resolver = RootResolver::from_roots(vec![
            ProjectRoot {
                path: PathBuf::from("/m/src"),
                project: "mathlib".to_owned(),
            },
            ProjectRoot {
                path: PathBuf::from("/t/src"),
                project: "docgen_test".to_owned(),
            },
        ]);
        let corpus = Corpus::separate(export.decls, export.mod_docs, &resolver, ".").unwrap();
        let graph = build_dependency_graph(&corpus, &GroupImportsMonoid).unwrap();
        let inputs = SiteInputs {
            corpus,
            graph,
            notes: export.notes,
            instances: export.instances,
            tactic_docs: export.tactic_docs,
            bibliography: Bibliography::parse(BIB).unwrap(),
        };
        let builder = SiteBuilder::new(BuildConfig {
            output_dir: out.to_owned(),
            site_root: "/docs/".to_owned(),
            test_project: "docgen_test".to_owned(),
            sources: SourceLinks::new([(
                "mathlib".to_owned(),
                "https://example.org/mathlib/src".to_owned(),
            )]),
            extra_docs,
            data_files,
            assets,
        });
        builder.build(inputs).unwrap()
    }

    fn read(out: &Path, path: &str) -> String {
        fs::read_to_string(out.join(path)).unwrap()
    }

    #[test]
    fn test_build_writes_every_output() {
        let dir = tempfile::tempdir().unwrap();
        let summary = build(dir.path());

        assert_eq!(
            summary,
            BuildSummary {
                pages: 11,
                redirects: 3,
                declarations: 3,
            }
        );
        for file in [
            "algebra/group.html",
            "algebra/monoid.html",
            "test/basic.html",
            "tactics.html",
            "commands.html",
            "hole_commands.html",
            "attributes.html",
            "notes.html",
            "references.html",
            "index.html",
            "404.html",
            "style.css",
            "nav.js",
        ] {
            assert!(dir.path().join(file).is_file(), "missing {file}");
        }
        assert_eq!(read(dir.path(), "decl.txt"), "group\nmonoid\ntest_decl");
    }

    #[test]
    fn test_module_page_links_imports_and_notes() {
        let dir = tempfile::tempdir().unwrap();
        build(dir.path());
        let group = read(dir.path(), "algebra/group.html");

        assert!(group.contains("<title>algebra.group</title>"));
        assert!(group.contains(r#"<li><a href="/docs/algebra/monoid.html">algebra.monoid</a></li>"#));
        assert!(group.contains(r##"<a href="/docs/notes.html#axioms" id="backref_0">"##));
        assert!(group.contains(r##"<a href="/docs/references.html#Ser79" id="backref_1">[Ser79]</a>"##));
        assert!(group.contains(r#"<a href="https://example.org/mathlib/src/algebra/group.lean#L10">source</a>"#));

        let monoid = read(dir.path(), "algebra/monoid.html");
        assert!(monoid.contains(r#"<li><a href="/docs/algebra/group.html">algebra.group</a></li>"#));
        assert!(monoid.contains(r##"<a href="/docs/algebra/group.html#group">group</a>"##));
    }

    #[test]
    fn test_backrefs_skip_test_project() {
        let dir = tempfile::tempdir().unwrap();
        build(dir.path());
        let notes = read(dir.path(), "notes.html");

        assert!(notes.contains(r##"<a href="/docs/algebra/group.html#backref_0">algebra.group</a>"##));
        assert!(notes.contains(r##"<a href="/docs/tactics.html#backref_0">Tactics</a>"##));
        assert!(!notes.contains("test/basic.html#backref"));

        let references = read(dir.path(), "references.html");
        assert!(references.contains(r#"<dt id="Ser79">[Ser79]</dt>"#));
        assert!(references.contains(r##"<a href="/docs/algebra/group.html#backref_1">algebra.group</a>"##));
    }

    #[test]
    fn test_redirects() {
        let dir = tempfile::tempdir().unwrap();
        build(dir.path());

        assert_eq!(
            read(dir.path(), "find/group/index.html"),
            r#"<meta http-equiv="refresh" content="0;url=/docs/algebra/group.html#group">"#
        );
        assert_eq!(
            read(dir.path(), "find/group/src/index.html"),
            r#"<meta http-equiv="refresh" content="0;url=https://example.org/mathlib/src/algebra/group.lean#L10">"#
        );
        assert_eq!(
            read(dir.path(), "find/test_decl/src/index.html"),
            r#"<meta http-equiv="refresh" content="0;url=">"#
        );
    }

    #[test]
    fn test_sitemap() {
        let dir = tempfile::tempdir().unwrap();
        build(dir.path());
        let sitemap = read(dir.path(), "sitemap.txt");
        let lines: Vec<_> = sitemap.lines().collect();
        assert_eq!(
            lines[..3],
            [
                "/docs/test/basic.html",
                "/docs/algebra/group.html",
                "/docs/algebra/monoid.html",
            ]
        );
        assert_eq!(lines.len(), 10);
        assert!(lines.contains(&"/docs/references.html"));
    }

    fn write_docs_dir(dir: &Path) -> (Vec<ExtraDoc>, Vec<PathBuf>) {
        let docs = dir.join("docs");
        fs::create_dir_all(docs.join("extras")).unwrap();
        fs::write(docs.join("extras/calc.md"), "# Calc mode\n\nChains of `=` and `<`.").unwrap();
        fs::write(docs.join("100.yaml"), "1:\n  title: Irrationality of 2\n").unwrap();
        let extra = vec![ExtraDoc {
            name: "calc".to_owned(),
            title: "calc mode".to_owned(),
            source: docs.join("extras/calc.md"),
        }];
        (extra, vec![docs.join("100.yaml")])
    }

    #[test]
    fn test_extra_docs_and_data_files() {
        let input = tempfile::tempdir().unwrap();
        let (extra, data) = write_docs_dir(input.path());
        let dir = tempfile::tempdir().unwrap();
        let summary = build_with(dir.path(), extra, data, AssetMode::Embedded);

        assert_eq!(summary.pages, 12);
        let calc = read(dir.path(), "calc.html");
        assert!(calc.contains("<title>calc mode</title>"));
        assert!(calc.contains(r#"<h1 id="calc-mode" class="markdown-heading">Calc mode"#));
        assert!(calc.contains("<code>=</code> and <code>&lt;</code>"));
        assert_eq!(read(dir.path(), "100.yaml"), "1:\n  title: Irrationality of 2\n");

        let sitemap = read(dir.path(), "sitemap.txt");
        assert_eq!(sitemap.lines().last(), Some("/docs/calc.html"));
    }

    #[test]
    fn test_missing_extra_doc_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let builder = SiteBuilder::new(BuildConfig {
            output_dir: dir.path().to_owned(),
            site_root: "/".to_owned(),
            test_project: "docgen_test".to_owned(),
            sources: SourceLinks::default(),
            extra_docs: vec![ExtraDoc {
                name: "overview".to_owned(),
                title: "mathlib overview".to_owned(),
                source: dir.path().join("missing.md"),
            }],
            data_files: Vec::new(),
            assets: AssetMode::Embedded,
        });
        let inputs = SiteInputs {
            corpus: Corpus::default(),
            graph: DependencyGraph::default(),
            notes: Vec::new(),
            instances: BTreeMap::new(),
            tactic_docs: Vec::new(),
            bibliography: Bibliography::default(),
        };
        let err = builder.build(inputs).unwrap_err();
        assert!(matches!(err, BuildError::Read { .. }));
        assert!(err.to_string().contains("missing.md"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_assets() {
        let assets = tempfile::tempdir().unwrap();
        fs::write(assets.path().join("style.css"), "body {}").unwrap();
        fs::write(assets.path().join("nav.js"), "// nav").unwrap();
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("style.css"), "stale").unwrap();

        build_with(
            dir.path(),
            Vec::new(),
            Vec::new(),
            AssetMode::Symlink(assets.path().to_owned()),
        );
        let link = dir.path().join("style.css");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(read(dir.path(), "style.css"), "body {}");

        fs::write(assets.path().join("nav.js"), "// edited").unwrap();
        assert_eq!(read(dir.path(), "nav.js"), "// edited");
    }

    #[test]
    fn test_embedded_assets_match_sources() {
        let dir = tempfile::tempdir().unwrap();
        build(dir.path());
        let source = fs::read_to_string(Path::new(ASSETS_DIR).join("nav.js")).unwrap();
        assert_eq!(read(dir.path(), "nav.js"), source);
    }

    #[test]
    fn test_export_db() {
        let dir = tempfile::tempdir().unwrap();
        build(dir.path());

        let file = fs::File::open(dir.path().join("export_db.json.gz")).unwrap();
        let mut json = String::new();
        GzDecoder::new(file).read_to_string(&mut json).unwrap();
        let db: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(db["group"]["docs_link"], "/docs/algebra/group.html#group");
        assert_eq!(db["group"]["line"], 10);
        assert!(
            db["group"]["decl_header_html"]
                .as_str()
                .unwrap()
                .starts_with(r#"<div class="decl_header">"#)
        );
    }
}
