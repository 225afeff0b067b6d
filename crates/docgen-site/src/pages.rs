//! Page bodies: module pages, tactic lists, notes, references.

use std::collections::BTreeMap;
use std::fmt::Write;

use docgen_bib::{Backref, BibEntry, Bibliography, Person};
use docgen_export::{
    Declaration, FormattedExpr, ModuleDoc, TacticCategory, TacticDoc, tag_id_of_name,
};
use docgen_links::{CrossLinker, NoteRegistry, RewriteContext, note_anchor};
use docgen_renderer::{
    DEFAULT_SUMMARY_CHARS, Linker, MarkdownRenderer, RenderResult, TocEntry, escape_html,
    htmlify_name, import_options, plaintext_summary, render_efmt, split_on_hr,
};
use docgen_resolve::{Corpus, Identifier};

use crate::graph::DependencyGraph;
use crate::source::SourceLinks;
use crate::tree::{NodeKind, SiteNode};

/// Rendered body of one page.
#[derive(Debug, Default)]
pub struct PageContent {
    pub html: String,
    pub toc: Vec<TocEntry>,
    pub description: Option<String>,
}

/// Display title of a tactic category page.
pub fn category_title(category: TacticCategory) -> &'static str {
    match category {
        TacticCategory::Tactic => "Tactics",
        TacticCategory::Command => "Commands",
        TacticCategory::HoleCommand => "Hole commands",
        TacticCategory::Attribute => "Attributes",
        TacticCategory::Unknown => "Other",
    }
}

/// Renders page bodies from the resolved corpus.
pub struct PageRenderer<'a> {
    corpus: &'a Corpus,
    graph: &'a DependencyGraph,
    instances: &'a BTreeMap<String, Vec<String>>,
    sources: &'a SourceLinks,
    linker: Linker<'a>,
    cross: CrossLinker<'a>,
}

enum ModuleItem<'d> {
    Doc(&'d ModuleDoc),
    Decl(&'d Declaration),
}

impl ModuleItem<'_> {
    fn line(&self) -> u32 {
        match self {
            Self::Doc(doc) => doc.line,
            Self::Decl(decl) => decl.line,
        }
    }
}

impl<'a> PageRenderer<'a> {
    pub fn new(
        corpus: &'a Corpus,
        graph: &'a DependencyGraph,
        instances: &'a BTreeMap<String, Vec<String>>,
        sources: &'a SourceLinks,
        site_root: &'a str,
    ) -> Self {
        let linker = Linker::new(site_root, corpus.names());
        Self {
            corpus,
            graph,
            instances,
            sources,
            linker,
            cross: CrossLinker::new(linker),
        }
    }

    fn root(&self) -> &'a str {
        self.linker.root()
    }

    /// Markdown to HTML with cross-links for the current origin of `ctx`.
    pub fn markdown(&self, markdown: &str, ctx: &mut RewriteContext) -> RenderResult {
        let rendered = MarkdownRenderer::new().render_markdown(markdown);
        RenderResult {
            html: self.cross.rewrite(&rendered.html, ctx),
            toc: rendered.toc,
        }
    }

    /// Page of one module: its docs and declarations in source order.
    pub fn module_page(&self, id: &Identifier, ctx: &mut RewriteContext) -> PageContent {
        let decls = self.corpus.partition().get(id).map_or(&[][..], Vec::as_slice);
        let docs = self.corpus.module_docs(id);

        let mut items: Vec<ModuleItem<'_>> = docs
            .iter()
            .map(ModuleItem::Doc)
            .chain(decls.iter().map(ModuleItem::Decl))
            .collect();
        items.sort_by_key(ModuleItem::line);

        let mut html = String::new();
        let _ = writeln!(html, "<h1>{}</h1>", escape_html(&id.dotted_name()));
        let source = self.sources.library_link(id, None);
        if !source.is_empty() {
            let _ = writeln!(html, r#"<div class="gh_link"><a href="{source}">source</a></div>"#);
        }
        self.module_list(&mut html, "Imports", self.graph.imports(id));
        self.module_list(&mut html, "Imported by", self.graph.imported_by(id));

        for item in &items {
            match item {
                ModuleItem::Doc(doc) => {
                    let rendered = self.markdown(&doc.doc, ctx);
                    let _ = writeln!(html, r#"<div class="mod_doc">{}</div>"#, rendered.html);
                }
                ModuleItem::Decl(decl) => self.declaration(&mut html, decl, ctx),
            }
        }

        let mut names: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
        names.sort_unstable();
        let toc = names
            .into_iter()
            .map(|name| TocEntry {
                level: 2,
                title: name.to_owned(),
                id: name.to_owned(),
            })
            .collect();

        let description = docs
            .first()
            .map(|doc| plaintext_summary(&doc.doc, DEFAULT_SUMMARY_CHARS))
            .filter(|s| !s.is_empty());

        PageContent {
            html,
            toc,
            description,
        }
    }

    fn module_list<'i>(
        &self,
        html: &mut String,
        title: &str,
        modules: impl Iterator<Item = &'i Identifier>,
    ) {
        let items: Vec<String> = modules
            .map(|m| {
                format!(
                    r#"<li><a href="{}{}">{}</a></li>"#,
                    self.root(),
                    m.url(),
                    escape_html(&m.dotted_name())
                )
            })
            .collect();
        if items.is_empty() {
            return;
        }
        let _ = writeln!(
            html,
            r#"<details class="imports"><summary>{title}</summary><ul>{}</ul></details>"#,
            items.join("\n")
        );
    }

    /// Kind, linked name, arguments and type of a declaration.
    pub fn decl_header(&self, decl: &Declaration) -> String {
        let mut html = String::from(r#"<div class="decl_header">"#);
        let href = self
            .linker
            .link_to_decl(&decl.name)
            .unwrap_or_else(|| format!("#{}", decl.name));
        let _ = write!(
            html,
            r#"<span class="decl_kind">{}</span> <span class="decl_name"><a href="{href}">{}</a></span>"#,
            decl.display_kind(),
            htmlify_name(&decl.name)
        );
        for arg in &decl.args {
            let class = if arg.implicit {
                "decl_args implicit"
            } else {
                "decl_args"
            };
            let _ = write!(
                html,
                r#" <span class="{class}">{}</span>"#,
                render_efmt(&arg.arg, &self.linker)
            );
        }
        let _ = write!(
            html,
            r#" <span class="decl_type_sep">:</span> <div class="decl_type">{}</div></div>"#,
            render_efmt(&decl.ty, &self.linker)
        );
        html
    }

    fn declaration(&self, html: &mut String, decl: &Declaration, ctx: &mut RewriteContext) {
        let name = escape_html(&decl.name);
        let _ = writeln!(html, r#"<div class="decl" id="{name}">"#);
        let _ = writeln!(html, r#"<div class="{}">"#, decl.display_kind());

        if let Some(owner) = self.corpus.names().get(&decl.name) {
            let source = self.sources.library_link(owner, Some(decl.line));
            if !source.is_empty() {
                let _ = writeln!(html, r#"<div class="gh_link"><a href="{source}">source</a></div>"#);
            }
        }
        if !decl.attributes.is_empty() {
            let _ = writeln!(
                html,
                r#"<div class="attributes">@[{}]</div>"#,
                escape_html(&decl.attributes.join(", "))
            );
        }
        html.push_str(&self.decl_header(decl));
        html.push('\n');

        if !decl.doc_string.is_empty() {
            let doc = self.markdown(&decl.doc_string, ctx);
            let _ = writeln!(html, r#"<div class="decl_doc">{}</div>"#, doc.html);
        }

        self.members(html, decl, "structure_fields", "structure_field", &decl.structure_fields);
        self.members(html, decl, "constructors", "constructor", &decl.constructors);

        if !decl.equations.is_empty() {
            html.push_str(r#"<details><summary>Equations</summary><ul class="equations">"#);
            for eq in &decl.equations {
                let _ = write!(
                    html,
                    r#"<li class="equation">{}</li>"#,
                    render_efmt(eq, &self.linker)
                );
            }
            html.push_str("</ul></details>\n");
        }

        if let Some(instances) = self.instances.get(&decl.name).filter(|i| !i.is_empty()) {
            html.push_str(r#"<details class="instances"><summary>Instances</summary><ul>"#);
            for instance in instances {
                let _ = write!(html, "<li>{}</li>", self.linker.linkify_core(instance, instance));
            }
            html.push_str("</ul></details>\n");
        }

        html.push_str("</div>\n</div>\n");
    }

    fn members(
        &self,
        html: &mut String,
        decl: &Declaration,
        list_class: &str,
        item_class: &str,
        members: &[(String, FormattedExpr)],
    ) {
        if members.is_empty() {
            return;
        }
        let _ = write!(html, r#"<ul class="{list_class}">"#);
        for (name, ty) in members {
            let short = name
                .strip_prefix(decl.name.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
                .unwrap_or(name);
            let _ = write!(
                html,
                r#"<li class="{item_class}" id="{}"><span class="name">{}</span> : {}</li>"#,
                escape_html(name),
                escape_html(short),
                render_efmt(ty, &self.linker)
            );
        }
        html.push_str("</ul>\n");
    }

    /// List page for one tactic category, entries sorted by name.
    pub fn tactic_page(
        &self,
        category: TacticCategory,
        entries: &[&TacticDoc],
        ctx: &mut RewriteContext,
    ) -> PageContent {
        let mut entries = entries.to_vec();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        let mut tags: Vec<&str> = entries
            .iter()
            .flat_map(|e| e.tags.iter().map(String::as_str))
            .collect();
        tags.sort_unstable();
        tags.dedup();

        let mut html = String::new();
        let _ = writeln!(html, "<h1>{}</h1>", category_title(category));
        if !tags.is_empty() {
            html.push_str(r#"<div class="tags"><h3>Filter by tag</h3><ul>"#);
            for tag in &tags {
                let _ = write!(
                    html,
                    r#"<li><label><input type="checkbox" class="tagfilter" value="{}" checked> {}</label></li>"#,
                    escape_html(&tag_id_of_name(tag)),
                    escape_html(tag)
                );
            }
            html.push_str("</ul></div>\n");
        }

        let mut toc = Vec::with_capacity(entries.len());
        for entry in entries {
            let id = tag_id_of_name(&entry.name);
            let tag_ids: Vec<String> = entry.tags.iter().map(|t| tag_id_of_name(t)).collect();
            let _ = writeln!(
                html,
                r#"<div class="taclink {}" id="{}" data-tags="{}">"#,
                escape_html(&tag_ids.join(" ")),
                escape_html(&id),
                escape_html(&entry.tags.join(","))
            );
            let _ = writeln!(
                html,
                r##"<h2 class="markdown-heading">{} <a class="hover-link" href="#{}">#</a></h2>"##,
                escape_html(&entry.name),
                escape_html(&id)
            );
            let description = self.markdown(split_on_hr(&entry.description), ctx);
            html.push_str(&description.html);
            html.push('\n');

            let _ = write!(
                html,
                "<dl><dt>Tags:</dt><dd>{}</dd>",
                escape_html(&entry.tags.join(", "))
            );
            if !entry.decl_names.is_empty() {
                html.push_str("<dt>Related declarations</dt><dd><ul>");
                for decl in &entry.decl_names {
                    let _ = write!(html, "<li>{}</li>", self.linker.linkify_core(decl, decl));
                }
                html.push_str("</ul></dd>");
            }
            html.push_str("</dl>\n");

            let first_decl = entry.decl_names.first().map_or("", String::as_str);
            html.push_str(&import_options(self.corpus.names(), first_decl, &entry.import));
            html.push_str("\n</div>\n");

            toc.push(TocEntry {
                level: 2,
                title: entry.name.clone(),
                id,
            });
        }

        PageContent {
            html,
            toc,
            description: None,
        }
    }

    /// Render every note body, in export order, keyed by title. Call before
    /// the notes page so that links inside notes are counted among the
    /// backreferences.
    pub fn note_bodies(&self, ctx: &mut RewriteContext) -> BTreeMap<String, String> {
        let notes: Vec<(String, String)> = ctx
            .notes()
            .iter()
            .map(|n| (n.title.clone(), n.body.clone()))
            .collect();
        notes
            .into_iter()
            .map(|(title, body)| {
                let html = self.markdown(&body, ctx).html;
                (title, html)
            })
            .collect()
    }

    /// The library notes page with backreferences.
    pub fn notes_page(&self, notes: &NoteRegistry, bodies: &BTreeMap<String, String>) -> PageContent {
        let mut html = String::from("<h1>Library notes</h1>\n");
        let mut toc = Vec::with_capacity(bodies.len());
        for (title, body) in bodies {
            let anchor = note_anchor(title);
            let _ = writeln!(html, r#"<div class="note" id="{anchor}">"#);
            let _ = writeln!(
                html,
                r##"<h2 class="markdown-heading">{} <a class="hover-link" href="#{anchor}">#</a></h2>"##,
                escape_html(title)
            );
            html.push_str(body);
            html.push('\n');
            if let Some(note) = notes.get(title) {
                self.backrefs(&mut html, "Referenced in", &note.backrefs);
            }
            html.push_str("</div>\n");
            toc.push(TocEntry {
                level: 2,
                title: title.clone(),
                id: anchor,
            });
        }
        PageContent {
            html,
            toc,
            description: None,
        }
    }

    /// The bibliography, sorted by label.
    pub fn references_page(&self, bibliography: &Bibliography) -> PageContent {
        let mut entries: Vec<&BibEntry> = bibliography.entries().iter().collect();
        entries.sort_by(|a, b| a.label.cmp(&b.label));

        let mut html = String::from("<h1>References</h1>\n<dl class=\"references\">\n");
        for entry in entries {
            let _ = writeln!(
                html,
                r#"<dt id="{}">[{}]</dt>"#,
                escape_html(&entry.key),
                escape_html(&entry.label)
            );
            html.push_str("<dd>");
            let authors: Vec<String> = entry.authors.iter().map(Person::display_name).collect();
            if !authors.is_empty() {
                let _ = write!(html, "{}. ", escape_html(&authors.join(", ")));
            }
            let title = escape_html(&entry.title().unwrap_or_else(|| entry.key.clone()));
            match &entry.url {
                Some(url) => {
                    let _ = write!(html, r#"<a href="{}">{title}</a>."#, escape_html(url));
                }
                None => {
                    let _ = write!(html, "{title}.");
                }
            }
            if let Some(venue) = &entry.venue {
                let _ = write!(html, " <em>{}</em>.", escape_html(venue));
            }
            if let Some(year) = entry.year() {
                let _ = write!(html, " {}.", escape_html(year));
            }
            self.backrefs(&mut html, "Cited in", &entry.backrefs);
            html.push_str("</dd>\n");
        }
        html.push_str("</dl>\n");
        PageContent {
            html,
            ..PageContent::default()
        }
    }

    fn backrefs(&self, html: &mut String, heading: &str, backrefs: &[Backref]) {
        if backrefs.is_empty() {
            return;
        }
        let _ = write!(html, r#"<div class="backrefs">{heading}: <ul>"#);
        for backref in backrefs {
            let _ = write!(
                html,
                r#"<li><a href="{}{}#{}">{}</a></li>"#,
                self.root(),
                backref.file,
                backref.anchor,
                escape_html(&backref.title)
            );
        }
        html.push_str("</ul></div>\n");
    }

    /// Landing page listing the projects and their module counts.
    pub fn index_page(&self, tree: &[SiteNode]) -> PageContent {
        let mut html = String::from("<h1>mathlib documentation</h1>\n<ul class=\"projects\">\n");
        for project in tree.iter().filter(|n| n.kind == NodeKind::Project) {
            let _ = writeln!(
                html,
                "<li>{}: {} modules</li>",
                escape_html(&project.name),
                count_files(project)
            );
        }
        html.push_str("</ul>\n");
        let _ = writeln!(
            html,
            r#"<p>See also the <a href="{root}tactics.html">tactics</a>, <a href="{root}notes.html">library notes</a> and <a href="{root}references.html">references</a>.</p>"#,
            root = self.root()
        );
        PageContent {
            html,
            ..PageContent::default()
        }
    }
}

/// Body of a standalone markdown page such as the library overview.
///
/// These pages come from outside the export, so no cross-links are resolved
/// in them.
pub fn extra_doc_page(markdown: &str) -> PageContent {
    let RenderResult { html, toc } = MarkdownRenderer::new().render_markdown(markdown);
    let description = plaintext_summary(markdown, DEFAULT_SUMMARY_CHARS);
    PageContent {
        html,
        toc,
        description: (!description.is_empty()).then_some(description),
    }
}

/// Body of the 404 page.
pub fn not_found_page() -> PageContent {
    PageContent {
        html: "<h1>404</h1>\n<p>Page not found.</p>\n".to_owned(),
        ..PageContent::default()
    }
}

fn count_files(node: &SiteNode) -> usize {
    match node.kind {
        NodeKind::File => 1,
        NodeKind::Project | NodeKind::Dir => node.children.iter().map(count_files).sum(),
    }
}
