//! HTML page layout shared by every generated page.

use std::fmt::Write;

use docgen_renderer::{TocEntry, escape_html};

use crate::tree::{NodeKind, SiteNode};

/// Fixed pages linked from the header, as `(file, title)`.
pub const HEADER_PAGES: [(&str, &str); 6] = [
    ("tactics.html", "tactics"),
    ("commands.html", "commands"),
    ("hole_commands.html", "hole commands"),
    ("attributes.html", "attributes"),
    ("notes.html", "notes"),
    ("references.html", "references"),
];

/// All data needed to render a page.
pub struct PageData<'a> {
    pub title: String,
    /// One-line summary for the `description` meta tag.
    pub description: Option<String>,
    /// Path of the page relative to the site root; marks the active
    /// navigation entry.
    pub active_path: String,
    pub html_content: String,
    pub toc: Vec<TocEntry>,
    pub navigation: &'a [SiteNode],
    /// URL prefix ending in `/`.
    pub site_root: &'a str,
}

/// Render a complete HTML page.
pub fn render_page(page: &PageData<'_>) -> String {
    let root = page.site_root;
    let mut html = String::with_capacity(8192 + page.html_content.len());

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape_html(&page.title));
    if let Some(description) = &page.description {
        let _ = writeln!(
            html,
            "<meta name=\"description\" content=\"{}\">",
            escape_html(description)
        );
    }
    let _ = writeln!(html, "<link rel=\"stylesheet\" href=\"{root}style.css\">");
    let _ = writeln!(html, "<script>const siteRoot = \"{root}\";</script>");
    html.push_str(
        "<script src=\"https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js\" async></script>\n",
    );
    html.push_str("</head>\n<body>\n");

    render_header(&mut html, root);

    html.push_str("<div class=\"layout\">\n");
    render_sidebar(&mut html, page.navigation, root, &page.active_path);

    html.push_str("<main class=\"content\">\n");
    html.push_str(&page.html_content);
    html.push_str("\n</main>\n");

    render_toc(&mut html, &page.toc);

    html.push_str("</div>\n");
    let _ = writeln!(html, "<script src=\"{root}nav.js\"></script>");
    html.push_str("</body>\n</html>\n");
    html
}

fn render_header(html: &mut String, root: &str) {
    html.push_str("<header>\n");
    let _ = writeln!(html, "<h1><a href=\"{root}index.html\">mathlib documentation</a></h1>");
    html.push_str("<nav class=\"internal_nav\">\n");
    for (file, title) in HEADER_PAGES {
        let _ = writeln!(html, "<a href=\"{root}{file}\">{title}</a>");
    }
    html.push_str("</nav>\n</header>\n");
}

fn render_sidebar(html: &mut String, items: &[SiteNode], root: &str, active_path: &str) {
    if items.is_empty() {
        return;
    }
    html.push_str("<nav class=\"nav\">\n");
    render_nav_items(html, items, root, active_path);
    html.push_str("</nav>\n");
}

/// Directories become collapsible sections, opened along the active path.
fn render_nav_items(html: &mut String, items: &[SiteNode], root: &str, active_path: &str) {
    for item in items {
        match item.kind {
            NodeKind::File => {
                let class = if item.path == active_path {
                    "nav_link visible"
                } else {
                    "nav_link"
                };
                let _ = writeln!(
                    html,
                    "<div class=\"{class}\"><a href=\"{root}{}\">{}</a></div>",
                    escape_html(&item.path),
                    escape_html(&item.name),
                );
            }
            NodeKind::Project | NodeKind::Dir => {
                let open = if is_ancestor(item, active_path) { " open" } else { "" };
                let _ = writeln!(
                    html,
                    "<details class=\"nav_sect\" data-path=\"{}\"{open}>\n<summary>{}</summary>",
                    escape_html(&item.path),
                    escape_html(&item.name),
                );
                render_nav_items(html, &item.children, root, active_path);
                html.push_str("</details>\n");
            }
        }
    }
}

fn is_ancestor(node: &SiteNode, active_path: &str) -> bool {
    node.children.iter().any(|child| match child.kind {
        NodeKind::File => child.path == active_path,
        NodeKind::Project | NodeKind::Dir => is_ancestor(child, active_path),
    })
}

fn render_toc(html: &mut String, toc: &[TocEntry]) {
    if toc.is_empty() {
        return;
    }
    html.push_str("<nav class=\"toc\">\n<h3>On this page</h3>\n<ul>\n");
    for entry in toc {
        let indent = if entry.level >= 3 { " class=\"toc_sub\"" } else { "" };
        let _ = writeln!(
            html,
            "<li{indent}><a href=\"#{}\">{}</a></li>",
            escape_html(&entry.id),
            escape_html(&entry.title),
        );
    }
    html.push_str("</ul>\n</nav>\n");
}
