//! Linked HTML for pretty-printed types and terms.

use std::sync::LazyLock;

use docgen_export::FormattedExpr;
use regex::Regex;

use crate::linker::Linker;

/// A linkable span (`name`, leading space, display, trailing space) or a run of
/// plain text.
static LINKED_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("\u{E000}(.+?)\u{E001}(\\s*)(.*?)(\\s*)\u{E002}|([^\u{E000}]+)").unwrap()
});

/// Render a formatted expression to linked HTML.
///
/// The whole expression is rendered as a function-position node, so the
/// output is always wrapped in `<span class="fn">`.
///
/// ```
/// use docgen_export::FormattedExpr;
/// use docgen_renderer::{Linker, render_efmt};
/// use docgen_resolve::NameTable;
///
/// let names = NameTable::new();
/// let expr = FormattedExpr::text("ℕ →\nℕ");
/// assert_eq!(render_efmt(&expr, &Linker::new("/", &names)), r#"<span class="fn">ℕ → ℕ</span>"#);
/// ```
pub fn render_efmt(expr: &FormattedExpr, linker: &Linker<'_>) -> String {
    let mut out = String::new();
    out.push_str(r#"<span class="fn">"#);
    render_into(expr, linker, &mut out);
    out.push_str("</span>");
    out
}

fn render_into(expr: &FormattedExpr, linker: &Linker<'_>, out: &mut String) {
    match expr {
        FormattedExpr::Text(text) => render_text(&text.replace('\n', " "), linker, out),
        FormattedExpr::Named(inner) => {
            out.push_str(r#"<span class="fn">"#);
            render_into(inner, linker, out);
            out.push_str("</span>");
        }
        FormattedExpr::Concat(lhs, rhs) => {
            render_into(lhs, linker, out);
            render_into(rhs, linker, out);
        }
    }
}

fn render_text(text: &str, linker: &Linker<'_>, out: &mut String) {
    for caps in LINKED_SPAN.captures_iter(text) {
        if let Some(plain) = caps.get(5) {
            out.push_str(plain.as_str());
            continue;
        }
        let (Some(name), Some(lead), Some(display), Some(trail)) =
            (caps.get(1), caps.get(2), caps.get(3), caps.get(4))
        else {
            continue;
        };
        out.push_str(lead.as_str());
        out.push_str(&linker.linkify_core(name.as_str(), display.as_str()));
        out.push_str(trail.as_str());
    }
}
