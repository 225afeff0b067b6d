//! Small HTML fragments shared by declaration and tactic pages.

use docgen_resolve::NameTable;

use crate::state::escape_html;

/// Wrap each dotted component of a name in `<span class="name">`.
///
/// ```
/// use docgen_renderer::htmlify_name;
///
/// assert_eq!(
///     htmlify_name("nat.le"),
///     r#"<span class="name">nat</span>.<span class="name">le</span>"#
/// );
/// ```
pub fn htmlify_name(name: &str) -> String {
    name.split('.')
        .map(|part| format!(r#"<span class="name">{}</span>"#, escape_html(part)))
        .collect::<Vec<_>>()
        .join(".")
}

/// The "Import using" block for a tactic doc entry.
///
/// Lists the module defining `decl_name` and the entry's own `import`, once
/// each. Anything under `init.` is reported as imported by default. Returns
/// an empty string when there is nothing to import.
pub fn import_options(names: &NameTable, decl_name: &str, import: &str) -> String {
    let mut paths: Vec<String> = Vec::new();
    if let Some(owner) = names.get(decl_name) {
        paths.push(owner.dotted_name());
    }
    if !import.is_empty() && !paths.iter().any(|p| p == import) {
        paths.push(import.to_owned());
    }
    if paths.is_empty() {
        return String::new();
    }

    let mut out = String::from(r#"<details class="imports"><summary>Import using</summary><ul>"#);
    if paths.iter().any(|p| p.starts_with("init.")) {
        out.push_str("<li>imported by default</li>");
    } else {
        let items: Vec<String> = paths
            .iter()
            .map(|p| format!("<li>import {}</li>", escape_html(p)))
            .collect();
        out.push_str(&items.join("\n"));
    }
    out.push_str("</ul></details>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use docgen_resolve::Identifier;
    use pretty_assertions::assert_eq;

    fn names() -> NameTable {
        let mut names = NameTable::new();
        let ring = Identifier::new(
            "mathlib",
            vec!["tactic".to_owned(), "ring".to_owned()],
            "/m/src/tactic/ring.lean",
        );
        let core = Identifier::new(
            "core",
            vec!["init".to_owned(), "meta".to_owned(), "tactic".to_owned()],
            "/l/init/meta/tactic.lean",
        );
        names.insert("tactic.ring", &ring);
        names.insert("tactic.intro", &core);
        names
    }

    #[test]
    fn test_import_options_lists_defining_module_and_import() {
        assert_eq!(
            import_options(&names(), "tactic.ring", "tactic.basic"),
            concat!(
                r#"<details class="imports"><summary>Import using</summary><ul>"#,
                "<li>import tactic.ring</li>\n<li>import tactic.basic</li>",
                "</ul></details>"
            )
        );
    }

    #[test]
    fn test_import_options_deduplicates() {
        let html = import_options(&names(), "tactic.ring", "tactic.ring");
        assert_eq!(html.matches("<li>").count(), 1);
    }

    #[test]
    fn test_import_options_init_is_default() {
        assert_eq!(
            import_options(&names(), "tactic.intro", ""),
            concat!(
                r#"<details class="imports"><summary>Import using</summary><ul>"#,
                "<li>imported by default</li></ul></details>"
            )
        );
    }

    #[test]
    fn test_import_options_empty() {
        assert_eq!(import_options(&names(), "unknown", ""), "");
    }

    #[test]
    fn test_htmlify_name_escapes_parts() {
        assert_eq!(
            htmlify_name("a<b"),
            r#"<span class="name">a&lt;b</span>"#
        );
    }
}
