//! Declaration links resolved through the name-location table.

use std::borrow::Cow;
use std::sync::LazyLock;

use docgen_resolve::NameTable;
use regex::Regex;

/// Separators between names inside code spans. Kept verbatim in the output.
static TOKEN_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\[\]\(\)\{\}]").unwrap());

/// Builds links to declaration anchors.
///
/// `root` is the site URL prefix (`/`, `/docs/`, ...) and always ends with
/// a slash.
#[derive(Clone, Copy, Debug)]
pub struct Linker<'a> {
    root: &'a str,
    names: &'a NameTable,
}

impl<'a> Linker<'a> {
    pub fn new(root: &'a str, names: &'a NameTable) -> Self {
        Self { root, names }
    }

    /// Site URL prefix.
    pub fn root(&self) -> &'a str {
        self.root
    }

    pub fn names(&self) -> &'a NameTable {
        self.names
    }

    /// Link `text` to the declaration `name`.
    ///
    /// A known name becomes an anchor to its declaration, with a tooltip
    /// when `text` differs from `name`. An unknown name with different text
    /// becomes a tooltip-only span. Otherwise `text` is returned as is.
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use docgen_renderer::Linker;
    /// use docgen_resolve::{Identifier, NameTable};
    ///
    /// let mut names = NameTable::new();
    /// let id = Identifier::new("mathlib", vec!["logic".to_owned()], PathBuf::from("/m/logic.lean"));
    /// names.insert("or.elim", &id);
    ///
    /// let linker = Linker::new("/", &names);
    /// assert_eq!(linker.linkify_core("or.elim", "or.elim"), r##"<a href="/logic.html#or.elim">or.elim</a>"##);
    /// assert_eq!(linker.linkify_core("x.y", "y"), r#"<span title="x.y">y</span>"#);
    /// assert_eq!(linker.linkify_core("x.y", "x.y"), "x.y");
    /// ```
    pub fn linkify_core<'t>(&self, name: &str, text: &'t str) -> Cow<'t, str> {
        if let Some(owner) = self.names.get(name) {
            let tooltip = if text == name {
                String::new()
            } else {
                format!(r#" title="{name}""#)
            };
            Cow::Owned(format!(
                r#"<a href="{}{}#{name}"{tooltip}>{text}</a>"#,
                self.root,
                owner.url()
            ))
        } else if text != name {
            Cow::Owned(format!(r#"<span title="{name}">{text}</span>"#))
        } else {
            Cow::Borrowed(text)
        }
    }

    /// URL of the declaration anchor for `name`, if it is known.
    pub fn link_to_decl(&self, name: &str) -> Option<String> {
        self.names
            .get(name)
            .map(|owner| format!("{}{}#{name}", self.root, owner.url()))
    }

    /// Link every name token in a code fragment.
    ///
    /// The fragment is split on whitespace and brackets; each piece is looked
    /// up on its own and separators are copied through unchanged.
    pub fn linkify_tokens(&self, fragment: &str) -> String {
        let mut out = String::with_capacity(fragment.len());
        let mut last = 0;
        for sep in TOKEN_SEPARATOR.find_iter(fragment) {
            out.push_str(&self.linkify_core(&fragment[last..sep.start()], &fragment[last..sep.start()]));
            out.push_str(sep.as_str());
            last = sep.end();
        }
        let tail = &fragment[last..];
        out.push_str(&self.linkify_core(tail, tail));
        out
    }
}
