//! Declaration, module doc and tactic doc records.

use std::borrow::Cow;

use serde::Deserialize;

use crate::efmt::FormattedExpr;

/// Tag assigned to tactic docs exported without any tags.
pub const UNTAGGED: &str = "untagged";

/// A single declaration from the export.
#[derive(Clone, Debug, Deserialize)]
pub struct Declaration {
    /// Fully qualified name (e.g., `nat.succ_le_iff`).
    pub name: String,
    /// Raw source path as recorded by the exporter.
    pub filename: String,
    /// Raw declaration kind (`thm`, `cnst`, `ax`, `def`, ...).
    pub kind: String,
    /// Whether the declaration is meta (untrusted) code.
    #[serde(default)]
    pub is_meta: bool,
    /// One-based source line.
    #[serde(default)]
    pub line: u32,
    /// Doc comment markdown, empty if undocumented.
    #[serde(default)]
    pub doc_string: String,
    /// Binders in declaration order.
    #[serde(default)]
    pub args: Vec<Argument>,
    /// Pretty-printed type.
    #[serde(rename = "type", default)]
    pub ty: FormattedExpr,
    /// Attribute names.
    #[serde(default)]
    pub attributes: Vec<String>,
    /// Pretty-printed defining equations.
    #[serde(default)]
    pub equations: Vec<FormattedExpr>,
    /// `(name, type)` for each structure field.
    #[serde(default)]
    pub structure_fields: Vec<(String, FormattedExpr)>,
    /// `(name, type)` for each constructor.
    #[serde(default)]
    pub constructors: Vec<(String, FormattedExpr)>,
}

/// A binder of a declaration.
#[derive(Clone, Debug, Deserialize)]
pub struct Argument {
    /// Pretty-printed binder.
    #[serde(alias = "name")]
    pub arg: FormattedExpr,
    /// Whether the binder is implicit.
    #[serde(default)]
    pub implicit: bool,
}

impl Declaration {
    /// Display kind of the declaration.
    ///
    /// Structures and inductive types are detected from their fields and
    /// constructors; abbreviated raw kinds are expanded.
    pub fn display_kind(&self) -> Cow<'_, str> {
        if !self.structure_fields.is_empty() {
            return Cow::Borrowed("structure");
        }
        if !self.constructors.is_empty() {
            return Cow::Borrowed("inductive");
        }
        match self.kind.as_str() {
            "thm" => Cow::Borrowed("theorem"),
            "cnst" => Cow::Borrowed("constant"),
            "ax" => Cow::Borrowed("axiom"),
            other => Cow::Owned(other.to_owned()),
        }
    }

    /// Whether `name` is this declaration, one of its fields, or one of its
    /// constructors.
    pub fn introduces(&self, name: &str) -> bool {
        self.name == name
            || self.structure_fields.iter().any(|(n, _)| n == name)
            || self.constructors.iter().any(|(n, _)| n == name)
    }
}

/// One module docstring block.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ModuleDoc {
    /// Markdown body.
    pub doc: String,
    /// One-based source line.
    pub line: u32,
}

/// Category of a tactic doc entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TacticCategory {
    Tactic,
    Command,
    HoleCommand,
    Attribute,
    /// Any category docgen has no page for.
    #[serde(other)]
    Unknown,
}

impl TacticCategory {
    /// All categories, in page order.
    pub const ALL: [Self; 4] = [
        Self::Tactic,
        Self::Command,
        Self::HoleCommand,
        Self::Attribute,
    ];

    /// Base name of the page listing this category.
    pub fn page_name(self) -> &'static str {
        match self {
            Self::Tactic => "tactics",
            Self::Command => "commands",
            Self::HoleCommand => "hole_commands",
            Self::Attribute => "attributes",
            Self::Unknown => "unknown",
        }
    }
}

/// Documentation for a tactic, command, hole command or attribute.
#[derive(Clone, Debug, Deserialize)]
pub struct TacticDoc {
    pub name: String,
    pub category: TacticCategory,
    /// Declarations implementing the entry.
    #[serde(default)]
    pub decl_names: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Markdown body.
    #[serde(default)]
    pub description: String,
    /// Module to import, empty if imported by default.
    #[serde(default)]
    pub import: String,
}

/// Convert a tag name to an HTML id.
pub fn tag_id_of_name(tag: &str) -> String {
    tag.trim().replace(' ', "-")
}
