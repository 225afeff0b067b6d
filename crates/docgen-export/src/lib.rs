//! Typed model of the declaration export consumed by docgen.
//!
//! The export is a single JSON document with five top-level keys:
//! `decls`, `mod_docs`, `notes`, `instances` and `tactic_docs`.
//!
//! # Example
//!
//! ```
//! use docgen_export::Export;
//!
//! let export = Export::from_json(r#"{"decls": [], "tactic_docs": [
//!     {"name": "simp", "category": "tactic", "tags": []}
//! ]}"#)?;
//! assert_eq!(export.tactic_docs[0].tags, ["untagged"]);
//! # Ok::<(), docgen_export::ExportError>(())
//! ```

mod decl;
mod efmt;

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub use decl::{
    Argument, Declaration, ModuleDoc, TacticCategory, TacticDoc, UNTAGGED, tag_id_of_name,
};
pub use efmt::{ExprError, FormattedExpr, LINK_CLOSE, LINK_OPEN, LINK_SEP};

/// A library note: `(title, markdown body)`.
pub type Note = (String, String);

/// Error returned when the export cannot be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The export file could not be read.
    #[error("Failed to read export {}: {source}", path.display())]
    Io {
        /// Path of the export file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The export is not valid JSON or does not match the expected shape.
    #[error("Malformed export: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The whole declaration export.
#[derive(Debug, Default, Deserialize)]
pub struct Export {
    /// All declarations, in export order.
    pub decls: Vec<Declaration>,
    /// Raw source path to module docstring blocks.
    #[serde(default)]
    pub mod_docs: BTreeMap<String, Vec<ModuleDoc>>,
    /// Library notes, in export order.
    #[serde(default)]
    pub notes: Vec<Note>,
    /// Class name to instance names.
    #[serde(default)]
    pub instances: BTreeMap<String, Vec<String>>,
    /// Tactic, command, hole command and attribute docs.
    #[serde(default)]
    pub tactic_docs: Vec<TacticDoc>,
}

impl Export {
    /// Load an export from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ExportError> {
        let content = std::fs::read_to_string(path).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let export = Self::from_json(&content)?;
        tracing::info!(
            path = %path.display(),
            decls = export.decls.len(),
            notes = export.notes.len(),
            tactic_docs = export.tactic_docs.len(),
            "Loaded export"
        );
        Ok(export)
    }

    /// Parse an export from a JSON string.
    ///
    /// Raw control characters inside string literals are accepted, since
    /// exported doc strings carry literal newlines. Tactic docs without tags
    /// are given the [`UNTAGGED`] tag; entries of an unknown category are
    /// dropped.
    pub fn from_json(content: &str) -> Result<Self, ExportError> {
        let mut export: Self = serde_json::from_str(&escape_raw_controls(content))?;
        export.tactic_docs.retain(|entry| {
            let known = entry.category != TacticCategory::Unknown;
            if !known {
                tracing::warn!(name = %entry.name, "Skipping tactic doc with unknown category");
            }
            known
        });
        for entry in &mut export.tactic_docs {
            if entry.tags.is_empty() {
                entry.tags.push(UNTAGGED.to_owned());
            }
        }
        Ok(export)
    }
}

/// Replace U+0000..U+001F inside string literals with `\uXXXX` escapes.
///
/// Whitespace between tokens is left alone. Scanning bytes is sound because
/// `"` and `\\` never occur inside a multi-byte UTF-8 sequence.
fn escape_raw_controls(content: &str) -> Cow<'_, str> {
    let mut out = String::new();
    let mut last = 0;
    let mut in_string = false;
    let mut escaped = false;
    for (i, byte) in content.bytes().enumerate() {
        if !in_string {
            in_string = byte == b'"';
        } else if escaped {
            escaped = false;
        } else if byte == b'\\' {
            escaped = true;
        } else if byte == b'"' {
            in_string = false;
        } else if byte < 0x20 {
            out.push_str(&content[last..i]);
            write!(out, "\\u{byte:04x}").unwrap();
            last = i + 1;
        }
    }
    if last == 0 {
        return Cow::Borrowed(content);
    }
    out.push_str(&content[last..]);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EXPORT: &str = r##"{
        "decls": [{
            "name": "foo.bar",
            "filename": "/lib/mathlib/src/algebra/group.lean",
            "kind": "cnst",
            "is_meta": false,
            "line": 12,
            "doc_string": "A *bar*.",
            "args": [{"arg": "(x : ℕ)", "implicit": false}],
            "type": ["c", ["n", "ℕ"], " → Prop"],
            "attributes": ["simp"],
            "equations": [],
            "structure_fields": [["foo.bar.one", "T"]],
            "constructors": []
        }],
        "mod_docs": {"/lib/mathlib/src/algebra/group.lean": [{"doc": "# Groups", "line": 1}]},
        "notes": [["continuity", "body"]],
        "instances": {"group": ["int.group"]},
        "tactic_docs": [
            {"name": "ring", "category": "tactic", "decl_names": ["tactic.ring"],
             "tags": ["arithmetic"], "description": "", "import": "tactic.ring"},
            {"name": "norm_num", "category": "hole_command", "decl_names": [], "tags": []}
        ]
    }"##;

    #[test]
    fn test_from_json_parses_all_sections() {
        let export = Export::from_json(EXPORT).unwrap();
        assert_eq!(export.decls.len(), 1);
        let decl = &export.decls[0];
        assert_eq!(decl.structure_fields[0].0, "foo.bar.one");
        assert_eq!(decl.args.len(), 1);
        assert_eq!(export.notes, vec![("continuity".to_owned(), "body".to_owned())]);
        assert_eq!(export.instances["group"], ["int.group"]);
        assert_eq!(
            export.mod_docs["/lib/mathlib/src/algebra/group.lean"][0].doc,
            "# Groups"
        );
    }

    #[test]
    fn test_from_json_tags_untagged_entries() {
        let export = Export::from_json(EXPORT).unwrap();
        assert_eq!(export.tactic_docs[0].tags, ["arithmetic"]);
        assert_eq!(export.tactic_docs[1].tags, [UNTAGGED]);
        assert_eq!(export.tactic_docs[1].category, TacticCategory::HoleCommand);
    }

    #[test]
    fn test_from_json_rejects_unknown_expression_tag() {
        let bad = EXPORT.replace(r#"["n", "ℕ"]"#, r#"["z", "ℕ"]"#);
        let err = Export::from_json(&bad).unwrap_err();
        assert!(err.to_string().contains("unknown formatted expression tag"));
    }

    #[test]
    fn test_from_json_accepts_raw_newlines_in_strings() {
        let content = "{\"decls\": [], \"notes\": [[\"t\", \"line one\nline two\"]],\n\t\"instances\": {}}";
        let export = Export::from_json(content).unwrap();
        assert_eq!(export.notes[0].1, "line one\nline two");
    }

    #[test]
    fn test_from_json_accepts_raw_controls_in_doc_strings() {
        let raw = EXPORT.replace(r#""A *bar*.""#, "\"A *bar*.\n\n\tIndented \\\"quote\\\".\"");
        let export = Export::from_json(&raw).unwrap();
        assert_eq!(export.decls[0].doc_string, "A *bar*.\n\n\tIndented \"quote\".");
    }

    #[test]
    fn test_escape_raw_controls_leaves_valid_json_untouched() {
        assert!(matches!(escape_raw_controls(EXPORT), Cow::Borrowed(_)));
        assert_eq!(escape_raw_controls("\"a\u{1}b\""), r#""a\u0001b""#);
    }

    #[test]
    fn test_from_json_skips_unknown_tactic_category() {
        let extra = EXPORT.replace(
            r#"{"name": "norm_num""#,
            r#"{"name": "linter", "category": "linter"}, {"name": "norm_num""#,
        );
        let export = Export::from_json(&extra).unwrap();
        let names: Vec<_> = export.tactic_docs.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["ring", "norm_num"]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Export::load(&dir.path().join("export.json")).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        std::fs::write(&path, EXPORT).unwrap();
        let export = Export::load(&path).unwrap();
        assert_eq!(export.decls[0].name, "foo.bar");
    }
}
