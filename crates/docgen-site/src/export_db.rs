//! Machine-readable export database for editor integrations.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use docgen_export::Declaration;
use docgen_resolve::{Corpus, Identifier};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;

use crate::error::BuildError;
use crate::source::SourceLinks;

/// Location of one declaration, constructor or structure field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExportDbEntry {
    /// Raw source path.
    pub filename: String,
    /// Raw kind of the owning declaration.
    pub kind: String,
    pub is_meta: bool,
    pub line: u32,
    pub src_link: String,
    pub docs_link: String,
    /// Rendered declaration header, for declarations only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decl_header_html: Option<String>,
}

/// Build the export database: one entry per declaration, constructor and
/// structure field, keyed by name.
pub fn build_export_db(
    corpus: &Corpus,
    sources: &SourceLinks,
    site_root: &str,
    mut header: impl FnMut(&Declaration) -> String,
) -> BTreeMap<String, ExportDbEntry> {
    let mut db = BTreeMap::new();
    for (id, decls) in corpus.partition() {
        for decl in decls {
            let entry = |name: &str| ExportDbEntry {
                filename: decl.filename.clone(),
                kind: decl.kind.clone(),
                is_meta: decl.is_meta,
                line: decl.line,
                src_link: sources.library_link(id, Some(decl.line)),
                docs_link: docs_link(site_root, id, name),
                decl_header_html: None,
            };
            db.insert(
                decl.name.clone(),
                ExportDbEntry {
                    decl_header_html: Some(header(decl)),
                    ..entry(&decl.name)
                },
            );
            for (name, _) in decl.constructors.iter().chain(&decl.structure_fields) {
                db.insert(name.clone(), entry(name));
            }
        }
    }
    db
}

fn docs_link(site_root: &str, id: &Identifier, name: &str) -> String {
    format!("{site_root}{}#{name}", id.url())
}

/// Write the database as gzip-compressed JSON.
pub fn write_export_db(
    path: &Path,
    db: &BTreeMap<String, ExportDbEntry>,
) -> Result<(), BuildError> {
    let json = serde_json::to_vec(db)?;
    let write_err = |source: std::io::Error| BuildError::Write {
        path: path.to_owned(),
        source,
    };
    let file = File::create(path).map_err(write_err)?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(&json).map_err(write_err)?;
    encoder.finish().map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::path::PathBuf;

    use docgen_resolve::{ProjectRoot, RootResolver};
    use flate2::read::GzDecoder;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn corpus() -> Corpus {
        let decl: Declaration = serde_json::from_value(json!({
            "name": "foo.bar",
            "filename": "/m/src/algebra/group.lean",
            "kind": "cnst",
            "is_meta": false,
            "line": 7,
            "doc_string": "",
            "args": [],
            "type": "Type",
            "attributes": [],
            "equations": [],
            "structure_fields": [["foo.bar.one", "T"]],
            "constructors": [["foo.bar.mk", "T"]]
        }))
        .unwrap();
        let resolver = RootResolver::from_roots(vec![ProjectRoot {
            path: PathBuf::from("/m/src"),
            project: "mathlib".to_owned(),
        }]);
        Corpus::separate(vec![decl], Default::default(), &resolver, ".").unwrap()
    }

    #[test]
    fn test_entries_for_declarations_constructors_and_fields() {
        let sources = SourceLinks::new([("mathlib".to_owned(), "https://src/".to_owned())]);
        let db = build_export_db(&corpus(), &sources, "/", |d| format!("<h>{}</h>", d.name));
        let keys: Vec<_> = db.keys().map(String::as_str).collect();
        assert_eq!(keys, ["foo.bar", "foo.bar.mk", "foo.bar.one"]);

        let field = &db["foo.bar.one"];
        assert_eq!(field.docs_link, "/algebra/group.html#foo.bar.one");
        assert_eq!(field.src_link, "https://src/algebra/group.lean#L7");
        assert_eq!(field.kind, "cnst");
        assert_eq!(field.decl_header_html, None);
        assert_eq!(db["foo.bar"].decl_header_html.as_deref(), Some("<h>foo.bar</h>"));
    }

    #[test]
    fn test_written_file_is_gzipped_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export_db.json.gz");
        let db = build_export_db(&corpus(), &SourceLinks::default(), "/", |_| String::new());
        write_export_db(&path, &db).unwrap();

        let mut json = String::new();
        GzDecoder::new(File::open(&path).unwrap())
            .read_to_string(&mut json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["foo.bar"]["filename"], "/m/src/algebra/group.lean");
        assert_eq!(value["foo.bar"]["src_link"], "");
        assert!(value["foo.bar.mk"].get("decl_header_html").is_none());
    }
}
