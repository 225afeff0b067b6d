//! Library notes and the pages that refer to them.

use std::collections::HashMap;

use docgen_bib::Backref;
use docgen_export::Note;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters kept verbatim in a note anchor.
const ANCHOR_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Element id of a note on the notes page.
pub fn note_anchor(title: &str) -> String {
    utf8_percent_encode(title, ANCHOR_ENCODE_SET).to_string()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteEntry {
    pub title: String,
    /// Markdown body.
    pub body: String,
    pub backrefs: Vec<Backref>,
}

/// Note title to note, in export order.
#[derive(Debug, Default)]
pub struct NoteRegistry {
    notes: Vec<NoteEntry>,
    index: HashMap<String, usize>,
}

impl NoteRegistry {
    pub fn new(notes: impl IntoIterator<Item = Note>) -> Self {
        let mut registry = Self::default();
        for (title, body) in notes {
            if registry.index.contains_key(&title) {
                tracing::warn!(%title, "Duplicate library note, keeping first");
                continue;
            }
            registry.index.insert(title.clone(), registry.notes.len());
            registry.notes.push(NoteEntry {
                title,
                body,
                backrefs: Vec::new(),
            });
        }
        registry
    }

    pub fn get(&self, title: &str) -> Option<&NoteEntry> {
        self.index.get(title).map(|&i| &self.notes[i])
    }

    pub fn contains(&self, title: &str) -> bool {
        self.index.contains_key(title)
    }

    /// Record that `backref` mentions `title`. Returns `false` for unknown
    /// notes.
    pub fn add_backref(&mut self, title: &str, backref: Backref) -> bool {
        match self.index.get(title) {
            Some(&i) => {
                self.notes[i].backrefs.push(backref);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &NoteEntry> {
        self.notes.iter()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_note_anchor() {
        assert_eq!(note_anchor("continuity"), "continuity");
        assert_eq!(note_anchor("lower instances"), "lower%20instances");
        assert_eq!(note_anchor("a/b"), "a%2Fb");
    }

    #[test]
    fn test_duplicate_titles_keep_first() {
        let registry = NoteRegistry::new([
            ("n".to_owned(), "first".to_owned()),
            ("n".to_owned(), "second".to_owned()),
        ]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("n").unwrap().body, "first");
    }

    #[test]
    fn test_add_backref_to_unknown_note() {
        let mut registry = NoteRegistry::new([]);
        let backref = Backref {
            file: "a.html".to_owned(),
            anchor: "backref_0".to_owned(),
            title: "a".to_owned(),
        };
        assert!(!registry.add_backref("missing", backref));
    }
}
