//! Accumulated state of a rewrite pass.

use std::collections::HashMap;

use docgen_bib::{Backref, Bibliography};
use docgen_resolve::{Identifier, SELF_PROJECT};

use crate::notes::NoteRegistry;

/// The page whose text is being rewritten.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Origin {
    /// Page path relative to the site root.
    pub file: String,
    /// Human readable page title used in backreference lists.
    pub title: String,
    /// Whether links on this page are recorded as backreferences.
    pub records_backrefs: bool,
}

impl Origin {
    /// The page of a module. Modules of `test_project` and of the generator
    /// itself link normally but leave no backreferences.
    pub fn module(id: &Identifier, test_project: &str) -> Self {
        Self {
            file: id.url(),
            title: id.dotted_name(),
            records_backrefs: id.project() != test_project && id.project() != SELF_PROJECT,
        }
    }

    /// A page that is not a module, such as `tactics.html`.
    pub fn page(file: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            title: title.into(),
            records_backrefs: true,
        }
    }
}

/// Note and bibliography registries threaded through every rewrite.
///
/// Pages must be rewritten in a stable order so that backreference lists are
/// reproducible. Each origin file numbers its anchors `backref_0`,
/// `backref_1`, ... across all text rewritten for it.
#[derive(Debug)]
pub struct RewriteContext {
    notes: NoteRegistry,
    bibliography: Bibliography,
    origin: Option<Origin>,
    counters: HashMap<String, usize>,
}

impl RewriteContext {
    pub fn new(notes: NoteRegistry, bibliography: Bibliography) -> Self {
        Self {
            notes,
            bibliography,
            origin: None,
            counters: HashMap::new(),
        }
    }

    /// Set the page subsequent rewrites belong to.
    pub fn set_origin(&mut self, origin: Origin) {
        self.origin = Some(origin);
    }

    pub fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    pub fn notes(&self) -> &NoteRegistry {
        &self.notes
    }

    pub fn bibliography(&self) -> &Bibliography {
        &self.bibliography
    }

    /// Finish the pass and hand back the registries with their backrefs.
    pub fn into_parts(self) -> (NoteRegistry, Bibliography) {
        (self.notes, self.bibliography)
    }

    /// Record a backreference to note `title`, returning the anchor id for
    /// the link.
    pub(crate) fn note_backref(&mut self, title: &str) -> Option<String> {
        if !self.notes.contains(title) {
            return None;
        }
        let backref = self.next_backref()?;
        let anchor = backref.anchor.clone();
        self.notes.add_backref(title, backref);
        Some(anchor)
    }

    /// Record a backreference to citation `key`, returning the anchor id.
    pub(crate) fn citation_backref(&mut self, key: &str) -> Option<String> {
        if !self.bibliography.contains(key) {
            return None;
        }
        let backref = self.next_backref()?;
        let anchor = backref.anchor.clone();
        self.bibliography.add_backref(key, backref);
        Some(anchor)
    }

    fn next_backref(&mut self) -> Option<Backref> {
        let origin = self.origin.as_ref().filter(|o| o.records_backrefs)?;
        let n = self.counters.entry(origin.file.clone()).or_default();
        let anchor = format!("backref_{n}");
        *n += 1;
        Some(Backref {
            file: origin.file.clone(),
            anchor,
            title: origin.title.clone(),
        })
    }
}
