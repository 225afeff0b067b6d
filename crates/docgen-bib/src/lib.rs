//! Bibliography registry for docgen.
//!
//! Parses a BibTeX database into [`BibEntry`] records with plain-text
//! authors, deduplicated citation labels, a resolved URL and venue. The
//! registry also collects backreferences from pages that cite each entry.
//!
//! # Example
//!
//! ```
//! use docgen_bib::Bibliography;
//!
//! let bib = Bibliography::parse(
//!     "@book{serre, author = {Jean-Pierre Serre}, title = {Linear representations}, year = 1977}",
//! )
//! .unwrap();
//! assert_eq!(bib.get("serre").unwrap().label, "Ser77");
//! ```

mod error;
mod label;
mod latex;
mod names;
mod parse;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

pub use error::BibError;
pub use label::{AlphaLabelStyle, LabelStyle};
pub use latex::latex_to_text;
pub use names::{Person, split_names};
pub use parse::{RawEntry, parse_entries};

/// A place in the generated site that links to a note or reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Backref {
    /// Page the link appears on, relative to the site root.
    pub file: String,
    /// Element id of the link on that page.
    pub anchor: String,
    /// Title of the linking page.
    pub title: String,
}

/// A normalised bibliography entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BibEntry {
    pub key: String,
    pub entry_type: String,
    /// Raw field values, lower-cased names.
    pub fields: BTreeMap<String, String>,
    /// Authors, or editors when the entry has no authors.
    pub authors: Vec<Person>,
    /// Unique citation label.
    pub label: String,
    pub url: Option<String>,
    pub venue: Option<String>,
    pub backrefs: Vec<Backref>,
}

impl BibEntry {
    /// Title as plain text.
    pub fn title(&self) -> Option<String> {
        self.fields.get("title").map(|t| latex_to_text(t))
    }

    pub fn year(&self) -> Option<&str> {
        self.fields.get("year").map(String::as_str)
    }
}

/// Citation key to entry, in source order.
#[derive(Debug, Default)]
pub struct Bibliography {
    entries: Vec<BibEntry>,
    index: HashMap<String, usize>,
}

impl Bibliography {
    /// Parse a database with [`AlphaLabelStyle`] labels.
    pub fn parse(src: &str) -> Result<Self, BibError> {
        Self::parse_with(src, &AlphaLabelStyle)
    }

    /// Parse a database with a custom label style.
    pub fn parse_with(src: &str, style: &dyn LabelStyle) -> Result<Self, BibError> {
        let mut bib = Self::default();
        for raw in parse_entries(src)? {
            if bib.index.contains_key(&raw.key) {
                tracing::warn!(key = %raw.key, "Duplicate bibliography key, keeping first");
                continue;
            }
            let entry = normalize(raw, style);
            bib.index.insert(entry.key.clone(), bib.entries.len());
            bib.entries.push(entry);
        }
        bib.disambiguate_labels();
        tracing::info!(entries = bib.entries.len(), "Parsed bibliography");
        Ok(bib)
    }

    /// Read and parse a `.bib` file.
    pub fn load(path: &Path) -> Result<Self, BibError> {
        let src = std::fs::read_to_string(path).map_err(|source| BibError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&src)
    }

    pub fn get(&self, key: &str) -> Option<&BibEntry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Entries in source order.
    pub fn entries(&self) -> &[BibEntry] {
        &self.entries
    }

    /// Record that `backref` cites `key`. Returns `false` for unknown keys.
    pub fn add_backref(&mut self, key: &str, backref: Backref) -> bool {
        match self.index.get(key) {
            Some(&i) => {
                self.entries[i].backrefs.push(backref);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append `a`, `b`, ... in source order to labels shared by several
    /// entries.
    fn disambiguate_labels(&mut self) {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for entry in &self.entries {
            *counts.entry(entry.label.clone()).or_default() += 1;
        }
        let mut seen: HashMap<String, usize> = HashMap::new();
        for entry in &mut self.entries {
            if counts[&entry.label] < 2 {
                continue;
            }
            let n = seen.entry(entry.label.clone()).or_default();
            entry.label.push_str(&suffix(*n));
            *n += 1;
        }
    }
}

/// `a`..`z`, then `aa`, `ab`, ...
fn suffix(mut n: usize) -> String {
    const LETTERS: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";
    let mut out = Vec::new();
    loop {
        out.push(char::from(LETTERS[n % 26]));
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    out.iter().rev().collect()
}

fn normalize(raw: RawEntry, style: &dyn LabelStyle) -> BibEntry {
    let authors = ["author", "editor"]
        .iter()
        .filter_map(|f| raw.fields.get(*f))
        .map(|list| split_names(list))
        .find(|people| !people.is_empty())
        .unwrap_or_default();
    let label = style.label(
        &raw.key,
        &authors,
        raw.fields.get("year").map(String::as_str),
    );
    BibEntry {
        url: resolve_url(&raw.fields),
        venue: resolve_venue(&raw.fields),
        key: raw.key,
        entry_type: raw.entry_type,
        fields: raw.fields,
        authors,
        label,
        backrefs: Vec::new(),
    }
}

fn resolve_url(fields: &BTreeMap<String, String>) -> Option<String> {
    let field = |name: &str| fields.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());
    let url = if let Some(link) = field("link") {
        link.to_owned()
    } else if let Some(url) = field("url") {
        url.to_owned()
    } else if let Some(eprint) = field("eprint") {
        if field("archiveprefix").is_some_and(|p| p.eq_ignore_ascii_case("arxiv")) {
            format!("https://arxiv.org/abs/{eprint}")
        } else {
            eprint.to_owned()
        }
    } else {
        format!("https://doi.org/{}", field("doi")?)
    };
    Some(clean_url(&url))
}

/// Strip a `\url{...}` wrapper and unescape `\_`.
fn clean_url(url: &str) -> String {
    let url = url
        .strip_prefix(r"\url{")
        .and_then(|u| u.strip_suffix('}'))
        .unwrap_or(url);
    url.replace(r"\_", "_")
}

fn resolve_venue(fields: &BTreeMap<String, String>) -> Option<String> {
    fields
        .get("journal")
        .filter(|j| !j.eq_ignore_ascii_case("unclassified"))
        .or_else(|| fields.get("booktitle"))
        .map(|v| latex_to_text(v))
}
