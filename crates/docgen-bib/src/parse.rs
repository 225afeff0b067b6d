//! BibTeX database parser.
//!
//! Supports `@type{key, field = value, ...}` entries with parenthesized or
//! braced bodies, `@string` macros, `#` concatenation, and skips `@comment`
//! and `@preamble` blocks. Text outside entries, including an `@` that
//! does not open one, is ignored.

use std::collections::{BTreeMap, HashMap};

use crate::BibError;

/// One parsed entry with macros expanded and concatenations joined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawEntry {
    /// Lower-cased entry type (`article`, `book`, ...).
    pub entry_type: String,
    /// Citation key as written.
    pub key: String,
    /// Lower-cased field name to value, outer delimiters removed.
    pub fields: BTreeMap<String, String>,
}

/// Parse a BibTeX database into entries, in source order.
pub fn parse_entries(src: &str) -> Result<Vec<RawEntry>, BibError> {
    Parser::new(src).run()
}

const MONTHS: [(&str, &str); 12] = [
    ("jan", "January"),
    ("feb", "February"),
    ("mar", "March"),
    ("apr", "April"),
    ("may", "May"),
    ("jun", "June"),
    ("jul", "July"),
    ("aug", "August"),
    ("sep", "September"),
    ("oct", "October"),
    ("nov", "November"),
    ("dec", "December"),
];

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    macros: HashMap<String, String>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        let macros = MONTHS
            .iter()
            .map(|&(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Self {
            src,
            pos: 0,
            macros,
        }
    }

    fn run(mut self) -> Result<Vec<RawEntry>, BibError> {
        let mut entries = Vec::new();
        while let Some(at) = self.src[self.pos..].find('@') {
            self.pos += at + 1;
            self.skip_ws();
            let entry_type = self.ident().to_lowercase();
            self.skip_ws();
            let close = match self.peek() {
                Some('{') if !entry_type.is_empty() => '}',
                Some('(') if !entry_type.is_empty() => ')',
                // An `@` that does not open an entry is comment text.
                _ => {
                    tracing::debug!(line = self.line(), "Ignoring `@` outside an entry");
                    continue;
                }
            };
            self.bump();

            match entry_type.as_str() {
                "comment" | "preamble" => self.skip_body(close)?,
                "string" => self.string_macro(close)?,
                _ => entries.push(self.entry(entry_type, close)?),
            }
        }
        Ok(entries)
    }

    fn entry(&mut self, entry_type: String, close: char) -> Result<RawEntry, BibError> {
        self.skip_ws();
        let key_start = self.pos;
        while let Some(c) = self.peek() {
            if c == ',' || c == close || c.is_whitespace() {
                break;
            }
            self.bump();
        }
        let key = self.src[key_start..self.pos].to_owned();
        if key.is_empty() {
            return Err(self.error(format!("missing citation key in @{entry_type}")));
        }

        let mut fields = BTreeMap::new();
        loop {
            self.skip_ws();
            match self.bump() {
                Some(',') => {}
                Some(c) if c == close => break,
                _ => return Err(self.error(format!("expected `,` or `{close}` in entry {key}"))),
            }
            self.skip_ws();
            if self.peek() == Some(close) {
                self.bump();
                break;
            }
            let name = self.ident().to_lowercase();
            if name.is_empty() {
                return Err(self.error(format!("expected field name in entry {key}")));
            }
            self.skip_ws();
            if self.bump() != Some('=') {
                return Err(self.error(format!("expected `=` after field {name} in entry {key}")));
            }
            let value = self.value()?;
            if fields.insert(name.clone(), value).is_some() {
                tracing::warn!(%key, field = %name, "Duplicate bibliography field, keeping last");
            }
        }

        Ok(RawEntry {
            entry_type,
            key,
            fields,
        })
    }

    fn string_macro(&mut self, close: char) -> Result<(), BibError> {
        self.skip_ws();
        let name = self.ident().to_lowercase();
        if name.is_empty() {
            return Err(self.error("expected macro name in @string"));
        }
        self.skip_ws();
        if self.bump() != Some('=') {
            return Err(self.error(format!("expected `=` after @string macro {name}")));
        }
        let value = self.value()?;
        self.skip_ws();
        if self.bump() != Some(close) {
            return Err(self.error(format!("expected `{close}` after @string macro {name}")));
        }
        self.macros.insert(name, value);
        Ok(())
    }

    /// A value: parts joined by `#`.
    fn value(&mut self) -> Result<String, BibError> {
        let mut out = String::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some('{') => {
                    self.bump();
                    out.push_str(self.balanced('}')?);
                }
                Some('"') => {
                    self.bump();
                    out.push_str(self.balanced('"')?);
                }
                Some(c) if c.is_ascii_digit() => {
                    let start = self.pos;
                    while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                        self.bump();
                    }
                    out.push_str(&self.src[start..self.pos]);
                }
                _ => {
                    let name = self.ident().to_lowercase();
                    if name.is_empty() {
                        return Err(self.error("expected field value"));
                    }
                    match self.macros.get(&name) {
                        Some(expansion) => out.push_str(expansion),
                        None => tracing::warn!(%name, "Undefined bibliography macro"),
                    }
                }
            }
            self.skip_ws();
            if self.peek() == Some('#') {
                self.bump();
            } else {
                return Ok(out);
            }
        }
    }

    /// Text up to the matching `end` at brace depth zero, consuming `end`.
    fn balanced(&mut self, end: char) -> Result<&'a str, BibError> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            match c {
                '\\' => {
                    self.bump();
                }
                '{' => depth += 1,
                '}' if depth > 0 => depth -= 1,
                c if c == end && depth == 0 => {
                    let text = &self.src[start..self.pos];
                    self.bump();
                    return Ok(text);
                }
                _ => {}
            }
            self.bump();
        }
        self.pos = start;
        Err(self.error(format!("unterminated value, expected `{end}`")))
    }

    fn skip_body(&mut self, close: char) -> Result<(), BibError> {
        self.balanced(close).map(|_| ())
    }

    fn ident(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(|c| {
            !c.is_whitespace() && !matches!(c, '{' | '}' | '(' | ')' | ',' | '=' | '#' | '"' | '@')
        }) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn line(&self) -> usize {
        self.src[..self.pos].matches('\n').count() + 1
    }

    fn error(&self, message: impl Into<String>) -> BibError {
        BibError::Syntax {
            line: self.line(),
            message: message.into(),
        }
    }
}
