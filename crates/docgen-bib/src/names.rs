//! Splitting BibTeX name lists.

use crate::latex::latex_to_text;

/// A person from an `author` or `editor` field, in plain text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Person {
    /// Given names, possibly empty.
    pub first: String,
    /// Lower-case particles such as `van der`, possibly empty.
    pub von: String,
    /// Surname.
    pub last: String,
}

impl Person {
    /// Parse one name in `First von Last`, `von Last, First` or
    /// `von Last, Jr, First` form.
    pub fn parse(name: &str) -> Self {
        let parts = split_top_level(name, |s, i| s[i..].starts_with(',').then_some(1));
        match parts.as_slice() {
            [single] => Self::from_words(&words(single)),
            [last, first] => Self::from_last_first(last, first),
            [last, _jr, first, ..] => Self::from_last_first(last, first),
            [] => Self::from_words(&[]),
        }
    }

    fn from_words(words: &[&str]) -> Self {
        let Some((&last, rest)) = words.split_last() else {
            return Self {
                first: String::new(),
                von: String::new(),
                last: String::new(),
            };
        };
        let von_start = rest.iter().position(|w| is_von(w)).unwrap_or(rest.len());
        Self {
            first: latex_to_text(&rest[..von_start].join(" ")),
            von: latex_to_text(&rest[von_start..].join(" ")),
            last: latex_to_text(last),
        }
    }

    fn from_last_first(last: &str, first: &str) -> Self {
        let last_words = words(last);
        let split = last_words
            .iter()
            .rposition(|w| is_von(w))
            .map_or(0, |i| i + 1)
            .min(last_words.len().saturating_sub(1));
        Self {
            first: latex_to_text(first.trim()),
            von: latex_to_text(&last_words[..split].join(" ")),
            last: latex_to_text(&last_words[split..].join(" ")),
        }
    }

    /// `First von Last`.
    pub fn display_name(&self) -> String {
        [self.first.as_str(), self.von.as_str(), self.last.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Split a name list on ` and ` outside braces.
pub fn split_names(list: &str) -> Vec<Person> {
    split_top_level(list, |s, i| {
        (s[..i].ends_with(char::is_whitespace)
            && s[i..].starts_with("and")
            && s[i + 3..].starts_with(char::is_whitespace))
        .then_some(3)
    })
    .into_iter()
    .map(str::trim)
    .filter(|n| !n.is_empty())
    .map(Person::parse)
    .collect()
}

/// Split `s` at brace depth zero wherever `sep(s, i)` returns the byte length
/// of a separator starting at `i`.
fn split_top_level(s: &str, sep: impl Fn(&str, usize) -> Option<usize>) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if i < start {
            continue;
        }
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            _ if depth == 0 => {
                if let Some(width) = sep(s, i) {
                    parts.push(&s[start..i]);
                    start = i + width;
                }
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn words(s: &str) -> Vec<&str> {
    split_top_level(s, |s, i| {
        s[i..]
            .chars()
            .next()
            .filter(|c| c.is_whitespace())
            .map(char::len_utf8)
    })
    .into_iter()
    .filter(|w| !w.is_empty())
    .collect()
}

/// A particle starts with a lower-case letter outside braces.
fn is_von(word: &str) -> bool {
    word.chars()
        .find(|c| c.is_alphabetic())
        .is_some_and(char::is_lowercase)
        && !word.starts_with('{')
}
