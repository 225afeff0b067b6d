//! The rewrite stages.
//!
//! Each stage is a regex substitution over the output of the previous one.
//! Stages are not commutative: notes must be linked before citations so that
//! `Note [title]` is not mistaken for a bare citation, and code spans must be
//! linked before any stage that introduces new `<code>` elements.

use std::fmt;
use std::sync::LazyLock;

use docgen_renderer::{Linker, escape_html};
use regex::{Captures, Regex};

use crate::context::RewriteContext;
use crate::notes::note_anchor;

static NOTE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Note \[(.*?)\]").unwrap());

static CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<code>([^<]+)</code>").unwrap());

static NAME_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<span class="n">([^<]+)</span>"#).unwrap());

/// `[text][key]` or a bare `[key]`.
static CITATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\[(?P<text>[^\[\]]*)\]\[(?P<key>[^\]\{\},~#%\\]+)\]|\[(?P<bare>[^\]\{\},~#%\\]+)\]",
    )
    .unwrap()
});

/// One named substitution pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// `Note [title]` to a link into the notes page.
    NoteLinks,
    /// Declaration names inside `<code>` spans.
    CodeSpans,
    /// Declaration names inside highlighted `<span class="n">` spans.
    NameSpans,
    /// `[text][key]` and `[key]` to links into the references page.
    Citations,
}

impl Stage {
    /// The full pipeline, in application order.
    pub const PIPELINE: [Self; 4] = [
        Self::NoteLinks,
        Self::CodeSpans,
        Self::NameSpans,
        Self::Citations,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::NoteLinks => "note-links",
            Self::CodeSpans => "code-spans",
            Self::NameSpans => "name-spans",
            Self::Citations => "citations",
        }
    }

    /// Apply this stage to `html`.
    pub fn apply(self, html: &str, linker: Linker<'_>, ctx: &mut RewriteContext) -> String {
        match self {
            Self::NoteLinks => note_links(html, linker, ctx),
            Self::CodeSpans => CODE_SPAN
                .replace_all(html, |caps: &Captures<'_>| {
                    format!("<code>{}</code>", linker.linkify_tokens(&caps[1]))
                })
                .into_owned(),
            Self::NameSpans => NAME_SPAN
                .replace_all(html, |caps: &Captures<'_>| {
                    format!(r#"<span class="n">{}</span>"#, linker.linkify_tokens(&caps[1]))
                })
                .into_owned(),
            Self::Citations => citations(html, linker, ctx),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn note_links(html: &str, linker: Linker<'_>, ctx: &mut RewriteContext) -> String {
    NOTE_LINK
        .replace_all(html, |caps: &Captures<'_>| {
            let title = unescape_html(&caps[1]);
            let id = ctx.note_backref(&title);
            if !ctx.notes().contains(&title) {
                tracing::warn!(note = %title, "Reference to unknown library note");
            }
            format!(
                r#"<a href="{}notes.html#{}"{}>{}</a>"#,
                linker.root(),
                note_anchor(&title),
                id_attr(id.as_deref()),
                &caps[0]
            )
        })
        .into_owned()
}

fn citations(html: &str, linker: Linker<'_>, ctx: &mut RewriteContext) -> String {
    CITATION
        .replace_all(html, |caps: &Captures<'_>| {
            let whole = &caps[0];
            let start = caps.get(0).map_or(0, |m| m.start());
            if follows_note_keyword(&html[..start]) {
                return whole.to_owned();
            }
            let Some(key) = caps.name("key").or_else(|| caps.name("bare")) else {
                return whole.to_owned();
            };
            let key = unescape_html(key.as_str());
            let Some(entry) = ctx.bibliography().get(&key) else {
                return whole.to_owned();
            };
            let text = match caps.name("text") {
                Some(text) => text.as_str().to_owned(),
                None => format!("[{}]", escape_html(&entry.label)),
            };
            let id = ctx.citation_backref(&key);
            format!(
                r#"<a href="{}references.html#{}"{}>{text}</a>"#,
                linker.root(),
                escape_html(&key),
                id_attr(id.as_deref()),
            )
        })
        .into_owned()
}

fn id_attr(id: Option<&str>) -> String {
    id.map(|id| format!(r#" id="{id}""#)).unwrap_or_default()
}

/// Whether `before` ends with `Note ` in any case.
fn follows_note_keyword(before: &str) -> bool {
    before
        .len()
        .checked_sub(5)
        .and_then(|i| before.get(i..))
        .is_some_and(|tail| tail.eq_ignore_ascii_case("Note "))
}

/// Undo the entity escaping applied by the markdown renderer.
fn unescape_html(s: &str) -> String {
    if !s.contains('&') {
        return s.to_owned();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_follows_note_keyword() {
        assert!(follows_note_keyword("see Note "));
        assert!(follows_note_keyword("NOTE "));
        assert!(!follows_note_keyword("Notes "));
        assert!(!follows_note_keyword("é "));
    }

    #[test]
    fn test_unescape_html() {
        assert_eq!(unescape_html("a &amp;lt; b"), "a &lt; b");
        assert_eq!(unescape_html("x &lt; y"), "x < y");
        assert_eq!(unescape_html("plain"), "plain");
    }

    #[test]
    fn test_stage_names() {
        let names: Vec<_> = Stage::PIPELINE.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["note-links", "code-spans", "name-spans", "citations"]);
    }
}
