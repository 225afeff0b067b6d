//! State tracked while walking markdown events.

use std::sync::LazyLock;

use regex::Regex;

use crate::markdown::DEFAULT_CODE_LANGUAGE;

/// Raw text being collected for a block rendered only once it closes.
///
/// While a capture is open, text events go into it instead of the output and
/// inline markup is dropped.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) enum Capture {
    #[default]
    Off,
    /// A fenced or indented code block.
    Code { language: String, source: String },
    /// An image, whose alt text is its flattened label.
    Image { src: String, title: String, alt: String },
}

impl Capture {
    /// Open a code block. Blocks without an info string are Lean.
    pub(crate) fn code(info: Option<&str>) -> Self {
        let language = info
            .and_then(|info| info.split_whitespace().next())
            .unwrap_or(DEFAULT_CODE_LANGUAGE);
        Self::Code {
            language: language.to_owned(),
            source: String::new(),
        }
    }

    pub(crate) fn image(src: &str, title: &str) -> Self {
        Self::Image {
            src: src.to_owned(),
            title: title.to_owned(),
            alt: String::new(),
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        *self != Self::Off
    }

    /// Append raw text. Returns `false` if no capture is open.
    pub(crate) fn push(&mut self, text: &str) -> bool {
        match self {
            Self::Off => false,
            Self::Code { source, .. } => {
                source.push_str(text);
                true
            }
            Self::Image { alt, .. } => {
                alt.push_str(text);
                true
            }
        }
    }

    /// Close the capture and return its HTML.
    pub(crate) fn finish(&mut self) -> String {
        match std::mem::take(self) {
            Self::Off => String::new(),
            Self::Code { language, source } => format!(
                r#"<div class="codehilite"><pre><code class="language-{}">{}</code></pre></div>"#,
                escape_html(&language),
                escape_html(&source)
            ),
            Self::Image { src, title, alt } => {
                let title = if title.is_empty() {
                    String::new()
                } else {
                    format!(r#" title="{}""#, escape_html(&title))
                };
                format!(
                    r#"<img src="{}"{title} alt="{}">"#,
                    escape_html(&src),
                    escape_html(&alt)
                )
            }
        }
    }
}

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Anchor ID for linking.
    pub id: String,
}

/// State for tracking the heading being rendered and the table of contents.
#[derive(Default)]
pub struct HeadingState {
    /// Current heading level (None if not in a heading).
    current_level: Option<u8>,
    /// Rendered heading HTML.
    html: String,
    /// Plain heading text for the table of contents.
    text: String,
    toc: Vec<TocEntry>,
}

impl HeadingState {
    pub fn is_active(&self) -> bool {
        self.current_level.is_some()
    }

    pub fn start_heading(&mut self, level: u8) {
        self.current_level = Some(level);
        self.text.clear();
        self.html.clear();
    }

    /// Complete the heading and record its table of contents entry.
    ///
    /// Returns `(level, anchor, inner html)`, or `None` outside a heading.
    /// The anchor is computed from the rendered inner HTML, so equal headings
    /// on one page share an anchor.
    pub fn complete_heading(&mut self) -> Option<(u8, String, String)> {
        let level = self.current_level.take()?;
        let text = std::mem::take(&mut self.text);
        let html = std::mem::take(&mut self.html);
        let id = heading_anchor(&html);
        self.toc.push(TocEntry {
            level,
            title: text.trim().to_owned(),
            id: id.clone(),
        });
        Some((level, id, html))
    }

    pub fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub fn push_html(&mut self, html: &str) {
        self.html.push_str(html);
    }

    pub fn take_toc(&mut self) -> Vec<TocEntry> {
        std::mem::take(&mut self.toc)
    }
}

static NON_ANCHOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\- ]+").unwrap());

/// Anchor id for a heading's rendered text.
///
/// Lower-cases, drops everything except word characters (including
/// combining marks), hyphens and spaces, then turns spaces into hyphens.
///
/// ```
/// use docgen_renderer::heading_anchor;
///
/// assert_eq!(heading_anchor("Main results: (α, β)"), "main-results-α-β");
/// ```
#[must_use]
pub fn heading_anchor(text: &str) -> String {
    NON_ANCHOR
        .replace_all(&text.trim().to_lowercase(), "")
        .replace(' ', "-")
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_heading_anchor() {
        assert_eq!(heading_anchor("Hello World"), "hello-world");
        assert_eq!(heading_anchor("What's New?"), "whats-new");
        assert_eq!(heading_anchor("  Padded  "), "padded");
        assert_eq!(heading_anchor("snake_case and-kebab"), "snake_case-and-kebab");
    }

    #[test]
    fn test_heading_anchor_keeps_repeated_spaces() {
        assert_eq!(heading_anchor("a  b"), "a--b");
    }

    #[test]
    fn test_heading_anchor_keeps_combining_marks() {
        // "é" written as "e" followed by U+0301.
        assert_eq!(heading_anchor("Poincare\u{301} duality"), "poincare\u{301}-duality");
        assert_eq!(heading_anchor("ℍ[R] – basics"), "ℍr--basics");
    }

    #[test]
    fn test_heading_anchor_strips_markup_punctuation() {
        // Tags are stripped of their brackets, not removed.
        assert_eq!(
            heading_anchor("The <code>ring</code> tactic"),
            "the-coderingcode-tactic"
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html(r#""quoted""#), "&quot;quoted&quot;");
        assert_eq!(escape_html("it's"), "it&#x27;s");
    }

    #[test]
    fn test_heading_state_records_toc_without_disambiguation() {
        let mut state = HeadingState::default();
        for _ in 0..2 {
            state.start_heading(2);
            state.push_text("FAQ");
            state.push_html("FAQ");
            let (level, id, html) = state.complete_heading().unwrap();
            assert_eq!(level, 2);
            assert_eq!(id, "faq");
            assert_eq!(html, "FAQ");
        }
        let toc = state.take_toc();
        assert_eq!(toc.len(), 2);
        assert_eq!(toc[0], toc[1]);
    }

    #[test]
    fn test_complete_heading_outside_heading() {
        let mut state = HeadingState::default();
        assert!(state.complete_heading().is_none());
    }

    #[test]
    fn test_code_capture_defaults_to_lean() {
        let mut capture = Capture::code(None);
        assert!(capture.push("a < b\n"));
        assert_eq!(
            capture.finish(),
            r#"<div class="codehilite"><pre><code class="language-lean">a &lt; b
</code></pre></div>"#
        );
        assert!(!capture.is_open());
        assert_eq!(
            Capture::code(Some("python linenos")),
            Capture::Code {
                language: "python".to_owned(),
                source: String::new(),
            }
        );
    }

    #[test]
    fn test_image_capture_collects_alt_text() {
        let mut capture = Capture::image("hasse.png", "");
        capture.push("Hasse ");
        capture.push("diagram");
        assert_eq!(capture.finish(), r#"<img src="hasse.png" alt="Hasse diagram">"#);
    }

    #[test]
    fn test_closed_capture_takes_no_text() {
        let mut capture = Capture::Off;
        assert!(!capture.push("text"));
        assert_eq!(capture.finish(), "");
    }
}
