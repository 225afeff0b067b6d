//! Plain-text summaries of markdown doc strings.

use std::sync::LazyLock;

use regex::Regex;

/// Default summary length, in characters.
pub const DEFAULT_SUMMARY_CHARS: usize = 200;

const ELLIPSIS: &str = "…";

static SOFT_WRAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([a-zA-Z`(),;$\-]) *\n *([a-zA-Z`()$])").unwrap()
});

/// Markup removed while keeping its first capture group.
static KEEP_CONTENTS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?m)^([\s\t]*)([*\-+]|\d\.)\s+",
        r"\*\*([^*]+)\*\*",
        r"\*([^*]+)\*",
        r"(?m)^#{1,6}\s*([^#]+)\s*(#{1,6})?$",
        r"__([^_]+)__",
        r"_([^_]+)_",
        r"!\[(.*?)\]\s?[\[(].*?[\])]",
        r"\[(.*?)\][\[(].*?[\])]",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Markup removed entirely.
static REMOVE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?m)^\s{0,3}>\s?",
        r"(?m)^={2,}",
        r"(?m)`{3}.*$",
        r"~~",
        r"(?m)^[=\-]{2,}\s*$",
        r"(?m)^-{3,}\s*$",
        r"(?m)^\s*",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static LINE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\.?\n").unwrap());

/// One-line plain-text summary of a markdown doc string.
///
/// Emphasis, headings, list markers, quotes, links and fences are stripped,
/// line breaks become sentence breaks, and the result is shortened on a word
/// boundary to at most `max_chars` characters, ending in `…` when cut.
///
/// ```
/// use docgen_renderer::plaintext_summary;
///
/// assert_eq!(
///     plaintext_summary("A **bold** _claim_ with [link](http://x).\n\nSecond para", 200),
///     "A bold claim with link. Second para"
/// );
/// ```
pub fn plaintext_summary(markdown: &str, max_chars: usize) -> String {
    let mut text = SOFT_WRAP.replace_all(markdown, "${1} ${2}").into_owned();
    for re in KEEP_CONTENTS.iter() {
        text = re.replace_all(&text, "${1}").into_owned();
    }
    for re in REMOVE.iter() {
        text = re.replace_all(&text, "").into_owned();
    }
    let text = LINE_END.replace_all(&text, ". ");
    shorten(&text, max_chars)
}

/// Collapse whitespace and cut to fit in `width` characters, `…` included.
///
/// Cuts fall before a space or just after a hyphen joining two words, as in
/// `Jean-` from `Jean-Pierre`, and the longest prefix that fits is kept.
fn shorten(text: &str, width: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let chars: Vec<(usize, char)> = collapsed.char_indices().collect();
    if chars.len() <= width {
        return collapsed;
    }

    let budget = width.saturating_sub(ELLIPSIS.chars().count());
    let mut cut = 0;
    for (n, &(i, c)) in chars.iter().enumerate().take(budget + 1) {
        if c == ' ' {
            cut = i;
        } else if c == '-' && n < budget && breaks_after_hyphen(&chars, n) {
            cut = i + 1;
        }
    }
    format!("{}{ELLIPSIS}", &collapsed[..cut])
}

/// Whether a line may break after the hyphen at `chars[n]`: two letters (or
/// a letter and an earlier hyphenated letter) before it, two letters after.
fn breaks_after_hyphen(chars: &[(usize, char)], n: usize) -> bool {
    let letter = |k: usize| chars.get(k).is_some_and(|&(_, c)| c.is_alphabetic());
    let dash = |k: usize| chars.get(k).is_some_and(|&(_, c)| c == '-');
    let before =
        n >= 2 && letter(n - 1) && (letter(n - 2) || (n >= 3 && dash(n - 2) && letter(n - 3)));
    let after = letter(n + 1) && (letter(n + 2) || (dash(n + 2) && letter(n + 3)));
    before && after
}

/// Text after the first horizontal rule, or the whole text if there is none.
pub fn split_on_hr(text: &str) -> &str {
    text.split_once("\n---\n").map_or(text, |(_, rest)| rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const QUATERNIONS: &str = "# Quaternions\n\n\
        In this file we define quaternions `ℍ[R]` over a commutative ring `R`, and define some\n\
        algebraic structures on `ℍ[R]`.\n\n\
        ## Main definitions\n\n\
        * `quaternion R`, `ℍ[R]` : the space;\n\
        * `quaternion.conj` : conjugate of a quaternion;";

    #[test]
    fn test_summary_of_module_doc() {
        assert_eq!(
            plaintext_summary(QUATERNIONS, usize::MAX),
            "Quaternions. In this file we define quaternions `ℍ[R]` over a commutative ring \
             `R`, and define some algebraic structures on `ℍ[R]`. Main definitions. \
             `quaternion R`, `ℍ[R]` : the space;. `quaternion.conj` : conjugate of a quaternion;"
        );
    }

    #[test]
    fn test_summary_is_shortened_on_word_boundary() {
        let doc = QUATERNIONS.split("\n\n## ").next().unwrap();
        assert_eq!(
            plaintext_summary(doc, 60),
            "Quaternions. In this file we define quaternions `ℍ[R]` over…"
        );
        assert_eq!(plaintext_summary("one two three four five six", 14), "one two three…");
    }

    #[test]
    fn test_shorten_breaks_after_hyphens() {
        assert_eq!(shorten("Jean-Pierre Serre is great", 10), "Jean-…");
        assert_eq!(shorten("the Cauchy-Schwarz-Bunyakovsky inequality", 22), "the Cauchy-Schwarz-…");
        // No break inside numbers or before a single letter.
        assert_eq!(shorten("see 2021-22 and x-y notes", 10), "see…");
        assert_eq!(shorten("an ab-c word here", 7), "an…");
    }

    #[test]
    fn test_shorten_fitting_text_is_only_collapsed() {
        assert_eq!(shorten("  well-founded\n recursion ", 22), "well-founded recursion");
    }

    #[test]
    fn test_summary_strips_quotes_fences_and_images() {
        assert_eq!(
            plaintext_summary(
                "> quoted *text*\n\n```lean\nexample := 1\n```\n~~gone~~ ![img](p.png) done",
                DEFAULT_SUMMARY_CHARS
            ),
            "quoted text. gone img done"
        );
    }

    #[test]
    fn test_summary_strips_ordered_list_markers() {
        assert_eq!(plaintext_summary("1. first\n2. second", 200), "first. second");
    }

    #[test]
    fn test_split_on_hr() {
        assert_eq!(split_on_hr("intro\n---\nbody\n---\nmore"), "body\n---\nmore");
        assert_eq!(split_on_hr("no rule"), "no rule");
    }
}
