//! LaTeX markup to plain Unicode text.

/// Convert BibTeX field markup to plain text.
///
/// Accent commands (`\"o`, `\'{e}`, `\v{s}`, ...) become precomposed
/// characters where known and the bare letter otherwise. Escaped specials
/// become literals, `~` becomes a space, brace groups are flattened, and any
/// other command keeps only its argument.
///
/// ```
/// use docgen_bib::latex_to_text;
///
/// assert_eq!(latex_to_text(r#"G{\"o}del"#), "Gödel");
/// assert_eq!(latex_to_text(r"Erd\H{o}s~and {\v S}ediv\'y"), "Erdős and Šedivý");
/// ```
pub fn latex_to_text(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut chars = src.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' | '}' => {}
            '~' => out.push(' '),
            '\\' => {
                let Some(&next) = chars.peek() else {
                    break;
                };
                if !next.is_ascii_alphabetic() {
                    chars.next();
                    if let Some(accent) = symbol_accent(next) {
                        let base = accent_argument(&mut chars);
                        push_accented(&mut out, accent, base);
                    } else if next == '\\' {
                        out.push(' ');
                    } else {
                        out.push(next);
                    }
                    continue;
                }

                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphabetic() {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if let Some(accent) = letter_accent(&name) {
                    while chars.peek() == Some(&' ') {
                        chars.next();
                    }
                    let base = accent_argument(&mut chars);
                    push_accented(&mut out, accent, base);
                } else if let Some(symbol) = named_symbol(&name) {
                    out.push_str(symbol);
                    // A control word swallows the following space.
                    if chars.peek() == Some(&' ') {
                        chars.next();
                    }
                }
                // Any other command is dropped; its braced argument is kept
                // as ordinary text.
            }
            c => out.push(c),
        }
    }
    out
}

#[derive(Clone, Copy)]
enum Accent {
    Diaeresis,
    Acute,
    Grave,
    Circumflex,
    Tilde,
    Macron,
    DotAbove,
    Breve,
    Caron,
    DoubleAcute,
    Cedilla,
    Ogonek,
    Ring,
}

fn symbol_accent(c: char) -> Option<Accent> {
    Some(match c {
        '"' => Accent::Diaeresis,
        '\'' => Accent::Acute,
        '`' => Accent::Grave,
        '^' => Accent::Circumflex,
        '~' => Accent::Tilde,
        '=' => Accent::Macron,
        '.' => Accent::DotAbove,
        _ => return None,
    })
}

fn letter_accent(name: &str) -> Option<Accent> {
    Some(match name {
        "u" => Accent::Breve,
        "v" => Accent::Caron,
        "H" => Accent::DoubleAcute,
        "c" => Accent::Cedilla,
        "k" => Accent::Ogonek,
        "r" => Accent::Ring,
        _ => return None,
    })
}

fn named_symbol(name: &str) -> Option<&'static str> {
    Some(match name {
        "ss" => "ß",
        "o" => "ø",
        "O" => "Ø",
        "ae" => "æ",
        "AE" => "Æ",
        "oe" => "œ",
        "OE" => "Œ",
        "aa" => "å",
        "AA" => "Å",
        "l" => "ł",
        "L" => "Ł",
        "i" => "ı",
        "j" => "ȷ",
        "dh" => "ð",
        "DH" => "Ð",
        "th" => "þ",
        "TH" => "Þ",
        _ => return None,
    })
}

/// The letter an accent applies to: `x`, `{x}` or `{\i}`.
fn accent_argument(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<char> {
    match chars.next()? {
        '{' => {
            let mut base = None;
            for c in chars.by_ref() {
                match c {
                    '}' => break,
                    '\\' => {}
                    'i' if base.is_none() => base = Some('i'),
                    'j' if base.is_none() => base = Some('j'),
                    c if base.is_none() => base = Some(c),
                    _ => {}
                }
            }
            base
        }
        c => Some(c),
    }
}

fn push_accented(out: &mut String, accent: Accent, base: Option<char>) {
    let Some(base) = base else {
        return;
    };
    match compose(accent, base) {
        Some(c) => out.push(c),
        None => out.push(base),
    }
}

fn compose(accent: Accent, base: char) -> Option<char> {
    let (from, to) = match accent {
        Accent::Diaeresis => ("aeiouyAEIOUY", "äëïöüÿÄËÏÖÜŸ"),
        Accent::Acute => ("aeiouyncszlrAEIOUYNCSZLR", "áéíóúýńćśźĺŕÁÉÍÓÚÝŃĆŚŹĹŔ"),
        Accent::Grave => ("aeiouAEIOU", "àèìòùÀÈÌÒÙ"),
        Accent::Circumflex => ("aeiouAEIOU", "âêîôûÂÊÎÔÛ"),
        Accent::Tilde => ("anoANO", "ãñõÃÑÕ"),
        Accent::Macron => ("aeiouAEIOU", "āēīōūĀĒĪŌŪ"),
        Accent::DotAbove => ("zeZEI", "żėŻĖİ"),
        Accent::Breve => ("agAG", "ăğĂĞ"),
        Accent::Caron => ("cszrnedtCSZRNEDT", "čšžřňěďťČŠŽŘŇĚĎŤ"),
        Accent::DoubleAcute => ("ouOU", "őűŐŰ"),
        Accent::Cedilla => ("cstCST", "çşţÇŞŢ"),
        Accent::Ogonek => ("aeAE", "ąęĄĘ"),
        Accent::Ring => ("auAU", "åůÅŮ"),
    };
    from.chars()
        .position(|c| c == base)
        .and_then(|i| to.chars().nth(i))
}
