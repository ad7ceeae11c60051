//! Locates JSX tags for a given component name.
//!
//! # Design
//! Regular expressions cannot find the end of a JSX opening tag reliably:
//! `onClick={() => go()}` and `icon={<Icon />}` both contain `>` before the
//! tag ends. The scanner walks the tag body instead, skipping quoted strings,
//! template literals, comments and balanced `{…}` expressions. JSX nested in
//! an expression is skipped element by element, so its text may contain
//! quotes. All delimiters are ASCII, so byte offsets always fall on UTF-8
//! boundaries.

/// One attribute of an opening tag, borrowed from the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// Empty for spread attributes (`{...props}`).
    pub name: &'a str,
    /// Raw value including its quotes or braces; `None` for boolean props.
    pub value: Option<&'a str>,
    /// The whole attribute as written.
    pub raw: &'a str,
}

impl<'a> Attribute<'a> {
    /// Value of a string-literal attribute, quotes stripped. Also accepts
    /// `{'row'}` / `{"row"}`.
    pub fn literal(&self) -> Option<&'a str> {
        let value = self.value?;
        let inner = value
            .strip_prefix('{')
            .and_then(|v| v.strip_suffix('}'))
            .map(str::trim)
            .unwrap_or(value);
        let bytes = inner.as_bytes();
        if bytes.len() >= 2 && (bytes[0] == b'"' || bytes[0] == b'\'') && bytes[bytes.len() - 1] == bytes[0] {
            Some(&inner[1..inner.len() - 1])
        } else {
            None
        }
    }

    /// Inner source of a `{…}` expression value.
    pub fn expression(&self) -> Option<&'a str> {
        self.value?.strip_prefix('{')?.strip_suffix('}')
    }
}

/// A tag occurrence: `source[start..end]` is the full tag text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag<'a> {
    Open {
        start: usize,
        end: usize,
        attributes: Vec<Attribute<'a>>,
        self_closing: bool,
    },
    Close {
        start: usize,
        end: usize,
    },
}

impl Tag<'_> {
    pub fn start(&self) -> usize {
        match self {
            Tag::Open { start, .. } | Tag::Close { start, .. } => *start,
        }
    }

    pub fn end(&self) -> usize {
        match self {
            Tag::Open { end, .. } | Tag::Close { end, .. } => *end,
        }
    }
}

/// Find the next opening or closing tag of `name` at or after `from`.
///
/// Occurrences whose body cannot be parsed (unterminated string or
/// expression) are skipped.
pub fn next_tag<'a>(source: &'a str, name: &str, from: usize) -> Option<Tag<'a>> {
    let bytes = source.as_bytes();
    let mut pos = from;

    while let Some(offset) = source.get(pos..)?.find('<') {
        let lt = pos + offset;
        pos = lt + 1;

        let closing = bytes.get(lt + 1) == Some(&b'/');
        let name_start = if closing { lt + 2 } else { lt + 1 };
        if !source[name_start..].starts_with(name) {
            continue;
        }
        let after = name_start + name.len();
        if !ends_name(bytes.get(after).copied()) {
            continue;
        }

        if closing {
            let end = skip_whitespace(bytes, after);
            if bytes.get(end) == Some(&b'>') {
                return Some(Tag::Close { start: lt, end: end + 1 });
            }
            continue;
        }

        if let Some((attributes, self_closing, end)) = parse_body(source, after) {
            return Some(Tag::Open {
                start: lt,
                end,
                attributes,
                self_closing,
            });
        }
    }
    None
}

fn ends_name(byte: Option<u8>) -> bool {
    matches!(byte, None | Some(b' ' | b'\t' | b'\n' | b'\r' | b'>' | b'/'))
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Parse attributes up to the closing `>` of an opening tag.
fn parse_body(source: &str, mut i: usize) -> Option<(Vec<Attribute<'_>>, bool, usize)> {
    let bytes = source.as_bytes();
    let mut attributes = Vec::new();

    loop {
        i = skip_trivia(bytes, i)?;
        match *bytes.get(i)? {
            b'>' => return Some((attributes, false, i + 1)),
            b'/' => {
                let j = skip_whitespace(bytes, i + 1);
                return (bytes.get(j) == Some(&b'>')).then(|| (attributes, true, j + 1));
            }
            b'{' => {
                let end = skip_braces(bytes, i)?;
                attributes.push(Attribute {
                    name: "",
                    value: None,
                    raw: &source[i..end],
                });
                i = end;
            }
            _ => {
                let name_start = i;
                while i < bytes.len() && !matches!(bytes[i], b'=' | b'>' | b'/' | b'{' | b'"' | b'\'')
                    && !bytes[i].is_ascii_whitespace()
                {
                    i += 1;
                }
                if i == name_start {
                    return None;
                }
                let name = &source[name_start..i];

                let eq = skip_trivia(bytes, i)?;
                if bytes.get(eq) != Some(&b'=') {
                    attributes.push(Attribute {
                        name,
                        value: None,
                        raw: name,
                    });
                    continue;
                }

                let value_start = skip_trivia(bytes, eq + 1)?;
                let value_end = match *bytes.get(value_start)? {
                    q @ (b'"' | b'\'') => skip_string(bytes, value_start, q)?,
                    b'{' => skip_braces(bytes, value_start)?,
                    _ => {
                        let mut k = value_start;
                        while k < bytes.len() && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                            k += 1;
                        }
                        k
                    }
                };
                attributes.push(Attribute {
                    name,
                    value: Some(&source[value_start..value_end]),
                    raw: &source[name_start..value_end],
                });
                i = value_end;
            }
        }
    }
}

/// `bytes[start]` is the opening quote; returns the index after the closing one.
fn skip_string(bytes: &[u8], start: usize, quote: u8) -> Option<usize> {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// Skip whitespace and `//` / `/* */` comments. `None` on an unterminated
/// block comment.
fn skip_trivia(bytes: &[u8], mut i: usize) -> Option<usize> {
    loop {
        i = skip_whitespace(bytes, i);
        if bytes.get(i) == Some(&b'/') && matches!(bytes.get(i + 1), Some(b'/' | b'*')) {
            i = skip_comment(bytes, i)?;
        } else {
            return Some(i);
        }
    }
}

/// `bytes[start..]` starts with `//` or `/*`; returns the index after it.
fn skip_comment(bytes: &[u8], start: usize) -> Option<usize> {
    let rest = &bytes[start + 2..];
    if bytes[start + 1] == b'/' {
        let len = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
        Some(start + 2 + len)
    } else {
        let len = rest.windows(2).position(|w| w == b"*/")?;
        Some(start + 2 + len + 2)
    }
}

/// `bytes[start]` is `{`; returns the index after the matching `}`.
fn skip_braces(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                depth += 1;
                i += 1;
            }
            b'}' => {
                depth -= 1;
                i += 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            q @ (b'"' | b'\'' | b'`') => i = skip_string(bytes, i, q)?,
            b'/' if matches!(bytes.get(i + 1), Some(b'/' | b'*')) => i = skip_comment(bytes, i)?,
            b'<' if starts_element(bytes, start, i) => i = skip_element(bytes, i).unwrap_or(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// Whether the `<` at `lt` opens a JSX element rather than comparing.
///
/// It must be followed by a name or `>` (fragment) and preceded by an
/// operator, an opening bracket or `return`.
fn starts_element(bytes: &[u8], floor: usize, lt: usize) -> bool {
    if !matches!(bytes.get(lt + 1), Some(b) if b.is_ascii_alphabetic() || *b == b'>') {
        return false;
    }
    let mut j = lt;
    while j > floor && bytes[j - 1].is_ascii_whitespace() {
        j -= 1;
    }
    if j == floor {
        return true;
    }
    match bytes[j - 1] {
        b'(' | b',' | b'=' | b':' | b'?' | b'&' | b'|' | b'!' | b'{' | b'[' | b';' | b'>' => true,
        _ => bytes[floor..j].ends_with(b"return") && (j - 6 == floor || !is_ident(bytes[j - 7])),
    }
}

fn is_ident(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$'
}

/// `bytes[lt]` opens an element; returns the index after its closing tag.
/// Text children are skipped without interpreting quotes.
fn skip_element(bytes: &[u8], lt: usize) -> Option<usize> {
    let (mut i, self_closing) = skip_open_tag(bytes, lt)?;
    if self_closing {
        return Some(i);
    }
    while i < bytes.len() {
        match bytes[i] {
            b'{' => i = skip_braces(bytes, i)?,
            b'<' if bytes.get(i + 1) == Some(&b'/') => {
                let close = bytes[i..].iter().position(|&b| b == b'>')?;
                return Some(i + close + 1);
            }
            b'<' => i = skip_element(bytes, i)?,
            _ => i += 1,
        }
    }
    None
}

/// Returns the index after the opening tag and whether it self-closes.
fn skip_open_tag(bytes: &[u8], lt: usize) -> Option<(usize, bool)> {
    let mut i = lt + 1;
    loop {
        i = skip_trivia(bytes, i)?;
        match *bytes.get(i)? {
            b'>' => return Some((i + 1, false)),
            b'/' => {
                let j = skip_whitespace(bytes, i + 1);
                return (bytes.get(j) == Some(&b'>')).then_some((j + 1, true));
            }
            b'{' => i = skip_braces(bytes, i)?,
            q @ (b'"' | b'\'') => i = skip_string(bytes, i, q)?,
            _ => i += 1,
        }
    }
}
