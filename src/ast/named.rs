use crate::ast::Pattern;

/// Backtick-quoted extensions of the extended grammar.
///
/// `this` and `parent` are not listed here: they parse to [`Path::This`] and
/// [`Path::Parent`] in both grammars.
///
/// [`Path::This`]: crate::ast::Path::This
/// [`Path::Parent`]: crate::ast::Path::Parent
#[derive(Debug, Clone, PartialEq)]
pub enum NamedOperator {
    /// `` `len` `` - characters of a string, elements of a sequence, entries of a mapping
    Len,

    /// `` `keys` `` - one match per mapping key
    Keys,

    /// `` `sorted` `` - sorted sequence values, or sorted mapping keys
    Sorted,

    /// `` `str()` `` - textual form of the value
    Str,

    /// `` `sub(/regex/, replacement)` `` - regex substitution on strings
    ///
    /// `replacement` is stored in `$`-syntax; `\1` and `\g<name>` group
    /// references are rewritten at parse time.
    Sub { pattern: Pattern, replacement: String },

    /// `` `split(separator, index, maxsplit)` `` - one segment, or a rejoined range
    ///
    /// A negative `max_split` splits without limit.
    Split {
        separator: String,
        index: SplitIndex,
        max_split: i64,
    },
}

/// Segment selector of `split`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitIndex {
    /// One segment; negative positions count from the end
    At(i64),
    /// Segments `start..end`, rejoined with the separator
    Range { start: Option<i64>, end: Option<i64> },
}

impl NamedOperator {
    /// Parses the text between backticks. `None` means the name is not an
    /// extension; `Some(Err)` carries the reason a known operator is malformed.
    pub(crate) fn parse(text: &str) -> Option<Result<NamedOperator, String>> {
        match text {
            "len" => return Some(Ok(NamedOperator::Len)),
            "keys" => return Some(Ok(NamedOperator::Keys)),
            "sorted" => return Some(Ok(NamedOperator::Sorted)),
            "str()" => return Some(Ok(NamedOperator::Str)),
            _ => {}
        }

        let (name, args) = text.strip_suffix(')')?.split_once('(')?;
        match name {
            "sub" => Some(parse_sub(args)),
            "split" => Some(parse_split(args)),
            "str" => Some(Err("str() takes no arguments".to_string())),
            _ => None,
        }
    }
}

fn parse_sub(args: &str) -> Result<NamedOperator, String> {
    let body = args
        .strip_prefix('/')
        .ok_or_else(|| format!("sub() expects /regex/ as its first argument, got '{}'", args))?;
    let split_at = body
        .rfind("/,")
        .ok_or_else(|| "sub() expects '/regex/, replacement'".to_string())?;

    let source = &body[..split_at];
    let replacement = body[split_at + 2..].trim_start();
    let pattern =
        Pattern::new(source).map_err(|e| format!("invalid regex '{}' in sub(): {}", source, e))?;

    Ok(NamedOperator::Sub {
        pattern,
        replacement: convert_replacement(replacement),
    })
}

/// Rewrites backslash group references (`\1`, `\g<name>`) into `${1}` /
/// `${name}` and escapes literal dollars.
fn convert_replacement(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '$' => out.push_str("$$"),
            '\\' => match chars.peek().copied() {
                Some(d) if d.is_ascii_digit() => {
                    let mut group = String::new();
                    while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                        group.push(d);
                        chars.next();
                    }
                    out.push_str(&format!("${{{}}}", group));
                }
                Some('g') => {
                    chars.next();
                    let mut name = String::new();
                    if chars.peek() == Some(&'<') {
                        chars.next();
                        while let Some(n) = chars.next().filter(|n| *n != '>') {
                            name.push(n);
                        }
                        out.push_str(&format!("${{{}}}", name));
                    } else {
                        out.push_str("\\g");
                    }
                }
                Some('n') => {
                    chars.next();
                    out.push('\n');
                }
                Some('t') => {
                    chars.next();
                    out.push('\t');
                }
                Some(other) => {
                    chars.next();
                    out.push(other);
                }
                None => out.push('\\'),
            },
            c => out.push(c),
        }
    }
    out
}

fn parse_split(args: &str) -> Result<NamedOperator, String> {
    // The separator may itself be a comma, so split from the right.
    let mut parts = args.rsplitn(3, ',');
    let (Some(max_split), Some(index), Some(separator)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!(
            "split() expects 'separator, index, maxsplit', got '{}'",
            args
        ));
    };

    if separator.is_empty() {
        return Err("split() separator cannot be empty".to_string());
    }

    let max_split = max_split
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("split() maxsplit must be an integer, got '{}'", max_split.trim()))?;

    Ok(NamedOperator::Split {
        separator: separator.to_string(),
        index: parse_split_index(index.trim())?,
        max_split,
    })
}

fn parse_split_index(text: &str) -> Result<SplitIndex, String> {
    let bound = |s: &str| -> Result<Option<i64>, String> {
        if s.is_empty() {
            return Ok(None);
        }
        s.parse::<i64>()
            .map(Some)
            .map_err(|_| format!("split() index must be an integer or range, got '{}'", text))
    };

    match text.split_once(':') {
        Some((start, end)) => Ok(SplitIndex::Range {
            start: bound(start.trim())?,
            end: bound(end.trim())?,
        }),
        None => bound(text)?
            .map(SplitIndex::At)
            .ok_or_else(|| "split() index cannot be empty".to_string()),
    }
}
