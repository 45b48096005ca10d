//! Alignment expression scanning
//!
//! Total, string-level functions over alignment expressions. An expression
//! is read as a sequence of terms (an id with an optional bracketed range
//! group) separated by delimiter text. Anything that is not a term is
//! carried along as delimiter text, so these functions never fail.

use memchr::memchr;

use crate::model::node::is_id_char;

/// Piece of a scanned expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Piece<'e> {
    Term(Term<'e>),
    Delimiter(&'e str),
}

/// An id with its optional range group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Term<'e> {
    /// Full text of the term
    pub text: &'e str,
    pub id: &'e str,
    /// Text between the brackets, if a range group follows the id
    pub ranges: Option<&'e str>,
}

/// Split an expression into terms and delimiter text
pub(crate) fn scan(expr: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut pos = 0;
    let mut delimiter_start = 0;

    while let Some(c) = expr[pos..].chars().next() {
        if !c.is_ascii_alphabetic() {
            pos += c.len_utf8();
            continue;
        }
        let start = pos;
        pos += 1;
        while let Some(c) = expr[pos..].chars().next() {
            if !is_id_char(c) {
                break;
            }
            pos += c.len_utf8();
        }
        let id = &expr[start..pos];
        let mut ranges = None;
        if expr[pos..].starts_with('[') {
            if let Some(close) = memchr(b']', expr[pos..].as_bytes()) {
                ranges = Some(&expr[pos + 1..pos + close]);
                pos += close + 1;
            }
        }
        if delimiter_start < start {
            pieces.push(Piece::Delimiter(&expr[delimiter_start..start]));
        }
        pieces.push(Piece::Term(Term {
            text: &expr[start..pos],
            id,
            ranges,
        }));
        delimiter_start = pos;
    }
    if delimiter_start < expr.len() {
        pieces.push(Piece::Delimiter(&expr[delimiter_start..]));
    }
    pieces
}

/// Terms of an expression, with the delimiter text between them when
/// `keep_delimiters` is set
pub fn selections(expr: &str, keep_delimiters: bool) -> Vec<String> {
    scan(expr)
        .into_iter()
        .filter_map(|piece| match piece {
            Piece::Term(term) => Some(term.text.to_string()),
            Piece::Delimiter(text) if keep_delimiters => Some(text.to_string()),
            Piece::Delimiter(_) => None,
        })
        .collect()
}

/// Single-range spans of an expression
pub fn spans(expr: &str, keep_delimiters: bool) -> Vec<String> {
    selections(&expand(expr), keep_delimiters)
}

/// Ids mentioned in an expression, in order, duplicates kept
pub fn ids(expr: &str) -> Vec<&str> {
    scan(expr)
        .into_iter()
        .filter_map(|piece| match piece {
            Piece::Term(term) => Some(term.id),
            Piece::Delimiter(_) => None,
        })
        .collect()
}

/// Distribute multi-range groups so every span has one id and one range
///
/// `a1[3:5+6:7]` becomes `a1[3:5]+a1[6:7]`.
pub fn expand(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len() * 2);
    for piece in scan(expr) {
        match piece {
            Piece::Delimiter(text) => out.push_str(text),
            Piece::Term(Term {
                id,
                ranges: Some(ranges),
                ..
            }) => {
                let mut start = 0;
                for (pos, c) in ranges.char_indices() {
                    if c == '+' || c == ',' {
                        push_span(&mut out, id, &ranges[start..pos]);
                        out.push(c);
                        start = pos + 1;
                    }
                }
                push_span(&mut out, id, &ranges[start..]);
            }
            Piece::Term(term) => out.push_str(term.text),
        }
    }
    out
}

fn push_span(out: &mut String, id: &str, range: &str) {
    out.push_str(id);
    out.push('[');
    out.push_str(range);
    out.push(']');
}

/// Merge runs of bracketed spans on the same id joined by `+` or `,`
///
/// `a1[3:5]+a1[6:7]` becomes `a1[3:5+6:7]`.
pub fn compress(expr: &str) -> String {
    let pieces = scan(expr);
    let mut out = String::with_capacity(expr.len());
    let mut i = 0;

    while i < pieces.len() {
        let term = match pieces[i] {
            Piece::Term(term @ Term {
                ranges: Some(_), ..
            }) => term,
            Piece::Term(term) => {
                out.push_str(term.text);
                i += 1;
                continue;
            }
            Piece::Delimiter(text) => {
                out.push_str(text);
                i += 1;
                continue;
            }
        };

        let mut group = String::from(term.ranges.unwrap_or_default());
        let mut next = i + 1;
        while let (Some(Piece::Delimiter(delim)), Some(Piece::Term(following))) =
            (pieces.get(next), pieces.get(next + 1))
        {
            let joinable = matches!(*delim, "+" | ",");
            match following.ranges {
                Some(ranges) if joinable && following.id == term.id => {
                    group.push_str(delim);
                    group.push_str(ranges);
                    next += 2;
                }
                _ => break,
            }
        }
        push_span(&mut out, term.id, &group);
        i = next;
    }
    out
}
