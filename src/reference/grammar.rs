//! Alignment expression parser
//!
//! Recursive descent over the expression grammar:
//!
//! ```text
//! Expression := Selection (',' Selection)*
//! Selection  := Span ('+' Span)*
//! Span       := Id RangeGroup? | RangeGroup
//! RangeGroup := '[' RangeList (',' RangeList)* ']'
//! RangeList  := Range ('+' Range)*
//! Range      := Start? ':' End?
//! ```
//!
//! Whitespace between two spans separates selections. A bare range group
//! repeats the previous id.

use crate::error::{Error, Result};
use crate::model::node::is_id_char;

/// Slice bounds with slice semantics: negative counts from the end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Range {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl Range {
    /// Apply to `text`, counting characters and clipping out-of-range bounds
    pub fn slice<'t>(&self, text: &'t str) -> &'t str {
        let len = text.chars().count() as i64;
        let clip = |bound: i64| {
            if bound < 0 {
                (len + bound).max(0)
            } else {
                bound.min(len)
            }
        };
        let start = self.start.map_or(0, clip);
        let end = self.end.map_or(len, clip);
        if start >= end {
            return "";
        }
        let byte = |index: i64| {
            text.char_indices()
                .nth(index as usize)
                .map_or(text.len(), |(pos, _)| pos)
        };
        &text[byte(start)..byte(end)]
    }
}

/// One id with the ranges selected from its value
///
/// `groups` are joined by the selection delimiter, the ranges inside a
/// group by the span delimiter. No groups selects the whole value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub id: String,
    pub groups: Vec<Vec<Range>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub spans: Vec<Span>,
}

/// Parsed alignment expression
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Expression {
    pub selections: Vec<Selection>,
}

impl Expression {
    /// Parse an alignment expression
    pub fn parse(input: &str) -> Result<Self> {
        Parser::new(input).parse_expression()
    }

    /// Ids of every span, in order
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.selections
            .iter()
            .flat_map(|selection| selection.spans.iter())
            .map(|span| span.id.as_str())
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    last_id: Option<&'a str>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Parser {
            input,
            pos: 0,
            last_id: None,
        }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Skip whitespace, reporting whether any was skipped
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
        self.pos > start
    }

    fn error(&self, message: &str) -> Error {
        Error::validation(format!(
            "malformed alignment expression {:?} at {}: {}",
            self.input, self.pos, message
        ))
    }

    fn parse_expression(&mut self) -> Result<Expression> {
        let mut expression = Expression::default();
        self.skip_whitespace();
        if self.peek().is_none() {
            return Ok(expression);
        }
        loop {
            let (selection, separated) = self.parse_selection()?;
            expression.selections.push(selection);
            match self.peek() {
                None => return Ok(expression),
                Some(',') => {
                    self.pos += 1;
                    self.skip_whitespace();
                }
                Some(_) if separated => {}
                Some(c) => return Err(self.error(&format!("unexpected {:?}", c))),
            }
        }
    }

    /// Parse a selection; the flag reports trailing whitespace, which
    /// separates it from a following selection
    fn parse_selection(&mut self) -> Result<(Selection, bool)> {
        let mut spans = vec![self.parse_span()?];
        loop {
            let separated = self.skip_whitespace();
            if self.peek() == Some('+') {
                self.pos += 1;
                self.skip_whitespace();
                spans.push(self.parse_span()?);
            } else {
                return Ok((Selection { spans }, separated));
            }
        }
    }

    fn parse_span(&mut self) -> Result<Span> {
        let id = match self.peek() {
            Some(c) if c.is_ascii_alphabetic() => {
                let id = self.read_id();
                self.last_id = Some(id);
                id
            }
            Some('[') => self
                .last_id
                .ok_or_else(|| self.error("range group without a preceding id"))?,
            Some(c) => return Err(self.error(&format!("expected an id, found {:?}", c))),
            None => return Err(self.error("expected an id")),
        };
        let groups = if self.peek() == Some('[') {
            self.parse_range_group()?
        } else {
            Vec::new()
        };
        Ok(Span {
            id: id.to_string(),
            groups,
        })
    }

    fn read_id(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !is_id_char(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.input[start..self.pos]
    }

    fn parse_range_group(&mut self) -> Result<Vec<Vec<Range>>> {
        self.pos += 1; // '['
        let mut groups = Vec::new();
        let mut ranges = Vec::new();
        loop {
            self.skip_whitespace();
            ranges.push(self.parse_range()?);
            self.skip_whitespace();
            match self.peek() {
                Some('+') => self.pos += 1,
                Some(',') => {
                    self.pos += 1;
                    groups.push(std::mem::take(&mut ranges));
                }
                Some(']') => {
                    self.pos += 1;
                    groups.push(ranges);
                    return Ok(groups);
                }
                Some(c) => return Err(self.error(&format!("unexpected {:?} in range", c))),
                None => return Err(self.error("unclosed range group")),
            }
        }
    }

    fn parse_range(&mut self) -> Result<Range> {
        let start = self.parse_bound()?;
        if self.peek() != Some(':') {
            return Err(self.error("expected ':' in range"));
        }
        self.pos += 1;
        let end = self.parse_bound()?;
        Ok(Range { start, end })
    }

    fn parse_bound(&mut self) -> Result<Option<i64>> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let text = &self.input[start..self.pos];
        match text {
            "" => Ok(None),
            "-" => Err(self.error("missing digits after '-'")),
            _ => text
                .parse()
                .map(Some)
                .map_err(|_| self.error("range bound out of bounds")),
        }
    }
}
