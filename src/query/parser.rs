//! Path Parser
//!
//! Recursive descent parser for path queries:
//!
//! ```text
//! Path      := ('/' | '//')? Step (('/' | '//') Step)*
//! Step      := ('.' | '..' | '@' NameTest | NameTest | Function | Group) Predicate*
//! Group     := '(' Path ('|' Path)* ')'
//! Predicate := '[' Path (('=' | '!=') String)? ']'
//! ```
//!
//! Attribute and function steps end a path.

use super::lexer::{Lexer, Token};
use crate::error::{Error, Result};
use crate::model::namespace::split_qname;

/// Parsed path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    /// Starts from the enclosing corpus
    pub absolute: bool,
    pub steps: Vec<Step>,
}

impl PathExpr {
    /// Whether evaluation may yield strings rather than nodes
    pub fn is_terminal(&self) -> bool {
        self.steps.last().is_some_and(Step::is_terminal)
    }
}

/// How a step is reached from the previous one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// `/`
    Child,
    /// `//`: the step applies to the context node and all its descendants
    DescendantOrSelf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub axis: Axis,
    pub kind: StepKind,
    pub predicates: Vec<Predicate>,
}

impl Step {
    fn is_terminal(&self) -> bool {
        match &self.kind {
            StepKind::Attribute(_) | StepKind::Function(_) => true,
            StepKind::Group(paths) => paths.iter().any(PathExpr::is_terminal),
            StepKind::SelfNode | StepKind::Parent | StepKind::Name(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepKind {
    /// `.`
    SelfNode,
    /// `..`
    Parent,
    /// Element name test, `*` for any
    Name(NameTest),
    /// `@name`, `@*`
    Attribute(NameTest),
    Function(Function),
    /// `(a | b)`
    Group(Vec<PathExpr>),
}

/// Optionally prefixed name; a local part of `*` matches any name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTest {
    pub prefix: Option<String>,
    pub local: String,
}

impl NameTest {
    fn parse(name: &str) -> Self {
        let (prefix, local) = split_qname(name);
        NameTest {
            prefix: prefix.map(str::to_string),
            local: local.to_string(),
        }
    }

    fn any() -> Self {
        NameTest {
            prefix: None,
            local: "*".to_string(),
        }
    }

    #[inline]
    pub fn is_wildcard(&self) -> bool {
        self.local == "*"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Function {
    Text,
    Value,
    /// Optional reference attribute
    Referent(Option<String>),
    Referrer(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub path: PathExpr,
    pub comparison: Option<(Comparison, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Any result equals the literal
    Eq,
    /// Every result differs from the literal
    NotEq,
}

/// Path parser
pub struct Parser<'a> {
    input: &'a str,
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Parser {
            input,
            lexer,
            current,
        }
    }

    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::path_syntax(self.input, message)
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<()> {
        if self.current == token {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("expected {}, found {:?}", what, self.current)))
        }
    }

    /// Parse a complete path
    pub fn parse(&mut self) -> Result<PathExpr> {
        if matches!(self.current, Token::Eof) {
            return Err(self.error("path is empty"));
        }
        let path = self.parse_path()?;
        match &self.current {
            Token::Eof => Ok(path),
            Token::RightBracket | Token::RightParen | Token::Pipe => {
                Err(self.error(format!("unbalanced {:?}", self.current)))
            }
            _ => Err(self.error("steps must be joined by \"/\" or \"//\"")),
        }
    }

    fn parse_path(&mut self) -> Result<PathExpr> {
        let mut absolute = false;
        let mut axis = Axis::Child;
        match self.current {
            Token::Slash => {
                absolute = true;
                self.advance();
            }
            Token::DoubleSlash => {
                absolute = true;
                axis = Axis::DescendantOrSelf;
                self.advance();
            }
            _ => {}
        }

        let mut steps = Vec::new();
        loop {
            if matches!(self.current, Token::Eof) {
                return Err(self.error("path cannot end with \"/\""));
            }
            if steps.last().is_some_and(Step::is_terminal) {
                return Err(self.error("no step may follow an attribute or a function"));
            }
            steps.push(self.parse_step(axis)?);

            axis = match self.current {
                Token::Slash => Axis::Child,
                Token::DoubleSlash => Axis::DescendantOrSelf,
                _ => return Ok(PathExpr { absolute, steps }),
            };
            self.advance();
        }
    }

    fn parse_step(&mut self, axis: Axis) -> Result<Step> {
        let kind = match self.current.clone() {
            Token::Dot => {
                self.advance();
                StepKind::SelfNode
            }
            Token::DoubleDot => {
                self.advance();
                StepKind::Parent
            }
            Token::Star => {
                self.advance();
                StepKind::Name(NameTest::any())
            }
            Token::Name(name) => {
                self.advance();
                StepKind::Name(NameTest::parse(&name))
            }
            Token::At => {
                self.advance();
                let test = match self.current.clone() {
                    Token::Star => NameTest::any(),
                    Token::Name(name) => NameTest::parse(&name),
                    other => {
                        return Err(self.error(format!("expected an attribute name, found {:?}", other)))
                    }
                };
                self.advance();
                StepKind::Attribute(test)
            }
            Token::Function(name) => {
                self.advance();
                StepKind::Function(self.parse_function(&name)?)
            }
            Token::LeftParen => {
                self.advance();
                StepKind::Group(self.parse_group()?)
            }
            other => return Err(self.error(format!("expected a step, found {:?}", other))),
        };

        let mut predicates = Vec::new();
        while matches!(self.current, Token::LeftBracket) {
            if matches!(kind, StepKind::Attribute(_) | StepKind::Function(_)) {
                return Err(self.error("attributes and functions take no predicates"));
            }
            self.advance();
            predicates.push(self.parse_predicate()?);
        }

        Ok(Step {
            axis,
            kind,
            predicates,
        })
    }

    /// Arguments of a function; the name token has been consumed
    fn parse_function(&mut self, name: &str) -> Result<Function> {
        self.expect(Token::LeftParen, "\"(\"")?;
        let argument = match self.current.clone() {
            Token::String(value) => {
                self.advance();
                Some(value)
            }
            _ => None,
        };
        self.expect(Token::RightParen, "\")\"")?;

        match (name, argument) {
            ("text", None) => Ok(Function::Text),
            ("value", None) => Ok(Function::Value),
            ("referent", attr) => Ok(Function::Referent(attr)),
            ("referrer", attr) => Ok(Function::Referrer(attr)),
            ("text" | "value", Some(_)) => Err(self.error(format!("{}() takes no argument", name))),
            _ => Err(self.error(format!("unknown function {}()", name))),
        }
    }

    /// Alternatives of a group; the opening paren has been consumed
    fn parse_group(&mut self) -> Result<Vec<PathExpr>> {
        let mut paths = vec![self.parse_path()?];
        while matches!(self.current, Token::Pipe) {
            self.advance();
            paths.push(self.parse_path()?);
        }
        self.expect(Token::RightParen, "\")\"")?;
        Ok(paths)
    }

    /// Predicate body; the opening bracket has been consumed
    fn parse_predicate(&mut self) -> Result<Predicate> {
        let path = self.parse_path()?;
        let comparison = match self.current {
            Token::Eq => Some(Comparison::Eq),
            Token::NotEq => Some(Comparison::NotEq),
            _ => None,
        };
        let comparison = match comparison {
            Some(op) => {
                self.advance();
                match self.current.clone() {
                    Token::String(literal) => {
                        self.advance();
                        Some((op, literal))
                    }
                    other => {
                        return Err(self.error(format!("expected a string literal, found {:?}", other)))
                    }
                }
            }
            None => None,
        };
        self.expect(Token::RightBracket, "\"]\"")?;
        Ok(Predicate { path, comparison })
    }
}

/// Parse a path query
pub fn parse(input: &str) -> Result<PathExpr> {
    Parser::new(input).parse()
}
