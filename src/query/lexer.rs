//! Path Lexer
//!
//! Tokenizes path queries. Tokenizing never fails: characters that start
//! no token come through as `Token::Unknown` for the parser to reject.

/// Path token types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // Operators
    Slash,       // /
    DoubleSlash, // //
    Dot,         // .
    DoubleDot,   // ..
    At,          // @
    Pipe,        // |
    Star,        // *
    Eq,          // =
    NotEq,       // !=

    // Brackets
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]

    // Literals
    String(String),

    // Names
    Name(String),     // local, prefix:local or prefix:*
    Function(String), // a name directly followed by (

    Unknown(char),

    // End of input
    Eof,
}

/// Path lexer
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.remaining().chars().nth(offset)
    }

    /// Advance by n bytes
    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance(c.len_utf8());
            } else {
                break;
            }
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let c = match self.peek() {
            Some(c) => c,
            None => return Token::Eof,
        };

        match c {
            '/' => {
                self.advance(1);
                if self.peek() == Some('/') {
                    self.advance(1);
                    Token::DoubleSlash
                } else {
                    Token::Slash
                }
            }
            '.' => {
                self.advance(1);
                if self.peek() == Some('.') {
                    self.advance(1);
                    Token::DoubleDot
                } else {
                    Token::Dot
                }
            }
            '@' => {
                self.advance(1);
                Token::At
            }
            '|' => {
                self.advance(1);
                Token::Pipe
            }
            '*' => {
                self.advance(1);
                Token::Star
            }
            '=' => {
                self.advance(1);
                Token::Eq
            }
            '!' => {
                self.advance(1);
                if self.peek() == Some('=') {
                    self.advance(1);
                    Token::NotEq
                } else {
                    Token::Unknown('!')
                }
            }
            '(' => {
                self.advance(1);
                Token::LeftParen
            }
            ')' => {
                self.advance(1);
                Token::RightParen
            }
            '[' => {
                self.advance(1);
                Token::LeftBracket
            }
            ']' => {
                self.advance(1);
                Token::RightBracket
            }
            '"' | '\'' => self.read_string(c),
            _ if is_name_start_char(c) => self.read_name(),
            _ => {
                self.advance(c.len_utf8());
                Token::Unknown(c)
            }
        }
    }

    /// Read a quoted literal; a backslash escapes the next character. An
    /// unterminated literal runs to the end of input.
    fn read_string(&mut self, quote: char) -> Token {
        self.advance(1);
        let mut value = String::new();
        while let Some(c) = self.peek() {
            self.advance(c.len_utf8());
            match c {
                '\\' => {
                    if let Some(escaped) = self.peek() {
                        self.advance(escaped.len_utf8());
                        value.push(escaped);
                    }
                }
                _ if c == quote => return Token::String(value),
                _ => value.push(c),
            }
        }
        Token::String(value)
    }

    fn read_local(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_name_char(c) {
                self.advance(c.len_utf8());
            } else {
                break;
            }
        }
        &self.input[start..self.pos]
    }

    fn read_name(&mut self) -> Token {
        let start = self.pos;
        self.read_local();

        // Namespace prefix
        if self.peek() == Some(':') {
            match self.peek_at(1) {
                Some('*') => self.advance(2),
                Some(c) if is_name_start_char(c) => {
                    self.advance(1);
                    self.read_local();
                }
                _ => {}
            }
        }
        let name = self.input[start..self.pos].to_string();

        if self.peek() == Some('(') {
            Token::Function(name)
        } else {
            Token::Name(name)
        }
    }

    /// Tokenize entire input
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            if matches!(token, Token::Eof) {
                break;
            }
            tokens.push(token);
        }
        tokens
    }
}

/// Tokenize a path
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize()
}

fn is_name_start_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}
