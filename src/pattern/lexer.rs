//! Pattern DSL lexer.
//!
//! Tokenizes pattern descriptions like `{x: 1, y} | [h, ...] | !Number`.

use crate::error::PatternFault;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LBrace,   // {
    RBrace,   // }
    LBracket, // [
    RBracket, // ]
    Comma,
    Colon,
    Pipe,     // | between union alternatives
    Negation, // !
    Wildcard, // _
    Rest,     // ...
    Guard(String),  // #name
    Symbol(String), // :name
    Int(i64),
    BigInt(i128), // 12n
    Float(f64),
    Str(String),
    Ident(String),
}

/// A token with the byte offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

pub struct Lexer<'a> {
    source: &'a str,
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            source: input,
            input: input.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.input.get(self.pos + ahead).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.input.get(self.pos).copied()?;
        self.pos += 1;
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn read_while(&mut self, pred: impl Fn(u8) -> bool) -> String {
        let start = self.pos;
        while self.pos < self.input.len() && pred(self.input[self.pos]) {
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    fn is_ident_start(ch: u8) -> bool {
        ch.is_ascii_alphabetic() || ch == b'_' || ch == b'$'
    }

    fn is_ident_char(ch: u8) -> bool {
        ch.is_ascii_alphanumeric() || ch == b'_' || ch == b'$'
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> PatternFault {
        PatternFault::Syntax {
            input: self.source.to_string(),
            offset,
            message: message.into(),
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Spanned>, PatternFault> {
        let mut tokens: Vec<Spanned> = Vec::new();

        loop {
            self.skip_whitespace();
            let offset = self.pos;
            let Some(ch) = self.peek() else { break };

            let token = match ch {
                b'{' => {
                    self.advance();
                    Token::LBrace
                }
                b'}' => {
                    self.advance();
                    Token::RBrace
                }
                b'[' => {
                    self.advance();
                    Token::LBracket
                }
                b']' => {
                    self.advance();
                    Token::RBracket
                }
                b',' => {
                    self.advance();
                    Token::Comma
                }
                b'|' => {
                    self.advance();
                    Token::Pipe
                }
                b'!' => {
                    self.advance();
                    Token::Negation
                }
                b'.' => {
                    if self.peek_at(1) == Some(b'.') && self.peek_at(2) == Some(b'.') {
                        self.pos += 3;
                        Token::Rest
                    } else {
                        return Err(self.error(offset, "expected `...`"));
                    }
                }
                b'#' => {
                    self.advance();
                    let name = self.read_while(Self::is_ident_char);
                    if name.is_empty() {
                        return Err(self.error(offset, "expected a guard name after `#`"));
                    }
                    Token::Guard(name)
                }
                b':' => {
                    self.advance();
                    // `{key: v}` keeps the colon; `:name` elsewhere is a symbol.
                    let after_key = matches!(
                        tokens.last().map(|t| &t.token),
                        Some(Token::Ident(_) | Token::Str(_) | Token::Int(_))
                    );
                    if !after_key && self.peek().is_some_and(Self::is_ident_start) {
                        Token::Symbol(self.read_while(Self::is_ident_char))
                    } else {
                        Token::Colon
                    }
                }
                b'\'' | b'"' => self.read_string(offset)?,
                _ if ch.is_ascii_digit()
                    || (ch == b'-' && self.peek_at(1).is_some_and(|c| c.is_ascii_digit())) =>
                {
                    self.read_number(offset)?
                }
                b'-' if self.source[self.pos..].starts_with("-Infinity") => {
                    self.pos += "-Infinity".len();
                    Token::Float(f64::NEG_INFINITY)
                }
                _ if Self::is_ident_start(ch) => {
                    let word = self.read_while(Self::is_ident_char);
                    if word == "_" {
                        Token::Wildcard
                    } else {
                        Token::Ident(word)
                    }
                }
                _ => {
                    return Err(self.error(offset, format!("unexpected character `{}`", ch as char)));
                }
            };
            tokens.push(Spanned { token, offset });
        }

        Ok(tokens)
    }

    fn read_string(&mut self, offset: usize) -> Result<Token, PatternFault> {
        let Some(quote) = self.advance() else {
            return Err(self.error(offset, "expected a string"));
        };
        let mut bytes = Vec::new();
        loop {
            match self.advance() {
                None => return Err(self.error(offset, "unterminated string literal")),
                Some(c) if c == quote => break,
                Some(b'\\') => match self.advance() {
                    Some(b'n') => bytes.push(b'\n'),
                    Some(b't') => bytes.push(b'\t'),
                    Some(c) => bytes.push(c),
                    None => return Err(self.error(offset, "unterminated string literal")),
                },
                Some(c) => bytes.push(c),
            }
        }
        Ok(Token::Str(String::from_utf8_lossy(&bytes).into_owned()))
    }

    fn read_number(&mut self, offset: usize) -> Result<Token, PatternFault> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        self.read_while(|c| c.is_ascii_digit() || c == b'_');
        let mut is_float = false;
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.pos += 1;
            self.read_while(|c| c.is_ascii_digit() || c == b'_');
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            is_float = true;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            self.read_while(|c| c.is_ascii_digit());
        }
        let text: String = self.source[start..self.pos]
            .chars()
            .filter(|c| *c != '_')
            .collect();

        if !is_float && self.peek() == Some(b'n') {
            self.pos += 1;
            return text
                .parse::<i128>()
                .map(Token::BigInt)
                .map_err(|_| self.error(offset, format!("invalid bigint literal `{text}n`")));
        }
        if is_float {
            text.parse::<f64>()
                .map(Token::Float)
                .map_err(|_| self.error(offset, format!("invalid number `{text}`")))
        } else {
            text.parse::<i64>()
                .map(Token::Int)
                .map_err(|_| self.error(offset, format!("integer literal `{text}` out of range")))
        }
    }
}
