//! Lexical analysis for Fend source text.
//!
//! [`Scanner`] walks the source bytes once and hands out tokens lazily. A bad
//! character or an unclosed string does not stop it: the error is yielded in
//! place of a token and the next call picks up right after the problem. The
//! stream always finishes with one `EOF` token carrying the last line number.
//!
//! Comments come in two forms. `//` runs to the end of the line; `/* */`
//! may contain further `/* */` pairs and only ends once every one of them is
//! closed. Input that ends inside a block comment is simply the end of input.
//!
//! ```rust
//! use fend::scanner::Scanner;
//!
//! let kinds: Vec<String> = Scanner::new("var x = 1; /* note */")
//!     .filter_map(Result::ok)
//!     .map(|token| token.token_type.name().to_string())
//!     .collect();
//!
//! assert_eq!(kinds, ["VAR", "IDENTIFIER", "EQUAL", "NUMBER", "SEMICOLON", "EOF"]);
//! ```

use crate::error::{FendError, Result};
use crate::token::{Token, TokenType};
use log::{debug, info};
use memchr::memchr;
use phf::phf_map;
use std::iter::FusedIterator;

// Reserved words; anything else matching the identifier shape is an IDENTIFIER.

static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"and"    => TokenType::AND,
    b"class"  => TokenType::CLASS,
    b"else"   => TokenType::ELSE,
    b"false"  => TokenType::FALSE,
    b"for"    => TokenType::FOR,
    b"func"   => TokenType::FUNC,
    b"if"     => TokenType::IF,
    b"null"   => TokenType::NULL,
    b"or"     => TokenType::OR,
    b"print"  => TokenType::PRINT,
    b"return" => TokenType::RETURN,
    b"parent" => TokenType::PARENT,
    b"this"   => TokenType::THIS,
    b"true"   => TokenType::TRUE,
    b"var"    => TokenType::VAR,
    b"while"  => TokenType::WHILE,
};

/// Lazy tokenizer over one piece of Fend source.
pub struct Scanner<'a> {
    source: &'a str,
    src: &'a [u8],
    /// Byte offset where the lexeme being scanned begins.
    start: usize,
    /// Next byte to look at.
    curr: usize,
    line: usize,
    /// Kind decided by `scan_token`, `None` after whitespace or a comment.
    pending: Option<TokenType>,
}

impl<'a> Scanner<'a> {
    /// Start scanning at the first byte of `source`, on line 1.
    #[inline]
    pub fn new(source: &'a str) -> Self {
        info!("Scanner created over {} bytes", source.len());

        Self {
            source,
            src: source.as_bytes(),
            start: 0,
            curr: 0,
            line: 1,
            pending: None,
        }
    }

    #[inline(always)]
    const fn len(&self) -> usize {
        self.src.len()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.len()
    }

    /// Consume the next byte. Only called when input remains.
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.src[self.curr];
        self.curr += 1;
        b
    }

    /// The next byte, or NUL once input is exhausted.
    #[inline(always)]
    fn peek(&self) -> u8 {
        if self.is_at_end() {
            0
        } else {
            self.src[self.curr]
        }
    }

    /// The byte after [`Self::peek`], NUL when there is none.
    #[inline(always)]
    fn peek_next(&self) -> u8 {
        if self.curr + 1 >= self.len() {
            0
        } else {
            self.src[self.curr + 1]
        }
    }

    /// Consume the next byte only when it equals `expected`.
    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume one lexeme. Sets `pending` when it forms a token; leaves it
    /// empty for whitespace and comments.
    fn scan_token(&mut self) -> Result<()> {
        let b = self.advance();

        match b {
            b'(' => self.pending = Some(TokenType::LEFT_PAREN),
            b')' => self.pending = Some(TokenType::RIGHT_PAREN),
            b'{' => self.pending = Some(TokenType::LEFT_BRACE),
            b'}' => self.pending = Some(TokenType::RIGHT_BRACE),
            b',' => self.pending = Some(TokenType::COMMA),
            b'.' => self.pending = Some(TokenType::DOT),
            b'-' => self.pending = Some(TokenType::MINUS),
            b'+' => self.pending = Some(TokenType::PLUS),
            b';' => self.pending = Some(TokenType::SEMICOLON),
            b'*' => self.pending = Some(TokenType::STAR),

            // one byte, or two when followed by '='
            b'!' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::BANG_EQUAL
                } else {
                    TokenType::BANG
                };

                self.pending = Some(tt);
            }

            b'=' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::EQUAL_EQUAL
                } else {
                    TokenType::EQUAL
                };

                self.pending = Some(tt);
            }

            b'<' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::LESS_EQUAL
                } else {
                    TokenType::LESS
                };

                self.pending = Some(tt);
            }

            b'>' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::GREATER_EQUAL
                } else {
                    TokenType::GREATER
                };

                self.pending = Some(tt);
            }

            b' ' | b'\r' | b'\t' => {
                return Ok(());
            }

            b'\n' => {
                self.line += 1;

                return Ok(());
            }

            b'/' => {
                if self.match_byte(b'/') {
                    // stop on the newline so it still bumps `line`
                    if let Some(pos) = memchr(b'\n', &self.src[self.curr..]) {
                        self.curr += pos;
                    } else {
                        self.curr = self.len();
                    }

                    return Ok(());
                }

                if self.match_byte(b'*') {
                    self.skip_block_comment();

                    return Ok(());
                }

                self.pending = Some(TokenType::SLASH);
            }

            b'"' => {
                return self.parse_string();
            }

            b'0'..=b'9' => {
                self.parse_number();
            }

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                self.parse_identifier();
            }

            _ => {
                // skip the whole UTF-8 sequence, not one byte of it
                let ch = self.source[self.start..].chars().next().unwrap_or('\u{FFFD}');
                self.curr = self.start + ch.len_utf8();

                return Err(FendError::lex(
                    self.line,
                    format!("Unexpected character: {}", ch),
                ));
            }
        }

        Ok(())
    }

    /// Skip to the `*/` matching an already consumed `/*`, counting nested
    /// openers. Hitting end of input just returns.
    fn skip_block_comment(&mut self) {
        let mut depth: usize = 1;

        while depth > 0 {
            if self.is_at_end() {
                debug!("Unterminated block comment ends at line {}", self.line);
                return;
            }

            match (self.peek(), self.peek_next()) {
                (b'*', b'/') => {
                    self.curr += 2;
                    depth -= 1;
                }

                (b'/', b'*') => {
                    self.curr += 2;
                    depth += 1;
                }

                (b'\n', _) => {
                    self.line += 1;
                    self.curr += 1;
                }

                _ => {
                    self.curr += 1;
                }
            }
        }
    }

    /// Body of a string literal; the opening quote is already consumed.
    /// Newlines are allowed inside.
    fn parse_string(&mut self) -> Result<()> {
        while !self.is_at_end() && self.peek() != b'"' {
            if self.advance() == b'\n' {
                self.line += 1;
            }
        }

        if self.is_at_end() {
            return Err(FendError::lex(self.line, "Unterminated string."));
        }

        self.advance();

        // quotes are single bytes, so these offsets are char boundaries
        let s: &str = &self.source[self.start + 1..self.curr - 1];

        self.pending = Some(TokenType::STRING(s.to_owned()));

        Ok(())
    }

    /// Digits, optionally followed by `.` and more digits. A trailing `.`
    /// is left for the next token.
    fn parse_number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let s: &str = &self.source[self.start..self.curr];
        let n: f64 = s.parse::<f64>().unwrap_or(0.0);
        self.pending = Some(TokenType::NUMBER(n));
    }

    /// Identifier or reserved word.
    fn parse_identifier(&mut self) {
        while {
            let c: u8 = self.peek();
            c.is_ascii_alphanumeric() || c == b'_'
        } {
            self.advance();
        }

        let slice: &[u8] = &self.src[self.start..self.curr];

        let tt: TokenType = KEYWORDS
            .get(slice)
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER);

        self.pending = Some(tt);
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.curr <= self.len() {
            if self.curr == self.len() {
                // moving past the end marks EOF as delivered
                self.curr += 1;
                return Some(Ok(Token::new(TokenType::EOF, "", self.line)));
            }

            self.start = self.curr;
            self.pending = None;

            if let Err(e) = self.scan_token() {
                return Some(Err(e));
            }

            if let Some(tt) = self.pending.take() {
                let lex: &str = &self.source[self.start..self.curr];
                debug!("Scanned token ({:?}) on line {}", tt, self.line);

                return Some(Ok(Token::new(tt, lex, self.line)));
            }
        }

        None
    }
}

impl<'a> FusedIterator for Scanner<'a> {}

/// Scan `source` completely, splitting tokens from lexical errors.
///
/// The token vector always ends with a single `EOF` token.
pub fn scan(source: &str) -> (Vec<Token>, Vec<FendError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    for item in Scanner::new(source) {
        match item {
            Ok(token) => tokens.push(token),
            Err(e) => errors.push(e),
        }
    }

    info!(
        "Scanned {} token(s) with {} error(s)",
        tokens.len(),
        errors.len()
    );

    (tokens, errors)
}
