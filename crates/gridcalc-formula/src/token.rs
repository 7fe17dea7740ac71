//! Formula tokenizer
//!
//! Splits the body of a formula (the text after `=`) into typed tokens. The
//! lexer is permissive by default: characters it does not recognise are
//! skipped. [`LexMode::Strict`] reports them instead.

use crate::error::{FormulaError, FormulaResult};
use std::fmt;

/// Token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Number,
    CellRef,
    Operator,
    LeftParen,
    RightParen,
    Function,
}

/// A classified fragment of a formula expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new<S: Into<String>>(kind: TokenKind, text: S) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn number<S: Into<String>>(text: S) -> Self {
        Self::new(TokenKind::Number, text)
    }

    pub fn cell_ref<S: Into<String>>(text: S) -> Self {
        Self::new(TokenKind::CellRef, text)
    }

    pub fn operator(op: char) -> Self {
        Self::new(TokenKind::Operator, op.to_string())
    }

    pub fn function<S: Into<String>>(text: S) -> Self {
        Self::new(TokenKind::Function, text)
    }

    pub fn left_paren() -> Self {
        Self::new(TokenKind::LeftParen, "(")
    }

    pub fn right_paren() -> Self {
        Self::new(TokenKind::RightParen, ")")
    }

    pub fn is_operator(&self) -> bool {
        self.kind == TokenKind::Operator
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// How the tokenizer treats characters outside the formula alphabet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexMode {
    /// Skip them silently
    #[default]
    Permissive,
    /// Fail with [`FormulaError::UnexpectedCharacter`]
    Strict,
}

/// Characters that are always skipped, in both modes
const SEPARATORS: &[char] = &[','];

/// Tokenize an expression, skipping unrecognised characters
pub fn tokenize(expression: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = Lexer::new(expression);
    while let Some(scanned) = lexer.next_token() {
        if let Scanned::Token(token) = scanned {
            tokens.push(token);
        }
    }
    tokens
}

/// Tokenize an expression, rejecting unrecognised characters
pub fn tokenize_strict(expression: &str) -> FormulaResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut lexer = Lexer::new(expression);
    while let Some(scanned) = lexer.next_token() {
        match scanned {
            Scanned::Token(token) => tokens.push(token),
            Scanned::Skipped { ch, position } => {
                return Err(FormulaError::UnexpectedCharacter { ch, position });
            }
        }
    }
    Ok(tokens)
}

/// Tokenize with the given mode
pub fn tokenize_with(expression: &str, mode: LexMode) -> FormulaResult<Vec<Token>> {
    match mode {
        LexMode::Permissive => Ok(tokenize(expression)),
        LexMode::Strict => tokenize_strict(expression),
    }
}

/// Check the `[A-Z]+[0-9]+` reference shape
pub fn is_cell_reference(text: &str) -> bool {
    let digits = text.trim_start_matches(|c: char| c.is_ascii_uppercase());
    digits.len() < text.len() && !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

enum Scanned {
    Token(Token),
    Skipped { ch: char, position: usize },
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn next_token(&mut self) -> Option<Scanned> {
        loop {
            self.skip_whitespace();
            let c = self.peek_char()?;

            if SEPARATORS.contains(&c) {
                self.advance();
                continue;
            }

            let token = match c {
                'A'..='Z' => self.scan_identifier_or_ref(),
                '0'..='9' | '.' => self.scan_number(),
                '+' | '-' | '*' | '/' | '^' => {
                    self.advance();
                    Token::operator(c)
                }
                '(' => {
                    self.advance();
                    Token::left_paren()
                }
                ')' => {
                    self.advance();
                    Token::right_paren()
                }
                _ => {
                    let position = self.pos;
                    self.advance();
                    return Some(Scanned::Skipped { ch: c, position });
                }
            };

            return Some(Scanned::Token(token));
        }
    }

    fn scan_identifier_or_ref(&mut self) -> Token {
        let start = self.pos;
        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_uppercase() || c.is_ascii_digit())
        {
            self.advance();
        }

        let text = &self.input[start..self.pos];
        if is_cell_reference(text) {
            Token::cell_ref(text)
        } else {
            Token::function(text)
        }
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;
        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_digit() || c == '.')
        {
            self.advance();
        }
        Token::number(&self.input[start..self.pos])
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }
}
