//! Logos-based lexer for selector expressions
//!
//! Fast tokenization using the logos crate.

use logos::Logos;
use text_size::{TextRange, TextSize};

/// Token kinds of the selector language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Whitespace,
    This,
    Parent,
    Root,
    Layer,
    Sibling,
    Ancestor,
    Handle,
    Ident,
    Slash,
    LBracket,
    RBracket,
    Eq,
    Comma,
    Dot,
    At,
    Minus,
    Error,
}

impl TokenKind {
    pub fn is_trivia(&self) -> bool {
        matches!(self, TokenKind::Whitespace)
    }
}

/// A token with its kind, text, and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub range: TextRange,
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let span = self.inner.span();
        let range = TextRange::new(
            TextSize::new(span.start as u32),
            TextSize::new(span.end as u32),
        );

        let kind = match logos_token {
            Ok(t) => t.into(),
            Err(()) => TokenKind::Error,
        };

        Some(Token {
            kind,
            text: self.inner.slice(),
            range,
        })
    }
}

/// Tokenize an entire string, dropping whitespace.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).filter(|t| !t.kind.is_trivia()).collect()
}

/// Logos token enum - maps to TokenKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum LogosToken {
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    // Keywords win over the handle regex on equal length.
    #[token("$this")]
    This,

    #[token("$parent")]
    Parent,

    #[token("$root")]
    Root,

    #[token("$layer")]
    Layer,

    #[token("$sibling")]
    Sibling,

    #[token("$ancestor")]
    Ancestor,

    #[regex(r"\$[A-Za-z0-9_]+")]
    Handle,

    #[regex(r"[A-Za-z0-9_]+")]
    Ident,

    #[token("/")]
    Slash,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("=")]
    Eq,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("@")]
    At,

    #[token("-")]
    Minus,
}

impl From<LogosToken> for TokenKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Whitespace => TokenKind::Whitespace,
            LogosToken::This => TokenKind::This,
            LogosToken::Parent => TokenKind::Parent,
            LogosToken::Root => TokenKind::Root,
            LogosToken::Layer => TokenKind::Layer,
            LogosToken::Sibling => TokenKind::Sibling,
            LogosToken::Ancestor => TokenKind::Ancestor,
            LogosToken::Handle => TokenKind::Handle,
            LogosToken::Ident => TokenKind::Ident,
            LogosToken::Slash => TokenKind::Slash,
            LogosToken::LBracket => TokenKind::LBracket,
            LogosToken::RBracket => TokenKind::RBracket,
            LogosToken::Eq => TokenKind::Eq,
            LogosToken::Comma => TokenKind::Comma,
            LogosToken::Dot => TokenKind::Dot,
            LogosToken::At => TokenKind::At,
            LogosToken::Minus => TokenKind::Minus,
        }
    }
}
