//! Recursive-descent parser for path selectors and property binds.

use text_size::{TextRange, TextSize};

use super::ast::{
    AncestorFilter, Ident, PathSelector, PropertyBindExpr, SelectorFragment, SelectorKind, SelectorParam,
};
use super::error::{ErrorCode, SyntaxError};
use super::lexer::{Token, TokenKind, tokenize};

/// Parse a slash-separated path selector such as `$parent/Foo/$ancestor[type=Button]`.
pub fn parse_path_selector(text: &str) -> PathSelector {
    let mut parser = Parser::new(text);
    let mut selector = parser.path(false);
    parser.trailing_garbage();
    selector.diagnostics = parser.diagnostics;
    selector
}

/// Parse `<pathSelector>.<propertyName>`.
pub fn parse_property_bind(text: &str) -> PropertyBindExpr {
    let mut parser = Parser::new(text);
    let target = parser.path(true);

    if target.is_empty() && parser.diagnostics.is_empty() {
        let at = parser.current_start();
        parser.error_at(
            TextRange::empty(at),
            "Expected selector before property name",
            ErrorCode::E0202,
        );
    }

    let property = if parser.eat(TokenKind::Dot) {
        match parser.current().cloned() {
            Some(tok) if tok.kind == TokenKind::Ident => {
                let ident = Ident::new(tok.text, tok.range);
                parser.bump();
                Some(ident)
            }
            _ => {
                let at = parser.current_start();
                parser.error_at(TextRange::empty(at), "Expected property name", ErrorCode::E0302);
                None
            }
        }
    } else {
        let at = parser.current_start();
        parser.error_at(
            TextRange::empty(at),
            "Expected \".\" followed by a property name",
            ErrorCode::E0403,
        );
        None
    };
    parser.trailing_garbage();

    let end = property
        .as_ref()
        .map(|p| p.range.end())
        .unwrap_or(target.range.end());
    PropertyBindExpr {
        range: TextRange::new(target.range.start(), end.max(target.range.start())),
        target,
        property,
        diagnostics: parser.diagnostics,
    }
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    len: TextSize,
    diagnostics: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            tokens: tokenize(text),
            pos: 0,
            len: crate::base::offset(text.len()),
            diagnostics: Vec::new(),
        }
    }

    // ========================================================================
    // Token cursor
    // ========================================================================

    fn current(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current().is_some_and(|t| t.kind == kind)
    }

    fn bump(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn current_start(&self) -> TextSize {
        self.current().map(|t| t.range.start()).unwrap_or(self.len)
    }

    fn previous_end(&self) -> TextSize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.range.end())
            .unwrap_or_default()
    }

    fn error_at(&mut self, range: TextRange, message: impl Into<String>, code: ErrorCode) {
        self.diagnostics.push(SyntaxError::new(message, range, code));
    }

    fn at_path_end(&self, in_bind: bool) -> bool {
        match self.current() {
            None => true,
            Some(tok) => in_bind && tok.kind == TokenKind::Dot,
        }
    }

    /// Skip to the next `/` (or the end of the path) without consuming it.
    fn recover(&mut self, in_bind: bool) {
        while !self.at_path_end(in_bind) && !self.at(TokenKind::Slash) {
            self.bump();
        }
    }

    fn trailing_garbage(&mut self) {
        if let Some(first) = self.current().cloned() {
            let end = self.tokens.last().map(|t| t.range.end()).unwrap_or(self.len);
            self.error_at(
                TextRange::new(first.range.start(), end),
                format!("Unexpected \"{}\"", first.text),
                ErrorCode::E0203,
            );
            self.pos = self.tokens.len();
        }
    }

    // ========================================================================
    // Grammar
    // ========================================================================

    fn path(&mut self, in_bind: bool) -> PathSelector {
        let start = self.current_start();
        let mut path = Vec::new();

        if self.at_path_end(in_bind) {
            return PathSelector {
                path,
                range: TextRange::empty(start),
                diagnostics: Vec::new(),
            };
        }

        loop {
            match self.fragment() {
                Some(fragment) => {
                    path.push(fragment);
                    if !self.at_path_end(in_bind) && !self.at(TokenKind::Slash) {
                        if let Some(tok) = self.current().cloned() {
                            self.error_at(
                                tok.range,
                                format!("Unexpected \"{}\"", tok.text),
                                ErrorCode::E0203,
                            );
                        }
                        self.recover(in_bind);
                    }
                }
                // already reported
                None => self.recover(in_bind),
            }

            if !self.at(TokenKind::Slash) {
                break;
            }
            let slash = self.current().map(|t| t.range).unwrap_or_default();
            self.bump();
            if self.at_path_end(in_bind) {
                self.error_at(
                    TextRange::empty(slash.end()),
                    "Expected selector after \"/\"",
                    ErrorCode::E0202,
                );
                break;
            }
        }

        let end = self.previous_end().max(start);
        PathSelector {
            path,
            range: TextRange::new(start, end),
            diagnostics: Vec::new(),
        }
    }

    /// Parse one fragment. On failure a diagnostic is recorded and `None` is
    /// returned; the caller resynchronizes at the next `/`.
    fn fragment(&mut self) -> Option<SelectorFragment> {
        let tok = self.current()?.clone();
        let simple = |kind| SelectorFragment {
            kind,
            name: None,
            params: Vec::new(),
            range: tok.range,
        };

        match tok.kind {
            TokenKind::Ident => {
                self.bump();
                Some(SelectorFragment {
                    name: Some(Ident::new(tok.text, tok.range)),
                    ..simple(SelectorKind::Identifier)
                })
            }
            TokenKind::Handle => {
                self.bump();
                let name_range = TextRange::new(tok.range.start() + TextSize::new(1), tok.range.end());
                Some(SelectorFragment {
                    name: Some(Ident::new(&tok.text[1..], name_range)),
                    ..simple(SelectorKind::Custom)
                })
            }
            TokenKind::This => {
                self.bump();
                Some(simple(SelectorKind::This))
            }
            TokenKind::Parent => {
                self.bump();
                Some(simple(SelectorKind::Parent))
            }
            TokenKind::Root => {
                self.bump();
                Some(simple(SelectorKind::Root))
            }
            TokenKind::Layer => {
                self.bump();
                Some(simple(SelectorKind::Layer))
            }
            TokenKind::Sibling => {
                self.bump();
                self.sibling(tok.range)
            }
            TokenKind::Ancestor => {
                self.bump();
                let params = if self.at(TokenKind::LBracket) {
                    self.params()?
                } else {
                    Vec::new()
                };
                let end = self.previous_end();
                Some(SelectorFragment {
                    params,
                    range: TextRange::new(tok.range.start(), end),
                    ..simple(SelectorKind::Ancestor)
                })
            }
            TokenKind::Slash => {
                self.error_at(TextRange::empty(tok.range.start()), "Expected selector", ErrorCode::E0202);
                None
            }
            TokenKind::Error => {
                self.error_at(tok.range, format!("Invalid character \"{}\"", tok.text), ErrorCode::E0101);
                None
            }
            _ => {
                self.error_at(tok.range, format!("Unexpected \"{}\"", tok.text), ErrorCode::E0203);
                None
            }
        }
    }

    fn sibling(&mut self, keyword: TextRange) -> Option<SelectorFragment> {
        if !self.eat(TokenKind::Minus) {
            self.error_at(keyword, "Expected \"-Name\" after $sibling", ErrorCode::E0301);
            return None;
        }
        match self.current().cloned() {
            Some(name) if name.kind == TokenKind::Ident => {
                self.bump();
                Some(SelectorFragment {
                    kind: SelectorKind::Sibling,
                    name: Some(Ident::new(name.text, name.range)),
                    params: Vec::new(),
                    range: TextRange::new(keyword.start(), name.range.end()),
                })
            }
            _ => {
                let at = self.previous_end();
                self.error_at(TextRange::empty(at), "Expected sibling name", ErrorCode::E0301);
                None
            }
        }
    }

    fn params(&mut self) -> Option<Vec<SelectorParam>> {
        let open = self.current().map(|t| t.range).unwrap_or_default();
        self.bump();
        let mut params = Vec::new();

        loop {
            let start = self.current_start();
            self.eat(TokenKind::At);

            let key = self.param_ident("Expected parameter name")?;
            if !self.eat(TokenKind::Eq) {
                let at = self.previous_end();
                self.error_at(TextRange::empty(at), "Expected \"=\"", ErrorCode::E0401);
                return None;
            }
            let value = self.param_ident("Expected parameter value")?;

            if AncestorFilter::from_key(&key.text).is_none() {
                self.error_at(
                    key.range,
                    format!("Unknown parameter \"{}\"", key.text),
                    ErrorCode::E0402,
                );
            }
            params.push(SelectorParam {
                range: TextRange::new(start, value.range.end()),
                key,
                value,
            });

            if self.eat(TokenKind::Comma) {
                continue;
            }
            if self.eat(TokenKind::RBracket) {
                return Some(params);
            }
            self.error_at(open, "Unclosed \"[\"", ErrorCode::E0201);
            return None;
        }
    }

    fn param_ident(&mut self, message: &str) -> Option<Ident> {
        match self.current().cloned() {
            Some(tok) if tok.kind == TokenKind::Ident => {
                self.bump();
                Some(Ident::new(tok.text, tok.range))
            }
            other => {
                let range = other
                    .map(|t| t.range)
                    .unwrap_or_else(|| TextRange::empty(self.len));
                self.error_at(range, message, ErrorCode::E0401);
                None
            }
        }
    }
}
