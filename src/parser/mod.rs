//! Selector and property-bind mini-languages
//!
//! Attribute values of selector-typed attributes are written in a small path
//! language:
//!
//! ```text
//! $parent/Panel/$sibling-Label       relative path
//! $root/GameUI/Main/Button           absolute path through the desc namespace
//! $ancestor[type=Button]/Icon        filtered ancestor walk
//! $MyHandle/Child                    registered handle
//! $parent/Button.Visible             property bind (path + property)
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Attribute value
//!     ↓
//! Lexer (logos) → Tokens with TokenKind
//!     ↓
//! Parser → PathSelector / PropertyBindExpr + SyntaxErrors
//! ```
//!
//! Both entry points are pure functions. Every range they produce is relative
//! to the parsed string; callers add the attribute value offset.

mod ast;
mod error;
mod lexer;
mod selector;

pub use ast::{
    AncestorFilter, Ident, PathSelector, PropertyBindExpr, SelectorFragment, SelectorKind,
    SelectorParam,
};
pub use error::{ErrorCode, SyntaxError};
pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use selector::{parse_path_selector, parse_property_bind};
