//! Selector expression AST.
//!
//! Every node records its range relative to the parsed string, so callers can
//! shift it into document coordinates by adding the attribute value offset.

use crate::base::{Name, TextRange, TextSize};

use super::SyntaxError;

/// An identifier token together with its range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub text: Name,
    pub range: TextRange,
}

impl Ident {
    pub fn new(text: impl Into<Name>, range: TextRange) -> Self {
        Self {
            text: text.into(),
            range,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// What a single path step selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    /// `Name` - a named child.
    Identifier,
    /// `$this`
    This,
    /// `$parent`
    Parent,
    /// `$root`
    Root,
    /// `$sibling-Name`
    Sibling,
    /// `$layer`
    Layer,
    /// `$ancestor[key=value]`
    Ancestor,
    /// `$Name` - a registered handle.
    Custom,
}

impl SelectorKind {
    /// The keyword spelling, for kinds that have one.
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            SelectorKind::This => Some("$this"),
            SelectorKind::Parent => Some("$parent"),
            SelectorKind::Root => Some("$root"),
            SelectorKind::Sibling => Some("$sibling"),
            SelectorKind::Layer => Some("$layer"),
            SelectorKind::Ancestor => Some("$ancestor"),
            SelectorKind::Identifier | SelectorKind::Custom => None,
        }
    }

    /// Returns true if `word` (without the leading `$`) is a reserved selector keyword.
    pub fn is_keyword(word: &str) -> bool {
        matches!(
            word,
            "this" | "parent" | "root" | "sibling" | "layer" | "ancestor"
        )
    }
}

/// Filter key accepted inside `$ancestor[...]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AncestorFilter {
    /// `type=` - the frame type name must match exactly.
    Type,
    /// `oftype=` - the frame type must derive from the named type or class.
    OfType,
    /// `name=` - the ancestor's own name must match.
    Name,
}

impl AncestorFilter {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "type" => Some(Self::Type),
            "oftype" => Some(Self::OfType),
            "name" => Some(Self::Name),
            _ => None,
        }
    }
}

/// One `key=value` pair of a bracketed selector parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorParam {
    pub key: Ident,
    pub value: Ident,
    pub range: TextRange,
}

impl SelectorParam {
    pub fn filter(&self) -> Option<AncestorFilter> {
        AncestorFilter::from_key(&self.key.text)
    }
}

/// A single step of a path selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorFragment {
    pub kind: SelectorKind,
    /// Child name for identifiers, handle name for custom selectors,
    /// target name for `$sibling-Name`; `None` for the other keywords.
    pub name: Option<Ident>,
    pub params: Vec<SelectorParam>,
    pub range: TextRange,
}

impl SelectorFragment {
    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().map(Ident::as_str)
    }
}

/// A slash-separated sequence of selector fragments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathSelector {
    pub path: Vec<SelectorFragment>,
    pub range: TextRange,
    pub diagnostics: Vec<SyntaxError>,
}

impl PathSelector {
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Index of the fragment covering `offset` (range ends are inclusive).
    pub fn selection_index_at(&self, offset: TextSize) -> Option<usize> {
        self.path
            .iter()
            .position(|f| f.range.start() <= offset && offset <= f.range.end())
    }

    /// Source text of every fragment, sliced out of the string that was parsed.
    pub fn fragment_texts<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.path
            .iter()
            .map(|f| {
                text.get(usize::from(f.range.start())..usize::from(f.range.end()))
                    .unwrap_or("")
            })
            .collect()
    }
}

/// `<pathSelector>.<propertyName>`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropertyBindExpr {
    pub target: PathSelector,
    pub property: Option<Ident>,
    pub range: TextRange,
    /// Diagnostics of the whole expression, including the nested path's.
    pub diagnostics: Vec<SyntaxError>,
}

impl PropertyBindExpr {
    pub fn property_name(&self) -> Option<&str> {
        self.property.as_ref().map(Ident::as_str)
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}
