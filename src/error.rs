//! Error types for schema loading and document parsing.
//!
//! Problems inside a layout document are never errors: they are reported as
//! [`crate::hir::Diagnostic`]s. The types here cover inputs that cannot be
//! turned into a model at all.

use thiserror::Error;

/// Errors raised while compiling a schema definition into a registry.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The definition source is not valid JSON for the definition format.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Two definitions of the same kind share a name.
    #[error("Duplicate {kind}: {name}")]
    Duplicate { kind: &'static str, name: String },

    /// A definition refers to a name that is not defined.
    #[error("Unknown {kind} \"{name}\" referenced from {from}")]
    UnknownReference {
        kind: &'static str,
        name: String,
        from: String,
    },

    /// A type or class chain loops back on itself.
    #[error("Inheritance cycle through {kind} \"{name}\"")]
    InheritanceCycle { kind: &'static str, name: String },

    /// A pattern simple type carries an invalid regular expression.
    #[error("Invalid pattern in simple type \"{ty}\": {source}")]
    Pattern {
        ty: String,
        #[source]
        source: regex::Error,
    },

    /// A property name occurs twice within the class chain of one frame type.
    #[error("Property \"{property}\" is defined more than once in frame type \"{frame_type}\"")]
    DuplicateFrameProperty { frame_type: String, property: String },

    /// The definition lacks its document root element.
    #[error("Missing required {0}")]
    Missing(&'static str),
}

impl SchemaError {
    pub fn duplicate(kind: &'static str, name: impl Into<String>) -> Self {
        Self::Duplicate {
            kind,
            name: name.into(),
        }
    }

    pub fn unknown(kind: &'static str, name: impl Into<String>, from: impl Into<String>) -> Self {
        Self::UnknownReference {
            kind,
            name: name.into(),
            from: from.into(),
        }
    }
}

/// Errors raised by the XML front-end.
#[derive(Debug, Error)]
pub enum XmlError {
    /// Malformed XML.
    #[error("XML syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    /// A tag or attribute name is not valid UTF-8.
    #[error("Invalid UTF-8 in {0}")]
    Encoding(&'static str),
}

impl XmlError {
    pub fn syntax(offset: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            offset,
            message: message.into(),
        }
    }
}
