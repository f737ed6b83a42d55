//! Diagnostics: semantic problems found in a layout document.
//!
//! Ranges are byte ranges into the document text. Conversion to line and
//! column happens at the edge through [`LineIndex`](crate::base::LineIndex).

use std::sync::Arc;

use crate::base::{DocumentId, TextRange};
use crate::parser::SyntaxError;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    /// Informational; the document still works as written.
    Message,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Message => 3,
        }
    }
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub range: TextRange,
    pub severity: Severity,
    /// Error code (e.g., "E0001").
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
    pub related: Vec<RelatedInfo>,
}

/// A second location that explains a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedInfo {
    pub document: DocumentId,
    pub range: TextRange,
    pub message: Arc<str>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self {
            range,
            severity: Severity::Error,
            code: None,
            message: message.into(),
            related: Vec::new(),
        }
    }

    /// Create a new informational diagnostic.
    pub fn message(range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self {
            severity: Severity::Message,
            ..Self::error(range, message)
        }
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Add related information.
    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl From<&SyntaxError> for Diagnostic {
    fn from(error: &SyntaxError) -> Self {
        Diagnostic::error(error.range, error.message.as_str()).with_code(error.code.as_str())
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard diagnostic codes for semantic errors.
///
/// ## Error Code Ranges
///
/// - **E0001-E0099**: Schema conformance (values, attributes, elements)
/// - **E0101-E0499**: Selector syntax, see [`ErrorCode`](crate::parser::ErrorCode)
/// - **E0501-E0599**: Desc namespace and hierarchy resolution
#[allow(dead_code)]
pub mod codes {
    // ========================================================================
    // SCHEMA CONFORMANCE (E0001-E0099)
    // ========================================================================

    /// Attribute value does not satisfy its simple type.
    pub const INVALID_VALUE: &str = "E0001";

    /// A required attribute is absent.
    pub const MISSING_REQUIRED_ATTRIBUTE: &str = "E0002";

    /// Attribute not declared by the element's type.
    pub const UNKNOWN_ATTRIBUTE: &str = "E0003";

    /// Child element without a slot in its parent's type.
    pub const UNKNOWN_ELEMENT: &str = "E0004";

    /// A wildcard attribute rule was never matched.
    pub const MISSING_SPECIAL_ATTRIBUTE: &str = "E0005";

    /// Attribute name rejected by a wildcard rule's key type.
    pub const INVALID_ATTRIBUTE_NAME: &str = "E0006";

    // ========================================================================
    // NAMESPACE RESOLUTION (E0501-E0599)
    // ========================================================================

    /// `$Name` / `#Name` refers to no constant.
    pub const UNDECLARED_CONSTANT: &str = "E0501";

    /// Property bind names a property no frame class has.
    pub const UNKNOWN_PROPERTY: &str = "E0502";

    /// Empty path where a desc path is required.
    pub const PATH_NOT_SPECIFIED: &str = "E0503";

    /// `template=` names no desc.
    pub const TEMPLATE_NOT_FOUND: &str = "E0504";

    /// `template=` names a whole File desc.
    pub const FILE_AS_TEMPLATE: &str = "E0505";

    /// Desc path does not resolve.
    pub const UNRESOLVED_DESC: &str = "E0506";

    /// Desc path resolves to a frame of the wrong class.
    pub const DESC_TYPE_MISMATCH: &str = "E0507";

    /// `file=` names no File desc.
    pub const FILE_DESC_NOT_FOUND: &str = "E0508";

    /// `file=` File desc lacks the named desc.
    pub const DESC_NOT_IN_FILE: &str = "E0509";

    /// Same-named sibling declared twice in one document.
    pub const CHILD_REDECLARED: &str = "E0510";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during analysis.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new diagnostic collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Report an error with a code.
    pub fn error(&mut self, range: TextRange, code: &'static str, message: impl Into<Arc<str>>) {
        self.add(Diagnostic::error(range, message).with_code(code));
    }

    /// Report an informational message with a code.
    pub fn message(&mut self, range: TextRange, code: &'static str, message: impl Into<Arc<str>>) {
        self.add(Diagnostic::message(range, message).with_code(code));
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Get all collected diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get the number of errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Clear all diagnostics.
    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }
}
