//! # layout-semantics
//!
//! Semantic core for schema-typed XML UI layout documents: a schema
//! registry, the workspace-wide desc namespace, the effective UI hierarchy
//! and a checker that reports diagnostics.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → AnalysisHost, document/workspace symbols
//!   ↓
//! hir       → Desc index, UI hierarchy, checker, diagnostics
//!   ↓
//! schema    → Schema registry, binding, value validation
//!   ↓
//! syntax    → Element tree, attribute value kinds, XML front-end
//!   ↓
//! parser    → Logos lexer, path selector and property bind parser
//!   ↓
//! base      → Primitives (DocumentId, arena ids, TextRange, LineIndex)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → syntax → schema → hir → ide)
// ============================================================================

/// Foundation types: DocumentId, arena ids, TextRange
pub mod base;

/// Parser: Logos lexer, selector expressions
pub mod parser;

/// Syntax: layout element trees and the XML front-end
pub mod syntax;

/// Schema: type registry, binding and value validation
pub mod schema;

/// High-level IR: desc namespace, effective hierarchy, checker
pub mod hir;

/// IDE features: analysis host, symbols
pub mod ide;

/// Errors for inputs that cannot be loaded at all
pub mod error;

// Re-export foundation types
pub use base::{DocumentId, LineCol, LineIndex, Name, TextRange, TextSize};
pub use error::{SchemaError, XmlError};
pub use hir::{Diagnostic, Severity};
pub use ide::{Analysis, AnalysisHost};
pub use schema::SchemaRegistry;
