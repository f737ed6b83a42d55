//! Semantic model: desc namespace, effective hierarchy and checking.
//!
//! ## Key Types
//!
//! - [`DescIndex`] - workspace-wide desc namespace, constants and handles
//! - [`UiTree`] / [`UiBuilder`] - cached effective hierarchy
//! - [`UiNavigator`] - selector evaluation on that hierarchy
//! - [`LayoutChecker`] - per-document diagnostics
//!
//! ## Layers
//!
//! ```text
//! XmlDocument (bound)
//!     │  DescIndex::sync_document
//!     ▼
//! DescIndex ──── IndexChanges ───▶ UiTree::invalidate
//!     │
//!     ▼
//! UiBuilder / UiNavigator           template= / file= links followed lazily
//!     │
//!     ▼
//! check_file(document)              diagnostics
//! ```

mod checker;
mod context;
mod diagnostics;
mod hierarchy;
mod index;

pub use checker::{DescResolvedSelection, LayoutChecker, check_file, resolve_desc_path};
pub use context::{AnalysisContext, DocumentMap};
pub use diagnostics::{Diagnostic, DiagnosticCollector, RelatedInfo, Severity, codes};
pub use hierarchy::{UiBuilder, UiNavigator, UiNode, UiNodeData, UiSelection, UiTree};
pub use index::{ConstantDecl, DeclSite, DescIndex, DescKind, DescNamespace, Handle, IndexChanges};
