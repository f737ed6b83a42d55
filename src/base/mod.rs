//! Foundation types for the layout toolchain.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`DocumentId`] - Identifier of a synced layout document
//! - arena ids ([`DescId`], [`ElementId`], [`ComplexTypeId`], ...)
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`LineCol`], [`LineIndex`] - Line/column conversion
//! - [`Name`] - Cheap-to-clone identifier strings
//!
//! This module has NO dependencies on other crate modules.

mod file_id;
mod id;
mod position;

pub use file_id::DocumentId;
pub use id::{
    ComplexTypeId, DescId, ElementDefId, ElementId, FrameClassId, FramePropertyId, FrameTypeId,
    SimpleTypeId, UiNodeId,
};
pub use position::{LineCol, LineIndex};

/// Identifier text used for desc names, schema names and selector tokens.
pub type Name = smol_str::SmolStr;

// Re-export text-size types for convenience
pub use text_size::{self, TextRange, TextSize};

/// Build a [`TextRange`] from `usize` offsets.
pub fn range(start: usize, end: usize) -> TextRange {
    TextRange::new(offset(start), offset(end.max(start)))
}

/// Convert a `usize` byte offset into a [`TextSize`].
pub fn offset(value: usize) -> TextSize {
    TextSize::new(u32::try_from(value).unwrap_or(u32::MAX))
}
