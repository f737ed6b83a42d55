//! Layout document model
//!
//! The element tree handed to the semantic layers, plus classification of
//! attribute value text. With the `xml` feature (on by default) a quick-xml
//! based front-end builds the tree from source text.

mod document;
mod value;
#[cfg(feature = "xml")]
mod xml;

pub use document::{ElementRef, XmlAttr, XmlDocument, XmlElement};
pub use value::{AttrValueKind, classify_value, is_identifier};
#[cfg(feature = "xml")]
pub use xml::parse_document;
