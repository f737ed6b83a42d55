//! Schema type system
//!
//! A [`SchemaRegistry`] is compiled once from a [`SchemaDefinition`] and is
//! read-only afterwards:
//!
//! ```text
//! SchemaDefinition (serde)
//!     ↓ from_definition: resolve names, flatten inheritance
//! SchemaRegistry
//!     ├── SimpleType    leaf value types (enum / flags / pattern / union)
//!     ├── ComplexType   attribute + child element contracts
//!     ├── ElementDef    child slots, with type= alternates
//!     └── FrameClass / FrameProperty / FrameType
//! ```
//!
//! [`bind_document`] attaches slots and types to a parsed document, and
//! [`SchemaRegistry::validate_value`] checks attribute text.

mod bind;
mod definition;
mod frame;
mod registry;
mod types;
mod validate;

pub use bind::bind_document;
pub use definition::{
    AttributeDef, ComplexTypeDef, ElementDefDef, EnumMemberDef, FrameClassDef, FramePropertyDef,
    FrameTypeDef, IndeterminateDef, RootDef, SchemaDefinition, SimpleTypeDef,
};
pub use frame::{FrameClass, FrameProperty, FrameType};
pub use registry::SchemaRegistry;
pub use types::{
    Attribute, BuiltinType, ComplexType, ComplexTypeFlags, ComplexTypeInheritance,
    ComplexTypeOrigin, ElementDef, ElementDefKind, EnumMember, IndeterminateAttr, SimpleType,
    SimpleTypeKind,
};
pub use validate::ValueError;
