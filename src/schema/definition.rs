//! Serialized schema definition format.
//!
//! A definition lists every type by name; references between them are
//! resolved when the definition is compiled into a
//! [`SchemaRegistry`](super::SchemaRegistry).

use indexmap::IndexMap;
use serde::Deserialize;

use super::types::{BuiltinType, ComplexTypeFlags, ElementDefKind, SimpleTypeKind};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDefinition {
    /// The document root element (`<Desc>`).
    pub root: RootDef,
    #[serde(default)]
    pub simple_types: Vec<SimpleTypeDef>,
    #[serde(default)]
    pub complex_types: Vec<ComplexTypeDef>,
    #[serde(default)]
    pub frame_classes: Vec<FrameClassDef>,
    #[serde(default)]
    pub frame_types: Vec<FrameTypeDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RootDef {
    pub element: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleTypeDef {
    pub name: String,
    #[serde(default)]
    pub kind: SimpleTypeKind,
    #[serde(default)]
    pub builtin: BuiltinType,
    #[serde(default)]
    pub nullable: bool,
    pub internal_type: Option<String>,
    #[serde(default)]
    pub members: Vec<EnumMemberDef>,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub union: Vec<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnumMemberDef {
    pub name: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexTypeDef {
    pub name: String,
    /// Base types, flattened in order.
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub flags: ComplexTypeFlags,
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
    #[serde(default)]
    pub indeterminate: Vec<IndeterminateDef>,
    #[serde(default)]
    pub elements: Vec<ElementDefDef>,
    pub label: Option<String>,
    pub documentation: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttributeDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub required: bool,
    pub default: Option<String>,
    pub label: Option<String>,
    pub documentation: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndeterminateDef {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElementDefDef {
    pub name: String,
    #[serde(default)]
    pub kind: ElementDefKind,
    #[serde(rename = "type")]
    pub ty: String,
    /// `type=` discriminator value -> complex type name.
    #[serde(default)]
    pub alternates: IndexMap<String, String>,
    pub label: Option<String>,
    pub documentation: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameClassDef {
    pub name: String,
    pub parent: Option<String>,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub properties: Vec<FramePropertyDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FramePropertyDef {
    pub name: String,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub table: bool,
    pub table_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameTypeDef {
    pub name: String,
    /// Most derived class of the frame type.
    pub class: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub blizz_only: bool,
    pub custom_desc: Option<String>,
}
