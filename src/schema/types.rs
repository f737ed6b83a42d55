//! Schema type model: simple types, complex types and element slots.

use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use serde::Deserialize;

use crate::base::{ComplexTypeId, ElementDefId, Name, SimpleTypeId};

// ============================================================================
// Simple types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimpleTypeKind {
    #[default]
    Default,
    Enumeration,
    Flags,
    Pattern,
    Union,
}

/// The primitive (or reference) kind a simple type is built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum BuiltinType {
    #[default]
    Unknown,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int8,
    Int16,
    Int32,
    Int64,
    Real32,
    String,
    Boolean,
    FileDescName,
    DescName,
    DescTemplateName,
    FrameReference,
    AnimationName,
    EventName,
    StateGroupName,
    StateGroupStateName,
    PropertyName,
    PropertyValue,
    Mixed,
    Image,
    Color,
    Text,
    Hotkey,
    Sound,
    Style,
    Handle,
    ConstantName,
    DescInternal,
}

impl BuiltinType {
    /// Inclusive value range of integer kinds.
    pub fn int_range(self) -> Option<(i128, i128)> {
        let range = match self {
            BuiltinType::Uint8 => (0, u8::MAX as i128),
            BuiltinType::Uint16 => (0, u16::MAX as i128),
            BuiltinType::Uint32 => (0, u32::MAX as i128),
            BuiltinType::Uint64 => (0, u64::MAX as i128),
            BuiltinType::Int8 => (i8::MIN as i128, i8::MAX as i128),
            BuiltinType::Int16 => (i16::MIN as i128, i16::MAX as i128),
            BuiltinType::Int32 => (i32::MIN as i128, i32::MAX as i128),
            BuiltinType::Int64 => (i64::MIN as i128, i64::MAX as i128),
            _ => return None,
        };
        Some(range)
    }

    /// Values of these kinds are written in the path selector language.
    pub fn is_selector(self) -> bool {
        matches!(
            self,
            BuiltinType::DescName
                | BuiltinType::DescTemplateName
                | BuiltinType::FrameReference
                | BuiltinType::DescInternal
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    pub name: Name,
    pub label: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SimpleType {
    pub name: Name,
    pub kind: SimpleTypeKind,
    pub builtin: BuiltinType,
    /// Empty values are accepted.
    pub nullable: bool,
    /// Frame class a `DescInternal` reference must resolve to.
    pub internal_type: Option<Name>,
    /// Keyed by lowercased member name.
    pub enumeration: IndexMap<String, EnumMember>,
    /// Anchored regular expressions; a value must match one of them.
    pub patterns: Vec<Regex>,
    pub union: Vec<SimpleTypeId>,
    pub label: Option<String>,
}

impl SimpleType {
    pub fn enum_member(&self, value: &str) -> Option<&EnumMember> {
        self.enumeration.get(&value.to_lowercase())
    }
}

// ============================================================================
// Complex types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: Name,
    pub ty: SimpleTypeId,
    pub required: bool,
    pub default: Option<String>,
    pub label: Option<String>,
    pub documentation: Option<String>,
}

/// A wildcard attribute rule: any attribute whose name matches `key` may
/// appear, and its value must match `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndeterminateAttr {
    pub key: SimpleTypeId,
    pub value: SimpleTypeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComplexTypeFlags {
    pub is_struct: bool,
    pub read_only: bool,
    pub allow_extra_attrs: bool,
}

/// Which base contributed each inherited attribute and element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplexTypeInheritance {
    pub from: IndexMap<Name, ComplexTypeId>,
    pub attrs: IndexMap<Name, ComplexTypeId>,
    pub elements: IndexMap<Name, ComplexTypeId>,
}

/// Attributes and elements declared by the type itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplexTypeOrigin {
    pub attrs: IndexSet<Name>,
    pub elements: IndexSet<Name>,
}

/// Attribute and child-element contract of an element, with its base
/// types already flattened in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexType {
    pub name: Name,
    pub attributes: IndexMap<Name, Attribute>,
    pub indeterminate_attributes: Vec<IndeterminateAttr>,
    pub elements: IndexMap<Name, ElementDefId>,
    pub flags: ComplexTypeFlags,
    pub inheritance: ComplexTypeInheritance,
    pub origin: ComplexTypeOrigin,
    pub label: Option<String>,
    pub documentation: Option<String>,
}

impl ComplexType {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn element(&self, name: &str) -> Option<ElementDefId> {
        self.elements.get(name).copied()
    }

    /// The base type that contributed `attr`, or `None` if declared here.
    pub fn attr_origin(&self, attr: &str) -> Option<ComplexTypeId> {
        self.inheritance.attrs.get(attr).copied()
    }
}

// ============================================================================
// Element slots
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum ElementDefKind {
    #[default]
    Unknown,
    Desc,
    RequiredDefines,
    DescFlags,
    Include,
    Constant,
    Frame,
    FrameProperty,
    Animation,
    AnimationEvent,
    AnimationController,
    AnimationControllerKey,
    StateGroup,
    StateGroupDefaultState,
    StateGroupState,
    StateGroupStateCondition,
    StateGroupStateAction,
}

impl ElementDefKind {
    /// Element kinds that declare an entry in the desc namespace.
    pub fn declares_desc(self) -> bool {
        matches!(
            self,
            ElementDefKind::Frame | ElementDefKind::Animation | ElementDefKind::StateGroup
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDef {
    pub name: Name,
    pub kind: ElementDefKind,
    pub ty: ComplexTypeId,
    /// Concrete types selected by the element's `type=` attribute.
    pub alternate_types: Option<IndexMap<Name, ComplexTypeId>>,
    pub label: Option<String>,
    pub documentation: Option<String>,
}
