//! Nominal frame class hierarchy layered over complex types.

use indexmap::IndexMap;

use crate::base::{ComplexTypeId, ElementDefId, FrameClassId, FramePropertyId, Name};

/// A settable property of a frame class (`<Visible val="..."/>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameProperty {
    pub name: Name,
    /// The element slot a property is written as.
    pub element: ElementDefId,
    pub class: FrameClassId,
    pub read_only: bool,
    pub is_table: bool,
    pub table_key: Option<Name>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameClass {
    pub name: Name,
    pub parent: Option<FrameClassId>,
    /// Complex type whose elements hold this class's property slots.
    pub ty: ComplexTypeId,
    pub properties: IndexMap<Name, FramePropertyId>,
}

/// Everything a frame kind (`type="Button"`) can do: its full class chain,
/// the union of their properties, and the type its declarations use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameType {
    pub name: Name,
    pub blizz_only: bool,
    pub custom_desc: Option<ComplexTypeId>,
    /// Class chain, most derived first.
    pub classes: IndexMap<Name, FrameClassId>,
    pub properties: IndexMap<Name, FramePropertyId>,
    pub complex_type: ComplexTypeId,
}

impl FrameType {
    /// The class the frame type is declared with.
    pub fn primary_class(&self) -> Option<FrameClassId> {
        self.classes.values().next().copied()
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn property(&self, name: &str) -> Option<FramePropertyId> {
        self.properties.get(name).copied()
    }
}
