//! Arena indexes.
//!
//! Every graph in the crate (schema tables, element trees, the desc namespace,
//! the effective hierarchy) is stored in a `Vec` and linked by these ids;
//! parent links are plain ids, never owning pointers.

macro_rules! arena_id {
    ($($(#[$meta:meta])* $name:ident;)*) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(u32);

            impl $name {
                pub(crate) fn from_index(index: usize) -> Self {
                    Self(u32::try_from(index).unwrap_or(u32::MAX))
                }

                pub fn index(self) -> usize {
                    self.0 as usize
                }
            }
        )*
    };
}

arena_id! {
    /// A simple (leaf) type in the schema registry.
    SimpleTypeId;
    /// A complex (element contract) type in the schema registry.
    ComplexTypeId;
    /// A child-element slot in the schema registry.
    ElementDefId;
    FrameClassId;
    FramePropertyId;
    FrameTypeId;
    /// An element of one [`crate::syntax::XmlDocument`].
    ElementId;
    /// An entry of the desc namespace.
    DescId;
    /// A node of the cached effective hierarchy.
    UiNodeId;
}
