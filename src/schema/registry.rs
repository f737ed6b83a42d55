//! Schema registry: compiled, immutable schema tables.

use indexmap::IndexMap;
use regex::Regex;
use rustc_hash::FxHashMap;

use crate::base::{
    ComplexTypeId, ElementDefId, FrameClassId, FramePropertyId, FrameTypeId, Name, SimpleTypeId,
};
use crate::error::SchemaError;

use super::definition::SchemaDefinition;
use super::frame::{FrameClass, FrameProperty, FrameType};
use super::types::{
    Attribute, ComplexType, ElementDef, ElementDefKind, EnumMember, IndeterminateAttr, SimpleType,
    SimpleTypeKind,
};

/// Every type, element slot, frame class and frame type of one schema.
///
/// Inheritance is flattened while the registry is built; lookups never walk
/// base types.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    simple_types: Vec<SimpleType>,
    simple_by_name: FxHashMap<Name, SimpleTypeId>,
    complex_types: Vec<ComplexType>,
    complex_by_name: FxHashMap<Name, ComplexTypeId>,
    element_defs: Vec<ElementDef>,
    frame_classes: Vec<FrameClass>,
    frame_class_by_name: IndexMap<Name, FrameClassId>,
    properties: Vec<FrameProperty>,
    frame_type_list: Vec<FrameType>,
    frame_types: IndexMap<Name, FrameTypeId>,
    frame_class_props: IndexMap<Name, Vec<FramePropertyId>>,
    frame_type_by_complex: FxHashMap<ComplexTypeId, FrameTypeId>,
    property_by_element: FxHashMap<ElementDefId, FramePropertyId>,
    file_root: ElementDefId,
}

impl SchemaRegistry {
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        let definition: SchemaDefinition = serde_json::from_str(text)?;
        Self::from_definition(&definition)
    }

    pub fn from_definition(definition: &SchemaDefinition) -> Result<Self, SchemaError> {
        let registry = SchemaBuilder::new(definition).build()?;
        tracing::debug!(
            simple_types = registry.simple_types.len(),
            complex_types = registry.complex_types.len(),
            element_defs = registry.element_defs.len(),
            frame_types = registry.frame_type_list.len(),
            "compiled schema"
        );
        Ok(registry)
    }

    // ========================================================================
    // Arena access
    // ========================================================================

    pub fn simple_type(&self, id: SimpleTypeId) -> &SimpleType {
        &self.simple_types[id.index()]
    }

    pub fn complex_type(&self, id: ComplexTypeId) -> &ComplexType {
        &self.complex_types[id.index()]
    }

    pub fn element_def(&self, id: ElementDefId) -> &ElementDef {
        &self.element_defs[id.index()]
    }

    pub fn frame_class(&self, id: FrameClassId) -> &FrameClass {
        &self.frame_classes[id.index()]
    }

    pub fn property(&self, id: FramePropertyId) -> &FrameProperty {
        &self.properties[id.index()]
    }

    pub fn frame_type_data(&self, id: FrameTypeId) -> &FrameType {
        &self.frame_type_list[id.index()]
    }

    pub fn simple_type_by_name(&self, name: &str) -> Option<SimpleTypeId> {
        self.simple_by_name.get(name).copied()
    }

    pub fn complex_type_by_name(&self, name: &str) -> Option<ComplexTypeId> {
        self.complex_by_name.get(name).copied()
    }

    pub fn frame_class_by_name(&self, name: &str) -> Option<FrameClassId> {
        self.frame_class_by_name.get(name).copied()
    }

    pub fn frame_type_by_name(&self, name: &str) -> Option<&FrameType> {
        self.frame_types.get(name).map(|&id| self.frame_type_data(id))
    }

    /// Element slot of a document's root element.
    pub fn file_root(&self) -> ElementDefId {
        self.file_root
    }

    pub fn file_root_type(&self) -> ComplexTypeId {
        self.element_def(self.file_root).ty
    }

    // ========================================================================
    // Frame model queries
    // ========================================================================

    /// The frame type whose declarations use `ty`.
    pub fn frame_type(&self, ty: ComplexTypeId) -> Option<&FrameType> {
        self.frame_type_id(ty).map(|id| self.frame_type_data(id))
    }

    pub fn frame_type_id(&self, ty: ComplexTypeId) -> Option<FrameTypeId> {
        self.frame_type_by_complex.get(&ty).copied()
    }

    /// The frame property an element slot sets, if it is a property slot.
    pub fn frame_property(&self, def: ElementDefId) -> Option<&FrameProperty> {
        self.property_by_element
            .get(&def)
            .map(|&id| self.property(id))
    }

    /// First property of that name across all frame classes.
    pub fn property_by_name(&self, name: &str) -> Option<&FrameProperty> {
        self.frame_class_props
            .get(name)
            .and_then(|ids| ids.first())
            .map(|&id| self.property(id))
    }

    /// Property binds are accepted in the `val` attribute of property elements.
    pub fn is_property_bind_allowed(&self, def: ElementDefId, ty: ComplexTypeId, attr: &str) -> bool {
        attr == "val"
            && self.frame_property(def).is_some()
            && self.complex_type(ty).attributes.contains_key(attr)
    }

    /// Properties grouped by name across every frame class.
    pub fn frame_class_props(&self) -> &IndexMap<Name, Vec<FramePropertyId>> {
        &self.frame_class_props
    }

    pub fn frame_types(&self) -> &IndexMap<Name, FrameTypeId> {
        &self.frame_types
    }

    /// The concrete type of an element in slot `def`, given its `type=` value.
    ///
    /// Frames select the complex type of the named frame type; other slots
    /// consult their alternate types. Anything else uses the declared type.
    pub fn element_type(&self, def: ElementDefId, type_attr: Option<&str>) -> ComplexTypeId {
        let def = self.element_def(def);
        if let Some(value) = type_attr {
            if def.kind == ElementDefKind::Frame {
                if let Some(frame_type) = self.frame_type_by_name(value) {
                    return frame_type.complex_type;
                }
            }
            if let Some(&alternate) = def.alternate_types.as_ref().and_then(|alts| alts.get(value)) {
                return alternate;
            }
        }
        def.ty
    }
}

// ============================================================================
// Builder
// ============================================================================

struct SchemaBuilder<'a> {
    def: &'a SchemaDefinition,
    simple_types: Vec<SimpleType>,
    simple_by_name: FxHashMap<Name, SimpleTypeId>,
    complex_by_name: FxHashMap<Name, ComplexTypeId>,
    element_defs: Vec<ElementDef>,
}

impl<'a> SchemaBuilder<'a> {
    fn new(def: &'a SchemaDefinition) -> Self {
        Self {
            def,
            simple_types: Vec::new(),
            simple_by_name: FxHashMap::default(),
            complex_by_name: FxHashMap::default(),
            element_defs: Vec::new(),
        }
    }

    fn build(mut self) -> Result<SchemaRegistry, SchemaError> {
        let def = self.def;
        self.build_simple_types()?;
        let complex_types = self.build_complex_types()?;

        let root_ty = self.complex_id(&def.root.ty, "root")?;
        let file_root = self.push_element_def(ElementDef {
            name: def.root.element.as_str().into(),
            kind: ElementDefKind::Desc,
            ty: root_ty,
            alternate_types: None,
            label: None,
            documentation: None,
        });

        let mut registry = SchemaRegistry {
            simple_types: self.simple_types,
            simple_by_name: self.simple_by_name,
            complex_types,
            complex_by_name: self.complex_by_name,
            element_defs: self.element_defs,
            frame_classes: Vec::new(),
            frame_class_by_name: IndexMap::new(),
            properties: Vec::new(),
            frame_type_list: Vec::new(),
            frame_types: IndexMap::new(),
            frame_class_props: IndexMap::new(),
            frame_type_by_complex: FxHashMap::default(),
            property_by_element: FxHashMap::default(),
            file_root,
        };
        build_frame_classes(def, &mut registry)?;
        build_frame_types(def, &mut registry)?;
        Ok(registry)
    }

    fn simple_id(&self, name: &str, from: &str) -> Result<SimpleTypeId, SchemaError> {
        self.simple_by_name
            .get(name)
            .copied()
            .ok_or_else(|| SchemaError::unknown("simple type", name, from))
    }

    fn complex_id(&self, name: &str, from: &str) -> Result<ComplexTypeId, SchemaError> {
        self.complex_by_name
            .get(name)
            .copied()
            .ok_or_else(|| SchemaError::unknown("complex type", name, from))
    }

    fn push_element_def(&mut self, def: ElementDef) -> ElementDefId {
        let id = ElementDefId::from_index(self.element_defs.len());
        self.element_defs.push(def);
        id
    }

    fn build_simple_types(&mut self) -> Result<(), SchemaError> {
        let def = self.def;
        for (i, st) in def.simple_types.iter().enumerate() {
            if self
                .simple_by_name
                .insert(st.name.as_str().into(), SimpleTypeId::from_index(i))
                .is_some()
            {
                return Err(SchemaError::duplicate("simple type", &st.name));
            }
        }

        for st in &def.simple_types {
            let enumeration = st
                .members
                .iter()
                .map(|m| {
                    (
                        m.name.to_lowercase(),
                        EnumMember {
                            name: m.name.as_str().into(),
                            label: m.label.clone(),
                        },
                    )
                })
                .collect();

            let patterns = st
                .patterns
                .iter()
                .map(|p| {
                    Regex::new(&format!("^(?:{p})$")).map_err(|source| SchemaError::Pattern {
                        ty: st.name.clone(),
                        source,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let union = st
                .union
                .iter()
                .map(|member| self.simple_id(member, &st.name))
                .collect::<Result<Vec<_>, _>>()?;
            if st.kind == SimpleTypeKind::Union && union.contains(&self.simple_id(&st.name, &st.name)?) {
                return Err(SchemaError::InheritanceCycle {
                    kind: "simple type",
                    name: st.name.clone(),
                });
            }

            self.simple_types.push(SimpleType {
                name: st.name.as_str().into(),
                kind: st.kind,
                builtin: st.builtin,
                nullable: st.nullable,
                internal_type: st.internal_type.as_deref().map(Name::from),
                enumeration,
                patterns,
                union,
                label: st.label.clone(),
            });
        }
        Ok(())
    }

    fn build_complex_types(&mut self) -> Result<Vec<ComplexType>, SchemaError> {
        let def = self.def;
        let count = def.complex_types.len();
        for (i, ct) in def.complex_types.iter().enumerate() {
            if self
                .complex_by_name
                .insert(ct.name.as_str().into(), ComplexTypeId::from_index(i))
                .is_some()
            {
                return Err(SchemaError::duplicate("complex type", &ct.name));
            }
        }

        let mut built: Vec<Option<ComplexType>> = vec![None; count];
        let mut visiting = vec![false; count];
        for i in 0..count {
            self.flatten(i, &mut built, &mut visiting)?;
        }
        Ok(built.into_iter().flatten().collect())
    }

    /// Build complex type `index` after its bases, merging their attributes
    /// and elements and recording where each came from.
    fn flatten(
        &mut self,
        index: usize,
        built: &mut Vec<Option<ComplexType>>,
        visiting: &mut Vec<bool>,
    ) -> Result<(), SchemaError> {
        if built[index].is_some() {
            return Ok(());
        }
        let definition = self.def;
        let def = &definition.complex_types[index];
        if visiting[index] {
            return Err(SchemaError::InheritanceCycle {
                kind: "complex type",
                name: def.name.clone(),
            });
        }
        visiting[index] = true;

        let mut ty = ComplexType {
            name: def.name.as_str().into(),
            attributes: IndexMap::new(),
            indeterminate_attributes: Vec::new(),
            elements: IndexMap::new(),
            flags: def.flags,
            inheritance: Default::default(),
            origin: Default::default(),
            label: def.label.clone(),
            documentation: def.documentation.clone(),
        };

        for base_name in &def.extends {
            let base_id = self.complex_id(base_name, &def.name)?;
            self.flatten(base_id.index(), built, visiting)?;
            let Some(base) = built[base_id.index()].as_ref() else {
                continue;
            };

            ty.inheritance.from.insert(base.name.clone(), base_id);
            for (name, attr) in &base.attributes {
                let from = base.inheritance.attrs.get(name).copied().unwrap_or(base_id);
                ty.attributes.insert(name.clone(), attr.clone());
                ty.inheritance.attrs.insert(name.clone(), from);
            }
            for (name, &element) in &base.elements {
                let from = base.inheritance.elements.get(name).copied().unwrap_or(base_id);
                ty.elements.insert(name.clone(), element);
                ty.inheritance.elements.insert(name.clone(), from);
            }
            ty.indeterminate_attributes
                .extend(base.indeterminate_attributes.iter().copied());
            ty.flags.allow_extra_attrs |= base.flags.allow_extra_attrs;
        }

        for attr in &def.attributes {
            let name: Name = attr.name.as_str().into();
            let attribute = Attribute {
                name: name.clone(),
                ty: self.simple_id(&attr.ty, &def.name)?,
                required: attr.required,
                default: attr.default.clone(),
                label: attr.label.clone(),
                documentation: attr.documentation.clone(),
            };
            ty.attributes.insert(name.clone(), attribute);
            ty.inheritance.attrs.shift_remove(&name);
            ty.origin.attrs.insert(name);
        }

        for rule in &def.indeterminate {
            ty.indeterminate_attributes.push(IndeterminateAttr {
                key: self.simple_id(&rule.key, &def.name)?,
                value: self.simple_id(&rule.value, &def.name)?,
            });
        }

        for el in &def.elements {
            let name: Name = el.name.as_str().into();
            let alternate_types = if el.alternates.is_empty() {
                None
            } else {
                let mut alternates = IndexMap::new();
                for (key, ty_name) in &el.alternates {
                    alternates.insert(Name::from(key.as_str()), self.complex_id(ty_name, &el.name)?);
                }
                Some(alternates)
            };
            let element = self.push_element_def(ElementDef {
                name: name.clone(),
                kind: el.kind,
                ty: self.complex_id(&el.ty, &def.name)?,
                alternate_types,
                label: el.label.clone(),
                documentation: el.documentation.clone(),
            });
            ty.elements.insert(name.clone(), element);
            ty.inheritance.elements.shift_remove(&name);
            ty.origin.elements.insert(name);
        }

        visiting[index] = false;
        built[index] = Some(ty);
        Ok(())
    }
}

fn build_frame_classes(def: &SchemaDefinition, registry: &mut SchemaRegistry) -> Result<(), SchemaError> {
    for (i, class) in def.frame_classes.iter().enumerate() {
        if registry
            .frame_class_by_name
            .insert(class.name.as_str().into(), FrameClassId::from_index(i))
            .is_some()
        {
            return Err(SchemaError::duplicate("frame class", &class.name));
        }
    }

    for (i, class) in def.frame_classes.iter().enumerate() {
        let class_id = FrameClassId::from_index(i);
        let parent = match &class.parent {
            Some(parent) => Some(
                registry
                    .frame_class_by_name(parent)
                    .ok_or_else(|| SchemaError::unknown("frame class", parent, &class.name))?,
            ),
            None => None,
        };
        let ty = registry
            .complex_type_by_name(&class.ty)
            .ok_or_else(|| SchemaError::unknown("complex type", &class.ty, &class.name))?;

        let mut properties = IndexMap::new();
        for prop in &class.properties {
            let element = registry
                .complex_type(ty)
                .element(&prop.name)
                .ok_or_else(|| SchemaError::unknown("element", &prop.name, &class.name))?;
            let id = FramePropertyId::from_index(registry.properties.len());
            let name: Name = prop.name.as_str().into();
            registry.properties.push(FrameProperty {
                name: name.clone(),
                element,
                class: class_id,
                read_only: prop.read_only,
                is_table: prop.table,
                table_key: prop.table_key.as_deref().map(Name::from),
            });
            properties.insert(name.clone(), id);
            registry.frame_class_props.entry(name).or_default().push(id);
            registry.property_by_element.entry(element).or_insert(id);
        }

        registry.frame_classes.push(FrameClass {
            name: class.name.as_str().into(),
            parent,
            ty,
            properties,
        });
    }

    // a parent chain longer than the class count must loop
    for class in &registry.frame_classes {
        let mut steps = 0;
        let mut current = class.parent;
        while let Some(id) = current {
            steps += 1;
            if steps > registry.frame_classes.len() {
                return Err(SchemaError::InheritanceCycle {
                    kind: "frame class",
                    name: class.name.to_string(),
                });
            }
            current = registry.frame_class(id).parent;
        }
    }
    Ok(())
}

fn build_frame_types(def: &SchemaDefinition, registry: &mut SchemaRegistry) -> Result<(), SchemaError> {
    for ft in &def.frame_types {
        let id = FrameTypeId::from_index(registry.frame_type_list.len());
        let primary = registry
            .frame_class_by_name(&ft.class)
            .ok_or_else(|| SchemaError::unknown("frame class", &ft.class, &ft.name))?;
        let complex_type = registry
            .complex_type_by_name(&ft.ty)
            .ok_or_else(|| SchemaError::unknown("complex type", &ft.ty, &ft.name))?;
        let custom_desc = match &ft.custom_desc {
            Some(name) => Some(
                registry
                    .complex_type_by_name(name)
                    .ok_or_else(|| SchemaError::unknown("complex type", name, &ft.name))?,
            ),
            None => None,
        };

        let mut classes = IndexMap::new();
        let mut properties = IndexMap::new();
        let mut current = Some(primary);
        while let Some(class_id) = current {
            let class = registry.frame_class(class_id);
            classes.insert(class.name.clone(), class_id);
            for (name, &prop) in &class.properties {
                if properties.insert(name.clone(), prop).is_some() {
                    return Err(SchemaError::DuplicateFrameProperty {
                        frame_type: ft.name.clone(),
                        property: name.to_string(),
                    });
                }
            }
            current = class.parent;
        }

        if registry.frame_types.insert(ft.name.as_str().into(), id).is_some() {
            return Err(SchemaError::duplicate("frame type", &ft.name));
        }
        registry.frame_type_by_complex.entry(complex_type).or_insert(id);
        if let Some(custom) = custom_desc {
            registry.frame_type_by_complex.entry(custom).or_insert(id);
        }
        registry.frame_type_list.push(FrameType {
            name: ft.name.as_str().into(),
            blizz_only: ft.blizz_only,
            custom_desc,
            classes,
            properties,
            complex_type,
        });
    }
    Ok(())
}
