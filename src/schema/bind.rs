//! Assigns schema slots and types to the elements of a document.

use crate::base::{ElementDefId, ElementId};
use crate::syntax::XmlDocument;

use super::SchemaRegistry;

/// Bind every element of `doc` to its element slot (`sdef`) and concrete
/// complex type (`stype`).
///
/// The root binds when its tag matches the schema's root element; children
/// bind through their parent's type by tag. Elements without a slot, and
/// everything below them, stay unbound.
pub fn bind_document(schema: &SchemaRegistry, doc: &mut XmlDocument) {
    for id in doc.descendants() {
        let element = doc.element_mut(id);
        element.sdef = None;
        element.stype = None;
    }

    let Some(root) = doc.root() else {
        return;
    };
    let root_def = schema.file_root();
    if doc.element(root).tag != schema.element_def(root_def).name {
        tracing::debug!(path = doc.path(), tag = %doc.element(root).tag, "root element does not match schema");
        return;
    }

    let mut stack: Vec<(ElementId, ElementDefId)> = vec![(root, root_def)];
    let mut bound = 0usize;
    while let Some((id, def)) = stack.pop() {
        let ty = schema.element_type(def, doc.element(id).attr_value("type"));
        let element = doc.element_mut(id);
        element.sdef = Some(def);
        element.stype = Some(ty);
        bound += 1;

        let complex = schema.complex_type(ty);
        for &child in doc.element(id).children.iter().rev() {
            if let Some(child_def) = complex.element(&doc.element(child).tag) {
                stack.push((child, child_def));
            }
        }
    }
    tracing::trace!(path = doc.path(), bound, "bound document to schema");
}
