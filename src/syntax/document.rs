//! Element tree of one layout document.
//!
//! This is the contract between an XML front-end and the semantic layers:
//! elements carry byte offsets into the document text, an ordered attribute
//! map and their children. The schema binder fills in `sdef`/`stype`.

use indexmap::IndexMap;
use text_size::{TextRange, TextSize};

use crate::base::{ComplexTypeId, DocumentId, ElementDefId, ElementId, Name};

/// An element of a specific document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementRef {
    pub document: DocumentId,
    pub element: ElementId,
}

impl ElementRef {
    pub fn new(document: DocumentId, element: ElementId) -> Self {
        Self { document, element }
    }
}

/// One attribute occurrence.
///
/// `value_start` is the offset of the opening quote; the value text itself
/// starts one byte later. `value` is unescaped; `escapes` holds
/// `(unescaped, raw)` offset pairs, relative to the value, at both edges of
/// every entity reference so value offsets can be mapped back to the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttr {
    pub name: Name,
    pub value: String,
    pub start: TextSize,
    pub end: TextSize,
    pub value_start: TextSize,
    pub escapes: Vec<(TextSize, TextSize)>,
}

impl XmlAttr {
    /// An attribute written as `name="value"` starting at `start`.
    pub fn new(name: impl Into<Name>, value: impl Into<String>, start: TextSize) -> Self {
        let name = name.into();
        let value = value.into();
        let value_start = start + crate::base::offset(name.len() + 1);
        let end = value_start + crate::base::offset(value.len() + 2);
        Self {
            name,
            value,
            start,
            end,
            value_start,
            escapes: Vec::new(),
        }
    }

    pub fn name_range(&self) -> TextRange {
        TextRange::at(self.start, crate::base::offset(self.name.len()))
    }

    /// The quoted value, quotes included.
    pub fn value_range(&self) -> TextRange {
        TextRange::new(self.value_start, self.end.max(self.value_start))
    }

    /// Offset of the first byte of the unquoted value.
    pub fn value_offset(&self) -> TextSize {
        self.value_start + TextSize::new(1)
    }

    /// Map an offset within `value` to a document offset.
    pub fn source_offset(&self, at: TextSize) -> TextSize {
        let i = self.escapes.partition_point(|&(unescaped, _)| unescaped <= at);
        let (unescaped, raw) = match i {
            0 => (TextSize::new(0), TextSize::new(0)),
            _ => self.escapes[i - 1],
        };
        self.value_offset() + raw + (at - unescaped)
    }

    /// Map a document offset between the quotes back into `value`.
    pub fn value_position(&self, at: TextSize) -> Option<TextSize> {
        let start = self.value_offset();
        let end = self.end.checked_sub(TextSize::new(1))?;
        if at < start || at > end {
            return None;
        }
        let rel = at - start;
        let i = self.escapes.partition_point(|&(_, raw)| raw <= rel);
        let (unescaped, raw) = match i {
            0 => (TextSize::new(0), TextSize::new(0)),
            _ => self.escapes[i - 1],
        };
        let limit = self
            .escapes
            .get(i)
            .map_or(TextSize::of(self.value.as_str()), |&(next, _)| next);
        Some((unescaped + (rel - raw)).min(limit))
    }

    /// Map a range within `value` to document coordinates.
    pub fn source_range(&self, range: TextRange) -> TextRange {
        TextRange::new(self.source_offset(range.start()), self.source_offset(range.end()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub tag: Name,
    pub start: TextSize,
    pub end: TextSize,
    pub start_tag_end: TextSize,
    pub closed: bool,
    pub attributes: IndexMap<Name, XmlAttr>,
    pub children: Vec<ElementId>,
    pub parent: Option<ElementId>,
    pub sdef: Option<ElementDefId>,
    pub stype: Option<ComplexTypeId>,
}

impl XmlElement {
    pub fn new(tag: impl Into<Name>, start: TextSize) -> Self {
        Self {
            tag: tag.into(),
            start,
            end: start,
            start_tag_end: start,
            closed: false,
            attributes: IndexMap::new(),
            children: Vec::new(),
            parent: None,
            sdef: None,
            stype: None,
        }
    }

    pub fn with_attr(mut self, attr: XmlAttr) -> Self {
        self.attributes.insert(attr.name.clone(), attr);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&XmlAttr> {
        self.attributes.get(name)
    }

    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attr(name).map(|a| a.value.as_str())
    }

    /// The `name` attribute, if present.
    pub fn name(&self) -> Option<&str> {
        self.attr_value("name")
    }

    pub fn range(&self) -> TextRange {
        TextRange::new(self.start, self.end.max(self.start))
    }

    pub fn start_tag_range(&self) -> TextRange {
        TextRange::new(self.start, self.start_tag_end.max(self.start))
    }

    pub fn is_bound(&self) -> bool {
        self.stype.is_some()
    }
}

/// A parsed layout document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    id: DocumentId,
    path: String,
    elements: Vec<XmlElement>,
    root: Option<ElementId>,
}

impl XmlDocument {
    pub fn new(id: DocumentId, path: impl Into<String>) -> Self {
        Self {
            id,
            path: path.into(),
            elements: Vec::new(),
            root: None,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Name of the File desc this document declares: the file stem of its path.
    pub fn desc_name(&self) -> &str {
        let file = self.path.rsplit(['/', '\\']).next().unwrap_or(&self.path);
        match file.rfind('.') {
            Some(dot) if dot > 0 => &file[..dot],
            _ => file,
        }
    }

    pub fn root(&self) -> Option<ElementId> {
        self.root
    }

    pub fn element(&self, id: ElementId) -> &XmlElement {
        &self.elements[id.index()]
    }

    pub fn element_mut(&mut self, id: ElementId) -> &mut XmlElement {
        &mut self.elements[id.index()]
    }

    pub fn get(&self, id: ElementId) -> Option<&XmlElement> {
        self.elements.get(id.index())
    }

    pub fn element_ref(&self, id: ElementId) -> ElementRef {
        ElementRef::new(self.id, id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Append an element. Without a parent it becomes the document root
    /// (the first one wins).
    pub fn push(&mut self, parent: Option<ElementId>, mut element: XmlElement) -> ElementId {
        let id = ElementId::from_index(self.elements.len());
        element.parent = parent;
        self.elements.push(element);
        match parent {
            Some(parent) => self.elements[parent.index()].children.push(id),
            None => {
                if self.root.is_none() {
                    self.root = Some(id);
                }
            }
        }
        id
    }

    pub fn children(&self, id: ElementId) -> impl Iterator<Item = (ElementId, &XmlElement)> + '_ {
        self.element(id)
            .children
            .iter()
            .map(move |&child| (child, self.element(child)))
    }

    /// Ancestors of an element, nearest first (the element itself excluded).
    pub fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(self.element(id).parent, move |&p| self.element(p).parent)
    }

    /// All elements below the root in document order.
    pub fn descendants(&self) -> Vec<ElementId> {
        let mut out = Vec::with_capacity(self.elements.len());
        let mut stack: Vec<ElementId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.element(id).children.iter().rev().copied());
        }
        out
    }

    /// The innermost element whose range contains `offset`.
    pub fn element_at(&self, offset: TextSize) -> Option<ElementId> {
        let mut current = self.root.filter(|&r| self.element(r).range().contains_inclusive(offset))?;
        'descend: loop {
            for &child in &self.element(current).children {
                if self.element(child).range().contains_inclusive(offset) {
                    current = child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }
}
