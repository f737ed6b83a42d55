//! Shared read-only view of the analysis inputs.

use rustc_hash::FxHashMap;

use crate::base::{DescId, DocumentId};
use crate::schema::{FrameType, SchemaRegistry};
use crate::syntax::{ElementRef, XmlDocument, XmlElement};

use super::index::DescIndex;

/// Documents by id.
pub type DocumentMap = FxHashMap<DocumentId, XmlDocument>;

/// Everything the resolver and checker read, borrowed together so it stays
/// consistent for the duration of one query.
#[derive(Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub schema: &'a SchemaRegistry,
    pub index: &'a DescIndex,
    pub documents: &'a DocumentMap,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(schema: &'a SchemaRegistry, index: &'a DescIndex, documents: &'a DocumentMap) -> Self {
        Self {
            schema,
            index,
            documents,
        }
    }

    pub fn document(&self, id: DocumentId) -> Option<&'a XmlDocument> {
        self.documents.get(&id)
    }

    /// The element behind a declaration site, if its document is still loaded.
    pub fn element(&self, element: ElementRef) -> Option<&'a XmlElement> {
        self.document(element.document)?.get(element.element)
    }

    /// Frame type of the declarations merged into `desc`.
    pub fn desc_frame_type(&self, desc: DescId) -> Option<&'a FrameType> {
        let stype = self.index.get_desc(desc)?.stype()?;
        self.schema.frame_type(stype)
    }
}
