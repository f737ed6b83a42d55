//! AnalysisHost and Analysis: unified state management for IDE features.
//!
//! The `AnalysisHost` owns all mutable state and hands out `Analysis`
//! views for querying. Documents are bound and indexed as they are set, so
//! a view never sees a half-updated index.
//!
//! ## Usage
//!
//! ```ignore
//! let mut host = AnalysisHost::new(schema);
//!
//! // Apply file changes
//! let id = host.set_file_content("UI/GameUI.SC2Layout", text)?;
//!
//! // Query
//! let mut analysis = host.analysis();
//! let diagnostics = analysis.check_file(id);
//! let symbols = analysis.document_symbols(id);
//! ```

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::base::{DescId, DocumentId, TextSize};
use crate::hir::{
    AnalysisContext, DescIndex, DescResolvedSelection, Diagnostic, DocumentMap, UiNavigator, UiTree,
    check_file, resolve_desc_path,
};
use crate::parser::parse_path_selector;
use crate::schema::{SchemaRegistry, bind_document};
use crate::syntax::XmlDocument;

use super::{GotoResult, SymbolInfo, document_symbols, goto_definition, workspace_symbols};

/// Owns all mutable state for the IDE layer.
///
/// Apply changes via `set_document()` / `set_file_content()` and
/// `remove_document()`, then query through `analysis()`.
pub struct AnalysisHost {
    schema: Arc<SchemaRegistry>,
    documents: DocumentMap,
    index: DescIndex,
    /// Effective hierarchy cache, invalidated on every index change.
    tree: UiTree,
    /// Map from file path to DocumentId
    file_id_map: FxHashMap<String, DocumentId>,
    /// Reverse map from DocumentId to file path
    file_path_map: FxHashMap<DocumentId, String>,
    next_id: u32,
}

impl AnalysisHost {
    pub fn new(schema: impl Into<Arc<SchemaRegistry>>) -> Self {
        Self {
            schema: schema.into(),
            documents: DocumentMap::default(),
            index: DescIndex::new(),
            tree: UiTree::new(),
            file_id_map: FxHashMap::default(),
            file_path_map: FxHashMap::default(),
            next_id: 0,
        }
    }

    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    /// Replace the schema: every document is re-bound and the index rebuilt.
    pub fn set_schema(&mut self, schema: impl Into<Arc<SchemaRegistry>>) {
        self.schema = schema.into();
        self.index = DescIndex::new();
        self.tree.clear();

        let mut ids: Vec<DocumentId> = self.documents.keys().copied().collect();
        ids.sort();
        for id in ids {
            if let Some(doc) = self.documents.get_mut(&id) {
                bind_document(&self.schema, doc);
                self.index.sync_document(&self.schema, doc);
            }
        }
        tracing::info!(documents = self.documents.len(), "schema replaced, index rebuilt");
    }

    /// The id for `path`, allocating one on first use.
    pub fn allocate_document_id(&mut self, path: &str) -> DocumentId {
        if let Some(&id) = self.file_id_map.get(path) {
            return id;
        }
        let id = DocumentId::new(self.next_id);
        self.next_id += 1;
        self.file_id_map.insert(path.to_string(), id);
        self.file_path_map.insert(id, path.to_string());
        id
    }

    /// Add or replace a parsed document. It is bound to the schema and
    /// re-indexed; cached hierarchy nodes it affects are dropped.
    ///
    /// The document keeps its own id; a different document previously
    /// registered under the same path is removed.
    pub fn set_document(&mut self, mut document: XmlDocument) -> DocumentId {
        let id = document.id();
        if let Some(previous) = self.file_id_map.get(document.path()).copied() {
            if previous != id {
                self.remove_document(previous);
            }
        }
        if let Some(old_path) = self.file_path_map.get(&id).cloned() {
            if old_path != document.path() {
                self.file_id_map.remove(&old_path);
            }
        }
        self.file_id_map.insert(document.path().to_string(), id);
        self.file_path_map.insert(id, document.path().to_string());
        self.next_id = self.next_id.max(id.index() + 1);

        bind_document(&self.schema, &mut document);
        let changes = self.index.sync_document(&self.schema, &document);
        self.tree.invalidate(&changes);
        self.documents.insert(id, document);
        id
    }

    /// Parse and set the content of a file.
    ///
    /// On a parse error the previous version of the document stays loaded.
    #[cfg(feature = "xml")]
    pub fn set_file_content(&mut self, path: &str, content: &str) -> Result<DocumentId, crate::error::XmlError> {
        let id = self.allocate_document_id(path);
        let document = crate::syntax::parse_document(id, path, content)?;
        Ok(self.set_document(document))
    }

    /// Remove a document and everything it declared.
    pub fn remove_document(&mut self, id: DocumentId) -> bool {
        if self.documents.remove(&id).is_none() {
            return false;
        }
        let changes = self.index.remove_document(id);
        self.tree.invalidate(&changes);
        if let Some(path) = self.file_path_map.remove(&id) {
            self.file_id_map.remove(&path);
        }
        true
    }

    /// Remove a document by path.
    pub fn remove_file(&mut self, path: &str) -> bool {
        match self.file_id_map.get(path).copied() {
            Some(id) => self.remove_document(id),
            None => false,
        }
    }

    pub fn has_file(&self, path: &str) -> bool {
        self.file_id_map
            .get(path)
            .is_some_and(|id| self.documents.contains_key(id))
    }

    /// Get the DocumentId for a path, if it exists.
    pub fn document_id(&self, path: &str) -> Option<DocumentId> {
        self.file_id_map.get(path).copied()
    }

    pub fn document(&self, id: DocumentId) -> Option<&XmlDocument> {
        self.documents.get(&id)
    }

    /// Get the number of documents loaded.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn index(&self) -> &DescIndex {
        &self.index
    }

    /// Get a view for querying.
    pub fn analysis(&mut self) -> Analysis<'_> {
        Analysis {
            ctx: AnalysisContext::new(&self.schema, &self.index, &self.documents),
            tree: &mut self.tree,
            file_id_map: &self.file_id_map,
            file_path_map: &self.file_path_map,
        }
    }
}

/// A view of the analysis state.
///
/// Inputs are read-only; only the hierarchy cache is filled in as queries
/// walk it.
pub struct Analysis<'a> {
    ctx: AnalysisContext<'a>,
    tree: &'a mut UiTree,
    file_id_map: &'a FxHashMap<String, DocumentId>,
    file_path_map: &'a FxHashMap<DocumentId, String>,
}

impl<'a> Analysis<'a> {
    // ==================== Semantic features ====================

    /// Diagnostics of one document; empty for unknown ids.
    pub fn check_file(&mut self, id: DocumentId) -> Vec<Diagnostic> {
        match self.ctx.document(id) {
            Some(document) => check_file(self.ctx, self.tree, document),
            None => Vec::new(),
        }
    }

    /// Navigator over the effective hierarchy.
    pub fn navigator(&mut self) -> UiNavigator<'_> {
        UiNavigator::new(self.ctx, self.tree)
    }

    /// Parse `path` and resolve it relative to `context`.
    pub fn resolve_desc_path(&mut self, context: DescId, path: &str) -> DescResolvedSelection {
        let selector = parse_path_selector(path);
        let mut nav = UiNavigator::new(self.ctx, self.tree);
        resolve_desc_path(&mut nav, context, &selector)
    }

    /// The desc scope enclosing `offset` in a document.
    pub fn desc_at(&self, id: DocumentId, offset: TextSize) -> Option<DescId> {
        let document = self.ctx.document(id)?;
        let element = document.element_at(offset)?;
        self.ctx.index.resolve_element_desc(document.element_ref(element))
    }

    /// Literal value of a constant, following references between constants.
    pub fn constant_value(&self, name: &str) -> Option<&'a str> {
        let chain = self.ctx.index.resolve_constant_deep(name)?;
        chain.last().map(|decl| decl.value.as_str())
    }

    /// Declarations referenced by the attribute value under `offset`.
    pub fn goto_definition(&mut self, id: DocumentId, offset: TextSize) -> GotoResult {
        match self.ctx.document(id) {
            Some(document) => goto_definition(self.ctx, self.tree, document, offset),
            None => GotoResult::empty(),
        }
    }

    // ==================== Symbols ====================

    /// Get all symbols in a document.
    pub fn document_symbols(&self, id: DocumentId) -> Vec<SymbolInfo> {
        match self.ctx.document(id) {
            Some(document) => document_symbols(self.ctx, document),
            None => Vec::new(),
        }
    }

    /// Search for symbols across the workspace.
    pub fn workspace_symbols(&self, query: Option<&str>) -> Vec<SymbolInfo> {
        workspace_symbols(self.ctx, query)
    }

    // ==================== Accessors ====================

    pub fn context(&self) -> AnalysisContext<'a> {
        self.ctx
    }

    pub fn index(&self) -> &'a DescIndex {
        self.ctx.index
    }

    pub fn schema(&self) -> &'a SchemaRegistry {
        self.ctx.schema
    }

    pub fn document(&self, id: DocumentId) -> Option<&'a XmlDocument> {
        self.ctx.document(id)
    }

    /// Get the file path for a DocumentId.
    pub fn get_file_path(&self, id: DocumentId) -> Option<&'a str> {
        self.file_path_map.get(&id).map(String::as_str)
    }

    /// Get the DocumentId for a path.
    pub fn get_file_id(&self, path: &str) -> Option<DocumentId> {
        self.file_id_map.get(path).copied()
    }
}
