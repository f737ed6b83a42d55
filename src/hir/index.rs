//! Desc namespace index: workspace-wide registry of declared descs.
//!
//! Every named `Frame`, `Animation` and `StateGroup` declaration opens a
//! scope in a single tree shared by all documents. Declarations of the same
//! path merge into one entry:
//!
//! ```text
//! Root
//!  └── File "GameUI"            one per document (file stem)
//!       └── Frame "Main"        every <Frame name="Main"> at this level
//!            ├── Frame "Ok"
//!            └── Animation "Fade"
//! ```
//!
//! Constants and handles live in flat tables next to the tree.
//!
//! Entries are never reused: a desc that loses its last declaration is
//! detached from its parent and stays dead, so stale [`DescId`]s held by
//! caches cannot alias a new entry.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::base::{ComplexTypeId, DescId, DocumentId, ElementId, Name, TextRange, TextSize};
use crate::schema::{BuiltinType, ElementDefKind, SchemaRegistry};
use crate::syntax::{AttrValueKind, ElementRef, XmlDocument, XmlElement, classify_value};

// Racial constant suffixes tried when `#Name` itself is not declared.
const RACE_SUFFIXES: [&str; 3] = ["_Prot", "_Zerg", "_Terr"];

// ============================================================================
// DESC ENTRIES
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DescKind {
    Root,
    File,
    Frame,
    Animation,
    StateGroup,
}

impl DescKind {
    pub fn from_element(kind: ElementDefKind) -> Option<Self> {
        match kind {
            ElementDefKind::Frame => Some(DescKind::Frame),
            ElementDefKind::Animation => Some(DescKind::Animation),
            ElementDefKind::StateGroup => Some(DescKind::StateGroup),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DescKind::Root => "Root",
            DescKind::File => "File",
            DescKind::Frame => "Frame",
            DescKind::Animation => "Animation",
            DescKind::StateGroup => "StateGroup",
        }
    }
}

/// One element that declares a desc.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DeclSite {
    pub element: ElementRef,
    /// Start offset of the element in its document.
    pub start: TextSize,
    pub stype: Option<ComplexTypeId>,
}

/// A node of the desc namespace.
#[derive(Clone, Debug)]
pub struct DescNamespace {
    pub name: Name,
    pub kind: DescKind,
    /// Slash-joined path from the root, e.g. `GameUI/Main/Ok`.
    pub fqn: String,
    pub parent: Option<DescId>,
    pub children: IndexMap<Name, DescId>,
    pub decls: Vec<DeclSite>,
    /// The File desc this entry belongs to.
    pub file: Option<Name>,
    /// Index revision of the last change to this entry.
    pub changed_at: u64,
    live: bool,
}

impl DescNamespace {
    pub fn child(&self, name: &str) -> Option<DescId> {
        self.children.get(name).copied()
    }

    /// Complex type of the first typed declaration.
    pub fn stype(&self) -> Option<ComplexTypeId> {
        self.decls.iter().find_map(|d| d.stype)
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn decls_in(&self, document: DocumentId) -> impl Iterator<Item = &DeclSite> {
        self.decls.iter().filter(move |d| d.element.document == document)
    }
}

/// `<Constant name="..." val="..."/>`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstantDecl {
    pub name: Name,
    pub value: String,
    pub site: ElementRef,
    /// Range of the quoted `val` attribute.
    pub range: TextRange,
}

impl ConstantDecl {
    /// The constant this one forwards to, for values written `$Other` / `#Other`.
    pub fn reference(&self) -> Option<&str> {
        match classify_value(&self.value) {
            AttrValueKind::Constant | AttrValueKind::ConstantRacial => Some(&self.value[1..]),
            _ => None,
        }
    }
}

/// A named handle (`<Handle val="Name"/>`) pointing at the enclosing desc.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Handle {
    pub name: Name,
    pub desc: DescId,
    pub site: ElementRef,
}

/// What one index mutation touched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexChanges {
    /// Descs whose child set changed.
    pub children: FxHashSet<DescId>,
    /// Descs whose declarations were stripped or re-added.
    pub decls: FxHashSet<DescId>,
    pub removed: FxHashSet<DescId>,
    pub constants: bool,
    pub handles: bool,
}

impl IndexChanges {
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
            && self.decls.is_empty()
            && self.removed.is_empty()
            && !self.constants
            && !self.handles
    }

    pub fn touches(&self, desc: DescId) -> bool {
        self.children.contains(&desc) || self.decls.contains(&desc) || self.removed.contains(&desc)
    }
}

// ============================================================================
// DESC INDEX
// ============================================================================

/// The desc namespace of all loaded documents.
///
/// Each document is indexed by [`sync_document`](Self::sync_document), which
/// first strips everything the document contributed before and then re-adds
/// it, so re-indexing an unchanged document is a no-op on the tree's shape.
#[derive(Clone, Debug)]
pub struct DescIndex {
    descs: Vec<DescNamespace>,
    root: DescId,
    constants: IndexMap<Name, Vec<ConstantDecl>>,
    handles: IndexMap<Name, Vec<Handle>>,
    /// Element -> innermost desc scope containing it.
    scopes: FxHashMap<ElementRef, DescId>,
    /// Element -> desc it declares.
    declared: FxHashMap<ElementRef, DescId>,
    /// Descs holding declarations from each document.
    by_document: FxHashMap<DocumentId, Vec<DescId>>,
    revision: u64,
}

impl Default for DescIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl DescIndex {
    pub fn new() -> Self {
        let root = DescNamespace {
            name: Name::default(),
            kind: DescKind::Root,
            fqn: String::new(),
            parent: None,
            children: IndexMap::new(),
            decls: Vec::new(),
            file: None,
            changed_at: 0,
            live: true,
        };
        Self {
            descs: vec![root],
            root: DescId::from_index(0),
            constants: IndexMap::new(),
            handles: IndexMap::new(),
            scopes: FxHashMap::default(),
            declared: FxHashMap::default(),
            by_document: FxHashMap::default(),
            revision: 0,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn root(&self) -> DescId {
        self.root
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Entry for `id`, live or dead.
    pub fn desc(&self, id: DescId) -> &DescNamespace {
        &self.descs[id.index()]
    }

    /// Entry for `id` if it is still part of the tree.
    pub fn get_desc(&self, id: DescId) -> Option<&DescNamespace> {
        self.descs.get(id.index()).filter(|d| d.live)
    }

    /// Live entries in creation order.
    pub fn descs(&self) -> impl Iterator<Item = (DescId, &DescNamespace)> {
        self.descs
            .iter()
            .enumerate()
            .filter(|(_, d)| d.live)
            .map(|(i, d)| (DescId::from_index(i), d))
    }

    pub fn get(&self, from: DescId, name: &str) -> Option<DescId> {
        self.get_desc(from)?.child(name)
    }

    /// Follow a sequence of child names starting at `from`.
    pub fn get_multi<I>(&self, from: DescId, names: I) -> Option<DescId>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        names
            .into_iter()
            .try_fold(from, |desc, name| self.get(desc, name.as_ref()))
    }

    /// Look up a slash-separated path from the root, e.g. `GameUI/Main`.
    pub fn lookup(&self, path: &str) -> Option<DescId> {
        self.get_multi(self.root, path.split('/'))
    }

    /// The desc an element declares, if it declares one.
    pub fn declared_desc(&self, element: ElementRef) -> Option<DescId> {
        self.declared.get(&element).copied()
    }

    /// The innermost desc whose declaration contains the element (the
    /// element's own desc when it declares one).
    pub fn resolve_element_desc(&self, element: ElementRef) -> Option<DescId> {
        self.scopes.get(&element).copied()
    }

    pub fn constant(&self, name: &str) -> Option<&ConstantDecl> {
        self.constants.get(name).and_then(|decls| decls.first())
    }

    /// Look up `#Name`: the name itself, then its racial variants.
    pub fn racial_constant(&self, name: &str) -> Option<&ConstantDecl> {
        self.constant(name).or_else(|| {
            RACE_SUFFIXES
                .iter()
                .find_map(|suffix| self.constant(&format!("{name}{suffix}")))
        })
    }

    pub fn constants(&self) -> impl Iterator<Item = (&Name, &[ConstantDecl])> {
        self.constants.iter().map(|(name, decls)| (name, decls.as_slice()))
    }

    /// Follow a chain of constants that reference each other.
    ///
    /// Returns every declaration along the way; the last one holds the
    /// literal value. `None` when the name is undeclared, a link dangles or
    /// the chain loops.
    pub fn resolve_constant_deep(&self, name: &str) -> Option<Vec<&ConstantDecl>> {
        let mut chain = Vec::new();
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut decl = self.constant(name)?;
        loop {
            if !seen.insert(decl.name.as_str()) {
                tracing::trace!(name, "constant reference cycle");
                return None;
            }
            chain.push(decl);
            decl = match classify_value(&decl.value) {
                AttrValueKind::Constant => self.constant(&decl.value[1..])?,
                AttrValueKind::ConstantRacial => self.racial_constant(&decl.value[1..])?,
                _ => return Some(chain),
            };
        }
    }

    pub fn handle(&self, name: &str) -> Option<&Handle> {
        self.handles
            .get(name)
            .and_then(|handles| handles.iter().find(|h| self.descs[h.desc.index()].live))
    }

    pub fn handles(&self) -> impl Iterator<Item = &Handle> {
        self.handles.values().flatten()
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Re-index one document: drop its previous contributions, add the
    /// current ones, then prune entries left without declarations.
    pub fn sync_document(&mut self, schema: &SchemaRegistry, doc: &XmlDocument) -> IndexChanges {
        self.revision += 1;
        let mut changes = IndexChanges::default();
        let touched = self.strip_document(doc.id(), &mut changes);

        if let Some(root) = doc.root().filter(|&r| doc.element(r).is_bound()) {
            let file = self.ensure_child(self.root, doc.desc_name(), DescKind::File, &mut changes);
            self.declare(file, doc, root, &mut changes);
            self.scopes.insert(doc.element_ref(root), file);
            self.index_children(schema, doc, root, file, &mut changes);
        }

        self.prune(touched, &mut changes);
        tracing::debug!(
            path = doc.path(),
            revision = self.revision,
            changed = changes.decls.len(),
            removed = changes.removed.len(),
            "indexed document"
        );
        changes
    }

    /// Drop everything a document contributed.
    pub fn remove_document(&mut self, document: DocumentId) -> IndexChanges {
        self.revision += 1;
        let mut changes = IndexChanges::default();
        let touched = self.strip_document(document, &mut changes);
        self.prune(touched, &mut changes);
        tracing::debug!(%document, removed = changes.removed.len(), "removed document from index");
        changes
    }

    fn index_children(
        &mut self,
        schema: &SchemaRegistry,
        doc: &XmlDocument,
        parent: ElementId,
        scope: DescId,
        changes: &mut IndexChanges,
    ) {
        for (id, element) in doc.children(parent) {
            let Some(def) = element.sdef else {
                continue;
            };
            let eref = doc.element_ref(id);
            let mut inner = scope;

            match schema.element_def(def).kind {
                kind if kind.declares_desc() => {
                    let name = element.name().filter(|n| !n.is_empty());
                    if let (Some(name), Some(kind)) = (name, DescKind::from_element(kind)) {
                        inner = self.ensure_child(scope, name, kind, changes);
                        self.declare(inner, doc, id, changes);
                    }
                }
                ElementDefKind::Constant => {
                    if let (Some(name), Some(val)) = (element.name(), element.attr("val")) {
                        self.constants
                            .entry(name.into())
                            .or_default()
                            .push(ConstantDecl {
                                name: name.into(),
                                value: val.value.clone(),
                                site: eref,
                                range: val.value_range(),
                            });
                        changes.constants = true;
                    }
                }
                ElementDefKind::FrameProperty if declares_handle(schema, element) => {
                    if let Some(val) = element.attr_value("val").filter(|v| !v.is_empty()) {
                        self.handles.entry(val.into()).or_default().push(Handle {
                            name: val.into(),
                            desc: scope,
                            site: eref,
                        });
                        changes.handles = true;
                    }
                }
                _ => {}
            }

            self.scopes.insert(eref, inner);
            self.index_children(schema, doc, id, inner, changes);
        }
    }

    fn ensure_child(&mut self, parent: DescId, name: &str, kind: DescKind, changes: &mut IndexChanges) -> DescId {
        if let Some(existing) = self.descs[parent.index()].child(name) {
            return existing;
        }

        let parent_ns = &self.descs[parent.index()];
        let fqn = if parent_ns.fqn.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", parent_ns.fqn, name)
        };
        let file = match parent_ns.kind {
            DescKind::Root => None,
            DescKind::File => Some(parent_ns.name.clone()),
            _ => parent_ns.file.clone(),
        };

        let id = DescId::from_index(self.descs.len());
        self.descs.push(DescNamespace {
            name: name.into(),
            kind,
            fqn,
            parent: Some(parent),
            children: IndexMap::new(),
            decls: Vec::new(),
            file,
            changed_at: self.revision,
            live: true,
        });

        let parent_ns = &mut self.descs[parent.index()];
        parent_ns.children.insert(name.into(), id);
        parent_ns.changed_at = self.revision;
        changes.children.insert(parent);
        id
    }

    fn declare(&mut self, desc: DescId, doc: &XmlDocument, id: ElementId, changes: &mut IndexChanges) {
        let element = doc.element(id);
        let site = DeclSite {
            element: doc.element_ref(id),
            start: element.start,
            stype: element.stype,
        };

        let ns = &mut self.descs[desc.index()];
        if !ns.decls.iter().any(|d| d.element == site.element) {
            ns.decls.push(site);
        }
        ns.changed_at = self.revision;
        changes.decls.insert(desc);

        self.declared.insert(site.element, desc);
        self.by_document.entry(doc.id()).or_default().push(desc);
    }

    /// Remove a document's declarations, constants and handles. Returns the
    /// descs that lost declarations.
    fn strip_document(&mut self, document: DocumentId, changes: &mut IndexChanges) -> Vec<DescId> {
        let touched = self.by_document.remove(&document).unwrap_or_default();
        for &desc in &touched {
            let ns = &mut self.descs[desc.index()];
            let before = ns.decls.len();
            ns.decls.retain(|d| d.element.document != document);
            if ns.decls.len() != before {
                ns.changed_at = self.revision;
                changes.decls.insert(desc);
            }
        }

        self.scopes.retain(|e, _| e.document != document);
        self.declared.retain(|e, _| e.document != document);

        let mut constants_changed = false;
        self.constants.retain(|_, decls| {
            let before = decls.len();
            decls.retain(|c| c.site.document != document);
            constants_changed |= decls.len() != before;
            !decls.is_empty()
        });
        changes.constants |= constants_changed;

        let mut handles_changed = false;
        self.handles.retain(|_, handles| {
            let before = handles.len();
            handles.retain(|h| h.site.document != document);
            handles_changed |= handles.len() != before;
            !handles.is_empty()
        });
        changes.handles |= handles_changed;

        touched
    }

    /// Detach entries without declarations or children, walking up from
    /// each candidate.
    fn prune(&mut self, mut candidates: Vec<DescId>, changes: &mut IndexChanges) {
        while let Some(desc) = candidates.pop() {
            let ns = &self.descs[desc.index()];
            if !ns.live || ns.kind == DescKind::Root || !ns.decls.is_empty() || !ns.children.is_empty() {
                continue;
            }
            let parent = ns.parent;
            let name = ns.name.clone();

            self.descs[desc.index()].live = false;
            changes.removed.insert(desc);

            if let Some(parent) = parent {
                let parent_ns = &mut self.descs[parent.index()];
                parent_ns.children.shift_remove(&name);
                parent_ns.changed_at = self.revision;
                changes.children.insert(parent);
                candidates.push(parent);
            }
        }
    }
}

/// Property elements whose `val` is typed as a handle name.
fn declares_handle(schema: &SchemaRegistry, element: &XmlElement) -> bool {
    element
        .stype
        .and_then(|ty| schema.complex_type(ty).attribute("val"))
        .is_some_and(|attr| schema.simple_type(attr.ty).builtin == BuiltinType::Handle)
}
