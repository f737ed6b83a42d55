//! Effective UI hierarchy: what a frame contains once links are followed.
//!
//! The desc namespace records where things are declared. A frame's
//! effective children also include everything its `template=` and `file=`
//! links point at:
//!
//! ```text
//! <Frame name="Dialog" template="Templates/Dialog"/>
//!
//!   GameUI/Dialog ──template──▶ Templates/Dialog
//!                                 ├── Title
//!                                 └── Close
//!
//!   UiNode "Dialog" { Title, Close, ..own children }
//! ```
//!
//! Nodes are built on demand and cached in a [`UiTree`]. Every node records
//! the descs it read while being built; [`UiTree::invalidate`] drops the
//! nodes an [`IndexChanges`] touched, and they are rebuilt on next access.

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashSet;

use crate::base::{DescId, FrameTypeId, Name, UiNodeId};
use crate::parser::{AncestorFilter, PathSelector, SelectorFragment, SelectorKind, SelectorParam};
use crate::schema::{ElementDefKind, FrameType};
use crate::syntax::ElementRef;

use super::context::AnalysisContext;
use super::index::{DescKind, IndexChanges};

// Once this many nodes are dead the arena is dropped and rebuilt lazily.
const COMPACT_THRESHOLD: usize = 4096;

// ============================================================================
// NODES
// ============================================================================

/// Per-kind data derived from a node's declarations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiNodeData {
    Root,
    File,
    Frame {
        frame_type: Option<FrameTypeId>,
    },
    Animation {
        /// `<Event event="...">` elements by event name.
        events: IndexMap<Name, Vec<ElementRef>>,
    },
    StateGroup {
        default_state: Option<Name>,
        states: IndexMap<Name, Vec<ElementRef>>,
    },
}

#[derive(Clone, Debug)]
enum ChildSlot {
    Pending(IndexSet<DescId>),
    Built(UiNodeId),
    /// A `file=` link of the child does not resolve.
    Missing,
}

#[derive(Clone, Debug)]
pub struct UiNode {
    pub name: Name,
    /// The desc the node was first reached through.
    pub main_desc: DescId,
    /// Every desc merged into this node.
    pub descs: IndexSet<DescId>,
    pub parent: Option<UiNodeId>,
    pub data: UiNodeData,
    /// `descs` plus everything reached through template and file links.
    sources: Vec<DescId>,
    deps: FxHashSet<DescId>,
    children: Option<IndexMap<Name, ChildSlot>>,
    live: bool,
}

impl UiNode {
    pub fn kind(&self) -> DescKind {
        match self.data {
            UiNodeData::Root => DescKind::Root,
            UiNodeData::File => DescKind::File,
            UiNodeData::Frame { .. } => DescKind::Frame,
            UiNodeData::Animation { .. } => DescKind::Animation,
            UiNodeData::StateGroup { .. } => DescKind::StateGroup,
        }
    }

    pub fn frame_type(&self) -> Option<FrameTypeId> {
        match self.data {
            UiNodeData::Frame { frame_type } => frame_type,
            _ => None,
        }
    }

    /// Descs contributing children, in the order they were discovered.
    pub fn sources(&self) -> &[DescId] {
        &self.sources
    }

    pub fn is_live(&self) -> bool {
        self.live
    }
}

// ============================================================================
// TREE CACHE
// ============================================================================

/// Arena of built nodes. Node ids stay valid until the next
/// [`invalidate`](Self::invalidate) or [`clear`](Self::clear).
#[derive(Clone, Debug, Default)]
pub struct UiTree {
    nodes: Vec<UiNode>,
    root: Option<UiNodeId>,
    dead: usize,
}

impl UiTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: UiNodeId) -> &UiNode {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: UiNodeId) -> Option<&UiNode> {
        self.nodes.get(id.index()).filter(|n| n.live)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.dead
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.dead = 0;
    }

    /// Drop every node that read a desc touched by `changes`.
    pub fn invalidate(&mut self, changes: &IndexChanges) {
        if changes.is_empty() || self.nodes.is_empty() {
            return;
        }

        let stale: Vec<UiNodeId> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.live && n.deps.iter().any(|&d| changes.touches(d)))
            .map(|(i, _)| UiNodeId::from_index(i))
            .collect();

        for &id in &stale {
            self.detach(id);
        }
        tracing::trace!(stale = stale.len(), live = self.len(), "invalidated ui tree");

        if self.dead > COMPACT_THRESHOLD && self.dead * 2 > self.nodes.len() {
            self.clear();
        }
    }

    fn alloc(&mut self, node: UiNode) -> UiNodeId {
        let id = UiNodeId::from_index(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Kill a node and reset its parent's slot so the next access rebuilds it.
    fn detach(&mut self, id: UiNodeId) {
        let node = &self.nodes[id.index()];
        if !node.live {
            return;
        }
        let name = node.name.clone();
        let descs = node.descs.clone();

        match node.parent {
            Some(parent) => {
                if let Some(slot) = self.nodes[parent.index()]
                    .children
                    .as_mut()
                    .and_then(|children| children.get_mut(&name))
                {
                    *slot = ChildSlot::Pending(descs);
                }
            }
            None => self.root = None,
        }
        self.kill(id);
    }

    fn kill(&mut self, id: UiNodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let node = &mut self.nodes[id.index()];
            if !node.live {
                continue;
            }
            node.live = false;
            node.deps.clear();
            if let Some(children) = node.children.take() {
                stack.extend(children.values().filter_map(|slot| match slot {
                    ChildSlot::Built(child) => Some(*child),
                    _ => None,
                }));
            }
            self.dead += 1;
        }
    }
}

// ============================================================================
// BUILDER
// ============================================================================

#[derive(Default)]
struct Expansion {
    sources: Vec<DescId>,
    deps: FxHashSet<DescId>,
    broken_file: bool,
}

/// Builds nodes into a [`UiTree`] from the desc index.
pub struct UiBuilder<'a> {
    ctx: AnalysisContext<'a>,
    tree: &'a mut UiTree,
}

impl<'a> UiBuilder<'a> {
    pub fn new(ctx: AnalysisContext<'a>, tree: &'a mut UiTree) -> Self {
        Self { ctx, tree }
    }

    pub fn context(&self) -> AnalysisContext<'a> {
        self.ctx
    }

    pub fn tree(&self) -> &UiTree {
        self.tree
    }

    pub fn node(&self, id: UiNodeId) -> &UiNode {
        self.tree.node(id)
    }

    /// Node of the namespace root; its children are the File nodes.
    pub fn root_node(&mut self) -> UiNodeId {
        if let Some(root) = self.tree.root.filter(|&r| self.tree.node(r).live) {
            return root;
        }
        let root = self.ctx.index.root();
        let id = self.tree.alloc(UiNode {
            name: Name::default(),
            main_desc: root,
            descs: IndexSet::from([root]),
            parent: None,
            data: UiNodeData::Root,
            sources: vec![root],
            deps: FxHashSet::from_iter([root]),
            children: None,
            live: true,
        });
        self.tree.root = Some(id);
        id
    }

    /// The node for a desc, reached by walking down from the root along the
    /// desc's namespace path. `None` when a link on the way is broken.
    pub fn build_node_from_desc(&mut self, desc: DescId) -> Option<UiNodeId> {
        let index = self.ctx.index;
        let mut path = Vec::new();
        let mut current = Some(desc);
        while let Some(d) = current {
            let ns = index.get_desc(d)?;
            if ns.kind == DescKind::Root {
                break;
            }
            path.push(ns.name.clone());
            current = ns.parent;
        }

        let mut node = self.root_node();
        for name in path.iter().rev() {
            node = self.child(node, name)?;
        }
        Some(node)
    }

    pub fn parent(&self, node: UiNodeId) -> Option<UiNodeId> {
        self.tree.node(node).parent
    }

    /// Effective child of `node` named `name`.
    pub fn child(&mut self, node: UiNodeId, name: &str) -> Option<UiNodeId> {
        self.expand(node);
        let slot = self.tree.node(node).children.as_ref()?.get(name)?.clone();
        match slot {
            ChildSlot::Built(id) => Some(id),
            ChildSlot::Missing => None,
            ChildSlot::Pending(descs) => {
                let built = self.build(name, descs, node);
                let parent = &mut self.tree.nodes[node.index()];
                let slot = match built {
                    Ok(id) => ChildSlot::Built(id),
                    Err(deps) => {
                        parent.deps.extend(deps);
                        ChildSlot::Missing
                    }
                };
                let id = match slot {
                    ChildSlot::Built(id) => Some(id),
                    _ => None,
                };
                if let Some(children) = parent.children.as_mut() {
                    children.insert(name.into(), slot);
                }
                id
            }
        }
    }

    /// All effective children of `node`, in declaration order.
    pub fn children(&mut self, node: UiNodeId) -> Vec<UiNodeId> {
        self.expand(node);
        let names: Vec<Name> = self
            .tree
            .node(node)
            .children
            .as_ref()
            .map(|children| children.keys().cloned().collect())
            .unwrap_or_default();
        names.iter().filter_map(|name| self.child(node, name)).collect()
    }

    fn expand(&mut self, node: UiNodeId) {
        if self.tree.node(node).children.is_some() {
            return;
        }
        let index = self.ctx.index;
        let mut slots: IndexMap<Name, IndexSet<DescId>> = IndexMap::new();
        for &source in &self.tree.node(node).sources {
            let Some(ns) = index.get_desc(source) else {
                continue;
            };
            for (name, &child) in &ns.children {
                slots.entry(name.clone()).or_default().insert(child);
            }
        }
        self.tree.nodes[node.index()].children = Some(
            slots
                .into_iter()
                .map(|(name, descs)| (name, ChildSlot::Pending(descs)))
                .collect(),
        );
    }

    /// Build a child node, or return the descs consulted when one of its
    /// `file=` links is broken.
    fn build(&mut self, name: &str, descs: IndexSet<DescId>, parent: UiNodeId) -> Result<UiNodeId, FxHashSet<DescId>> {
        let expansion = self.expand_sources(&descs);
        let Some(&main_desc) = descs.first() else {
            return Err(expansion.deps);
        };
        if expansion.broken_file {
            return Err(expansion.deps);
        }

        let data = self.node_data(self.ctx.index.desc(main_desc).kind, main_desc, &expansion.sources);
        Ok(self.tree.alloc(UiNode {
            name: name.into(),
            main_desc,
            descs,
            parent: Some(parent),
            data,
            sources: expansion.sources,
            deps: expansion.deps,
            children: None,
            live: true,
        }))
    }

    /// Follow template and file links from `descs`, breadth first.
    fn expand_sources(&self, descs: &IndexSet<DescId>) -> Expansion {
        let index = self.ctx.index;
        let root = index.root();
        let mut out = Expansion::default();
        let mut seen = FxHashSet::default();
        let mut queue: VecDeque<(DescId, bool)> = descs.iter().map(|&d| (d, true)).collect();

        while let Some((desc, own)) = queue.pop_front() {
            if !seen.insert(desc) {
                continue;
            }
            out.deps.insert(desc);
            let Some(ns) = index.get_desc(desc) else {
                continue;
            };
            out.sources.push(desc);

            for decl in &ns.decls {
                let Some(element) = self.ctx.element(decl.element) else {
                    continue;
                };
                if let Some(template) = element.attr_value("template") {
                    match lookup(self.ctx, root, template.split('/'), &mut out.deps) {
                        Some(target) if index.desc(target).kind != DescKind::File => {
                            queue.push_back((target, false));
                        }
                        _ => {}
                    }
                }
                if let Some(file) = element.attr_value("file") {
                    match lookup(self.ctx, root, [file, ns.name.as_str()], &mut out.deps) {
                        Some(target) => queue.push_back((target, false)),
                        None if own => out.broken_file = true,
                        None => {}
                    }
                }
            }
        }
        out
    }

    fn node_data(&self, kind: DescKind, main_desc: DescId, sources: &[DescId]) -> UiNodeData {
        match kind {
            DescKind::Root => UiNodeData::Root,
            DescKind::File => UiNodeData::File,
            DescKind::Frame => UiNodeData::Frame {
                frame_type: self
                    .ctx
                    .index
                    .desc(main_desc)
                    .stype()
                    .and_then(|ty| self.ctx.schema.frame_type_id(ty)),
            },
            DescKind::Animation => {
                let mut events: IndexMap<Name, Vec<ElementRef>> = IndexMap::new();
                self.for_each_part(sources, |part_kind, eref, element| {
                    if part_kind == ElementDefKind::AnimationEvent {
                        if let Some(event) = element.attr_value("event") {
                            events.entry(event.into()).or_default().push(eref);
                        }
                    }
                });
                UiNodeData::Animation { events }
            }
            DescKind::StateGroup => {
                let mut default_state = None;
                let mut states: IndexMap<Name, Vec<ElementRef>> = IndexMap::new();
                self.for_each_part(sources, |part_kind, eref, element| match part_kind {
                    ElementDefKind::StateGroupState => {
                        if let Some(name) = element.name() {
                            states.entry(name.into()).or_default().push(eref);
                        }
                    }
                    ElementDefKind::StateGroupDefaultState => {
                        if let Some(val) = element.attr_value("val") {
                            default_state = Some(Name::from(val));
                        }
                    }
                    _ => {}
                });
                UiNodeData::StateGroup { default_state, states }
            }
        }
    }

    /// Visit the bound child elements of every declaration of `sources`.
    fn for_each_part(
        &self,
        sources: &[DescId],
        mut f: impl FnMut(ElementDefKind, ElementRef, &crate::syntax::XmlElement),
    ) {
        for &source in sources {
            let Some(ns) = self.ctx.index.get_desc(source) else {
                continue;
            };
            for decl in &ns.decls {
                let Some(doc) = self.ctx.document(decl.element.document) else {
                    continue;
                };
                if doc.get(decl.element.element).is_none() {
                    continue;
                }
                for (child, element) in doc.children(decl.element.element) {
                    if let Some(def) = element.sdef {
                        f(self.ctx.schema.element_def(def).kind, doc.element_ref(child), element);
                    }
                }
            }
        }
    }
}

/// Walk `names` down from `from`, recording every desc consulted.
fn lookup<I>(ctx: AnalysisContext<'_>, from: DescId, names: I, deps: &mut FxHashSet<DescId>) -> Option<DescId>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut current = from;
    for name in names {
        deps.insert(current);
        current = ctx.index.get(current, name.as_ref())?;
    }
    deps.insert(current);
    Some(current)
}

// ============================================================================
// NAVIGATOR
// ============================================================================

/// Nodes selected by each fragment of a path, up to the first one that
/// failed to resolve.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UiSelection {
    pub chain: Vec<UiNodeId>,
    pub fragment_count: usize,
}

impl UiSelection {
    pub fn is_complete(&self) -> bool {
        self.fragment_count > 0 && self.chain.len() == self.fragment_count
    }

    /// The selected node, if every fragment resolved.
    pub fn target(&self) -> Option<UiNodeId> {
        if self.is_complete() { self.chain.last().copied() } else { None }
    }
}

/// Evaluates selector fragments against the UI hierarchy.
pub struct UiNavigator<'a> {
    builder: UiBuilder<'a>,
}

impl<'a> UiNavigator<'a> {
    pub fn new(ctx: AnalysisContext<'a>, tree: &'a mut UiTree) -> Self {
        Self {
            builder: UiBuilder::new(ctx, tree),
        }
    }

    pub fn builder(&mut self) -> &mut UiBuilder<'a> {
        &mut self.builder
    }

    pub fn context(&self) -> AnalysisContext<'a> {
        self.builder.ctx
    }

    pub fn node(&self, id: UiNodeId) -> &UiNode {
        self.builder.node(id)
    }

    pub fn frame_type(&self, node: UiNodeId) -> Option<&'a FrameType> {
        let schema = self.builder.ctx.schema;
        self.node(node).frame_type().map(|id| schema.frame_type_data(id))
    }

    pub fn resolve_selector_fragment(&mut self, node: UiNodeId, fragment: &SelectorFragment) -> Option<UiNodeId> {
        match fragment.kind {
            SelectorKind::This => Some(node),
            SelectorKind::Parent => self.builder.parent(node),
            SelectorKind::Root => Some(self.builder.root_node()),
            SelectorKind::Sibling => {
                let parent = self.builder.parent(node)?;
                self.builder
                    .child(parent, fragment.name()?)
                    .filter(|&sibling| sibling != node)
            }
            SelectorKind::Layer => self.layer(node),
            SelectorKind::Ancestor => {
                let mut current = self.builder.parent(node);
                while let Some(ancestor) = current {
                    if self.matches_ancestor(ancestor, &fragment.params) {
                        return Some(ancestor);
                    }
                    current = self.builder.parent(ancestor);
                }
                None
            }
            SelectorKind::Custom => {
                let name = fragment.name()?;
                let index = self.builder.ctx.index;
                match index.handle(name).map(|h| h.desc) {
                    Some(desc) => self.builder.build_node_from_desc(desc),
                    None => self.builder.child(node, name),
                }
            }
            SelectorKind::Identifier => self.builder.child(node, fragment.name()?),
        }
    }

    pub fn resolve_selection(&mut self, node: UiNodeId, selector: &PathSelector) -> UiSelection {
        let mut selection = UiSelection {
            chain: Vec::with_capacity(selector.len()),
            fragment_count: selector.len(),
        };
        let mut current = node;
        for fragment in &selector.path {
            match self.resolve_selector_fragment(current, fragment) {
                Some(next) => {
                    selection.chain.push(next);
                    current = next;
                }
                None => break,
            }
        }
        selection
    }

    /// Effective children of `node` with the given kind.
    pub fn children_of_kind(&mut self, node: UiNodeId, kind: DescKind) -> Vec<UiNodeId> {
        self.builder
            .children(node)
            .into_iter()
            .filter(|&child| self.node(child).kind() == kind)
            .collect()
    }

    /// The outermost frame enclosing `node` (itself included).
    fn layer(&self, node: UiNodeId) -> Option<UiNodeId> {
        let mut layer = None;
        let mut current = Some(node);
        while let Some(id) = current {
            if self.node(id).kind() == DescKind::Frame {
                layer = Some(id);
            }
            current = self.node(id).parent;
        }
        layer
    }

    fn matches_ancestor(&self, node: UiNodeId, params: &[SelectorParam]) -> bool {
        params.iter().all(|param| {
            let value = param.value.as_str();
            match param.filter() {
                Some(AncestorFilter::Name) => self.node(node).name == value,
                Some(AncestorFilter::Type) => self.frame_type(node).is_some_and(|ft| ft.name == value),
                Some(AncestorFilter::OfType) => self.frame_type(node).is_some_and(|ft| self.is_of_type(ft, value)),
                None => false,
            }
        })
    }

    /// `value` names a class in the frame type's chain, or a frame type whose
    /// primary class is in it.
    fn is_of_type(&self, frame_type: &FrameType, value: &str) -> bool {
        if frame_type.has_class(value) {
            return true;
        }
        let schema = self.builder.ctx.schema;
        schema
            .frame_type_by_name(value)
            .and_then(FrameType::primary_class)
            .is_some_and(|class| frame_type.has_class(&schema.frame_class(class).name))
    }
}
