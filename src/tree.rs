//! Arena-based control storage.
//!
//! The Tree owns every control using a sparse-set architecture with
//! generational indices. Parents own their children through the child id
//! lists; children refer back to their parent by id only, so there are no
//! reference cycles and a stale id can always be detected.
//!
//! ## Key Features
//!
//! - **Generational Indices**: ControlId contains index + generation, so a
//!   reference to a destroyed control never resolves to a newer control that
//!   reused the slot.
//!
//! - **Dense Storage**: Controls are stored contiguously for cache-friendly
//!   iteration during the per-frame passes.
//!
//! - **Swap-Remove**: O(1) removal without holes in dense storage.
//!
//! - **Runtime Context**: The tree owns the [`UiContext`] (version counter,
//!   focus coordinator, deferred jobs) and the host scene graph adapter.

use std::collections::HashMap;

use crate::config::UiConfig;
use crate::context::UiContext;
use crate::control::{ControlNode, Notification};
use crate::events::Handlers;
use crate::host::{HostHandle, HostHierarchy, SceneGraph};
use crate::render::RenderData;
use crate::widgets::WidgetBehavior;

/// Unique identifier for a control in the tree.
///
/// Uses a generational index design:
/// - `index`: Position in the sparse array (reusable after removal)
/// - `generation`: Version counter that increments when a slot is reused
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct ControlId {
    index: u32,
    generation: u32,
}

impl ControlId {
    fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    #[cfg(test)]
    pub(crate) fn new_for_test(index: u32, generation: u32) -> Self {
        Self::new(index, generation)
    }

    /// Combines generation (high bits) with index (low bits).
    pub fn as_u64(self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }
}

/// Callback receiving tree notifications.
pub type Listener = Box<dyn FnMut(&Notification)>;

/// Entry in the sparse map, pointing to a dense array slot.
struct SparseEntry {
    dense_index: usize,
    generation: u32,
}

/// A slot in the tree: the control plus everything attached to it.
pub(crate) struct Node {
    pub(crate) control: ControlNode,
    pub(crate) behavior: Option<Box<dyn WidgetBehavior>>,
    pub(crate) render_data: Option<RenderData>,
    pub(crate) handlers: Handlers,
    pub(crate) listeners: Vec<Listener>,
    /// Back-pointer to sparse array index (for swap-remove fixup)
    sparse_index: u32,
}

/// The control tree.
pub struct Tree {
    dense: Vec<Node>,
    sparse: Vec<Option<SparseEntry>>,
    /// Last generation handed out per sparse slot, kept after the slot frees
    generations: Vec<u32>,
    free_indices: Vec<u32>,
    /// Top-level controls in ascending z-order
    pub(crate) roots: Vec<ControlId>,
    pub(crate) by_host: HashMap<HostHandle, ControlId>,
    pub(crate) host: Box<dyn HostHierarchy>,
    pub(crate) ctx: UiContext,
    global_listeners: Vec<Listener>,
}

impl Tree {
    /// Create an empty tree backed by an in-memory [`SceneGraph`].
    pub fn new() -> Self {
        Self::with_config(UiConfig::default())
    }

    pub fn with_config(config: UiConfig) -> Self {
        Self::with_host(Box::new(SceneGraph::new()), config)
    }

    pub fn with_host(host: Box<dyn HostHierarchy>, config: UiConfig) -> Self {
        Self {
            dense: Vec::new(),
            sparse: Vec::new(),
            generations: Vec::new(),
            free_indices: Vec::new(),
            roots: Vec::new(),
            by_host: HashMap::new(),
            host,
            ctx: UiContext::new(config),
            global_listeners: Vec::new(),
        }
    }

    /// Store a control and return its id.
    pub(crate) fn register(&mut self, control: ControlNode) -> ControlId {
        let (sparse_index, generation) = if let Some(idx) = self.free_indices.pop() {
            (idx, self.generations[idx as usize].wrapping_add(1))
        } else {
            let idx = self.sparse.len() as u32;
            self.sparse.push(None);
            self.generations.push(0);
            (idx, 0)
        };

        let dense_index = self.dense.len();
        let id = ControlId::new(sparse_index, generation);
        if let Some(host) = control.host {
            self.by_host.insert(host, id);
        }

        self.dense.push(Node {
            control,
            behavior: None,
            render_data: None,
            handlers: Handlers::default(),
            listeners: Vec::new(),
            sparse_index,
        });
        self.sparse[sparse_index as usize] = Some(SparseEntry {
            dense_index,
            generation,
        });
        self.generations[sparse_index as usize] = generation;

        id
    }

    /// Remove a control's slot. Hierarchy bookkeeping is the caller's job.
    pub(crate) fn unregister(&mut self, id: ControlId) -> Option<Node> {
        let dense_index = self.get_dense_index(id)?;
        let last_dense_index = self.dense.len() - 1;
        let removed = self.dense.swap_remove(dense_index);

        if dense_index != last_dense_index {
            let moved_sparse_idx = self.dense[dense_index].sparse_index;
            if let Some(ref mut entry) = self.sparse[moved_sparse_idx as usize] {
                entry.dense_index = dense_index;
            }
        }

        self.sparse[id.index as usize] = None;
        self.free_indices.push(id.index);
        self.roots.retain(|&r| r != id);
        if let Some(host) = removed.control.host {
            if self.by_host.get(&host) == Some(&id) {
                self.by_host.remove(&host);
            }
        }
        Some(removed)
    }

    fn get_dense_index(&self, id: ControlId) -> Option<usize> {
        self.sparse
            .get(id.index as usize)
            .and_then(|e| e.as_ref())
            .filter(|e| e.generation == id.generation)
            .map(|e| e.dense_index)
    }

    pub(crate) fn node(&self, id: ControlId) -> Option<&Node> {
        self.get_dense_index(id).map(|idx| &self.dense[idx])
    }

    pub(crate) fn node_mut(&mut self, id: ControlId) -> Option<&mut Node> {
        self.get_dense_index(id).map(move |idx| &mut self.dense[idx])
    }

    /// Check if a control is registered.
    pub fn contains(&self, id: ControlId) -> bool {
        self.get_dense_index(id).is_some()
    }

    /// Read-only access to a control's state.
    pub fn control(&self, id: ControlId) -> Option<&ControlNode> {
        self.node(id).map(|n| &n.control)
    }

    pub(crate) fn control_mut(&mut self, id: ControlId) -> Option<&mut ControlNode> {
        self.node_mut(id).map(|n| &mut n.control)
    }

    /// Number of registered controls.
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Snapshot of every registered id, in storage order.
    pub fn ids(&self) -> Vec<ControlId> {
        self.dense
            .iter()
            .map(|n| {
                let generation = self.sparse[n.sparse_index as usize]
                    .as_ref()
                    .map_or(0, |e| e.generation);
                ControlId::new(n.sparse_index, generation)
            })
            .collect()
    }

    /// Run a closure with the control's behavior temporarily taken out of the
    /// tree, so the behavior and the tree can both be borrowed mutably.
    ///
    /// Returns `None` if the control is gone or has no behavior (including
    /// while its behavior is already taken out further up the stack).
    pub(crate) fn with_behavior<R>(
        &mut self,
        id: ControlId,
        f: impl FnOnce(&mut dyn WidgetBehavior, &mut Tree) -> R,
    ) -> Option<R> {
        let mut behavior = self.node_mut(id)?.behavior.take()?;
        let result = f(&mut *behavior, self);
        if let Some(node) = self.node_mut(id) {
            if node.behavior.is_none() {
                node.behavior = Some(behavior);
            }
        }
        Some(result)
    }

    pub fn context(&self) -> &UiContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut UiContext {
        &mut self.ctx
    }

    pub fn config(&self) -> &UiConfig {
        self.ctx.config()
    }

    pub fn host(&self) -> &dyn HostHierarchy {
        &*self.host
    }

    /// Direct access to the scene graph. Changes made here are picked up by
    /// the next [`Tree::update`].
    pub fn host_mut(&mut self) -> &mut dyn HostHierarchy {
        &mut *self.host
    }

    pub fn control_for_host(&self, handle: HostHandle) -> Option<ControlId> {
        self.by_host
            .get(&handle)
            .copied()
            .filter(|&id| self.contains(id))
    }

    pub fn parent(&self, id: ControlId) -> Option<ControlId> {
        self.control(id).and_then(|c| c.parent)
    }

    /// Children in ascending z-order.
    pub fn children(&self, id: ControlId) -> &[ControlId] {
        self.control(id)
            .map(|c| c.children.as_slice())
            .unwrap_or(&[])
    }

    /// Top-level controls in ascending z-order.
    pub fn roots(&self) -> &[ControlId] {
        &self.roots
    }

    /// True if `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: ControlId, id: ControlId) -> bool {
        let mut current = self.parent(id);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    /// The control itself followed by its ancestors, nearest first.
    pub fn ancestry(&self, id: ControlId) -> Vec<ControlId> {
        let mut chain = Vec::new();
        let mut current = Some(id).filter(|&id| self.contains(id));
        while let Some(c) = current {
            chain.push(c);
            current = self.parent(c);
        }
        chain
    }

    pub fn root_of(&self, id: ControlId) -> ControlId {
        self.ancestry(id).last().copied().unwrap_or(id)
    }

    /// Pre-order walk of a subtree, children visited in ascending z-order.
    pub fn descendants(&self, id: ControlId) -> Vec<ControlId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            for &child in self.children(current).iter().rev() {
                if self.contains(child) {
                    stack.push(child);
                }
            }
        }
        out
    }

    /// Every control in render order: top-level controls by z-order, each
    /// followed by its subtree.
    pub fn render_order(&self) -> Vec<ControlId> {
        let mut out = Vec::with_capacity(self.len());
        for &root in &self.roots {
            out.extend(self.descendants(root));
        }
        out
    }

    /// Register a listener for notifications raised on one control.
    pub fn listen(&mut self, id: ControlId, listener: impl FnMut(&Notification) + 'static) {
        if let Some(node) = self.node_mut(id) {
            node.listeners.push(Box::new(listener));
        }
    }

    /// Register a listener for every notification in the tree.
    pub fn listen_all(&mut self, listener: impl FnMut(&Notification) + 'static) {
        self.global_listeners.push(Box::new(listener));
    }

    pub(crate) fn notify(&mut self, target: ControlId, notification: Notification) {
        if let Some(node) = self.node_mut(target) {
            for listener in node.listeners.iter_mut() {
                listener(&notification);
            }
        }
        for listener in self.global_listeners.iter_mut() {
            listener(&notification);
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}
