//! Host scene graph boundary.
//!
//! Controls mirror objects in an external scene graph the tree does not own.
//! The tree reads the host hierarchy during reconciliation and writes back
//! when it moves or reparents a control itself. Anything else may mutate the
//! host directly (pooling systems, editor tooling); the per-frame update picks
//! those changes up.
//!
//! Host positions are in world units, y-up, measured from the parent object's
//! origin (which the tree aligns with the parent control's pivot).

use std::collections::HashMap;

use crate::geometry::Vec3;

/// Opaque handle to a host object.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct HostHandle(u64);

impl HostHandle {
    /// Wrap an engine-side object id.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// The operations the tree needs from a scene graph.
pub trait HostHierarchy {
    /// Create a new top-level object.
    fn create(&mut self, name: &str) -> HostHandle;

    /// Destroy an object and everything below it.
    fn destroy(&mut self, handle: HostHandle);

    fn is_alive(&self, handle: HostHandle) -> bool;

    fn parent(&self, handle: HostHandle) -> Option<HostHandle>;

    /// Reparent without touching the local position.
    fn set_parent(&mut self, handle: HostHandle, parent: Option<HostHandle>);

    fn child_count(&self, handle: HostHandle) -> usize;

    fn children(&self, handle: HostHandle) -> Vec<HostHandle>;

    fn local_position(&self, handle: HostHandle) -> Vec3;

    fn set_local_position(&mut self, handle: HostHandle, position: Vec3);
}

struct HostObject {
    name: String,
    parent: Option<HostHandle>,
    children: Vec<HostHandle>,
    position: Vec3,
}

/// In-memory scene graph.
#[derive(Default)]
pub struct SceneGraph {
    objects: HashMap<HostHandle, HostObject>,
    next: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self, handle: HostHandle) -> Option<&str> {
        self.objects.get(&handle).map(|o| o.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn detach(&mut self, handle: HostHandle) {
        let parent = self.objects.get(&handle).and_then(|o| o.parent);
        if let Some(parent) = parent {
            if let Some(p) = self.objects.get_mut(&parent) {
                p.children.retain(|&c| c != handle);
            }
        }
    }
}

impl HostHierarchy for SceneGraph {
    fn create(&mut self, name: &str) -> HostHandle {
        self.next += 1;
        let handle = HostHandle(self.next);
        self.objects.insert(
            handle,
            HostObject {
                name: name.to_string(),
                parent: None,
                children: Vec::new(),
                position: Vec3::ZERO,
            },
        );
        handle
    }

    fn destroy(&mut self, handle: HostHandle) {
        if !self.objects.contains_key(&handle) {
            return;
        }
        self.detach(handle);

        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            if let Some(object) = self.objects.remove(&current) {
                stack.extend(object.children);
            }
        }
    }

    fn is_alive(&self, handle: HostHandle) -> bool {
        self.objects.contains_key(&handle)
    }

    fn parent(&self, handle: HostHandle) -> Option<HostHandle> {
        self.objects.get(&handle).and_then(|o| o.parent)
    }

    fn set_parent(&mut self, handle: HostHandle, parent: Option<HostHandle>) {
        if !self.objects.contains_key(&handle) {
            return;
        }
        if let Some(p) = parent {
            if p == handle || !self.objects.contains_key(&p) {
                return;
            }
        }
        self.detach(handle);
        if let Some(object) = self.objects.get_mut(&handle) {
            object.parent = parent;
        }
        if let Some(p) = parent.and_then(|p| self.objects.get_mut(&p)) {
            p.children.push(handle);
        }
    }

    fn child_count(&self, handle: HostHandle) -> usize {
        self.objects.get(&handle).map_or(0, |o| o.children.len())
    }

    fn children(&self, handle: HostHandle) -> Vec<HostHandle> {
        self.objects
            .get(&handle)
            .map(|o| o.children.clone())
            .unwrap_or_default()
    }

    fn local_position(&self, handle: HostHandle) -> Vec3 {
        self.objects.get(&handle).map_or(Vec3::ZERO, |o| o.position)
    }

    fn set_local_position(&mut self, handle: HostHandle, position: Vec3) {
        if let Some(object) = self.objects.get_mut(&handle) {
            object.position = position;
        }
    }
}
