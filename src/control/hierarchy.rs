//! Parent/child structure, z-order and teardown.
//!
//! The child lists are a cache of the host hierarchy. Mutations made through
//! the tree write through to the host; mutations made directly on the host
//! are picked up by [`Tree::update_control_hierarchy`].

use log::debug;

use crate::control::{ControlNode, Notification, Z_ORDER_UNSET};
use crate::error::{Result, TreeError};
use crate::host::HostHandle;
use crate::tree::{ControlId, Tree};

impl Tree {
    /// Create a control backed by a new host object, as the topmost
    /// top-level control.
    pub fn create_control(&mut self, name: &str) -> ControlId {
        let host = self.host.create(name);
        let id = self.register(ControlNode::new(name, Some(host)));
        self.attach_root(id);
        self.invalidate(id);
        id
    }

    /// Create a control and add it as the topmost child of `parent`.
    pub fn create_child(&mut self, parent: ControlId, name: &str) -> Result<ControlId> {
        if !self.contains(parent) {
            return Err(TreeError::StaleControl(parent));
        }
        let id = self.create_control(name);
        if let Err(err) = self.reparent(parent, id, Z_ORDER_UNSET) {
            self.destroy(id);
            return Err(err);
        }
        Ok(id)
    }

    /// Create a control for a host object that already exists, placing it
    /// under the control of its host parent if there is one.
    ///
    /// Returns the existing control if the host object is already mirrored,
    /// and `None` if the host object is gone.
    pub fn adopt_host(&mut self, handle: HostHandle) -> Option<ControlId> {
        if let Some(existing) = self.control_for_host(handle) {
            return Some(existing);
        }
        if !self.host.is_alive(handle) {
            return None;
        }

        let mut node = ControlNode::new(format!("control-{}", handle.as_u64()), Some(handle));
        node.local_position = self.host.local_position(handle);
        let id = self.register(node);

        let host_parent = self
            .host
            .parent(handle)
            .and_then(|p| self.control_for_host(p));
        match host_parent {
            Some(parent) => self.attach_child(parent, id),
            None => self.attach_root(id),
        }
        self.invalidate(id);
        Some(id)
    }

    /// Make `child` the child of `parent`, removing it from its current
    /// parent first.
    ///
    /// The child keeps its world position and its z-order: it is inserted at
    /// that index, or on top if the z-order is out of range for `parent`.
    /// Adding a control that is already a child of `parent` does nothing.
    pub fn add_control(&mut self, parent: ControlId, child: ControlId) -> Result<()> {
        let z_order = self.z_order(child);
        self.reparent(parent, child, z_order)
    }

    fn reparent(&mut self, parent: ControlId, child: ControlId, z_order: i32) -> Result<()> {
        for id in [parent, child] {
            if !self.contains(id) {
                return Err(TreeError::StaleControl(id));
            }
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(TreeError::HierarchyCycle { parent, child });
        }
        let parent_host = self.live_host(parent)?;
        let child_host = self.live_host(child)?;

        if self.parent(child) == Some(parent) {
            return Ok(());
        }

        let world = self.world_position(child);
        if let Some(old) = self.parent(child) {
            self.remove_control(old, child);
        }
        self.detach_root(child);

        let parent_world = self.world_position(parent);
        let local = world - parent_world;
        self.host.set_parent(child_host, Some(parent_host));
        self.host.set_local_position(child_host, local);
        if let Some(c) = self.control_mut(child) {
            c.local_position = local;
            c.z_order = z_order;
        }

        self.attach_child(parent, child);
        self.release_unreachable_focus(child);
        self.reset_layout(child, false);
        Ok(())
    }

    fn live_host(&self, id: ControlId) -> Result<HostHandle> {
        self.control(id)
            .and_then(|c| c.host)
            .filter(|&h| self.host.is_alive(h))
            .ok_or(TreeError::MissingHost(id))
    }

    /// Detach `child` from `parent`; it becomes a top-level control.
    ///
    /// Returns `false` without doing anything if `child` is not a child of
    /// `parent` or `parent` is being torn down.
    pub fn remove_control(&mut self, parent: ControlId, child: ControlId) -> bool {
        match self.control(parent) {
            Some(p) if !p.disposing && p.children.contains(&child) => {}
            _ => return false,
        }

        if !self.contains(child) {
            self.drop_stale_child(parent, child);
            return true;
        }

        let world = self.world_position(child);
        if let Some(p) = self.control_mut(parent) {
            p.children.retain(|&c| c != child);
        }
        let (host, disposing) = match self.control_mut(child) {
            Some(c) => {
                c.parent = None;
                c.z_order = Z_ORDER_UNSET;
                c.local_position = world;
                (c.host, c.disposing)
            }
            None => (None, true),
        };
        if let Some(host) = host {
            self.host.set_parent(host, None);
            self.host.set_local_position(host, world);
        }
        if !disposing {
            self.attach_root(child);
        }

        self.renumber(Some(parent));
        self.notify(
            parent,
            Notification::ControlRemoved {
                parent,
                child: Some(child),
            },
        );
        self.invalidate(child);
        self.invalidate(parent);
        true
    }

    fn drop_stale_child(&mut self, parent: ControlId, child: ControlId) {
        if let Some(p) = self.control_mut(parent) {
            p.children.retain(|&c| c != child);
        }
        self.renumber(Some(parent));
        self.notify(
            parent,
            Notification::ControlRemoved {
                parent,
                child: None,
            },
        );
        self.invalidate(parent);
    }

    /// Insert `child` among `parent`'s children at its z-order, or on top if
    /// the z-order is unset or out of range.
    pub(crate) fn attach_child(&mut self, parent: ControlId, child: ControlId) {
        let z = self.control(child).map_or(Z_ORDER_UNSET, |c| c.z_order);
        let Some(p) = self.control_mut(parent) else {
            return;
        };
        if z >= 0 && (z as usize) < p.children.len() {
            p.children.insert(z as usize, child);
        } else {
            p.children.push(child);
        }
        if let Some(c) = self.control_mut(child) {
            c.parent = Some(parent);
        }

        self.renumber(Some(parent));
        self.notify(parent, Notification::ControlAdded { parent, child });
        self.invalidate(child);
    }

    pub(crate) fn attach_root(&mut self, id: ControlId) {
        if !self.roots.contains(&id) {
            self.roots.push(id);
        }
        self.renumber(None);
    }

    fn detach_root(&mut self, id: ControlId) {
        if !self.roots.contains(&id) {
            return;
        }
        self.roots.retain(|&r| r != id);
        if let Some(c) = self.control_mut(id) {
            c.z_order = Z_ORDER_UNSET;
        }
        self.renumber(None);
    }

    /// Renumber a sibling list to `0..N-1`, notifying every control whose
    /// z-order moved. `None` renumbers the top-level controls.
    fn renumber(&mut self, parent: Option<ControlId>) {
        let siblings = match parent {
            Some(p) => self.children(p).to_vec(),
            None => self.roots.clone(),
        };
        for (index, id) in siblings.into_iter().enumerate() {
            let new = index as i32;
            let old = match self.control_mut(id) {
                Some(c) if c.z_order != new => std::mem::replace(&mut c.z_order, new),
                _ => continue,
            };
            self.notify(id, Notification::ZOrderChanged { id, old, new });
            self.invalidate(id);
        }
    }

    pub fn z_order(&self, id: ControlId) -> i32 {
        self.control(id).map_or(Z_ORDER_UNSET, |c| c.z_order)
    }

    /// Move a control within its siblings. Out-of-range values clamp to the
    /// back or front.
    pub fn set_z_order(&mut self, id: ControlId, z_order: i32) -> bool {
        if !self.contains(id) {
            return false;
        }
        let parent = self.parent(id);
        let siblings = match parent {
            Some(p) => self.children(p).to_vec(),
            None => self.roots.clone(),
        };
        let Some(current) = siblings.iter().position(|&c| c == id) else {
            return false;
        };
        let target = z_order.clamp(0, siblings.len() as i32 - 1) as usize;
        if target == current {
            return false;
        }

        let list = match parent {
            Some(p) => match self.control_mut(p) {
                Some(c) => &mut c.children,
                None => return false,
            },
            None => &mut self.roots,
        };
        let moved = list.remove(current);
        list.insert(target, moved);

        self.renumber(parent);
        if let Some(p) = parent {
            self.invalidate(p);
        }
        true
    }

    pub fn bring_to_front(&mut self, id: ControlId) -> bool {
        self.set_z_order(id, i32::MAX)
    }

    pub fn send_to_back(&mut self, id: ControlId) -> bool {
        self.set_z_order(id, 0)
    }

    /// Sync the cached child list of `id` against the host hierarchy.
    ///
    /// When the number of live host children mirrored by controls matches
    /// the cached count this is a no-op. Otherwise children the host gained
    /// are adopted and children it lost are dropped; a dropped child that
    /// was already destroyed is reported with a `None` payload.
    pub fn update_control_hierarchy(&mut self, id: ControlId) -> Result<()> {
        let Some(control) = self.control(id) else {
            return Err(TreeError::StaleControl(id));
        };
        let Some(handle) = control.host.filter(|&h| self.host.is_alive(h)) else {
            return Err(TreeError::MissingHost(id));
        };

        let live: Vec<(HostHandle, ControlId)> = self
            .host
            .children(handle)
            .into_iter()
            .filter_map(|h| self.control_for_host(h).map(|c| (h, c)))
            .collect();
        if live.len() == self.children(id).len() {
            return Ok(());
        }

        let cached = self.children(id).to_vec();
        for child in cached {
            if live.iter().any(|&(_, c)| c == child) {
                continue;
            }
            debug!("{:?} dropped child {:?} missing from the host", id, child);
            if !self.contains(child) {
                self.drop_stale_child(id, child);
                continue;
            }
            if let Some(p) = self.control_mut(id) {
                p.children.retain(|&c| c != child);
            }
            let host = match self.control_mut(child) {
                Some(c) => {
                    c.parent = None;
                    c.z_order = Z_ORDER_UNSET;
                    c.host
                }
                None => None,
            };
            let position = host.map(|h| self.host.local_position(h));
            if let (Some(position), Some(c)) = (position, self.control_mut(child)) {
                c.local_position = position;
            }
            self.attach_root(child);
            self.renumber(Some(id));
            self.notify(
                id,
                Notification::ControlRemoved {
                    parent: id,
                    child: Some(child),
                },
            );
            self.invalidate(child);
        }

        for (handle, child) in live {
            if self.parent(child) == Some(id) {
                continue;
            }
            debug!("{:?} adopted child {:?} from the host", id, child);
            match self.parent(child) {
                Some(old) => {
                    if let Some(p) = self.control_mut(old) {
                        p.children.retain(|&c| c != child);
                    }
                    self.renumber(Some(old));
                    self.notify(
                        old,
                        Notification::ControlRemoved {
                            parent: old,
                            child: Some(child),
                        },
                    );
                    self.invalidate(old);
                }
                None => self.detach_root(child),
            }
            let position = self.host.local_position(handle);
            if let Some(c) = self.control_mut(child) {
                c.local_position = position;
                c.z_order = Z_ORDER_UNSET;
            }
            self.attach_child(id, child);
            self.release_unreachable_focus(child);
            self.reset_layout(child, false);
            self.request_layout(child);
        }

        self.invalidate(id);
        Ok(())
    }

    /// Destroy a control, its host object and its whole subtree.
    pub fn destroy(&mut self, id: ControlId) -> bool {
        if !self.contains(id) {
            return false;
        }
        let subtree = self.descendants(id);
        for &c in &subtree {
            if let Some(control) = self.control_mut(c) {
                control.disposing = true;
            }
        }
        if let Some(host) = self.control(id).and_then(|c| c.host) {
            self.host.destroy(host);
        }
        for &c in subtree.iter().rev() {
            self.teardown(c);
        }
        true
    }

    /// Release everything a control holds and remove it from the tree.
    ///
    /// Each step tolerates state left inconsistent by the previous ones, so
    /// teardown always runs to completion.
    pub(crate) fn teardown(&mut self, id: ControlId) {
        if !self.contains(id) {
            return;
        }
        debug!("tearing down {:?}", id);
        if let Some(c) = self.control_mut(id) {
            c.disposing = true;
        }

        if self.ctx.focus.has_focus(id) && !self.ctx.is_shutting_down() {
            self.set_focus(None);
        }
        self.ctx.focus.relinquish(id);
        self.ctx.jobs.forget(id);

        match self.parent(id) {
            Some(parent) => {
                self.remove_control(parent, id);
            }
            None => {
                self.roots.retain(|&r| r != id);
                self.renumber(None);
            }
        }

        for child in self.children(id).to_vec() {
            let orphan = match self.control_mut(child) {
                Some(c) if !c.disposing => {
                    c.parent = None;
                    c.z_order = Z_ORDER_UNSET;
                    true
                }
                _ => false,
            };
            if orphan {
                self.attach_root(child);
            }
        }

        if let Some(node) = self.node_mut(id) {
            node.render_data = None;
            node.handlers.clear();
            node.listeners.clear();
        }
        self.unregister(id);
        self.ctx.forget_group(id);
    }

    /// Tear down controls whose host object was destroyed behind the tree's
    /// back.
    pub(crate) fn teardown_dead_hosts(&mut self) {
        let dead: Vec<ControlId> = self
            .render_order()
            .into_iter()
            .filter(|&id| {
                self.control(id)
                    .and_then(|c| c.host)
                    .is_some_and(|h| !self.host.is_alive(h))
            })
            .collect();
        for &id in &dead {
            if let Some(c) = self.control_mut(id) {
                c.disposing = true;
            }
        }
        for id in dead.into_iter().rev() {
            self.teardown(id);
        }
    }

    /// Tear down every control. Invalidation and layout stop immediately.
    pub fn shutdown(&mut self) {
        self.ctx.begin_shutdown();
        let all = self.render_order();
        for &id in &all {
            if let Some(c) = self.control_mut(id) {
                c.disposing = true;
            }
        }
        for id in all.into_iter().rev() {
            self.teardown(id);
        }
        for id in self.ids() {
            self.teardown(id);
        }
        self.ctx.focus.reset();
    }
}
