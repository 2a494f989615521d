//! Runtime state shared by every control in a tree.
//!
//! `UiContext` replaces process-wide statics: the version counter, the focus
//! and modal coordinator, the deferred job queue, the shutdown flag and the
//! render invalidation state all live here and are owned by the [`Tree`].
//!
//! [`Tree`]: crate::tree::Tree

use crate::config::UiConfig;
use crate::focus::FocusManager;
use crate::jobs::JobQueue;
use crate::tree::ControlId;

#[derive(Debug)]
pub struct UiContext {
    config: UiConfig,
    version: u64,
    pub(crate) focus: FocusManager,
    pub(crate) jobs: JobQueue,
    shutting_down: bool,
    /// Render groups whose batches must be rebuilt
    dirty_groups: Vec<ControlId>,
    /// Whether anything on the surface changed since the renderer last looked
    surface_dirty: bool,
}

impl UiContext {
    pub fn new(config: UiConfig) -> Self {
        Self {
            config,
            version: 0,
            focus: FocusManager::new(),
            jobs: JobQueue::new(),
            shutting_down: false,
            dirty_groups: Vec::new(),
            surface_dirty: true,
        }
    }

    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    pub(crate) fn config_mut(&mut self) -> &mut UiConfig {
        &mut self.config
    }

    /// Bump and return the shared version counter.
    ///
    /// Every value handed out is strictly greater than all previous ones.
    pub fn next_version(&mut self) -> u64 {
        self.version += 1;
        self.version
    }

    pub fn current_version(&self) -> u64 {
        self.version
    }

    pub fn focus(&self) -> &FocusManager {
        &self.focus
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down
    }

    pub(crate) fn begin_shutdown(&mut self) {
        self.shutting_down = true;
    }

    /// Record that something on the surface changed, optionally inside a
    /// render group.
    pub(crate) fn mark_dirty(&mut self, group: Option<ControlId>) {
        self.surface_dirty = true;
        if let Some(group) = group {
            if !self.dirty_groups.contains(&group) {
                self.dirty_groups.push(group);
            }
        }
    }

    pub(crate) fn forget_group(&mut self, group: ControlId) {
        self.dirty_groups.retain(|&g| g != group);
    }

    /// Take the render groups invalidated since the last call.
    pub fn take_dirty_render_groups(&mut self) -> Vec<ControlId> {
        std::mem::take(&mut self.dirty_groups)
    }

    /// Check and clear the surface dirty flag.
    pub fn take_surface_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.surface_dirty, false)
    }
}

impl Default for UiContext {
    fn default() -> Self {
        Self::new(UiConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_strictly_increases() {
        let mut ctx = UiContext::default();
        let a = ctx.next_version();
        let b = ctx.next_version();
        assert!(b > a);
        assert_eq!(ctx.current_version(), b);
    }

    #[test]
    fn test_dirty_groups_deduplicated() {
        let mut ctx = UiContext::default();
        assert!(ctx.take_surface_dirty());
        assert!(!ctx.take_surface_dirty());

        let group = ControlId::new_for_test(4, 0);
        ctx.mark_dirty(Some(group));
        ctx.mark_dirty(Some(group));
        ctx.mark_dirty(None);
        assert_eq!(ctx.take_dirty_render_groups(), vec![group]);
        assert!(ctx.take_dirty_render_groups().is_empty());
        assert!(ctx.take_surface_dirty());
    }
}
