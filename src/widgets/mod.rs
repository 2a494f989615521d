pub mod panel;
pub mod range;

use std::any::Any;

use crate::control::Property;
use crate::error::{Result, TreeError};
use crate::events::ControlEvent;
use crate::geometry::Vec2;
use crate::render::RenderData;
use crate::tree::{ControlId, Tree};

pub use panel::Panel;
pub use range::{Orientation, RangeControl};

/// Macro to implement the `Any` accessors every behavior needs for
/// downcasting.
macro_rules! impl_behavior_any {
    () => {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    };
}
pub(crate) use impl_behavior_any;

/// Widget-specific logic attached to a control.
///
/// Every hook receives the tree and the control's id. While a hook runs the
/// behavior is taken out of the tree, so hooks may freely mutate the tree,
/// including the control itself.
pub trait WidgetBehavior: Any {
    /// Fill `data` with geometry in pixel space relative to the control's
    /// upper-left corner. Called only while the control is invalidated;
    /// `data` arrives cleared.
    fn rebuild_geometry(&mut self, tree: &mut Tree, id: ControlId, data: &mut RenderData) {
        let _ = (tree, id, data);
    }

    /// Smallest size the control may take. Defaults to its `min_size`.
    fn calculate_minimum_size(&self, tree: &Tree, id: ControlId) -> Vec2 {
        tree.control(id).map_or(Vec2::ZERO, |c| c.min_size)
    }

    fn on_property_changed(&mut self, tree: &mut Tree, id: ControlId, property: Property) {
        let _ = (tree, id, property);
    }

    /// Called for every event reaching this control, before any observer or
    /// subscriber, even if a control further down already used it. Check
    /// [`ControlEvent::is_used`] before reacting; use the event to suppress
    /// the observers and subscribers still to come.
    fn event(&mut self, tree: &mut Tree, id: ControlId, event: &mut ControlEvent) {
        let _ = (tree, id, event);
    }

    /// Refresh any user-facing text after the language changed.
    fn on_localize(&mut self, tree: &mut Tree, id: ControlId) {
        let _ = (tree, id);
    }

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl Tree {
    /// Attach a behavior, replacing any previous one, and invalidate the
    /// control.
    pub fn set_behavior(&mut self, id: ControlId, behavior: impl WidgetBehavior) -> Result<()> {
        let node = self.node_mut(id).ok_or(TreeError::StaleControl(id))?;
        node.behavior = Some(Box::new(behavior));
        self.invalidate(id);
        let size = self.size(id);
        self.resize(id, size, true);
        Ok(())
    }

    pub fn has_behavior(&self, id: ControlId) -> bool {
        self.node(id).is_some_and(|n| n.behavior.is_some())
    }

    /// The control's behavior, if it is a `T`.
    pub fn behavior<T: WidgetBehavior>(&self, id: ControlId) -> Option<&T> {
        self.node(id)?
            .behavior
            .as_ref()?
            .as_any()
            .downcast_ref::<T>()
    }

    /// Run `f` with the control's behavior as a `T` and mutable access to
    /// the tree.
    ///
    /// Fails if the control is gone, has no behavior, or its behavior is
    /// not a `T`.
    pub fn with_behavior_as<T: WidgetBehavior, R>(
        &mut self,
        id: ControlId,
        f: impl FnOnce(&mut T, &mut Tree) -> R,
    ) -> Result<R> {
        let node = self.node(id).ok_or(TreeError::StaleControl(id))?;
        match &node.behavior {
            None => return Err(TreeError::NoBehavior(id)),
            Some(b) if !b.as_any().is::<T>() => {
                return Err(TreeError::IncompatibleBehavior {
                    id,
                    expected: std::any::type_name::<T>(),
                })
            }
            Some(_) => {}
        }
        self.with_behavior(id, |behavior, tree| {
            behavior
                .as_any_mut()
                .downcast_mut::<T>()
                .map(|typed| f(typed, tree))
        })
        .flatten()
        .ok_or(TreeError::NoBehavior(id))
    }

    /// Call every behavior's localization hook in a subtree.
    pub fn localize(&mut self, id: ControlId) {
        for control in self.descendants(id) {
            self.with_behavior(control, |behavior, tree| behavior.on_localize(tree, control));
        }
    }
}
