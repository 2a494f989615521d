use crate::geometry::{Padding, Rect, Vec2};
use crate::render::{MaterialId, RenderData};
use crate::tree::{ControlId, Tree};
use crate::widgets::{impl_behavior_any, WidgetBehavior};

/// A solid quad filling the control, tinted with its effective color.
///
/// The border describes the sprite's fixed edges; the control can never
/// shrink below them.
#[derive(Debug, Clone, Default)]
pub struct Panel {
    pub border: Padding,
    pub material: Option<MaterialId>,
}

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn border(mut self, border: impl Into<Padding>) -> Self {
        self.border = border.into();
        self
    }

    pub fn material(mut self, material: MaterialId) -> Self {
        self.material = Some(material);
        self
    }
}

impl WidgetBehavior for Panel {
    fn rebuild_geometry(&mut self, tree: &mut Tree, id: ControlId, data: &mut RenderData) {
        let size = tree.size(id);
        if size.x <= 0.0 || size.y <= 0.0 {
            return;
        }
        data.material = self.material;
        data.push_quad(
            Rect::new(0.0, 0.0, size.x, size.y),
            [0.0, 0.0, 1.0, 1.0],
            tree.effective_color(id),
        );
    }

    fn calculate_minimum_size(&self, tree: &Tree, id: ControlId) -> Vec2 {
        let own = tree.control(id).map_or(Vec2::ZERO, |c| c.min_size);
        own.max(Vec2::new(self.border.horizontal(), self.border.vertical()))
    }

    impl_behavior_any!();
}
