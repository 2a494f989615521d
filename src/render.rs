//! Render data handed to the external renderer.
//!
//! Geometry is built in pixel space relative to the control's upper-left
//! corner and only rebuilt while the control is invalidated. The world
//! transform is stamped on every [`Tree::render`] call, so moving a control
//! costs a matrix, not a mesh.

use log::warn;

use crate::geometry::{Color, Rect};
use crate::transform::Transform;
use crate::tree::{ControlId, Tree};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Pixel position relative to the upper-left corner, y-down
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

/// Renderer-side material handle. Resolved by the renderer, opaque here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

#[derive(Debug, Clone, Default)]
pub struct RenderData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub material: Option<MaterialId>,
    pub transform: Transform,
}

impl RenderData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the geometry, keeping the buffers' capacity.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.material = None;
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Append an axis-aligned quad as two triangles.
    ///
    /// `uv` is `[u_min, v_min, u_max, v_max]`.
    pub fn push_quad(&mut self, rect: Rect, uv: [f32; 4], color: Color) {
        let base = self.vertices.len() as u32;
        let color = color.to_array();
        let (left, top) = (rect.x, rect.y);
        let (right, bottom) = (rect.x + rect.width, rect.y + rect.height);
        self.vertices.extend_from_slice(&[
            Vertex {
                position: [left, top, 0.0],
                uv: [uv[0], uv[1]],
                color,
            },
            Vertex {
                position: [right, top, 0.0],
                uv: [uv[2], uv[1]],
                color,
            },
            Vertex {
                position: [right, bottom, 0.0],
                uv: [uv[2], uv[3]],
                color,
            },
            Vertex {
                position: [left, bottom, 0.0],
                uv: [uv[0], uv[3]],
                color,
            },
        ]);
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

impl Tree {
    /// Render data for a visible control.
    ///
    /// Rebuilds the geometry through the widget behavior if the control is
    /// invalidated, then stamps the current world transform. Returns `None`
    /// for hidden controls, during shutdown, and for a render requested from
    /// inside the same control's rebuild.
    pub fn render(&mut self, id: ControlId) -> Option<&RenderData> {
        if self.ctx.is_shutting_down() || !self.is_visible(id) {
            return None;
        }
        let control = self.control(id)?;
        if control.rendering {
            warn!("re-entrant render of {:?} ignored", id);
            return None;
        }

        if control.invalidated {
            let mut data = {
                let node = self.node_mut(id)?;
                node.control.rendering = true;
                node.control.invalidated = false;
                node.render_data.take().unwrap_or_default()
            };
            data.clear();
            self.with_behavior(id, |behavior, tree| {
                behavior.rebuild_geometry(tree, id, &mut data)
            });
            let node = self.node_mut(id)?;
            node.control.rendering = false;
            node.render_data = Some(data);
        }

        let transform = Transform::pixel_to_world(self.upper_left(id), self.units_per_pixel());
        let node = self.node_mut(id)?;
        let data = node.render_data.get_or_insert_with(RenderData::default);
        data.transform = transform;
        Some(data)
    }

    /// Render data as last produced, without rebuilding.
    pub fn render_data(&self, id: ControlId) -> Option<&RenderData> {
        self.node(id).and_then(|n| n.render_data.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Vec2, Vec3};

    #[test]
    fn test_push_quad() {
        let mut data = RenderData::new();
        data.push_quad(Rect::new(0.0, 0.0, 10.0, 20.0), [0.0, 0.0, 1.0, 1.0], Color::WHITE);
        assert_eq!(data.vertices.len(), 4);
        assert_eq!(data.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(data.vertices[2].position, [10.0, 20.0, 0.0]);
        assert_eq!(data.vertex_bytes().len(), 4 * std::mem::size_of::<Vertex>());
    }

    #[test]
    fn test_render_clears_invalidation_and_stamps_transform() {
        let mut tree = Tree::new();
        let id = tree.create_control("a");
        tree.set_size(id, Vec2::new(10.0, 10.0));
        assert!(tree.is_invalid(id));

        assert!(tree.render(id).is_some());
        assert!(!tree.is_invalid(id));

        tree.set_relative_position(id, Vec2::new(100.0, 0.0));
        let upp = tree.units_per_pixel();
        let transform = tree.render(id).map(|d| d.transform).unwrap();
        let origin = transform.transform_point(Vec3::ZERO);
        assert!((origin.x - 100.0 * upp).abs() < 1e-5);
    }

    #[test]
    fn test_hidden_control_not_rendered() {
        let mut tree = Tree::new();
        let id = tree.create_control("a");
        tree.set_visible(id, false);
        assert!(tree.render(id).is_none());
    }
}
