use crate::geometry::Vec3;

/// A 4x4 matrix in row-major order mapping a control's pixel-space geometry
/// into host space.
///
/// Geometry buffers are built once in pixel space (upper-left origin, y-down)
/// and this matrix is re-stamped on every render, so moving a control only
/// changes the transform, never the vertices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Matrix data in row-major order: [row0, row1, row2, row3]
    pub data: [f32; 16],
}

impl Transform {
    pub const IDENTITY: Self = Self {
        data: [
            1.0, 0.0, 0.0, 0.0, // row 0
            0.0, 1.0, 0.0, 0.0, // row 1
            0.0, 0.0, 1.0, 0.0, // row 2
            0.0, 0.0, 0.0, 1.0, // row 3
        ],
    };

    pub fn translate(offset: Vec3) -> Self {
        Self {
            data: [
                1.0, 0.0, 0.0, offset.x, // row 0
                0.0, 1.0, 0.0, offset.y, // row 1
                0.0, 0.0, 1.0, offset.z, // row 2
                0.0, 0.0, 0.0, 1.0, // row 3
            ],
        }
    }

    pub fn scale_xy(sx: f32, sy: f32) -> Self {
        Self {
            data: [
                sx, 0.0, 0.0, 0.0, // row 0
                0.0, sy, 0.0, 0.0, // row 1
                0.0, 0.0, 1.0, 0.0, // row 2
                0.0, 0.0, 0.0, 1.0, // row 3
            ],
        }
    }

    /// Pixel space to host space for a control whose upper-left corner sits
    /// at `upper_left` (host space).
    pub fn pixel_to_world(upper_left: Vec3, units_per_pixel: f32) -> Self {
        Self::translate(upper_left).then(&Self::scale_xy(units_per_pixel, -units_per_pixel))
    }

    /// Compose: applies `other` first, then `self`.
    pub fn then(&self, other: &Transform) -> Transform {
        let a = &self.data;
        let b = &other.data;
        let mut result = [0.0f32; 16];

        for i in 0..4 {
            for j in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += a[i * 4 + k] * b[k * 4 + j];
                }
                result[i * 4 + j] = sum;
            }
        }

        Transform { data: result }
    }

    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let d = &self.data;
        Vec3::new(
            d[0] * p.x + d[1] * p.y + d[2] * p.z + d[3],
            d[4] * p.x + d[5] * p.y + d[6] * p.z + d[7],
            d[8] * p.x + d[9] * p.y + d[10] * p.z + d[11],
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
