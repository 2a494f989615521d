//! Geometric value types shared by the control tree.
//!
//! Two coordinate spaces are in play:
//!
//! - **Pixel space**: top-left origin, y grows downward. Sizes, relative
//!   positions, geometry buffers and hit positions are expressed here.
//! - **Host (world) space**: the scene graph's units, y grows upward. A
//!   control's host position is the position of its pivot point measured
//!   from its parent's pivot point.
//!
//! [`pixels_to_world`] and [`world_to_pixels`] convert between the two using
//! the surface's world-units-per-pixel ratio.

use std::ops::{Add, Mul, Neg, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2::new(0.0, 0.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Component-wise maximum.
    pub fn max(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Component-wise minimum.
    pub fn min(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x.min(other.x), self.y.min(other.y))
    }

    pub fn round(self) -> Vec2 {
        Vec2::new(self.x.round(), self.y.round())
    }

    pub fn approx_eq(self, other: Vec2, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Axis-aligned rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self::new(origin.x, origin.y, size.x, size.y)
    }

    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Inclusive on all edges; hit-testing treats the border pixel as inside.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// A ray in host space, as produced by the input manager from a camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Intersect with the plane `z = plane_z`.
    ///
    /// Returns `None` when the ray is parallel to the plane or the plane lies
    /// behind the origin.
    pub fn intersect_z_plane(&self, plane_z: f32) -> Option<Vec3> {
        if self.direction.z.abs() <= f32::EPSILON {
            return None;
        }
        let t = (plane_z - self.origin.z) / self.direction.z;
        if t < 0.0 {
            return None;
        }
        Some(self.at(t))
    }
}

/// A plane with its normal pointing toward the retained half-space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    pub fn from_normal_and_point(normal: Vec3, point: Vec3) -> Self {
        Self {
            normal,
            distance: -normal.dot(point),
        }
    }

    /// Signed distance; positive values are on the normal's side.
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Edge extents in pixels, used for sprite borders.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Padding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Padding {
    pub fn all(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// The reference point of a control that its host position is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Pivot {
    #[default]
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Pivot {
    /// Fraction of the size from the upper-left corner, y-down.
    pub fn fraction(self) -> Vec2 {
        match self {
            Pivot::TopLeft => Vec2::new(0.0, 0.0),
            Pivot::TopCenter => Vec2::new(0.5, 0.0),
            Pivot::TopRight => Vec2::new(1.0, 0.0),
            Pivot::MiddleLeft => Vec2::new(0.0, 0.5),
            Pivot::MiddleCenter => Vec2::new(0.5, 0.5),
            Pivot::MiddleRight => Vec2::new(1.0, 0.5),
            Pivot::BottomLeft => Vec2::new(0.0, 1.0),
            Pivot::BottomCenter => Vec2::new(0.5, 1.0),
            Pivot::BottomRight => Vec2::new(1.0, 1.0),
        }
    }

    /// Pixel offset from the pivot point to the upper-left corner.
    pub fn upper_left_offset(self, size: Vec2) -> Vec2 {
        let f = self.fraction();
        Vec2::new(-f.x * size.x, -f.y * size.y)
    }
}

/// Convert a pixel-space offset (y-down) to a host-space offset (y-up).
pub fn pixels_to_world(pixels: Vec2, units_per_pixel: f32) -> Vec3 {
    Vec3::new(pixels.x * units_per_pixel, -pixels.y * units_per_pixel, 0.0)
}

/// Convert a host-space offset (y-up) to a pixel-space offset (y-down).
///
/// The z component is dropped. A non-positive ratio yields zero rather than
/// propagating infinities into layout.
pub fn world_to_pixels(world: Vec3, units_per_pixel: f32) -> Vec2 {
    if units_per_pixel <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(world.x / units_per_pixel, -world.y / units_per_pixel)
}

/// Upper-left corner of a control relative to its parent's upper-left corner.
///
/// `local` is the pixel offset of the control's pivot from the parent's pivot.
pub fn relative_from_local(
    local: Vec2,
    pivot: Pivot,
    size: Vec2,
    parent_pivot: Pivot,
    parent_size: Vec2,
) -> Vec2 {
    local + pivot.upper_left_offset(size) - parent_pivot.upper_left_offset(parent_size)
}

/// Inverse of [`relative_from_local`].
pub fn local_from_relative(
    relative: Vec2,
    pivot: Pivot,
    size: Vec2,
    parent_pivot: Pivot,
    parent_size: Vec2,
) -> Vec2 {
    relative - pivot.upper_left_offset(size) + parent_pivot.upper_left_offset(parent_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pivot_upper_left_offset() {
        let size = Vec2::new(100.0, 50.0);
        assert_eq!(Pivot::TopLeft.upper_left_offset(size), Vec2::ZERO);
        assert_eq!(
            Pivot::MiddleCenter.upper_left_offset(size),
            Vec2::new(-50.0, -25.0)
        );
        assert_eq!(
            Pivot::BottomRight.upper_left_offset(size),
            Vec2::new(-100.0, -50.0)
        );
    }

    #[test]
    fn test_pixel_world_conversion_flips_y() {
        let world = pixels_to_world(Vec2::new(10.0, 20.0), 0.5);
        assert_eq!(world, Vec3::new(5.0, -10.0, 0.0));
        assert_eq!(world_to_pixels(world, 0.5), Vec2::new(10.0, 20.0));
    }

    #[test]
    fn test_world_to_pixels_degenerate_ratio() {
        assert_eq!(world_to_pixels(Vec3::new(1.0, 1.0, 0.0), 0.0), Vec2::ZERO);
    }

    #[test]
    fn test_relative_local_inverse() {
        let parent_size = Vec2::new(200.0, 100.0);
        let size = Vec2::new(40.0, 30.0);
        let local = Vec2::new(12.0, -7.0);
        let rel = relative_from_local(
            local,
            Pivot::BottomRight,
            size,
            Pivot::MiddleCenter,
            parent_size,
        );
        let back = local_from_relative(
            rel,
            Pivot::BottomRight,
            size,
            Pivot::MiddleCenter,
            parent_size,
        );
        assert!(back.approx_eq(local, 1e-4));
    }

    #[test]
    fn test_child_at_parent_center() {
        // A top-left pivoted child sitting on a centered parent's pivot
        // starts at the middle of the parent.
        let rel = relative_from_local(
            Vec2::ZERO,
            Pivot::TopLeft,
            Vec2::new(10.0, 10.0),
            Pivot::MiddleCenter,
            Vec2::new(100.0, 100.0),
        );
        assert_eq!(rel, Vec2::new(50.0, 50.0));
    }

    #[test]
    fn test_ray_plane_intersection() {
        let ray = Ray::new(Vec3::new(1.0, 2.0, -10.0), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(ray.intersect_z_plane(0.0), Some(Vec3::new(1.0, 2.0, 0.0)));

        let parallel = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(parallel.intersect_z_plane(0.0), None);

        let behind = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(behind.intersect_z_plane(0.0), None);
    }

    #[test]
    fn test_plane_signed_distance() {
        let plane = Plane::from_normal_and_point(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(plane.signed_distance(Vec3::new(5.0, 0.0, 0.0)), 3.0);
        assert_eq!(plane.signed_distance(Vec3::new(0.0, 9.0, 0.0)), -2.0);
    }

    #[test]
    fn test_rect_contains_is_edge_inclusive() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert!(rect.contains(Vec2::new(10.0, 20.0)));
        assert!(rect.contains(Vec2::new(110.0, 70.0)));
        assert!(!rect.contains(Vec2::new(9.9, 40.0)));
        assert!(!rect.contains(Vec2::new(50.0, 70.1)));
    }

    #[test]
    fn test_color_from_hex() {
        let color = Color::from_hex(0xFF0000);
        assert_eq!(color, Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(Color::default(), Color::WHITE);
    }

    #[test]
    fn test_padding_extents() {
        let padding = Padding::symmetric(4.0, 6.0);
        assert_eq!(padding.horizontal(), 8.0);
        assert_eq!(padding.vertical(), 12.0);
    }
}
