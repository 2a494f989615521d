use crate::geometry::Vec2;

/// Surface-wide settings consulted by layout and coordinate conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct UiConfig {
    /// Pixel size of the render surface. Top-level controls lay out against it.
    pub screen_size: Vec2,
    /// Round positions and sizes to whole pixels after proportional layout.
    pub pixel_perfect: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            screen_size: Vec2::new(1280.0, 720.0),
            pixel_perfect: false,
        }
    }
}

impl UiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen_size(mut self, width: f32, height: f32) -> Self {
        self.screen_size = Vec2::new(width, height);
        self
    }

    pub fn pixel_perfect(mut self, enabled: bool) -> Self {
        self.pixel_perfect = enabled;
        self
    }

    /// Host units per pixel: the surface spans two host units vertically.
    pub fn world_units_per_pixel(&self) -> f32 {
        if self.screen_size.y <= 0.0 {
            return 0.0;
        }
        2.0 / self.screen_size.y
    }
}
