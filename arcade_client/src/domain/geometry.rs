// Axis-aligned rectangles and play-field bounds shared by every game.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Strict overlap test; rectangles that only touch edges do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Square box of `size` centred on this rectangle.
    pub fn centered_box(&self, size: f32) -> Rect {
        let (cx, cy) = self.center();
        Rect::new(cx - size * 0.5, cy - size * 0.5, size, size)
    }
}

/// Size of a play field; the origin is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Clamps a box so that it lies inside `[0, width - w] x [0, height - h]`.
    pub fn clamp_box(&self, x: f32, y: f32, w: f32, h: f32) -> (f32, f32) {
        let max_x = (self.width - w).max(0.0);
        let max_y = (self.height - h).max(0.0);
        (x.clamp(0.0, max_x), y.clamp(0.0, max_y))
    }

    /// Clamps a centre point keeping `margin` away from every edge.
    pub fn clamp_point(&self, x: f32, y: f32, margin: f32) -> (f32, f32) {
        let max_x = (self.width - margin).max(margin);
        let max_y = (self.height - margin).max(margin);
        (x.clamp(margin, max_x), y.clamp(margin, max_y))
    }

    pub fn contains_box(&self, rect: &Rect) -> bool {
        rect.x + rect.width >= 0.0
            && rect.x <= self.width
            && rect.y + rect.height >= 0.0
            && rect.y <= self.height
    }
}
