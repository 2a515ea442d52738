// Per-tick input vector, produced once per tick by the input sampler.

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    pub start: bool,
    pub escape: bool,
    pub multiplayer: bool,
    pub revive: bool,
    pub reset: bool,
    /// Direct vertical displacement from a drag gesture (pong), in world units.
    pub drag_dy: f32,
}

impl InputState {
    pub fn any_direction(&self) -> bool {
        self.up || self.down || self.left || self.right
    }

    /// -1 for up, +1 for down, 0 when neither or both are held.
    pub fn vertical_axis(&self) -> f32 {
        match (self.up, self.down) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }

    pub fn horizontal_axis(&self) -> f32 {
        match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}
