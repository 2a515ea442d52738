/// Sprite-frame counter: advances one frame every `buffer` ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCycle {
    pub frame: u32,
    pub frames: u32,
    pub buffer: u32,
    counter: u32,
}

impl FrameCycle {
    pub const fn new(frames: u32, buffer: u32) -> Self {
        Self {
            frame: 0,
            frames,
            buffer,
            counter: 0,
        }
    }

    /// Returns true when the cycle wrapped back to frame 0 on this tick.
    pub fn advance(&mut self) -> bool {
        self.counter += 1;
        if self.counter < self.buffer.max(1) {
            return false;
        }
        self.counter = 0;
        self.frame += 1;
        if self.frame >= self.frames {
            self.frame = 0;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.frame = 0;
        self.counter = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_buffer_ticks_elapse_then_frame_advances_and_wraps() {
        let mut cycle = FrameCycle::new(3, 2);
        let wrapped: Vec<bool> = (0..6).map(|_| cycle.advance()).collect();
        assert_eq!(wrapped, vec![false, false, false, false, false, true]);
        assert_eq!(cycle.frame, 0);
    }
}
