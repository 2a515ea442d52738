use rand::Rng;

pub const STAR_SPEED: f32 = 5.0;
/// Overdrive multiplies star travel during the intro.
pub const OVERDRIVE_FACTOR: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub variance: f32,
}

impl Star {
    pub fn random(width: f32, height: f32, rng: &mut impl Rng) -> Self {
        Self {
            x: rng.gen_range(0.0..width),
            y: rng.gen_range(0.0..height),
            size: rng.gen_range(1.0..3.0f32).floor(),
            variance: rng.r#gen::<f32>().max(0.2),
        }
    }

    pub fn update(&mut self, overdrive: bool, width: f32) {
        let factor = if overdrive { OVERDRIVE_FACTOR } else { 1.0 };
        self.x -= STAR_SPEED * self.variance * factor;
        if self.x + self.size < 0.0 {
            self.x = width;
        }
    }
}

pub fn star_field(count: usize, width: f32, height: f32, rng: &mut impl Rng) -> Vec<Star> {
    (0..count).map(|_| Star::random(width, height, rng)).collect()
}
