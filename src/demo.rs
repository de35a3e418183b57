// Random sample data for the demo binary.
// Deterministic per seed, so the same command line always paints the same map.

use crate::types::WeightedPoint;

/// xorshift32; fast and good enough for scattering demo points.
#[derive(Clone)]
pub struct Rng32 {
    state: u32,
}

impl Rng32 {
    pub fn from_seed(seed: u32) -> Self {
        Self { state: seed | 1 }
    }

    #[inline]
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform [0,1)
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / ((1u32 << 24) as f32)
    }
}

/// `count` points uniformly inside `width` x `height`, values in [0, max_value).
pub fn random_points(
    rng: &mut Rng32,
    count: usize,
    width: f32,
    height: f32,
    max_value: f32,
) -> Vec<WeightedPoint> {
    (0..count)
        .map(|_| {
            let x = rng.next_f32() * width;
            let y = rng.next_f32() * height;
            let v = rng.next_f32() * max_value;
            WeightedPoint::new(x, y, v)
        })
        .collect()
}
