//! Lightweight xorshift32 PRNG, seedable so every effect run is reproducible

use blossom_core::{Rect, ValueRange, Vec2};

#[derive(Clone, Debug)]
pub struct ParticleRng {
    state: u32,
}

impl ParticleRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Returns a float in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        // 24 high bits fit the f32 mantissa exactly, so 1.0 is never produced
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Returns a float in [min, max)
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Uniform sample from a configured range; degenerate ranges return `min`
    pub fn sample(&mut self, range: ValueRange) -> f32 {
        if range.min == range.max {
            range.min
        } else {
            self.range(range.min, range.max)
        }
    }

    /// True with probability `p`
    pub fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }

    /// Uniform index into a collection of `len` items; `len` must be non-zero
    pub fn index(&mut self, len: usize) -> usize {
        ((self.next_f32() * len as f32) as usize).min(len - 1)
    }

    /// Uniform pick from a slice
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            Some(&items[self.index(items.len())])
        }
    }

    /// Uniform point inside a rectangle
    pub fn point_in(&mut self, rect: Rect) -> Vec2 {
        Vec2::new(
            rect.x + self.next_f32() * rect.width,
            rect.y + self.next_f32() * rect.height,
        )
    }
}
