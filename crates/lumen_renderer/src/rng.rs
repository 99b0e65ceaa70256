//! Per-worker xorshift random stream.
//!
//! The generator is a single `u32` and cheap to reseed. Each render
//! tile owns exactly one instance for the duration of a pass.

use rand::{Error, RngCore, SeedableRng};

/// Odd salt mixed into every seed so that seeding with zero still changes
/// the state.
pub const SEED_SALT: u32 = 0x95E1E5;

/// 1 / 2^32
const INV_U32_RANGE: f32 = 1.0 / 4_294_967_296.0;

/// Largest f32 strictly below 1.0.
const ONE_MINUS_EPSILON: f32 = 1.0 - f32::EPSILON / 2.0;

/// Map a raw 32-bit draw into [0, 1).
///
/// `u32 -> f32` rounds to nearest, so the top of the range would land on
/// exactly 1.0 without the clamp.
#[inline]
pub fn unit_float(bits: u32) -> f32 {
    (bits as f32 * INV_U32_RANGE).min(ONE_MINUS_EPSILON)
}

/// 32-bit xorshift generator (13/17/15).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XorShiftRng {
    state: u32,
}

impl XorShiftRng {
    /// Create a generator. A zero state would be a fixed point, so it is
    /// replaced by the salt.
    pub fn new(state: u32) -> Self {
        Self {
            state: if state == 0 { SEED_SALT } else { state },
        }
    }

    /// Current state, mostly useful for tests and diagnostics.
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Mix `value` into the state.
    ///
    /// Seeding is cumulative: it XORs into the existing state rather than
    /// replacing it, so reseeding per pixel keeps streams apart without
    /// resetting them.
    #[inline]
    pub fn seed(&mut self, value: u32) {
        self.state ^= value | SEED_SALT;
        if self.state == 0 {
            self.state = SEED_SALT;
        }
    }

    /// Advance the state and return it.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 15;
        self.state = x;
        x
    }

    /// Draw in `[min, max)` by modulo. Biased, which is fine for
    /// skip decisions. An empty range returns `min`.
    #[inline]
    pub fn next_u32_in_range(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        self.next_u32() % (max - min) + min
    }

    /// Draw in `[0, 1)`.
    #[inline]
    pub fn next_float_unit(&mut self) -> f32 {
        unit_float(self.next_u32())
    }
}

impl RngCore for XorShiftRng {
    fn next_u32(&mut self) -> u32 {
        XorShiftRng::next_u32(self)
    }

    fn next_u64(&mut self) -> u64 {
        let hi = XorShiftRng::next_u32(self) as u64;
        let lo = XorShiftRng::next_u32(self) as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = XorShiftRng::next_u32(self).to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for XorShiftRng {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sequence() {
        let mut rng = XorShiftRng::new(1);

        // 0x2001 after << 13, unchanged by >> 17, then ^ 0x1000_8000 after << 15
        assert_eq!(rng.next_u32(), 0x1000_A001);
    }

    #[test]
    fn test_same_seeds_same_sequence() {
        let mut a = XorShiftRng::new(666);
        let mut b = XorShiftRng::new(666);
        for seed in [0u32, 17, 99, 12345] {
            a.seed(seed);
            b.seed(seed);
        }

        let first: Vec<u32> = (0..64).map(|_| a.next_u32()).collect();
        let second: Vec<u32> = (0..64).map(|_| b.next_u32()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_seed_is_cumulative() {
        let mut rng = XorShiftRng::new(666);
        rng.seed(5);
        let once = rng.state();
        rng.seed(5);

        // XORing the same value twice restores the starting state
        assert_ne!(once, 666);
        assert_eq!(rng.state(), 666);
    }

    #[test]
    fn test_seed_never_leaves_zero_state() {
        let mut rng = XorShiftRng::new(SEED_SALT);
        rng.seed(0);
        assert_ne!(rng.state(), 0);
        assert_eq!(XorShiftRng::new(0).state(), SEED_SALT);
    }

    #[test]
    fn test_unit_float_range() {
        let mut rng = XorShiftRng::new(42);
        for _ in 0..10_000 {
            let x = rng.next_float_unit();
            assert!((0.0..1.0).contains(&x), "{} out of range", x);
        }
        assert!(unit_float(u32::MAX) < 1.0);
        assert_eq!(unit_float(0), 0.0);
    }

    #[test]
    fn test_range() {
        let mut rng = XorShiftRng::new(7);
        for _ in 0..1000 {
            let x = rng.next_u32_in_range(10, 20);
            assert!((10..20).contains(&x));
        }
        assert_eq!(rng.next_u32_in_range(5, 5), 5);
    }

    #[test]
    fn test_rng_core_fill_bytes() {
        let mut rng = XorShiftRng::from_seed(1u32.to_le_bytes());
        let mut bytes = [0u8; 6];
        rng.fill_bytes(&mut bytes);

        assert_eq!(&bytes[..4], &0x1000_A001u32.to_le_bytes());
    }
}
