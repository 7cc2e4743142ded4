//! # Simplex Noise Source
//!
//! Seeded 2D simplex noise plus the two compositions terrain needs:
//! normalized fBm and domain warp.
//!
//! ## Determinism Guarantee
//!
//! The permutation table is shuffled by a `ChaCha8Rng` seeded from the world
//! seed, and everything after that is plain `f64` arithmetic. Given the same
//! seed, every sample is bit-identical on every platform, every run.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Largest value the `*01` samplers return; keeps the range half-open.
const MAX_UNIT: f64 = 1.0 - f64::EPSILON;

/// Offset applied to the second warp channel so it decorrelates from the first.
const WARP_OFFSET_X: f64 = 123.4;
/// Second warp channel Z offset.
const WARP_OFFSET_Z: f64 = 456.7;

/// 12 gradient vectors for 2D simplex.
const GRADIENTS: [[f64; 2]; 12] = [
    [1.0, 0.0],
    [1.0, 1.0],
    [0.0, 1.0],
    [-1.0, 1.0],
    [-1.0, 0.0],
    [-1.0, -1.0],
    [0.0, -1.0],
    [1.0, -1.0],
    [1.0, 0.0],
    [0.0, 1.0],
    [-1.0, 0.0],
    [0.0, -1.0],
];

/// Seeded 2D noise primitive.
///
/// # Example
///
/// ```rust,ignore
/// let noise = NoiseSource::new(42);
///
/// let value = noise.sample01(100.5, 200.3);
/// assert!((0.0..1.0).contains(&value));
///
/// // Warp first, then fBm
/// let (wx, wz) = noise.warp(x, z, 120.0, 8.0);
/// let h = noise.fbm01(wx / 50.0, wz / 50.0, 5, 2.0, 0.5);
/// ```
#[derive(Clone)]
pub struct NoiseSource {
    /// Seed the table was built from.
    seed: u64,
    /// 512-entry permutation table (256 entries, doubled for overflow handling).
    perm: [u8; 512],
}

impl NoiseSource {
    /// Skewing factor for 2D simplex grid.
    const F2: f64 = 0.366_025_403_784_439; // (sqrt(3) - 1) / 2
    /// Unskewing factor for 2D simplex grid.
    const G2: f64 = 0.211_324_865_405_187; // (3 - sqrt(3)) / 6

    /// Creates a noise source from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            perm: Self::build_permutation(seed),
        }
    }

    /// Reseeds in place, rebuilding the permutation table.
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
        self.perm = Self::build_permutation(seed);
    }

    /// Returns the seed.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    fn build_permutation(seed: u64) -> [u8; 512] {
        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().take(256).enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for i in (1..256u32).rev() {
            let j = rng.gen_range(0..=i);
            perm.swap(i as usize, j as usize);
        }

        // Double the table to avoid index wrapping
        let (low, high) = perm.split_at_mut(256);
        high.copy_from_slice(low);
        perm
    }

    #[inline]
    fn perm(&self, index: usize) -> usize {
        usize::from(self.perm[index & 511])
    }

    /// Samples 2D simplex noise.
    ///
    /// # Returns
    ///
    /// A value in the range [-1, 1].
    #[must_use]
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        // Skew input coordinates to simplex grid
        let skew = (x + z) * Self::F2;
        let i = (x + skew).floor();
        let j = (z + skew).floor();

        // Unskew to get first corner in simplex
        let unskew = (i + j) * Self::G2;
        let x0 = x - (i - unskew);
        let z0 = z - (j - unskew);

        // Upper or lower triangle
        let (i1, j1) = if x0 > z0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - f64::from(i1) + Self::G2;
        let z1 = z0 - f64::from(j1) + Self::G2;
        let x2 = x0 - 1.0 + 2.0 * Self::G2;
        let z2 = z0 - 1.0 + 2.0 * Self::G2;

        // Hash corners; rem_euclid keeps negative cells in 0..256
        let ii = (i.rem_euclid(256.0)) as usize;
        let jj = (j.rem_euclid(256.0)) as usize;
        let i1 = i1 as usize;
        let j1 = j1 as usize;

        let g0 = self.perm(ii + self.perm(jj));
        let g1 = self.perm(ii + i1 + self.perm(jj + j1));
        let g2 = self.perm(ii + 1 + self.perm(jj + 1));

        let n0 = Self::contribution(x0, z0, g0);
        let n1 = Self::contribution(x1, z1, g1);
        let n2 = Self::contribution(x2, z2, g2);

        // 70 normalizes the corner sum to roughly [-1, 1]
        (70.0 * (n0 + n1 + n2)).clamp(-1.0, 1.0)
    }

    #[inline]
    fn contribution(x: f64, z: f64, hash: usize) -> f64 {
        let t = 0.5 - x * x - z * z;
        if t < 0.0 {
            0.0
        } else {
            let grad = GRADIENTS[hash % GRADIENTS.len()];
            let t2 = t * t;
            t2 * t2 * (x * grad[0] + z * grad[1])
        }
    }

    /// Samples noise remapped to [0, 1).
    #[inline]
    #[must_use]
    pub fn sample01(&self, x: f64, z: f64) -> f64 {
        ((self.sample(x, z) + 1.0) * 0.5).clamp(0.0, MAX_UNIT)
    }

    /// Fractal Brownian motion in [0, 1).
    ///
    /// Sums `octaves` layers of `sample01`, multiplying frequency by
    /// `lacunarity` and amplitude by `gain` each layer, normalized by the
    /// total amplitude. Zero octaves returns 0.
    #[must_use]
    pub fn fbm01(&self, x: f64, z: f64, octaves: u32, lacunarity: f64, gain: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut norm = 0.0;

        for _ in 0..octaves {
            total += self.sample01(x * frequency, z * frequency) * amplitude;
            norm += amplitude;
            amplitude *= gain;
            frequency *= lacunarity;
        }

        if norm > 0.0 {
            (total / norm).clamp(0.0, MAX_UNIT)
        } else {
            0.0
        }
    }

    /// Domain warp: displaces `(x, z)` by low-frequency noise.
    ///
    /// Each axis moves by at most `strength / 2`. The two axes read
    /// decorrelated channels of the same source.
    #[must_use]
    pub fn warp(&self, x: f64, z: f64, scale: f64, strength: f64) -> (f64, f64) {
        let dx = self.sample01(x / scale, z / scale) - 0.5;
        let dz = self.sample01((x + WARP_OFFSET_X) / scale, (z + WARP_OFFSET_Z) / scale) - 0.5;
        (x + strength * dx, z + strength * dz)
    }
}

impl std::fmt::Debug for NoiseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseSource").field("seed", &self.seed).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let noise1 = NoiseSource::new(12345);
        let noise2 = NoiseSource::new(12345);

        for i in 0..100 {
            let x = f64::from(i) * 0.1;
            let z = f64::from(i) * 0.17;
            assert_eq!(
                noise1.sample(x, z).to_bits(),
                noise2.sample(x, z).to_bits(),
                "Noise should be deterministic"
            );
        }
    }

    #[test]
    fn test_different_seeds_different_results() {
        let noise1 = NoiseSource::new(1);
        let noise2 = NoiseSource::new(2);

        let differs = (0..32).any(|i| {
            let x = f64::from(i) * 3.7 + 0.3;
            noise1.sample(x, x * 0.5) != noise2.sample(x, x * 0.5)
        });
        assert!(differs, "Different seeds should produce different results");
    }

    #[test]
    fn test_set_seed_matches_new() {
        let mut noise = NoiseSource::new(1);
        noise.set_seed(99);
        let fresh = NoiseSource::new(99);
        assert_eq!(noise.seed(), 99);
        assert_eq!(noise.sample(12.3, -4.5), fresh.sample(12.3, -4.5));
    }

    #[test]
    fn test_range() {
        let noise = NoiseSource::new(42);

        for i in 0..10_000 {
            let x = f64::from(i) * 0.1 - 500.0;
            let z = f64::from(i) * 0.13 - 650.0;

            let value = noise.sample(x, z);
            assert!((-1.0..=1.0).contains(&value), "Value {value} out of range at ({x}, {z})");

            let unit = noise.sample01(x, z);
            assert!((0.0..1.0).contains(&unit), "sample01 {unit} out of range");
        }
    }

    #[test]
    fn test_continuity() {
        let noise = NoiseSource::new(42);
        let delta = 0.001;

        let v1 = noise.sample(100.0, 100.0);
        let v2 = noise.sample(100.0 + delta, 100.0);
        let v3 = noise.sample(100.0, 100.0 + delta);

        assert!((v1 - v2).abs() < 0.01, "Noise should be continuous");
        assert!((v1 - v3).abs() < 0.01, "Noise should be continuous");
    }

    #[test]
    fn test_fbm_range_and_zero_octaves() {
        let noise = NoiseSource::new(42);

        for i in 0..2_000 {
            let x = f64::from(i) * 0.37 - 300.0;
            let value = noise.fbm01(x, -x * 0.7, 6, 2.0, 0.5);
            assert!((0.0..1.0).contains(&value), "fbm01 {value} out of range");
        }

        assert_eq!(noise.fbm01(1.0, 2.0, 0, 2.0, 0.5), 0.0);
    }

    #[test]
    fn test_fbm_single_octave_is_sample01() {
        let noise = NoiseSource::new(7);
        let a = noise.fbm01(3.3, 4.4, 1, 2.0, 0.5);
        let b = noise.sample01(3.3, 4.4);
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn test_warp_bounded_by_half_strength() {
        let noise = NoiseSource::new(42);
        let strength = 8.0;

        for i in 0..1_000 {
            let x = f64::from(i) * 1.3;
            let z = f64::from(i) * -0.9;
            let (wx, wz) = noise.warp(x, z, 120.0, strength);
            assert!((wx - x).abs() <= strength * 0.5);
            assert!((wz - z).abs() <= strength * 0.5);
        }

        // Zero strength is the identity
        assert_eq!(noise.warp(5.0, 6.0, 120.0, 0.0), (5.0, 6.0));
    }

    #[test]
    fn test_negative_coordinates_are_smooth() {
        let noise = NoiseSource::new(3);
        let a = noise.sample(-0.0005, -10.0);
        let b = noise.sample(0.0005, -10.0);
        assert!((a - b).abs() < 0.01);
    }
}
