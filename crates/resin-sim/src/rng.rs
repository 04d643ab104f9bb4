//! Seedable random source shared by the simulators.

/// Thin wrapper over [`fastrand::Rng`] with the draws the simulators need.
#[derive(Debug, Clone)]
pub struct SimRng {
    inner: fastrand::Rng,
}

impl Default for SimRng {
    fn default() -> Self {
        Self::new()
    }
}

impl SimRng {
    /// Entropy-seeded generator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: fastrand::Rng::new(),
        }
    }

    /// Deterministic generator.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            inner: fastrand::Rng::with_seed(seed),
        }
    }

    /// Seeded when a seed is given, entropy-seeded otherwise.
    #[must_use]
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::new, Self::with_seed)
    }

    /// Uniform in `[0, 1)`.
    #[inline]
    pub fn f64(&mut self) -> f64 {
        self.inner.f64()
    }

    /// True with probability `p`.
    #[inline]
    pub fn chance(&mut self, p: f64) -> bool {
        self.inner.f64() < p
    }

    /// Uniform in `low..=high`.
    #[inline]
    pub fn range_inclusive(&mut self, low: u32, high: u32) -> u32 {
        self.inner.u32(low..=high)
    }

    /// Uniform index below `len`; `len` must be non-zero.
    #[inline]
    pub fn index(&mut self, len: usize) -> usize {
        self.inner.usize(..len)
    }

    /// Index drawn proportionally to `weights`; `None` when all are zero.
    pub fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            return None;
        }
        let mut target = self.inner.f64() * total;
        let mut last = None;
        for (index, weight) in weights.iter().enumerate() {
            if *weight <= 0.0 {
                continue;
            }
            if target < *weight {
                return Some(index);
            }
            target -= weight;
            last = Some(index);
        }
        last
    }
}
