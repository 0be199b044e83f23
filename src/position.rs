//! Allocates a virtual position strictly between two neighbors in a
//! sibling list. `v_pos` values live in the open interval `(0, 1)`; a new
//! position is biased toward the left neighbor (favoring head inserts,
//! since appends dominate and therefore benefit from the larger gap left
//! at the tail) and jittered slightly so that two replicas allocating a
//! position "at the same spot" concurrently rarely collide exactly.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Bias toward the left neighbor when splitting the open gap.
const BIAS: f64 = 0.4;

/// Jitter magnitude, as a fraction of the gap between neighbors.
const JITTER_FRACTION: f64 = 0.005;

/// Below this gap width, a new position can no longer be reliably
/// distinguished from its neighbors in floating point. Jitter is skipped
/// and the engine falls back to `(v_pos, t)` tie-breaking to remain
/// deterministic — an accepted limitation, not a bug.
pub const PRECISION_FLOOR: f64 = 1e-9;

/// A pluggable source of jitter, so tests can inject determinism.
pub trait JitterSource {
    /// A sample uniformly distributed in `[0, 1)`.
    fn sample(&mut self) -> f64;
}

/// The default jitter source, backed by a non-deterministic RNG.
pub struct RandomJitter(StdRng);

impl Default for RandomJitter {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl JitterSource for RandomJitter {
    fn sample(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// A deterministic jitter source seeded for reproducible tests.
pub struct SeededJitter(StdRng);

impl SeededJitter {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl JitterSource for SeededJitter {
    fn sample(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// A jitter source that always returns the same sample; useful for tests
/// that want a fully predictable position with no randomness at all.
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn sample(&mut self) -> f64 {
        self.0
    }
}

/// Allocate a `v_pos` strictly between `prev` and `next` (defaulting to the
/// virtual endpoints `0.0` and `1.0` when a neighbor is absent).
pub fn allocate_v_pos(prev: Option<f64>, next: Option<f64>, jitter: &mut impl JitterSource) -> f64 {
    let prev = prev.unwrap_or(0.0);
    let next = next.unwrap_or(1.0);
    let gap = next - prev;

    if gap <= PRECISION_FLOOR {
        // No room left to jitter into; split the gap as best we can and
        // let (v_pos, t) tie-breaking do the rest.
        return prev + gap / 2.0;
    }

    let base = prev + BIAS * gap;
    let magnitude = JITTER_FRACTION * gap;
    let offset = (jitter.sample() * 2.0 - 1.0) * magnitude;
    (base + offset).clamp(prev + f64::EPSILON, next - f64::EPSILON)
}
