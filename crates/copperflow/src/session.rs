//! Per-invocation mutable state.
//!
//! All randomness and the claimed-point set live in one session value that
//! is constructed fresh for every engine invocation and threaded explicitly
//! through placement, net synthesis, and routing. Nothing here is global:
//! two invocations never share a session, which keeps samples independent
//! and reproducible if generation is ever parallelized across samples.

use std::collections::HashSet;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use copperflow_core::geometry::Point;

/// Occupancy keys snap to this many units per millimeter.
const CLAIM_RESOLUTION: f32 = 10.0;

/// Seeded PRNG stream plus the sub-millimeter occupancy set.
pub struct PlacementSession {
    pub rng: ChaCha8Rng,
    occupied: HashSet<(i64, i64)>,
}

impl PlacementSession {
    /// Creates a session with a fresh ChaCha stream for the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            occupied: HashSet::new(),
        }
    }

    fn key(point: Point) -> (i64, i64) {
        (
            (point.x() * CLAIM_RESOLUTION) as i64,
            (point.y() * CLAIM_RESOLUTION) as i64,
        )
    }

    /// Returns true if the point's 0.1mm cell has already been claimed.
    pub fn is_claimed(&self, point: Point) -> bool {
        self.occupied.contains(&Self::key(point))
    }

    /// Claims the point's 0.1mm cell.
    pub fn claim(&mut self, point: Point) {
        self.occupied.insert(Self::key(point));
    }
}
