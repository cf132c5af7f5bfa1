//! RNG module - injected random sources and 7-bag piece generation
//!
//! Each bag contains one of each piece (I, O, T, S, Z, J, L), shuffled.
//! The queue keeps at least one full bag buffered so previews never touch the RNG.
//!
//! Randomness is always injected through [`RandomSource`]; nothing here seeds itself from
//! the process. [`SimpleRng`] is the default LCG and [`SequenceRng`] replays fixed values
//! for tests.

use arrayvec::ArrayVec;

use crate::types::{PieceKind, MAX_PREVIEW};

/// Source of pseudo-random numbers used by the bag and by garbage generation
pub trait RandomSource {
    /// Generate next random u32
    fn next_u32(&mut self) -> u32;

    /// Generate random value in range [0, max)
    fn next_range(&mut self, max: u32) -> u32 {
        debug_assert!(max > 0, "next_range needs a non-empty range");
        self.next_u32() % max.max(1)
    }

    /// Shuffle a slice using Fisher-Yates
    fn shuffle<T>(&mut self, slice: &mut [T])
    where
        Self: Sized,
    {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Current internal state (re-seeding with it continues the same sequence)
    pub fn state(&self) -> u32 {
        self.state
    }
}

impl RandomSource for SimpleRng {
    fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }
}

/// Replays a fixed list of values, cycling when exhausted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRng {
    values: Vec<u32>,
    index: usize,
}

impl SequenceRng {
    pub fn new(values: impl Into<Vec<u32>>) -> Self {
        let mut values = values.into();
        if values.is_empty() {
            values.push(0);
        }
        Self { values, index: 0 }
    }
}

impl RandomSource for SequenceRng {
    fn next_u32(&mut self) -> u32 {
        let value = self.values[self.index % self.values.len()];
        self.index = self.index.wrapping_add(1);
        value
    }
}

const BAG_SIZE: usize = 7;

/// 7-bag piece generator with lookahead
#[derive(Debug, Clone)]
pub struct PieceQueue<R = SimpleRng> {
    /// Upcoming pieces; always holds at least one bag after construction
    upcoming: ArrayVec<PieceKind, { 2 * BAG_SIZE }>,
    rng: R,
}

impl PieceQueue<SimpleRng> {
    /// Create a new piece queue seeded with the default LCG
    pub fn from_seed(seed: u32) -> Self {
        Self::new(SimpleRng::new(seed))
    }
}

impl<R: RandomSource> PieceQueue<R> {
    pub fn new(rng: R) -> Self {
        let mut queue = Self {
            upcoming: ArrayVec::new(),
            rng,
        };
        queue.refill();
        queue
    }

    /// Append shuffled bags until a full bag of lookahead is buffered
    fn refill(&mut self) {
        while self.upcoming.len() < BAG_SIZE {
            let mut bag = PieceKind::ALL;
            self.rng.shuffle(&mut bag);
            self.upcoming.extend(bag);
        }
    }

    /// Peek at the next piece without removing it
    pub fn peek(&self) -> PieceKind {
        self.upcoming[0]
    }

    /// Peek at up to `count` upcoming pieces (capped at `MAX_PREVIEW`)
    pub fn preview(&self, count: usize) -> &[PieceKind] {
        let count = count.min(MAX_PREVIEW).min(self.upcoming.len());
        &self.upcoming[..count]
    }

    /// Draw the next piece from the queue
    pub fn draw(&mut self) -> PieceKind {
        let piece = self.upcoming.remove(0);
        self.refill();
        piece
    }

    pub fn rng(&self) -> &R {
        &self.rng
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        // Same seed should produce same sequence
        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_rng_zero_seed_is_usable() {
        let mut rng = SimpleRng::new(0);
        assert_ne!(rng.next_u32(), rng.next_u32());
    }

    #[test]
    fn test_reseed_from_state_continues_stream() {
        let mut queue = PieceQueue::from_seed(42);
        queue.draw();
        let mut resumed = SimpleRng::new(queue.rng().state());
        let mut original = queue.rng().clone();
        assert_eq!(resumed.next_u32(), original.next_u32());
    }

    #[test]
    fn test_sequence_rng_cycles() {
        let mut rng = SequenceRng::new(vec![3, 7]);
        assert_eq!(rng.next_u32(), 3);
        assert_eq!(rng.next_u32(), 7);
        assert_eq!(rng.next_u32(), 3);
        assert_eq!(rng.next_range(5), 2);
    }

    #[test]
    fn test_piece_queue_draws_all_seven() {
        let mut queue = PieceQueue::from_seed(1);

        for _ in 0..3 {
            let mut drawn = Vec::new();
            for _ in 0..7 {
                drawn.push(queue.draw());
            }
            for kind in PieceKind::ALL {
                assert!(drawn.contains(&kind), "Missing piece: {:?}", kind);
            }
        }
    }

    #[test]
    fn test_piece_queue_peek_matches_draw() {
        let mut queue = PieceQueue::from_seed(1);

        for _ in 0..20 {
            let peeked = queue.peek();
            assert_eq!(peeked, queue.draw());
        }
    }

    #[test]
    fn test_piece_queue_preview_crosses_bags() {
        let mut queue = PieceQueue::from_seed(99);
        for _ in 0..5 {
            queue.draw();
        }

        let preview: Vec<PieceKind> = queue.preview(MAX_PREVIEW).to_vec();
        assert_eq!(preview.len(), MAX_PREVIEW);
        for expected in preview {
            assert_eq!(queue.draw(), expected);
        }
    }

    #[test]
    fn test_piece_queue_preview_is_capped() {
        let queue = PieceQueue::from_seed(4);
        assert_eq!(queue.preview(50).len(), MAX_PREVIEW);
        assert_eq!(queue.preview(3).len(), 3);
    }

    #[test]
    fn test_injected_sequence_controls_bag() {
        // Always swapping with index 0 makes the shuffle deterministic and easy to reason about.
        let mut queue = PieceQueue::new(SequenceRng::new(vec![0]));
        let first: Vec<PieceKind> = (0..7).map(|_| queue.draw()).collect();
        let second: Vec<PieceKind> = (0..7).map(|_| queue.draw()).collect();
        assert_eq!(first, second);
    }
}
