use std::{collections::VecDeque, fmt::Write as _};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Supplies pieces using the 7-bag randomization algorithm.
///
/// # 7-Bag System
///
/// 1. Put one of each of the 7 piece types in a "bag"
/// 2. Shuffle the bag with the injected random source
/// 3. Append it to the queue of upcoming pieces
/// 4. Refill whenever 7 or fewer pieces remain before a draw
///
/// Every run of 7 draws starting at a bag boundary therefore contains each
/// piece type exactly once, while the queue always holds enough pieces to
/// preview the next one.
///
/// The random source is a type parameter so tests and replays can inject a
/// seeded generator; [`PieceBag::new`] seeds one from the OS.
///
/// # Example
///
/// ```
/// use stackfall_engine::PieceBag;
///
/// let mut bag = PieceBag::new();
///
/// let next = bag.peek_next();
/// assert_eq!(bag.draw(), next);
///
/// let upcoming: Vec<_> = bag.upcoming().take(5).collect();
/// assert_eq!(upcoming.len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct PieceBag<R = Pcg32> {
    rng: R,
    queue: VecDeque<PieceKind>,
}

impl Default for PieceBag {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed for deterministic piece generation.
///
/// A 128-bit seed for the bag's random generator. The same seed always
/// produces the same piece sequence, which makes games reproducible for
/// tests and scripted replays.
///
/// Serialized as a 32-character hex string.
///
/// # Example
///
/// ```
/// use stackfall_engine::{EngineConfig, GameEngine, PieceSeed};
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
///
/// let engine1 = GameEngine::with_seed(EngineConfig::default(), seed).unwrap();
/// let engine2 = GameEngine::with_seed(EngineConfig::default(), seed).unwrap();
/// assert_eq!(engine1.active_piece(), engine2.active_piece());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(value.to_be_bytes())
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let num = u128::from_be_bytes(self.0);
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{num:032x}").unwrap();
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        if hex_str.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            )));
        }
        let num = u128::from_str_radix(&hex_str, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid hex: {hex_str} ({e})")))?;
        Ok(Self::from_u128(num))
    }
}

impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

impl PieceBag {
    /// Creates a new bag seeded from the OS random source.
    ///
    /// For deterministic piece generation, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self::from_rng(Pcg32::from_seed(seed.0))
    }
}

impl<R: Rng> PieceBag<R> {
    /// Creates a bag drawing its shuffles from `rng`.
    ///
    /// The queue is filled up front, so the next piece can be previewed
    /// before the first draw.
    pub fn from_rng(rng: R) -> Self {
        let mut this = Self {
            rng,
            queue: VecDeque::with_capacity(PieceKind::LEN * 2),
        };
        this.fill_bag();
        this
    }

    /// Appends shuffled bags while 7 or fewer pieces remain.
    ///
    /// Afterwards the queue holds at least 8 pieces, so 7 are left to preview
    /// after the next draw.
    fn fill_bag(&mut self) {
        while self.queue.len() <= PieceKind::LEN {
            let mut new_bag = PieceKind::ALL;
            new_bag.shuffle(&mut self.rng);
            self.queue.extend(new_bag);
        }
    }

    /// Draws the next piece.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty (never happens after a refill).
    pub fn draw(&mut self) -> PieceKind {
        self.fill_bag();
        self.queue
            .pop_front()
            .expect("piece bag should never be empty")
    }

    /// Returns the piece the next [`Self::draw`] will return.
    #[must_use]
    pub fn peek_next(&self) -> PieceKind {
        self.queue[0]
    }

    /// Returns an iterator over the queued pieces, next piece first.
    ///
    /// The iterator always yields at least 7 pieces.
    pub fn upcoming(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.queue.iter().copied()
    }
}
