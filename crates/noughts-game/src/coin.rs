//! Randomness injection point for symbol and turn assignment.

use rand::Rng;

/// A fair coin. `true` means "the first candidate gets X" (or "X starts").
///
/// The orchestrator never touches an RNG directly; tests plug in a scripted
/// coin to make pairing and rematch outcomes deterministic.
pub trait CoinFlip: Send {
    fn flip(&mut self) -> bool;
}

impl<C: CoinFlip + ?Sized> CoinFlip for Box<C> {
    fn flip(&mut self) -> bool {
        (**self).flip()
    }
}

/// Thread-local RNG backed coin used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCoin;

impl CoinFlip for RandomCoin {
    fn flip(&mut self) -> bool {
        rand::rng().random_bool(0.5)
    }
}
