use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::game::Game;

/// Picks uniformly at random among the legal actions.
pub struct RandomMover {
    rng: StdRng,
}

impl RandomMover {
    pub fn new() -> Self {
        RandomMover {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        RandomMover {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// `None` when the game has no legal action left.
    pub fn select<G: Game + ?Sized>(&mut self, game: &G) -> Option<usize> {
        let actions = game.legal_actions();
        if actions.is_empty() {
            return None;
        }
        let idx = self.rng.random_range(0..actions.len());
        Some(actions[idx])
    }
}

impl Default for RandomMover {
    fn default() -> Self {
        Self::new()
    }
}
