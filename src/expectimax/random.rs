use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::engine::{Board, Move};

use super::Policy;

/// Picks uniformly among the moves that change the board.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn seeded(seed: u64) -> Self { Self { rng: StdRng::seed_from_u64(seed) } }

    pub fn from_entropy() -> Self { Self { rng: StdRng::from_entropy() } }

    pub fn best_move(&mut self, board: Board) -> Option<Move> {
        board.available_moves().choose(&mut self.rng).copied()
    }
}

impl Policy for RandomPolicy {
    fn best_move(&mut self, board: Board) -> Option<Move> { RandomPolicy::best_move(self, board) }

    fn name(&self) -> &'static str { "random" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_picks_legal_moves() {
        // Left and up are no-ops here.
        let b = Board::from_grid([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
        let mut policy = RandomPolicy::seeded(3);
        for _ in 0..64 {
            let mv = policy.best_move(b).unwrap();
            assert!(mv == Move::Down || mv == Move::Right);
        }
    }

    #[test]
    fn same_seed_same_choices() {
        let b = Board::from_grid([[0, 0, 0, 0], [0, 2, 0, 0], [0; 4], [0; 4]]).unwrap();
        let mut a = RandomPolicy::seeded(11);
        let mut c = RandomPolicy::seeded(11);
        let left: Vec<_> = (0..16).map(|_| a.best_move(b)).collect();
        let right: Vec<_> = (0..16).map(|_| c.best_move(b)).collect();
        assert_eq!(left, right);
    }
}
