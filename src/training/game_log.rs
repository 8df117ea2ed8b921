use serde::{Deserialize, Serialize};

use crate::agent::{flip_perspective, one_hot};
use crate::training::TrainingSample;

/// One move of a finished or ongoing game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub player: usize,
    /// Board encoding from the mover's point of view.
    pub input: Vec<f64>,
    pub action: usize,
}

/// Move history of a single game, used to turn a win into training samples.
///
/// Player 0's boards are stored sign-flipped so that every recorded input
/// reads as if player 1 were about to move; a network trained on the log
/// can then play either side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameLog {
    rounds: Vec<RoundRecord>,
}

impl GameLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, player: usize, board: &[f64], action: usize) {
        let input = if player == 0 {
            flip_perspective(board)
        } else {
            board.to_vec()
        };
        self.rounds.push(RoundRecord {
            player,
            input,
            action,
        });
    }

    pub fn rounds(&self) -> &[RoundRecord] {
        &self.rounds
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn clear(&mut self) {
        self.rounds.clear();
    }

    /// One sample per move the winner made, with a one-hot target at the
    /// played action.
    pub fn winner_samples(&self, winner: usize, output_width: usize) -> Vec<TrainingSample> {
        self.rounds
            .iter()
            .filter(|round| round.player == winner && round.action < output_width)
            .map(|round| {
                TrainingSample::new(round.input.clone(), one_hot(output_width, round.action))
            })
            .collect()
    }
}
