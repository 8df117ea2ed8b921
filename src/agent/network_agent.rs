use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{AgentError, NetworkError};
use crate::network::{Network, NetworkState};
use crate::training::TrainingSample;

use super::encoding::{argmax, mask_illegal, one_hot};
use super::game::Game;
use super::random::RandomMover;

/// Agent hyperparameters.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Corrective retrains allowed per move before falling back to a random
    /// legal action.
    pub max_retries: usize,
    /// Probability that a neuron's activation parameters are re-drawn when a
    /// network is restored from a saved state.
    pub activation_mutation_rate: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            max_retries: 100,
            activation_mutation_rate: 0.0,
        }
    }
}

/// How a move was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSource {
    /// First move of a game, played at random.
    Opening,
    /// The network's top prediction was legal.
    Network,
    /// Retries were exhausted, or no legal action maps onto an output.
    RandomFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveDecision {
    pub action: usize,
    /// Corrective retrains run before the move was accepted.
    pub retries: usize,
    pub source: MoveSource,
}

/// Move-predicting player backed by a [`Network`].
pub struct NetworkAgent {
    network: Network,
    config: AgentConfig,
    random: RandomMover,
}

impl NetworkAgent {
    pub fn new(network: Network, config: AgentConfig) -> Self {
        NetworkAgent {
            network,
            config,
            random: RandomMover::new(),
        }
    }

    pub fn with_seed(network: Network, config: AgentConfig, seed: u64) -> Self {
        NetworkAgent {
            network,
            config,
            random: RandomMover::with_seed(seed),
        }
    }

    /// Restore an agent from a saved network, applying the configured
    /// activation mutation.
    pub fn from_state(state: &NetworkState, config: AgentConfig) -> Result<Self, NetworkError> {
        let network = Network::from_state(state)?;
        Ok(Self::mutated(network, config))
    }

    /// Load a saved network into `network`, which may be wider than the
    /// record. Neurons and synapses the record does not cover keep their
    /// random initialisation.
    pub fn restore_into(
        mut network: Network,
        state: &NetworkState,
        config: AgentConfig,
    ) -> Result<Self, NetworkError> {
        network.import_state(state)?;
        Ok(Self::mutated(network, config))
    }

    fn mutated(mut network: Network, config: AgentConfig) -> Self {
        if config.activation_mutation_rate > 0.0 {
            let mut rng = StdRng::from_os_rng();
            let changed = network.perturb_activations(config.activation_mutation_rate, &mut rng);
            log::debug!("restored network with {changed} re-drawn activations");
        }
        Self::new(network, config)
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    pub fn into_network(self) -> Network {
        self.network
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn predict(&mut self, input: &[f64]) -> Result<Vec<f64>, NetworkError> {
        self.network.forward(input)
    }

    /// Train once on every sample, in order. Returns the fraction whose
    /// pre-update prediction already pointed at the expected action.
    pub fn learn(&mut self, samples: &[TrainingSample]) -> Result<f64, NetworkError> {
        if samples.is_empty() {
            return Ok(0.0);
        }
        let mut hits = 0;
        for sample in samples {
            let output = self
                .network
                .train_step(&sample.input, &sample.expected_output)?;
            if sample.is_hit(&output) {
                hits += 1;
            }
        }
        Ok(hits as f64 / samples.len() as f64)
    }

    /// Pick a move for the player about to play.
    ///
    /// When the top prediction is illegal, the network is retrained on the
    /// spot towards its best legal output and asked again, up to
    /// `max_retries` times; after that a random legal action is played.
    /// When no legal action has an output neuron there is nothing to train
    /// towards, so the random move is played straight away.
    pub fn select_move<G: Game + ?Sized>(&mut self, game: &G) -> Result<MoveDecision, AgentError> {
        if game.legal_actions().is_empty() {
            return Err(AgentError::NoLegalMoves);
        }

        if game.moves_played() == 0 {
            let action = self.random.select(game).ok_or(AgentError::NoLegalMoves)?;
            return Ok(MoveDecision {
                action,
                retries: 0,
                source: MoveSource::Opening,
            });
        }

        let input = game.encode();
        let mut retries = 0;
        loop {
            let output = self.network.forward(&input)?;
            if let Some(action) = argmax(&output).filter(|&a| game.is_legal(a)) {
                return Ok(MoveDecision {
                    action,
                    retries,
                    source: MoveSource::Network,
                });
            }

            let masked = mask_illegal(&output, |i| game.is_legal(i));
            let Some(best) = argmax(&masked).filter(|&i| masked[i].is_finite()) else {
                log::debug!("no legal action has an output neuron, playing at random");
                return self.fall_back(game, retries);
            };

            if retries >= self.config.max_retries {
                log::debug!("no legal prediction after {retries} retries, playing at random");
                return self.fall_back(game, retries);
            }

            self.network.continue_train(&one_hot(output.len(), best))?;
            retries += 1;
        }
    }

    fn fall_back<G: Game + ?Sized>(
        &mut self,
        game: &G,
        retries: usize,
    ) -> Result<MoveDecision, AgentError> {
        let action = self.random.select(game).ok_or(AgentError::NoLegalMoves)?;
        Ok(MoveDecision {
            action,
            retries,
            source: MoveSource::RandomFallback,
        })
    }
}
