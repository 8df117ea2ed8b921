use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::NetworkError;

use super::activation::Activation;
use super::layer::Layer;
use super::neuron::CacheKind;
use super::state::{NetworkState, NeuronRecord, SynapseRecord};
use super::synapse::Synapse;

/// Topology used by the tic-tac-toe agent: 9 cells in, 9 move scores out.
pub const DEFAULT_LAYER_WIDTHS: [usize; 8] = [9, 30, 30, 50, 50, 30, 30, 9];

pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

/// Network hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub layer_widths: Vec<usize>,
    pub learning_rate: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            layer_widths: DEFAULT_LAYER_WIDTHS.to_vec(),
            learning_rate: DEFAULT_LEARNING_RATE,
        }
    }
}

/// Where the network stands within one training round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassPhase {
    Uninitialized,
    ForwardEvaluated,
    ExpectedSet,
    BackwardEvaluated,
    WeightsUpdated,
}

impl fmt::Display for PassPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PassPhase::Uninitialized => "uninitialized",
            PassPhase::ForwardEvaluated => "forward-evaluated",
            PassPhase::ExpectedSet => "expected-set",
            PassPhase::BackwardEvaluated => "backward-evaluated",
            PassPhase::WeightsUpdated => "weights-updated",
        };
        f.write_str(name)
    }
}

/// Strictly layered feed-forward network trained one sample at a time.
///
/// Layers own their neurons; the network owns every synapse in a single arena
/// indexed by [`SynapseId`](super::SynapseId). Per-pass caches live on the
/// neurons and are cleared at the start of every public forward/train entry
/// point.
///
/// A network is not meant to be shared between concurrent writers: every
/// mutating call takes `&mut self`, and one worker should own one network.
#[derive(Debug)]
pub struct Network {
    layers: Vec<Layer>,
    synapses: Vec<Synapse>,
    learning_rate: f64,
    phase: PassPhase,
}

impl Network {
    /// Build a network with random weights and activation parameters.
    pub fn new(layer_widths: &[usize]) -> Result<Self, NetworkError> {
        Self::with_rng(layer_widths, &mut rand::rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(
        layer_widths: &[usize],
        rng: &mut R,
    ) -> Result<Self, NetworkError> {
        validate_topology(layer_widths)?;

        let mut layers: Vec<Layer> = layer_widths
            .iter()
            .enumerate()
            .map(|(position, &width)| Layer::new(position, width, rng))
            .collect();

        let mut synapses = Vec::new();
        for position in 1..layers.len() {
            let (before, after) = layers.split_at_mut(position);
            before[position - 1].connect_to(&mut after[0], &mut synapses, rng);
        }

        Ok(Network {
            layers,
            synapses,
            learning_rate: DEFAULT_LEARNING_RATE,
            phase: PassPhase::Uninitialized,
        })
    }

    pub fn from_config(config: &NetworkConfig) -> Result<Self, NetworkError> {
        let mut network = Self::new(&config.layer_widths)?;
        network.set_learning_rate(config.learning_rate);
        Ok(network)
    }

    /// Rebuild a network from a persisted record. Entries missing from the
    /// record keep freshly randomized values.
    pub fn from_state(state: &NetworkState) -> Result<Self, NetworkError> {
        Self::from_state_with_rng(state, &mut rand::rng())
    }

    pub fn from_state_with_rng<R: Rng + ?Sized>(
        state: &NetworkState,
        rng: &mut R,
    ) -> Result<Self, NetworkError> {
        let mut network = Self::with_rng(&state.layer_widths, rng)?;
        network.import_state(state)?;
        Ok(network)
    }

    pub fn layer_widths(&self) -> Vec<usize> {
        self.layers.iter().map(Layer::width).collect()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn synapses(&self) -> &[Synapse] {
        &self.synapses
    }

    pub fn input_width(&self) -> usize {
        self.layers[0].width()
    }

    pub fn output_width(&self) -> usize {
        self.last_layer().width()
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) {
        self.learning_rate = learning_rate;
    }

    pub fn phase(&self) -> PassPhase {
        self.phase
    }

    /// Clear the per-pass caches of every neuron.
    pub fn initialize(&mut self) {
        for layer in &mut self.layers {
            layer.initialize();
        }
        self.phase = PassPhase::Uninitialized;
    }

    /// Evaluate the network on `input`. Never changes weights.
    pub fn forward(&mut self, input: &[f64]) -> Result<Vec<f64>, NetworkError> {
        self.check_input(input)?;
        self.initialize();
        debug_assert!(self.layers.iter().all(Layer::is_cleared));

        self.layers[0].set_inputs(input)?;
        for position in 0..self.layers.len() {
            let (before, after) = self.layers.split_at_mut(position);
            after[0].evaluate_forward(&self.synapses, before.last())?;
        }
        self.phase = PassPhase::ForwardEvaluated;
        self.last_layer().outputs()
    }

    /// One online training round. Returns the output computed before the
    /// weights were updated.
    ///
    /// Both vectors are checked before anything is touched, so a shape error
    /// leaves the network exactly as it was.
    pub fn train_step(
        &mut self,
        input: &[f64],
        expected_output: &[f64],
    ) -> Result<Vec<f64>, NetworkError> {
        self.check_input(input)?;
        self.check_expected(expected_output)?;
        let output = self.forward(input)?;
        self.backpropagate(expected_output)?;
        Ok(output)
    }

    /// Backward pass and weight update against `expected_output`, reusing the
    /// caches of the forward pass that just ran.
    pub fn continue_train(&mut self, expected_output: &[f64]) -> Result<(), NetworkError> {
        self.check_expected(expected_output)?;
        match self.phase {
            PassPhase::ForwardEvaluated => self.backpropagate(expected_output),
            PassPhase::Uninitialized => Err(NetworkError::UninitializedAccess {
                layer: self.layers.len() - 1,
                index: 0,
                cache: CacheKind::Output,
            }),
            phase => Err(NetworkError::StaleCacheViolation { phase }),
        }
    }

    fn backpropagate(&mut self, expected_output: &[f64]) -> Result<(), NetworkError> {
        let last = self.layers.len() - 1;
        self.layers[last].set_expected_outputs(expected_output)?;
        self.phase = PassPhase::ExpectedSet;

        // a layer's errors depend only on the errors of the layer right after it
        for position in (0..self.layers.len()).rev() {
            let (upto, after) = self.layers.split_at_mut(position + 1);
            upto[position].evaluate_backward(&self.synapses, after.first())?;
        }
        self.phase = PassPhase::BackwardEvaluated;

        for layer in &self.layers {
            layer.update_synapses(self.learning_rate, &mut self.synapses, &self.layers)?;
        }
        self.phase = PassPhase::WeightsUpdated;
        Ok(())
    }

    /// Copy every activation parameter and weight from `other`, which must
    /// have the same topology.
    pub fn copy_parameters_from(&mut self, other: &Network) -> Result<(), NetworkError> {
        let expected = self.layer_widths();
        let actual = other.layer_widths();
        if expected != actual {
            return Err(NetworkError::TopologyMismatch { expected, actual });
        }
        for (mine, theirs) in self.layers.iter_mut().zip(&other.layers) {
            for (neuron, source) in mine.neurons_mut().iter_mut().zip(theirs.neurons()) {
                neuron.set_activation(source.activation());
            }
        }
        for (mine, theirs) in self.synapses.iter_mut().zip(&other.synapses) {
            mine.set_weight(theirs.weight());
        }
        self.initialize();
        Ok(())
    }

    pub fn export_state(&self) -> NetworkState {
        let neurons = self
            .layers
            .iter()
            .map(|layer| {
                layer
                    .neurons()
                    .iter()
                    .map(|neuron| {
                        let act = neuron.activation();
                        let synapses = neuron
                            .incoming()
                            .iter()
                            .map(|id| {
                                let s = &self.synapses[id.get()];
                                SynapseRecord {
                                    from_index: s.source().index,
                                    to_index: s.target().index,
                                    weight: s.weight(),
                                }
                            })
                            .collect();
                        NeuronRecord {
                            a: act.a,
                            b: act.b,
                            synapses,
                        }
                    })
                    .collect()
            })
            .collect();
        NetworkState {
            layer_widths: self.layer_widths(),
            neurons,
        }
    }

    /// Apply the entries of `state` to this network.
    ///
    /// The record may describe a smaller network than this one (same layer
    /// count, each width no larger); neurons and synapses it does not mention
    /// are left as they are. Anything that does not fit fails with
    /// `TopologyMismatch` before a single value is written.
    pub fn import_state(&mut self, state: &NetworkState) -> Result<(), NetworkError> {
        self.check_state_fits(state)?;

        for (position, records) in state.neurons.iter().enumerate() {
            for (index, record) in records.iter().enumerate() {
                self.layers[position].neurons_mut()[index]
                    .set_activation(Activation::new(record.a, record.b));
                for s in &record.synapses {
                    let id = self.layers[position].neurons()[s.to_index].incoming()[s.from_index];
                    self.synapses[id.get()].set_weight(s.weight);
                }
            }
        }
        self.initialize();
        Ok(())
    }

    fn check_state_fits(&self, state: &NetworkState) -> Result<(), NetworkError> {
        let widths = self.layer_widths();
        let mismatch = || NetworkError::TopologyMismatch {
            expected: widths.clone(),
            actual: state.layer_widths.clone(),
        };

        if state.layer_widths.len() != widths.len() || state.neurons.len() > widths.len() {
            return Err(mismatch());
        }
        if state.layer_widths.iter().zip(&widths).any(|(theirs, mine)| theirs > mine) {
            return Err(mismatch());
        }
        for (position, records) in state.neurons.iter().enumerate() {
            if records.len() > widths[position] {
                return Err(mismatch());
            }
            for record in records {
                for s in &record.synapses {
                    let fits = position > 0
                        && s.from_index < widths[position - 1]
                        && s.to_index < widths[position];
                    if !fits {
                        return Err(mismatch());
                    }
                }
            }
        }
        Ok(())
    }

    /// Re-draw `(a, b)` of each neuron with the given probability. Returns how
    /// many neurons changed.
    /// A probability that is NaN or not above zero changes nothing.
    pub fn perturb_activations<R: Rng + ?Sized>(&mut self, probability: f64, rng: &mut R) -> usize {
        if probability.is_nan() || probability <= 0.0 {
            return 0;
        }
        let probability = probability.min(1.0);
        let mut changed = 0;
        for layer in &mut self.layers {
            for neuron in layer.neurons_mut() {
                if rng.random_bool(probability) {
                    neuron.set_activation(Activation::random(rng));
                    changed += 1;
                }
            }
        }
        self.initialize();
        changed
    }

    fn last_layer(&self) -> &Layer {
        &self.layers[self.layers.len() - 1]
    }

    fn check_input(&self, input: &[f64]) -> Result<(), NetworkError> {
        check_width(0, self.input_width(), input)
    }

    fn check_expected(&self, expected_output: &[f64]) -> Result<(), NetworkError> {
        check_width(self.layers.len() - 1, self.output_width(), expected_output)
    }
}

impl Clone for Network {
    /// Deep copy of weights and activation parameters. The copy starts with
    /// cleared caches.
    fn clone(&self) -> Self {
        let mut copy = Network {
            layers: self.layers.clone(),
            synapses: self.synapses.clone(),
            learning_rate: self.learning_rate,
            phase: PassPhase::Uninitialized,
        };
        copy.initialize();
        copy
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Network: {:?} ({} synapses, lr {})",
            self.layer_widths(),
            self.synapses.len(),
            self.learning_rate
        )
    }
}

pub(crate) fn validate_topology(layer_widths: &[usize]) -> Result<(), NetworkError> {
    if layer_widths.len() < 2 {
        return Err(NetworkError::InvalidTopology(format!(
            "need at least 2 layers, got {}",
            layer_widths.len()
        )));
    }
    if let Some(position) = layer_widths.iter().position(|&w| w == 0) {
        return Err(NetworkError::InvalidTopology(format!(
            "layer {position} has width 0"
        )));
    }
    Ok(())
}

fn check_width(layer: usize, expected: usize, values: &[f64]) -> Result<(), NetworkError> {
    if values.len() != expected {
        return Err(NetworkError::ShapeMismatch {
            layer,
            expected,
            actual: values.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded(widths: &[usize], seed: u64) -> Network {
        Network::with_rng(widths, &mut StdRng::seed_from_u64(seed)).unwrap()
    }

    fn squared_error(output: &[f64], expected: &[f64]) -> f64 {
        output
            .iter()
            .zip(expected)
            .map(|(o, e)| (o - e).powi(2))
            .sum::<f64>()
            / output.len() as f64
    }

    /// [2, 2, 1] with every weight 0.5 and every activation (1, 0).
    fn fixed_small_state() -> NetworkState {
        let plain = |synapses: Vec<SynapseRecord>| NeuronRecord {
            a: 1.0,
            b: 0.0,
            synapses,
        };
        let edges = |to: usize, from_width: usize| {
            (0..from_width)
                .map(|from| SynapseRecord {
                    from_index: from,
                    to_index: to,
                    weight: 0.5,
                })
                .collect::<Vec<_>>()
        };
        NetworkState {
            layer_widths: vec![2, 2, 1],
            neurons: vec![
                vec![plain(vec![]), plain(vec![])],
                vec![plain(edges(0, 2)), plain(edges(1, 2))],
                vec![plain(edges(0, 2))],
            ],
        }
    }

    #[test]
    fn test_rejects_degenerate_topologies() {
        assert!(matches!(Network::new(&[9]), Err(NetworkError::InvalidTopology(_))));
        assert!(matches!(Network::new(&[]), Err(NetworkError::InvalidTopology(_))));
        assert!(matches!(
            Network::new(&[3, 0, 2]),
            Err(NetworkError::InvalidTopology(_))
        ));
    }

    #[test]
    fn test_default_topology_is_fully_connected() {
        let network = Network::new(&DEFAULT_LAYER_WIDTHS).unwrap();
        assert_eq!(network.layer_widths(), DEFAULT_LAYER_WIDTHS.to_vec());
        let expected_synapses: usize = DEFAULT_LAYER_WIDTHS.windows(2).map(|w| w[0] * w[1]).sum();
        assert_eq!(network.synapses().len(), expected_synapses);
        for position in 1..network.layers().len() {
            let upstream = network.layers()[position - 1].width();
            for neuron in network.layers()[position].neurons() {
                assert_eq!(neuron.incoming().len(), upstream);
            }
        }
    }

    #[test]
    fn test_forward_output_width_matches_last_layer() {
        for widths in [vec![2, 1], vec![3, 5, 4], DEFAULT_LAYER_WIDTHS.to_vec()] {
            let mut network = seeded(&widths, 3);
            let input = vec![0.5; widths[0]];
            let output = network.forward(&input).unwrap();
            assert_eq!(output.len(), *widths.last().unwrap());
            assert!(output.iter().all(|v| (-1.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn test_forward_is_deterministic_and_clears_caches() {
        let mut network = seeded(&[4, 6, 3], 11);
        let first = network.forward(&[1.0, -1.0, 0.0, 0.5]).unwrap();
        let other = network.forward(&[0.0, 0.0, 1.0, 1.0]).unwrap();
        let second = network.forward(&[1.0, -1.0, 0.0, 0.5]).unwrap();
        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(network.phase(), PassPhase::ForwardEvaluated);
    }

    #[test]
    fn test_hand_computed_two_layer_output() {
        let mut network = Network::from_state(&fixed_small_state()).unwrap();
        let output = network.forward(&[1.0, 1.0]).unwrap();
        let hidden = (0.5f64 * 1.0 + 0.5 * 1.0).tanh();
        let expected = (0.5 * hidden + 0.5 * hidden).tanh();
        assert_eq!(output.len(), 1);
        assert!((output[0] - expected).abs() < 1e-6);
    }

    #[test]
    fn test_hand_computed_weight_update() {
        let mut network = Network::from_state(&fixed_small_state()).unwrap();
        network.train_step(&[1.0, 1.0], &[0.0]).unwrap();

        let h = 1.0f64.tanh();
        let out = h.tanh();
        let cosh2 = |x: f64| x.cosh() * x.cosh();
        let out_error = (out - 0.0) / cosh2(h);
        let hidden_error = out_error * 0.5 / cosh2(1.0);

        let last = &network.layers()[2].neurons()[0];
        assert!((last.error().unwrap() - out_error).abs() < 1e-12);
        let hidden = &network.layers()[1].neurons()[0];
        assert!((hidden.error().unwrap() - hidden_error).abs() < 1e-12);

        let w_out = network.synapses()[last.incoming()[0].get()].weight();
        assert!((w_out - (0.5 - 0.1 * out_error * h)).abs() < 1e-12);
        let w_hidden = network.synapses()[hidden.incoming()[0].get()].weight();
        assert!((w_hidden - (0.5 - 0.1 * hidden_error * 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_train_step_returns_pre_update_output() {
        let mut network = seeded(&[3, 4, 2], 5);
        let input = [0.2, -0.7, 1.0];
        let before = network.forward(&input).unwrap();
        let returned = network.train_step(&input, &[0.9, -0.9]).unwrap();
        assert_eq!(before, returned);
        assert_eq!(network.phase(), PassPhase::WeightsUpdated);

        let after = network.forward(&input).unwrap();
        assert_ne!(before, after);
        let again = network.forward(&input).unwrap();
        assert_eq!(after, again);
    }

    #[test]
    fn test_repeated_training_reduces_error() {
        let input = [0.5, -0.3, 0.8, 0.1];
        let expected = [0.6, -0.4, 0.2];

        for seed in 0..20 {
            let mut network = seeded(&[4, 6, 3], seed);
            let mut errors = Vec::with_capacity(200);
            for _ in 0..200 {
                network.train_step(&input, &expected).unwrap();
                let output = network.forward(&input).unwrap();
                errors.push(squared_error(&output, &expected));
            }

            // running mean of every error seen so far
            let trailing: Vec<f64> = errors
                .iter()
                .scan(0.0, |sum, e| {
                    *sum += e;
                    Some(*sum)
                })
                .enumerate()
                .map(|(i, sum)| sum / (i + 1) as f64)
                .collect();
            assert!(
                trailing.windows(2).all(|w| w[1] < w[0]),
                "trailing average did not decrease strictly for seed {seed}"
            );
        }
    }

    #[test]
    fn test_shape_mismatch_leaves_weights_unchanged() {
        let mut network = seeded(&[3, 4, 2], 9);
        let before = network.export_state();

        let err = network.train_step(&[1.0, 0.0], &[0.0, 1.0]).unwrap_err();
        assert_eq!(
            err,
            NetworkError::ShapeMismatch {
                layer: 0,
                expected: 3,
                actual: 2,
            }
        );
        let err = network.train_step(&[1.0, 0.0, 1.0], &[0.0]).unwrap_err();
        assert!(matches!(err, NetworkError::ShapeMismatch { layer: 2, .. }));
        assert!(network.forward(&[1.0; 5]).is_err());

        assert_eq!(network.export_state(), before);
    }

    #[test]
    fn test_errors_follow_neuron_order() {
        let mut network = seeded(&[3, 4, 2], 21);
        let input = [0.2, -0.7, 0.4];
        network.forward(&input).unwrap();
        for layer in network.layers() {
            assert!(matches!(
                layer.errors(),
                Err(NetworkError::UninitializedAccess {
                    cache: CacheKind::Error,
                    ..
                })
            ));
        }

        network.train_step(&input, &[1.0, 0.0]).unwrap();
        for layer in network.layers() {
            let per_neuron: Vec<f64> = layer
                .neurons()
                .iter()
                .map(|n| n.error().unwrap())
                .collect();
            assert_eq!(layer.errors().unwrap(), per_neuron);
            assert_eq!(per_neuron.len(), layer.width());
        }
    }

    #[test]
    fn test_continue_train_matches_train_step() {
        let mut a = seeded(&[3, 5, 2], 21);
        let mut b = a.clone();
        let input = [0.3, 0.6, -0.1];
        let target = [1.0, 0.0];

        a.train_step(&input, &target).unwrap();
        b.forward(&input).unwrap();
        b.continue_train(&target).unwrap();

        assert_eq!(a.export_state(), b.export_state());
    }

    #[test]
    fn test_continue_train_requires_fresh_forward_pass() {
        let mut network = seeded(&[2, 3, 2], 1);
        assert!(matches!(
            network.continue_train(&[0.0, 1.0]),
            Err(NetworkError::UninitializedAccess {
                cache: CacheKind::Output,
                ..
            })
        ));

        network.train_step(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert_eq!(
            network.continue_train(&[0.0, 1.0]).unwrap_err(),
            NetworkError::StaleCacheViolation {
                phase: PassPhase::WeightsUpdated,
            }
        );

        network.forward(&[1.0, 0.0]).unwrap();
        assert!(network.continue_train(&[0.0, 1.0]).is_ok());
    }

    #[test]
    fn test_clone_reproduces_outputs_until_trained() {
        let mut original = seeded(&[4, 5, 3], 8);
        let mut copy = original.clone();
        assert_eq!(copy.phase(), PassPhase::Uninitialized);

        for input in [[0.0, 0.0, 0.0, 0.0], [1.0, -1.0, 0.5, 0.2], [-0.3, 0.9, 0.1, -1.0]] {
            assert_eq!(original.forward(&input).unwrap(), copy.forward(&input).unwrap());
        }

        let input = [1.0, 0.0, -1.0, 0.0];
        copy.train_step(&input, &[1.0, 0.0, 0.0]).unwrap();
        assert_ne!(original.forward(&input).unwrap(), copy.forward(&input).unwrap());
    }

    #[test]
    fn test_copy_parameters_from_checks_topology() {
        let source = seeded(&[3, 4, 2], 2);
        let mut same = seeded(&[3, 4, 2], 3);
        same.copy_parameters_from(&source).unwrap();
        assert_eq!(same.export_state(), source.export_state());

        let mut other = seeded(&[3, 5, 2], 4);
        assert_eq!(
            other.copy_parameters_from(&source).unwrap_err(),
            NetworkError::TopologyMismatch {
                expected: vec![3, 5, 2],
                actual: vec![3, 4, 2],
            }
        );
    }

    #[test]
    fn test_export_import_is_bit_identical() {
        let mut original = seeded(&[9, 12, 9], 77);
        let json = original.export_state().to_json().unwrap();
        let state = NetworkState::from_json(&json).unwrap();
        let mut restored = Network::from_state(&state).unwrap();

        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..20 {
            let input: Vec<f64> = (0..9).map(|_| rng.random_range(-1.0..=1.0)).collect();
            let a = original.forward(&input).unwrap();
            let b = restored.forward(&input).unwrap();
            let a_bits: Vec<u64> = a.iter().map(|v| v.to_bits()).collect();
            let b_bits: Vec<u64> = b.iter().map(|v| v.to_bits()).collect();
            assert_eq!(a_bits, b_bits);
        }
    }

    #[test]
    fn test_import_into_grown_topology_keeps_fresh_entries() {
        let small = seeded(&[2, 3, 1], 12);
        let state = small.export_state();
        let mut grown = seeded(&[2, 4, 1], 13);
        let fresh = grown.clone();
        grown.import_state(&state).unwrap();

        for index in 0..3 {
            assert_eq!(
                grown.layers()[1].neurons()[index].activation(),
                small.layers()[1].neurons()[index].activation()
            );
        }
        assert_eq!(
            grown.layers()[1].neurons()[3].activation(),
            fresh.layers()[1].neurons()[3].activation()
        );

        // weight 3 -> 0 of the output layer did not exist in the record
        let out = &grown.layers()[2].neurons()[0];
        let untouched = grown.synapses()[out.incoming()[3].get()].weight();
        let fresh_out = &fresh.layers()[2].neurons()[0];
        assert_eq!(untouched, fresh.synapses()[fresh_out.incoming()[3].get()].weight());
        let carried = grown.synapses()[out.incoming()[1].get()].weight();
        let small_out = &small.layers()[2].neurons()[0];
        assert_eq!(carried, small.synapses()[small_out.incoming()[1].get()].weight());
    }

    #[test]
    fn test_import_rejects_incompatible_records() {
        let mut network = seeded(&[3, 4, 2], 6);
        let before = network.export_state();

        let fewer_layers = seeded(&[3, 2], 1).export_state();
        assert!(matches!(
            network.import_state(&fewer_layers),
            Err(NetworkError::TopologyMismatch { .. })
        ));

        let wider = seeded(&[3, 6, 2], 1).export_state();
        assert!(matches!(
            network.import_state(&wider),
            Err(NetworkError::TopologyMismatch { .. })
        ));

        let mut bad_index = before.clone();
        bad_index.neurons[1][0].synapses[0].from_index = 17;
        bad_index.neurons[0][0].a = 0.123;
        assert!(matches!(
            network.import_state(&bad_index),
            Err(NetworkError::TopologyMismatch { .. })
        ));

        assert_eq!(network.export_state(), before);
    }

    #[test]
    fn test_perturb_activations() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut network = seeded(&[3, 4, 2], 10);
        let before = network.export_state();

        assert_eq!(network.perturb_activations(0.0, &mut rng), 0);
        assert_eq!(network.perturb_activations(f64::NAN, &mut rng), 0);
        assert_eq!(network.perturb_activations(-0.5, &mut rng), 0);
        assert_eq!(network.export_state(), before);

        assert_eq!(network.perturb_activations(f64::INFINITY, &mut rng), 9);
        let after = network.export_state();
        assert_ne!(after.neurons, before.neurons);
        // weights are left alone
        assert_eq!(network.synapses().len(), 3 * 4 + 4 * 2);
        for (l, layer) in after.neurons.iter().enumerate() {
            for (i, neuron) in layer.iter().enumerate() {
                assert_eq!(neuron.synapses, before.neurons[l][i].synapses);
            }
        }
    }

    #[test]
    fn test_learning_rate_from_config() {
        let config = NetworkConfig {
            layer_widths: vec![2, 2],
            learning_rate: 0.05,
        };
        let network = Network::from_config(&config).unwrap();
        assert_eq!(network.learning_rate(), 0.05);
        assert_eq!(network.to_string(), "Network: [2, 2] (4 synapses, lr 0.05)");
    }
}
