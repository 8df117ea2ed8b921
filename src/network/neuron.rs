use std::fmt;

use crate::error::NetworkError;

use super::activation::Activation;
use super::layer::Layer;
use super::synapse::{NeuronId, Synapse, SynapseId};

/// Names the per-pass cached scalars of a neuron.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    TotalInput,
    Output,
    ExpectedOutput,
    BackpropError,
    Error,
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CacheKind::TotalInput => "total input",
            CacheKind::Output => "output",
            CacheKind::ExpectedOutput => "expected output",
            CacheKind::BackpropError => "backprop error",
            CacheKind::Error => "error",
        };
        f.write_str(name)
    }
}

/// Scalars valid for a single forward+backward round. `None` means "not yet
/// computed in this round".
#[derive(Debug, Clone, Default, PartialEq)]
struct PassCache {
    total_input: Option<f64>,
    output: Option<f64>,
    expected_output: Option<f64>,
    backprop_error: Option<f64>,
    error: Option<f64>,
}

/// A unit with a tunable tanh activation and references (by id) to the
/// synapses entering and leaving it.
#[derive(Debug, Clone, PartialEq)]
pub struct Neuron {
    id: NeuronId,
    activation: Activation,
    is_input: bool,
    is_output: bool,
    incoming: Vec<SynapseId>,
    outgoing: Vec<SynapseId>,
    cache: PassCache,
}

impl Neuron {
    pub fn new(id: NeuronId, activation: Activation) -> Self {
        Neuron {
            id,
            activation,
            is_input: false,
            is_output: false,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            cache: PassCache::default(),
        }
    }

    pub fn id(&self) -> NeuronId {
        self.id
    }

    /// Position within the layer.
    pub fn index(&self) -> usize {
        self.id.index
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn set_activation(&mut self, activation: Activation) {
        self.activation = activation;
    }

    pub fn is_input(&self) -> bool {
        self.is_input
    }

    pub fn is_output(&self) -> bool {
        self.is_output
    }

    /// Synapses whose target is this neuron ("back-synapses").
    pub fn incoming(&self) -> &[SynapseId] {
        &self.incoming
    }

    pub fn outgoing(&self) -> &[SynapseId] {
        &self.outgoing
    }

    pub(crate) fn add_incoming(&mut self, id: SynapseId) {
        self.incoming.push(id);
    }

    pub(crate) fn add_outgoing(&mut self, id: SynapseId) {
        self.outgoing.push(id);
    }

    /// Clear every per-pass cache. Must run before each round.
    pub fn initialize(&mut self) {
        self.cache = PassCache::default();
    }

    pub(crate) fn is_cleared(&self) -> bool {
        self.cache == PassCache::default()
    }

    /// Mark as an input neuron and inject its output directly.
    pub fn set_output(&mut self, value: f64) {
        self.is_input = true;
        self.cache.output = Some(value);
    }

    /// Mark as an output neuron and store its training target.
    pub fn set_expected_output(&mut self, value: f64) {
        self.is_output = true;
        self.cache.expected_output = Some(value);
    }

    pub fn expected_output(&self) -> Option<f64> {
        self.cache.expected_output
    }

    pub fn total_input(&self) -> Result<f64, NetworkError> {
        self.read(self.cache.total_input, CacheKind::TotalInput)
    }

    pub fn output(&self) -> Result<f64, NetworkError> {
        self.read(self.cache.output, CacheKind::Output)
    }

    pub fn backprop_error(&self) -> Result<f64, NetworkError> {
        self.read(self.cache.backprop_error, CacheKind::BackpropError)
    }

    /// Delta term: `activation'(total_input) * backprop_error`.
    pub fn error(&self) -> Result<f64, NetworkError> {
        self.read(self.cache.error, CacheKind::Error)
    }

    pub fn activation_derivative(&self, x: f64) -> f64 {
        self.activation.derivative(x)
    }

    /// Forward step for this neuron. `upstream` is the previous layer and is
    /// `None` only for the first layer.
    pub(crate) fn evaluate_forward(
        &mut self,
        synapses: &[Synapse],
        upstream: Option<&Layer>,
    ) -> Result<f64, NetworkError> {
        let total_input = match upstream {
            Some(layer) if !self.incoming.is_empty() => {
                let mut sum = 0.0;
                for id in &self.incoming {
                    sum += synapses[id.0].output(layer)?;
                }
                sum
            }
            _ => 0.0,
        };
        self.cache.total_input = Some(total_input);

        if self.is_input {
            return self.output();
        }
        let output = self.activation.apply(total_input);
        self.cache.output = Some(output);
        Ok(output)
    }

    /// Backward step for this neuron. `downstream` is the next layer, whose
    /// errors must already be computed; `None` for the last layer.
    pub(crate) fn evaluate_backward(
        &mut self,
        synapses: &[Synapse],
        downstream: Option<&Layer>,
    ) -> Result<f64, NetworkError> {
        let backprop_error = if self.is_output {
            let expected = self.read(self.cache.expected_output, CacheKind::ExpectedOutput)?;
            // raw signed difference; the derivative is applied below
            self.output()? - expected
        } else if self.outgoing.is_empty() {
            0.0
        } else {
            let layer = downstream.ok_or_else(|| {
                NetworkError::InvalidTopology(format!(
                    "neuron {} of layer {} has outgoing synapses but no downstream layer",
                    self.id.index, self.id.layer
                ))
            })?;
            let mut sum = 0.0;
            for id in &self.outgoing {
                sum += synapses[id.0].back_error(layer)?;
            }
            sum
        };
        self.cache.backprop_error = Some(backprop_error);

        let error = self.activation_derivative(self.total_input()?) * backprop_error;
        self.cache.error = Some(error);
        Ok(error)
    }

    /// Apply the delta rule to every incoming synapse.
    pub fn update_synapses(
        &self,
        learning_rate: f64,
        synapses: &mut [Synapse],
        layers: &[Layer],
    ) -> Result<(), NetworkError> {
        for id in &self.incoming {
            synapses[id.0].update_weight(learning_rate, layers)?;
        }
        Ok(())
    }

    fn read(&self, value: Option<f64>, cache: CacheKind) -> Result<f64, NetworkError> {
        value.ok_or(NetworkError::UninitializedAccess {
            layer: self.id.layer,
            index: self.id.index,
            cache,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neuron(a: f64, b: f64) -> Neuron {
        Neuron::new(NeuronId::new(1, 3), Activation::new(a, b))
    }

    #[test]
    fn test_fresh_neuron_has_no_cached_values() {
        let n = neuron(1.0, 0.0);
        assert!(n.is_cleared());
        assert_eq!(
            n.output().unwrap_err(),
            NetworkError::UninitializedAccess {
                layer: 1,
                index: 3,
                cache: CacheKind::Output,
            }
        );
        assert!(n.error().is_err());
        assert!(n.total_input().is_err());
        assert!(n.backprop_error().is_err());
    }

    #[test]
    fn test_set_output_marks_input() {
        let mut n = neuron(1.0, 0.0);
        n.set_output(0.75);
        assert!(n.is_input());
        assert_eq!(n.output().unwrap(), 0.75);
    }

    #[test]
    fn test_input_neuron_keeps_injected_value() {
        let mut n = neuron(0.5, 0.5);
        n.set_output(-1.0);
        let out = n.evaluate_forward(&[], None).unwrap();
        assert_eq!(out, -1.0);
        assert_eq!(n.total_input().unwrap(), 0.0);
    }

    #[test]
    fn test_unconnected_neuron_outputs_activation_of_zero() {
        let mut n = neuron(0.8, 0.3);
        let out = n.evaluate_forward(&[], None).unwrap();
        assert!((out - 0.3f64.tanh()).abs() < 1e-12);
    }

    #[test]
    fn test_output_neuron_backprop_error_is_signed_difference() {
        let mut n = neuron(1.0, 0.0);
        n.evaluate_forward(&[], None).unwrap(); // output = tanh(0) = 0
        n.set_expected_output(0.4);
        let error = n.evaluate_backward(&[], None).unwrap();
        assert!((n.backprop_error().unwrap() + 0.4).abs() < 1e-12);
        // derivative at 0 with a=1, b=0 is 1
        assert!((error + 0.4).abs() < 1e-12);
        assert!(n.is_output());
    }

    #[test]
    fn test_neuron_without_outgoing_has_zero_backprop_error() {
        let mut n = neuron(1.0, 0.0);
        n.evaluate_forward(&[], None).unwrap();
        assert_eq!(n.evaluate_backward(&[], None).unwrap(), 0.0);
    }

    #[test]
    fn test_output_neuron_without_target_fails() {
        let mut n = neuron(1.0, 0.0);
        n.evaluate_forward(&[], None).unwrap();
        n.is_output = true;
        assert!(matches!(
            n.evaluate_backward(&[], None),
            Err(NetworkError::UninitializedAccess {
                cache: CacheKind::ExpectedOutput,
                ..
            })
        ));
    }

    #[test]
    fn test_initialize_clears_caches_but_keeps_role() {
        let mut n = neuron(1.0, 0.0);
        n.set_output(0.2);
        n.set_expected_output(0.1);
        n.initialize();
        assert!(n.is_cleared());
        assert!(n.is_input());
        assert!(n.is_output());
        assert_eq!(n.expected_output(), None);
    }

    #[test]
    fn test_activation_derivative_uses_own_parameters() {
        let n = neuron(2.0, 0.0);
        assert!((n.activation_derivative(0.0) - 2.0).abs() < 1e-12);
    }
}
