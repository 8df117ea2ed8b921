use rand::Rng;

use crate::error::NetworkError;

use super::activation::Activation;
use super::neuron::Neuron;
use super::synapse::{NeuronId, Synapse, SynapseId};

/// Fixed-width, ordered group of neurons, fully connected to the next layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    position: usize,
    neurons: Vec<Neuron>,
}

impl Layer {
    /// Create a layer of `width` neurons with random activation parameters.
    pub fn new<R: Rng + ?Sized>(position: usize, width: usize, rng: &mut R) -> Self {
        let activations = (0..width).map(|_| Activation::random(rng)).collect();
        Self::with_activations(position, activations)
    }

    pub fn with_activations(position: usize, activations: Vec<Activation>) -> Self {
        let neurons = activations
            .into_iter()
            .enumerate()
            .map(|(index, act)| Neuron::new(NeuronId::new(position, index), act))
            .collect();
        Layer { position, neurons }
    }

    /// Index of this layer in the network.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn width(&self) -> usize {
        self.neurons.len()
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub(crate) fn neurons_mut(&mut self) -> &mut [Neuron] {
        &mut self.neurons
    }

    /// Connect every neuron of this layer to every neuron of `next` with a
    /// weight drawn uniformly from `[-1, 1]`.
    pub fn connect_to<R: Rng + ?Sized>(
        &mut self,
        next: &mut Layer,
        synapses: &mut Vec<Synapse>,
        rng: &mut R,
    ) {
        self.connect_to_with(next, synapses, |_, _| rng.random_range(-1.0..=1.0));
    }

    /// Connect every neuron of this layer to every neuron of `next`, asking
    /// `weight(from, to)` for each edge's initial weight.
    pub fn connect_to_with<F>(
        &mut self,
        next: &mut Layer,
        synapses: &mut Vec<Synapse>,
        mut weight: F,
    ) where
        F: FnMut(usize, usize) -> f64,
    {
        for source in &mut self.neurons {
            for target in &mut next.neurons {
                let id = SynapseId(synapses.len());
                synapses.push(Synapse::new(
                    source.id(),
                    target.id(),
                    weight(source.index(), target.index()),
                ));
                source.add_outgoing(id);
                target.add_incoming(id);
            }
        }
    }

    /// Inject one value per neuron as its output.
    pub fn set_inputs(&mut self, values: &[f64]) -> Result<(), NetworkError> {
        self.check_len(values)?;
        for (neuron, &v) in self.neurons.iter_mut().zip(values) {
            neuron.set_output(v);
        }
        Ok(())
    }

    /// Store one training target per neuron. Only meaningful on the last layer.
    pub fn set_expected_outputs(&mut self, values: &[f64]) -> Result<(), NetworkError> {
        self.check_len(values)?;
        for (neuron, &v) in self.neurons.iter_mut().zip(values) {
            neuron.set_expected_output(v);
        }
        Ok(())
    }

    pub fn outputs(&self) -> Result<Vec<f64>, NetworkError> {
        self.neurons.iter().map(Neuron::output).collect()
    }

    /// Error deltas of the last backward pass, for inspection.
    pub fn errors(&self) -> Result<Vec<f64>, NetworkError> {
        self.neurons.iter().map(Neuron::error).collect()
    }

    pub fn initialize(&mut self) {
        for neuron in &mut self.neurons {
            neuron.initialize();
        }
    }

    pub(crate) fn is_cleared(&self) -> bool {
        self.neurons.iter().all(Neuron::is_cleared)
    }

    pub(crate) fn evaluate_forward(
        &mut self,
        synapses: &[Synapse],
        upstream: Option<&Layer>,
    ) -> Result<(), NetworkError> {
        for neuron in &mut self.neurons {
            neuron.evaluate_forward(synapses, upstream)?;
        }
        Ok(())
    }

    pub(crate) fn evaluate_backward(
        &mut self,
        synapses: &[Synapse],
        downstream: Option<&Layer>,
    ) -> Result<(), NetworkError> {
        for neuron in &mut self.neurons {
            neuron.evaluate_backward(synapses, downstream)?;
        }
        Ok(())
    }

    pub fn update_synapses(
        &self,
        learning_rate: f64,
        synapses: &mut [Synapse],
        layers: &[Layer],
    ) -> Result<(), NetworkError> {
        for neuron in &self.neurons {
            neuron.update_synapses(learning_rate, synapses, layers)?;
        }
        Ok(())
    }

    fn check_len(&self, values: &[f64]) -> Result<(), NetworkError> {
        if values.len() != self.neurons.len() {
            return Err(NetworkError::ShapeMismatch {
                layer: self.position,
                expected: self.neurons.len(),
                actual: values.len(),
            });
        }
        Ok(())
    }
}
