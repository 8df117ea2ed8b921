use crate::error::NetworkError;

use super::layer::Layer;

/// Position of a neuron: layer number and index within that layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NeuronId {
    pub layer: usize,
    pub index: usize,
}

impl NeuronId {
    pub fn new(layer: usize, index: usize) -> Self {
        NeuronId { layer, index }
    }
}

/// Index of a synapse in the network's synapse arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SynapseId(pub(crate) usize);

impl SynapseId {
    pub fn get(self) -> usize {
        self.0
    }
}

/// Weighted directed edge between a neuron and one in the next layer.
///
/// The network owns every synapse; neurons only hold `SynapseId`s, so the
/// source's outgoing list and the target's incoming list refer to the same
/// edge without shared ownership.
#[derive(Debug, Clone, PartialEq)]
pub struct Synapse {
    source: NeuronId,
    target: NeuronId,
    weight: f64,
}

impl Synapse {
    pub fn new(source: NeuronId, target: NeuronId, weight: f64) -> Self {
        Synapse {
            source,
            target,
            weight,
        }
    }

    pub fn source(&self) -> NeuronId {
        self.source
    }

    pub fn target(&self) -> NeuronId {
        self.target
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    /// Signal carried forward: `source.output * weight`.
    pub fn output(&self, source_layer: &Layer) -> Result<f64, NetworkError> {
        let source = &source_layer.neurons()[self.source.index];
        Ok(source.output()? * self.weight)
    }

    /// Error carried backward: `target.error * weight`.
    pub fn back_error(&self, target_layer: &Layer) -> Result<f64, NetworkError> {
        let target = &target_layer.neurons()[self.target.index];
        Ok(target.error()? * self.weight)
    }

    /// Delta rule: `weight -= learning_rate * target.error * source.output`.
    ///
    /// Reads only finalized caches, so the order in which synapses are updated
    /// does not matter.
    pub fn update_weight(
        &mut self,
        learning_rate: f64,
        layers: &[Layer],
    ) -> Result<(), NetworkError> {
        let error = layers[self.target.layer].neurons()[self.target.index].error()?;
        let output = layers[self.source.layer].neurons()[self.source.index].output()?;
        self.weight -= learning_rate * error * output;
        Ok(())
    }
}
