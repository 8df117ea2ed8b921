//! Persisted form of a network: topology, per-neuron activation parameters and
//! per-synapse weights. Field names follow the external camelCase record.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkState {
    pub layer_widths: Vec<usize>,
    /// `neurons[layer][index]`
    #[serde(default)]
    pub neurons: Vec<Vec<NeuronRecord>>,
}

/// Activation parameters of one neuron plus the weights of its incoming
/// synapses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuronRecord {
    pub a: f64,
    pub b: f64,
    #[serde(default)]
    pub synapses: Vec<SynapseRecord>,
}

/// `from_index` is the source's index in the previous layer, `to_index` the
/// target's index in the layer holding this record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynapseRecord {
    pub from_index: usize,
    pub to_index: usize,
    pub weight: f64,
}

impl NetworkState {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn neuron_count(&self) -> usize {
        self.neurons.iter().map(Vec::len).sum()
    }

    pub fn synapse_count(&self) -> usize {
        self.neurons
            .iter()
            .flatten()
            .map(|n| n.synapses.len())
            .sum()
    }
}
