//! Hand-rolled feed-forward network with online backpropagation.
//!
//! Values flow from layer 0 to the last layer through weighted synapses; each
//! training round computes per-neuron errors from the last layer back to the
//! first and then moves every weight by the delta rule.

mod activation;
mod feed_forward;
mod layer;
mod neuron;
mod state;
mod synapse;

pub use activation::Activation;
pub use feed_forward::{
    Network, NetworkConfig, PassPhase, DEFAULT_LAYER_WIDTHS, DEFAULT_LEARNING_RATE,
};
pub(crate) use feed_forward::validate_topology;
pub use layer::Layer;
pub use neuron::{CacheKind, Neuron};
pub use state::{NetworkState, NeuronRecord, SynapseRecord};
pub use synapse::{NeuronId, Synapse, SynapseId};
