//! Players: the network-backed agent, a uniform random mover, and the
//! board-encoding helpers they share.

mod encoding;
mod game;
mod network_agent;
mod random;

pub use encoding::{argmax, flip_perspective, mask_illegal, one_hot};
pub use game::Game;
pub use network_agent::{AgentConfig, MoveDecision, MoveSource, NetworkAgent};
pub use random::RandomMover;
