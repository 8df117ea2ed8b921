/// What the agent needs from a board game.
///
/// Actions are indices into the network's output layer (for tic-tac-toe, the
/// nine cells in row-major order).
pub trait Game {
    /// Board encoding fed to the input layer, from the point of view of the
    /// player about to move.
    fn encode(&self) -> Vec<f64>;

    /// Actions the player to move may take.
    fn legal_actions(&self) -> Vec<usize>;

    fn is_legal(&self, action: usize) -> bool {
        self.legal_actions().contains(&action)
    }

    /// Moves made so far in the current game.
    fn moves_played(&self) -> usize;
}
