/// Minimal finite-state-machine container.
///
/// `S` is the state type (usually an enum). The machine tracks the current
/// and previous state. Transition rules live with whoever drives the machine.
#[derive(Debug, Clone)]
pub struct StateMachine<S: Clone> {
    pub state: S,
    pub previous: S,
}

impl<S: Clone> StateMachine<S> {
    pub fn new(initial: S) -> Self {
        Self {
            previous: initial.clone(),
            state: initial,
        }
    }

    /// Transition to `next` only if it is a different variant from the
    /// current state (compared by discriminant). Returns whether it moved.
    pub fn go(&mut self, next: S) -> bool {
        if std::mem::discriminant(&self.state) != std::mem::discriminant(&next) {
            self.previous = std::mem::replace(&mut self.state, next);
            true
        } else {
            false
        }
    }
}
