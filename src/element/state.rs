//! Element lifecycle states.
//!
//! Elements step through `Null -> Ready -> Paused -> Playing` and back one
//! state at a time.

/// Lifecycle state of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum State {
    /// Initial state; no resources held.
    #[default]
    Null,
    /// Resources allocated, not streaming.
    Ready,
    /// Streaming allowed, clock stopped.
    Paused,
    /// Streaming with the clock running.
    Playing,
}

impl State {
    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            State::Null => "null",
            State::Ready => "ready",
            State::Paused => "paused",
            State::Playing => "playing",
        }
    }
}

/// A single step between two adjacent states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateChange {
    /// Null to Ready.
    NullToReady,
    /// Ready to Paused.
    ReadyToPaused,
    /// Paused to Playing.
    PausedToPlaying,
    /// Playing to Paused.
    PlayingToPaused,
    /// Paused to Ready.
    PausedToReady,
    /// Ready to Null.
    ReadyToNull,
}

impl StateChange {
    /// Build the transition between two states, if they are adjacent.
    pub fn between(current: State, next: State) -> Option<StateChange> {
        use State::*;
        match (current, next) {
            (Null, Ready) => Some(StateChange::NullToReady),
            (Ready, Paused) => Some(StateChange::ReadyToPaused),
            (Paused, Playing) => Some(StateChange::PausedToPlaying),
            (Playing, Paused) => Some(StateChange::PlayingToPaused),
            (Paused, Ready) => Some(StateChange::PausedToReady),
            (Ready, Null) => Some(StateChange::ReadyToNull),
            _ => None,
        }
    }

    /// State this transition starts from.
    pub fn current(&self) -> State {
        match self {
            StateChange::NullToReady => State::Null,
            StateChange::ReadyToPaused | StateChange::ReadyToNull => State::Ready,
            StateChange::PausedToPlaying | StateChange::PausedToReady => State::Paused,
            StateChange::PlayingToPaused => State::Playing,
        }
    }

    /// State this transition ends in.
    pub fn next(&self) -> State {
        match self {
            StateChange::ReadyToNull => State::Null,
            StateChange::NullToReady | StateChange::PausedToReady => State::Ready,
            StateChange::ReadyToPaused | StateChange::PlayingToPaused => State::Paused,
            StateChange::PausedToPlaying => State::Playing,
        }
    }

    /// Whether this transition moves towards `Playing`.
    pub fn is_upward(&self) -> bool {
        self.next() > self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjacent_transitions() {
        let change = StateChange::between(State::Null, State::Ready);
        assert_eq!(change, Some(StateChange::NullToReady));

        for change in [
            StateChange::NullToReady,
            StateChange::ReadyToPaused,
            StateChange::PausedToPlaying,
            StateChange::PlayingToPaused,
            StateChange::PausedToReady,
            StateChange::ReadyToNull,
        ] {
            assert_eq!(StateChange::between(change.current(), change.next()), Some(change));
        }
    }

    #[test]
    fn test_non_adjacent_rejected() {
        assert_eq!(StateChange::between(State::Null, State::Playing), None);
        assert_eq!(StateChange::between(State::Ready, State::Ready), None);
        assert_eq!(StateChange::between(State::Playing, State::Ready), None);
    }

    #[test]
    fn test_direction() {
        assert!(StateChange::ReadyToPaused.is_upward());
        assert!(!StateChange::PausedToReady.is_upward());
        assert_eq!(State::default(), State::Null);
        assert_eq!(State::Playing.name(), "playing");
    }
}
