//! State Machine Runtime
//!
//! Flat state machines over enum states. Each state type declares its own
//! transition table through [`StateTransitions`]; [`StateMachine`] holds the
//! current state and a bounded transition history for debugging.

use std::collections::VecDeque;
use std::fmt::Debug;
use std::hash::Hash;

use crate::events::EventType;

/// Number of transitions kept in history
pub const HISTORY_LIMIT: usize = 32;

/// Trait for state enums that define their own transition table
pub trait StateTransitions: Clone + Copy + PartialEq + Eq + Hash + Debug + 'static {
    /// Handle an event and return the new state, or None if no transition
    fn on_event(&self, event: EventType) -> Option<Self>;
}

/// A state machine instance
#[derive(Clone, Debug)]
pub struct StateMachine<S: StateTransitions> {
    current_state: S,
    /// History of state changes (self-transitions are not recorded)
    history: VecDeque<(S, EventType, S)>,
}

impl<S: StateTransitions> StateMachine<S> {
    /// Create a state machine in its initial state
    pub fn new(initial_state: S) -> Self {
        Self {
            current_state: initial_state,
            history: VecDeque::with_capacity(HISTORY_LIMIT),
        }
    }

    /// Get the current state
    pub fn current_state(&self) -> S {
        self.current_state
    }

    /// Send an event, returning the new state if a transition occurred
    pub fn send(&mut self, event: EventType) -> Option<S> {
        let from = self.current_state;
        let to = from.on_event(event)?;

        self.current_state = to;
        if from != to {
            tracing::trace!(?from, ?to, event, "state transition");
            if self.history.len() == HISTORY_LIMIT {
                self.history.pop_front();
            }
            self.history.push_back((from, event, to));
        }

        Some(to)
    }

    /// Get transition history, oldest first
    pub fn history(&self) -> impl Iterator<Item = &(S, EventType, S)> {
        self.history.iter()
    }
}

impl<S: StateTransitions + Default> Default for StateMachine<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}
