//! Animation scheduler
//!
//! Owns all running transitions and advances them each frame. Every start is
//! stamped with an [`AnimationToken`] drawn from a monotonically increasing
//! counter, so owners can tell a stale completion from the latest one.

use std::time::Instant;

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::transition::Transition;

new_key_type! {
    pub struct TransitionId;
}

/// Monotonically increasing stamp attached to each started transition
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnimationToken(u64);

impl AnimationToken {
    pub fn get(&self) -> u64 {
        self.0
    }
}

struct Entry {
    transition: Transition,
    token: AnimationToken,
}

/// A transition that reached its end during a tick
#[derive(Clone, Debug)]
pub struct Finished {
    pub id: TransitionId,
    pub token: AnimationToken,
    /// The completed transition, for reading final values
    pub transition: Transition,
}

/// The animation scheduler that ticks all active transitions
pub struct AnimationScheduler {
    transitions: SlotMap<TransitionId, Entry>,
    next_token: u64,
    last_frame: Option<Instant>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self {
            transitions: SlotMap::with_key(),
            next_token: 0,
            last_frame: None,
        }
    }

    /// Start a transition; returns its id and token
    pub fn start(&mut self, transition: Transition) -> (TransitionId, AnimationToken) {
        self.next_token += 1;
        let token = AnimationToken(self.next_token);
        let id = self.transitions.insert(Entry { transition, token });
        tracing::trace!(token = token.get(), "transition started");
        (id, token)
    }

    /// Stop a transition without completing it
    pub fn cancel(&mut self, id: TransitionId) -> Option<Transition> {
        let entry = self.transitions.remove(id)?;
        tracing::trace!(token = entry.token.get(), "transition cancelled");
        Some(entry.transition)
    }

    pub fn get(&self, id: TransitionId) -> Option<&Transition> {
        self.transitions.get(id).map(|entry| &entry.transition)
    }

    /// Advance all transitions by `dt_ms`, removing and returning the finished ones
    pub fn tick_by(&mut self, dt_ms: f32) -> SmallVec<[Finished; 2]> {
        let mut done: SmallVec<[TransitionId; 2]> = SmallVec::new();
        for (id, entry) in self.transitions.iter_mut() {
            entry.transition.tick(dt_ms);
            if entry.transition.is_finished() {
                done.push(id);
            }
        }

        // Complete in start order so owners see completions chronologically
        let mut finished: SmallVec<[Finished; 2]> = done
            .into_iter()
            .filter_map(|id| {
                self.transitions.remove(id).map(|entry| Finished {
                    id,
                    token: entry.token,
                    transition: entry.transition,
                })
            })
            .collect();
        finished.sort_by_key(|f| f.token);
        finished
    }

    /// Advance by wall-clock time since the previous tick
    pub fn tick(&mut self) -> SmallVec<[Finished; 2]> {
        let now = Instant::now();
        let dt_ms = self
            .last_frame
            .map(|last| (now - last).as_secs_f32() * 1000.0)
            .unwrap_or(0.0);
        self.last_frame = Some(now);
        self.tick_by(dt_ms)
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use crate::transition::TrackId;

    const HEIGHT: TrackId = 0;

    fn grow(duration_ms: f32) -> Transition {
        Transition::new(duration_ms, Easing::Linear).track(HEIGHT, 0.0, 100.0)
    }

    fn height(transition: Option<&Transition>) -> Option<f32> {
        transition?.values().find(|(track, _)| *track == HEIGHT).map(|(_, v)| v)
    }

    #[test]
    fn test_tokens_increase() {
        let mut scheduler = AnimationScheduler::new();
        let (_, a) = scheduler.start(grow(100.0));
        let (_, b) = scheduler.start(grow(100.0));
        assert!(b > a);
        assert_eq!(b.get(), a.get() + 1);
    }

    #[test]
    fn test_tick_finishes_in_start_order() {
        let mut scheduler = AnimationScheduler::new();
        let (long_id, long) = scheduler.start(grow(300.0));
        let (short_id, short) = scheduler.start(grow(100.0));

        assert_eq!(scheduler.tick_by(50.0).len(), 0);
        assert_eq!(height(scheduler.get(short_id)), Some(50.0));

        let finished = scheduler.tick_by(50.0);
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].token, short);
        assert_eq!(height(Some(&finished[0].transition)), Some(100.0));
        assert!(scheduler.get(short_id).is_none());

        let finished = scheduler.tick_by(500.0);
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].token, long);
        assert!(scheduler.get(long_id).is_none());
    }

    #[test]
    fn test_cancelled_transition_never_finishes() {
        let mut scheduler = AnimationScheduler::new();
        let (id, _) = scheduler.start(grow(100.0));
        assert!(scheduler.cancel(id).is_some());
        assert!(scheduler.cancel(id).is_none());
        assert!(scheduler.tick_by(1000.0).is_empty());
    }

    #[test]
    fn test_zero_length_finishes_on_next_tick() {
        let mut scheduler = AnimationScheduler::new();
        scheduler.start(grow(0.0));
        assert_eq!(scheduler.tick_by(0.0).len(), 1);
    }
}
