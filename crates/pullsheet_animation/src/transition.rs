//! Fixed-duration transitions
//!
//! A [`Transition`] moves a few numeric tracks (height, translation, overlay
//! alpha...) from a start value to an end value along one easing curve.

use smallvec::SmallVec;

use crate::easing::Easing;

/// Identifier for an animated property within a transition
pub type TrackId = u32;

/// Start and end value of one track
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
}

impl Tween {
    /// Interpolated value at eased progress `t`
    pub fn at(&self, t: f32) -> f32 {
        self.from + (self.to - self.from) * t
    }
}

/// A timed, eased change of one or more tracks
#[derive(Clone, Debug)]
pub struct Transition {
    duration_ms: f32,
    elapsed_ms: f32,
    easing: Easing,
    tracks: SmallVec<[(TrackId, Tween); 3]>,
}

impl Transition {
    pub fn new(duration_ms: f32, easing: Easing) -> Self {
        Self {
            duration_ms: duration_ms.max(0.0),
            elapsed_ms: 0.0,
            easing,
            tracks: SmallVec::new(),
        }
    }

    /// Builder: animate `track` from `from` to `to`
    pub fn track(mut self, track: TrackId, from: f32, to: f32) -> Self {
        self.tracks.retain(|(id, _)| *id != track);
        self.tracks.push((track, Tween { from, to }));
        self
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    /// Linear progress in `[0, 1]`; zero-length transitions are complete
    pub fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            1.0
        } else {
            (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
        }
    }

    pub fn remaining_ms(&self) -> f32 {
        (self.duration_ms - self.elapsed_ms).max(0.0)
    }

    pub fn has_track(&self, track: TrackId) -> bool {
        self.tracks.iter().any(|(id, _)| *id == track)
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Advance by `dt_ms` milliseconds
    pub fn tick(&mut self, dt_ms: f32) {
        if dt_ms.is_finite() && dt_ms > 0.0 {
            self.elapsed_ms = (self.elapsed_ms + dt_ms).min(self.duration_ms);
        }
    }

    /// Current values of all tracks
    pub fn values(&self) -> impl Iterator<Item = (TrackId, f32)> + '_ {
        let eased = self.easing.apply(self.progress());
        self.tracks.iter().map(move |(id, tween)| (*id, tween.at(eased)))
    }

    /// Target value of a track
    pub fn end_value(&self, track: TrackId) -> Option<f32> {
        self.tracks
            .iter()
            .find(|(id, _)| *id == track)
            .map(|(_, tween)| tween.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEIGHT: TrackId = 0;
    const OFFSET: TrackId = 1;

    fn value(transition: &Transition, track: TrackId) -> Option<f32> {
        transition.values().find(|(id, _)| *id == track).map(|(_, v)| v)
    }

    #[test]
    fn test_linear_progress() {
        let mut transition = Transition::new(200.0, Easing::Linear)
            .track(HEIGHT, 100.0, 300.0)
            .track(OFFSET, 50.0, 0.0);

        assert_eq!(value(&transition, HEIGHT), Some(100.0));
        transition.tick(100.0);
        assert_eq!(value(&transition, HEIGHT), Some(200.0));
        assert_eq!(value(&transition, OFFSET), Some(25.0));
        transition.tick(500.0);
        assert!(transition.is_finished());
        assert_eq!(value(&transition, HEIGHT), Some(300.0));
        assert_eq!(value(&transition, 7), None);
    }

    #[test]
    fn test_zero_duration_is_immediately_finished() {
        let transition = Transition::new(0.0, Easing::EaseOut).track(HEIGHT, 0.0, 80.0);
        assert!(transition.is_finished());
        assert_eq!(value(&transition, HEIGHT), Some(80.0));
    }

    #[test]
    fn test_track_replaces_duplicate() {
        let transition = Transition::new(100.0, Easing::Linear)
            .track(HEIGHT, 0.0, 10.0)
            .track(HEIGHT, 0.0, 20.0);
        assert_eq!(transition.values().count(), 1);
        assert_eq!(transition.end_value(HEIGHT), Some(20.0));
    }

    #[test]
    fn test_ignores_bad_deltas() {
        let mut transition = Transition::new(100.0, Easing::Linear).track(HEIGHT, 0.0, 10.0);
        transition.tick(-50.0);
        transition.tick(f32::NAN);
        assert_eq!(transition.progress(), 0.0);
    }
}
