//! Pullsheet Animation System
//!
//! Eased, fixed-duration transitions for sheet geometry.
//!
//! # Features
//!
//! - **Transitions**: several numeric tracks moved along one easing curve
//! - **Scheduler**: host-driven ticking, explicit or wall-clock deltas
//! - **Supersession**: every start gets a fresh [`AnimationToken`], so a late
//!   completion can be recognised as stale and ignored

pub mod easing;
pub mod scheduler;
pub mod transition;

pub use easing::Easing;
pub use scheduler::{AnimationScheduler, AnimationToken, Finished, TransitionId};
pub use transition::{TrackId, Transition, Tween};
