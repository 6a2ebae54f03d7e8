//! Pullsheet Core
//!
//! Platform-independent model of a draggable bottom sheet:
//!
//! - **Geometry**: resolve abstract sheet sizes against the current viewport
//! - **Snap Points**: the sorted set of resting heights and directional lookups
//! - **Drag State Machine**: turn drag samples into tracking frames and a
//!   commit / dismiss / restore decision
//! - **Touch Arbitration**: decide whether the sheet or a nested scroll region
//!   owns a touch stream
//!
//! # Example
//!
//! ```rust
//! use pullsheet_core::{
//!     DragMachine, DragOutcome, DragSample, SheetMetrics, SheetSize, SnapPoints, Viewport,
//! };
//!
//! let viewport = Viewport::new(390.0, 800.0);
//! let mut snap = SnapPoints::new();
//! snap.set_sizes(&[SheetSize::Fixed(350.0), SheetSize::FullScreen], &viewport);
//!
//! let metrics = SheetMetrics {
//!     snap: &snap,
//!     viewport: &viewport,
//!     dismissable: true,
//!     target: snap.first(),
//! };
//!
//! let mut drag = DragMachine::new();
//! drag.handle(&DragSample::began(), 350.0, &metrics);
//! drag.handle(&DragSample::changed(-300.0), 350.0, &metrics);
//! let outcome = drag.handle(&DragSample::ended(-300.0, 0.0), 350.0, &metrics);
//! assert!(matches!(
//!     outcome,
//!     DragOutcome::Commit { target: Some(SheetSize::FullScreen), .. }
//! ));
//! ```

pub mod arbitration;
pub mod drag;
pub mod error;
pub mod events;
pub mod fsm;
pub mod geometry;
pub mod scroll;
pub mod snap;

pub use arbitration::{
    arbitrate, should_begin_drag, should_receive_touch, Arbitration, ArbitrationInput,
};
pub use drag::{
    settle_duration, DragFrame, DragMachine, DragOutcome, DragSession, DragState, SheetMetrics,
};
pub use error::{Result, SheetError};
pub use events::{DragPhase, DragSample, EventType, Point, TouchStart, TouchTarget};
pub use fsm::{StateMachine, StateTransitions};
pub use geometry::{SheetSize, Viewport, FULL_SCREEN_TOP_MARGIN};
pub use scroll::{ScrollBinding, ScrollMetrics, ScrollRegion};
pub use snap::SnapPoints;
