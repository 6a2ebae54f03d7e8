//! Drag session state machine
//!
//! Turns a stream of [`DragSample`]s into 1:1 tracking frames while the finger
//! is down, and into a single terminal [`DragOutcome`] when it lifts: commit to
//! a snap point, dismiss, or restore the pre-drag height.
//!
//! ```text
//! Idle ──begin──▶ Dragging ──cancel──▶ Restoring ──settled──▶ Idle
//!                    │ ▲    ──commit──▶ Committing ──settled──▶ Idle
//!                    └─┘    ──dismiss─▶ Dismissing
//!                change/begin
//! ```
//!
//! Sign convention: dragging up (translation y decreasing) grows the sheet.

use serde::Serialize;

use crate::events::{event_types, DragPhase, DragSample, EventType, Point};
use crate::fsm::{StateMachine, StateTransitions};
use crate::geometry::{SheetSize, Viewport};
use crate::snap::SnapPoints;

/// Seconds of post-release coast projected from the release velocity
pub const VELOCITY_PROJECTION: f32 = 0.2;
/// Downward release velocity (px/s) above which a drag always dismisses
pub const DISMISS_VELOCITY: f32 = 2000.0;
/// Release speed (px/s) at which the settle animation becomes instant
pub const INSTANT_SETTLE_VELOCITY: f32 = 10_000.0;
/// Settle duration for a stationary release, in seconds
pub const MAX_SETTLE_SECS: f32 = 1.0 / 3.0;

/// Drag interaction states
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
    /// Animating back to the pre-drag height after a cancel
    Restoring,
    /// Animating to the snap point picked on release
    Committing,
    /// Sliding off-screen; terminal
    Dismissing,
}

impl DragState {
    /// Whether a drag session owns the container
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging)
    }
}

impl StateTransitions for DragState {
    fn on_event(&self, event: EventType) -> Option<Self> {
        use event_types::*;
        match (self, event) {
            (DragState::Dismissing, _) => None,
            // A new begin supersedes whatever was running
            (_, DRAG_BEGIN) => Some(DragState::Dragging),
            (DragState::Dragging, DRAG_CHANGE) => Some(DragState::Dragging),
            (DragState::Dragging, DRAG_CANCEL) => Some(DragState::Restoring),
            (DragState::Dragging, DRAG_COMMIT) => Some(DragState::Committing),
            // Programmatic close is accepted from every live state
            (_, DRAG_DISMISS) => Some(DragState::Dismissing),
            (DragState::Restoring | DragState::Committing, SETTLED) => Some(DragState::Idle),
            _ => None,
        }
    }
}

/// Settle animation duration in seconds for a release velocity
///
/// Monotonically decreasing in `|velocity_y|`, bounded to `[0, 1/3]`.
pub fn settle_duration(velocity_y: f32) -> f32 {
    let speed = if velocity_y.is_finite() {
        velocity_y.abs()
    } else {
        INSTANT_SETTLE_VELOCITY
    };
    (1.0 - (speed / INSTANT_SETTLE_VELOCITY).min(1.0)) * MAX_SETTLE_SECS
}

/// Sheet facts the drag machine reads but does not own
#[derive(Clone, Copy, Debug)]
pub struct SheetMetrics<'a> {
    pub snap: &'a SnapPoints,
    pub viewport: &'a Viewport,
    pub dismissable: bool,
    /// Size the sheet rests at (or is animating toward)
    pub target: Option<SheetSize>,
}

impl SheetMetrics<'_> {
    fn height_for(&self, size: Option<SheetSize>) -> f32 {
        self.viewport.height_for(size)
    }

    /// Drag clamp range; a sheet without snap points stays at `baseline`
    fn bounds(&self, baseline: f32) -> (f32, f32) {
        if self.snap.is_empty() {
            (baseline, baseline)
        } else {
            self.snap.bounds(self.viewport)
        }
    }
}

/// Live state of one drag gesture
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragSession {
    /// Translation of the first sample
    pub origin: Point,
    /// Container height captured at begin
    pub baseline: f32,
    /// Height currently applied to the container
    pub working_height: f32,
    /// Downward translation past the minimum height (rubber band)
    pub offset: f32,
}

/// Geometry to apply to the container for a tracking update
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragFrame {
    pub height: f32,
    pub translate_y: f32,
}

/// What the owner of the container should do with a sample
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragOutcome {
    /// A session started; `baseline` becomes the actual size
    Began { baseline: f32, frame: DragFrame },
    /// Apply without animation
    Track(DragFrame),
    /// Animate back to the pre-drag height with no translation
    Restore { height: f32 },
    /// Animate to `target` with no translation
    Commit {
        target: Option<SheetSize>,
        duration_secs: f32,
    },
    /// Slide the container off-screen, then tear down
    Dismiss { duration_secs: f32 },
    /// Sample arrived with no session to apply it to
    Ignored,
}

/// Drag session driver
#[derive(Clone, Debug, Default)]
pub struct DragMachine {
    fsm: StateMachine<DragState>,
    session: Option<DragSession>,
    sessions_started: u64,
}

impl DragMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.fsm.current_state()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Number of sessions started so far; identifies the latest session
    pub fn session_id(&self) -> u64 {
        self.sessions_started
    }

    /// Transition history, oldest first
    pub fn history(&self) -> impl Iterator<Item = &(DragState, EventType, DragState)> {
        self.fsm.history()
    }

    /// Feed one drag sample
    ///
    /// `measured_height` is the container's rendered height right now; it is
    /// only read on begin.
    pub fn handle(
        &mut self,
        sample: &DragSample,
        measured_height: f32,
        metrics: &SheetMetrics<'_>,
    ) -> DragOutcome {
        if self.state() == DragState::Dismissing {
            return DragOutcome::Ignored;
        }

        match sample.phase {
            DragPhase::Began => self.begin(sample, measured_height, metrics),
            DragPhase::Changed => match self.track(sample, metrics) {
                Some(frame) => DragOutcome::Track(frame),
                None => DragOutcome::Ignored,
            },
            DragPhase::Ended => self.end(sample, metrics),
            DragPhase::Cancelled | DragPhase::Failed => self.cancel(),
        }
    }

    /// Settle animation finished; back to idle
    pub fn settled(&mut self) {
        self.fsm.send(event_types::SETTLED);
    }

    /// Enter the terminal dismissing state, dropping any live session
    pub fn dismiss(&mut self) -> bool {
        let accepted = self.fsm.send(event_types::DRAG_DISMISS).is_some();
        if accepted {
            self.session = None;
        }
        accepted
    }

    fn begin(
        &mut self,
        sample: &DragSample,
        measured_height: f32,
        metrics: &SheetMetrics<'_>,
    ) -> DragOutcome {
        if self.session.is_some() {
            tracing::debug!("drag began during an active session; restarting");
        }
        self.fsm.send(event_types::DRAG_BEGIN);
        self.sessions_started += 1;

        let baseline = metrics.height_for(Some(SheetSize::Fixed(measured_height)));
        self.session = Some(DragSession {
            origin: sample.translation,
            baseline,
            working_height: baseline,
            offset: 0.0,
        });

        let frame = self
            .track(sample, metrics)
            .unwrap_or(DragFrame { height: baseline, translate_y: 0.0 });
        tracing::trace!(session = self.sessions_started, baseline, "drag began");
        DragOutcome::Began { baseline, frame }
    }

    /// Recompute the working height for the sample's translation
    fn track(&mut self, sample: &DragSample, metrics: &SheetMetrics<'_>) -> Option<DragFrame> {
        let session = self.session.as_mut()?;
        self.fsm.send(event_types::DRAG_CHANGE);

        let raw = (session.baseline + (session.origin.y - sample.translation.y)).max(0.0);
        let (min_height, max_height) = metrics.bounds(session.baseline);

        let (height, offset) = if raw < min_height {
            // Past the smallest snap point the sheet slides down instead of shrinking
            let offset = if metrics.dismissable {
                min_height - raw
            } else {
                0.0
            };
            (min_height, offset)
        } else if raw > max_height {
            (max_height, 0.0)
        } else {
            (raw, 0.0)
        };

        session.working_height = height;
        session.offset = offset;
        Some(DragFrame {
            height,
            translate_y: offset,
        })
    }

    fn end(&mut self, sample: &DragSample, metrics: &SheetMetrics<'_>) -> DragOutcome {
        if self.track(sample, metrics).is_none() {
            tracing::debug!("drag ended without a session");
            return DragOutcome::Ignored;
        }
        let Some(session) = self.session.take() else {
            return DragOutcome::Ignored;
        };

        let (min_height, _) = metrics.bounds(session.baseline);
        let velocity_y = sample.velocity.y;
        let mut final_height =
            session.working_height - session.offset - velocity_y * VELOCITY_PROJECTION;
        if velocity_y > DISMISS_VELOCITY {
            final_height = -1.0;
        }
        let duration_secs = settle_duration(velocity_y);

        if final_height < min_height / 2.0 && metrics.dismissable {
            tracing::debug!(final_height, velocity_y, "drag released into dismissal");
            self.fsm.send(event_types::DRAG_DISMISS);
            return DragOutcome::Dismiss { duration_secs };
        }

        let delta_y = sample.translation.y - session.origin.y;
        let target = size_to_move_to(session.baseline - delta_y, metrics);
        tracing::debug!(?target, final_height, velocity_y, "drag released onto snap point");
        self.fsm.send(event_types::DRAG_COMMIT);
        DragOutcome::Commit {
            target,
            duration_secs,
        }
    }

    fn cancel(&mut self) -> DragOutcome {
        let Some(session) = self.session.take() else {
            return DragOutcome::Ignored;
        };
        self.fsm.send(event_types::DRAG_CANCEL);
        tracing::debug!(height = session.baseline, "drag cancelled; restoring");
        DragOutcome::Restore {
            height: session.baseline,
        }
    }
}

/// Snap point to settle on when the finger lifts at `new_height`
///
/// Taller than the current target picks the nearest point going up, shorter
/// the nearest going down; equal keeps the target.
pub fn size_to_move_to(new_height: f32, metrics: &SheetMetrics<'_>) -> Option<SheetSize> {
    let current = metrics.height_for(metrics.target);
    if new_height > current {
        metrics
            .snap
            .nearest_going_up(new_height, metrics.viewport)
            .or(metrics.target)
    } else if new_height < current {
        metrics
            .snap
            .nearest_going_down(new_height, metrics.target, metrics.viewport)
    } else {
        metrics.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(390.0, 800.0)
    }

    fn snap(sizes: &[SheetSize]) -> SnapPoints {
        let mut snap = SnapPoints::new();
        snap.set_sizes(sizes, &viewport());
        snap
    }

    fn three_stops() -> SnapPoints {
        snap(&[
            SheetSize::Fixed(350.0),
            SheetSize::Fixed(550.0),
            SheetSize::FullScreen,
        ])
    }

    fn metrics<'a>(snap: &'a SnapPoints, vp: &'a Viewport, dismissable: bool) -> SheetMetrics<'a> {
        SheetMetrics {
            snap,
            viewport: vp,
            dismissable,
            target: snap.first(),
        }
    }

    #[test]
    fn test_settle_duration_bounds() {
        assert!((settle_duration(0.0) - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(settle_duration(10_000.0), 0.0);
        assert_eq!(settle_duration(-25_000.0), 0.0);
        assert_eq!(settle_duration(f32::NAN), 0.0);

        let mut previous = settle_duration(0.0);
        for v in (1..=120).map(|i| i as f32 * 100.0) {
            let d = settle_duration(v);
            assert!(d <= previous);
            assert!((0.0..=MAX_SETTLE_SECS).contains(&d));
            assert_eq!(d, settle_duration(-v));
            previous = d;
        }
    }

    #[test]
    fn test_drag_up_tracks_and_commits_full_screen() {
        let (snap, vp) = (three_stops(), viewport());
        let m = metrics(&snap, &vp, true);
        let mut drag = DragMachine::new();

        let began = drag.handle(&DragSample::began(), 350.0, &m);
        assert_eq!(
            began,
            DragOutcome::Began {
                baseline: 350.0,
                frame: DragFrame { height: 350.0, translate_y: 0.0 }
            }
        );

        let tracked = drag.handle(&DragSample::changed(-300.0), 350.0, &m);
        assert_eq!(
            tracked,
            DragOutcome::Track(DragFrame { height: 650.0, translate_y: 0.0 })
        );

        let ended = drag.handle(&DragSample::ended(-300.0, 0.0), 350.0, &m);
        match ended {
            DragOutcome::Commit { target, duration_secs } => {
                assert_eq!(target, Some(SheetSize::FullScreen));
                assert!((duration_secs - 1.0 / 3.0).abs() < 1e-6);
            }
            other => panic!("expected commit, got {other:?}"),
        }
        assert_eq!(drag.state(), DragState::Committing);

        drag.settled();
        assert_eq!(drag.state(), DragState::Idle);
    }

    #[test]
    fn test_working_height_clamped_to_max() {
        let (snap, vp) = (three_stops(), viewport());
        let m = metrics(&snap, &vp, true);
        let mut drag = DragMachine::new();
        drag.handle(&DragSample::began(), 350.0, &m);

        let tracked = drag.handle(&DragSample::changed(-2000.0), 350.0, &m);
        assert_eq!(
            tracked,
            DragOutcome::Track(DragFrame { height: 780.0, translate_y: 0.0 })
        );
    }

    #[test]
    fn test_rubber_band_below_minimum() {
        let (snap, vp) = (three_stops(), viewport());
        let mut drag = DragMachine::new();
        let m = metrics(&snap, &vp, true);
        drag.handle(&DragSample::began(), 350.0, &m);
        assert_eq!(
            drag.handle(&DragSample::changed(120.0), 350.0, &m),
            DragOutcome::Track(DragFrame { height: 350.0, translate_y: 120.0 })
        );

        // Non-dismissable sheets refuse to move past the minimum
        let m = metrics(&snap, &vp, false);
        drag.handle(&DragSample::began(), 350.0, &m);
        assert_eq!(
            drag.handle(&DragSample::changed(120.0), 350.0, &m),
            DragOutcome::Track(DragFrame { height: 350.0, translate_y: 0.0 })
        );
    }

    #[test]
    fn test_raw_height_floors_at_zero() {
        let vp = viewport();
        let snap = snap(&[SheetSize::Fixed(0.0), SheetSize::Fixed(300.0)]);
        let m = metrics(&snap, &vp, true);
        let mut drag = DragMachine::new();
        drag.handle(&DragSample::began(), 300.0, &m);
        assert_eq!(
            drag.handle(&DragSample::changed(900.0), 300.0, &m),
            DragOutcome::Track(DragFrame { height: 0.0, translate_y: 0.0 })
        );
    }

    #[test]
    fn test_hard_flick_always_dismisses() {
        let (snap, vp) = (three_stops(), viewport());
        let m = metrics(&snap, &vp, true);
        let mut drag = DragMachine::new();
        drag.handle(&DragSample::began(), 780.0, &m);
        // Finger barely moved but released fast downward
        let ended = drag.handle(&DragSample::ended(5.0, 2500.0), 780.0, &m);
        match ended {
            DragOutcome::Dismiss { duration_secs } => {
                assert!((duration_secs - settle_duration(2500.0)).abs() < 1e-6)
            }
            other => panic!("expected dismiss, got {other:?}"),
        }
        assert_eq!(drag.state(), DragState::Dismissing);
    }

    #[test]
    fn test_slow_release_below_half_minimum() {
        let (snap, vp) = (three_stops(), viewport());

        let m = metrics(&snap, &vp, true);
        let mut drag = DragMachine::new();
        drag.handle(&DragSample::began(), 350.0, &m);
        assert!(matches!(
            drag.handle(&DragSample::ended(200.0, 0.0), 350.0, &m),
            DragOutcome::Dismiss { .. }
        ));

        let m = metrics(&snap, &vp, false);
        let mut drag = DragMachine::new();
        drag.handle(&DragSample::began(), 350.0, &m);
        match drag.handle(&DragSample::ended(200.0, 0.0), 350.0, &m) {
            // Nothing at or below 150, so the target stays put
            DragOutcome::Commit { target, .. } => {
                assert_eq!(target, Some(SheetSize::Fixed(350.0)))
            }
            other => panic!("expected commit, got {other:?}"),
        }
    }

    #[test]
    fn test_drag_down_commits_to_smaller_point() {
        let (snap, vp) = (three_stops(), viewport());
        let m = SheetMetrics {
            target: Some(SheetSize::FullScreen),
            ..metrics(&snap, &vp, true)
        };
        let mut drag = DragMachine::new();
        drag.handle(&DragSample::began(), 780.0, &m);
        match drag.handle(&DragSample::ended(200.0, 0.0), 780.0, &m) {
            DragOutcome::Commit { target, .. } => {
                assert_eq!(target, Some(SheetSize::Fixed(550.0)))
            }
            other => panic!("expected commit, got {other:?}"),
        }
    }

    #[test]
    fn test_cancel_restores_baseline() {
        let (snap, vp) = (three_stops(), viewport());
        let m = metrics(&snap, &vp, true);
        let mut drag = DragMachine::new();
        drag.handle(&DragSample::began(), 550.0, &m);
        drag.handle(&DragSample::changed(-100.0), 550.0, &m);
        assert_eq!(
            drag.handle(&DragSample::cancelled(-100.0), 550.0, &m),
            DragOutcome::Restore { height: 550.0 }
        );
        assert_eq!(drag.state(), DragState::Restoring);
        assert!(drag.session().is_none());
    }

    #[test]
    fn test_begin_restarts_session() {
        let (snap, vp) = (three_stops(), viewport());
        let m = metrics(&snap, &vp, true);
        let mut drag = DragMachine::new();
        drag.handle(&DragSample::began(), 350.0, &m);
        drag.handle(&DragSample::changed(-100.0), 350.0, &m);

        let restart = DragSample::new(DragPhase::Began, -100.0, 0.0);
        drag.handle(&restart, 450.0, &m);
        assert_eq!(drag.session_id(), 2);
        let session = drag.session().unwrap();
        assert_eq!(session.origin.y, -100.0);
        assert_eq!(session.baseline, 450.0);
    }

    #[test]
    fn test_samples_without_session_ignored() {
        let (snap, vp) = (three_stops(), viewport());
        let m = metrics(&snap, &vp, true);
        let mut drag = DragMachine::new();
        assert_eq!(drag.handle(&DragSample::changed(10.0), 350.0, &m), DragOutcome::Ignored);
        assert_eq!(drag.handle(&DragSample::ended(10.0, 0.0), 350.0, &m), DragOutcome::Ignored);
        assert_eq!(drag.handle(&DragSample::cancelled(0.0), 350.0, &m), DragOutcome::Ignored);
        assert_eq!(drag.state(), DragState::Idle);
    }

    #[test]
    fn test_dismissing_is_terminal() {
        let (snap, vp) = (three_stops(), viewport());
        let m = metrics(&snap, &vp, true);
        let mut drag = DragMachine::new();
        assert!(drag.dismiss());
        assert!(!drag.dismiss());
        assert_eq!(drag.handle(&DragSample::began(), 350.0, &m), DragOutcome::Ignored);
        assert_eq!(drag.state(), DragState::Dismissing);
    }

    #[test]
    fn test_empty_snap_list_holds_baseline() {
        let vp = viewport();
        let snap = SnapPoints::new();
        let m = SheetMetrics {
            snap: &snap,
            viewport: &vp,
            dismissable: true,
            target: None,
        };
        let mut drag = DragMachine::new();
        drag.handle(&DragSample::began(), 200.0, &m);
        assert_eq!(
            drag.handle(&DragSample::changed(-50.0), 200.0, &m),
            DragOutcome::Track(DragFrame { height: 200.0, translate_y: 0.0 })
        );
        assert_eq!(
            drag.handle(&DragSample::changed(50.0), 200.0, &m),
            DragOutcome::Track(DragFrame { height: 200.0, translate_y: 50.0 })
        );
    }

    #[test]
    fn test_size_to_move_to_direction() {
        let vp = viewport();
        let snap = snap(&[
            SheetSize::Fixed(100.0),
            SheetSize::Fixed(300.0),
            SheetSize::Fixed(600.0),
        ]);
        let m = SheetMetrics {
            snap: &snap,
            viewport: &vp,
            dismissable: true,
            target: Some(SheetSize::Fixed(300.0)),
        };
        assert_eq!(size_to_move_to(450.0, &m), Some(SheetSize::Fixed(600.0)));
        assert_eq!(size_to_move_to(250.0, &m), Some(SheetSize::Fixed(100.0)));
        assert_eq!(size_to_move_to(300.0, &m), Some(SheetSize::Fixed(300.0)));
        assert_eq!(size_to_move_to(50.0, &m), Some(SheetSize::Fixed(300.0)));
    }
}
