//! Bottom sheet lifecycle controller
//!
//! [`BottomSheet`] owns the container geometry and wires the core pieces
//! together: snap points, the drag machine, touch arbitration and the
//! animation scheduler. The host feeds it input (drag samples, touches, taps,
//! viewport changes), calls [`BottomSheet::tick`] every frame and renders
//! [`BottomSheet::container`].
//!
//! ```text
//! Configured ──present──▶ Presenting ──settled──▶ Presented
//!      │                       │                      │
//!      └───────────close / drag dismiss / tap─────────┘
//!                              ▼
//!                         Dismissing ──settled──▶ Dismissed (notify once)
//! ```
//!
//! Only one container animation is live at a time. Starting another cancels
//! it; tracks the new animation doesn't touch keep heading to their previous
//! destination.

use pullsheet_animation::{
    AnimationScheduler, AnimationToken, Easing, Finished, TrackId, Transition, TransitionId,
};
use pullsheet_core::{
    should_begin_drag, should_receive_touch, ArbitrationInput, DragMachine, DragOutcome, DragPhase,
    DragSample, DragState, Result, ScrollBinding, ScrollRegion, SheetError, SheetMetrics, SheetSize,
    SnapPoints, TouchStart, TouchTarget, Viewport,
};
use serde::{Deserialize, Serialize};

use crate::config::{Color, SheetConfig};
use crate::container::{ContainerState, HEIGHT, OVERLAY_ALPHA, TRANSLATE_Y};
use crate::content::SheetContent;

/// Called once the sheet has been torn down
pub type DismissCallback = Box<dyn FnMut(&BottomSheet)>;

/// Presentation lifecycle of a sheet
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetPhase {
    /// Built but not yet shown
    #[default]
    Configured,
    /// Sliding in
    Presenting,
    Presented,
    /// Sliding out; input is ignored
    Dismissing,
    Dismissed,
}

impl SheetPhase {
    /// Whether the sheet is on its way out or gone
    pub fn is_closing(&self) -> bool {
        matches!(self, SheetPhase::Dismissing | SheetPhase::Dismissed)
    }

    fn accepts_input(&self) -> bool {
        matches!(self, SheetPhase::Presenting | SheetPhase::Presented)
    }
}

/// What a container animation does when it completes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Settle {
    Present,
    Resize,
    Restore,
    Commit,
    Dismiss,
}

#[derive(Clone, Copy, Debug)]
struct ContainerAnimation {
    id: TransitionId,
    token: AnimationToken,
    settle: Settle,
}

const TRACKS: [TrackId; 3] = [HEIGHT, TRANSLATE_Y, OVERLAY_ALPHA];

/// Destination for some of the container tracks
#[derive(Clone, Copy, Debug, Default)]
struct Goal {
    height: Option<f32>,
    translate_y: Option<f32>,
    overlay_alpha: Option<f32>,
}

impl Goal {
    fn slot(&mut self, track: TrackId) -> &mut Option<f32> {
        match track {
            HEIGHT => &mut self.height,
            TRANSLATE_Y => &mut self.translate_y,
            _ => &mut self.overlay_alpha,
        }
    }
}

/// Builder for [`BottomSheet`]
pub struct SheetBuilder {
    config: SheetConfig,
    viewport: Viewport,
    content: Option<Box<dyn SheetContent>>,
    sizes: Option<Vec<SheetSize>>,
    on_dismiss: Option<DismissCallback>,
}

impl SheetBuilder {
    pub fn new() -> Self {
        Self {
            config: SheetConfig::default(),
            viewport: Viewport::default(),
            content: None,
            sizes: None,
            on_dismiss: None,
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: SheetConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the host viewport
    pub fn viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Set the content to host (required)
    pub fn content<C>(mut self, content: C) -> Self
    where
        C: SheetContent + 'static,
    {
        self.content = Some(Box::new(content));
        self
    }

    /// Set the snap points, overriding the configured ones
    pub fn sizes(mut self, sizes: impl IntoIterator<Item = SheetSize>) -> Self {
        self.sizes = Some(sizes.into_iter().collect());
        self
    }

    pub fn dismissable(mut self, dismissable: bool) -> Self {
        self.config.dismissable = dismissable;
        self
    }

    /// Set the callback fired once the sheet has been dismissed
    pub fn on_dismiss<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&BottomSheet) + 'static,
    {
        self.on_dismiss = Some(Box::new(callback));
        self
    }

    /// Build the sheet
    ///
    /// Fails with [`SheetError::MissingContent`] when no content was set.
    pub fn build(self) -> Result<BottomSheet> {
        let content = self.content.ok_or(SheetError::MissingContent)?;
        let config = self.config;
        let sizes = self.sizes.unwrap_or_else(|| config.sizes.clone());

        let container = ContainerState::new(
            self.viewport.sheet_width(config.max_width),
            0.0,
            config.top_corner_radius,
            config.handle_color,
            config.overlay_color.with_alpha(0.0),
        );

        let mut sheet = BottomSheet {
            config,
            viewport: self.viewport,
            content,
            attached: false,
            snap: SnapPoints::new(),
            target: None,
            actual: None,
            drag: DragMachine::new(),
            binding: ScrollBinding::new(),
            child_content_height: 0.0,
            scheduler: AnimationScheduler::new(),
            animation: None,
            container,
            phase: SheetPhase::Configured,
            pending_resize: None,
            restored_this_tick: false,
            on_dismiss: self.on_dismiss,
        };
        sheet.set_sizes(&sizes, false);
        Ok(sheet)
    }
}

impl Default for SheetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A draggable sheet anchored to the bottom of the viewport
pub struct BottomSheet {
    config: SheetConfig,
    viewport: Viewport,
    content: Box<dyn SheetContent>,
    attached: bool,
    snap: SnapPoints,
    /// Size the sheet rests at or is animating toward
    target: Option<SheetSize>,
    /// Size last applied to the container
    actual: Option<SheetSize>,
    drag: DragMachine,
    binding: ScrollBinding,
    child_content_height: f32,
    scheduler: AnimationScheduler,
    animation: Option<ContainerAnimation>,
    container: ContainerState,
    phase: SheetPhase,
    /// Resize requested while a drag owned the container
    pending_resize: Option<SheetSize>,
    /// A drag cancel started a restore since the last tick
    restored_this_tick: bool,
    on_dismiss: Option<DismissCallback>,
}

impl BottomSheet {
    pub fn builder() -> SheetBuilder {
        SheetBuilder::new()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Geometry to render this frame
    pub fn container(&self) -> &ContainerState {
        &self.container
    }

    pub fn phase(&self) -> SheetPhase {
        self.phase
    }

    pub fn target_size(&self) -> Option<SheetSize> {
        self.target
    }

    pub fn actual_size(&self) -> Option<SheetSize> {
        self.actual
    }

    pub fn snap_points(&self) -> &SnapPoints {
        &self.snap
    }

    pub fn drag_state(&self) -> DragState {
        self.drag.state()
    }

    pub fn drag(&self) -> &DragMachine {
        &self.drag
    }

    /// Intrinsic height last reported by the content
    pub fn child_content_height(&self) -> f32 {
        self.child_content_height
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn is_dismissed(&self) -> bool {
        self.phase == SheetPhase::Dismissed
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Slide the sheet in from below the viewport
    pub fn present(&mut self) {
        if self.phase != SheetPhase::Configured {
            tracing::debug!(phase = ?self.phase, "present ignored");
            return;
        }

        if !self.attached {
            self.attached = true;
            self.content.did_attach();
        }
        self.container.width = self.viewport.sheet_width(self.config.max_width);
        self.container.height = self.viewport.height_for(self.target);
        self.container.translate_y = self.viewport.height;
        self.container.overlay = self.config.overlay_color.with_alpha(0.0);
        self.phase = SheetPhase::Presenting;
        tracing::debug!(height = self.container.height, "presenting sheet");

        let goal = Goal {
            translate_y: Some(0.0),
            overlay_alpha: Some(self.config.overlay_color.a),
            ..Default::default()
        };
        self.animate(goal, self.config.timing.present_ms, Easing::EaseOut, Settle::Present);
    }

    /// Move the sheet to `size` without touching the snap points
    ///
    /// While a drag owns the container the request is held and replaces the
    /// snap decision if the drag commits. A request arriving in the same tick
    /// as a drag cancel is dropped so the restore wins.
    pub fn resize(&mut self, size: SheetSize, animated: bool) {
        if self.phase.is_closing() {
            tracing::debug!(?size, "resize ignored while closing");
            return;
        }
        if self.drag.state().is_dragging() {
            tracing::debug!(?size, "resize deferred until the drag ends");
            self.pending_resize = Some(size);
            return;
        }
        if self.restored_this_tick {
            tracing::debug!(?size, "resize dropped; drag cancel restores this tick");
            return;
        }

        self.target = Some(size);
        self.actual = Some(size);
        let height = self.viewport.height_for(Some(size));
        tracing::debug!(?size, height, animated, "resizing sheet");

        if animated && self.phase != SheetPhase::Configured {
            let goal = Goal {
                height: Some(height),
                ..Default::default()
            };
            self.animate(goal, self.config.timing.resize_ms, Easing::EaseOut, Settle::Resize);
        } else {
            self.jump_height(height);
        }
    }

    /// Replace the snap points and move to the first of `sizes`
    ///
    /// Empty input is ignored.
    pub fn set_sizes(&mut self, sizes: &[SheetSize], animated: bool) {
        if !self.snap.set_sizes(sizes, &self.viewport) {
            return;
        }
        if let Some(&first) = sizes.first() {
            self.resize(first, animated);
        }
    }

    /// Slide the sheet out and tear it down; repeated calls do nothing
    pub fn close_sheet(&mut self) {
        if self.phase.is_closing() {
            tracing::debug!("close ignored; already closing");
            return;
        }
        self.begin_dismiss(self.config.timing.close_ms, Easing::EaseIn);
    }

    /// Content reports its intrinsic height and its scroll region
    ///
    /// A sheet without snap points sizes itself to the content.
    pub fn bind_child_scrollable(&mut self, intrinsic_height: f32, region: &ScrollRegion) {
        self.binding.bind(region);
        self.child_content_height = if intrinsic_height.is_finite() {
            intrinsic_height.max(0.0)
        } else {
            0.0
        };

        if self.snap.is_empty() {
            let size = self.snap.set_self_sized(self.child_content_height, &self.viewport);
            tracing::debug!(?size, "sheet sized to its content");
            self.resize(size, false);
        }
    }

    /// Update the host viewport (rotation, split view)
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.container.width = viewport.sheet_width(self.config.max_width);

        // Full-screen may now sort differently against fixed sizes
        let sizes: Vec<SheetSize> = self.snap.iter().copied().collect();
        self.snap.set_sizes(&sizes, &self.viewport);

        let idle = self.animation.is_none() && self.drag.state() == DragState::Idle;
        if idle && matches!(self.phase, SheetPhase::Configured | SheetPhase::Presented) {
            self.container.height = self.viewport.height_for(self.target);
        }
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Feed one drag sample from the host's pan recognizer
    pub fn handle_drag(&mut self, sample: &DragSample) -> DragOutcome {
        if !self.phase.accepts_input() {
            tracing::trace!(phase = ?self.phase, "drag sample ignored");
            return DragOutcome::Ignored;
        }
        if sample.phase == DragPhase::Began {
            self.interrupt_for_drag();
        }

        let metrics = SheetMetrics {
            snap: &self.snap,
            viewport: &self.viewport,
            dismissable: self.config.dismissable,
            target: self.target,
        };
        let outcome = self.drag.handle(sample, self.container.height, &metrics);

        match outcome {
            DragOutcome::Began { baseline, frame } => {
                self.actual = Some(SheetSize::Fixed(baseline));
                self.container.apply_frame(frame);
            }
            DragOutcome::Track(frame) => self.container.apply_frame(frame),
            DragOutcome::Restore { height } => {
                if let Some(size) = self.pending_resize.take() {
                    tracing::debug!(?size, "deferred resize dropped on cancel");
                }
                let goal = Goal {
                    height: Some(height),
                    translate_y: Some(0.0),
                    ..Default::default()
                };
                let duration_ms = self.config.timing.restore_ms;
                self.animate(goal, duration_ms, Easing::EaseInOut, Settle::Restore);
                self.restored_this_tick = true;
            }
            DragOutcome::Commit {
                target,
                duration_secs,
            } => {
                let target = match self.pending_resize.take() {
                    Some(size) => {
                        tracing::debug!(?size, "deferred resize replaces snap target");
                        self.actual = Some(size);
                        Some(size)
                    }
                    None => target,
                };
                if target.is_some() {
                    self.target = target;
                }
                let goal = Goal {
                    height: Some(self.viewport.height_for(self.target.or(self.actual))),
                    translate_y: Some(0.0),
                    ..Default::default()
                };
                self.animate(goal, duration_secs * 1000.0, Easing::EaseInOut, Settle::Commit);
            }
            DragOutcome::Dismiss { duration_secs } => {
                self.begin_dismiss(duration_secs * 1000.0, Easing::EaseInOut);
            }
            DragOutcome::Ignored => {}
        }
        outcome
    }

    /// Whether a touch on `target` should reach the sheet's recognizer at all
    pub fn should_receive_touch(&self, target: TouchTarget) -> bool {
        should_receive_touch(target)
    }

    /// Whether the sheet, rather than the bound scroll region, owns this touch
    ///
    /// Touches on controls never start a drag.
    pub fn should_begin_drag(&self, touch: &TouchStart) -> bool {
        if !self.phase.accepts_input() || self.drag.state() == DragState::Dismissing {
            return false;
        }

        let (min_height, max_height) = self.snap.bounds(&self.viewport);
        let input = ArbitrationInput {
            touch: *touch,
            current_height: self.viewport.height_for(self.target),
            min_height,
            max_height,
            dismissable: self.config.dismissable,
            handle_height: self.config.handle.strip_height(),
            child: self.binding.metrics(),
        };
        should_begin_drag(&input)
    }

    /// Tap on the dimmed area outside the sheet
    pub fn tap_backdrop(&mut self) -> bool {
        self.dismiss_on_tap("backdrop")
    }

    /// Tap on the pull bar
    pub fn tap_handle(&mut self) -> bool {
        self.dismiss_on_tap("handle")
    }

    fn dismiss_on_tap(&mut self, source: &str) -> bool {
        if !self.config.dismissable || !self.phase.accepts_input() {
            return false;
        }
        tracing::debug!(source, "tap dismisses sheet");
        self.close_sheet();
        true
    }

    // =========================================================================
    // Appearance
    // =========================================================================

    pub fn set_handle_color(&mut self, color: Color) {
        self.config.handle_color = color;
        self.container.handle_color = color;
    }

    /// Set the overlay color; takes effect immediately once presented
    pub fn set_overlay_color(&mut self, color: Color) {
        self.config.overlay_color = color;
        if self.phase == SheetPhase::Presented {
            self.container.overlay = color;
        }
    }

    pub fn set_corner_radius(&mut self, radius: f32) {
        self.config.top_corner_radius = radius;
        self.container.corner_radius = radius;
    }

    pub fn set_max_width(&mut self, max_width: f32) {
        self.config.max_width = max_width;
        self.container.width = self.viewport.sheet_width(max_width);
    }

    pub fn set_dismissable(&mut self, dismissable: bool) {
        self.config.dismissable = dismissable;
    }

    // =========================================================================
    // Frame loop
    // =========================================================================

    /// Advance animations by wall-clock time; returns whether one is still running
    pub fn tick(&mut self) -> bool {
        let finished = self.scheduler.tick();
        self.advance(finished)
    }

    /// Advance animations by `dt_ms`; returns whether one is still running
    pub fn tick_by(&mut self, dt_ms: f32) -> bool {
        let finished = self.scheduler.tick_by(dt_ms);
        self.advance(finished)
    }

    fn advance(&mut self, finished: impl IntoIterator<Item = Finished>) -> bool {
        self.restored_this_tick = false;
        if let Some(running) = self.animation {
            if let Some(transition) = self.scheduler.get(running.id) {
                for (track, value) in transition.values() {
                    self.container.set_track(track, value);
                }
            }
        }

        for done in finished {
            let Some(running) = self.animation.filter(|a| a.token == done.token) else {
                tracing::trace!(token = done.token.get(), "stale completion ignored");
                continue;
            };
            for (track, value) in done.transition.values() {
                self.container.set_track(track, value);
            }
            self.animation = None;
            self.complete(running.settle);
        }

        self.is_animating()
    }

    fn complete(&mut self, settle: Settle) {
        tracing::trace!(?settle, height = self.container.height, "container animation settled");
        if self.phase == SheetPhase::Presenting {
            self.phase = SheetPhase::Presented;
        }

        match settle {
            Settle::Present | Settle::Resize => {
                self.actual = Some(SheetSize::Fixed(self.container.height));
            }
            Settle::Commit => {
                self.actual = Some(SheetSize::Fixed(self.container.height));
                self.drag.settled();
            }
            Settle::Restore => self.drag.settled(),
            Settle::Dismiss => self.teardown(),
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn animate(&mut self, mut goal: Goal, duration_ms: f32, easing: Easing, settle: Settle) {
        if let Some(previous) = self.take_animation() {
            for track in TRACKS {
                let slot = goal.slot(track);
                if slot.is_none() {
                    *slot = previous.end_value(track);
                }
            }
        }

        let mut transition = Transition::new(duration_ms, easing);
        for track in TRACKS {
            if let Some(to) = *goal.slot(track) {
                transition = transition.track(track, self.container.track(track), to);
            }
        }
        let (id, token) = self.scheduler.start(transition);
        tracing::trace!(token = token.get(), ?settle, duration_ms, "container animation started");
        self.animation = Some(ContainerAnimation { id, token, settle });
    }

    /// Cancel the live container animation, returning it
    fn take_animation(&mut self) -> Option<Transition> {
        let running = self.animation.take()?;
        tracing::trace!(
            token = running.token.get(),
            settle = ?running.settle,
            "container animation superseded"
        );
        if matches!(running.settle, Settle::Restore | Settle::Commit) {
            self.drag.settled();
        }
        self.scheduler.cancel(running.id)
    }

    /// Set the height now, cutting the height track out of a live animation
    fn jump_height(&mut self, height: f32) {
        if let Some(running) = self.animation {
            let animates_height = self
                .scheduler
                .get(running.id)
                .is_some_and(|t| t.has_track(HEIGHT));
            if animates_height {
                self.animation = None;
                if let Some(previous) = self.scheduler.cancel(running.id) {
                    self.resume_without_height(&previous, running.settle);
                }
            }
        }
        self.container.height = height;
    }

    fn resume_without_height(&mut self, previous: &Transition, settle: Settle) {
        let mut rest = Transition::new(previous.remaining_ms(), previous.easing());
        let mut has_tracks = false;
        for track in [TRANSLATE_Y, OVERLAY_ALPHA] {
            if let Some(to) = previous.end_value(track) {
                rest = rest.track(track, self.container.track(track), to);
                has_tracks = true;
            }
        }

        if has_tracks {
            let (id, token) = self.scheduler.start(rest);
            self.animation = Some(ContainerAnimation { id, token, settle });
        } else if matches!(settle, Settle::Restore | Settle::Commit) {
            self.drag.settled();
        }
    }

    /// A drag takes the container over from whatever was animating it
    fn interrupt_for_drag(&mut self) {
        self.restored_this_tick = false;
        if let Some(previous) = self.take_animation() {
            if let Some(alpha) = previous.end_value(OVERLAY_ALPHA) {
                self.container.overlay.a = alpha;
            }
        }
        if self.phase == SheetPhase::Presenting {
            self.phase = SheetPhase::Presented;
        }
    }

    fn begin_dismiss(&mut self, duration_ms: f32, easing: Easing) {
        self.drag.dismiss();
        self.pending_resize = None;
        self.phase = SheetPhase::Dismissing;
        tracing::debug!(duration_ms, "dismissing sheet");

        let goal = Goal {
            translate_y: Some(self.container.height),
            overlay_alpha: Some(0.0),
            ..Default::default()
        };
        self.animate(goal, duration_ms, easing, Settle::Dismiss);
    }

    fn teardown(&mut self) {
        self.phase = SheetPhase::Dismissed;
        self.binding.unbind();
        if self.attached {
            self.attached = false;
            self.content.will_detach();
        }
        tracing::debug!("sheet dismissed");

        if let Some(mut callback) = self.on_dismiss.take() {
            callback(&*self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Empty;

    impl SheetContent for Empty {}

    fn sheet(sizes: &[SheetSize]) -> BottomSheet {
        BottomSheet::builder()
            .viewport(Viewport::new(390.0, 800.0))
            .sizes(sizes.iter().copied())
            .content(Empty)
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_requires_content() {
        let result = BottomSheet::builder().build();
        assert!(matches!(result, Err(SheetError::MissingContent)));
    }

    #[test]
    fn test_superseded_animation_keeps_other_tracks() {
        let mut sheet = sheet(&[SheetSize::Fixed(300.0), SheetSize::Fixed(500.0)]);
        sheet.present();
        sheet.tick_by(100.0);
        assert_eq!(sheet.phase(), SheetPhase::Presenting);

        // Resize mid-present: the slide-in still lands at zero
        sheet.resize(SheetSize::Fixed(500.0), true);
        sheet.tick_by(1000.0);
        assert_eq!(sheet.phase(), SheetPhase::Presented);
        assert_eq!(sheet.container().translate_y, 0.0);
        assert_eq!(sheet.container().height, 500.0);
        assert!((sheet.container().overlay.a - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_instant_resize_during_present_keeps_slide_in() {
        let mut sheet = sheet(&[SheetSize::Fixed(300.0)]);
        sheet.present();
        sheet.tick_by(100.0);
        sheet.resize(SheetSize::Fixed(200.0), false);
        assert_eq!(sheet.container().height, 200.0);
        assert!(sheet.is_animating());

        sheet.tick_by(1000.0);
        assert_eq!(sheet.container().height, 200.0);
        assert_eq!(sheet.container().translate_y, 0.0);
        assert_eq!(sheet.actual_size(), Some(SheetSize::Fixed(200.0)));
    }

    #[test]
    fn test_instant_resize_cuts_height_animation() {
        let mut sheet = sheet(&[SheetSize::Fixed(300.0)]);
        sheet.present();
        sheet.tick_by(1000.0);

        sheet.resize(SheetSize::Fixed(600.0), true);
        sheet.tick_by(50.0);
        sheet.resize(SheetSize::Fixed(250.0), false);
        assert!(!sheet.is_animating());
        sheet.tick_by(1000.0);
        assert_eq!(sheet.container().height, 250.0);
    }

    #[test]
    fn test_present_twice_is_noop() {
        let mut sheet = sheet(&[SheetSize::Fixed(300.0)]);
        sheet.present();
        sheet.tick_by(1000.0);
        sheet.present();
        assert!(!sheet.is_animating());
        assert_eq!(sheet.container().translate_y, 0.0);
    }
}
