//! Scenario runner that drives a sheet through headless steps.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::{bail, Result};
use pullsheet_core::{DragSample, ScrollMetrics, ScrollRegion};

use crate::content::SheetContent;
use crate::report::{ScenarioReport, SheetSnapshot, StepFailure};
use crate::scenario::{ScenarioStep, SheetScenario, FRAME_MS};
use crate::sheet::BottomSheet;

/// Final outcome of a scenario run.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Passed { report: ScenarioReport },
    Failed { report: ScenarioReport },
}

impl RunOutcome {
    pub fn report(&self) -> &ScenarioReport {
        match self {
            RunOutcome::Passed { report } => report,
            RunOutcome::Failed { report } => report,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. })
    }
}

/// Content stand-in for headless runs
struct HeadlessContent;

impl SheetContent for HeadlessContent {
    fn did_attach(&mut self) {
        tracing::trace!("headless content attached");
    }

    fn will_detach(&mut self) {
        tracing::trace!("headless content detached");
    }
}

/// Simulated frame clock
#[derive(Debug, Default)]
struct FrameClock {
    frames: u64,
    elapsed_ms: f32,
}

impl FrameClock {
    fn run(&mut self, sheet: &mut BottomSheet, ms: f32) -> Result<()> {
        if !ms.is_finite() || ms < 0.0 {
            bail!("tick duration must be a finite, non-negative number of milliseconds");
        }
        let mut remaining = ms;
        while remaining > 0.0 {
            let dt = remaining.min(FRAME_MS);
            sheet.tick_by(dt);
            remaining -= dt;
            self.frames += 1;
            self.elapsed_ms += dt;
        }
        Ok(())
    }

    fn report(
        &self,
        sheet: &BottomSheet,
        dismiss_count: u32,
        failure: Option<StepFailure>,
    ) -> ScenarioReport {
        ScenarioReport {
            failure,
            frames: self.frames,
            elapsed_ms: self.elapsed_ms.round() as u64,
            snapshot: SheetSnapshot::capture(sheet, dismiss_count),
        }
    }
}

type Failure = Option<(&'static str, String)>;

fn check_close(assertion: &'static str, actual: f32, expected: f32, tolerance: f32) -> Failure {
    if (actual - expected).abs() <= tolerance {
        None
    } else {
        Some((assertion, format!("expected {expected} (±{tolerance}), got {actual}")))
    }
}

fn check_eq<T>(assertion: &'static str, actual: T, expected: T) -> Failure
where
    T: PartialEq + std::fmt::Debug,
{
    if actual == expected {
        None
    } else {
        Some((assertion, format!("expected {expected:?}, got {actual:?}")))
    }
}

/// Execute scenario JSON.
pub fn run_scenario(input: &str) -> Result<RunOutcome> {
    let scenario = SheetScenario::from_json(input)?;
    run_loaded_scenario(&scenario)
}

/// Execute a pre-loaded scenario.
pub fn run_loaded_scenario(scenario: &SheetScenario) -> Result<RunOutcome> {
    let dismissals = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&dismissals);

    let mut builder = BottomSheet::builder()
        .config(scenario.config.clone())
        .viewport(scenario.viewport)
        .content(HeadlessContent)
        .on_dismiss(move |_| counter.set(counter.get() + 1));
    if let Some(sizes) = &scenario.sizes {
        builder = builder.sizes(sizes.iter().copied());
    }
    let mut sheet = builder.build()?;

    // Keeps the child region alive; the sheet only holds a weak binding
    let mut region: Option<ScrollRegion> = None;
    let mut clock = FrameClock::default();

    for (step_index, step) in scenario.steps.iter().enumerate() {
        let failure: Failure = match step {
            ScenarioStep::Present => {
                sheet.present();
                None
            }
            ScenarioStep::ContentLoaded {
                height,
                content_height,
                offset_y,
            } => {
                let child = ScrollRegion::new(ScrollMetrics {
                    offset_y: *offset_y,
                    content_height: content_height.unwrap_or(*height),
                    viewport_height: *height,
                });
                sheet.bind_child_scrollable(*height, &child);
                region = Some(child);
                None
            }
            ScenarioStep::ScrollChild { offset_y } => {
                let Some(child) = &region else {
                    bail!("step {step_index}: scroll_child before content_loaded");
                };
                child.set_offset_y(*offset_y);
                None
            }
            ScenarioStep::Tick { ms } => {
                clock.run(&mut sheet, *ms)?;
                None
            }
            ScenarioStep::Drag { samples } => {
                for sample in samples {
                    sheet.handle_drag(sample);
                }
                None
            }
            ScenarioStep::Swipe { dy, velocity } => {
                sheet.handle_drag(&DragSample::began());
                sheet.handle_drag(&DragSample::changed(*dy));
                sheet.handle_drag(&DragSample::ended(*dy, *velocity));
                None
            }
            ScenarioStep::Resize { size, animated } => {
                sheet.resize(*size, *animated);
                None
            }
            ScenarioStep::SetSizes { sizes, animated } => {
                sheet.set_sizes(sizes, *animated);
                None
            }
            ScenarioStep::SetViewport { viewport } => {
                sheet.set_viewport(*viewport);
                None
            }
            ScenarioStep::Close => {
                sheet.close_sheet();
                None
            }
            ScenarioStep::TapBackdrop => {
                sheet.tap_backdrop();
                None
            }
            ScenarioStep::TapHandle => {
                sheet.tap_handle();
                None
            }
            ScenarioStep::AssertHeight { value, tolerance } => {
                check_close("assert_height", sheet.container().height, *value, *tolerance)
            }
            ScenarioStep::AssertTranslation { value, tolerance } => check_close(
                "assert_translation",
                sheet.container().translate_y,
                *value,
                *tolerance,
            ),
            ScenarioStep::AssertTarget { size } => {
                check_eq("assert_target", sheet.target_size(), *size)
            }
            ScenarioStep::AssertPhase { phase } => check_eq("assert_phase", sheet.phase(), *phase),
            ScenarioStep::AssertDismissCount { count } => {
                check_eq("assert_dismiss_count", dismissals.get(), *count)
            }
            ScenarioStep::AssertBeginsDrag { touch, expected } => {
                check_eq("assert_begins_drag", sheet.should_begin_drag(touch), *expected)
            }
        };

        if let Some((assertion, message)) = failure {
            tracing::debug!(step_index, assertion, %message, "scenario assertion failed");
            let failure = StepFailure {
                step_index,
                assertion: assertion.to_string(),
                message,
            };
            let report = clock.report(&sheet, dismissals.get(), Some(failure));
            return Ok(RunOutcome::Failed { report });
        }
    }

    Ok(RunOutcome::Passed {
        report: clock.report(&sheet, dismissals.get(), None),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_counts_frames() {
        let outcome = run_scenario(
            r#"{ "sizes": [{ "fixed": 300 }], "steps": [
                { "type": "present" },
                { "type": "tick", "ms": 40 }
            ] }"#,
        )
        .unwrap();
        let report = outcome.report();
        assert!(report.is_passed());
        assert_eq!(report.frames, 3);
        assert_eq!(report.elapsed_ms, 40);
    }

    #[test]
    fn test_failed_assertion_reports_step() {
        let outcome = run_scenario(
            r#"{ "sizes": [{ "fixed": 300 }], "steps": [
                { "type": "present" },
                { "type": "tick", "ms": 400 },
                { "type": "assert_height", "value": 500 }
            ] }"#,
        )
        .unwrap();
        assert!(outcome.is_failed());
        let report = outcome.report();
        let failure = report.failure.as_ref().unwrap();
        assert_eq!(failure.step_index, 2);
        assert_eq!(failure.assertion, "assert_height");
        assert_eq!(report.snapshot.height, 300.0);
    }

    #[test]
    fn test_scroll_child_requires_content() {
        let result = run_scenario(r#"{ "steps": [{ "type": "scroll_child", "offset_y": 10 }] }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_infinite_tick() {
        let mut sheet = BottomSheet::builder().content(HeadlessContent).build().unwrap();
        let mut clock = FrameClock::default();
        assert!(clock.run(&mut sheet, f32::INFINITY).is_err());
    }
}
