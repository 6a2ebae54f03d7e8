//! What a headless run leaves behind: where it stopped and the sheet as it
//! stood at that moment, including how the drag machine got there.

use anyhow::Result;
use pullsheet_core::{DragState, SheetSize};
use serde::Serialize;

use crate::sheet::{BottomSheet, SheetPhase};

/// The assertion a run stopped at
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepFailure {
    pub step_index: usize,
    pub assertion: String,
    pub message: String,
}

/// One drag state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DragTransition {
    pub from: DragState,
    pub to: DragState,
}

/// Sheet state when the run stopped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetSnapshot {
    pub phase: SheetPhase,
    pub drag_state: DragState,
    pub height: f32,
    pub translate_y: f32,
    pub target: Option<SheetSize>,
    pub dismiss_count: u32,
    /// Latest drag state changes, oldest first
    pub drag_transitions: Vec<DragTransition>,
}

impl SheetSnapshot {
    pub fn capture(sheet: &BottomSheet, dismiss_count: u32) -> Self {
        let drag_transitions = sheet
            .drag()
            .history()
            .map(|&(from, _, to)| DragTransition { from, to })
            .collect();

        Self {
            phase: sheet.phase(),
            drag_state: sheet.drag_state(),
            height: sheet.container().height,
            translate_y: sheet.container().translate_y,
            target: sheet.target_size(),
            dismiss_count,
            drag_transitions,
        }
    }
}

/// Result of running one scenario against a sheet
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// First failed assertion; `None` when every step held
    pub failure: Option<StepFailure>,
    /// Simulated frames ticked
    pub frames: u64,
    pub elapsed_ms: u64,
    pub snapshot: SheetSnapshot,
}

impl ScenarioReport {
    pub fn is_passed(&self) -> bool {
        self.failure.is_none()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
