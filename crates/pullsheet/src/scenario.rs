//! Scenario definition for headless sheet runs.
//!
//! A scenario is a JSON document describing a viewport, an optional
//! configuration and a list of steps:
//!
//! ```json
//! {
//!   "viewport": { "width": 390, "height": 800 },
//!   "steps": [
//!     { "type": "present" },
//!     { "type": "content_loaded", "height": 240 },
//!     { "type": "tick", "ms": 400 },
//!     { "type": "assert_height", "value": 240 }
//!   ]
//! }
//! ```

use std::path::Path;

use anyhow::Result;
use pullsheet_core::{DragSample, SheetSize, TouchStart, Viewport};
use serde::Deserialize;

use crate::config::SheetConfig;
use crate::sheet::SheetPhase;

/// Length of one simulated frame
pub const FRAME_MS: f32 = 16.0;

fn default_viewport() -> Viewport {
    Viewport::new(390.0, 800.0)
}

fn default_tolerance() -> f32 {
    0.5
}

/// Sequence of steps run against one sheet
#[derive(Debug, Clone, Deserialize)]
pub struct SheetScenario {
    #[serde(default = "default_viewport")]
    pub viewport: Viewport,
    #[serde(default)]
    pub config: SheetConfig,
    /// Snap points; falls back to `config.sizes`
    #[serde(default)]
    pub sizes: Option<Vec<SheetSize>>,
    pub steps: Vec<ScenarioStep>,
}

impl SheetScenario {
    /// Load a scenario from JSON text.
    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a scenario from file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }
}

/// One scenario step
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioStep {
    Present,
    /// Content reports its height and scroll region
    ContentLoaded {
        height: f32,
        /// Scrollable content height; defaults to `height`
        #[serde(default)]
        content_height: Option<f32>,
        #[serde(default)]
        offset_y: f32,
    },
    /// Scroll the bound child region
    ScrollChild { offset_y: f32 },
    /// Advance time in whole frames
    Tick { ms: f32 },
    /// Raw drag samples
    Drag { samples: Vec<DragSample> },
    /// Begin, move by `dy` and release with `velocity`
    Swipe {
        dy: f32,
        #[serde(default)]
        velocity: f32,
    },
    Resize {
        size: SheetSize,
        #[serde(default)]
        animated: bool,
    },
    SetSizes {
        sizes: Vec<SheetSize>,
        #[serde(default)]
        animated: bool,
    },
    SetViewport { viewport: Viewport },
    Close,
    TapBackdrop,
    TapHandle,
    AssertHeight {
        value: f32,
        #[serde(default = "default_tolerance")]
        tolerance: f32,
    },
    AssertTranslation {
        value: f32,
        #[serde(default = "default_tolerance")]
        tolerance: f32,
    },
    AssertTarget { size: Option<SheetSize> },
    AssertPhase { phase: SheetPhase },
    AssertDismissCount { count: u32 },
    AssertBeginsDrag { touch: TouchStart, expected: bool },
}

impl ScenarioStep {
    pub fn is_assertion(&self) -> bool {
        matches!(
            self,
            ScenarioStep::AssertHeight { .. }
                | ScenarioStep::AssertTranslation { .. }
                | ScenarioStep::AssertTarget { .. }
                | ScenarioStep::AssertPhase { .. }
                | ScenarioStep::AssertDismissCount { .. }
                | ScenarioStep::AssertBeginsDrag { .. }
        )
    }
}
