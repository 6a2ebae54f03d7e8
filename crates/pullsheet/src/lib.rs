//! Pullsheet
//!
//! A headless bottom sheet: a panel anchored to the bottom of the viewport
//! that rests at discrete snap heights, follows the finger while dragged,
//! rubber-bands and dismisses past its smallest height, and negotiates touch
//! ownership with a scrollable region inside its content.
//!
//! The host owns rendering and input delivery; this crate owns the state.
//!
//! # Example
//!
//! ```rust
//! use pullsheet::{BottomSheet, SheetContent, SheetPhase};
//! use pullsheet_core::{DragSample, SheetSize, Viewport};
//!
//! struct Menu;
//! impl SheetContent for Menu {}
//!
//! let mut sheet = BottomSheet::builder()
//!     .viewport(Viewport::new(390.0, 800.0))
//!     .sizes([SheetSize::Fixed(350.0), SheetSize::Fixed(550.0), SheetSize::FullScreen])
//!     .content(Menu)
//!     .build()
//!     .unwrap();
//!
//! sheet.present();
//! sheet.tick_by(300.0);
//! assert_eq!(sheet.phase(), SheetPhase::Presented);
//!
//! sheet.handle_drag(&DragSample::began());
//! sheet.handle_drag(&DragSample::changed(-300.0));
//! sheet.handle_drag(&DragSample::ended(-300.0, 0.0));
//! sheet.tick_by(400.0);
//! assert_eq!(sheet.target_size(), Some(SheetSize::FullScreen));
//! assert_eq!(sheet.container().height, 780.0);
//! ```

pub mod config;
pub mod container;
pub mod content;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod sheet;

pub use config::{Color, HandleMetrics, SheetConfig, Timing};
pub use container::ContainerState;
pub use content::SheetContent;
pub use report::{DragTransition, ScenarioReport, SheetSnapshot, StepFailure};
pub use runner::{run_loaded_scenario, run_scenario, RunOutcome};
pub use scenario::{ScenarioStep, SheetScenario};
pub use sheet::{BottomSheet, DismissCallback, SheetBuilder, SheetPhase};

pub use pullsheet_core::{Result, SheetError};
