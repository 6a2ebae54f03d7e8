//! Child scroll region binding
//!
//! The content embedded in a sheet may own one scrollable region. The region
//! shares its scroll metrics through a [`ScrollRegion`] handle; the sheet keeps
//! only a weak [`ScrollBinding`] to it, so dropping the content never leaves a
//! dangling reference and rebinding needs no teardown.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Scroll offsets within half a pixel of zero count as "at the top"
const TOP_TOLERANCE: f32 = 0.5;

/// Scroll metrics reported by a child region
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    /// Vertical content offset; 0 at the top, positive once scrolled down
    pub offset_y: f32,
    pub content_height: f32,
    pub viewport_height: f32,
}

impl ScrollMetrics {
    /// Whether there is no unconsumed content above the visible area
    pub fn is_at_top(&self) -> bool {
        self.offset_y.abs() < TOP_TOLERANCE
    }
}

#[derive(Debug, Default)]
struct RegionInner {
    metrics: ScrollMetrics,
    /// The region's own scroll gesture waits for the sheet's drag to fail
    defers_to_sheet: bool,
}

/// Shared handle to a scrollable region's state
///
/// Cloning shares the same region.
#[derive(Clone, Debug, Default)]
pub struct ScrollRegion {
    inner: Arc<Mutex<RegionInner>>,
}

impl ScrollRegion {
    pub fn new(metrics: ScrollMetrics) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RegionInner {
                metrics,
                defers_to_sheet: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn metrics(&self) -> ScrollMetrics {
        self.lock().metrics
    }

    pub fn set_metrics(&self, metrics: ScrollMetrics) {
        self.lock().metrics = metrics;
    }

    /// Update the vertical content offset
    pub fn set_offset_y(&self, offset_y: f32) {
        self.lock().metrics.offset_y = offset_y;
    }

    /// Whether a sheet currently gets first refusal on this region's touches
    pub fn defers_to_sheet(&self) -> bool {
        self.lock().defers_to_sheet
    }

    fn downgrade(&self) -> Weak<Mutex<RegionInner>> {
        Arc::downgrade(&self.inner)
    }
}

/// Non-owning reference to the region a sheet arbitrates against
#[derive(Debug, Default)]
pub struct ScrollBinding {
    region: Option<Weak<Mutex<RegionInner>>>,
}

impl ScrollBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to `region`, replacing any previous binding
    pub fn bind(&mut self, region: &ScrollRegion) {
        self.release_previous();
        region.lock().defers_to_sheet = true;
        self.region = Some(region.downgrade());
    }

    /// Drop the binding; the region scrolls on its own again
    pub fn unbind(&mut self) {
        self.release_previous();
        self.region = None;
    }

    /// Metrics of the bound region, if it is still alive
    pub fn metrics(&self) -> Option<ScrollMetrics> {
        let inner = self.region.as_ref()?.upgrade()?;
        let metrics = inner.lock().unwrap_or_else(PoisonError::into_inner).metrics;
        Some(metrics)
    }

    /// Whether a live region is bound
    pub fn is_bound(&self) -> bool {
        self.region
            .as_ref()
            .is_some_and(|region| region.strong_count() > 0)
    }

    fn release_previous(&mut self) {
        if let Some(inner) = self.region.take().and_then(|weak| weak.upgrade()) {
            inner
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .defers_to_sheet = false;
        }
    }
}
