//! Snap points
//!
//! The closed set of resting sizes a drag may end on, kept sorted ascending by
//! resolved height. Lookups are linear scans; lists hold a handful of entries.

use smallvec::SmallVec;

use crate::geometry::{SheetSize, Viewport};

/// Ordered set of resting sizes
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SnapPoints {
    sizes: SmallVec<[SheetSize; 4]>,
}

impl SnapPoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list, sorted ascending by resolved height
    ///
    /// Empty input is ignored and the previous list retained. Returns whether
    /// the list was replaced.
    pub fn set_sizes(&mut self, sizes: &[SheetSize], viewport: &Viewport) -> bool {
        if sizes.is_empty() {
            tracing::debug!("ignoring empty snap list");
            return false;
        }

        let mut sorted: SmallVec<[SheetSize; 4]> = sizes.iter().copied().collect();
        sorted.sort_by(|a, b| a.height(viewport).total_cmp(&b.height(viewport)));
        self.sizes = sorted;
        true
    }

    /// Install the single self-sizing point for content of `intrinsic_height`
    ///
    /// Content at least as tall as the viewport becomes full-screen.
    pub fn set_self_sized(&mut self, intrinsic_height: f32, viewport: &Viewport) -> SheetSize {
        let size = if intrinsic_height >= viewport.height {
            SheetSize::FullScreen
        } else {
            SheetSize::Fixed(intrinsic_height.max(0.0))
        };
        self.sizes.clear();
        self.sizes.push(size);
        size
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn first(&self) -> Option<SheetSize> {
        self.sizes.first().copied()
    }

    pub fn last(&self) -> Option<SheetSize> {
        self.sizes.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SheetSize> {
        self.sizes.iter()
    }

    /// Resolved heights of the smallest and largest points
    pub fn bounds(&self, viewport: &Viewport) -> (f32, f32) {
        (
            viewport.height_for(self.first()),
            viewport.height_for(self.last()),
        )
    }

    /// Smallest point at least `target_height` tall, or the largest point
    pub fn nearest_going_up(&self, target_height: f32, viewport: &Viewport) -> Option<SheetSize> {
        self.sizes
            .iter()
            .find(|size| size.height(viewport) >= target_height)
            .or(self.sizes.last())
            .copied()
    }

    /// Largest point no taller than `target_height`, or `current` unchanged
    pub fn nearest_going_down(
        &self,
        target_height: f32,
        current: Option<SheetSize>,
        viewport: &Viewport,
    ) -> Option<SheetSize> {
        self.sizes
            .iter()
            .rev()
            .find(|size| size.height(viewport) <= target_height)
            .copied()
            .or(current)
    }
}
