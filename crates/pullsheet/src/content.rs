//! Hosted content
//!
//! The sheet owns its content for the whole presentation. Content that
//! scrolls reports itself through [`BottomSheet::bind_child_scrollable`].
//!
//! [`BottomSheet::bind_child_scrollable`]: crate::BottomSheet::bind_child_scrollable

/// Lifecycle hooks for content embedded in a sheet
pub trait SheetContent {
    /// Called once when the sheet is presented
    fn did_attach(&mut self) {}

    /// Called during teardown, before the dismissal notification
    fn will_detach(&mut self) {}
}

impl<T: SheetContent + ?Sized> SheetContent for Box<T> {
    fn did_attach(&mut self) {
        (**self).did_attach()
    }

    fn will_detach(&mut self) {
        (**self).will_detach()
    }
}
