//! Cancellation checks for report runs.

use tokio_util::sync::CancellationToken;

/// Polled by long-running scans between steps.
pub trait CancelSignal {
    fn is_canceled(&self) -> bool;
}

impl CancelSignal for CancellationToken {
    fn is_canceled(&self) -> bool {
        self.is_cancelled()
    }
}

impl<S: CancelSignal + ?Sized> CancelSignal for &S {
    fn is_canceled(&self) -> bool {
        (**self).is_canceled()
    }
}

/// A signal that never fires.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverCancel;

impl CancelSignal for NeverCancel {
    fn is_canceled(&self) -> bool {
        false
    }
}
