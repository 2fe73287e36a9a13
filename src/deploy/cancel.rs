// ABOUTME: Cooperative cancellation for the release pipeline.
// ABOUTME: Wraps a watch channel so waits and inter-step sleeps can be interrupted promptly.

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;

/// Returned by a guarded wait when an abort was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("release aborted")]
pub struct Cancelled;

/// Requests an abort. Dropping the handle without calling `cancel` never aborts.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signal every associated `Cancellation`.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Receiving side of an abort request, threaded through every stage.
#[derive(Debug, Clone)]
pub struct Cancellation {
    rx: watch::Receiver<bool>,
    live: bool,
}

impl Cancellation {
    /// Create a linked handle and cancellation.
    pub fn new() -> (CancelHandle, Cancellation) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle { tx }, Cancellation { rx, live: true })
    }

    /// A cancellation that can never fire.
    pub fn never() -> Cancellation {
        let (_tx, rx) = watch::channel(false);
        Cancellation { rx, live: false }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Run `fut` to completion unless an abort is requested first.
    pub async fn guard<F: Future>(&mut self, fut: F) -> Result<F::Output, Cancelled> {
        if self.is_cancelled() {
            return Err(Cancelled);
        }

        tokio::pin!(fut);
        loop {
            let live = self.live;
            let signalled = tokio::select! {
                out = &mut fut => return Ok(out),
                changed = self.rx.changed(), if live => changed.is_ok(),
            };

            if !signalled {
                // Handle dropped: nothing can cancel us any more.
                self.live = false;
                continue;
            }
            if *self.rx.borrow_and_update() {
                return Err(Cancelled);
            }
        }
    }

    /// Sleep for `duration`, waking early on abort.
    pub async fn sleep(&mut self, duration: Duration) -> Result<(), Cancelled> {
        self.guard(tokio::time::sleep(duration)).await
    }
}
