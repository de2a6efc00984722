//! Run cancellation
//!
//! A `RunCanceller` is held by whoever may abort a run; the engine receives
//! the matching `CancelToken`. Cancelling drops every in-flight evaluator
//! task of the run and no assessment is produced.

use tokio::sync::watch;

/// Owner side of a cancellation signal
#[derive(Debug)]
pub struct RunCanceller {
    tx: watch::Sender<bool>,
}

impl Default for RunCanceller {
    fn default() -> Self {
        Self::new()
    }
}

impl RunCanceller {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Returns a token observing this canceller
    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }

    /// Signals cancellation to every token
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Observer side of a cancellation signal
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is signalled.
    ///
    /// Never resolves if the canceller is dropped without cancelling.
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
