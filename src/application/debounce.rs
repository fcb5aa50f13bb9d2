//! Trailing-edge debounce for the search box.
//!
//! Every list screen funnels raw keystrokes through one of these instead of
//! arming ad hoc timers. A value settles only after the quiet period elapses
//! with no newer update; each update restarts the clock.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Handle feeding raw updates into the debounce worker.
///
/// Dropping the handle cancels any pending timer; nothing is emitted after
/// teardown.
pub struct Debouncer {
    input: mpsc::UnboundedSender<String>,
    worker: JoinHandle<()>,
}

impl Debouncer {
    /// Spawn a debounce worker; settled values arrive on the returned
    /// receiver after `quiet` of input silence.
    pub fn spawn(quiet: Duration) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (input, raw_rx) = mpsc::unbounded_channel();
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run(quiet, raw_rx, settled_tx));
        (Self { input, worker }, settled_rx)
    }

    /// Feed one raw update, restarting the quiet-period timer.
    pub fn update(&self, raw: impl Into<String>) {
        // A closed worker means the consumer is gone; nothing left to settle.
        let _ = self.input.send(raw.into());
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

async fn run(
    quiet: Duration,
    mut raw_rx: mpsc::UnboundedReceiver<String>,
    settled_tx: mpsc::UnboundedSender<String>,
) {
    let mut pending: Option<String> = None;
    loop {
        let armed = pending.is_some();
        let timer = async move {
            if armed {
                tokio::time::sleep(quiet).await;
            } else {
                futures::future::pending::<()>().await;
            }
        };

        tokio::select! {
            update = raw_rx.recv() => match update {
                Some(raw) => pending = Some(raw),
                None => break,
            },
            () = timer => {
                let Some(value) = pending.take() else { continue };
                if settled_tx.send(value).is_err() {
                    break;
                }
            }
        }
    }
}
