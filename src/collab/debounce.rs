use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};

enum Signal {
    Changed,
    Shutdown(oneshot::Sender<()>),
}

/// Coalesces change notifications into one flush per quiet period.
///
/// Each notification resets the `debounce` timer. Under continuous edits a
/// flush still happens once `max_wait` has passed since the first pending
/// change. A pending change is flushed when the debouncer shuts down or its
/// last handle is dropped.
pub struct ChangeDebouncer {
    tx: mpsc::UnboundedSender<Signal>,
    dirty: Arc<AtomicBool>,
}

impl ChangeDebouncer {
    pub fn spawn<F, Fut>(debounce: Duration, max_wait: Duration, on_flush: F) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let dirty = Arc::new(AtomicBool::new(false));
        tokio::spawn(run(rx, dirty.clone(), debounce, max_wait, on_flush));
        Self { tx, dirty }
    }

    pub fn notify(&self) {
        self.dirty.store(true, Ordering::SeqCst);
        let _ = self.tx.send(Signal::Changed);
    }

    /// True while a change is waiting to be flushed
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Flush anything pending and stop. Waits for the flush to finish.
    pub async fn shutdown(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Signal::Shutdown(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }
}

async fn run<F, Fut>(
    mut rx: mpsc::UnboundedReceiver<Signal>,
    dirty: Arc<AtomicBool>,
    debounce: Duration,
    max_wait: Duration,
    on_flush: F,
) where
    F: Fn() -> Fut,
    Fut: Future<Output = ()>,
{
    // (first pending change, latest change)
    let mut pending: Option<(Instant, Instant)> = None;

    loop {
        let signal = match pending {
            None => rx.recv().await,
            Some((first, last)) => {
                let deadline = (last + debounce).min(first + max_wait);
                tokio::select! {
                    signal = rx.recv() => signal,
                    _ = sleep_until(deadline) => {
                        pending = None;
                        dirty.store(false, Ordering::SeqCst);
                        on_flush().await;
                        continue;
                    }
                }
            }
        };

        match signal {
            Some(Signal::Changed) => {
                let now = Instant::now();
                pending = Some(match pending {
                    Some((first, _)) => (first, now),
                    None => (now, now),
                });
            }
            Some(Signal::Shutdown(ack)) => {
                if pending.is_some() {
                    dirty.store(false, Ordering::SeqCst);
                    on_flush().await;
                }
                let _ = ack.send(());
                return;
            }
            None => {
                if pending.is_some() {
                    dirty.store(false, Ordering::SeqCst);
                    on_flush().await;
                }
                return;
            }
        }
    }
}
