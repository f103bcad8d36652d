use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Why a refresh fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshSignal {
    Debounced,
    Auto,
}

/// Cooperative staleness marker. A fetch holding a token that is no longer
/// current must discard its result instead of applying it to feed state.
#[derive(Debug, Clone)]
pub struct RequestToken {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl RequestToken {
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }
}

struct SchedulerInner {
    debounce: Option<JoinHandle<()>>,
    auto: Option<JoinHandle<()>>,
    transport: CancellationToken,
}

/// Owns the two feed timers and the request-token generation counter.
/// Firings are delivered over a channel; the scheduler never holds a
/// reference into the controller, so a timer outliving a torn-down session
/// cannot call into it.
pub struct RefreshScheduler {
    generation: Arc<AtomicU64>,
    tx: mpsc::UnboundedSender<RefreshSignal>,
    inner: Mutex<SchedulerInner>,
}

impl RefreshScheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RefreshSignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            generation: Arc::new(AtomicU64::new(0)),
            tx,
            inner: Mutex::new(SchedulerInner {
                debounce: None,
                auto: None,
                transport: CancellationToken::new(),
            }),
        };
        (scheduler, rx)
    }

    /// (Re)arms the single debounce timer. Last call wins; a pending timer
    /// is replaced, never stacked.
    pub async fn schedule_debounced_refresh(&self, after: Duration) {
        let tx = self.tx.clone();
        let mut inner = self.inner.lock().await;
        if let Some(pending) = inner.debounce.take() {
            pending.abort();
        }
        inner.debounce = Some(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = tx.send(RefreshSignal::Debounced);
        }));
        debug!(after_ms = after.as_millis() as u64, "debounced refresh armed");
    }

    /// Arms the repeating auto-refresh timer. At most one is active; a second
    /// start is a no-op and does not double the firing rate.
    pub async fn start_auto_refresh(&self, interval: Duration) {
        let mut inner = self.inner.lock().await;
        if inner.auto.is_some() {
            return;
        }
        let tx = self.tx.clone();
        inner.auto = Some(tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            loop {
                ticker.tick().await;
                if tx.send(RefreshSignal::Auto).is_err() {
                    break;
                }
            }
        }));
    }

    pub async fn stop_auto_refresh(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(auto) = inner.auto.take() {
            auto.abort();
        }
    }

    /// Issues a fresh token, implicitly invalidating every previous one.
    pub fn new_request_token(&self) -> RequestToken {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        RequestToken {
            generation,
            current: Arc::clone(&self.generation),
        }
    }

    /// Transport-level cancellation for the explicit first-page refresh.
    /// Taking a new token aborts whatever fetch held the previous one.
    pub async fn first_page_cancellation(&self) -> CancellationToken {
        let mut inner = self.inner.lock().await;
        inner.transport.cancel();
        inner.transport = CancellationToken::new();
        inner.transport.clone()
    }

    /// Clears both timers, cancels in-flight transport, and invalidates all
    /// outstanding request tokens. Called on session teardown.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(pending) = inner.debounce.take() {
            pending.abort();
        }
        if let Some(auto) = inner.auto.take() {
            auto.abort();
        }
        inner.transport.cancel();
        self.generation.fetch_add(1, Ordering::SeqCst);
        debug!("refresh scheduler shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn drain(rx: &mut mpsc::UnboundedReceiver<RefreshSignal>) -> Vec<RefreshSignal> {
        let mut fired = Vec::new();
        while let Ok(signal) = rx.try_recv() {
            fired.push(signal);
        }
        fired
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_coalesces_to_a_single_firing() {
        let (scheduler, mut rx) = RefreshScheduler::new();
        let delay = Duration::from_millis(5_000);

        for _ in 0..4 {
            scheduler.schedule_debounced_refresh(delay).await;
            tokio::time::advance(Duration::from_millis(1_000)).await;
        }
        assert!(drain(&mut rx).await.is_empty());

        // Fires one full delay after the *last* call.
        tokio::time::advance(Duration::from_millis(5_000)).await;
        tokio::task::yield_now().await;
        assert_eq!(drain(&mut rx).await, vec![RefreshSignal::Debounced]);

        tokio::time::advance(Duration::from_millis(20_000)).await;
        tokio::task::yield_now().await;
        assert!(drain(&mut rx).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_does_not_double_the_auto_rate() {
        let (scheduler, mut rx) = RefreshScheduler::new();
        let interval = Duration::from_millis(600_000);

        scheduler.start_auto_refresh(interval).await;
        scheduler.start_auto_refresh(interval).await;
        tokio::task::yield_now().await;

        tokio::time::advance(interval).await;
        tokio::task::yield_now().await;
        assert_eq!(drain(&mut rx).await, vec![RefreshSignal::Auto]);

        tokio::time::advance(interval).await;
        tokio::task::yield_now().await;
        assert_eq!(drain(&mut rx).await, vec![RefreshSignal::Auto]);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_auto_refresh_disarms_the_timer() {
        let (scheduler, mut rx) = RefreshScheduler::new();
        let interval = Duration::from_millis(1_000);

        scheduler.start_auto_refresh(interval).await;
        scheduler.stop_auto_refresh().await;

        tokio::time::advance(Duration::from_millis(10_000)).await;
        tokio::task::yield_now().await;
        assert!(drain(&mut rx).await.is_empty());
    }

    #[tokio::test]
    async fn fresh_token_invalidates_the_previous_one() {
        let (scheduler, _rx) = RefreshScheduler::new();

        let first = scheduler.new_request_token();
        assert!(first.is_current());

        let second = scheduler.new_request_token();
        assert!(!first.is_current());
        assert!(second.is_current());
    }

    #[tokio::test]
    async fn first_page_cancellation_aborts_the_previous_fetch() {
        let (scheduler, _rx) = RefreshScheduler::new();

        let first = scheduler.first_page_cancellation().await;
        assert!(!first.is_cancelled());

        let second = scheduler.first_page_cancellation().await;
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_clears_timers_and_tokens() {
        let (scheduler, mut rx) = RefreshScheduler::new();
        scheduler
            .schedule_debounced_refresh(Duration::from_millis(5_000))
            .await;
        scheduler.start_auto_refresh(Duration::from_millis(1_000)).await;
        let token = scheduler.new_request_token();
        let cancel = scheduler.first_page_cancellation().await;

        scheduler.shutdown().await;

        assert!(!token.is_current());
        assert!(cancel.is_cancelled());
        tokio::time::advance(Duration::from_millis(60_000)).await;
        tokio::task::yield_now().await;
        assert!(drain(&mut rx).await.is_empty());
    }
}
