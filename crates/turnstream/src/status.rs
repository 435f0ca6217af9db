//! Animated status indicator driven by a [`Scope`](crate::scope::Scope).
//!
//! The engine renders nothing itself; a [`StatusSink`] is the write-only
//! seam to whatever draws the indicator. [`Spinner`] owns only the timing
//! and lifecycle: it ticks on a fixed interval inside a scope and guarantees
//! a single terminal clear, whether it is stopped explicitly or the scope is
//! torn down by fault or cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::scope::Scope;

/// Write-only output for a status indicator.
///
/// `tick` receives a monotonically increasing counter; frame glyphs and
/// formatting are entirely the sink's concern.
pub trait StatusSink: Send + Sync {
    /// Called once per interval while the indicator runs.
    fn tick(&self, count: u64);

    /// Called exactly once when the indicator is cleared from view.
    fn clear(&self);
}

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

/// A self-driving status indicator.
///
/// Single-use: `start` is idempotent while running, and once stopped the
/// spinner stays stopped. The terminal clear runs exactly once, on `stop` or
/// on scope exit, whichever comes first.
#[derive(Clone)]
pub struct Spinner {
    sink: Arc<dyn StatusSink>,
    period: Duration,
    state: Arc<AtomicU8>,
    halted: CancellationToken,
}

impl Spinner {
    /// Creates a spinner ticking every `period`.
    pub fn new(sink: Arc<dyn StatusSink>, period: Duration) -> Self {
        Self {
            sink,
            period,
            state: Arc::new(AtomicU8::new(IDLE)),
            halted: CancellationToken::new(),
        }
    }

    /// Starts the tick loop inside `scope`.
    ///
    /// Repeated calls while running are no-ops. The scope guarantees the
    /// loop halts and the sink is cleared when the scope ends.
    ///
    /// The tick loop is a scope child like any other, so `Scope::join` waits
    /// for it. Call [`stop`](Self::stop), or cancel the scope, before
    /// joining; `stop` wakes the loop immediately rather than waiting out
    /// the current period.
    pub fn start(&self, scope: &mut Scope) {
        if self
            .state
            .compare_exchange(IDLE, RUNNING, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        let guard = self.clone();
        scope.defer(move || guard.halt());

        let sink = Arc::clone(&self.sink);
        let state = Arc::clone(&self.state);
        let halted = self.halted.clone();
        let period = self.period;
        scope.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut count = 0u64;
            loop {
                tokio::select! {
                    () = halted.cancelled() => break,
                    _ = interval.tick() => {
                        if state.load(Ordering::SeqCst) != RUNNING {
                            break;
                        }
                        sink.tick(count);
                        count += 1;
                    }
                }
            }
            Ok(())
        });
    }

    /// Halts the tick loop and clears the indicator.
    ///
    /// Safe to call any number of times; the clear happens once.
    pub fn stop(&self) {
        self.halt();
    }

    fn halt(&self) {
        if self.state.swap(STOPPED, Ordering::SeqCst) == RUNNING {
            self.halted.cancel();
            self.sink.clear();
        }
    }
}

impl std::fmt::Debug for Spinner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spinner")
            .field("period", &self.period)
            .field("state", &self.state.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::AtomicU32;

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        ticks: Mutex<Vec<u64>>,
        clears: AtomicU32,
    }

    impl StatusSink for RecordingSink {
        fn tick(&self, count: u64) {
            self.ticks.lock().unwrap().push(count);
        }

        fn clear(&self) {
            self.clears.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_then_clears_on_stop() {
        let sink = Arc::new(RecordingSink::default());
        let spinner = Spinner::new(Arc::clone(&sink) as Arc<dyn StatusSink>, Duration::from_millis(100));
        let mut scope = Scope::new();

        spinner.start(&mut scope);
        tokio::time::sleep(Duration::from_millis(350)).await;
        spinner.stop();
        scope.join().await.unwrap();

        let ticks = sink.ticks.lock().unwrap().clone();
        assert!(!ticks.is_empty());
        assert_eq!(ticks[0], 0);
        assert_eq!(sink.clears.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_wakes_the_loop_without_waiting_a_period() {
        let sink = Arc::new(RecordingSink::default());
        let spinner = Spinner::new(Arc::clone(&sink) as Arc<dyn StatusSink>, Duration::from_secs(3600));
        let mut scope = Scope::new();

        let started = tokio::time::Instant::now();
        spinner.start(&mut scope);
        tokio::time::sleep(Duration::from_millis(10)).await;
        spinner.stop();
        scope.join().await.unwrap();

        // A loop parked on its interval would only notice the stop a full
        // period later.
        assert!(started.elapsed() < Duration::from_secs(3600));
        assert_eq!(sink.clears.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_is_idempotent() {
        let sink = Arc::new(RecordingSink::default());
        let spinner = Spinner::new(Arc::clone(&sink) as Arc<dyn StatusSink>, Duration::from_millis(100));
        let mut scope = Scope::new();

        spinner.start(&mut scope);
        spinner.start(&mut scope);
        tokio::time::sleep(Duration::from_millis(250)).await;
        spinner.stop();
        scope.join().await.unwrap();

        // A doubled loop would repeat counter values.
        let ticks = sink.ticks.lock().unwrap().clone();
        let mut deduped = ticks.clone();
        deduped.dedup();
        assert_eq!(ticks, deduped);
        assert_eq!(sink.clears.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scope_teardown_clears_without_stop() {
        let sink = Arc::new(RecordingSink::default());
        let spinner = Spinner::new(Arc::clone(&sink) as Arc<dyn StatusSink>, Duration::from_millis(100));
        let mut scope = Scope::new();

        spinner.start(&mut scope);
        tokio::time::sleep(Duration::from_millis(150)).await;
        scope.cancel();
        scope.join().await.unwrap();

        assert_eq!(sink.clears.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_runs_once_even_on_fault() {
        let sink = Arc::new(RecordingSink::default());
        let spinner = Spinner::new(Arc::clone(&sink) as Arc<dyn StatusSink>, Duration::from_millis(100));
        let mut scope = Scope::new();

        spinner.start(&mut scope);
        scope.spawn(async {
            tokio::time::sleep(Duration::from_millis(120)).await;
            Err("worker fault".into())
        });

        assert!(scope.join().await.is_err());
        spinner.stop();
        assert_eq!(sink.clears.load(Ordering::SeqCst), 1);
    }
}
