use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// A ticking task bound to one question index.
///
/// The callback runs once per period, the first time one full period after
/// the countdown starts. The task ends when the callback breaks, when
/// [`Countdown::cancel`] is called, or when the `Countdown` is dropped.
pub struct Countdown {
    owner: usize,
    cancel_token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Countdown {
    pub fn start<F, Fut>(owner: usize, period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let cancel_token = CancellationToken::new();
        let token = cancel_token.clone();

        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        if token.is_cancelled() {
                            break;
                        }
                        if on_tick().await.is_break() {
                            break;
                        }
                    }
                }
            }
            tracing::trace!(owner, "countdown stopped");
        });

        Self {
            owner,
            cancel_token,
            handle,
        }
    }

    /// Question index this countdown belongs to.
    pub fn owner(&self) -> usize {
        self.owner
    }

    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// True once the ticking task has ended on its own or after a cancel.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn counting(limit: u32) -> (Arc<AtomicU32>, impl FnMut() -> std::future::Ready<ControlFlow<()>>) {
        let ticks = Arc::new(AtomicU32::new(0));
        let seen = ticks.clone();
        let on_tick = move || {
            let n = seen.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(if n >= limit {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            })
        };
        (ticks, on_tick)
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_one_period() {
        let (ticks, on_tick) = counting(u32::MAX);
        let countdown = Countdown::start(0, Duration::from_secs(1), on_tick);

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
        countdown.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_callback_breaks() {
        let (ticks, on_tick) = counting(3);
        let countdown = Countdown::start(4, Duration::from_secs(1), on_tick);
        assert_eq!(countdown.owner(), 4);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
        tokio::task::yield_now().await;
        assert!(countdown.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_and_drop_stop_ticking() {
        let (ticks, on_tick) = counting(u32::MAX);
        let countdown = Countdown::start(0, Duration::from_secs(1), on_tick);
        tokio::time::sleep(Duration::from_millis(2500)).await;
        countdown.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);

        let (ticks, on_tick) = counting(u32::MAX);
        drop(Countdown::start(1, Duration::from_secs(1), on_tick));
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }
}
