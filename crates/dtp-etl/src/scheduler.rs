//! Recurring pipeline execution
//!
//! One job runs immediately at startup, then on a fixed interval, forever,
//! on a single task. The loop awaits each run to completion before waiting
//! for the next tick, so runs never overlap and need no locking. Missed
//! ticks are delayed rather than caught up. There is no shutdown protocol:
//! process termination abandons an in-flight run.

use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::info;

pub struct Scheduler {
    interval: Duration,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_minutes(minutes: u64) -> Self {
        Self::new(Duration::from_secs(minutes * 60))
    }

    /// Run `job` once immediately, then at the fixed interval, forever.
    pub async fn run<F, Fut>(self, mut job: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        info!(interval_secs = self.interval.as_secs(), "Scheduler started");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            // The first tick completes immediately, giving the run-on-start
            // behavior; later iterations block until the next interval.
            ticker.tick().await;
            job().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_runs_immediately_then_every_interval() {
        let count = Arc::new(AtomicUsize::new(0));
        let job_count = count.clone();

        let scheduler = Scheduler::from_minutes(1);
        tokio::spawn(async move {
            scheduler
                .run(move || {
                    let count = job_count.clone();
                    async move {
                        count.fetch_add(1, Ordering::SeqCst);
                    }
                })
                .await;
        });

        // Let the immediate first run happen.
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // Three simulated minutes, one additional run per minute: 4 total.
        for expected in 2..=4 {
            tokio::time::sleep(Duration::from_secs(60)).await;
            assert_eq!(count.load(Ordering::SeqCst), expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_never_overlap() {
        let running = Arc::new(AtomicUsize::new(0));
        let max_concurrent = Arc::new(AtomicUsize::new(0));
        let completed = Arc::new(AtomicUsize::new(0));

        let job_running = running.clone();
        let job_max = max_concurrent.clone();
        let job_completed = completed.clone();

        // Each run takes longer than the interval.
        let scheduler = Scheduler::new(Duration::from_secs(10));
        tokio::spawn(async move {
            scheduler
                .run(move || {
                    let running = job_running.clone();
                    let max = job_max.clone();
                    let completed = job_completed.clone();
                    async move {
                        let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                        max.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_secs(25)).await;
                        running.fetch_sub(1, Ordering::SeqCst);
                        completed.fetch_add(1, Ordering::SeqCst);
                    }
                })
                .await;
        });

        tokio::time::sleep(Duration::from_secs(120)).await;

        assert_eq!(max_concurrent.load(Ordering::SeqCst), 1);
        assert!(completed.load(Ordering::SeqCst) >= 2);
    }
}
