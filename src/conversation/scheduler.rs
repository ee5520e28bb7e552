//! Delayed reply delivery
//!
//! Each scheduled reply becomes due a fixed delay after it was scheduled.
//! A single dispatcher task waits for due replies in the order they were
//! scheduled, so replies fire first-scheduled-first-fired and delays never
//! stack up behind each other.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Duration, Instant};

use crate::conversation::reply::ReplyGenerator;

/// Callback receiving the generated reply text
pub type ReadyCallback = Box<dyn FnOnce(String) + Send + 'static>;

struct PendingReply {
    user_text: String,
    due: Instant,
    on_ready: ReadyCallback,
}

pub struct ReplyScheduler {
    delay: Duration,
    tx: Option<mpsc::UnboundedSender<PendingReply>>,
    pending: Arc<watch::Sender<usize>>,
    worker: Option<JoinHandle<()>>,
}

impl ReplyScheduler {
    /// Start the dispatcher on the current tokio runtime.
    pub fn spawn(generator: Arc<ReplyGenerator>, delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (pending, _) = watch::channel(0usize);
        let pending = Arc::new(pending);

        let worker = tokio::spawn(dispatch(rx, generator, pending.clone()));
        tracing::debug!("Reply scheduler started with {:?} delay", delay);

        Self {
            delay,
            tx: Some(tx),
            pending,
            worker: Some(worker),
        }
    }

    /// Deliver `produce(user_text)` to `on_ready` once the delay elapses.
    ///
    /// Does nothing after [`shutdown`](Self::shutdown).
    pub fn schedule_reply<F>(&self, user_text: impl Into<String>, on_ready: F)
    where
        F: FnOnce(String) + Send + 'static,
    {
        let Some(tx) = &self.tx else {
            tracing::debug!("Reply scheduler is shut down, dropping reply");
            return;
        };

        let reply = PendingReply {
            user_text: user_text.into(),
            due: Instant::now() + self.delay,
            on_ready: Box::new(on_ready),
        };

        self.pending.send_modify(|n| *n += 1);
        if tx.send(reply).is_err() {
            tracing::warn!("Reply dispatcher is gone, dropping reply");
            self.pending.send_modify(|n| *n = n.saturating_sub(1));
        }
    }

    /// Number of scheduled replies that have not fired yet
    pub fn pending(&self) -> usize {
        *self.pending.borrow()
    }

    /// Wait until every scheduled reply has fired (or been dropped)
    pub async fn idle(&self) {
        let mut rx = self.pending.subscribe();
        // The sender lives in self, so the channel cannot close here.
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_running(&self) -> bool {
        self.tx.is_some()
    }

    /// Stop the dispatcher. Replies that have not fired are discarded.
    pub fn shutdown(&mut self) {
        self.tx = None;
        if let Some(worker) = self.worker.take() {
            worker.abort();
            let dropped = self.pending();
            if dropped > 0 {
                tracing::debug!("Discarding {} pending replies", dropped);
            }
            self.pending.send_replace(0);
        }
    }
}

impl Drop for ReplyScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn dispatch(
    mut rx: mpsc::UnboundedReceiver<PendingReply>,
    generator: Arc<ReplyGenerator>,
    pending: Arc<watch::Sender<usize>>,
) {
    while let Some(reply) = rx.recv().await {
        sleep_until(reply.due).await;
        let text = generator.produce(&reply.user_text);
        (reply.on_ready)(text);
        pending.send_modify(|n| *n = n.saturating_sub(1));
    }
    tracing::debug!("Reply dispatcher stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::reply::FALLBACK_REPLY;
    use std::sync::Mutex;

    fn echo_generator() -> Arc<ReplyGenerator> {
        Arc::new(ReplyGenerator::new(vec!["pong".to_string()], FALLBACK_REPLY))
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_fires_after_delay() {
        let scheduler = ReplyScheduler::spawn(echo_generator(), Duration::from_secs(1));
        let fired: Arc<Mutex<Vec<(String, Instant)>>> = Arc::default();
        let start = Instant::now();

        let sink = fired.clone();
        scheduler.schedule_reply("ping", move |text| {
            sink.lock().unwrap().push((text, Instant::now()));
        });
        assert_eq!(scheduler.pending(), 1);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(fired.lock().unwrap().is_empty());

        scheduler.idle().await;
        let fired = fired.lock().unwrap();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].0, "pong");
        assert!(fired[0].1 - start >= Duration::from_secs(1));
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replies_fire_in_schedule_order() {
        let scheduler = ReplyScheduler::spawn(echo_generator(), Duration::from_secs(1));
        let order: Arc<Mutex<Vec<&'static str>>> = Arc::default();

        for label in ["A", "B", "C"] {
            let sink = order.clone();
            scheduler.schedule_reply(label, move |_| sink.lock().unwrap().push(label));
        }

        scheduler.idle().await;
        assert_eq!(*order.lock().unwrap(), vec!["A", "B", "C"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delays_do_not_accumulate() {
        let scheduler = ReplyScheduler::spawn(echo_generator(), Duration::from_secs(1));
        let times: Arc<Mutex<Vec<Instant>>> = Arc::default();
        let start = Instant::now();

        for _ in 0..3 {
            let sink = times.clone();
            scheduler.schedule_reply("x", move |_| sink.lock().unwrap().push(Instant::now()));
        }

        scheduler.idle().await;
        for fired_at in times.lock().unwrap().iter() {
            assert!(*fired_at - start < Duration::from_millis(1100));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_discards_pending() {
        let mut scheduler = ReplyScheduler::spawn(echo_generator(), Duration::from_secs(1));
        let fired: Arc<Mutex<usize>> = Arc::default();

        let sink = fired.clone();
        scheduler.schedule_reply("ping", move |_| *sink.lock().unwrap() += 1);
        scheduler.shutdown();
        assert_eq!(scheduler.pending(), 0);
        assert!(!scheduler.is_running());

        let sink = fired.clone();
        scheduler.schedule_reply("late", move |_| *sink.lock().unwrap() += 1);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(*fired.lock().unwrap(), 0);
        scheduler.idle().await;
    }
}
