use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Shared {
    ready: AtomicBool,
    notify: Notify,
}

/// Read side of the process readiness flag.
///
/// Starts `false` and becomes `true` at most once, after every pending
/// bootstrap task has settled. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ReadinessGate {
    shared: Arc<Shared>,
}

/// Write side of the readiness flag. Consumed by [`mark_ready`](Self::mark_ready).
#[derive(Debug)]
pub struct ReadinessSetter {
    shared: Arc<Shared>,
}

impl ReadinessGate {
    pub fn channel() -> (ReadinessGate, ReadinessSetter) {
        let shared = Arc::new(Shared::default());
        (
            ReadinessGate {
                shared: Arc::clone(&shared),
            },
            ReadinessSetter { shared },
        )
    }

    pub fn is_ready(&self) -> bool {
        self.shared.ready.load(Ordering::Acquire)
    }

    /// Wait until the flag flips. Returns immediately if it already has.
    pub async fn wait_ready(&self) {
        loop {
            let notified = self.shared.notify.notified();
            if self.is_ready() {
                return;
            }
            notified.await;
        }
    }
}

impl ReadinessSetter {
    pub fn mark_ready(self) {
        let was_ready = self.shared.ready.swap(true, Ordering::Release);
        debug_assert!(!was_ready, "readiness flag written twice");
        self.shared.notify.notify_waiters();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn starts_not_ready() {
        let (gate, _setter) = ReadinessGate::channel();
        assert!(!gate.is_ready());
        let waited = tokio::time::timeout(Duration::from_millis(20), gate.wait_ready()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn waiters_wake_on_flip() {
        let (gate, setter) = ReadinessGate::channel();
        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.wait_ready().await })
        };

        tokio::task::yield_now().await;
        setter.mark_ready();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
        assert!(gate.is_ready());
        gate.wait_ready().await;
    }
}
