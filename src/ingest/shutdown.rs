// src/ingest/shutdown.rs
use std::sync::Arc;
use tokio::sync::watch;

/// Cloneable cancellation token. Every clone observes the same trigger.
#[derive(Clone, Debug)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once `trigger` has been called (immediately if it already was).
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        // The sender lives as long as any clone of `self`, so `wait_for` only
        // errors if that invariant is broken; treat that as "never cancelled".
        let closed = rx.wait_for(|v| *v).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn clones_observe_trigger() {
        let s = Shutdown::new();
        let c = s.clone();
        assert!(!c.is_triggered());
        let waiter = tokio::spawn(async move { c.cancelled().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        s.trigger();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter woke")
            .unwrap();
        assert!(s.is_triggered());
    }

    #[tokio::test]
    async fn already_triggered_resolves_immediately() {
        let s = Shutdown::new();
        s.trigger();
        tokio::time::timeout(Duration::from_millis(100), s.cancelled())
            .await
            .expect("resolves");
    }
}
