use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::sync::Notify;
use tracing::{error, info};

/// Shared shutdown signal for the server task.
#[derive(Clone, Debug, Default)]
pub struct StopFlag {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Resolves once `stop` has been called, including before this call.
    pub async fn wait(&self) {
        let notified = self.notify.notified();
        if self.is_stopped() {
            return;
        }
        notified.await;
    }
}

pub fn register_signal_handler(stop_flag: &StopFlag) {
    let on_ctrl_c = stop_flag.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            return;
        }
        info!("Ctrl-C received, initiating graceful shutdown...");
        on_ctrl_c.stop();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let on_terminate = stop_flag.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut terminate) => {
                    terminate.recv().await;
                    info!("Terminate signal received, initiating graceful shutdown...");
                    on_terminate.stop();
                }
                Err(e) => error!("Failed to install SIGTERM handler: {}", e),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_returns_after_stop() {
        let flag = StopFlag::new();
        let waiter = {
            let flag = flag.clone();
            tokio::spawn(async move { flag.wait().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        flag.stop();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_after_stop_does_not_block() {
        let flag = StopFlag::new();
        flag.stop();
        tokio::time::timeout(Duration::from_secs(1), flag.wait())
            .await
            .unwrap();
        assert!(flag.is_stopped());
    }
}
