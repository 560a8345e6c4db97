mod logging;
mod webhook;

pub use logging::LogNotifier;
pub use webhook::WebhookNotifier;

use async_trait::async_trait;
use tracing::warn;

use crate::errors::NotifyError;
use crate::model::Notification;

/// Delivery seam for spike alerts.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Best-effort delivery: failures are logged and swallowed.
///
/// Returns whether the sink accepted the notification.
pub async fn deliver<N: Notifier + ?Sized>(notifier: &N, notification: &Notification) -> bool {
    match notifier.notify(notification).await {
        Ok(()) => true,
        Err(e) => {
            warn!(subject = %notification.subject, error = %e, "notification delivery failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    struct Failing;

    #[async_trait]
    impl Notifier for Failing {
        async fn notify(&self, _: &Notification) -> Result<(), NotifyError> {
            Err(NotifyError::Rejected(503))
        }
    }

    fn sample() -> Notification {
        Notification {
            subject: "🚀 Volume Spike: ETHUSDTM (4.10x)".into(),
            text: "Coin: ETHUSDTM".into(),
            html: String::new(),
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_delivery_is_logged() {
        assert!(!deliver(&Failing, &sample()).await);
        assert!(logs_contain("notification delivery failed"));
        assert!(logs_contain("status 503"));
    }

    #[tokio::test]
    #[traced_test]
    async fn log_sink_writes_subject() {
        assert!(deliver(&LogNotifier, &sample()).await);
        assert!(logs_contain("ETHUSDTM (4.10x)"));
    }
}
