use async_trait::async_trait;
use tracing::info;

use super::Notifier;
use crate::errors::NotifyError;
use crate::model::Notification;

/// Writes alerts to the log. Used when no webhook is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        info!(subject = %notification.subject, "{}", notification.text);
        Ok(())
    }
}
