#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use notifier::{Notification, Notifier, NotifyError};

#[derive(Default)]
pub struct MockNotifier {
    pub sent: Mutex<Vec<Notification>>,
    pub reject: bool,
}

impl MockNotifier {
    pub fn subjects(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.subject.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.reject {
            return Err(NotifyError::Rejected(502));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}
