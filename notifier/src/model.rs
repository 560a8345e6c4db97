use serde::Serialize;

/// A rendered alert, ready for any transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub subject: String,
    pub text: String,
    pub html: String,
}
