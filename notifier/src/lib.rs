pub mod errors;
pub mod model;
pub mod render;
pub mod sink;

pub use errors::NotifyError;
pub use model::Notification;
pub use render::render_spike;
pub use sink::{LogNotifier, Notifier, WebhookNotifier, deliver};
