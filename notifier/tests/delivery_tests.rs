
use std::time::Duration;

use notifier::{LogNotifier, Notification, NotifyError, Notifier, WebhookNotifier, deliver};
use mock_notifier::MockNotifier;

fn sample() -> Notification {
    Notification {
        subject: "🚀 Volume Spike: XBTUSDTM (2.25x)".into(),
        text: "Coin: XBTUSDTM".into(),
        html: "<h2>🚀 Volume Spike Detected</h2>".into(),
    }
}

#[tokio::test]
async fn deliver_reports_success() {
    let sink = MockNotifier::default();

    assert!(deliver(&sink, &sample()).await);
    assert_eq!(sink.sent(), vec![sample()]);
}

#[tokio::test]
async fn deliver_swallows_sink_failures() {
    let sink = MockNotifier::rejecting();

    assert!(!deliver(&sink, &sample()).await);
    assert!(sink.sent().is_empty());
}

#[tokio::test]
async fn log_notifier_always_accepts() {
    assert!(LogNotifier.notify(&sample()).await.is_ok());
}

#[tokio::test]
async fn webhook_connection_failure_is_an_http_error() {
    // Nothing listens on port 1.
    let sink = WebhookNotifier::new("http://127.0.0.1:1/hook", Duration::from_secs(2)).unwrap();

    let err = sink.notify(&sample()).await.unwrap_err();
    assert!(matches!(err, NotifyError::Http(_)));

    assert!(!deliver(&sink, &sample()).await);
}

#[test]
fn webhook_payload_is_flat_json() {
    let json = serde_json::to_value(sample()).unwrap();

    assert_eq!(json["subject"], "🚀 Volume Spike: XBTUSDTM (2.25x)");
    assert_eq!(json["text"], "Coin: XBTUSDTM");
    assert_eq!(json["html"], "<h2>🚀 Volume Spike Detected</h2>");
    assert_eq!(json.as_object().unwrap().len(), 3);
}
