use std::time::Duration;

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::error::NotifyError;
use crate::{LogNotifier, Notifier, WebhookNotifier};

fn notifier(server: &MockServer) -> WebhookNotifier {
    WebhookNotifier::new(format!("{}/dispatch", server.uri()), Duration::from_secs(5))
        .unwrap()
        .with_backoff_base(Duration::from_millis(1))
}

#[tokio::test]
async fn webhook_posts_dispatch_signal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/dispatch"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(serde_json::json!({"event": "dispatch_notifications"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    notifier(&server).send_notifications().await.unwrap();
}

#[tokio::test]
async fn webhook_retries_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/dispatch"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/dispatch"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    notifier(&server).send_notifications().await.unwrap();
}

#[tokio::test]
async fn webhook_gives_up_after_three_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/dispatch"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(3)
        .mount(&server)
        .await;

    let err = notifier(&server).send_notifications().await.unwrap_err();
    match err {
        NotifyError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn log_notifier_always_succeeds() {
    let notifier = LogNotifier;
    notifier.send_notifications().await.unwrap();
    assert_eq!(notifier.notifier_name(), "log");
}
