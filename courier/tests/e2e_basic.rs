//! End-to-end dispatch runs driven by configuration files

#![allow(clippy::unwrap_used)]

use std::io::Write;

use courier::controller::Courier;
use courier_common::{DispatchOutcome, DispatchStatus, Message};
use pretty_assertions::assert_eq;

fn config_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".config.ron")
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[tokio::test(start_paused = true)]
async fn default_run_falls_back_to_second_provider() {
    let report = Courier::default().run().await.unwrap();

    assert!(report.all_delivered());
    assert_eq!(report.delivered, 1);

    let providers: Vec<_> = report
        .statuses
        .iter()
        .map(|s| (s.provider.as_str(), s.success))
        .collect();
    assert_eq!(
        providers,
        [
            ("MockEmailProvider1", false),
            ("MockEmailProvider1", false),
            ("MockEmailProvider1", false),
            ("MockEmailProvider2", true),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn run_from_config_file() {
    let file = config_file(
        r#"(
            dispatch: (retry_limit: 2),
            providers: [
                (name: "Flaky", behaviour: FailTimes(1)),
                (name: "Backup"),
            ],
            messages: [
                (recipient: "a@example.com", subject: "One", body: "First"),
                (recipient: "b@example.com", subject: "Two", body: "Second"),
                (recipient: "a@example.com", subject: "One", body: "First"),
            ],
        )"#,
    );

    let report = Courier::load(file.path()).unwrap().run().await.unwrap();

    assert_eq!(report.delivered, 3);
    let outcomes: Vec<_> = report.statuses.iter().map(DispatchStatus::outcome).collect();
    assert_eq!(
        outcomes,
        [
            DispatchOutcome::AttemptFailed,
            DispatchOutcome::Delivered,
            DispatchOutcome::Delivered,
            DispatchOutcome::AlreadySent,
        ]
    );
    assert!(report.statuses.iter().all(|s| s.attempts == 2));
}

#[tokio::test(start_paused = true)]
async fn undeliverable_messages_are_counted() {
    let file = config_file(
        r#"(
            providers: [
                (name: "Down", behaviour: AlwaysError("connection refused")),
            ],
        )"#,
    );

    let report = Courier::load(file.path()).unwrap().run().await.unwrap();

    assert!(!report.all_delivered());
    assert_eq!(report.failed, 1);

    let last = report.statuses.last().unwrap();
    assert_eq!(last.outcome(), DispatchOutcome::AllFailed);
    assert_eq!(
        last.error.as_deref(),
        Some("Internal provider error: connection refused")
    );
}

#[tokio::test(start_paused = true)]
async fn rate_limit_applies_across_configured_messages() {
    let messages = (0..6)
        .map(|i| Message::new("busy@example.com", "Subject", format!("Body {i}")))
        .collect();
    let courier: Courier = ron::from_str(r#"(providers: [(name: "Direct")])"#).unwrap();

    let report = courier.with_messages(messages).run().await.unwrap();

    assert_eq!(report.delivered, 5);
    assert_eq!(report.failed, 1);
    assert_eq!(
        report.statuses.last().map(DispatchStatus::outcome),
        Some(DispatchOutcome::RateLimited)
    );
}

#[tokio::test(start_paused = true)]
async fn report_renders_as_ron() {
    let report = Courier::default()
        .with_messages(vec![Message::new("r@example.com", "S", "B")])
        .run()
        .await
        .unwrap();

    let rendered = report.to_ron().unwrap();
    assert!(rendered.contains("provider: \"MockEmailProvider2\""));
    assert!(rendered.contains("idempotency_key: \"r@example.com-S-B\""));
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let error = Courier::load(&dir.path().join("absent.ron")).unwrap_err();
    assert!(error.to_string().starts_with("Failed to read config from"));
}

#[test]
fn malformed_config_file_is_an_error() {
    let file = config_file("(providers: [(behaviour: AlwaysFail)])");
    let error = Courier::load(file.path()).unwrap_err();
    assert!(error.to_string().starts_with("Invalid config in"));
}

#[test]
fn shipped_config_parses() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("courier.config.ron");
    let courier = Courier::load(&path).unwrap();
    assert_eq!(courier.messages().len(), 1);
    assert!(courier.engine().is_ok());
}
