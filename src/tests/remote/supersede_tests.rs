use std::time::Duration;

use super::*;

#[test]
fn begin_issues_increasing_generations() {
    let reg = InflightRegistry::new();
    let a = reg.begin("questions.page");
    let b = reg.begin("about");
    assert!(b.generation() > a.generation());
    assert_eq!(a.key(), "questions.page");
    assert_eq!(reg.live_keys(), 2);
}

#[tokio::test]
async fn newer_handle_cancels_older_one() {
    let reg = InflightRegistry::new();
    let mut first = reg.begin("questions.page");
    let second = reg.begin("questions.page");

    tokio::time::timeout(Duration::from_secs(1), first.cancelled())
        .await
        .expect("first handle should be cancelled");
    assert!(!reg.is_current(&first));
    assert!(reg.is_current(&second));
    assert!(!reg.finish(&first));
    assert!(reg.finish(&second));
    assert_eq!(reg.live_keys(), 0);
}

#[tokio::test(start_paused = true)]
async fn other_keys_are_untouched() {
    let reg = InflightRegistry::new();
    let mut about = reg.begin("about");
    let _page = reg.begin("questions.page");
    let _page2 = reg.begin("questions.page");

    let waited = tokio::time::timeout(Duration::from_secs(5), about.cancelled()).await;
    assert!(waited.is_err(), "unrelated key must not be cancelled");
    assert!(reg.is_current(&about));
}

#[tokio::test(start_paused = true)]
async fn finished_handle_never_reports_cancelled() {
    let reg = InflightRegistry::new();
    let mut handle = reg.begin("about");
    assert!(reg.finish(&handle));

    let waited = tokio::time::timeout(Duration::from_secs(5), handle.cancelled()).await;
    assert!(waited.is_err());
}

#[tokio::test]
async fn explicit_cancel() {
    let reg = InflightRegistry::new();
    let mut handle = reg.begin("about");
    assert!(reg.cancel("about"));
    assert!(!reg.cancel("about"));
    handle.cancelled().await;
    assert!(!reg.finish(&handle));
}
