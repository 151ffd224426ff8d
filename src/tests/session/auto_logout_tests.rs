use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use time::OffsetDateTime;

use super::*;
use crate::session::Role;

fn session_expiring(now: OffsetDateTime, secs: i64, username: &str) -> Session {
    Session {
        username: username.to_string(),
        role: Some(Role::User),
        expires_at: now + time::Duration::seconds(secs),
    }
}

fn counting_scheduler(lead: Duration) -> (AutoLogoutScheduler, Arc<AtomicUsize>) {
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let scheduler = AutoLogoutScheduler::new(
        lead,
        Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );
    (scheduler, fired)
}

#[test]
fn delay_subtracts_lead_and_floors_at_zero() {
    let (scheduler, _) = counting_scheduler(DEFAULT_LEAD);
    let now = OffsetDateTime::now_utc();
    assert_eq!(
        scheduler.delay_for(&session_expiring(now, 60, "a"), now),
        Duration::from_secs(50)
    );
    assert_eq!(
        scheduler.delay_for(&session_expiring(now, 5, "a"), now),
        Duration::ZERO
    );
    assert_eq!(
        scheduler.delay_for(&session_expiring(now, -30, "a"), now),
        Duration::ZERO
    );
}

#[tokio::test(start_paused = true)]
async fn fires_once_after_delay() {
    let (scheduler, fired) = counting_scheduler(DEFAULT_LEAD);
    let now = OffsetDateTime::now_utc();
    let outcome = scheduler.arm_at(&session_expiring(now, 30, "a"), now);
    assert_eq!(
        outcome,
        ArmOutcome::Armed {
            delay: Duration::from_secs(20)
        }
    );

    tokio::time::sleep(Duration::from_secs(19)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert!(scheduler.is_armed());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(!scheduler.is_armed());
}

#[tokio::test(start_paused = true)]
async fn rearming_same_session_is_a_no_op() {
    let (scheduler, fired) = counting_scheduler(DEFAULT_LEAD);
    let now = OffsetDateTime::now_utc();
    let session = session_expiring(now, 30, "a");
    scheduler.arm_at(&session, now);
    assert_eq!(scheduler.arm_at(&session, now), ArmOutcome::AlreadyArmed);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn disarm_cancels_pending_trigger() {
    let (scheduler, fired) = counting_scheduler(DEFAULT_LEAD);
    let now = OffsetDateTime::now_utc();
    scheduler.arm_at(&session_expiring(now, 30, "a"), now);
    scheduler.disarm();
    assert!(!scheduler.is_armed());

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn new_session_replaces_previous_trigger() {
    let (scheduler, fired) = counting_scheduler(DEFAULT_LEAD);
    let now = OffsetDateTime::now_utc();
    scheduler.arm_at(&session_expiring(now, 20, "a"), now);
    let outcome = scheduler.arm_at(&session_expiring(now, 110, "b"), now);
    assert_eq!(
        outcome,
        ArmOutcome::Armed {
            delay: Duration::from_secs(100)
        }
    );

    tokio::time::sleep(Duration::from_secs(50)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    tokio::time::sleep(Duration::from_secs(51)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}
