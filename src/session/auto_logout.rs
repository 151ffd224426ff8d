use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use time::OffsetDateTime;
use tokio::task::JoinHandle;

use super::Session;

/// Lead time between the forced logout and the token's real expiry.
pub const DEFAULT_LEAD: Duration = Duration::from_secs(10);

pub type LogoutTrigger = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArmOutcome {
    Armed { delay: Duration },
    AlreadyArmed,
}

struct Armed {
    username: String,
    expires_at: OffsetDateTime,
    task: JoinHandle<()>,
}

/// Holds at most one pending logout trigger.
///
/// Must be used from within a tokio runtime.
pub struct AutoLogoutScheduler {
    lead: Duration,
    trigger: LogoutTrigger,
    armed: Mutex<Option<Armed>>,
}

impl AutoLogoutScheduler {
    pub fn new(lead: Duration, trigger: LogoutTrigger) -> Self {
        Self {
            lead,
            trigger,
            armed: Mutex::new(None),
        }
    }

    pub fn lead(&self) -> Duration {
        self.lead
    }

    /// `max(0, expires_in - lead)`.
    pub fn delay_for(&self, session: &Session, now: OffsetDateTime) -> Duration {
        session.expires_in(now).saturating_sub(self.lead)
    }

    pub fn arm(&self, session: &Session) -> ArmOutcome {
        self.arm_at(session, OffsetDateTime::now_utc())
    }

    /// Schedules the trigger for `session`. Arming again for the same session
    /// is a no-op; arming for a different one replaces the pending trigger.
    pub fn arm_at(&self, session: &Session, now: OffsetDateTime) -> ArmOutcome {
        let mut armed = self.lock();

        if let Some(current) = armed.as_ref() {
            if current.username == session.username && current.expires_at == session.expires_at {
                return ArmOutcome::AlreadyArmed;
            }
            tracing::debug!("session changed while armed; replacing auto-logout");
            current.task.abort();
        }

        let delay = self.delay_for(session, now);
        let trigger = Arc::clone(&self.trigger);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::info!("session about to expire; forcing logout");
            trigger();
        });
        tracing::debug!(delay_secs = delay.as_secs(), "auto-logout armed");

        *armed = Some(Armed {
            username: session.username.clone(),
            expires_at: session.expires_at,
            task,
        });
        ArmOutcome::Armed { delay }
    }

    pub fn disarm(&self) {
        let mut armed = self.lock();
        if let Some(current) = armed.take() {
            current.task.abort();
            tracing::debug!("auto-logout disarmed");
        }
    }

    /// True while a trigger is scheduled and has not fired yet.
    pub fn is_armed(&self) -> bool {
        self.lock().as_ref().is_some_and(|a| !a.task.is_finished())
    }

    fn lock(&self) -> MutexGuard<'_, Option<Armed>> {
        self.armed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for AutoLogoutScheduler {
    fn drop(&mut self) {
        self.disarm();
    }
}

#[cfg(test)]
#[path = "../tests/session/auto_logout_tests.rs"]
mod tests;
