//! Explicit composition of the client core around one token store.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::broadcast;

use crate::admin::QuestionPager;
use crate::gate::{Decision, Route, RouteGuard};
use crate::model::{About, ClientConfig};
use crate::paginate::PaginatedAggregator;
use crate::recovery::RecoveryFlow;
use crate::remote::{ApiError, RequestClient};
use crate::session::{ArmOutcome, AutoLogoutScheduler, LogoutTrigger, SessionModel};
use crate::store::TokenStore;
use crate::workflow::AnswerConfigurationWorkflow;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { username: String },
    LoggedOut,
    /// The session was about to expire and was ended by the scheduler.
    ForcedLogout,
}

pub struct Portal {
    config: ClientConfig,
    session: SessionModel,
    client: RequestClient,
    guard: RouteGuard,
    scheduler: AutoLogoutScheduler,
    events: broadcast::Sender<SessionEvent>,
}

impl Portal {
    pub fn new(config: ClientConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        let session = SessionModel::new(store)
            .with_clock_skew(Duration::from_secs(config.clock_skew_secs));
        let client = RequestClient::new(&config.api_url, session.clone())?;
        let guard = RouteGuard::new(session.clone());
        let (events, _) = broadcast::channel(16);

        let trigger = forced_logout(client.clone(), events.clone());
        let scheduler = AutoLogoutScheduler::new(
            Duration::from_secs(config.auto_logout_lead_secs),
            trigger,
        );

        Ok(Self {
            config,
            session,
            client,
            guard,
            scheduler,
            events,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionModel {
        &self.session
    }

    pub fn client(&self) -> &RequestClient {
        &self.client
    }

    pub fn scheduler(&self) -> &AutoLogoutScheduler {
        &self.scheduler
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn check(&self, route: &Route) -> Decision {
        self.guard.check(route)
    }

    /// Aggregator sized from the client config.
    pub fn aggregator(&self) -> PaginatedAggregator {
        PaginatedAggregator::new(self.config.question_page_size)
            .with_max_in_flight(self.config.max_in_flight_pages)
    }

    pub async fn about(&self) -> Result<About, ApiError> {
        self.client.about().await
    }

    /// Arms auto-logout for a session persisted by an earlier run.
    pub fn resume(&self) -> Option<ArmOutcome> {
        let state = self.session.state();
        let session = state.session()?;
        Some(self.scheduler.arm(session))
    }

    /// Logs in and re-arms auto-logout for the new session. A failed login
    /// leaves the current session and its pending logout untouched.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        self.client.login(username, password).await?;
        self.scheduler.disarm();
        if let Some(session) = self.session.state().session() {
            self.scheduler.arm(session);
            let _ = self.events.send(SessionEvent::LoggedIn {
                username: session.username.clone(),
            });
        }
        Ok(())
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.scheduler.disarm();
        self.client.logout().await?;
        let _ = self.events.send(SessionEvent::LoggedOut);
        Ok(())
    }

    pub fn answer_workflow(&self, about: About) -> AnswerConfigurationWorkflow {
        AnswerConfigurationWorkflow::new(about, self.aggregator())
    }

    pub fn question_pager(&self) -> QuestionPager {
        QuestionPager::new(self.client.clone())
    }

    pub fn recovery(&self) -> RecoveryFlow {
        RecoveryFlow::new(self.client.clone(), self.aggregator())
    }
}

/// Logs out through the server, falls back to dropping the token locally,
/// and announces [`SessionEvent::ForcedLogout`].
fn forced_logout(client: RequestClient, events: broadcast::Sender<SessionEvent>) -> LogoutTrigger {
    Arc::new(move || {
        let client = client.clone();
        let events = events.clone();
        tokio::spawn(async move {
            tracing::info!("session about to expire; logging out");
            if let Err(err) = client.logout().await {
                tracing::warn!(error = %err, "logout call failed; clearing token locally");
                if let Err(err) = client.session().clear() {
                    tracing::warn!(error = %err, "failed to clear session token");
                }
            }
            let _ = events.send(SessionEvent::ForcedLogout);
        });
    })
}
