use std::sync::Arc;

use shared::domain::Identity;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{backend::DataBackend, error::AuthError};

/// Current identity plus a counter bumped on every identity transition.
/// Async results carry the generation they were issued under so that a
/// response for a previous session can be recognised and dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub generation: u64,
    pub identity: Option<Identity>,
}

pub struct SessionManager {
    backend: Arc<dyn DataBackend>,
    state: watch::Sender<SessionSnapshot>,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn DataBackend>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self { backend, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().identity.is_some()
    }

    /// Asks the backend who owns the current credential. Any failure means
    /// "no session" and is not reported to the owner. A login or logout that
    /// lands while the lookup is in flight wins over its result.
    pub async fn resolve_existing(&self) -> Option<Identity> {
        let issued_under = self.snapshot().generation;
        match self.backend.current_identity().await {
            Ok(identity) => {
                if !self.replace_identity_if_current(issued_under, Some(identity.clone())) {
                    info!("session: resolution superseded");
                    return self.identity();
                }
                info!(user_id = identity.id.0, "session: existing session resolved");
                Some(identity)
            }
            Err(err) => {
                info!(reason = %format!("{err:#}"), "session: no active session");
                if self.is_authenticated()
                    && !self.replace_identity_if_current(issued_under, None)
                {
                    return self.identity();
                }
                None
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        if self.is_authenticated() {
            return Err(AuthError::AlreadyAuthenticated);
        }

        if let Err(err) = self.backend.login(email, password).await {
            let auth_err = AuthError::from_login_failure(&err);
            warn!(error = %auth_err, "session: login failed");
            return Err(auth_err);
        }

        let identity = match self.backend.current_identity().await {
            Ok(identity) => identity,
            Err(err) => {
                // Drop the half-established credential so state stays "no session".
                let _ = self.backend.logout().await;
                let auth_err = AuthError::IdentityLookup(format!("{err:#}"));
                warn!(error = %auth_err, "session: login failed");
                return Err(auth_err);
            }
        };

        info!(user_id = identity.id.0, "session: logged in");
        self.replace_identity(Some(identity.clone()));
        Ok(identity)
    }

    /// Clears the local identity first, then asks the backend to drop the
    /// credential. Backend failures are logged and swallowed.
    pub async fn logout(&self) {
        let previous = self.snapshot().identity;
        self.replace_identity(None);

        if let Err(err) = self.backend.logout().await {
            warn!(error = %format!("{err:#}"), "session: backend logout failed; signed out locally");
        }

        if let Some(identity) = previous {
            info!(user_id = identity.id.0, "session: logged out");
        }
    }

    fn replace_identity_if_current(&self, generation: u64, identity: Option<Identity>) -> bool {
        self.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            state.generation += 1;
            state.identity = identity;
            true
        })
    }

    fn replace_identity(&self, identity: Option<Identity>) {
        self.state.send_modify(|state| {
            state.generation += 1;
            state.identity = identity;
        });
    }
}
