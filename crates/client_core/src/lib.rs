use std::{fmt, sync::Arc, time::Duration};

use shared::domain::{Identity, RestaurantDraft, RestaurantRecord};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info};

pub mod backend;
pub mod error;
pub mod http_backend;
pub mod probe;
pub mod router;
pub mod session;
pub mod store;

pub use backend::{DataBackend, RestaurantQuery};
pub use error::{AuthError, ConnectivityError, DataError, NoticeKind, UserNotice};
pub use http_backend::HttpBackend;
pub use probe::{ConnectivityProbe, ConnectivityStatus};
pub use router::{ScreenState, ViewRouter};
pub use session::{SessionManager, SessionSnapshot};
pub use store::EntityStore;

pub const DEMO_EMAIL: &str = "admin@manifest.build";
pub const DEMO_PASSWORD: &str = "admin";

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub probe_timeout: Duration,
    pub page_size: u32,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            probe_timeout: probe::DEFAULT_PROBE_TIMEOUT,
            page_size: backend::DEFAULT_PAGE_SIZE,
        }
    }
}

/// Immutable view handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSnapshot {
    pub screen: ScreenState,
    pub connectivity: Option<ConnectivityStatus>,
    pub identity: Option<Identity>,
    pub restaurants: Vec<RestaurantRecord>,
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    ScreenChanged(ScreenState),
    ConnectivityResolved(ConnectivityStatus),
    RestaurantsChanged(Vec<RestaurantRecord>),
    Notice(UserNotice),
}

/// User intents forwarded by the presentation layer.
pub enum Intent {
    SubmitLogin { email: String, password: String },
    DemoLogin,
    RequestLogout,
    RequestLoad,
    SubmitCreate(RestaurantDraft),
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::SubmitLogin { .. } => "submit_login",
            Intent::DemoLogin => "demo_login",
            Intent::RequestLogout => "request_logout",
            Intent::RequestLoad => "request_load",
            Intent::SubmitCreate(_) => "submit_create",
        }
    }
}

impl fmt::Debug for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::SubmitLogin { email, .. } => f
                .debug_struct("SubmitLogin")
                .field("email", email)
                .field("password", &"<redacted>")
                .finish(),
            Intent::SubmitCreate(draft) => f.debug_tuple("SubmitCreate").field(draft).finish(),
            other => f.write_str(other.name()),
        }
    }
}

pub struct AppController {
    probe: ConnectivityProbe,
    session: SessionManager,
    store: EntityStore,
    router: Mutex<ViewRouter>,
    events: broadcast::Sender<ControllerEvent>,
}

impl AppController {
    pub fn new(backend: Arc<dyn DataBackend>) -> Arc<Self> {
        Self::with_options(backend, ControllerOptions::default())
    }

    pub fn with_options(backend: Arc<dyn DataBackend>, options: ControllerOptions) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        let session = SessionManager::new(Arc::clone(&backend));
        let store = EntityStore::new(Arc::clone(&backend), session.subscribe())
            .with_page_size(options.page_size);
        Arc::new(Self {
            probe: ConnectivityProbe::new(backend, options.probe_timeout),
            session,
            store,
            router: Mutex::new(ViewRouter::default()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    /// Runs the probe and session resolution side by side and resolves the
    /// screen once both have finished. Later calls do not probe again.
    pub async fn start(&self) -> ScreenState {
        if !self.router.lock().await.begin_startup() {
            return self.screen().await;
        }
        info!("controller: startup");

        let probe = async {
            let status = self.probe.check().await;
            self.router.lock().await.record_connectivity(status.clone());
            let _ = self.events.send(ControllerEvent::ConnectivityResolved(status));
        };
        let session = async {
            self.session.resolve_existing().await;
            self.router.lock().await.record_session_resolved();
        };
        tokio::join!(probe, session);

        let screen = self.screen().await;
        info!(screen = screen.name(), "controller: startup complete");
        let _ = self.events.send(ControllerEvent::ScreenChanged(screen));
        screen
    }

    pub async fn screen(&self) -> ScreenState {
        self.router
            .lock()
            .await
            .screen(self.session.is_authenticated())
    }

    pub async fn connectivity(&self) -> Option<ConnectivityStatus> {
        self.router.lock().await.connectivity().cloned()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.session.identity()
    }

    pub async fn restaurants(&self) -> Vec<RestaurantRecord> {
        self.store.records().await
    }

    pub async fn snapshot(&self) -> ControllerSnapshot {
        let (screen, connectivity) = {
            let router = self.router.lock().await;
            (
                router.screen(self.session.is_authenticated()),
                router.connectivity().cloned(),
            )
        };
        ControllerSnapshot {
            screen,
            connectivity,
            identity: self.session.identity(),
            restaurants: self.store.records().await,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        match self.session.login(email, password).await {
            Ok(identity) => {
                self.emit_screen().await;
                Ok(identity)
            }
            Err(err) => {
                let _ = self
                    .events
                    .send(ControllerEvent::Notice(UserNotice::login_failed(&err)));
                Err(err)
            }
        }
    }

    pub async fn demo_login(&self) -> Result<Identity, AuthError> {
        self.login(DEMO_EMAIL, DEMO_PASSWORD).await
    }

    /// Always ends signed out locally, whatever the backend answers.
    pub async fn logout(&self) {
        self.session.logout().await;
        self.store.clear().await;
        let _ = self
            .events
            .send(ControllerEvent::RestaurantsChanged(Vec::new()));
        self.emit_screen().await;
    }

    pub async fn load_restaurants(&self) -> Result<Vec<RestaurantRecord>, DataError> {
        let result = match self.session.identity() {
            Some(owner) => self.store.load(owner.id).await,
            None => Err(DataError::NoIdentity),
        };
        match &result {
            Ok(records) => {
                let _ = self
                    .events
                    .send(ControllerEvent::RestaurantsChanged(records.clone()));
            }
            Err(err) => self.report_data_failure(err, UserNotice::load_failed),
        }
        result
    }

    pub async fn create_restaurant(
        &self,
        draft: &RestaurantDraft,
    ) -> Result<RestaurantRecord, DataError> {
        let result = match self.session.identity() {
            Some(owner) => self.store.create(owner.id, draft).await,
            None => Err(DataError::NoIdentity),
        };
        match &result {
            Ok(_) => {
                let records = self.store.records().await;
                let _ = self.events.send(ControllerEvent::RestaurantsChanged(records));
            }
            Err(err) => self.report_data_failure(err, UserNotice::create_failed),
        }
        result
    }

    /// Fire-and-forget entry point for the presentation layer; failures
    /// surface as `ControllerEvent::Notice`.
    pub async fn handle(&self, intent: Intent) {
        debug!(intent = intent.name(), "controller: intent received");
        match intent {
            Intent::SubmitLogin { email, password } => {
                let _ = self.login(&email, &password).await;
            }
            Intent::DemoLogin => {
                let _ = self.demo_login().await;
            }
            Intent::RequestLogout => self.logout().await,
            Intent::RequestLoad => {
                let _ = self.load_restaurants().await;
            }
            Intent::SubmitCreate(draft) => {
                let _ = self.create_restaurant(&draft).await;
            }
        }
    }

    async fn emit_screen(&self) {
        let screen = self.screen().await;
        let _ = self.events.send(ControllerEvent::ScreenChanged(screen));
    }

    fn report_data_failure(&self, err: &DataError, notice: fn(&DataError) -> UserNotice) {
        match err {
            DataError::StaleResponse => {}
            DataError::NoIdentity => {
                error!("controller: data operation requested without a signed-in owner");
            }
            _ => {
                let _ = self.events.send(ControllerEvent::Notice(notice(err)));
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
