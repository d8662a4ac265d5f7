use std::sync::Arc;

use shared::domain::{RestaurantDraft, RestaurantRecord, UserId};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::{
    backend::{DataBackend, RestaurantQuery, DEFAULT_PAGE_SIZE},
    error::DataError,
    session::SessionSnapshot,
};

#[derive(Default)]
struct StoreState {
    /// Session generation the records were fetched under.
    generation: u64,
    records: Vec<RestaurantRecord>,
}

/// In-memory view of the signed-in owner's restaurants, newest first.
///
/// The store watches the session: records belonging to an older session
/// generation are never handed out, and late responses for such a
/// generation are dropped instead of applied.
pub struct EntityStore {
    backend: Arc<dyn DataBackend>,
    session: watch::Receiver<SessionSnapshot>,
    state: Mutex<StoreState>,
    page_size: u32,
}

impl EntityStore {
    pub fn new(backend: Arc<dyn DataBackend>, session: watch::Receiver<SessionSnapshot>) -> Self {
        Self {
            backend,
            session,
            state: Mutex::new(StoreState::default()),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub async fn records(&self) -> Vec<RestaurantRecord> {
        let generation = self.session.borrow().generation;
        let state = self.state.lock().await;
        if state.generation == generation {
            state.records.clone()
        } else {
            Vec::new()
        }
    }

    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.records.clear();
        state.generation = self.session.borrow().generation;
    }

    /// Replaces the whole collection with the owner's records from the backend.
    pub async fn load(&self, owner: UserId) -> Result<Vec<RestaurantRecord>, DataError> {
        let issued = self.issue_for(owner)?;
        let query = RestaurantQuery::owned_by(owner).with_limit(self.page_size);

        let fetched = self.backend.query_restaurants(&query).await.map_err(|err| {
            warn!(owner_id = owner.0, error = %format!("{err:#}"), "store: load failed");
            DataError::backend(&err)
        })?;
        let records = owned_newest_first(owner, fetched);

        let mut state = self.state.lock().await;
        if !self.is_current(issued) {
            debug!(owner_id = owner.0, "store: discarding load response for ended session");
            return Err(DataError::StaleResponse);
        }
        state.generation = issued;
        state.records = records.clone();
        info!(owner_id = owner.0, count = records.len(), "store: restaurants loaded");
        Ok(records)
    }

    /// Submits `draft` for `owner` and prepends the acknowledged record.
    pub async fn create(
        &self,
        owner: UserId,
        draft: &RestaurantDraft,
    ) -> Result<RestaurantRecord, DataError> {
        if !draft.has_name() {
            return Err(DataError::EmptyName);
        }
        let issued = self.issue_for(owner)?;

        let record = self
            .backend
            .create_restaurant(owner, draft)
            .await
            .map_err(|err| {
                warn!(owner_id = owner.0, error = %format!("{err:#}"), "store: create failed");
                DataError::backend(&err)
            })?;
        if record.owner_id != owner {
            warn!(
                owner_id = owner.0,
                record_owner_id = record.owner_id.0,
                "store: backend returned a restaurant for another owner"
            );
            return Err(DataError::OwnerMismatch);
        }

        let mut state = self.state.lock().await;
        if !self.is_current(issued) {
            debug!(owner_id = owner.0, "store: discarding create response for ended session");
            return Err(DataError::StaleResponse);
        }
        if state.generation != issued {
            state.generation = issued;
            state.records.clear();
        }
        state.records.insert(0, record.clone());
        info!(owner_id = owner.0, restaurant_id = record.id.0, "store: restaurant created");
        Ok(record)
    }

    fn issue_for(&self, owner: UserId) -> Result<u64, DataError> {
        let session = self.session.borrow();
        match &session.identity {
            Some(identity) if identity.id == owner => Ok(session.generation),
            Some(_) => Err(DataError::OwnerMismatch),
            None => Err(DataError::NoIdentity),
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.session.borrow().generation == generation
    }
}

fn owned_newest_first(owner: UserId, fetched: Vec<RestaurantRecord>) -> Vec<RestaurantRecord> {
    let total = fetched.len();
    let mut records: Vec<_> = fetched
        .into_iter()
        .filter(|record| record.owner_id == owner)
        .collect();
    if records.len() != total {
        warn!(
            owner_id = owner.0,
            dropped = total - records.len(),
            "store: ignoring restaurants owned by someone else"
        );
    }
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    records
}
