use anyhow::Result;
use async_trait::async_trait;
use shared::domain::{Identity, RestaurantDraft, RestaurantRecord, UserId};

pub const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantQuery {
    pub owner: UserId,
    pub include_owner: bool,
    pub newest_first: bool,
    /// Records per backend request; implementations page until the owner's
    /// collection is exhausted.
    pub limit: u32,
}

impl RestaurantQuery {
    pub fn owned_by(owner: UserId) -> Self {
        Self {
            owner,
            include_owner: true,
            newest_first: true,
            limit: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.max(1);
        self
    }
}

/// Remote data client consumed by the controller. The session credential is
/// held by the implementation; callers only ever see `Identity`.
#[async_trait]
pub trait DataBackend: Send + Sync {
    async fn health_check(&self) -> Result<()>;
    async fn login(&self, email: &str, password: &str) -> Result<()>;
    async fn logout(&self) -> Result<()>;
    async fn current_identity(&self) -> Result<Identity>;
    async fn query_restaurants(&self, query: &RestaurantQuery) -> Result<Vec<RestaurantRecord>>;
    async fn create_restaurant(
        &self,
        owner: UserId,
        draft: &RestaurantDraft,
    ) -> Result<RestaurantRecord>;
}
