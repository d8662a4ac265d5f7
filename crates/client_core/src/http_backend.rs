//! `DataBackend` over the Manifest-style REST API (`/api/auth/...`, `/api/dynamic/...`).

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use shared::{
    domain::{Identity, RestaurantDraft, RestaurantRecord, UserId},
    error::ApiError,
    protocol::{
        CreateRestaurantRequest, LoginRequest, LoginResponse, MeResponse, Paginated,
        RestaurantPayload,
    },
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use crate::backend::{DataBackend, RestaurantQuery};

const USER_ENTITY: &str = "users";
const RESTAURANT_COLLECTION: &str = "restaurants";
const MAX_PAGES: u32 = 1_000;

pub struct HttpBackend {
    http: Client,
    api_base: Url,
    token: RwLock<Option<String>>,
}

impl HttpBackend {
    pub fn new(backend_url: &str, app_id: &str, request_timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(request_timeout)
            .user_agent(format!("{app_id}/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            api_base: api_base_url(backend_url)?,
            token: RwLock::new(None),
        })
    }

    pub async fn has_credential(&self) -> bool {
        self.token.read().await.is_some()
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_base
            .join(path)
            .with_context(|| format!("invalid endpoint path: {path}"))
    }

    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token.read().await.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Normalizes the configured URL to `<base>/api/` so relative joins keep any
/// path prefix the backend is mounted under.
pub fn api_base_url(backend_url: &str) -> Result<Url> {
    let trimmed = backend_url.trim();
    let mut base =
        Url::parse(trimmed).with_context(|| format!("invalid backend url: {trimmed}"))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(anyhow!("backend url must start with http:// or https://"));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("api/")
        .with_context(|| format!("failed to derive api url from {trimmed}"))
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::from_body(status.as_u16(), &body).into())
}

#[async_trait]
impl DataBackend for HttpBackend {
    async fn health_check(&self) -> Result<()> {
        let response = self.http.get(self.endpoint("health")?).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> Result<()> {
        let url = self.endpoint(&format!("auth/{USER_ENTITY}/login"))?;
        let response = self
            .http
            .post(url)
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        let body: LoginResponse = ensure_success(response).await?.json().await?;
        if body.token.is_empty() {
            return Err(anyhow!("backend returned an empty session token"));
        }
        *self.token.write().await = Some(body.token);
        info!("http: session credential acquired");
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        // The backend keeps no server-side session; dropping the bearer token ends it.
        if self.token.write().await.take().is_some() {
            info!("http: session credential dropped");
        }
        Ok(())
    }

    async fn current_identity(&self) -> Result<Identity> {
        if self.token.read().await.is_none() {
            return Err(anyhow!("no session"));
        }
        let url = self.endpoint(&format!("auth/{USER_ENTITY}/me"))?;
        let response = self.authorized(self.http.get(url)).await.send().await?;
        let me: MeResponse = ensure_success(response).await?.json().await?;
        Ok(me.into())
    }

    async fn query_restaurants(&self, query: &RestaurantQuery) -> Result<Vec<RestaurantRecord>> {
        let url = self.endpoint(&format!("dynamic/{RESTAURANT_COLLECTION}"))?;
        let mut base_params = vec![
            ("owner.id_eq", query.owner.0.to_string()),
            ("perPage", query.limit.to_string()),
            ("orderBy", "createdAt".to_string()),
            (
                "order",
                if query.newest_first { "DESC" } else { "ASC" }.to_string(),
            ),
        ];
        if query.include_owner {
            base_params.push(("relations", "owner".to_string()));
        }

        let mut records = Vec::new();
        for page_number in 1..=MAX_PAGES {
            let mut params = base_params.clone();
            params.push(("page", page_number.to_string()));
            let response = self
                .authorized(self.http.get(url.clone()).query(&params))
                .await
                .send()
                .await?;
            let page: Paginated<RestaurantPayload> =
                ensure_success(response).await?.json().await?;
            let last = page.is_last_page(query.limit);
            debug!(
                owner_id = query.owner.0,
                page = page_number,
                count = page.data.len(),
                total = ?page.total,
                "http: restaurants page received"
            );
            records.extend(
                page.data
                    .into_iter()
                    .map(|payload| payload.into_record(query.owner)),
            );
            if last {
                return Ok(records);
            }
        }

        warn!(
            owner_id = query.owner.0,
            pages = MAX_PAGES,
            "http: restaurant listing did not end"
        );
        Err(anyhow!("restaurant listing exceeded {MAX_PAGES} pages"))
    }

    async fn create_restaurant(
        &self,
        owner: UserId,
        draft: &RestaurantDraft,
    ) -> Result<RestaurantRecord> {
        let url = self.endpoint(&format!("dynamic/{RESTAURANT_COLLECTION}"))?;
        let request = self
            .http
            .post(url)
            .json(&CreateRestaurantRequest::scoped(owner, draft));
        let response = self.authorized(request).await.send().await?;
        let created: RestaurantPayload = ensure_success(response).await?.json().await?;
        Ok(created.into_record(owner))
    }
}
