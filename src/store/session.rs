use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::cart::{Cart, CartError, CartLineKey, CartNotice};
use crate::domain::order::{ProductId, VariationId};
use super::{Catalog, NoticeSink, SessionCart};

// ============================================================================
// Session Store - per-visitor cart and flash notices
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sessions untouched for this long are evicted by [`SessionStore::sweep_idle`]
pub const DEFAULT_IDLE_TTL_SECS: i64 = 30 * 60;

#[derive(Debug)]
struct SessionState {
    cart: Cart,
    notices: Vec<CartNotice>,
    last_seen: DateTime<Utc>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            cart: Cart::default(),
            notices: Vec::new(),
            last_seen: Utc::now(),
        }
    }
}

impl SessionState {
    fn touch(&mut self) -> &mut Self {
        self.last_seen = Utc::now();
        self
    }
}

pub struct SessionStore {
    catalog: Arc<dyn Catalog>,
    sessions: RwLock<HashMap<SessionId, SessionState>>,
    idle_ttl: Duration,
}

impl SessionStore {
    /// The catalog is used to validate insertions (purchasable, stock)
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self {
            catalog,
            sessions: RwLock::new(HashMap::new()),
            idle_ttl: Duration::seconds(DEFAULT_IDLE_TTL_SECS),
        }
    }

    pub fn with_idle_ttl(mut self, idle_ttl: Duration) -> Self {
        self.idle_ttl = idle_ttl;
        self
    }

    pub fn handle(self: &Arc<Self>, id: SessionId) -> SessionHandle {
        SessionHandle {
            store: Arc::clone(self),
            id,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    pub async fn cart(&self, id: SessionId) -> Cart {
        self.sessions
            .read()
            .await
            .get(&id)
            .map(|s| s.cart.clone())
            .unwrap_or_default()
    }

    /// Notices are shown once, so reading them drains the queue
    pub async fn take_notices(&self, id: SessionId) -> Vec<CartNotice> {
        self.sessions
            .write()
            .await
            .get_mut(&id)
            .map(|s| std::mem::take(&mut s.touch().notices))
            .unwrap_or_default()
    }

    /// Drop sessions last seen before `cutoff`. Returns how many were dropped.
    pub async fn evict_idle_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, state| state.last_seen >= cutoff);
        before - sessions.len()
    }

    /// Drop sessions idle for longer than the configured TTL
    pub async fn sweep_idle(&self) -> usize {
        let evicted = self.evict_idle_before(Utc::now() - self.idle_ttl).await;
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted idle sessions");
        }
        evicted
    }
}

/// A `SessionStore` bound to one session id
#[derive(Clone)]
pub struct SessionHandle {
    store: Arc<SessionStore>,
    id: SessionId,
}

impl SessionHandle {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub async fn cart(&self) -> Cart {
        self.store.cart(self.id).await
    }

    pub async fn take_notices(&self) -> Vec<CartNotice> {
        self.store.take_notices(self.id).await
    }
}

#[async_trait]
impl SessionCart for SessionHandle {
    async fn empty(&self) -> Result<(), CartError> {
        if let Some(state) = self.store.sessions.write().await.get_mut(&self.id) {
            state.touch().cart.clear();
        }
        Ok(())
    }

    async fn add(
        &self,
        product_id: ProductId,
        quantity: u32,
        variation_id: Option<VariationId>,
    ) -> Result<CartLineKey, CartError> {
        let product = self
            .store
            .catalog
            .resolve(product_id, variation_id)
            .await
            .map_err(|e| CartError::Backend(e.to_string()))?
            .ok_or(CartError::NotPurchasable(product_id))?;

        let mut sessions = self.store.sessions.write().await;
        sessions.entry(self.id).or_default().touch().cart.add(&product, quantity)
    }
}

#[async_trait]
impl NoticeSink for SessionHandle {
    async fn push(&self, notice: CartNotice) {
        self.store
            .sessions
            .write()
            .await
            .entry(self.id)
            .or_default()
            .touch()
            .notices
            .push(notice);
    }
}
