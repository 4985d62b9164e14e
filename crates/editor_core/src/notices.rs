//! The editor's single advisory banner.
//!
//! A success and an error are never shown together: raising one replaces
//! whatever is showing. Banners expire on their own and never gate actions.

use std::time::{Duration, Instant};

use tokio::sync::RwLock;

pub const SUCCESS_TTL: Duration = Duration::from_secs(2);
pub const ERROR_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
    pub expires_at: Instant,
}

impl Banner {
    pub fn is_error(&self) -> bool {
        self.kind == BannerKind::Error
    }
}

pub struct Notices {
    slot: RwLock<Option<Banner>>,
    success_ttl: Duration,
    error_ttl: Duration,
}

impl Default for Notices {
    fn default() -> Self {
        Self::new(SUCCESS_TTL, ERROR_TTL)
    }
}

impl Notices {
    pub fn new(success_ttl: Duration, error_ttl: Duration) -> Self {
        Self {
            slot: RwLock::new(None),
            success_ttl,
            error_ttl,
        }
    }

    pub async fn success(&self, message: impl Into<String>) {
        self.raise(BannerKind::Success, message.into(), self.success_ttl)
            .await;
    }

    pub async fn error(&self, message: impl Into<String>) {
        self.raise(BannerKind::Error, message.into(), self.error_ttl)
            .await;
    }

    async fn raise(&self, kind: BannerKind, message: String, ttl: Duration) {
        *self.slot.write().await = Some(Banner {
            kind,
            message,
            expires_at: Instant::now() + ttl,
        });
    }

    pub async fn current(&self) -> Option<Banner> {
        self.current_at(Instant::now()).await
    }

    pub async fn current_at(&self, now: Instant) -> Option<Banner> {
        self.slot
            .read()
            .await
            .as_ref()
            .filter(|banner| banner.expires_at > now)
            .cloned()
    }

    pub async fn dismiss(&self) {
        *self.slot.write().await = None;
    }
}
