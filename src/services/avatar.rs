//! Avatar resolution and object URL lifetime.
//!
//! Photos arrive as bytes and are handed to the display layer through
//! `blob:` object URLs minted by an [`ObjectUrlRegistry`]. An [`ObjectUrl`] owns
//! its registry entry and revokes it when dropped, so whoever holds the avatar
//! owns the memory behind it.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::UserId;
use crate::services::gateway::{Photo, PhotoGateway};

/// Image shown whenever a user's photo cannot be displayed
pub const DEFAULT_AVATAR: &str = "assets/default-avatar.jpg";

/// Registry of live object URLs and the photo bytes behind them
#[derive(Clone, Default)]
pub struct ObjectUrlRegistry {
    entries: Arc<Mutex<HashMap<String, Photo>>>,
}

impl fmt::Debug for ObjectUrlRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectUrlRegistry")
            .field("live", &self.live_count())
            .finish()
    }
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a new object URL for `photo`
    pub fn create(&self, photo: Photo) -> ObjectUrl {
        let url = format!("blob:permuta/{}", Uuid::new_v4());
        self.lock().insert(url.clone(), photo);
        ObjectUrl {
            url,
            registry: self.clone(),
        }
    }

    /// Photo behind a live URL
    pub fn resolve(&self, url: &str) -> Option<Photo> {
        self.lock().get(url).cloned()
    }

    /// Number of URLs created and not yet revoked
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    fn revoke(&self, url: &str) {
        if self.lock().remove(url).is_some() {
            debug!(url = %url, "Object URL revoked");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Photo>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Owning handle to a live object URL; revoked on drop
pub struct ObjectUrl {
    url: String,
    registry: ObjectUrlRegistry,
}

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl fmt::Debug for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectUrl").field(&self.url).finish()
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        self.registry.revoke(&self.url);
    }
}

/// Displayable image for a user
#[derive(Debug, Default)]
pub enum Avatar {
    Photo(ObjectUrl),
    #[default]
    Default,
}

impl Avatar {
    /// Image source that is always safe to render
    pub fn src(&self) -> &str {
        match self {
            Avatar::Photo(url) => url.as_str(),
            Avatar::Default => DEFAULT_AVATAR,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Avatar::Default)
    }
}

/// Resolve the avatar for `user_id`; any failure yields the default image
pub async fn resolve_avatar<G>(gateway: &G, registry: &ObjectUrlRegistry, user_id: UserId) -> Avatar
where
    G: PhotoGateway + ?Sized,
{
    match gateway.fetch_photo(user_id).await {
        Ok(Some(photo)) => Avatar::Photo(registry.create(photo)),
        Ok(None) => Avatar::Default,
        Err(e) => {
            warn!(user_id, error = %e, "Could not load user photo, using default avatar");
            Avatar::Default
        }
    }
}

/// Per-row avatars of a list view
#[derive(Debug)]
pub struct AvatarCache {
    registry: ObjectUrlRegistry,
    avatars: HashMap<UserId, Avatar>,
}

impl AvatarCache {
    pub fn new(registry: ObjectUrlRegistry) -> Self {
        Self {
            registry,
            avatars: HashMap::new(),
        }
    }

    /// Fetch avatars for `ids`, replacing whatever was cached for them
    pub async fn load<G>(&mut self, gateway: &G, ids: impl IntoIterator<Item = UserId>)
    where
        G: PhotoGateway + ?Sized,
    {
        for id in ids {
            // Release the old URL before minting a new one
            self.avatars.remove(&id);
            let avatar = resolve_avatar(gateway, &self.registry, id).await;
            self.avatars.insert(id, avatar);
        }
    }

    /// Image source for a row; default until its photo has been loaded
    pub fn src(&self, id: UserId) -> &str {
        self.avatars.get(&id).map_or(DEFAULT_AVATAR, Avatar::src)
    }

    /// Drop avatars of users no longer shown
    pub fn retain(&mut self, mut keep: impl FnMut(UserId) -> bool) {
        self.avatars.retain(|id, _| keep(*id));
    }

    pub fn clear(&mut self) {
        self.avatars.clear();
    }

    pub fn len(&self) -> usize {
        self.avatars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.avatars.is_empty()
    }
}
