//! Session persistence
//!
//! The session is the bearer token plus the signed-in user. Stores broadcast
//! a [`SessionEvent`] on every change so that other components, and other
//! processes sharing the same file, can react to logins and logouts.

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info, warn};

use crate::models::StoredUser;
use crate::utils::errors::Result;
use crate::utils::logging::log_session_event;

/// Cache key reserved for the user's event list
pub const EVENTS_CACHE_KEY: &str = "events_cache";
/// Cache key reserved for the public event list
pub const PUBLIC_EVENTS_CACHE_KEY: &str = "public_events_cache";

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Change notification emitted by a session store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    TokenChanged,
    UserChanged,
    /// Token and user were removed together
    Cleared,
    /// Another process modified the persisted session
    ExternalChange,
}

/// Everything a store persists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSnapshot {
    pub token: Option<String>,
    pub user: Option<StoredUser>,
}

impl SessionSnapshot {
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.user.is_none()
    }
}

/// Storage for the current session
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn token(&self) -> Option<String>;

    async fn user(&self) -> Option<StoredUser>;

    async fn set_token(&self, token: &str) -> Result<()>;

    async fn set_user(&self, user: &StoredUser) -> Result<()>;

    /// Remove token and user in one step, emitting a single `Cleared`
    async fn clear(&self) -> Result<()>;

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;
}

/// Stream of session events, starting from the moment of the call
pub fn changes(store: &dyn SessionStore) -> impl Stream<Item = SessionEvent> {
    let mut receiver = store.subscribe();
    async_stream::stream! {
        loop {
            match receiver.recv().await {
                Ok(event) => yield event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped = skipped, "Session event subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}

fn notify(sender: &broadcast::Sender<SessionEvent>, event: SessionEvent) {
    // No subscribers is not an error
    let _ = sender.send(event);
}

/// In-process session store
#[derive(Debug)]
pub struct MemorySessionStore {
    state: RwLock<SessionSnapshot>,
    events: broadcast::Sender<SessionEvent>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::with_snapshot(SessionSnapshot::default())
    }

    pub fn with_snapshot(snapshot: SessionSnapshot) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: RwLock::new(snapshot),
            events,
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.clone()
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn token(&self) -> Option<String> {
        self.state.read().await.token.clone()
    }

    async fn user(&self) -> Option<StoredUser> {
        self.state.read().await.user.clone()
    }

    async fn set_token(&self, token: &str) -> Result<()> {
        self.state.write().await.token = Some(token.to_string());
        notify(&self.events, SessionEvent::TokenChanged);
        Ok(())
    }

    async fn set_user(&self, user: &StoredUser) -> Result<()> {
        self.state.write().await.user = Some(user.clone());
        notify(&self.events, SessionEvent::UserChanged);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.state.write().await = SessionSnapshot::default();
        notify(&self.events, SessionEvent::Cleared);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

/// Session store persisted as a JSON file.
///
/// Writes are last-write-wins. Other processes using the same path are
/// picked up by [`FileSessionStore::sync_from_disk`].
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    cache: RwLock<SessionSnapshot>,
    events: broadcast::Sender<SessionEvent>,
}

impl FileSessionStore {
    /// Open the store, loading any session already on disk
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let snapshot = read_snapshot(&path).await?;
        debug!(path = %path.display(), has_token = snapshot.token.is_some(), "Session file loaded");

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            path,
            cache: RwLock::new(snapshot),
            events,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reload the file and emit `ExternalChange` if it differs from memory
    pub async fn sync_from_disk(&self) -> Result<bool> {
        let on_disk = read_snapshot(&self.path).await?;
        let mut cache = self.cache.write().await;
        if *cache == on_disk {
            return Ok(false);
        }

        *cache = on_disk;
        drop(cache);
        log_session_event("external_change", None);
        notify(&self.events, SessionEvent::ExternalChange);
        Ok(true)
    }

    /// Poll the file periodically until the returned watcher is dropped
    pub fn spawn_watch(self: Arc<Self>, interval: Duration) -> SessionWatcher {
        let store = Arc::clone(&self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if let Err(e) = store.sync_from_disk().await {
                    error!("Session file sync failed: {}", e);
                }
            }
        });

        info!(path = %self.path.display(), "Started session file watch with interval {:?}", interval);
        SessionWatcher { handle: Some(handle) }
    }

    async fn persist(&self, snapshot: &SessionSnapshot) -> Result<()> {
        if snapshot.is_empty() {
            return match tokio::fs::remove_file(&self.path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            };
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let serialized = serde_json::to_vec_pretty(snapshot)?;
        tokio::fs::write(&self.path, serialized).await?;
        debug!(path = %self.path.display(), "Session file written");
        Ok(())
    }

    async fn update<F>(&self, event: SessionEvent, apply: F) -> Result<()>
    where
        F: FnOnce(&mut SessionSnapshot) + Send,
    {
        // The cache only takes the new snapshot once it is on disk
        let mut cache = self.cache.write().await;
        let mut next = cache.clone();
        apply(&mut next);
        self.persist(&next).await?;
        *cache = next;
        drop(cache);
        notify(&self.events, event);
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn token(&self) -> Option<String> {
        self.cache.read().await.token.clone()
    }

    async fn user(&self) -> Option<StoredUser> {
        self.cache.read().await.user.clone()
    }

    async fn set_token(&self, token: &str) -> Result<()> {
        let token = token.to_string();
        self.update(SessionEvent::TokenChanged, move |s| s.token = Some(token)).await
    }

    async fn set_user(&self, user: &StoredUser) -> Result<()> {
        let user = user.clone();
        self.update(SessionEvent::UserChanged, move |s| s.user = Some(user)).await
    }

    async fn clear(&self) -> Result<()> {
        self.update(SessionEvent::Cleared, |s| *s = SessionSnapshot::default()).await
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

/// Background poll of a [`FileSessionStore`]; stops on drop
#[derive(Debug)]
pub struct SessionWatcher {
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl SessionWatcher {
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("Stopped session file watch");
        }
    }
}

impl Drop for SessionWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn read_snapshot(path: &Path) -> Result<SessionSnapshot> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(SessionSnapshot::default()),
        Err(e) => return Err(e.into()),
    };

    match serde_json::from_slice(&raw) {
        Ok(snapshot) => Ok(snapshot),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring unreadable session file");
            Ok(SessionSnapshot::default())
        }
    }
}
