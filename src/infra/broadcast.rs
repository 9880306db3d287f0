use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::app::events::ApiEvent;

const CHANNEL_CAPACITY: usize = 1024;

/// Process-wide event broadcast. Every connected websocket task holds a
/// subscription; publishing never blocks and drops nothing a live,
/// keeping-up subscriber would see.
#[derive(Clone)]
pub struct Broadcaster {
    sender: broadcast::Sender<ApiEvent>,
}

impl Broadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ApiEvent> {
        self.sender.subscribe()
    }

    /// Best-effort: a send with zero subscribers is not an error.
    pub fn publish(&self, event: ApiEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Connection -> guild id side table for guild-scoped events. The registry
/// owns the mapping; each entry lives exactly as long as its connection
/// task, which removes it on disconnect.
#[derive(Clone, Default)]
pub struct SocketRegistry {
    inner: Arc<RwLock<HashMap<Uuid, String>>>,
}

impl SocketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, connection_id: Uuid, guild_id: String) {
        let mut map = self.inner.write().await;
        map.insert(connection_id, guild_id);
    }

    pub async fn guild_for(&self, connection_id: &Uuid) -> Option<String> {
        let map = self.inner.read().await;
        map.get(connection_id).cloned()
    }

    pub async fn remove(&self, connection_id: &Uuid) {
        let mut map = self.inner.write().await;
        map.remove(connection_id);
    }
}
