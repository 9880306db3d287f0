use std::collections::VecDeque;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

/// Discord rich embed, as accepted by webhook execution.
#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub timestamp: String,
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    pub fn inline(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            inline: true,
        }
    }
}

/// In-memory embed queue between the many producing requests and the one
/// periodic dispatcher. Process-lifetime state; contents do not survive a
/// restart, matching the at-most-once delivery contract.
#[derive(Clone, Default)]
pub struct WebhookQueue {
    inner: Arc<Mutex<VecDeque<Embed>>>,
}

impl WebhookQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, embed: Embed) {
        let mut queue = self.inner.lock().await;
        queue.push_back(embed);
    }

    /// Removes and returns up to `max` queued embeds, oldest first.
    pub async fn drain(&self, max: usize) -> Vec<Embed> {
        let mut queue = self.inner.lock().await;
        let take = max.min(queue.len());
        queue.drain(..take).collect()
    }
}
