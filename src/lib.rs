pub mod app;
pub mod config;
pub mod domain;
pub mod http;
pub mod infra;
pub mod jobs;

use std::sync::Arc;

use crate::infra::broadcast::{Broadcaster, SocketRegistry};
use crate::infra::db::Db;
use crate::infra::discord::UserResolver;
use crate::infra::webhook_queue::WebhookQueue;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub resolver: Arc<dyn UserResolver>,
    pub broadcaster: Broadcaster,
    pub sockets: SocketRegistry,
    pub webhook_queue: WebhookQueue,
    pub api_key: [u8; 32],
}
