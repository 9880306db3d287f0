use serde::{Deserialize, Serialize};

/// A Discord webhook registration. One per guild; consumed only by the
/// fan-out dispatcher, never by report logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub id: String,
    pub token: String,
    pub guild_id: String,
}
