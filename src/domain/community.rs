use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    pub id: String,
    pub name: String,
    /// Discord user id of the community contact.
    pub contact: String,
    pub guild_ids: Vec<String>,
    /// Tokens issued before this instant are rejected. Rotating this
    /// timestamp is the only token-revocation mechanism.
    #[serde(with = "time::serde::rfc3339")]
    pub token_invalid_before: OffsetDateTime,
}

/// Per-guild trust configuration: which communities and rules this guild
/// wants reports about, plus the Discord roles allowed to manage it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuildConfig {
    pub guild_id: String,
    pub community_id: Option<String>,
    /// Opaque digest of the guild's minted key. Never serialized.
    #[serde(skip_serializing, default)]
    pub api_key_material: Option<String>,
    pub trusted_communities: Vec<String>,
    pub rule_filters: Vec<String>,
    pub roles: GuildRoles,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuildRoles {
    pub reports: Option<String>,
    pub webhooks: Option<String>,
    pub set_config: Option<String>,
    pub set_rules: Option<String>,
    pub set_communities: Option<String>,
}
