use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A filed rule violation. Revocation is not a separate record: once a
/// report is withdrawn the `revoked_at`/`revoked_by` tail is set exactly
/// once and the row stays around for historical reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub playername: String,
    pub community_id: String,
    pub broken_rule_id: String,
    pub proof: String,
    pub description: String,
    pub automated: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub reported_time: OffsetDateTime,
    pub admin_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub revoked_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_by: Option<String>,
}

impl Report {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}
