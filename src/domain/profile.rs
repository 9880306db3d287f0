use serde::{Deserialize, Serialize};

use crate::domain::report::Report;

/// All reports for one player filed by one community, open and revoked
/// alike. Cross-community visibility is the point of the shared list; no
/// trust filtering applies on this read path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub playername: String,
    pub community_id: String,
    pub reports: Vec<Report>,
}
