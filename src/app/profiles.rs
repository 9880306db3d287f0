use anyhow::Result;

use crate::app::reports::ReportService;
use crate::domain::profile::Profile;
use crate::domain::report::Report;
use crate::infra::db::Db;

/// Read-side grouping of a player's reports by community. A pure fold
/// over the report query, first-seen order preserved; deliberately not
/// trust-scoped (the shared list is visible to any report reader).
#[derive(Clone)]
pub struct ProfileService {
    db: Db,
}

impl ProfileService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn fetch_by_player(&self, playername: &str) -> Result<Vec<Profile>> {
        let reports = ReportService::new(self.db.clone())
            .all_by_player(playername)
            .await?;
        Ok(group_by_community(playername, reports))
    }

    pub async fn fetch_by_player_and_community(
        &self,
        playername: &str,
        community_id: &str,
    ) -> Result<Option<Profile>> {
        let profiles = self.fetch_by_player(playername).await?;
        Ok(profiles
            .into_iter()
            .find(|profile| profile.community_id == community_id))
    }
}

fn group_by_community(playername: &str, reports: Vec<Report>) -> Vec<Profile> {
    let mut profiles: Vec<Profile> = Vec::new();
    for report in reports {
        match profiles
            .iter_mut()
            .find(|profile| profile.community_id == report.community_id)
        {
            Some(profile) => profile.reports.push(report),
            None => profiles.push(Profile {
                playername: playername.to_string(),
                community_id: report.community_id.clone(),
                reports: vec![report],
            }),
        }
    }
    profiles
}
