use anyhow::{anyhow, Result};
use sqlx::postgres::PgRow;
use sqlx::Row;
use time::OffsetDateTime;

use crate::app::ident;
use crate::domain::report::Report;
use crate::infra::db::Db;

const ID_INSERT_ATTEMPTS: usize = 5;

const REPORT_COLUMNS: &str = "id, playername, community_id, broken_rule_id, proof, \
     description, automated, reported_time, admin_id, created_at, revoked_at, revoked_by";

#[derive(Debug, Clone)]
pub struct CreateReport {
    pub playername: String,
    pub broken_rule_id: String,
    pub proof: String,
    pub description: String,
    pub automated: bool,
    pub reported_time: OffsetDateTime,
    pub admin_id: String,
}

/// Open-report counts across every community for one player, recomputed
/// for each fan-out payload.
#[derive(Debug, Clone, Copy)]
pub struct PlayerTally {
    pub total_reports: i64,
    pub total_communities: i64,
}

#[derive(Clone)]
pub struct ReportService {
    db: Db,
}

impl ReportService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn create(&self, community_id: &str, input: &CreateReport) -> Result<Report> {
        for _ in 0..ID_INSERT_ATTEMPTS {
            let id = ident::new_public_id();
            let result = sqlx::query(&format!(
                "INSERT INTO reports \
                     (id, playername, community_id, broken_rule_id, proof, \
                      description, automated, reported_time, admin_id) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
                 RETURNING {}",
                REPORT_COLUMNS
            ))
            .bind(&id)
            .bind(&input.playername)
            .bind(community_id)
            .bind(&input.broken_rule_id)
            .bind(&input.proof)
            .bind(&input.description)
            .bind(input.automated)
            .bind(input.reported_time)
            .bind(&input.admin_id)
            .fetch_one(self.db.pool())
            .await;

            match result {
                Ok(row) => return Ok(report_from_row(&row)),
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    continue
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(anyhow!("exhausted report id attempts"))
    }

    pub async fn get(&self, id: &str) -> Result<Option<Report>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM reports WHERE id = $1",
            REPORT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(report_from_row))
    }

    pub async fn list_by_rule(&self, rule_id: &str) -> Result<Vec<Report>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM reports WHERE broken_rule_id = $1 ORDER BY created_at",
            REPORT_COLUMNS
        ))
        .bind(rule_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(report_from_row).collect())
    }

    /// Open reports only; revoked ones are history, not standing.
    pub async fn open_by_player(&self, playername: &str) -> Result<Vec<Report>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM reports \
             WHERE playername = $1 AND revoked_at IS NULL \
             ORDER BY created_at",
            REPORT_COLUMNS
        ))
        .bind(playername)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(report_from_row).collect())
    }

    pub async fn all_by_player(&self, playername: &str) -> Result<Vec<Report>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM reports WHERE playername = $1 ORDER BY created_at",
            REPORT_COLUMNS
        ))
        .bind(playername)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(report_from_row).collect())
    }

    /// Reports created or revoked after the given instant, for subscriber
    /// re-sync.
    pub async fn modified_since(&self, since: OffsetDateTime) -> Result<Vec<Report>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM reports \
             WHERE created_at > $1 OR revoked_at > $1 \
             ORDER BY created_at",
            REPORT_COLUMNS
        ))
        .bind(since)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(report_from_row).collect())
    }

    /// Sets the revocation tail on one open report owned by the caller.
    /// Returns None when the report is not currently open under that
    /// owner; the handler decides which refusal that is.
    pub async fn revoke(
        &self,
        id: &str,
        community_id: &str,
        admin_id: &str,
    ) -> Result<Option<Report>> {
        let row = sqlx::query(&format!(
            "UPDATE reports SET revoked_at = now(), revoked_by = $3 \
             WHERE id = $1 AND community_id = $2 AND revoked_at IS NULL \
             RETURNING {}",
            REPORT_COLUMNS
        ))
        .bind(id)
        .bind(community_id)
        .bind(admin_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(report_from_row))
    }

    pub async fn revoke_by_player(
        &self,
        playername: &str,
        community_id: &str,
        admin_id: &str,
    ) -> Result<Vec<Report>> {
        self.revoke_matching("playername", playername, community_id, admin_id)
            .await
    }

    pub async fn revoke_by_rule(
        &self,
        rule_id: &str,
        community_id: &str,
        admin_id: &str,
    ) -> Result<Vec<Report>> {
        self.revoke_matching("broken_rule_id", rule_id, community_id, admin_id)
            .await
    }

    pub async fn revoke_by_admin(
        &self,
        filed_by: &str,
        community_id: &str,
        admin_id: &str,
    ) -> Result<Vec<Report>> {
        self.revoke_matching("admin_id", filed_by, community_id, admin_id)
            .await
    }

    /// One multi-row update; RETURNING hands back the exact set the update
    /// touched, so the fan-out works from a consistent snapshot.
    async fn revoke_matching(
        &self,
        column: &str,
        value: &str,
        community_id: &str,
        admin_id: &str,
    ) -> Result<Vec<Report>> {
        let rows = sqlx::query(&format!(
            "UPDATE reports SET revoked_at = now(), revoked_by = $3 \
             WHERE {} = $1 AND community_id = $2 AND revoked_at IS NULL \
             RETURNING {}",
            column, REPORT_COLUMNS
        ))
        .bind(value)
        .bind(community_id)
        .bind(admin_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(report_from_row).collect())
    }

    pub async fn player_tally(&self, playername: &str) -> Result<PlayerTally> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total_reports, \
                    COUNT(DISTINCT community_id) AS total_communities \
             FROM reports \
             WHERE playername = $1 AND revoked_at IS NULL",
        )
        .bind(playername)
        .fetch_one(self.db.pool())
        .await?;

        Ok(PlayerTally {
            total_reports: row.get("total_reports"),
            total_communities: row.get("total_communities"),
        })
    }
}

pub(crate) fn report_from_row(row: &PgRow) -> Report {
    Report {
        id: row.get("id"),
        playername: row.get("playername"),
        community_id: row.get("community_id"),
        broken_rule_id: row.get("broken_rule_id"),
        proof: row.get("proof"),
        description: row.get("description"),
        automated: row.get("automated"),
        reported_time: row.get("reported_time"),
        admin_id: row.get("admin_id"),
        created_at: row.get("created_at"),
        revoked_at: row.get("revoked_at"),
        revoked_by: row.get("revoked_by"),
    }
}
