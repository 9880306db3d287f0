use anyhow::Result;
use sqlx::Row;

use crate::domain::webhook::Webhook;
use crate::infra::db::Db;

/// Store of Discord webhook registrations, one per guild. Read by the
/// dispatcher on every tick; pruned reactively when Discord reports a
/// webhook gone.
#[derive(Clone)]
pub struct WebhookService {
    db: Db,
}

impl WebhookService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Webhook>> {
        let rows = sqlx::query("SELECT id, token, guild_id FROM webhooks")
            .fetch_all(self.db.pool())
            .await?;

        Ok(rows
            .iter()
            .map(|row| Webhook {
                id: row.get("id"),
                token: row.get("token"),
                guild_id: row.get("guild_id"),
            })
            .collect())
    }

    /// One webhook per guild; a second registration for the same guild is
    /// refused rather than replaced.
    pub async fn add(&self, webhook: &Webhook) -> Result<Option<Webhook>> {
        let result = sqlx::query(
            "INSERT INTO webhooks (id, token, guild_id) \
             VALUES ($1, $2, $3) \
             ON CONFLICT DO NOTHING",
        )
        .bind(&webhook.id)
        .bind(&webhook.token)
        .bind(&webhook.guild_id)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(webhook.clone()))
    }

    pub async fn remove(&self, id: &str, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM webhooks WHERE id = $1 AND token = $2")
            .bind(id)
            .bind(token)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn remove_by_id(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM webhooks WHERE id = $1")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
