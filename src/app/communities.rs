use anyhow::{anyhow, Result};
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::app::guild_configs::GuildConfigService;
use crate::app::ident;
use crate::domain::community::{Community, GuildConfig};
use crate::infra::db::Db;

const ID_INSERT_ATTEMPTS: usize = 5;

#[derive(Clone)]
pub struct CommunityService {
    db: Db,
}

impl CommunityService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Community>> {
        let rows = sqlx::query(
            "SELECT id, name, contact, guild_ids, token_invalid_before \
             FROM communities ORDER BY name",
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(community_from_row).collect())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Community>> {
        let row = sqlx::query(
            "SELECT id, name, contact, guild_ids, token_invalid_before \
             FROM communities WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(community_from_row))
    }

    pub async fn create(&self, name: &str, contact: &str) -> Result<Community> {
        for _ in 0..ID_INSERT_ATTEMPTS {
            let id = ident::new_public_id();
            let result = sqlx::query(
                "INSERT INTO communities (id, name, contact) \
                 VALUES ($1, $2, $3) \
                 RETURNING id, name, contact, guild_ids, token_invalid_before",
            )
            .bind(&id)
            .bind(name)
            .bind(contact)
            .fetch_one(self.db.pool())
            .await;

            match result {
                Ok(row) => return Ok(community_from_row(&row)),
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    continue
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(anyhow!("exhausted community id attempts"))
    }

    /// Deletes a community and cascades: its reports and guild configs go
    /// away, and every other guild that trusted it loses the stale entry.
    /// Returns the removed community and the configs that still need a
    /// re-sync notification.
    pub async fn remove(&self, id: &str) -> Result<Option<(Community, Vec<GuildConfig>)>> {
        let mut tx = self.db.pool().begin().await?;

        let row = sqlx::query(
            "SELECT id, name, contact, guild_ids, token_invalid_before \
             FROM communities WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let community = match row.as_ref() {
            Some(row) => community_from_row(row),
            None => {
                tx.rollback().await?;
                return Ok(None);
            }
        };

        sqlx::query("DELETE FROM reports WHERE community_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM guild_configs WHERE community_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let affected = GuildConfigService::remove_community_everywhere_with_tx(id, &mut tx)
            .await?;

        sqlx::query("DELETE FROM communities WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((community, affected)))
    }

    /// Rotates the token cutoff to now, atomically invalidating every key
    /// minted before this instant. No blacklist involved.
    pub async fn invalidate_tokens(&self, id: &str) -> Result<Option<Community>> {
        let row = sqlx::query(
            "UPDATE communities SET token_invalid_before = now() \
             WHERE id = $1 \
             RETURNING id, name, contact, guild_ids, token_invalid_before",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(community_from_row))
    }

    pub async fn link_guild(&self, id: &str, guild_id: &str) -> Result<Option<Community>> {
        let row = sqlx::query(
            "UPDATE communities \
             SET guild_ids = CASE WHEN $2 = ANY(guild_ids) THEN guild_ids \
                                  ELSE array_append(guild_ids, $2) END \
             WHERE id = $1 \
             RETURNING id, name, contact, guild_ids, token_invalid_before",
        )
        .bind(id)
        .bind(guild_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(community_from_row))
    }
}

pub(crate) fn community_from_row(row: &PgRow) -> Community {
    Community {
        id: row.get("id"),
        name: row.get("name"),
        contact: row.get("contact"),
        guild_ids: row.get("guild_ids"),
        token_invalid_before: row.get("token_invalid_before"),
    }
}
