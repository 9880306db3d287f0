use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row, Transaction};

use crate::domain::community::{GuildConfig, GuildRoles};
use crate::infra::db::Db;

const CONFIG_COLUMNS: &str = "guild_id, community_id, api_key_material, \
     trusted_communities, rule_filters, roles";

/// The trust configuration store: which communities and rules each guild
/// has opted into. Array mutations keep set semantics; stale entries are
/// pruned reactively by the rule/community cascades, never validated on
/// read.
#[derive(Clone)]
pub struct GuildConfigService {
    db: Db,
}

impl GuildConfigService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn get(&self, guild_id: &str) -> Result<Option<GuildConfig>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM guild_configs WHERE guild_id = $1",
            CONFIG_COLUMNS
        ))
        .bind(guild_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(config_from_row))
    }

    pub async fn find_by_trusted_community(
        &self,
        community_id: &str,
    ) -> Result<Vec<GuildConfig>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM guild_configs WHERE $1 = ANY(trusted_communities)",
            CONFIG_COLUMNS
        ))
        .bind(community_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(config_from_row).collect())
    }

    pub async fn find_by_rule_filter(&self, rule_id: &str) -> Result<Vec<GuildConfig>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM guild_configs WHERE $1 = ANY(rule_filters)",
            CONFIG_COLUMNS
        ))
        .bind(rule_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(config_from_row).collect())
    }

    /// Whether any config owned by this community has opted into the rule.
    /// A community cannot report violations of rules it never filtered in.
    pub async fn community_filters_rule(
        &self,
        community_id: &str,
        rule_id: &str,
    ) -> Result<bool> {
        let filtered = sqlx::query_scalar(
            "SELECT EXISTS( \
                 SELECT 1 FROM guild_configs \
                 WHERE community_id = $1 AND $2 = ANY(rule_filters))",
        )
        .bind(community_id)
        .bind(rule_id)
        .fetch_one(self.db.pool())
        .await?;

        Ok(filtered)
    }

    pub async fn upsert(&self, config: &GuildConfig) -> Result<GuildConfig> {
        let roles = serde_json::to_value(&config.roles)?;
        let row = sqlx::query(&format!(
            "INSERT INTO guild_configs \
                 (guild_id, community_id, trusted_communities, rule_filters, roles) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (guild_id) DO UPDATE SET \
                 community_id = EXCLUDED.community_id, \
                 trusted_communities = EXCLUDED.trusted_communities, \
                 rule_filters = EXCLUDED.rule_filters, \
                 roles = EXCLUDED.roles \
             RETURNING {}",
            CONFIG_COLUMNS
        ))
        .bind(&config.guild_id)
        .bind(&config.community_id)
        .bind(dedup(&config.trusted_communities))
        .bind(dedup(&config.rule_filters))
        .bind(roles)
        .fetch_one(self.db.pool())
        .await?;

        Ok(config_from_row(&row))
    }

    pub async fn set_api_key_material(&self, guild_id: &str, digest: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE guild_configs SET api_key_material = $2 WHERE guild_id = $1",
        )
        .bind(guild_id)
        .bind(digest)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes `old` from every rule_filters in one statement; for a merge
    /// the entries fold into `new` instead, without ever duplicating it.
    /// Returns the configs that changed.
    pub async fn replace_rule_everywhere_with_tx(
        old: &str,
        new: Option<&str>,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<GuildConfig>> {
        let rows = match new {
            Some(new) => {
                sqlx::query(&format!(
                    "UPDATE guild_configs \
                     SET rule_filters = CASE \
                         WHEN $2 = ANY(rule_filters) THEN array_remove(rule_filters, $1) \
                         ELSE array_replace(rule_filters, $1, $2) END \
                     WHERE $1 = ANY(rule_filters) \
                     RETURNING {}",
                    CONFIG_COLUMNS
                ))
                .bind(old)
                .bind(new)
                .fetch_all(&mut **tx)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "UPDATE guild_configs \
                     SET rule_filters = array_remove(rule_filters, $1) \
                     WHERE $1 = ANY(rule_filters) \
                     RETURNING {}",
                    CONFIG_COLUMNS
                ))
                .bind(old)
                .fetch_all(&mut **tx)
                .await?
            }
        };

        Ok(rows.iter().map(config_from_row).collect())
    }

    /// Prunes a deleted community from every trusted_communities list.
    pub async fn remove_community_everywhere_with_tx(
        community_id: &str,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<GuildConfig>> {
        let rows = sqlx::query(&format!(
            "UPDATE guild_configs \
             SET trusted_communities = array_remove(trusted_communities, $1) \
             WHERE $1 = ANY(trusted_communities) \
             RETURNING {}",
            CONFIG_COLUMNS
        ))
        .bind(community_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(rows.iter().map(config_from_row).collect())
    }
}

fn dedup(values: &[String]) -> Vec<String> {
    let mut seen = Vec::with_capacity(values.len());
    for value in values {
        if !seen.contains(value) {
            seen.push(value.clone());
        }
    }
    seen
}

pub(crate) fn config_from_row(row: &PgRow) -> GuildConfig {
    let roles: serde_json::Value = row.get("roles");
    GuildConfig {
        guild_id: row.get("guild_id"),
        community_id: row.get("community_id"),
        api_key_material: row.get("api_key_material"),
        trusted_communities: row.get("trusted_communities"),
        rule_filters: row.get("rule_filters"),
        roles: serde_json::from_value(roles).unwrap_or_default(),
    }
}
