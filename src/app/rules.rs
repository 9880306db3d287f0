use anyhow::{anyhow, Result};
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::app::guild_configs::GuildConfigService;
use crate::app::ident;
use crate::domain::community::GuildConfig;
use crate::domain::rule::Rule;
use crate::infra::db::Db;

const ID_INSERT_ATTEMPTS: usize = 5;

#[derive(Clone)]
pub struct RuleService {
    db: Db,
}

impl RuleService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Rule>> {
        let rows = sqlx::query("SELECT id, shortdesc, longdesc FROM rules ORDER BY shortdesc")
            .fetch_all(self.db.pool())
            .await?;

        Ok(rows.iter().map(rule_from_row).collect())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Rule>> {
        let row = sqlx::query("SELECT id, shortdesc, longdesc FROM rules WHERE id = $1")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.as_ref().map(rule_from_row))
    }

    pub async fn create(&self, shortdesc: &str, longdesc: &str) -> Result<Rule> {
        for _ in 0..ID_INSERT_ATTEMPTS {
            let id = ident::new_public_id();
            let result = sqlx::query(
                "INSERT INTO rules (id, shortdesc, longdesc) \
                 VALUES ($1, $2, $3) \
                 RETURNING id, shortdesc, longdesc",
            )
            .bind(&id)
            .bind(shortdesc)
            .bind(longdesc)
            .fetch_one(self.db.pool())
            .await;

            match result {
                Ok(row) => return Ok(rule_from_row(&row)),
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    continue
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(anyhow!("exhausted rule id attempts"))
    }

    /// Deletes a rule and cascades: every report filed under it goes away
    /// and every guild loses the stale filter entry. Returns the removed
    /// rule and the configs needing a re-sync notification.
    pub async fn remove(&self, id: &str) -> Result<Option<(Rule, Vec<GuildConfig>)>> {
        let mut tx = self.db.pool().begin().await?;

        let row = sqlx::query("SELECT id, shortdesc, longdesc FROM rules WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let rule = match row.as_ref() {
            Some(row) => rule_from_row(row),
            None => {
                tx.rollback().await?;
                return Ok(None);
            }
        };

        sqlx::query("DELETE FROM reports WHERE broken_rule_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let affected =
            GuildConfigService::replace_rule_everywhere_with_tx(id, None, &mut tx).await?;

        sqlx::query("DELETE FROM rules WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((rule, affected)))
    }

    /// Folds `source` into `target`: reports are re-pointed, filter lists
    /// swap the entry (or just drop it where target is already present),
    /// and the source rule is deleted. One transaction.
    pub async fn merge(
        &self,
        source: &str,
        target: &str,
    ) -> Result<Option<(Rule, Rule, Vec<GuildConfig>)>> {
        let mut tx = self.db.pool().begin().await?;

        let source_row =
            sqlx::query("SELECT id, shortdesc, longdesc FROM rules WHERE id = $1")
                .bind(source)
                .fetch_optional(&mut *tx)
                .await?;
        let target_row =
            sqlx::query("SELECT id, shortdesc, longdesc FROM rules WHERE id = $1")
                .bind(target)
                .fetch_optional(&mut *tx)
                .await?;

        let (source_rule, target_rule) = match (source_row.as_ref(), target_row.as_ref()) {
            (Some(source_row), Some(target_row)) => {
                (rule_from_row(source_row), rule_from_row(target_row))
            }
            _ => {
                tx.rollback().await?;
                return Ok(None);
            }
        };

        sqlx::query("UPDATE reports SET broken_rule_id = $2 WHERE broken_rule_id = $1")
            .bind(source)
            .bind(target)
            .execute(&mut *tx)
            .await?;

        let affected =
            GuildConfigService::replace_rule_everywhere_with_tx(source, Some(target), &mut tx)
                .await?;

        sqlx::query("DELETE FROM rules WHERE id = $1")
            .bind(source)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((source_rule, target_rule, affected)))
    }
}

fn rule_from_row(row: &PgRow) -> Rule {
    Rule {
        id: row.get("id"),
        shortdesc: row.get("shortdesc"),
        longdesc: row.get("longdesc"),
    }
}
