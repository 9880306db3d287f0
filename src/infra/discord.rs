use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DISCORD_API_BASE: &str = "https://discord.com/api/v10";
const REQUEST_TIMEOUT_SECONDS: u64 = 10;

/// Display identity of a Discord user, as needed for admin validation and
/// notification embeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub discriminator: String,
}

impl ExternalUser {
    pub fn tag(&self) -> String {
        if self.discriminator.is_empty() || self.discriminator == "0" {
            self.username.clone()
        } else {
            format!("{}#{}", self.username, self.discriminator)
        }
    }
}

/// The user-directory collaborator: turns a raw id into a real external
/// identity, or nothing. Swapped for a static map in tests.
#[async_trait::async_trait]
pub trait UserResolver: Send + Sync {
    async fn resolve(&self, user_id: &str) -> Result<Option<ExternalUser>>;
}

pub struct DiscordResolver {
    client: reqwest::Client,
    bot_token: String,
}

impl DiscordResolver {
    pub fn new(bot_token: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .build()?;
        Ok(Self { client, bot_token })
    }
}

#[async_trait::async_trait]
impl UserResolver for DiscordResolver {
    async fn resolve(&self, user_id: &str) -> Result<Option<ExternalUser>> {
        if user_id.is_empty() || !user_id.chars().all(|c| c.is_ascii_digit()) {
            return Ok(None);
        }

        let response = self
            .client
            .get(format!("{}/users/{}", DISCORD_API_BASE, user_id))
            .header("Authorization", format!("Bot {}", self.bot_token))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let user = response.json::<ExternalUser>().await?;
                Ok(Some(user))
            }
            reqwest::StatusCode::NOT_FOUND => Ok(None),
            status => Err(anyhow!("user lookup failed with status {}", status)),
        }
    }
}
