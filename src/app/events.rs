use std::time::Duration;

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::domain::community::{Community, GuildConfig};
use crate::domain::report::Report;
use crate::domain::rule::Rule;
use crate::infra::broadcast::Broadcaster;
use crate::infra::discord::ExternalUser;
use crate::infra::webhook_queue::{Embed, EmbedField, WebhookQueue};

const GUILD_NOTIFY_PACE_MS: u64 = 100;

const COLOR_REPORT: u32 = 0xed4245;
const COLOR_REVOCATION: u32 = 0x57f287;
const COLOR_INFO: u32 = 0x5865f2;

/// Lifecycle event as seen by websocket subscribers. The `messageType`
/// tag is the wire discriminator clients switch on.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "messageType", rename_all = "camelCase")]
pub enum ApiEvent {
    #[serde(rename_all = "camelCase")]
    Report {
        report: Report,
        rule: Rule,
        admin: ExternalUser,
        total_reports: i64,
        total_communities: i64,
    },
    #[serde(rename_all = "camelCase")]
    Revocation {
        revocation: Report,
        rule: Rule,
        admin: ExternalUser,
        total_reports: i64,
        total_communities: i64,
    },
    RuleCreated {
        rule: Rule,
    },
    RuleRemoved {
        rule: Rule,
    },
    CommunityCreated {
        community: Community,
    },
    CommunityRemoved {
        community: Community,
    },
    GuildConfig {
        config: GuildConfig,
    },
}

impl ApiEvent {
    /// Guild-scoped events are delivered only to websocket clients that
    /// registered the matching guild id.
    pub fn guild_scope(&self) -> Option<&str> {
        match self {
            ApiEvent::GuildConfig { config } => Some(config.guild_id.as_str()),
            _ => None,
        }
    }
}

/// Fans lifecycle events out to both channels: the websocket broadcast
/// and the webhook embed queue. Both are best-effort; nothing here can
/// fail the mutation that produced the event.
#[derive(Clone)]
pub struct EventService {
    broadcaster: Broadcaster,
    queue: WebhookQueue,
}

impl EventService {
    pub fn new(broadcaster: Broadcaster, queue: WebhookQueue) -> Self {
        Self { broadcaster, queue }
    }

    pub async fn report_created(
        &self,
        report: Report,
        rule: Rule,
        admin: ExternalUser,
        total_reports: i64,
        total_communities: i64,
    ) {
        let embed = Embed {
            title: "Report created".into(),
            description: format!(
                "`{}` was reported for breaking rule `{}`",
                report.playername, rule.shortdesc
            ),
            color: COLOR_REPORT,
            timestamp: now_rfc3339(),
            fields: vec![
                EmbedField::inline("Report id", &report.id),
                EmbedField::inline("Player", &report.playername),
                EmbedField::inline("Community", &report.community_id),
                EmbedField::inline("Rule", &rule.shortdesc),
                EmbedField::inline("Filed by", &admin.tag()),
                EmbedField::inline("Total open reports", &total_reports.to_string()),
                EmbedField::inline(
                    "Reporting communities",
                    &total_communities.to_string(),
                ),
            ],
        };
        self.queue.push(embed).await;
        self.broadcaster.publish(ApiEvent::Report {
            report,
            rule,
            admin,
            total_reports,
            total_communities,
        });
    }

    pub async fn report_revoked(
        &self,
        revocation: Report,
        rule: Rule,
        admin: ExternalUser,
        total_reports: i64,
        total_communities: i64,
    ) {
        let embed = Embed {
            title: "Report revoked".into(),
            description: format!(
                "report `{}` on `{}` was withdrawn",
                revocation.id, revocation.playername
            ),
            color: COLOR_REVOCATION,
            timestamp: now_rfc3339(),
            fields: vec![
                EmbedField::inline("Report id", &revocation.id),
                EmbedField::inline("Player", &revocation.playername),
                EmbedField::inline("Community", &revocation.community_id),
                EmbedField::inline("Revoked by", &admin.tag()),
                EmbedField::inline("Remaining open reports", &total_reports.to_string()),
            ],
        };
        self.queue.push(embed).await;
        self.broadcaster.publish(ApiEvent::Revocation {
            revocation,
            rule,
            admin,
            total_reports,
            total_communities,
        });
    }

    pub async fn rule_created(&self, rule: Rule) {
        self.queue
            .push(Embed {
                title: "Rule created".into(),
                description: format!("`{}`: {}", rule.id, rule.shortdesc),
                color: COLOR_INFO,
                timestamp: now_rfc3339(),
                fields: vec![],
            })
            .await;
        self.broadcaster.publish(ApiEvent::RuleCreated { rule });
    }

    pub async fn rule_removed(&self, rule: Rule) {
        self.queue
            .push(Embed {
                title: "Rule removed".into(),
                description: format!("`{}`: {}", rule.id, rule.shortdesc),
                color: COLOR_INFO,
                timestamp: now_rfc3339(),
                fields: vec![],
            })
            .await;
        self.broadcaster.publish(ApiEvent::RuleRemoved { rule });
    }

    pub async fn community_created(&self, community: Community) {
        self.queue
            .push(Embed {
                title: "Community created".into(),
                description: format!("`{}` ({})", community.name, community.id),
                color: COLOR_INFO,
                timestamp: now_rfc3339(),
                fields: vec![],
            })
            .await;
        self.broadcaster
            .publish(ApiEvent::CommunityCreated { community });
    }

    pub async fn community_removed(&self, community: Community) {
        self.queue
            .push(Embed {
                title: "Community removed".into(),
                description: format!("`{}` ({})", community.name, community.id),
                color: COLOR_INFO,
                timestamp: now_rfc3339(),
                fields: vec![],
            })
            .await;
        self.broadcaster
            .publish(ApiEvent::CommunityRemoved { community });
    }

    pub fn guild_config_updated(&self, config: GuildConfig) {
        self.broadcaster.publish(ApiEvent::GuildConfig { config });
    }

    /// Re-sync notifications after a cascade touch many guilds at once.
    /// They are paced on a fixed ticker so subscribers do not all refetch
    /// simultaneously. Detached from the request that triggered the
    /// cascade; each publish happens inside the pacing loop.
    pub fn notify_guild_configs(&self, configs: Vec<GuildConfig>) {
        if configs.is_empty() {
            return;
        }
        let broadcaster = self.broadcaster.clone();
        tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval(Duration::from_millis(GUILD_NOTIFY_PACE_MS));
            for config in configs {
                ticker.tick().await;
                broadcaster.publish(ApiEvent::GuildConfig { config });
            }
        });
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}
