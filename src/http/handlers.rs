use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::app::auth::{key_material_digest, ApiKeyService, Scope};
use crate::app::communities::CommunityService;
use crate::app::events::EventService;
use crate::app::guild_configs::GuildConfigService;
use crate::app::profiles::ProfileService;
use crate::app::reports::{CreateReport, ReportService};
use crate::app::rules::RuleService;
use crate::app::webhooks::WebhookService;
use crate::domain::community::{Community, GuildConfig, GuildRoles};
use crate::domain::profile::Profile;
use crate::domain::report::Report;
use crate::domain::rule::Rule;
use crate::domain::webhook::Webhook;
use crate::http::{ApiError, AuthCommunity, MasterAuth};
use crate::infra::discord::ExternalUser;
use crate::AppState;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.db.ping().await.is_ok() {
        "ok"
    } else {
        "degraded"
    };
    Json(HealthResponse { status })
}

fn events(state: &AppState) -> EventService {
    EventService::new(state.broadcaster.clone(), state.webhook_queue.clone())
}

/// Admin ids must name a real external user; anything else is a caller
/// mistake, while a directory outage is ours.
async fn resolve_admin(state: &AppState, admin_id: &str) -> Result<ExternalUser, ApiError> {
    match state.resolver.resolve(admin_id).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(ApiError::bad_request("invalid admin")),
        Err(err) => {
            tracing::error!(error = ?err, "user directory lookup failed");
            Err(ApiError::internal("failed to validate admin"))
        }
    }
}

// ===========================================================================
// Reports
// ===========================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub playername: String,
    pub broken_rule_id: String,
    pub admin_id: String,
    #[serde(default)]
    pub proof: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub automated: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub reported_time: Option<OffsetDateTime>,
}

pub async fn create_report(
    State(state): State<AppState>,
    auth: AuthCommunity,
    Json(payload): Json<CreateReportRequest>,
) -> Result<Json<Report>, ApiError> {
    if payload.playername.trim().is_empty() {
        return Err(ApiError::bad_request("playername is required"));
    }
    if payload.admin_id.trim().is_empty() {
        return Err(ApiError::bad_request("adminId is required"));
    }
    if !payload.proof.is_empty() && url::Url::parse(&payload.proof).is_err() {
        return Err(ApiError::bad_request("proof must be a URL"));
    }

    let rule = RuleService::new(state.db.clone())
        .get(&payload.broken_rule_id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to look up rule");
            ApiError::internal("failed to create report")
        })?
        .ok_or_else(|| ApiError::bad_request("unknown rule"))?;

    let admin = resolve_admin(&state, &payload.admin_id).await?;

    let filters = GuildConfigService::new(state.db.clone())
        .community_filters_rule(&auth.community.id, &payload.broken_rule_id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to check rule filters");
            ApiError::internal("failed to create report")
        })?;
    if !filters {
        return Err(ApiError::bad_request("rule not filtered by your community"));
    }

    let service = ReportService::new(state.db.clone());
    let input = CreateReport {
        playername: payload.playername,
        broken_rule_id: payload.broken_rule_id,
        proof: payload.proof,
        description: payload.description,
        automated: payload.automated,
        reported_time: payload
            .reported_time
            .unwrap_or_else(OffsetDateTime::now_utc),
        admin_id: payload.admin_id,
    };
    let report = service
        .create(&auth.community.id, &input)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to create report");
            ApiError::internal("failed to create report")
        })?;

    // Cross-community tally; a failure here only degrades the event.
    match service.player_tally(&report.playername).await {
        Ok(tally) => {
            events(&state)
                .report_created(
                    report.clone(),
                    rule,
                    admin,
                    tally.total_reports,
                    tally.total_communities,
                )
                .await;
        }
        Err(err) => {
            tracing::warn!(error = ?err, "skipping report notification");
        }
    }

    Ok(Json(report))
}

pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Report>>, ApiError> {
    let report = ReportService::new(state.db.clone())
        .get(&id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to fetch report");
            ApiError::internal("failed to fetch report")
        })?;

    Ok(Json(report))
}

pub async fn list_reports_by_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Report>>, ApiError> {
    let reports = ReportService::new(state.db.clone())
        .list_by_rule(&id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to fetch reports");
            ApiError::internal("failed to fetch reports")
        })?;

    Ok(Json(reports))
}

pub async fn get_player_reports(
    State(state): State<AppState>,
    Path(playername): Path<String>,
) -> Result<Json<Vec<Report>>, ApiError> {
    let reports = ReportService::new(state.db.clone())
        .open_by_player(&playername)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to fetch reports");
            ApiError::internal("failed to fetch reports")
        })?;

    Ok(Json(reports))
}

pub async fn reports_modified_since(
    State(state): State<AppState>,
    Path(timestamp): Path<String>,
) -> Result<Json<Vec<Report>>, ApiError> {
    let since = OffsetDateTime::parse(&timestamp, &Rfc3339)
        .map_err(|_| ApiError::bad_request("invalid timestamp"))?;

    let reports = ReportService::new(state.db.clone())
        .modified_since(since)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to fetch reports");
            ApiError::internal("failed to fetch reports")
        })?;

    Ok(Json(reports))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeReportRequest {
    pub report_id: String,
    pub admin_id: String,
}

pub async fn revoke_report(
    State(state): State<AppState>,
    auth: AuthCommunity,
    Json(payload): Json<RevokeReportRequest>,
) -> Result<Json<Report>, ApiError> {
    let admin = resolve_admin(&state, &payload.admin_id).await?;

    let service = ReportService::new(state.db.clone());
    let existing = service
        .get(&payload.report_id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to fetch report");
            ApiError::internal("failed to revoke report")
        })?
        .ok_or_else(|| ApiError::not_found("report not found"))?;

    if existing.community_id != auth.community.id {
        return Err(ApiError::forbidden("access denied"));
    }

    let revoked = service
        .revoke(&payload.report_id, &auth.community.id, &payload.admin_id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to revoke report");
            ApiError::internal("failed to revoke report")
        })?
        .ok_or_else(|| ApiError::conflict("report already revoked"))?;

    fan_out_revocations(&state, &admin, std::slice::from_ref(&revoked)).await;

    Ok(Json(revoked))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRevokeRequest {
    pub admin_id: String,
}

pub async fn revoke_reports_by_rule(
    State(state): State<AppState>,
    auth: AuthCommunity,
    Path(id): Path<String>,
    Json(payload): Json<BatchRevokeRequest>,
) -> Result<Json<Vec<Report>>, ApiError> {
    let admin = resolve_admin(&state, &payload.admin_id).await?;

    let revoked = ReportService::new(state.db.clone())
        .revoke_by_rule(&id, &auth.community.id, &payload.admin_id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to revoke reports");
            ApiError::internal("failed to revoke reports")
        })?;

    fan_out_revocations(&state, &admin, &revoked).await;

    Ok(Json(revoked))
}

pub async fn revoke_reports_by_player(
    State(state): State<AppState>,
    auth: AuthCommunity,
    Path(playername): Path<String>,
    Json(payload): Json<BatchRevokeRequest>,
) -> Result<Json<Vec<Report>>, ApiError> {
    let admin = resolve_admin(&state, &payload.admin_id).await?;

    let revoked = ReportService::new(state.db.clone())
        .revoke_by_player(&playername, &auth.community.id, &payload.admin_id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to revoke reports");
            ApiError::internal("failed to revoke reports")
        })?;

    fan_out_revocations(&state, &admin, &revoked).await;

    Ok(Json(revoked))
}

pub async fn revoke_reports_by_admin(
    State(state): State<AppState>,
    auth: AuthCommunity,
    Path(id): Path<String>,
    Json(payload): Json<BatchRevokeRequest>,
) -> Result<Json<Vec<Report>>, ApiError> {
    let admin = resolve_admin(&state, &payload.admin_id).await?;

    let revoked = ReportService::new(state.db.clone())
        .revoke_by_admin(&id, &auth.community.id, &payload.admin_id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to revoke reports");
            ApiError::internal("failed to revoke reports")
        })?;

    fan_out_revocations(&state, &admin, &revoked).await;

    Ok(Json(revoked))
}

/// One revocation event per affected report, each with a fresh tally.
/// Fan-out problems are logged and swallowed; the revocation itself has
/// already committed.
async fn fan_out_revocations(state: &AppState, admin: &ExternalUser, revoked: &[Report]) {
    let reports = ReportService::new(state.db.clone());
    let rules = RuleService::new(state.db.clone());
    let events = events(state);

    for report in revoked {
        let tally = match reports.player_tally(&report.playername).await {
            Ok(tally) => tally,
            Err(err) => {
                tracing::warn!(error = ?err, report_id = %report.id, "skipping revocation notification");
                continue;
            }
        };
        let rule = match rules.get(&report.broken_rule_id).await {
            Ok(Some(rule)) => rule,
            Ok(None) => {
                tracing::warn!(report_id = %report.id, "revoked report references missing rule");
                continue;
            }
            Err(err) => {
                tracing::warn!(error = ?err, report_id = %report.id, "skipping revocation notification");
                continue;
            }
        };
        events
            .report_revoked(
                report.clone(),
                rule,
                admin.clone(),
                tally.total_reports,
                tally.total_communities,
            )
            .await;
    }
}

// ===========================================================================
// Profiles
// ===========================================================================

pub async fn fetch_all_profiles(
    State(state): State<AppState>,
    Path(playername): Path<String>,
) -> Result<Json<Vec<Profile>>, ApiError> {
    let profiles = ProfileService::new(state.db.clone())
        .fetch_by_player(&playername)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to fetch profiles");
            ApiError::internal("failed to fetch profiles")
        })?;

    Ok(Json(profiles))
}

pub async fn fetch_community_profile(
    State(state): State<AppState>,
    Path((playername, community_id)): Path<(String, String)>,
) -> Result<Json<Option<Profile>>, ApiError> {
    let profile = ProfileService::new(state.db.clone())
        .fetch_by_player_and_community(&playername, &community_id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to fetch profile");
            ApiError::internal("failed to fetch profile")
        })?;

    Ok(Json(profile))
}

// ===========================================================================
// Rules
// ===========================================================================

pub async fn list_rules(
    State(state): State<AppState>,
) -> Result<Json<Vec<Rule>>, ApiError> {
    let rules = RuleService::new(state.db.clone()).list().await.map_err(|err| {
        tracing::error!(error = ?err, "failed to list rules");
        ApiError::internal("failed to list rules")
    })?;

    Ok(Json(rules))
}

pub async fn get_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Rule>>, ApiError> {
    let rule = RuleService::new(state.db.clone()).get(&id).await.map_err(|err| {
        tracing::error!(error = ?err, "failed to fetch rule");
        ApiError::internal("failed to fetch rule")
    })?;

    Ok(Json(rule))
}

#[derive(Deserialize)]
pub struct CreateRuleRequest {
    pub shortdesc: String,
    pub longdesc: String,
}

pub async fn create_rule(
    State(state): State<AppState>,
    _auth: MasterAuth,
    Json(payload): Json<CreateRuleRequest>,
) -> Result<Json<Rule>, ApiError> {
    if payload.shortdesc.trim().is_empty() {
        return Err(ApiError::bad_request("shortdesc is required"));
    }

    let rule = RuleService::new(state.db.clone())
        .create(&payload.shortdesc, &payload.longdesc)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to create rule");
            ApiError::internal("failed to create rule")
        })?;

    events(&state).rule_created(rule.clone()).await;

    Ok(Json(rule))
}

pub async fn remove_rule(
    State(state): State<AppState>,
    _auth: MasterAuth,
    Path(id): Path<String>,
) -> Result<Json<Rule>, ApiError> {
    let (rule, affected) = RuleService::new(state.db.clone())
        .remove(&id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to remove rule");
            ApiError::internal("failed to remove rule")
        })?
        .ok_or_else(|| ApiError::not_found("rule not found"))?;

    let events = events(&state);
    events.rule_removed(rule.clone()).await;
    events.notify_guild_configs(affected);

    Ok(Json(rule))
}

pub async fn merge_rule(
    State(state): State<AppState>,
    _auth: MasterAuth,
    Path((id, target_id)): Path<(String, String)>,
) -> Result<Json<Rule>, ApiError> {
    if id == target_id {
        return Err(ApiError::bad_request("cannot merge a rule into itself"));
    }

    let (source, target, affected) = RuleService::new(state.db.clone())
        .merge(&id, &target_id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to merge rule");
            ApiError::internal("failed to merge rule")
        })?
        .ok_or_else(|| ApiError::not_found("rule not found"))?;

    let events = events(&state);
    events.rule_removed(source).await;
    events.notify_guild_configs(affected);

    Ok(Json(target))
}

// ===========================================================================
// Communities
// ===========================================================================

pub async fn list_communities(
    State(state): State<AppState>,
) -> Result<Json<Vec<Community>>, ApiError> {
    let communities = CommunityService::new(state.db.clone())
        .list()
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to list communities");
            ApiError::internal("failed to list communities")
        })?;

    Ok(Json(communities))
}

pub async fn get_community(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Community>>, ApiError> {
    let community = CommunityService::new(state.db.clone())
        .get(&id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to fetch community");
            ApiError::internal("failed to fetch community")
        })?;

    Ok(Json(community))
}

#[derive(Deserialize)]
pub struct CreateCommunityRequest {
    pub name: String,
    pub contact: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommunityResponse {
    pub community: Community,
    pub api_key: String,
}

pub async fn create_community(
    State(state): State<AppState>,
    _auth: MasterAuth,
    Json(payload): Json<CreateCommunityRequest>,
) -> Result<Json<CreateCommunityResponse>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    match state.resolver.resolve(&payload.contact).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err(ApiError::bad_request("invalid contact")),
        Err(err) => {
            tracing::error!(error = ?err, "user directory lookup failed");
            return Err(ApiError::internal("failed to validate contact"));
        }
    }

    let community = CommunityService::new(state.db.clone())
        .create(&payload.name, &payload.contact)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to create community");
            ApiError::internal("failed to create community")
        })?;

    let api_key = ApiKeyService::new(state.db.clone(), state.api_key)
        .create_api_key(&community.id, Scope::Private)
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to mint api key");
            ApiError::internal("failed to create community")
        })?;

    events(&state).community_created(community.clone()).await;

    Ok(Json(CreateCommunityResponse { community, api_key }))
}

pub async fn remove_community(
    State(state): State<AppState>,
    _auth: MasterAuth,
    Path(id): Path<String>,
) -> Result<Json<Community>, ApiError> {
    let (community, affected) = CommunityService::new(state.db.clone())
        .remove(&id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to remove community");
            ApiError::internal("failed to remove community")
        })?
        .ok_or_else(|| ApiError::not_found("community not found"))?;

    let events = events(&state);
    events.community_removed(community.clone()).await;
    events.notify_guild_configs(affected);

    Ok(Json(community))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApikeyRequest {
    #[serde(default = "default_audience")]
    pub audience: String,
    #[serde(default)]
    pub guild_id: Option<String>,
}

fn default_audience() -> String {
    "private".to_string()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApikeyResponse {
    pub api_key: String,
}

pub async fn create_community_apikey(
    State(state): State<AppState>,
    _auth: MasterAuth,
    Path(id): Path<String>,
    Json(payload): Json<CreateApikeyRequest>,
) -> Result<Json<CreateApikeyResponse>, ApiError> {
    let scope = Scope::parse(&payload.audience)
        .ok_or_else(|| ApiError::bad_request("invalid audience"))?;

    let community = CommunityService::new(state.db.clone())
        .get(&id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to fetch community");
            ApiError::internal("failed to mint api key")
        })?
        .ok_or_else(|| ApiError::not_found("community not found"))?;

    let api_key = ApiKeyService::new(state.db.clone(), state.api_key)
        .create_api_key(&community.id, scope)
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to mint api key");
            ApiError::internal("failed to mint api key")
        })?;

    if let Some(guild_id) = payload.guild_id.as_deref() {
        let stored = GuildConfigService::new(state.db.clone())
            .set_api_key_material(guild_id, &key_material_digest(&api_key))
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, "failed to store key material");
                ApiError::internal("failed to mint api key")
            })?;
        if !stored {
            return Err(ApiError::not_found("guild config not found"));
        }
    }

    Ok(Json(CreateApikeyResponse { api_key }))
}

pub async fn invalidate_community_tokens(
    State(state): State<AppState>,
    _auth: MasterAuth,
    Path(id): Path<String>,
) -> Result<Json<Community>, ApiError> {
    let community = CommunityService::new(state.db.clone())
        .invalidate_tokens(&id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to invalidate tokens");
            ApiError::internal("failed to invalidate tokens")
        })?
        .ok_or_else(|| ApiError::not_found("community not found"))?;

    Ok(Json(community))
}

// ===========================================================================
// Guild configs
// ===========================================================================

pub async fn get_guild_config(
    State(state): State<AppState>,
    Path(guild_id): Path<String>,
) -> Result<Json<Option<GuildConfig>>, ApiError> {
    let config = GuildConfigService::new(state.db.clone())
        .get(&guild_id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to fetch guild config");
            ApiError::internal("failed to fetch guild config")
        })?;

    Ok(Json(config))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetGuildConfigRequest {
    #[serde(default)]
    pub trusted_communities: Option<Vec<String>>,
    #[serde(default)]
    pub rule_filters: Option<Vec<String>>,
    #[serde(default)]
    pub roles: Option<GuildRoles>,
}

pub async fn set_guild_config(
    State(state): State<AppState>,
    auth: AuthCommunity,
    Path(guild_id): Path<String>,
    Json(payload): Json<SetGuildConfigRequest>,
) -> Result<Json<GuildConfig>, ApiError> {
    let service = GuildConfigService::new(state.db.clone());
    let existing = service.get(&guild_id).await.map_err(|err| {
        tracing::error!(error = ?err, "failed to fetch guild config");
        ApiError::internal("failed to update guild config")
    })?;

    // An unowned config is claimed by the acting community.
    if let Some(owner) = existing.as_ref().and_then(|config| config.community_id.as_deref())
    {
        if owner != auth.community.id {
            return Err(ApiError::forbidden("access denied"));
        }
    }

    let base = existing.unwrap_or_else(|| GuildConfig {
        guild_id: guild_id.clone(),
        community_id: None,
        api_key_material: None,
        trusted_communities: vec![auth.community.id.clone()],
        rule_filters: vec![],
        roles: GuildRoles::default(),
    });

    let config = GuildConfig {
        guild_id: guild_id.clone(),
        community_id: Some(auth.community.id.clone()),
        api_key_material: base.api_key_material.clone(),
        trusted_communities: payload
            .trusted_communities
            .unwrap_or(base.trusted_communities),
        rule_filters: payload.rule_filters.unwrap_or(base.rule_filters),
        roles: payload.roles.unwrap_or(base.roles),
    };

    let updated = service.upsert(&config).await.map_err(|err| {
        tracing::error!(error = ?err, "failed to update guild config");
        ApiError::internal("failed to update guild config")
    })?;

    CommunityService::new(state.db.clone())
        .link_guild(&auth.community.id, &guild_id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to link guild");
            ApiError::internal("failed to update guild config")
        })?;

    events(&state).guild_config_updated(updated.clone());

    Ok(Json(updated))
}

// ===========================================================================
// Webhooks
// ===========================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWebhookRequest {
    pub id: String,
    pub token: String,
    pub guild_id: String,
}

pub async fn add_webhook(
    State(state): State<AppState>,
    Json(payload): Json<AddWebhookRequest>,
) -> Result<Json<Webhook>, ApiError> {
    if payload.id.trim().is_empty() || payload.token.trim().is_empty() {
        return Err(ApiError::bad_request("id and token are required"));
    }
    if payload.guild_id.trim().is_empty() {
        return Err(ApiError::bad_request("guildId is required"));
    }

    let webhook = Webhook {
        id: payload.id,
        token: payload.token,
        guild_id: payload.guild_id,
    };
    let added = WebhookService::new(state.db.clone())
        .add(&webhook)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to add webhook");
            ApiError::internal("failed to add webhook")
        })?
        .ok_or_else(|| ApiError::conflict("guild already has a webhook"))?;

    Ok(Json(added))
}

#[derive(Deserialize)]
pub struct RemoveWebhookRequest {
    pub id: String,
    pub token: String,
}

#[derive(Serialize)]
pub struct RemoveWebhookResponse {
    pub removed: bool,
}

pub async fn remove_webhook(
    State(state): State<AppState>,
    Json(payload): Json<RemoveWebhookRequest>,
) -> Result<Json<RemoveWebhookResponse>, ApiError> {
    let removed = WebhookService::new(state.db.clone())
        .remove(&payload.id, &payload.token)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to remove webhook");
            ApiError::internal("failed to remove webhook")
        })?;

    if !removed {
        return Err(ApiError::not_found("webhook not found"));
    }
    Ok(Json(RemoveWebhookResponse { removed }))
}
