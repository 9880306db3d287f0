use axum::{routing::delete, routing::get, routing::patch, routing::post, Router};

use crate::http::{handlers, ws};
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn reports() -> Router<AppState> {
    Router::new()
        .route("/reports", post(handlers::create_report))
        .route("/reports", delete(handlers::revoke_report))
        .route("/reports/:id", get(handlers::get_report))
        .route("/reports/rule/:id", get(handlers::list_reports_by_rule))
        .route("/reports/rule/:id", delete(handlers::revoke_reports_by_rule))
        .route(
            "/reports/player/:playername",
            delete(handlers::revoke_reports_by_player),
        )
        .route("/reports/admin/:id", delete(handlers::revoke_reports_by_admin))
        .route(
            "/reports/getplayer/:playername",
            get(handlers::get_player_reports),
        )
        .route(
            "/reports/modifiedSince/:timestamp",
            get(handlers::reports_modified_since),
        )
}

pub fn profiles() -> Router<AppState> {
    Router::new()
        .route(
            "/profiles/fetchall/:playername",
            get(handlers::fetch_all_profiles),
        )
        .route(
            "/profiles/fetchcommunity/:playername/:community_id",
            get(handlers::fetch_community_profile),
        )
}

pub fn rules() -> Router<AppState> {
    Router::new()
        .route("/rules", get(handlers::list_rules))
        .route("/rules", post(handlers::create_rule))
        .route("/rules/:id", get(handlers::get_rule))
        .route("/rules/:id", delete(handlers::remove_rule))
        .route("/rules/:id/merge/:target_id", patch(handlers::merge_rule))
}

pub fn communities() -> Router<AppState> {
    Router::new()
        .route("/communities", get(handlers::list_communities))
        .route("/communities", post(handlers::create_community))
        .route("/communities/:id", get(handlers::get_community))
        .route("/communities/:id", delete(handlers::remove_community))
        .route(
            "/communities/:id/apikey",
            post(handlers::create_community_apikey),
        )
        .route(
            "/communities/:id/invalidate",
            post(handlers::invalidate_community_tokens),
        )
}

pub fn guilds() -> Router<AppState> {
    Router::new()
        .route("/guilds/:guild_id", get(handlers::get_guild_config))
        .route("/guilds/:guild_id", patch(handlers::set_guild_config))
}

pub fn webhooks() -> Router<AppState> {
    Router::new()
        .route("/webhooks", post(handlers::add_webhook))
        .route("/webhooks", delete(handlers::remove_webhook))
}

pub fn websocket() -> Router<AppState> {
    Router::new().route("/ws", get(ws::ws_handler))
}
