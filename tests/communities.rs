//! Community management, guild configs, and webhook registration.

mod common;

use axum::http::StatusCode;
use common::{app, VALID_ADMIN_ID};
use serde_json::json;

// ===========================================================================
// Communities (master scope)
// ===========================================================================

#[tokio::test]
async fn create_community_returns_working_key() {
    let app = app().await;
    let bootstrap = app.create_community("com_boot").await;
    let master = app.master_key(&bootstrap.id);

    let created = app
        .post_json(
            "/communities",
            json!({ "name": "Fresh Community", "contact": VALID_ADMIN_ID }),
            Some(&master),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK);
    let body = created.json();
    let community_id = body["community"]["id"].as_str().unwrap().to_string();
    assert_eq!(community_id.len(), 7);
    let api_key = body["apiKey"].as_str().unwrap().to_string();

    // the minted key immediately authenticates as the new community
    let rule = app.create_rule("no trolling").await;
    let config = app
        .patch_json(
            "/guilds/guild_com_boot",
            json!({ "ruleFilters": [rule] }),
            Some(&api_key),
        )
        .await;
    assert_eq!(config.status, StatusCode::OK);
    assert_eq!(
        config.json()["communityId"].as_str().unwrap(),
        community_id
    );
}

#[tokio::test]
async fn create_community_rejects_unknown_contact() {
    let app = app().await;
    let bootstrap = app.create_community("com_badcontact").await;
    let master = app.master_key(&bootstrap.id);

    let resp = app
        .post_json(
            "/communities",
            json!({ "name": "Ghost Community", "contact": "nobody" }),
            Some(&master),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_message(), "invalid contact");
}

#[tokio::test]
async fn invalidate_kills_previously_minted_keys() {
    let app = app().await;
    let bootstrap = app.create_community("com_invalidate_boot").await;
    let master = app.master_key(&bootstrap.id);
    let victim = app.create_community("com_invalidate").await;

    let resp = app
        .post_json(
            &format!("/communities/{}/invalidate", victim.id),
            json!({}),
            Some(&master),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    let rejected = app
        .post_json(
            "/reports",
            json!({
                "playername": "x",
                "brokenRuleId": "zzzzzz=",
                "adminId": VALID_ADMIN_ID,
            }),
            Some(&victim.api_key),
        )
        .await;
    assert_eq!(rejected.status, StatusCode::UNAUTHORIZED);
    assert_eq!(rejected.error_message(), "token revoked");

    // a key minted after the rotation works again (give the issue
    // instant a full second of clearance from the cutoff)
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
    let fresh = app
        .post_json(
            &format!("/communities/{}/apikey", victim.id),
            json!({ "audience": "private" }),
            Some(&master),
        )
        .await;
    assert_eq!(fresh.status, StatusCode::OK);
    let fresh_key = fresh.json()["apiKey"].as_str().unwrap().to_string();

    let config = app
        .patch_json(
            "/guilds/guild_com_invalidate",
            json!({}),
            Some(&fresh_key),
        )
        .await;
    assert_eq!(config.status, StatusCode::OK);
}

#[tokio::test]
async fn remove_community_cascades() {
    let app = app().await;
    let bootstrap = app.create_community("com_remove_boot").await;
    let master = app.master_key(&bootstrap.id);
    let doomed = app.create_community("com_remove").await;
    let bystander = app.create_community("com_bystander").await;
    let rule = app.create_rule("no griefing allies").await;
    app.link_guild(&doomed.id, "guild_com_remove", &[&rule]).await;
    let report = app.file_report(&doomed, "DoomedPlayer", &rule).await;

    // the bystander trusts the doomed community
    sqlx::query(
        "INSERT INTO guild_configs (guild_id, community_id, trusted_communities) \
         VALUES ($1, $2, $3)",
    )
    .bind("guild_com_bystander")
    .bind(&bystander.id)
    .bind(vec![bystander.id.clone(), doomed.id.clone()])
    .execute(app.state.db.pool())
    .await
    .expect("insert bystander config failed");

    let resp = app
        .delete(&format!("/communities/{}", doomed.id), Some(&master))
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    // its reports are gone
    let orphan = app
        .get(&format!("/reports/{}", report["id"].as_str().unwrap()), None)
        .await;
    assert!(orphan.json().is_null());

    // its own guild config is gone
    let own_config = app.get("/guilds/guild_com_remove", None).await;
    assert!(own_config.json().is_null());

    // the bystander's trust entry was pruned
    let bystander_config = app.get("/guilds/guild_com_bystander", None).await;
    let trusted = bystander_config.json()["trustedCommunities"].clone();
    assert!(!trusted
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c.as_str() == Some(doomed.id.as_str())));

    // and its keys no longer resolve
    let rejected = app
        .patch_json("/guilds/guild_com_remove", json!({}), Some(&doomed.api_key))
        .await;
    assert_eq!(rejected.status, StatusCode::UNAUTHORIZED);
    assert_eq!(rejected.error_message(), "community not found");
}

// ===========================================================================
// Guild configs
// ===========================================================================

#[tokio::test]
async fn guild_config_set_and_fetch() {
    let app = app().await;
    let community = app.create_community("cfg_set").await;
    let rule = app.create_rule("no alt accounts").await;

    let set = app
        .patch_json(
            "/guilds/guild_cfg_set",
            json!({
                "ruleFilters": [rule, rule],
                "trustedCommunities": [community.id],
                "roles": { "reports": "123456789" },
            }),
            Some(&community.api_key),
        )
        .await;
    assert_eq!(set.status, StatusCode::OK);
    let body = set.json();
    // duplicates collapse; key material never appears
    assert_eq!(body["ruleFilters"].as_array().unwrap().len(), 1);
    assert!(body.get("apiKeyMaterial").is_none());
    assert_eq!(body["roles"]["reports"], "123456789");

    let fetched = app.get("/guilds/guild_cfg_set", None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(
        fetched.json()["communityId"].as_str().unwrap(),
        community.id
    );
    assert!(fetched.json().get("apiKeyMaterial").is_none());
}

#[tokio::test]
async fn guild_config_is_owned_by_first_claimer() {
    let app = app().await;
    let owner = app.create_community("cfg_owner").await;
    let intruder = app.create_community("cfg_intruder").await;

    let claim = app
        .patch_json("/guilds/guild_cfg_owned", json!({}), Some(&owner.api_key))
        .await;
    assert_eq!(claim.status, StatusCode::OK);

    let takeover = app
        .patch_json(
            "/guilds/guild_cfg_owned",
            json!({ "ruleFilters": [] }),
            Some(&intruder.api_key),
        )
        .await;
    assert_eq!(takeover.status, StatusCode::FORBIDDEN);
    assert_eq!(takeover.error_message(), "access denied");
}

#[tokio::test]
async fn unknown_guild_config_is_null() {
    let app = app().await;

    let resp = app.get("/guilds/guild_never_configured", None).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.json().is_null());
}

#[tokio::test]
async fn trust_store_derived_queries() {
    let app = app().await;
    let community = app.create_community("cfg_queries").await;
    let rule = app.create_rule("no inventory scamming").await;
    app.link_guild(&community.id, "guild_cfg_queries", &[&rule]).await;

    let service =
        aegis::app::guild_configs::GuildConfigService::new(app.state.db.clone());

    let trusting = service
        .find_by_trusted_community(&community.id)
        .await
        .expect("find_by_trusted_community failed");
    assert!(trusting
        .iter()
        .any(|config| config.guild_id == "guild_cfg_queries"));

    let filtering = service
        .find_by_rule_filter(&rule)
        .await
        .expect("find_by_rule_filter failed");
    assert_eq!(filtering.len(), 1);
    assert_eq!(filtering[0].guild_id, "guild_cfg_queries");

    let none = service
        .find_by_rule_filter("zzzzzz=")
        .await
        .expect("find_by_rule_filter failed");
    assert!(none.is_empty());
}

// ===========================================================================
// Webhooks
// ===========================================================================

#[tokio::test]
async fn webhook_register_and_remove() {
    let app = app().await;

    let added = app
        .post_json(
            "/webhooks",
            json!({
                "id": "111111111111111111",
                "token": "hook-token-one",
                "guildId": "guild_webhook_a",
            }),
            None,
        )
        .await;
    assert_eq!(added.status, StatusCode::OK);
    assert_eq!(added.json()["guildId"], "guild_webhook_a");

    // one webhook per guild
    let duplicate = app
        .post_json(
            "/webhooks",
            json!({
                "id": "222222222222222222",
                "token": "hook-token-two",
                "guildId": "guild_webhook_a",
            }),
            None,
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.error_message(), "guild already has a webhook");

    let removed = app
        .delete_json(
            "/webhooks",
            json!({ "id": "111111111111111111", "token": "hook-token-one" }),
            None,
        )
        .await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.json()["removed"], true);

    let gone = app
        .delete_json(
            "/webhooks",
            json!({ "id": "111111111111111111", "token": "hook-token-one" }),
            None,
        )
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.error_message(), "webhook not found");
}
