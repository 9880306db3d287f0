//! Rule management: master-scoped CRUD, removal and merge cascades.

mod common;

use axum::http::StatusCode;
use common::{app, VALID_ADMIN_ID};
use serde_json::json;

#[tokio::test]
async fn create_and_fetch_rule() {
    let app = app().await;
    let community = app.create_community("rule_create").await;
    let master = app.master_key(&community.id);

    let created = app
        .post_json(
            "/rules",
            json!({ "shortdesc": "no doxxing", "longdesc": "personal info stays private" }),
            Some(&master),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK);
    let rule_id = created.json()["id"].as_str().unwrap().to_string();
    assert_eq!(rule_id.len(), 7);

    let fetched = app.get(&format!("/rules/{}", rule_id), None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.json()["shortdesc"], "no doxxing");

    let listed = app.get("/rules", None).await;
    assert!(listed
        .json()
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r["id"] == rule_id.as_str()));
}

#[tokio::test]
async fn create_rule_requires_shortdesc() {
    let app = app().await;
    let community = app.create_community("rule_noshort").await;
    let master = app.master_key(&community.id);

    let resp = app
        .post_json(
            "/rules",
            json!({ "shortdesc": "  ", "longdesc": "whatever" }),
            Some(&master),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_message(), "shortdesc is required");
}

#[tokio::test]
async fn remove_rule_cascades() {
    let app = app().await;
    let community = app.create_community("rule_remove").await;
    let master = app.master_key(&community.id);
    let rule = app.create_rule("no lag machines").await;
    app.link_guild(&community.id, "guild_rule_remove", &[&rule]).await;
    let report = app.file_report(&community, "CascadePlayer", &rule).await;

    let resp = app.delete(&format!("/rules/{}", rule), Some(&master)).await;
    assert_eq!(resp.status, StatusCode::OK);

    // the rule is gone
    let fetched = app.get(&format!("/rules/{}", rule), None).await;
    assert!(fetched.json().is_null());

    // its reports went with it
    let orphan = app
        .get(&format!("/reports/{}", report["id"].as_str().unwrap()), None)
        .await;
    assert!(orphan.json().is_null());

    // and the guild filter entry was pruned
    let config = app.get("/guilds/guild_rule_remove", None).await;
    let filters = config.json()["ruleFilters"].clone();
    assert!(!filters
        .as_array()
        .unwrap()
        .iter()
        .any(|f| f.as_str() == Some(rule.as_str())));
}

#[tokio::test]
async fn remove_unknown_rule_is_not_found() {
    let app = app().await;
    let community = app.create_community("rule_remove404").await;
    let master = app.master_key(&community.id);

    let resp = app.delete("/rules/zzzzzz=", Some(&master)).await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.error_message(), "rule not found");
}

#[tokio::test]
async fn merge_rule_repoints_reports_and_filters() {
    let app = app().await;
    let community = app.create_community("rule_merge").await;
    let master = app.master_key(&community.id);
    let target = app.create_rule("no harassment").await;
    let source = app.create_rule("no bullying").await;
    app.link_guild(&community.id, "guild_rule_merge", &[&source]).await;
    let report = app.file_report(&community, "MergePlayer", &source).await;

    let resp = app
        .patch_json(
            &format!("/rules/{}/merge/{}", source, target),
            json!({}),
            Some(&master),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["id"].as_str().unwrap(), target);

    // the report now points at the target rule
    let moved = app
        .get(&format!("/reports/{}", report["id"].as_str().unwrap()), None)
        .await;
    assert_eq!(moved.json()["brokenRuleId"].as_str().unwrap(), target);

    // the filter swapped source for target
    let config = app.get("/guilds/guild_rule_merge", None).await;
    let filters = config.json()["ruleFilters"].clone();
    let filters = filters.as_array().unwrap();
    assert!(filters.iter().any(|f| f.as_str() == Some(target.as_str())));
    assert!(!filters.iter().any(|f| f.as_str() == Some(source.as_str())));

    // the source rule is gone
    let gone = app.get(&format!("/rules/{}", source), None).await;
    assert!(gone.json().is_null());
}

#[tokio::test]
async fn merge_does_not_duplicate_target_filter() {
    let app = app().await;
    let community = app.create_community("rule_merge_dup").await;
    let master = app.master_key(&community.id);
    let target = app.create_rule("no racism").await;
    let source = app.create_rule("no hate speech").await;
    app.link_guild(&community.id, "guild_rule_merge_dup", &[&source, &target])
        .await;

    let resp = app
        .patch_json(
            &format!("/rules/{}/merge/{}", source, target),
            json!({}),
            Some(&master),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    let config = app.get("/guilds/guild_rule_merge_dup", None).await;
    let filters = config.json()["ruleFilters"].clone();
    let filters = filters.as_array().unwrap();
    assert_eq!(
        filters
            .iter()
            .filter(|f| f.as_str() == Some(target.as_str()))
            .count(),
        1
    );
    assert!(!filters.iter().any(|f| f.as_str() == Some(source.as_str())));
}

#[tokio::test]
async fn merge_with_unknown_target_is_not_found() {
    let app = app().await;
    let community = app.create_community("rule_merge404").await;
    let master = app.master_key(&community.id);
    let source = app.create_rule("no advertising").await;

    let resp = app
        .patch_json(
            &format!("/rules/{}/merge/zzzzzz=", source),
            json!({}),
            Some(&master),
        )
        .await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.error_message(), "rule not found");
}

#[tokio::test]
async fn report_creation_needs_rule_filter_even_after_unrelated_link() {
    let app = app().await;
    let community = app.create_community("rule_filterchk").await;
    let rule = app.create_rule("no smurfing").await;
    // linked guild filters a different rule entirely
    let other = app.create_rule("no boosting").await;
    app.link_guild(&community.id, "guild_rule_filterchk", &[&other]).await;

    let resp = app
        .post_json(
            "/reports",
            json!({
                "playername": "FilterChk",
                "brokenRuleId": rule,
                "adminId": VALID_ADMIN_ID,
            }),
            Some(&community.api_key),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_message(), "rule not filtered by your community");
}
