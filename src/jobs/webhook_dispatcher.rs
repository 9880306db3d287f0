use anyhow::Result;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::app::webhooks::WebhookService;
use crate::domain::webhook::Webhook;
use crate::infra::db::Db;
use crate::infra::webhook_queue::{Embed, WebhookQueue};

const DISPATCH_INTERVAL_SECONDS: u64 = 5;
const DISPATCH_BATCH_SIZE: usize = 10;
const DELIVERY_TIMEOUT_SECONDS: u64 = 10;

const DISCORD_WEBHOOK_BASE: &str = "https://discord.com/api/webhooks";

#[derive(Serialize)]
struct WebhookPayload<'a> {
    embeds: &'a [Embed],
}

enum Delivery {
    Sent,
    Gone,
}

/// Single consumer of the process-wide embed queue. Drains a bounded
/// batch each tick and sends it to every registered webhook; one failing
/// endpoint never blocks the rest.
pub async fn run(db: Db, queue: WebhookQueue) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(DELIVERY_TIMEOUT_SECONDS))
        .build()?;
    let service = WebhookService::new(db);

    info!("webhook dispatcher started");
    let mut ticker = tokio::time::interval(Duration::from_secs(DISPATCH_INTERVAL_SECONDS));
    loop {
        ticker.tick().await;

        let batch = queue.drain(DISPATCH_BATCH_SIZE).await;
        if batch.is_empty() {
            continue;
        }

        let webhooks = match service.list().await {
            Ok(webhooks) => webhooks,
            Err(err) => {
                warn!(error = ?err, "failed to list webhooks, dropping batch");
                continue;
            }
        };

        for webhook in webhooks {
            match deliver(&client, &webhook, &batch).await {
                Ok(Delivery::Sent) => {}
                Ok(Delivery::Gone) => {
                    // The remote end deleted it; prune instead of retrying
                    // forever.
                    info!(webhook_id = %webhook.id, "pruning deleted webhook");
                    if let Err(err) = service.remove_by_id(&webhook.id).await {
                        warn!(error = ?err, webhook_id = %webhook.id, "failed to prune webhook");
                    }
                }
                Err(err) => {
                    warn!(error = ?err, webhook_id = %webhook.id, "webhook delivery failed");
                }
            }
        }
    }
}

async fn deliver(
    client: &reqwest::Client,
    webhook: &Webhook,
    embeds: &[Embed],
) -> Result<Delivery> {
    let response = client
        .post(format!(
            "{}/{}/{}",
            DISCORD_WEBHOOK_BASE, webhook.id, webhook.token
        ))
        .json(&WebhookPayload { embeds })
        .send()
        .await?;

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Ok(Delivery::Gone);
    }
    response.error_for_status()?;
    Ok(Delivery::Sent)
}
