/*
 *     Copyright 2025 The Bandwatch Authors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use bandwatch_config::bwdaemon::Config;
use bandwatch_core::{
    error::{ErrorType, OrErr, WebhookError},
    Error, Result,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// REQUEST_TIMEOUT is the timeout of delivering a usage report.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// EMBED_COLOR is the accent color of the report embed.
const EMBED_COLOR: u32 = 0x00bfff;

/// EmbedField is one labeled value of the report embed.
#[derive(Debug, Serialize)]
struct EmbedField {
    name: &'static str,
    value: String,
    inline: bool,
}

/// Embed is the report embed of the webhook message.
#[derive(Debug, Serialize)]
struct Embed {
    title: String,
    color: u32,
    fields: Vec<EmbedField>,
    timestamp: String,
}

/// WebhookPayload is the webhook message body.
#[derive(Debug, Serialize)]
struct WebhookPayload {
    username: String,
    embeds: Vec<Embed>,
}

/// Notifier delivers the monthly usage report to the Discord webhook.
pub struct Notifier {
    /// config is the configuration of the bwdaemon.
    config: Arc<Config>,

    /// client is the http client for the webhook endpoint.
    client: reqwest::Client,
}

/// Notifier implements the usage report delivery.
impl Notifier {
    /// new creates a new Notifier.
    pub fn new(config: Arc<Config>) -> Result<Notifier> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Notifier { config, client })
    }

    /// send delivers the formatted usage values for the period. It fails if
    /// the endpoint does not acknowledge the message with a success status.
    #[instrument(skip_all)]
    pub async fn send(&self, period: &str, rx: &str, tx: &str, total: &str) -> Result<()> {
        let payload = Self::payload(
            &self.config.notifier.bot_name,
            &self.config.interface,
            period,
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            rx,
            tx,
            total,
        );

        let response = self
            .client
            .post(&self.config.notifier.discord_webhook_url)
            .json(&payload)
            .send()
            .await
            .or_context(ErrorType::DeliveryError, "deliver usage report")?;

        let status_code = response.status();
        if !status_code.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::WebhookError(WebhookError {
                message,
                status_code,
            }));
        }

        info!("usage report for period {} delivered", period);
        Ok(())
    }

    /// payload builds the webhook message body.
    fn payload(
        bot_name: &str,
        interface: &str,
        period: &str,
        timestamp: String,
        rx: &str,
        tx: &str,
        total: &str,
    ) -> WebhookPayload {
        WebhookPayload {
            username: bot_name.to_string(),
            embeds: vec![Embed {
                title: format!("{} traffic usage ({})", interface, period),
                color: EMBED_COLOR,
                timestamp,
                fields: vec![
                    EmbedField {
                        name: "Received",
                        value: rx.to_string(),
                        inline: true,
                    },
                    EmbedField {
                        name: "Transmitted",
                        value: tx.to_string(),
                        inline: true,
                    },
                    EmbedField {
                        name: "Total",
                        value: total.to_string(),
                        inline: false,
                    },
                ],
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_serializes_to_webhook_schema() {
        let payload = Notifier::payload(
            "bandwatch",
            "eth0",
            "2025-01",
            "2025-01-31T23:55:00Z".to_string(),
            "4.89 GB",
            "912.34 MB",
            "5.78 GB",
        );

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["username"], "bandwatch");

        let embed = &value["embeds"][0];
        assert_eq!(embed["title"], "eth0 traffic usage (2025-01)");
        assert_eq!(embed["color"], 0x00bfff);
        assert_eq!(embed["timestamp"], "2025-01-31T23:55:00Z");

        let fields = embed["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0]["name"], "Received");
        assert_eq!(fields[0]["value"], "4.89 GB");
        assert_eq!(fields[0]["inline"], true);
        assert_eq!(fields[1]["name"], "Transmitted");
        assert_eq!(fields[1]["inline"], true);
        assert_eq!(fields[2]["name"], "Total");
        assert_eq!(fields[2]["inline"], false);
    }
}
