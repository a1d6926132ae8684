//! Outbound chat-ops channels. Each one delivers a booking summary to the
//! owner through a different bot API; every channel is attempted
//! independently of its siblings.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;

use super::ChatChannel;
use crate::models::normalize_phone;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// WhatsApp messages via the free CallMeBot relay.
pub struct CallMeBot {
    api_key: String,
    owner_phone: String,
    client: reqwest::Client,
}

impl CallMeBot {
    pub fn new(api_key: String, owner_phone: String) -> Self {
        Self {
            api_key,
            owner_phone: normalize_phone(&owner_phone),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ChatChannel for CallMeBot {
    fn name(&self) -> &'static str {
        "callmebot"
    }

    async fn send(&self, message: &str) -> anyhow::Result<()> {
        self.client
            .get("https://api.callmebot.com/whatsapp.php")
            .query(&[
                ("phone", self.owner_phone.as_str()),
                ("text", message),
                ("apikey", self.api_key.as_str()),
            ])
            .timeout(HTTP_TIMEOUT)
            .send()
            .await
            .context("failed to reach CallMeBot")?
            .error_for_status()
            .context("CallMeBot returned error")?;

        Ok(())
    }
}

/// WhatsApp Business Cloud API (Meta).
pub struct WhatsAppCloud {
    access_token: String,
    phone_number_id: String,
    owner_phone: String,
    client: reqwest::Client,
}

impl WhatsAppCloud {
    pub fn new(access_token: String, phone_number_id: String, owner_phone: String) -> Self {
        Self {
            access_token,
            phone_number_id,
            owner_phone: normalize_phone(&owner_phone),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ChatChannel for WhatsAppCloud {
    fn name(&self) -> &'static str {
        "whatsapp-cloud"
    }

    async fn send(&self, message: &str) -> anyhow::Result<()> {
        let url = format!(
            "https://graph.facebook.com/v18.0/{}/messages",
            self.phone_number_id
        );

        self.client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({
                "messaging_product": "whatsapp",
                "to": self.owner_phone,
                "type": "text",
                "text": { "body": message },
            }))
            .timeout(HTTP_TIMEOUT)
            .send()
            .await
            .context("failed to reach WhatsApp Cloud API")?
            .error_for_status()
            .context("WhatsApp Cloud API returned error")?;

        Ok(())
    }
}

/// Telegram bot messages to a fixed chat.
pub struct TelegramBot {
    bot_token: String,
    chat_id: String,
    client: reqwest::Client,
}

impl TelegramBot {
    pub fn new(bot_token: String, chat_id: String) -> Self {
        Self {
            bot_token,
            chat_id,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ChatChannel for TelegramBot {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, message: &str) -> anyhow::Result<()> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);

        self.client
            .post(&url)
            .json(&serde_json::json!({
                "chat_id": self.chat_id,
                "text": message,
            }))
            .timeout(HTTP_TIMEOUT)
            .send()
            .await
            .context("failed to reach Telegram")?
            .error_for_status()
            .context("Telegram API returned error")?;

        Ok(())
    }
}
