//! Best-effort notification fan-out for booking lifecycle events.
//!
//! A booking creation or cancellation succeeds regardless of what happens
//! here: every channel attempt is wrapped so a failure can affect neither
//! sibling channels nor the HTTP response. The caller only gets back
//! per-channel booleans so a human can follow up manually when delivery
//! failed everywhere.

pub mod chatops;
pub mod email;
pub mod messages;

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::models::Booking;
use messages::BookingDigest;

#[async_trait]
pub trait EmailSender: Send + Sync {
    fn name(&self) -> &'static str;
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

#[async_trait]
pub trait ChatChannel: Send + Sync {
    fn name(&self) -> &'static str;
    async fn send(&self, message: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NotificationOutcome {
    pub owner_email_sent: bool,
    pub customer_email_sent: bool,
    pub chat_ops_sent: bool,
}

pub struct Notifier {
    email: Option<Box<dyn EmailSender>>,
    chat: Vec<Box<dyn ChatChannel>>,
    owner_email: String,
    owner_phone: String,
    base_url: String,
}

impl Notifier {
    pub fn new(
        email: Option<Box<dyn EmailSender>>,
        chat: Vec<Box<dyn ChatChannel>>,
        owner_email: String,
        owner_phone: String,
        base_url: String,
    ) -> Self {
        Self {
            email,
            chat,
            owner_email,
            owner_phone,
            base_url,
        }
    }

    /// Builds the channel set from whichever credentials are configured.
    /// Missing credentials degrade the matching channel to a no-op.
    pub fn from_config(config: &AppConfig) -> Self {
        let email: Option<Box<dyn EmailSender>> = if let Some(key) = &config.resend_api_key {
            tracing::info!("email notifications via Resend");
            Some(Box::new(email::ResendMailer::new(
                key.clone(),
                config.resend_from.clone(),
            )))
        } else if let (Some(host), Some(user)) = (&config.smtp_host, &config.smtp_user) {
            match email::SmtpMailer::new(host, config.smtp_port, user.clone(), config.smtp_pass.clone()) {
                Ok(mailer) => {
                    tracing::info!("email notifications via SMTP ({host})");
                    Some(Box::new(mailer))
                }
                Err(e) => {
                    tracing::warn!("SMTP transport setup failed, email disabled: {e}");
                    None
                }
            }
        } else {
            tracing::info!("no email provider configured, email notifications disabled");
            None
        };

        let mut chat: Vec<Box<dyn ChatChannel>> = vec![];
        if let Some(key) = &config.callmebot_api_key {
            if config.owner_phone.is_empty() {
                tracing::warn!("CALLMEBOT_API_KEY set but OWNER_PHONE missing, channel disabled");
            } else {
                chat.push(Box::new(chatops::CallMeBot::new(
                    key.clone(),
                    config.owner_phone.clone(),
                )));
            }
        }
        if let (Some(token), Some(id)) = (
            &config.whatsapp_access_token,
            &config.whatsapp_phone_number_id,
        ) {
            chat.push(Box::new(chatops::WhatsAppCloud::new(
                token.clone(),
                id.clone(),
                config.owner_phone.clone(),
            )));
        }
        if let (Some(token), Some(chat_id)) = (&config.telegram_bot_token, &config.telegram_chat_id)
        {
            chat.push(Box::new(chatops::TelegramBot::new(
                token.clone(),
                chat_id.clone(),
            )));
        }
        tracing::info!("{} chat-ops channel(s) configured", chat.len());

        Self {
            email,
            chat,
            owner_email: config.notification_email().to_string(),
            owner_phone: config.owner_phone.clone(),
            base_url: config.base_url.clone(),
        }
    }

    pub fn owner_phone(&self) -> &str {
        &self.owner_phone
    }

    /// Manual-fallback deep link the operator can always use, configured
    /// channels or not.
    pub fn owner_whatsapp_link(&self, message: &str) -> String {
        messages::whatsapp_link(&self.owner_phone, message)
    }

    pub async fn booking_created(&self, booking: &Booking) -> NotificationOutcome {
        let digest = BookingDigest::from(booking);
        let owner_msg = messages::owner_created_summary(&digest);

        let chat_ops_sent = self.send_chat_ops(&owner_msg).await;
        let owner_email_sent = self
            .try_email(
                &self.owner_email,
                &format!(
                    "🎀 New Booking: {} - {} [{}]",
                    digest.customer_name, digest.service, digest.reference
                ),
                &owner_msg,
            )
            .await;

        let mut customer_email_sent = false;
        if let Some(customer_email) = &booking.customer_email {
            let cancel_url = format!(
                "{}/bookings?action=cancel&id={}&phone={}",
                self.base_url,
                digest.reference,
                urlencoding::encode(&digest.customer_phone)
            );
            let body = messages::customer_confirmation(&digest, &self.owner_phone, &cancel_url);
            customer_email_sent = self
                .try_email(
                    customer_email,
                    &format!(
                        "✅ Booking Confirmed - {} [{}]",
                        digest.service, digest.reference
                    ),
                    &body,
                )
                .await;
        }

        NotificationOutcome {
            owner_email_sent,
            customer_email_sent,
            chat_ops_sent,
        }
    }

    /// Owner-facing only; the customer initiated the cancellation themselves.
    pub async fn booking_cancelled(&self, booking: &Booking) -> NotificationOutcome {
        let msg = messages::owner_cancelled_summary(booking);

        let chat_ops_sent = self.send_chat_ops(&msg).await;
        let owner_email_sent = self
            .try_email(
                &self.owner_email,
                &format!(
                    "❌ Booking Cancelled: {} - {} [{}]",
                    booking.customer_name, booking.service, booking.id
                ),
                &msg,
            )
            .await;

        NotificationOutcome {
            owner_email_sent,
            customer_email_sent: false,
            chat_ops_sent,
        }
    }

    /// Attempts every chat channel; a failure in one never stops the rest.
    /// Returns whether at least one delivery succeeded.
    pub async fn send_chat_ops(&self, message: &str) -> bool {
        if self.chat.is_empty() {
            tracing::debug!("no chat-ops channel configured, logging only");
            return false;
        }

        let mut sent = false;
        for channel in &self.chat {
            match channel.send(message).await {
                Ok(()) => {
                    tracing::info!(channel = channel.name(), "chat-ops notification sent");
                    sent = true;
                }
                Err(e) => {
                    tracing::warn!(channel = channel.name(), "chat-ops notification failed: {e}");
                }
            }
        }
        sent
    }

    async fn try_email(&self, to: &str, subject: &str, body: &str) -> bool {
        let Some(mailer) = &self.email else {
            tracing::debug!("no email provider configured, skipping email to {to}");
            return false;
        };
        if to.is_empty() {
            tracing::warn!("no destination email configured, skipping");
            return false;
        }

        match mailer.send(to, subject, body).await {
            Ok(()) => {
                tracing::info!(provider = mailer.name(), to, "email sent");
                true
            }
            Err(e) => {
                tracing::warn!(provider = mailer.name(), to, "email failed: {e}");
                false
            }
        }
    }
}
