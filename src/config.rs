use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub base_url: String,
    /// Admin shared secret. No fallback value: when unset, every admin
    /// request is rejected with 401.
    pub admin_key: Option<String>,
    pub owner_phone: String,
    pub owner_email: String,
    /// Overrides owner_email as the destination for booking notifications.
    pub booking_to_email: Option<String>,
    pub resend_api_key: Option<String>,
    pub resend_from: String,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_pass: String,
    pub callmebot_api_key: Option<String>,
    pub whatsapp_access_token: Option<String>,
    pub whatsapp_phone_number_id: Option<String>,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "beautybar.db".to_string()),
            base_url: env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            admin_key: non_empty("ADMIN_KEY"),
            owner_phone: env::var("OWNER_PHONE").unwrap_or_default(),
            owner_email: env::var("OWNER_EMAIL").unwrap_or_default(),
            booking_to_email: non_empty("BOOKING_TO_EMAIL"),
            resend_api_key: non_empty("RESEND_API_KEY"),
            resend_from: env::var("RESEND_FROM")
                .unwrap_or_else(|_| "Beauty Bar UG <onboarding@resend.dev>".to_string()),
            smtp_host: non_empty("SMTP_HOST"),
            smtp_port: env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(587),
            smtp_user: non_empty("SMTP_USER"),
            smtp_pass: env::var("SMTP_PASS").unwrap_or_default(),
            callmebot_api_key: non_empty("CALLMEBOT_API_KEY"),
            whatsapp_access_token: non_empty("WHATSAPP_ACCESS_TOKEN"),
            whatsapp_phone_number_id: non_empty("WHATSAPP_PHONE_NUMBER_ID"),
            telegram_bot_token: non_empty("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: non_empty("TELEGRAM_CHAT_ID"),
        }
    }

    /// Destination address for owner-facing booking emails.
    pub fn notification_email(&self) -> &str {
        self.booking_to_email.as_deref().unwrap_or(&self.owner_email)
    }
}
