use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{format_message, Notifier, NotifyError};
use crate::config::TelegramSettings;
use crate::engine::types::Opportunity;

pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(default)]
    pub description: Option<String>,
    pub result: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct BotUser {
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
}

impl<T> ApiResponse<T> {
    fn into_result(self) -> Result<Option<T>, NotifyError> {
        if self.ok {
            Ok(self.result)
        } else {
            Err(NotifyError::Api(self.description.unwrap_or_else(|| "unknown error".to_string())))
        }
    }
}

/// Sends every opportunity to one chat through the Bot API.
pub struct TelegramNotifier {
    client: reqwest::Client,
    base_url: String, // https://api.telegram.org/bot<token>
    chat_id: i64,
}

impl TelegramNotifier {
    pub fn new(settings: &TelegramSettings, client: reqwest::Client) -> Self {
        let api = settings.api_url.as_deref().unwrap_or(TELEGRAM_API_URL).trim_end_matches('/');
        Self {
            client,
            base_url: format!("{api}/bot{}", settings.bot_token),
            chat_id: settings.chat_id,
        }
    }

    /// Builds the notifier and checks the token with `getMe`.
    pub async fn connect(settings: &TelegramSettings, client: reqwest::Client) -> Result<Self, NotifyError> {
        let bot = Self::new(settings, client);
        let me: ApiResponse<BotUser> = bot
            .client
            .get(format!("{}/getMe", bot.base_url))
            .send()
            .await?
            .json()
            .await?;

        match me.into_result()?.and_then(|user| user.username) {
            Some(username) if !username.is_empty() => {
                info!(%username, "Authorized on telegram account");
                Ok(bot)
            }
            _ => Err(NotifyError::Api("error connecting to telegram: bot has no username".to_string())),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    #[instrument(level = "debug", skip_all, fields(ask = %opportunity.ask_venue, bid = %opportunity.bid_venue))]
    async fn publish(&self, opportunity: &Opportunity) -> Result<(), NotifyError> {
        let text = format_message(opportunity);
        let res: ApiResponse<serde_json::Value> = self
            .client
            .post(format!("{}/sendMessage", self.base_url))
            .json(&SendMessage { chat_id: self.chat_id, text: &text })
            .send()
            .await?
            .json()
            .await?;
        res.into_result()?;
        Ok(())
    }
}
