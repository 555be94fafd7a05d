//! Bot facade: owns the teloxide client and the persistence handle, runs the long-polling loop
//! and turns raw updates into [`Update`] wrappers for the registered handler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use reqwest::Url;
use teloxide::prelude::*;
use teloxide::types::{Me, Update as TgUpdate};
use teloxide::update_listeners::{AsUpdateStream, Polling};
use tgbot_core::{Button, ChatProvider, Data, Result, TgBotError, User};
use tracing::{error, info, instrument};

use crate::adapters::{sender_of, TelegramUserWrapper};
use crate::config::TelegramConfig;
use crate::handler::UpdateHandler;
use crate::update::Update;

/// Long-poll timeout passed to getUpdates.
pub const POLL_TIMEOUT: Duration = Duration::from_secs(60);

pub struct TgBot {
    api: teloxide::Bot,
    provider: Arc<dyn ChatProvider>,
    me: Me,
    polling: AtomicBool,
}

impl TgBot {
    /// Connects with the default Telegram endpoint. Fails if the token is rejected.
    pub async fn new(token: impl Into<String>, provider: Arc<dyn ChatProvider>) -> Result<Self> {
        Self::connect(teloxide::Bot::new(token), provider).await
    }

    /// Connects through a custom Bot API server (e.g. a local `telegram-bot-api`).
    pub async fn with_api_endpoint(
        token: impl Into<String>,
        api_endpoint: &str,
        provider: Arc<dyn ChatProvider>,
    ) -> Result<Self> {
        let url = Url::parse(api_endpoint).map_err(|e| {
            TgBotError::Setup(format!("invalid API endpoint {}: {}", api_endpoint, e))
        })?;
        Self::connect(teloxide::Bot::new(token).set_api_url(url), provider).await
    }

    pub async fn from_config(
        config: &TelegramConfig,
        provider: Arc<dyn ChatProvider>,
    ) -> Result<Self> {
        match &config.telegram_api_url {
            Some(url) => Self::with_api_endpoint(config.bot_token.clone(), url, provider).await,
            None => Self::new(config.bot_token.clone(), provider).await,
        }
    }

    async fn connect(api: teloxide::Bot, provider: Arc<dyn ChatProvider>) -> Result<Self> {
        let me = api
            .get_me()
            .await
            .map_err(|e| TgBotError::Setup(format!("unable to create bot: {}", e)))?;
        info!(
            bot_id = me.user.id.0,
            username = ?me.user.username,
            "Bot authorized"
        );
        Ok(Self {
            api,
            provider,
            me,
            polling: AtomicBool::new(false),
        })
    }

    /// The teloxide client, for sending built messages and any other API call.
    pub fn api(&self) -> &teloxide::Bot {
        &self.api
    }

    /// The bot's own account as reported by getMe at construction.
    pub fn me(&self) -> &Me {
        &self.me
    }

    pub fn provider(&self) -> Arc<dyn ChatProvider> {
        self.provider.clone()
    }

    pub fn is_polling(&self) -> bool {
        self.polling.load(Ordering::SeqCst)
    }

    /// Runs the polling loop, awaiting `handler` for each update in delivery order.
    ///
    /// Returns [`TgBotError::PollingAlreadyStarted`] if polling was started before. Updates
    /// without a sender, or whose sender cannot be saved, are logged and skipped.
    #[instrument(skip(self, handler))]
    pub async fn start_long_polling<H: UpdateHandler>(&self, handler: H) -> Result<()> {
        if self
            .polling
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(TgBotError::PollingAlreadyStarted);
        }

        info!(timeout_secs = POLL_TIMEOUT.as_secs(), "step: long polling started");

        let mut listener = Polling::builder(self.api.clone())
            .timeout(POLL_TIMEOUT)
            .build();
        let stream = listener.as_stream();
        futures::pin_mut!(stream);

        while let Some(item) = stream.next().await {
            let raw = match item {
                Ok(raw) => raw,
                Err(e) => {
                    error!(error = %e, "getUpdates failed");
                    continue;
                }
            };
            let update_id = raw.id;
            match self.wrap_update(raw).await {
                Ok(update) => {
                    info!(
                        update_id = ?update_id,
                        user_id = update.user_id(),
                        chat_id = update.chat_id(),
                        "step: dispatching update"
                    );
                    handler.handle(update).await;
                }
                Err(e) => {
                    error!(update_id = ?update_id, error = %e, "Wrapped update failed, skipping");
                }
            }
        }

        info!("step: long polling finished");
        Ok(())
    }

    /// Resolves and saves the sender, then wraps the update.
    pub async fn wrap_update(&self, raw: TgUpdate) -> Result<Update> {
        let user = self.save_user(&raw).await?;
        Ok(Update::new(raw, user, self.provider.clone()))
    }

    /// Wraps a webhook request body (the JSON-encoded update).
    pub async fn wrap_webhook_body(&self, body: &[u8]) -> Result<Update> {
        let raw: TgUpdate = serde_json::from_slice(body)
            .map_err(|e| TgBotError::Decode(format!("invalid update body: {}", e)))?;
        self.wrap_update(raw).await
    }

    /// Upserts the update's sender and returns it.
    pub async fn save_user(&self, raw: &TgUpdate) -> Result<User> {
        let sender = sender_of(raw)
            .ok_or_else(|| TgBotError::NoSender(format!("update {:?}", raw.id)))?;
        let user = TelegramUserWrapper(sender).to_core();

        self.provider.save_user(&user).await.map_err(|e| {
            error!(user_id = user.user_id, error = %e, "Failed to save user");
            e
        })?;

        Ok(user)
    }

    /// Stores a new button so its id can be rendered as callback data.
    pub async fn create_button(&self, action: &str, data: Data) -> Result<Button> {
        let button = Button::new(action, data);
        self.provider.save_button(&button).await?;
        Ok(button)
    }
}
