//! Demo bot: colour picker buttons, a two-step `/register` conversation, inline results and echo.

use std::sync::Arc;

use chrono::Local;
use teloxide::requests::Requester;
use teloxide::types::UpdateKind;
use tgbot_core::{init_tracing, ChatProvider, Data, Result, TgBotError};
use tgbot_storage::{InMemoryChatProvider, SqliteChatProvider};
use tgbot_telegram::{InlineRequestBuilder, MessageBuilder, TelegramConfig, TgBot, Update};
use tracing::{error, info, instrument};

const COLORS: [&str; 2] = ["red", "blue"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = TelegramConfig::from_env()?;
    let log_file = config
        .log_file
        .clone()
        .unwrap_or_else(|| "logs/chain-bot.log".to_string());
    init_tracing(&log_file)?;

    let provider: Arc<dyn ChatProvider> = match &config.database_url {
        Some(url) => Arc::new(SqliteChatProvider::new(url).await?),
        None => Arc::new(InMemoryChatProvider::new()),
    };

    let bot = TgBot::from_config(&config, provider).await?;
    info!(
        start_time = %Local::now().format("%Y-%m-%d %H:%M:%S"),
        log_file = %log_file,
        "Chain Bot started"
    );

    let api = bot.api().clone();
    bot.start_long_polling(move |update: Update| {
        let api = api.clone();
        async move {
            if let Err(e) = handle(&api, update).await {
                error!(error = %e, "Failed to handle update");
            }
        }
    })
    .await?;

    Ok(())
}

#[instrument(skip_all, fields(user_id = update.user_id(), chat_id = update.chat_id()))]
async fn handle(api: &teloxide::Bot, mut update: Update) -> Result<()> {
    if matches!(update.raw().kind, UpdateKind::InlineQuery(_)) {
        return answer_inline(api, &update).await;
    }

    if update.has_command("/start") {
        return send_color_picker(api, &update).await;
    }

    if update.has_command("/cancel") {
        update.finish_chain().await;
        update.flush_chat_info().await;
        return MessageBuilder::new()
            .new_message(update.chat_id())
            .text("Cancelled.")
            .remove_reply_keyboard()
            .build()?
            .send(api)
            .await;
    }

    if update.has_command("/register") {
        update
            .start_chain("register")
            .await
            .start_chain_step("name")
            .await;
        update.flush_chat_info().await;
        return MessageBuilder::new()
            .new_message(update.chat_id())
            .text("What is your name?")
            .build()?
            .send(api)
            .await;
    }

    if update.has_action("color").await {
        let color = update.button().await.get_data("color").to_string();
        info!(color = %color, "step: colour picked");
        if let UpdateKind::CallbackQuery(q) = &update.raw().kind {
            api.answer_callback_query(q.id.clone())
                .await
                .map_err(|e| TgBotError::Bot(e.to_string()))?;
        }
        return MessageBuilder::new()
            .edit(true)
            .chat_id(update.chat_id())
            .message_id(update.message_id())
            .inline_id(update.inline_id())
            .text(format!("You picked *{}*", color))
            .build()?
            .send(api)
            .await;
    }

    if update.is_plain_text() && update.has_chain("register").await {
        return continue_registration(api, &mut update).await;
    }

    if update.is_plain_text() {
        return MessageBuilder::new()
            .new_message(update.chat_id())
            .reply_message_id(update.message_id())
            .text(update.text())
            .build()?
            .send(api)
            .await;
    }

    Ok(())
}

async fn send_color_picker(api: &teloxide::Bot, update: &Update) -> Result<()> {
    let mut builder = MessageBuilder::new()
        .new_message(update.chat_id())
        .text("*Pick a colour*")
        .add_keyboard_row();
    for color in COLORS {
        let button = update
            .create_button("color", [("color", color)].into_iter().collect())
            .await?;
        builder = builder.add_button(color, button.id());
    }
    builder
        .add_keyboard_row()
        .add_button_switch("Share", "")
        .build()?
        .send(api)
        .await
}

async fn continue_registration(api: &teloxide::Bot, update: &mut Update) -> Result<()> {
    let reply = match update.chain_step().await.as_str() {
        "name" => {
            let name = update.text();
            update
                .add_chain_data("name", &name)
                .await
                .start_chain_step("phone")
                .await;
            MessageBuilder::new()
                .new_message(update.chat_id())
                .text(format!("Nice to meet you, {}. Your phone number?", name))
        }
        _ => {
            let name = update.get_chain_data("name").await;
            let phone = update.text();
            info!(name = %name, phone = %phone, "step: registration finished");
            update.finish_chain().await;
            MessageBuilder::new()
                .new_message(update.chat_id())
                .text(format!("Registered {} with {}", name, phone))
        }
    };
    update.flush_chat_info().await;
    reply.build()?.send(api).await
}

async fn answer_inline(api: &teloxide::Bot, update: &Update) -> Result<()> {
    let query = update.inline_query().to_lowercase();
    let mut builder = InlineRequestBuilder::new(update.inline_id());
    for color in COLORS.iter().filter(|c| c.starts_with(query.as_str())) {
        let button = update
            .create_button("color", Data::from_iter([("color", *color)]))
            .await?;
        builder = builder
            .add_article(
                *color,
                *color,
                format!("Share the colour {}", color),
                format!("I like *{}*", color),
            )
            .add_keyboard_row()
            .add_button("Pick", button.id());
    }
    builder.build()?.send(api).await
}
