//! Builder for inline-query answers: a list of Markdown articles, each with an optional keyboard.

use reqwest::Url;
use teloxide::prelude::*;
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, InlineQueryId, InlineQueryResult,
    InlineQueryResultArticle, InputMessageContent, InputMessageContentText,
};
use tgbot_core::{BuildError, Result, TgBotError};
use tracing::debug;

use crate::message::PARSE_MODE;

struct ArticleDraft {
    article: InlineQueryResultArticle,
    keyboard: Vec<Vec<InlineKeyboardButton>>,
    keyboard_row: Option<usize>,
}

/// Accumulates articles for one inline query. Keyboard calls address the most recently added
/// article; row and button semantics match [`MessageBuilder`](crate::MessageBuilder).
pub struct InlineRequestBuilder {
    inline_query_id: String,
    articles: Vec<ArticleDraft>,
    error: Option<BuildError>,
}

impl InlineRequestBuilder {
    pub fn new(inline_query_id: impl Into<String>) -> Self {
        Self {
            inline_query_id: inline_query_id.into(),
            articles: Vec::new(),
            error: None,
        }
    }

    pub fn add_article(
        mut self,
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let mut content = InputMessageContentText::new(text);
        content.parse_mode = Some(PARSE_MODE);
        let mut article =
            InlineQueryResultArticle::new(id, title, InputMessageContent::Text(content));
        article.description = Some(description.into());
        self.articles.push(ArticleDraft {
            article,
            keyboard: Vec::new(),
            keyboard_row: None,
        });
        self
    }

    pub fn add_keyboard_row(mut self) -> Self {
        match self.articles.last_mut() {
            Some(draft) => {
                draft.keyboard.push(Vec::new());
                draft.keyboard_row = Some(draft.keyboard.len() - 1);
            }
            None => {
                self.error.get_or_insert(BuildError::MissingArticle);
            }
        }
        self
    }

    pub fn add_button(self, text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        self.push_button(InlineKeyboardButton::callback(text, callback_data))
    }

    pub fn add_button_switch(self, text: impl Into<String>, query: impl Into<String>) -> Self {
        self.push_button(InlineKeyboardButton::switch_inline_query(text, query))
    }

    pub fn add_button_url(self, text: impl Into<String>, url: Url) -> Self {
        self.push_button(InlineKeyboardButton::url(text, url))
    }

    fn push_button(mut self, button: InlineKeyboardButton) -> Self {
        let Some(draft) = self.articles.last_mut() else {
            self.error.get_or_insert(BuildError::MissingArticle);
            return self;
        };
        let Some(row) = draft.keyboard_row.and_then(|i| draft.keyboard.get_mut(i)) else {
            self.error
                .get_or_insert(BuildError::MissingKeyboardRow(button.text));
            return self;
        };
        row.push(button);
        self
    }

    /// Produces a personal answer: results are not shared with other users sending the same query.
    pub fn build(self) -> Result<InlineAnswer> {
        if let Some(err) = self.error {
            return Err(TgBotError::Builder(err));
        }

        let results = self
            .articles
            .into_iter()
            .map(|draft| {
                let mut article = draft.article;
                let rows: Vec<_> = draft
                    .keyboard
                    .into_iter()
                    .filter(|row| !row.is_empty())
                    .collect();
                if !rows.is_empty() {
                    article.reply_markup = Some(InlineKeyboardMarkup::new(rows));
                }
                InlineQueryResult::Article(article)
            })
            .collect();

        Ok(InlineAnswer {
            inline_query_id: self.inline_query_id,
            results,
            is_personal: true,
        })
    }
}

#[derive(Debug, Clone)]
pub struct InlineAnswer {
    pub inline_query_id: String,
    pub results: Vec<InlineQueryResult>,
    pub is_personal: bool,
}

impl InlineAnswer {
    pub async fn send(self, bot: &teloxide::Bot) -> Result<()> {
        debug!(
            inline_query_id = %self.inline_query_id,
            results = self.results.len(),
            "Answering inline query"
        );
        bot.answer_inline_query(InlineQueryId(self.inline_query_id), self.results)
            .is_personal(self.is_personal)
            .await
            .map_err(|e| TgBotError::Bot(e.to_string()))?;
        Ok(())
    }
}
