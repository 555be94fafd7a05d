//! Core records: chat conversation state, stored buttons, users and the generic [`Data`] map.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, TgBotError};

/// String-to-string payload attached to buttons and conversation chains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Data(HashMap<String, String>);

impl Data {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a stored payload. The only accepted shape is a JSON object of strings;
    /// `null` decodes to an empty map.
    pub fn decode(src: &[u8]) -> Result<Self> {
        let map: Option<HashMap<String, String>> = serde_json::from_slice(src)
            .map_err(|e| TgBotError::Decode(format!("Unable to unmarshal data: {}", e)))?;
        Ok(Self(map.unwrap_or_default()))
    }

    /// Returns the value for `key`, or an empty string when absent.
    pub fn get(&self, key: &str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

impl From<HashMap<String, String>> for Data {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Data {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A rendered interactive control. Its id travels as callback data and is looked up on click.
///
/// Action and data are fixed at creation; there is no update path for them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    id: String,
    action: String,
    data: Data,
    created_date: DateTime<Utc>,
}

impl Button {
    /// Creates a button with a fresh UUID id, stamped with the current time.
    pub fn new(action: impl Into<String>, data: Data) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            action: action.into(),
            data,
            created_date: Utc::now(),
        }
    }

    /// Rebuilds a button read back from storage.
    pub fn from_parts(
        id: impl Into<String>,
        action: impl Into<String>,
        data: Data,
        created_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            action: action.into(),
            data,
            created_date,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    pub fn created_date(&self) -> DateTime<Utc> {
        self.created_date
    }

    pub fn has_action(&self, action: &str) -> bool {
        self.action == action
    }

    pub fn get_data(&self, key: &str) -> &str {
        self.data.get(key)
    }
}

/// Per-chat conversation state: the active chain, its current step and the chain payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatInfo {
    pub chat_id: i64,
    pub active_chain: String,
    pub active_chain_step: String,
    pub chain_data: Data,
}

impl ChatInfo {
    pub fn new(chat_id: i64) -> Self {
        Self {
            chat_id,
            ..Self::default()
        }
    }

    /// True when no chain is in progress.
    pub fn is_idle(&self) -> bool {
        self.active_chain.is_empty()
    }
}

/// Sender identity as seen on the platform; upserted on every update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: i64,
    pub display_name: String,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub user_name: Option<String>,
}
