//! Bots Long Poll wire types.
//!
//! The envelope is decoded in two phases: the first pass yields the new
//! cursor plus raw updates whose payloads stay as `serde_json::Value`,
//! because the envelope schema does not carry per-type payload shapes.
//! [`RawUpdate::decode`] performs the second pass once the type tag is
//! known.

use serde::Deserialize;

use crate::error::LongPollResult;

/// Long poll connection data, as returned by `groups.getLongPollServer`.
///
/// The `ts` cursor is overwritten by the dispatch loop after every
/// successful poll; the value lives only in memory, so callers wanting
/// durability across restarts must persist it themselves.
#[derive(Debug, Clone, Deserialize)]
pub struct LongPollSession {
    /// Long poll server URL.
    pub server: String,
    /// Access key for this session.
    pub key: String,
    /// Continuation cursor to echo back on the next request.
    pub ts: String,
}

impl LongPollSession {
    /// Create a session from already-known connection data.
    pub fn new(server: impl Into<String>, key: impl Into<String>, ts: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            key: key.into(),
            ts: ts.into(),
        }
    }
}

/// Top-level response to one poll request.
#[derive(Debug, Deserialize)]
pub struct PollEnvelope {
    /// New cursor value; must replace the session's cursor before the
    /// next request.
    pub ts: String,
    /// Pending events, oldest first.
    #[serde(default)]
    pub updates: Vec<RawUpdate>,
}

/// One event record within an envelope, payload still undecoded.
#[derive(Debug, Clone, Deserialize)]
pub struct RawUpdate {
    /// Type tag deciding how `object` must be decoded.
    #[serde(rename = "type")]
    pub kind: String,
    /// Opaque event payload.
    pub object: serde_json::Value,
    /// Group the event belongs to.
    #[serde(default)]
    pub group_id: i64,
    /// Server-assigned event identifier.
    #[serde(default)]
    pub event_id: String,
}

impl RawUpdate {
    /// Decode the payload into the variant selected by the type tag.
    ///
    /// Returns `Ok(None)` for tags this crate does not dispatch
    /// (including `message_event`); unknown tags are not an error.
    ///
    /// # Errors
    /// Fails when the payload does not match the shape the tag implies.
    pub fn decode(&self) -> LongPollResult<Option<BotEvent>> {
        let object = self.object.clone();
        let event = match self.kind.as_str() {
            "message_new" => BotEvent::MessageNew(serde_json::from_value(object)?),
            "message_reply" => BotEvent::MessageReply(serde_json::from_value(object)?),
            "message_edit" => BotEvent::MessageEdit(serde_json::from_value(object)?),
            "message_allow" => BotEvent::MessageAllow(serde_json::from_value(object)?),
            "message_deny" => BotEvent::MessageDeny(serde_json::from_value(object)?),
            "message_typing_state" => {
                BotEvent::MessageTypingState(serde_json::from_value(object)?)
            }
            _ => return Ok(None),
        };
        Ok(Some(event))
    }
}

/// A decoded long poll event.
#[derive(Debug, Clone)]
pub enum BotEvent {
    MessageNew(MessageNew),
    MessageReply(MessageReply),
    MessageEdit(MessageEdit),
    MessageAllow(MessageAllow),
    MessageDeny(MessageDeny),
    MessageTypingState(MessageTypingState),
}

/// `message_new` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageNew {
    pub message: MessageInfo,
    pub client_info: ClientInfo,
}

/// Message body shared by incoming-message events.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageInfo {
    pub date: i64,
    pub from_id: i64,
    pub id: i64,
    pub out: i32,
    pub peer_id: i64,
    pub text: String,
    pub conversation_message_id: i64,
    #[serde(default)]
    pub fwd_messages: Vec<serde_json::Value>,
    pub important: bool,
    pub random_id: i64,
    #[serde(default)]
    pub attachments: Vec<serde_json::Value>,
    #[serde(default)]
    pub is_hidden: bool,
}

/// Capabilities of the client the recipient is using.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    #[serde(default)]
    pub button_actions: Vec<String>,
    pub keyboard: bool,
    pub inline_keyboard: bool,
    pub carousel: bool,
    pub lang_id: i32,
}

/// `message_reply` payload: an outgoing message, possibly sent by a
/// group admin.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageReply {
    pub date: i64,
    pub from_id: i64,
    pub id: i64,
    pub out: i32,
    pub peer_id: i64,
    pub text: String,
    pub conversation_message_id: i64,
    #[serde(default)]
    pub fwd_messages: Vec<serde_json::Value>,
    pub important: bool,
    pub random_id: i64,
    #[serde(default)]
    pub attachments: Vec<serde_json::Value>,
    #[serde(default)]
    pub admin_author_id: i64,
    #[serde(default)]
    pub is_hidden: bool,
}

/// `message_edit` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageEdit {
    pub date: i64,
    pub from_id: i64,
    pub id: i64,
    pub out: i32,
    pub peer_id: i64,
    pub text: String,
    pub conversation_message_id: i64,
    #[serde(default)]
    pub fwd_messages: Vec<serde_json::Value>,
    pub important: bool,
    pub random_id: i64,
    #[serde(default)]
    pub attachments: Vec<serde_json::Value>,
    #[serde(default)]
    pub is_hidden: bool,
    pub update_time: i64,
}

/// `message_allow` payload: the user allowed messages from the group.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageAllow {
    pub user_id: i64,
}

/// `message_deny` payload: the user denied messages from the group.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageDeny {
    pub user_id: i64,
    /// Upstream sometimes omits this field entirely; an absent key
    /// decodes as the empty string rather than failing.
    #[serde(default)]
    pub key: String,
}

/// `message_typing_state` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageTypingState {
    pub state: String,
    pub from_id: i64,
    pub to_id: i64,
}
