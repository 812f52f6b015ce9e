//! VK Bots Long Poll API client.
//!
//! Implements the client half of the Bots Long Poll protocol: repeatedly
//! query the long poll server for pending group events, track the `ts`
//! continuation cursor, and dispatch decoded events to registered handlers.
//!
//! The caller obtains a [`LongPollSession`] (`server`, `key`, `ts`) from the
//! `groups.getLongPollServer` API method; how that call is authenticated is
//! outside this crate.
//!
//! ## Supported events
//!
//! - `message_new` - incoming message with client capability info
//! - `message_reply` - outgoing message
//! - `message_edit` - edited message
//! - `message_allow` - user allowed messages from the group
//! - `message_deny` - user denied messages from the group
//! - `message_typing_state` - typing indicator
//!
//! Other event types (including `message_event`) are skipped without
//! aborting the loop.
//!
//! ```no_run
//! # async fn demo() -> Result<(), vk_longpoll::LongPollError> {
//! use vk_longpoll::{LongPoll, LongPollConfig, LongPollSession};
//!
//! let session = LongPollSession::new("https://lp.vk.com/whp/123", "key", "1");
//! let mut poll = LongPoll::new(session, LongPollConfig::default())?
//!     .on_message_new(|event| println!("{}", event.message.text));
//! poll.run().await
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod client;
mod config;
mod error;
mod listener;
mod types;

pub use client::{poll_url, LongPollClient};
pub use config::LongPollConfig;
pub use error::{LongPollError, LongPollResult};
pub use listener::{LongPoll, StopHandle};
pub use types::{
    BotEvent, ClientInfo, LongPollSession, MessageAllow, MessageDeny, MessageEdit, MessageInfo,
    MessageNew, MessageReply, MessageTypingState, PollEnvelope, RawUpdate,
};
