//! Long poll dispatch loop.
//!
//! Owns the polling cadence: one [`LongPollClient::check`] per iteration,
//! cursor replacement, then per-update dispatch to the registered
//! handlers. Handlers run synchronously on the loop, so a slow handler
//! delays the next poll; hand off long work to your own task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::client::LongPollClient;
use crate::config::LongPollConfig;
use crate::error::LongPollResult;
use crate::types::{
    BotEvent, LongPollSession, MessageAllow, MessageDeny, MessageEdit, MessageNew, MessageReply,
    MessageTypingState, RawUpdate,
};

type Handler<T> = Box<dyn Fn(&T) + Send + Sync>;

/// One optional handler slot per event tag. Absent slots make dispatch a
/// silent no-op for that tag.
#[derive(Default)]
struct EventHandlers {
    message_new: Option<Handler<MessageNew>>,
    message_reply: Option<Handler<MessageReply>>,
    message_edit: Option<Handler<MessageEdit>>,
    message_allow: Option<Handler<MessageAllow>>,
    message_deny: Option<Handler<MessageDeny>>,
    message_typing_state: Option<Handler<MessageTypingState>>,
}

/// Requests a graceful halt of the loop that handed it out.
///
/// The flag is checked once per iteration, before the next request is
/// issued; an in-flight request always completes (or fails) first. The
/// signal is not resettable: a stopped [`LongPoll`] stays stopped, and
/// resuming means constructing a new one.
#[derive(Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
}

impl StopHandle {
    /// Ask the loop to stop at the next iteration boundary.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// The long poll dispatch loop for one session.
///
/// Exclusive owner of the session's `ts` cursor. Run one instance per
/// bot account; there is no multiplexing.
pub struct LongPoll {
    session: LongPollSession,
    config: LongPollConfig,
    client: LongPollClient,
    handlers: EventHandlers,
    running: Arc<AtomicBool>,
}

impl LongPoll {
    /// Create a loop over `session` with the given tuning.
    ///
    /// # Errors
    /// Returns an error if the HTTP client fails to build.
    pub fn new(session: LongPollSession, config: LongPollConfig) -> LongPollResult<Self> {
        let client = LongPollClient::new(&config)?;
        Ok(Self {
            session,
            config,
            client,
            handlers: EventHandlers::default(),
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Register the `message_new` handler.
    #[must_use]
    pub fn on_message_new(mut self, handler: impl Fn(&MessageNew) + Send + Sync + 'static) -> Self {
        self.handlers.message_new = Some(Box::new(handler));
        self
    }

    /// Register the `message_reply` handler.
    #[must_use]
    pub fn on_message_reply(
        mut self,
        handler: impl Fn(&MessageReply) + Send + Sync + 'static,
    ) -> Self {
        self.handlers.message_reply = Some(Box::new(handler));
        self
    }

    /// Register the `message_edit` handler.
    #[must_use]
    pub fn on_message_edit(
        mut self,
        handler: impl Fn(&MessageEdit) + Send + Sync + 'static,
    ) -> Self {
        self.handlers.message_edit = Some(Box::new(handler));
        self
    }

    /// Register the `message_allow` handler.
    #[must_use]
    pub fn on_message_allow(
        mut self,
        handler: impl Fn(&MessageAllow) + Send + Sync + 'static,
    ) -> Self {
        self.handlers.message_allow = Some(Box::new(handler));
        self
    }

    /// Register the `message_deny` handler.
    #[must_use]
    pub fn on_message_deny(
        mut self,
        handler: impl Fn(&MessageDeny) + Send + Sync + 'static,
    ) -> Self {
        self.handlers.message_deny = Some(Box::new(handler));
        self
    }

    /// Register the `message_typing_state` handler.
    #[must_use]
    pub fn on_message_typing_state(
        mut self,
        handler: impl Fn(&MessageTypingState) + Send + Sync + 'static,
    ) -> Self {
        self.handlers.message_typing_state = Some(Box::new(handler));
        self
    }

    /// Get a handle that can stop this loop from another task or from
    /// inside a handler.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            running: Arc::clone(&self.running),
        }
    }

    /// The current continuation cursor.
    ///
    /// Callers wanting to resume after a restart should persist this and
    /// feed it into the next session.
    #[must_use]
    pub fn cursor(&self) -> &str {
        &self.session.ts
    }

    /// Poll until stopped or a fatal error occurs.
    ///
    /// Each successful response replaces the cursor before any update is
    /// dispatched, even when the envelope carries zero updates: the
    /// server advances `ts` on every response. A malformed update is
    /// skipped with a warning; the rest of the batch is still delivered.
    ///
    /// # Errors
    /// Transport and envelope decode failures are not retried here; they
    /// terminate the loop and surface to the caller, which can consult
    /// [`LongPollError::is_retryable`](crate::LongPollError::is_retryable)
    /// to decide whether to start a fresh loop.
    pub async fn run(&mut self) -> LongPollResult<()> {
        info!("starting long poll loop");
        while self.running.load(Ordering::SeqCst) {
            let envelope = self.client.check(&self.session, &self.config).await?;
            self.session.ts = envelope.ts;
            for update in &envelope.updates {
                self.dispatch(update);
            }
        }
        info!("long poll loop stopped");
        Ok(())
    }

    fn dispatch(&self, update: &RawUpdate) {
        match update.decode() {
            Ok(Some(event)) => self.invoke(&event),
            Ok(None) => {
                debug!(kind = %update.kind, "ignoring unhandled update type");
            }
            Err(e) => {
                warn!(
                    kind = %update.kind,
                    event_id = %update.event_id,
                    error = %e,
                    "skipping malformed update"
                );
            }
        }
    }

    fn invoke(&self, event: &BotEvent) {
        match event {
            BotEvent::MessageNew(payload) => {
                if let Some(handler) = &self.handlers.message_new {
                    handler(payload);
                }
            }
            BotEvent::MessageReply(payload) => {
                if let Some(handler) = &self.handlers.message_reply {
                    handler(payload);
                }
            }
            BotEvent::MessageEdit(payload) => {
                if let Some(handler) = &self.handlers.message_edit {
                    handler(payload);
                }
            }
            BotEvent::MessageAllow(payload) => {
                if let Some(handler) = &self.handlers.message_allow {
                    handler(payload);
                }
            }
            BotEvent::MessageDeny(payload) => {
                if let Some(handler) = &self.handlers.message_deny {
                    handler(payload);
                }
            }
            BotEvent::MessageTypingState(payload) => {
                if let Some(handler) = &self.handlers.message_typing_state {
                    handler(payload);
                }
            }
        }
    }
}
