//! Sends questions to the backend and records each exchange in the transcript

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::api::{QueryRequest, Transport};
use crate::flight::SingleFlight;
use crate::history::{self, HistoryPolicy};
use crate::state::Message;
use crate::store::MessageStore;
use crate::templates::MessageTemplates;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Nothing but whitespace was submitted
    Blank,
    /// Another query is still waiting for its answer
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    Ignored(IgnoreReason),
    Answered,
    /// The transport failed and the apology was appended instead
    Failed,
}

/// Owns the pending-query flag and drives one round-trip per question.
///
/// Clones share the store, the transport and the flag, so a clone can be
/// moved into a spawned task while the UI keeps reading the store.
#[derive(Clone)]
pub struct ConversationController {
    store: MessageStore,
    transport: Arc<dyn Transport>,
    policy: HistoryPolicy,
    templates: Arc<MessageTemplates>,
    pending: SingleFlight,
}

impl ConversationController {
    pub fn new(
        store: MessageStore,
        transport: Arc<dyn Transport>,
        policy: HistoryPolicy,
        templates: Arc<MessageTemplates>,
    ) -> Self {
        Self {
            store,
            transport,
            policy,
            templates,
            pending: SingleFlight::new(),
        }
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn policy(&self) -> HistoryPolicy {
        self.policy
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_busy()
    }

    /// Append the question, ask the backend, append its answer or the
    /// apology. Exactly one user and one assistant entry per accepted call.
    pub async fn submit_query(&self, text: &str) -> QueryOutcome {
        if text.trim().is_empty() {
            return QueryOutcome::Ignored(IgnoreReason::Blank);
        }

        let Some(_pending) = self.pending.try_acquire() else {
            debug!("Query already in flight, ignoring submission");
            return QueryOutcome::Ignored(IgnoreReason::Busy);
        };

        let chat_history = match self.policy {
            HistoryPolicy::HistoryThenAppend => {
                let projected = history::project(&self.store);
                self.store.append(Message::user(text));
                projected
            }
            HistoryPolicy::AppendThenProject => {
                self.store.append(Message::user(text));
                history::project(&self.store)
            }
        };

        // Declared after `_pending` so the reply lands before the flag clears
        let reply = PendingReply::new(&self.store, &self.templates.query_error);

        let request = QueryRequest {
            query: text.to_string(),
            chat_history,
        };

        match self.transport.query(&request).await {
            Ok(response) => {
                info!(sources = response.sources.len(), "Query answered");
                reply.complete(Message::assistant(response.answer, response.sources));
                QueryOutcome::Answered
            }
            Err(e) => {
                error!(error = %e, "Query failed");
                reply.complete(Message::assistant(
                    self.templates.query_error.clone(),
                    Vec::new(),
                ));
                QueryOutcome::Failed
            }
        }
    }
}

/// Pairs an appended question with an assistant entry even when the
/// future is dropped mid round-trip.
struct PendingReply<'a> {
    store: &'a MessageStore,
    fallback: Option<String>,
}

impl<'a> PendingReply<'a> {
    fn new(store: &'a MessageStore, fallback: &str) -> Self {
        Self {
            store,
            fallback: Some(fallback.to_string()),
        }
    }

    fn complete(mut self, message: Message) {
        self.fallback = None;
        self.store.append(message);
    }
}

impl Drop for PendingReply<'_> {
    fn drop(&mut self) {
        if let Some(apology) = self.fallback.take() {
            warn!("Query abandoned before a reply arrived");
            self.store.append(Message::assistant(apology, Vec::new()));
        }
    }
}
