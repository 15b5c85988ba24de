//! Conversation mode controller
//!
//! Decides which backend endpoint a user submission goes to and folds the
//! settled result back into the conversation. Nothing here touches the
//! network: the caller performs the request described by a [`Route`] and
//! hands the outcome to [`Session::settle`].

use tracing::warn;

use crate::error::GatewayError;
use crate::state::{ChatMessage, Conversation};

/// Synthesized user message for the "retrieve order" quick action
pub const ORDER_REQUEST_PROMPT: &str = "Could you provide my order information?";

pub const FAQ_FALLBACK: &str = "Sorry, I couldn't find an answer to that.";
pub const ORDER_FALLBACK: &str = "Sorry, I couldn't retrieve your order information.";
pub const ERROR_FALLBACK: &str = "Something went wrong. Please try again later.";

/// Which endpoint the next submission is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Faq,
    OrderLookup,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Faq => "FAQ",
            Mode::OrderLookup => "ORDER",
        }
    }
}

/// A request the gateway should issue, with everything it needs captured
/// at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Full history, including the message that triggered the call
    Faq { messages: Vec<ChatMessage> },
    Order { order_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Faq,
    Order,
}

impl Route {
    pub fn kind(&self) -> RouteKind {
        match self {
            Route::Faq { .. } => RouteKind::Faq,
            Route::Order { .. } => RouteKind::Order,
        }
    }
}

impl RouteKind {
    pub fn endpoint(&self) -> &'static str {
        match self {
            RouteKind::Faq => "/faq",
            RouteKind::Order => "/order-info",
        }
    }

    /// Assistant text used when the backend answered without a `message`
    pub fn fallback(&self) -> &'static str {
        match self {
            RouteKind::Faq => FAQ_FALLBACK,
            RouteKind::Order => ORDER_FALLBACK,
        }
    }
}

/// Map a settled call to the assistant message it produces.
///
/// An empty `message` counts as absent.
pub fn assistant_reply(
    kind: RouteKind,
    outcome: &Result<Option<String>, GatewayError>,
) -> ChatMessage {
    match outcome {
        Ok(Some(text)) if !text.is_empty() => ChatMessage::assistant(text.clone()),
        Ok(_) => ChatMessage::assistant(kind.fallback()),
        Err(_) => ChatMessage::assistant(ERROR_FALLBACK),
    }
}

/// Application state for one support conversation: the message log and the
/// current routing mode.
#[derive(Debug, Clone, Default)]
pub struct Session {
    conversation: Conversation,
    mode: Mode,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.conversation.all()
    }

    /// Record the user's text and decide where it goes.
    ///
    /// Returns `None` (and leaves the conversation untouched) for blank input.
    pub fn submit(&mut self, text: &str) -> Option<Route> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        self.conversation.append(ChatMessage::user(text));

        let route = match self.mode {
            Mode::OrderLookup => Route::Order {
                order_id: trimmed.to_string(),
            },
            Mode::Faq => Route::Faq {
                messages: self.conversation.all().to_vec(),
            },
        };
        Some(route)
    }

    /// Switch to order lookup and ask the FAQ backend for the order prompt.
    pub fn retrieve_order(&mut self) -> Route {
        self.mode = Mode::OrderLookup;
        self.conversation.append(ChatMessage::user(ORDER_REQUEST_PROMPT));
        Route::Faq {
            messages: self.conversation.all().to_vec(),
        }
    }

    /// Apply a finished call: append exactly one assistant message and
    /// return to FAQ mode after an order lookup or any failure.
    pub fn settle(
        &mut self,
        kind: RouteKind,
        outcome: Result<Option<String>, GatewayError>,
    ) -> &ChatMessage {
        if let Err(e) = &outcome {
            warn!(endpoint = kind.endpoint(), kind = e.kind(), error = %e, "support request failed");
        }

        if kind == RouteKind::Order || outcome.is_err() {
            self.mode = Mode::Faq;
        }

        let reply = assistant_reply(kind, &outcome);
        self.conversation.append(reply)
    }
}
