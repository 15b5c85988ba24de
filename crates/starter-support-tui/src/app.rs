use ratatui::layout::Rect;
use starter_support_core::{Route, Session, SupportClient};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::tui::{AppEvent, Reply};
use crate::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub session: Session,

    // Input box
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars

    // Thread view
    pub chat_scroll: u16,
    pub chat_height: u16, // Inner height of the thread, for scroll calculations
    pub chat_width: u16,  // Inner width of the thread, for wrap calculations
    pub chat_area: Option<Rect>,

    // Requests in flight and the typing indicator
    pub pending: usize,
    pub animation_frame: u8, // 0-2 for ellipsis animation

    client: SupportClient,
    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(client: SupportClient, events: UnboundedSender<AppEvent>) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            session: Session::new(),

            input: String::new(),
            cursor: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_area: None,

            pending: 0,
            animation_frame: 0,

            client,
            events,
        }
    }

    /// Send whatever is in the input box. Blank input stays put.
    pub fn submit_input(&mut self) {
        let Some(route) = self.session.submit(&self.input) else {
            return;
        };

        self.input.clear();
        self.cursor = 0;
        self.dispatch(route);
    }

    /// The "Retrieve order information" quick action
    pub fn retrieve_order(&mut self) {
        let route = self.session.retrieve_order();
        self.dispatch(route);
    }

    /// Issue the request in the background; its reply comes back as an `AppEvent::Reply`.
    fn dispatch(&mut self, route: Route) {
        let kind = route.kind();
        debug!(endpoint = kind.endpoint(), mode = self.session.mode().label(), "dispatching");

        self.pending += 1;
        self.scroll_to_bottom();

        let client = self.client.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = client.dispatch(&route).await;
            // Receiver only goes away on shutdown
            let _ = events.send(AppEvent::Reply(Reply { kind, outcome }));
        });
    }

    pub fn apply_reply(&mut self, reply: Reply) {
        self.pending = self.pending.saturating_sub(1);
        let chars = self.session.settle(reply.kind, reply.outcome).content.chars().count();
        debug!(
            endpoint = reply.kind.endpoint(),
            chars,
            mode = self.session.mode().label(),
            "reply settled"
        );
        self.scroll_to_bottom();
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.pending > 0 {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    fn max_scroll(&self) -> u16 {
        // Fall back to a plausible size before the first render
        let width = if self.chat_width > 0 { self.chat_width } else { 50 };
        let height = if self.chat_height > 0 { self.chat_height } else { 20 };

        let total = ui::chat_lines(self, width as usize).len();
        let total = u16::try_from(total).unwrap_or(u16::MAX);
        total.saturating_sub(height)
    }

    /// Scroll the thread so the newest message (or typing indicator) is visible
    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.max_scroll();
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.max_scroll());
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn half_page(&self) -> u16 {
        (self.chat_height / 2).max(1)
    }
}
