use std::path::Path;

use ragchat_core::{
    ConversationController, DocumentKind, Message, MessageStore, UploadController, UploadFile,
    UploadStatus,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use crate::input::TextInput;
use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Query,
    Upload,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,
    pub api_url: String,

    // Inputs
    pub query_input: TextInput,
    pub upload_input: TextInput,
    /// Presentation-only hint (bad path, unsupported type); never enters the transcript
    pub notice: Option<String>,

    // Transcript view state
    pub chat_scroll: u16,
    pub max_chat_scroll: u16,
    pub follow_tail: bool,
    pub chat_height: u16, // Inner height of transcript pane, set during render

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Controllers and the transcript they share
    pub store: MessageStore,
    pub conversation: ConversationController,
    pub uploads: UploadController,

    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(
        conversation: ConversationController,
        uploads: UploadController,
        api_url: String,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Query,
            api_url,

            query_input: TextInput::default(),
            upload_input: TextInput::default(),
            notice: None,

            chat_scroll: 0,
            max_chat_scroll: 0,
            follow_tail: true,
            chat_height: 0,

            animation_frame: 0,

            store: conversation.store().clone(),
            conversation,
            uploads,

            events,
        }
    }

    pub fn messages(&self) -> Vec<Message> {
        self.store.snapshot()
    }

    pub fn query_pending(&self) -> bool {
        self.conversation.is_pending()
    }

    pub fn upload_status(&self) -> UploadStatus {
        self.uploads.status()
    }

    pub fn focused_input(&mut self) -> &mut TextInput {
        match self.focus {
            FocusPane::Query => &mut self.query_input,
            FocusPane::Upload => &mut self.upload_input,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FocusPane::Query => FocusPane::Upload,
            FocusPane::Upload => FocusPane::Query,
        };
    }

    /// Hand the typed question to the conversation controller.
    ///
    /// The input is cleared right away; the round-trip runs as its own task
    /// and wakes the UI when the answer (or the apology) is in the store.
    pub fn submit_query(&mut self) {
        if self.query_input.is_blank() || self.conversation.is_pending() {
            return;
        }

        let text = self.query_input.take();
        self.follow_tail = true;

        let conversation = self.conversation.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            conversation.submit_query(&text).await;
            let _ = events.send(AppEvent::Refresh);
        });
    }

    /// Validate the typed path the way a file picker would, then upload it.
    pub async fn submit_upload(&mut self) {
        if self.upload_input.is_blank() || self.uploads.is_busy() {
            return;
        }

        let raw = self.upload_input.value().trim().to_string();
        let path = Path::new(&raw);

        if DocumentKind::from_path(path).is_none() {
            let kinds: Vec<&str> = DocumentKind::all().iter().map(|k| k.display_name()).collect();
            self.notice = Some(format!("Unsupported file type. Use {}.", kinds.join(", ")));
            return;
        }

        let file = match UploadFile::from_path(path).await {
            Ok(file) => file,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read file for upload");
                self.notice = Some(format!("Could not read {}", path.display()));
                return;
            }
        };

        self.notice = None;
        self.upload_input.take();
        self.follow_tail = true;

        let uploads = self.uploads.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            uploads.submit_upload(Some(file)).await;
            let _ = events.send(AppEvent::Refresh);
        });
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.query_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_tail = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
        if self.chat_scroll >= self.max_chat_scroll {
            self.scroll_to_bottom();
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.follow_tail = false;
        self.chat_scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow_tail = true;
        self.chat_scroll = self.max_chat_scroll;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use ragchat_core::{HistoryPolicy, HttpTransport, MessageTemplates, UploadPhase};
    use tokio::sync::mpsc;

    use super::*;

    // Nothing listens on port 1, so every round-trip fails fast.
    fn app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let store = MessageStore::new();
        let transport = Arc::new(HttpTransport::new("http://127.0.0.1:1"));
        let templates = Arc::new(MessageTemplates::default());
        let conversation = ConversationController::new(
            store.clone(),
            transport.clone(),
            HistoryPolicy::default(),
            templates.clone(),
        );
        let uploads = UploadController::new(store, transport, templates);
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(conversation, uploads, "http://127.0.0.1:1".to_string(), tx), rx)
    }

    fn type_into(input: &mut TextInput, text: &str) {
        text.chars().for_each(|c| input.insert(c));
    }

    async fn wait_for_refresh(rx: &mut mpsc::UnboundedReceiver<AppEvent>) {
        let event = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("round-trip did not finish");
        assert!(matches!(event, Some(AppEvent::Refresh)));
    }

    #[tokio::test]
    async fn blank_question_keeps_input_and_sends_nothing() {
        let (mut app, mut rx) = app();
        type_into(&mut app.query_input, "   ");

        app.submit_query();

        assert_eq!(app.query_input.value(), "   ");
        assert!(rx.try_recv().is_err());
        assert!(app.messages().is_empty());
    }

    #[tokio::test]
    async fn question_clears_input_and_failure_shows_apology() {
        let (mut app, mut rx) = app();
        type_into(&mut app.query_input, "What is in report.pdf?");

        app.submit_query();
        assert_eq!(app.query_input.value(), "");

        wait_for_refresh(&mut rx).await;
        let messages = app.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content(), "What is in report.pdf?");
        assert_eq!(messages[1].content(), MessageTemplates::default().query_error);
        assert!(!app.query_pending());
    }

    #[tokio::test]
    async fn unsupported_file_type_is_refused_before_upload() {
        let (mut app, mut rx) = app();
        type_into(&mut app.upload_input, "photo.png");

        app.submit_upload().await;

        assert!(app.notice.as_deref().unwrap().starts_with("Unsupported file type"));
        assert_eq!(app.upload_input.value(), "photo.png");
        assert!(rx.try_recv().is_err());
        assert_eq!(app.upload_status().phase, UploadPhase::Idle);
    }

    #[tokio::test]
    async fn unreadable_file_is_reported_as_notice() {
        let (mut app, _rx) = app();
        type_into(&mut app.upload_input, "/definitely/not/here/report.pdf");

        app.submit_upload().await;

        assert!(app.notice.as_deref().unwrap().starts_with("Could not read"));
        assert_eq!(app.upload_status().phase, UploadPhase::Idle);
    }

    #[tokio::test]
    async fn failed_upload_sets_error_status_without_transcript_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "meeting notes").unwrap();

        let (mut app, mut rx) = app();
        type_into(&mut app.upload_input, &path.display().to_string());

        app.submit_upload().await;
        assert_eq!(app.upload_input.value(), "");
        assert_eq!(app.notice, None);

        wait_for_refresh(&mut rx).await;
        let status = app.upload_status();
        assert_eq!(status.phase, UploadPhase::Error);
        assert_eq!(status.label, "Error processing notes.txt");
        assert!(app.messages().is_empty());
    }

    #[tokio::test]
    async fn scrolling_up_stops_following_until_bottom_is_reached() {
        let (mut app, _rx) = app();
        app.max_chat_scroll = 10;
        app.chat_scroll = 10;

        app.scroll_up(3);
        assert!(!app.follow_tail);
        assert_eq!(app.chat_scroll, 7);

        app.scroll_down(5);
        assert!(app.follow_tail);
        assert_eq!(app.chat_scroll, 10);
    }
}
