pub mod api;
pub mod config;
pub mod conversation;
pub mod document;
pub mod error;
pub mod flight;
pub mod history;
pub mod state;
pub mod store;
pub mod templates;
pub mod upload;

// Re-export main types for convenience
pub use api::{HttpTransport, Transport};
pub use config::Config;
pub use conversation::{ConversationController, IgnoreReason, QueryOutcome};
pub use document::{DocumentKind, UploadFile};
pub use error::{ConfigError, TransportError};
pub use history::HistoryPolicy;
pub use state::{Message, Role, Source, UploadPhase, UploadStatus};
pub use store::MessageStore;
pub use templates::MessageTemplates;
pub use upload::{StatusSlot, UploadController, UploadIgnoreReason, UploadOutcome};
