//! User-facing fixed strings.
//!
//! Everything the controllers show the user without the backend's help lives
//! here, so the presentation language is a config concern. `{filename}` is
//! replaced with the uploaded file's name.

use serde::{Deserialize, Serialize};

const FILENAME: &str = "{filename}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageTemplates {
    pub query_error: String,
    pub uploading: String,
    pub upload_done: String,
    pub upload_error: String,
    pub upload_notice: String,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self {
            query_error: "Sorry, I encountered an error. Please try again.".to_string(),
            uploading: "Uploading {filename}...".to_string(),
            upload_done: "{filename} processed".to_string(),
            upload_error: "Error processing {filename}".to_string(),
            upload_notice: "Document \"{filename}\" processed successfully.".to_string(),
        }
    }
}

impl MessageTemplates {
    pub fn uploading(&self, filename: &str) -> String {
        self.uploading.replace(FILENAME, filename)
    }

    pub fn upload_done(&self, filename: &str) -> String {
        self.upload_done.replace(FILENAME, filename)
    }

    pub fn upload_error(&self, filename: &str) -> String {
        self.upload_error.replace(FILENAME, filename)
    }

    pub fn upload_notice(&self, filename: &str) -> String {
        self.upload_notice.replace(FILENAME, filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_in_filename() {
        let templates = MessageTemplates::default();
        assert_eq!(templates.uploading("report.pdf"), "Uploading report.pdf...");
        assert_eq!(templates.upload_done("report.pdf"), "report.pdf processed");
        assert_eq!(templates.upload_error("report.pdf"), "Error processing report.pdf");
        assert_eq!(
            templates.upload_notice("report.pdf"),
            "Document \"report.pdf\" processed successfully."
        );
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let templates: MessageTemplates = serde_json::from_str(
            r#"{"query_error": "Lo siento, ocurrió un error. Inténtalo de nuevo."}"#,
        )
        .unwrap();
        assert_eq!(templates.query_error, "Lo siento, ocurrió un error. Inténtalo de nuevo.");
        assert_eq!(templates.upload_done, MessageTemplates::default().upload_done);
    }
}
