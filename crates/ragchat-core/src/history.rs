//! Projection of the transcript into the `chat_history` sent with a query

use crate::api::HistoryEntry;
use crate::state::{Message, Role};
use crate::store::MessageStore;

/// Where the new question is cut relative to the projected history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryPolicy {
    /// Project, then append the question. The backend sees it once, in `query`.
    #[default]
    HistoryThenAppend,
    /// Append the question, then project. The last history entry repeats `query`.
    AppendThenProject,
}

impl HistoryPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryPolicy::HistoryThenAppend => "history_then_append",
            HistoryPolicy::AppendThenProject => "append_then_project",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "history_then_append" => Some(HistoryPolicy::HistoryThenAppend),
            "append_then_project" => Some(HistoryPolicy::AppendThenProject),
            _ => None,
        }
    }
}

pub fn project(store: &MessageStore) -> Vec<HistoryEntry> {
    project_messages(&store.snapshot())
}

/// User and assistant turns as `{role, content}`; system notices and sources
/// never reach the backend.
pub fn project_messages(messages: &[Message]) -> Vec<HistoryEntry> {
    messages
        .iter()
        .filter(|m| m.role() != Role::System)
        .map(|m| HistoryEntry {
            role: m.role(),
            content: m.content().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Source;

    fn sample_store() -> MessageStore {
        let store = MessageStore::new();
        store.append(Message::system("Document \"geo.pdf\" processed successfully."));
        store.append(Message::user("What is the capital of France?"));
        store.append(Message::assistant("Paris", vec![Source::named("geo.pdf")]));
        store
    }

    #[test]
    fn drops_system_entries_and_keeps_order() {
        let history = project(&sample_store());
        assert_eq!(
            history,
            vec![
                HistoryEntry {
                    role: Role::User,
                    content: "What is the capital of France?".to_string(),
                },
                HistoryEntry {
                    role: Role::Assistant,
                    content: "Paris".to_string(),
                },
            ]
        );
    }

    #[test]
    fn wire_form_has_no_sources_or_system_roles() {
        let history = project(&sample_store());
        let json = serde_json::to_value(&history).unwrap();

        for entry in json.as_array().unwrap() {
            let object = entry.as_object().unwrap();
            assert!(!object.contains_key("sources"));
            assert_ne!(object["role"], "system");
            assert_eq!(object.len(), 2);
        }
    }

    #[test]
    fn projection_is_pure() {
        let store = sample_store();
        assert_eq!(project(&store), project(&store));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn empty_store_projects_to_empty_history() {
        assert!(project(&MessageStore::new()).is_empty());
    }

    #[test]
    fn policy_parses_config_spellings() {
        assert_eq!(
            HistoryPolicy::from_str("append-then-project"),
            Some(HistoryPolicy::AppendThenProject)
        );
        assert_eq!(
            HistoryPolicy::from_str(HistoryPolicy::HistoryThenAppend.as_str()),
            Some(HistoryPolicy::HistoryThenAppend)
        );
        assert_eq!(HistoryPolicy::from_str("both"), None);
    }
}
