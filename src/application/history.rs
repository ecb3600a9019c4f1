use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::domain::types::Turn;

/// One in-memory conversation: an append-only, ordered log of turns plus
/// optional grouping tags. Lives for the process lifetime, never persisted.
#[derive(Debug, Clone)]
pub struct Conversation {
    id: String,
    project: Option<String>,
    profile: Option<String>,
    turns: Vec<Turn>,
    created_at: DateTime<Utc>,
}

impl Conversation {
    fn new(id: String, project: Option<String>, profile: Option<String>) -> Self {
        Self {
            id,
            project,
            profile,
            turns: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Registry of live conversations keyed by opaque id.
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: HashMap<String, Conversation>,
}

impl ConversationStore {
    /// Creates an empty conversation under a fresh opaque id.
    pub fn create(&mut self, project: Option<String>, profile: Option<String>) -> String {
        let id = Uuid::new_v4().to_string();
        debug!(conversation = %id, "Created conversation");
        self.conversations
            .insert(id.clone(), Conversation::new(id.clone(), project, profile));
        id
    }

    /// Returns the named conversation, creating an empty untagged one on
    /// first use of the id.
    pub fn ensure(&mut self, id: &str) -> &Conversation {
        self.conversations
            .entry(id.to_string())
            .or_insert_with(|| Conversation::new(id.to_string(), None, None))
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.get(id)
    }

    /// Appends one user/assistant exchange in call order. This is the only
    /// mutation path; appended turns are never rewritten.
    pub fn append_exchange(&mut self, id: &str, user: Turn, assistant: Turn) {
        let conversation = self
            .conversations
            .entry(id.to_string())
            .or_insert_with(|| Conversation::new(id.to_string(), None, None));
        conversation.turns.push(user);
        conversation.turns.push(assistant);
        debug!(
            conversation = id,
            total_turns = conversation.turns.len(),
            "Appended exchange"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Role;

    #[test]
    fn created_conversations_get_unique_ids_and_tags() {
        let mut store = ConversationStore::default();
        let first = store.create(Some("docs".into()), None);
        let second = store.create(None, Some("reviewer".into()));
        assert_ne!(first, second);

        let first = store.get(&first).expect("first conversation exists");
        assert_eq!(first.project(), Some("docs"));
        assert!(first.profile().is_none());
        assert!(first.turns().is_empty());

        let second = store.get(&second).expect("second conversation exists");
        assert_eq!(second.profile(), Some("reviewer"));
        assert!(second.created_at() <= Utc::now());
    }

    #[test]
    fn ensure_creates_on_first_use_and_reuses_after() {
        let mut store = ConversationStore::default();
        assert!(store.get("external-id").is_none());
        assert_eq!(store.ensure("external-id").id(), "external-id");
        store.append_exchange("external-id", Turn::user("q"), Turn::assistant("a"));
        assert_eq!(store.ensure("external-id").turns().len(), 2);
    }

    #[test]
    fn n_exchanges_store_2n_turns_in_call_order() {
        let mut store = ConversationStore::default();
        let id = store.create(None, None);
        for round in 0..3 {
            store.append_exchange(
                &id,
                Turn::user(format!("question {round}")),
                Turn::assistant(format!("answer {round}")),
            );
        }

        let turns = store.get(&id).expect("conversation exists").turns();
        assert_eq!(turns.len(), 6);
        for (index, turn) in turns.iter().enumerate() {
            let expected = if index % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(turn.role, expected);
        }
        assert_eq!(turns[4].content, "question 2");
    }
}
