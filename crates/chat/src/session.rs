use sov_types::{ChatMessage, Role};

/// Conversation state owned by the caller
///
/// Always starts with exactly one system message. Every request sends the
/// full message list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    system_prompt: String,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        let system_prompt = system_prompt.into();
        let messages = vec![ChatMessage::system(system_prompt.clone())];
        Self {
            system_prompt,
            messages,
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Drop the history, keeping only the system message
    pub fn clear(&mut self) {
        self.messages.truncate(1);
    }

    /// Number of user messages sent so far
    #[must_use]
    pub fn turns(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == Role::User)
            .count()
    }
}
