use chrono::{DateTime, Utc};
use teloxide::types::{ChatId, Message};

/// Everything the admission chain needs to know about one incoming message,
/// detached from the SDK types so the chain stays testable.
#[derive(Debug, Clone)]
pub struct InboundPost {
    pub author_id: u64,
    pub author_is_bot: bool,
    pub chat_id: ChatId,
    pub chat_is_private: bool,
    /// Title of the chat the message was posted in.
    pub server_name: String,
    /// Forum topic the message was posted under, if any.
    pub topic_id: Option<i32>,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl InboundPost {
    /// Project a telegram message down to the fields tracking cares about.
    /// Returns [`None`] for messages with no identifiable author, like
    /// anonymous channel posts.
    pub fn from_message(message: &Message) -> Option<Self> {
        let author = message.from.as_ref()?;

        Some(InboundPost {
            author_id: author.id.0,
            author_is_bot: author.is_bot,
            chat_id: message.chat.id,
            chat_is_private: message.chat.is_private(),
            server_name: message.chat.title().unwrap_or("(unnamed chat)").to_owned(),
            topic_id: message.thread_id.map(|thread| thread.0 .0),
            text: message.text().unwrap_or_default().to_owned(),
            sent_at: message.date,
        })
    }
}

/// What became of one submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The backend stored a new record.
    Accepted,
    /// The backend had already stored a record for this author and instant.
    Duplicate,
    /// The backend was unreachable or refused the record.
    Failed,
}
