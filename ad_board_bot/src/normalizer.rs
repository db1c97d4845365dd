//! Turns raw posts into canonical ad records: the admission filter chain
//! and invite-link extraction.

use ad_board_commons::record::AdRecord;
use chrono::{DateTime, Utc};

use crate::{config::BotConfig, optout::OptOutStore, types::InboundPost};

/// Substrings that identify a token as a telegram invite link.
const INVITE_MARKERS: [&str; 2] = ["t.me/+", "t.me/joinchat"];

/// An admitted ad that may still need a fallback invite before it becomes
/// a full [`AdRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAd {
    pub server_name: String,
    pub category: String,
    pub content: String,
    /// Invite token found in the message text, if any. When [`None`], the
    /// handler asks telegram for a fresh link instead.
    pub invite: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub author_id: u64,
}

impl PendingAd {
    /// Finish the record with whatever invite resolution produced.
    pub fn into_record(self, invite: String) -> AdRecord {
        AdRecord {
            id: None,
            server_name: self.server_name,
            category: self.category,
            content: self.content,
            invite,
            timestamp: self.timestamp,
            author_id: self.author_id,
        }
    }
}

/// Apply the admission filters to one post. Returns [`None`] for anything
/// that shouldn't be tracked; that is policy, not an error, so it's silent.
pub async fn normalize(
    post: &InboundPost,
    config: &BotConfig,
    optout: &OptOutStore,
) -> Option<PendingAd> {
    // Bots don't get tracked. This one included.
    if post.author_is_bot {
        return None;
    }

    // Only the one tracked chat is interesting. DMs in particular are not.
    if post.chat_is_private || post.chat_id != config.tracked_chat {
        return None;
    }

    if optout.contains(post.author_id).await {
        return None;
    }

    if post.text.trim().is_empty() {
        return None;
    }

    // A message outside any topic has no category to file under.
    let topic_id = post.topic_id?;
    let category = config.category_name(topic_id)?;

    Some(PendingAd {
        server_name: post.server_name.clone(),
        category: category.to_owned(),
        content: post.text.clone(),
        invite: find_invite_token(&post.text).map(str::to_owned),
        timestamp: post.sent_at,
        author_id: post.author_id,
    })
}

/// Find the first whitespace-delimited token that looks like an invite
/// link. The token is returned verbatim.
pub fn find_invite_token(text: &str) -> Option<&str> {
    text.split_whitespace()
        .find(|word| INVITE_MARKERS.iter().any(|marker| word.contains(marker)))
}
