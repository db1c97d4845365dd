use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel stored when no invite link could be found in a message
/// nor created for its chat.
pub const NO_INVITE: &str = "No invite";

/// One tracked advertisement, as persisted by the backend and shown on
/// the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdRecord {
    /// Storage-assigned identifier. Absent until the backend accepts
    /// the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Title of the chat the ad was posted in.
    pub server_name: String,
    /// Category name resolved from the posting topic.
    pub category: String,
    /// Raw message text. Never blank.
    pub content: String,
    /// Invite link found in the message or created for its chat,
    /// or [`NO_INVITE`].
    pub invite: String,
    /// When the message was sent. Together with `author_id`, this is the
    /// dedup key: at most one record may be stored per pair.
    pub timestamp: DateTime<Utc>,
    pub author_id: u64,
}

/// The wire shape of `POST /ads`. Every field is optional so validation
/// can name exactly which ones a submission lacks.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AdSubmission {
    pub server_name: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
    pub invite: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub author_id: Option<u64>,
}

/// A submission lacked required fields. Lists every absent one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing required fields: {}", .0.join(", "))]
pub struct MissingFields(pub Vec<&'static str>);

impl AdSubmission {
    /// Check required-field presence and build the canonical record.
    ///
    /// Whitespace-only `content` counts as missing. A missing `invite` is
    /// not an error; the sentinel takes its place.
    pub fn validate(self) -> Result<AdRecord, MissingFields> {
        let mut missing = Vec::new();

        if self.server_name.is_none() {
            missing.push("server_name");
        }
        if self.category.is_none() {
            missing.push("category");
        }
        if self.content.as_deref().map_or(true, |c| c.trim().is_empty()) {
            missing.push("content");
        }
        if self.timestamp.is_none() {
            missing.push("timestamp");
        }
        if self.author_id.is_none() {
            missing.push("author_id");
        }

        if !missing.is_empty() {
            return Err(MissingFields(missing));
        }

        let (Some(server_name), Some(category), Some(content), Some(timestamp), Some(author_id)) = (
            self.server_name,
            self.category,
            self.content,
            self.timestamp,
            self.author_id,
        ) else {
            unreachable!("presence was checked above");
        };

        Ok(AdRecord {
            id: None,
            server_name,
            category,
            content,
            invite: self.invite.unwrap_or_else(|| NO_INVITE.to_owned()),
            timestamp,
            author_id,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::TimeZone;

    fn full_submission() -> AdSubmission {
        AdSubmission {
            server_name: Some("Ad Fair".to_owned()),
            category: Some("Partners".to_owned()),
            content: Some("selling socks, dm me".to_owned()),
            invite: Some("https://t.me/+AAAAAAAAAAAAAAAA".to_owned()),
            timestamp: Some(Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap()),
            author_id: Some(42),
        }
    }

    #[test]
    fn validates_a_full_submission() {
        let record = full_submission().validate().unwrap();
        assert_eq!(record.id, None);
        assert_eq!(record.server_name, "Ad Fair");
        assert_eq!(record.category, "Partners");
        assert_eq!(record.content, "selling socks, dm me");
        assert_eq!(record.invite, "https://t.me/+AAAAAAAAAAAAAAAA");
        assert_eq!(record.author_id, 42);
    }

    #[test]
    fn names_every_missing_field() {
        let error = AdSubmission::default().validate().unwrap_err();
        assert_eq!(
            error.0,
            vec!["server_name", "category", "content", "timestamp", "author_id"]
        );
    }

    #[test]
    fn blank_content_counts_as_missing() {
        let mut submission = full_submission();
        submission.content = Some("  \n\t ".to_owned());
        let error = submission.validate().unwrap_err();
        assert_eq!(error.0, vec!["content"]);
        assert!(error.to_string().contains("content"));
    }

    #[test]
    fn missing_invite_gets_the_sentinel() {
        let mut submission = full_submission();
        submission.invite = None;
        let record = submission.validate().unwrap();
        assert_eq!(record.invite, NO_INVITE);
    }
}
