use chrono::{DateTime, SecondsFormat, Utc};

/// A stored paste.
///
/// Timestamps are milliseconds since the Unix epoch. Records are never
/// deleted; whether a reader can see one is decided by [`PasteRecord::is_visible`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteRecord {
    pub content: String,
    pub created_at: i64,
    pub expires_at: Option<i64>,
    pub max_views: Option<u64>,
    pub views: u64,
}

impl PasteRecord {
    /// A fresh record with no views yet.
    pub fn new(
        content: String,
        created_at: i64,
        expires_at: Option<i64>,
        max_views: Option<u64>,
    ) -> Self {
        PasteRecord {
            content,
            created_at,
            expires_at,
            max_views,
            views: 0,
        }
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    pub fn is_exhausted(&self) -> bool {
        self.max_views.is_some_and(|max_views| self.views >= max_views)
    }

    /// Whether a read at `now` would succeed.
    pub fn is_visible(&self, now: i64) -> bool {
        !self.is_expired(now) && !self.is_exhausted()
    }

    /// Views left before the cap is reached, or `None` if unlimited.
    pub fn remaining_views(&self) -> Option<u64> {
        self.max_views
            .map(|max_views| max_views.saturating_sub(self.views))
    }

    /// Expiry instant as an RFC 3339 UTC string with millisecond precision.
    pub fn expires_at_rfc3339(&self) -> Option<String> {
        self.expires_at.and_then(millis_to_rfc3339)
    }

    pub fn created_at_rfc3339(&self) -> Option<String> {
        millis_to_rfc3339(self.created_at)
    }
}

fn millis_to_rfc3339(millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
}
