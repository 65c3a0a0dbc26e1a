/*!
 * Wire types for the chat server's websocket event stream.
 *
 * Every frame is a JSON envelope `{event, data, ...}`. For `posted` events
 * the post itself arrives as a JSON document encoded in the `data.post`
 * string, so parsing happens in two steps.
 */

use chrono::{DateTime, TimeZone, Utc};
use log::trace;
use serde::{Deserialize, Serialize};

/// Event name carrying a new post
pub const POSTED_EVENT: &str = "posted";

/// Action name of the authentication message
pub const AUTH_ACTION: &str = "authentication_challenge";

/// Outer frame envelope
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub event: Option<String>,

    #[serde(default)]
    pub data: Option<EnvelopeData>,
}

/// Payload of a `posted` envelope
#[derive(Debug, Deserialize)]
pub struct EnvelopeData {
    /// JSON-encoded post
    #[serde(default)]
    pub post: Option<String>,
}

/// Post as it appears inside `data.post`
#[derive(Debug, Deserialize)]
pub struct RawPost {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub channel_id: String,

    #[serde(default)]
    pub user_id: String,

    #[serde(default)]
    pub message: Option<String>,

    /// Epoch milliseconds
    #[serde(default)]
    pub create_at: Option<i64>,
}

/// A post accepted from the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingPost {
    /// Server-assigned id, when present
    pub id: Option<String>,
    pub channel_id: String,
    pub user_id: String,
    /// Message text, trimmed
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl IncomingPost {
    /// Normalize a raw post, using `now` for missing or non-positive timestamps
    pub fn from_raw(raw: RawPost, now: DateTime<Utc>) -> Self {
        let created_at = raw
            .create_at
            .filter(|ms| *ms > 0)
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .unwrap_or(now);

        Self {
            id: raw.id.filter(|id| !id.is_empty()),
            channel_id: raw.channel_id,
            user_id: raw.user_id,
            text: raw.message.unwrap_or_default().trim().to_string(),
            created_at,
        }
    }

    /// Id for display and events; empty when the server sent none
    pub fn id_or_empty(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }
}

/// Authentication message sent right after connecting
#[derive(Debug, Serialize)]
pub struct AuthChallenge<'a> {
    pub seq: u64,
    pub action: &'static str,
    pub data: AuthData<'a>,
}

#[derive(Debug, Serialize)]
pub struct AuthData<'a> {
    pub token: &'a str,
}

impl<'a> AuthChallenge<'a> {
    pub fn new(seq: u64, token: &'a str) -> Self {
        Self {
            seq,
            action: AUTH_ACTION,
            data: AuthData { token },
        }
    }
}

/// Extract a post from a `posted` frame; anything else yields `None`
pub fn parse_posted_frame(raw: &str) -> Option<RawPost> {
    let envelope: Envelope = match serde_json::from_str(raw) {
        Ok(envelope) => envelope,
        Err(e) => {
            trace!("Dropping non-JSON frame: {}", e);
            return None;
        }
    };

    if envelope.event.as_deref() != Some(POSTED_EVENT) {
        trace!("Dropping '{}' event", envelope.event.as_deref().unwrap_or("<none>"));
        return None;
    }

    let post_json = envelope.data.and_then(|data| data.post)?;
    match serde_json::from_str::<RawPost>(&post_json) {
        Ok(post) => Some(post),
        Err(e) => {
            trace!("Dropping posted frame with unreadable post: {}", e);
            None
        }
    }
}
