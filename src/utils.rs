use crate::consts::ROOM_PREFIX;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use uuid::Uuid;

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+[0-9]{7,15}$").unwrap());

/// E.164: a '+' followed by 7 to 15 ASCII digits.
pub fn is_e164(number: &str) -> bool {
    PHONE_RE.is_match(number)
}

pub fn generate_room_name() -> String {
    format!("{ROOM_PREFIX}-{}", Uuid::new_v4().simple())
}

pub fn participant_identity(caller_name: &str, timestamp: i64) -> String {
    format!("{caller_name}-caller-{timestamp}")
}

pub fn participant_name(caller_name: &str) -> String {
    let trimmed = caller_name.trim();
    if trimmed.is_empty() {
        "Caller".to_string()
    } else {
        trimmed.to_string()
    }
}

/// LiveKit URLs are usually handed out as websocket URLs; the server API lives on the same
/// host over http(s).
pub fn api_base_url(livekit_url: &str) -> String {
    let url = livekit_url.trim().trim_end_matches('/');
    if let Some(rest) = url.strip_prefix("wss://") {
        format!("https://{rest}")
    } else if let Some(rest) = url.strip_prefix("ws://") {
        format!("http://{rest}")
    } else {
        url.to_string()
    }
}

/// Serialize the metadata handed to the agent.  Caller keys are passed through untouched;
/// `krisp_enabled` is only added when the caller did not set it.
pub fn agent_metadata_payload(metadata: Option<&Map<String, Value>>, krisp_enabled: bool) -> String {
    let mut payload = metadata.cloned().unwrap_or_default();
    payload
        .entry("krisp_enabled")
        .or_insert(Value::Bool(krisp_enabled));
    Value::Object(payload).to_string()
}
