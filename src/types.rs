use crate::config::Config;
use crate::error::{AppError, PlatformError};
use crate::utils::is_e164;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use utoipa::ToSchema;

/// Body of `POST /calls/outbound`.
#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct OutboundCallRequest {
    /// Destination phone number in E.164 format (e.g. +15551234567)
    #[schema(example = "+15551234567")]
    pub phone_number: String,
    /// Display name for the caller in the LiveKit room
    pub caller_name: String,
    /// Name of the LiveKit agent to dispatch
    #[schema(example = "SurveyAgent")]
    pub agent_name: String,
    /// Arbitrary JSON object forwarded to the agent dispatch
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub agent_metadata: Option<Map<String, Value>>,
}

impl OutboundCallRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if !is_e164(&self.phone_number) {
            return Err(AppError::Validation {
                field: "phone_number",
                message: "phone number must be E.164 (start with '+' and digits)",
            });
        }
        if self.agent_name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "agent_name",
                message: "agent name must not be empty",
            });
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct OutboundCallResponse {
    pub room_name: String,
    pub participant_sid: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomHandle {
    pub name: String,
    pub sid: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDispatchHandle {
    pub id: String,
    pub agent_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantHandle {
    pub participant_id: String,
    pub participant_identity: String,
    pub sip_call_id: String,
}

/// Everything LiveKit needs to dial a number into a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SipCallRequest {
    pub phone_number: String,
    pub trunk_id: String,
    pub participant_identity: String,
    pub participant_name: String,
    pub krisp_enabled: bool,
    pub wait_until_answered: bool,
}

/// Control-plane operations needed to launch an outbound call.  None of them are idempotent:
/// calling `create_room` twice creates two rooms.
#[async_trait]
pub trait CallPlatform: Send + Sync {
    async fn create_room(&self) -> Result<RoomHandle, PlatformError>;

    async fn dispatch_agent(
        &self,
        room: &RoomHandle,
        agent_name: &str,
        metadata: &str,
    ) -> Result<AgentDispatchHandle, PlatformError>;

    async fn place_sip_call(
        &self,
        room: &RoomHandle,
        call: &SipCallRequest,
    ) -> Result<ParticipantHandle, PlatformError>;
}

pub struct AppState {
    pub config: Config,
    pub platform: Arc<dyn CallPlatform>,
}
