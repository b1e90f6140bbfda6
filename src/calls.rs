use crate::config::Config;
use crate::error::PlatformError;
use crate::types::{CallPlatform, OutboundCallRequest, OutboundCallResponse, SipCallRequest};
use crate::utils::{agent_metadata_payload, participant_identity, participant_name};

use time::OffsetDateTime;
use tracing::{info, warn};

/// Create a room, dispatch the agent into it, then dial the callee into the same room.
///
/// Steps run strictly in order and the first failure ends the sequence.  Nothing is rolled
/// back: a room created before a later step fails is left for LiveKit's empty timeout to
/// close.
pub async fn launch_outbound_call(
    platform: &dyn CallPlatform,
    config: &Config,
    request: &OutboundCallRequest,
) -> Result<OutboundCallResponse, PlatformError> {
    let room = platform.create_room().await?;
    info!(room=%room.name, room_sid=%room.sid, "created room");

    let metadata = agent_metadata_payload(request.agent_metadata.as_ref(), config.krisp_enabled);
    info!(agent=%request.agent_name, room=%room.name, "dispatching agent");
    let dispatch = platform
        .dispatch_agent(&room, &request.agent_name, &metadata)
        .await
        .map_err(|e| {
            warn!(room=%room.name, "room left behind after failed agent dispatch");
            e
        })?;
    info!(dispatch=%dispatch.id, agent=%dispatch.agent_name, "agent dispatched");

    let call = SipCallRequest {
        phone_number: request.phone_number.clone(),
        trunk_id: config.sip_trunk_id.clone(),
        participant_identity: participant_identity(
            &request.caller_name,
            OffsetDateTime::now_utc().unix_timestamp(),
        ),
        participant_name: participant_name(&request.caller_name),
        krisp_enabled: config.krisp_enabled,
        wait_until_answered: config.wait_until_answered,
    };
    let participant = platform.place_sip_call(&room, &call).await.map_err(|e| {
        warn!(room=%room.name, dispatch=%dispatch.id, "room left behind after failed sip call");
        e
    })?;

    info!(
        room=%room.name,
        participant_sid=%participant.participant_id,
        identity=%participant.participant_identity,
        sip_call_id=%participant.sip_call_id,
        "outbound call placed"
    );
    Ok(OutboundCallResponse {
        room_name: room.name,
        participant_sid: participant.participant_id,
    })
}
