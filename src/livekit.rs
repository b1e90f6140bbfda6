use crate::consts::{ROOM_EMPTY_TIMEOUT_SECS, TOKEN_TTL_SECS};
use crate::error::PlatformError;
use crate::livekit_types::{
    AgentDispatch, Claims, CreateAgentDispatchRequest, CreateRoomRequest,
    CreateSipParticipantRequest, Room, SipGrant, SipParticipantInfo, TwirpError, VideoGrant,
};
use crate::types::{
    AgentDispatchHandle, CallPlatform, ParticipantHandle, RoomHandle, SipCallRequest,
};
use crate::utils::{api_base_url, generate_room_name};

use async_trait::async_trait;
use jsonwebtoken::{EncodingKey, Header};
use serde::{de::DeserializeOwned, Serialize};
use time::OffsetDateTime;
use tracing::{debug, error};

const ROOM_SERVICE: &str = "livekit.RoomService";
const AGENT_DISPATCH_SERVICE: &str = "livekit.AgentDispatchService";
const SIP_SERVICE: &str = "livekit.SIP";

/// Client for LiveKit's server API.  Built once at startup and shared by every request; the
/// inner `reqwest::Client` pools connections.
pub struct LiveKitClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

impl LiveKitClient {
    pub fn new(
        http_client: reqwest::Client,
        livekit_url: &str,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            base_url: api_base_url(livekit_url),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    fn access_token(
        &self,
        video: VideoGrant,
        sip: Option<SipGrant>,
    ) -> Result<String, PlatformError> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            iss: self.api_key.clone(),
            nbf: now,
            exp: now + TOKEN_TTL_SECS,
            video,
            sip,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.api_secret.as_bytes()),
        )?;
        Ok(token)
    }

    /// POST a Twirp JSON request and decode the answer.
    async fn twirp<Req, Resp>(
        &self,
        service: &str,
        method: &str,
        token: String,
        body: &Req,
    ) -> Result<Resp, PlatformError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/twirp/{service}/{method}", self.base_url);
        debug!(url=%url, "livekit request");
        let resp = self
            .http_client
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(error=%e, service, method, "failed to reach livekit");
                PlatformError::Unavailable(e)
            })?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            let (code, message) = match serde_json::from_slice::<TwirpError>(&bytes) {
                Ok(e) => (e.code, e.msg),
                Err(_) => (
                    "unknown".to_string(),
                    String::from_utf8_lossy(&bytes).into_owned(),
                ),
            };
            error!(status=%status, code=%code, service, method, "livekit rejected request");
            return Err(PlatformError::Rejected {
                status: status.as_u16(),
                code,
                message,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            error!(error=%e, service, method, "failed to decode livekit response");
            PlatformError::Decode(e.to_string())
        })
    }
}

#[async_trait]
impl CallPlatform for LiveKitClient {
    async fn create_room(&self) -> Result<RoomHandle, PlatformError> {
        let token = self.access_token(
            VideoGrant {
                room_create: true,
                ..Default::default()
            },
            None,
        )?;
        let request = CreateRoomRequest {
            name: generate_room_name(),
            empty_timeout: Some(ROOM_EMPTY_TIMEOUT_SECS),
        };
        let room: Room = self
            .twirp(ROOM_SERVICE, "CreateRoom", token, &request)
            .await?;
        // Older servers omit the name; it's the one we asked for either way.
        let name = if room.name.is_empty() {
            request.name
        } else {
            room.name
        };
        Ok(RoomHandle {
            name,
            sid: room.sid,
        })
    }

    async fn dispatch_agent(
        &self,
        room: &RoomHandle,
        agent_name: &str,
        metadata: &str,
    ) -> Result<AgentDispatchHandle, PlatformError> {
        let token = self.access_token(
            VideoGrant {
                room_admin: true,
                room: Some(room.name.clone()),
                ..Default::default()
            },
            None,
        )?;
        let request = CreateAgentDispatchRequest {
            agent_name: agent_name.to_string(),
            room: room.name.clone(),
            metadata: metadata.to_string(),
        };
        let dispatch: AgentDispatch = self
            .twirp(AGENT_DISPATCH_SERVICE, "CreateDispatch", token, &request)
            .await?;
        Ok(AgentDispatchHandle {
            id: dispatch.id,
            agent_name: request.agent_name,
        })
    }

    async fn place_sip_call(
        &self,
        room: &RoomHandle,
        call: &SipCallRequest,
    ) -> Result<ParticipantHandle, PlatformError> {
        let token = self.access_token(
            VideoGrant {
                room_admin: true,
                room: Some(room.name.clone()),
                ..Default::default()
            },
            Some(SipGrant { call: true }),
        )?;
        let request = CreateSipParticipantRequest {
            sip_trunk_id: call.trunk_id.clone(),
            sip_call_to: call.phone_number.clone(),
            room_name: room.name.clone(),
            participant_identity: call.participant_identity.clone(),
            participant_name: call.participant_name.clone(),
            krisp_enabled: call.krisp_enabled,
            wait_until_answered: call.wait_until_answered,
        };
        let info: SipParticipantInfo = self
            .twirp(SIP_SERVICE, "CreateSIPParticipant", token, &request)
            .await?;
        if info.participant_id.is_empty() {
            return Err(PlatformError::Decode(
                "sip participant response has no participant_id".to_string(),
            ));
        }
        Ok(ParticipantHandle {
            participant_id: info.participant_id,
            participant_identity: info.participant_identity,
            sip_call_id: info.sip_call_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{Algorithm, DecodingKey, Validation};
    use serde_json::{json, Value};
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> LiveKitClient {
        LiveKitClient::new(reqwest::Client::new(), &server.uri(), "APIkey", "s3cret")
    }

    fn room() -> RoomHandle {
        RoomHandle {
            name: "outbound-abc".to_string(),
            sid: "RM_1".to_string(),
        }
    }

    fn claims_of(request: &wiremock::Request) -> Value {
        let auth = request.headers.get("authorization").unwrap().to_str().unwrap();
        let token = auth.strip_prefix("Bearer ").unwrap();
        let validation = Validation::new(Algorithm::HS256);
        jsonwebtoken::decode::<Value>(token, &DecodingKey::from_secret(b"s3cret"), &validation)
            .unwrap()
            .claims
    }

    #[tokio::test]
    async fn create_room_posts_generated_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.RoomService/CreateRoom"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sid": "RM_1" })))
            .expect(1)
            .mount(&server)
            .await;

        let handle = client(&server).create_room().await.unwrap();
        assert!(handle.name.starts_with("outbound-"));
        assert_eq!(handle.sid, "RM_1");

        let requests = server.received_requests().await.unwrap();
        let body: Value = requests[0].body_json().unwrap();
        assert_eq!(body["name"], handle.name.as_str());
        assert_eq!(body["empty_timeout"], ROOM_EMPTY_TIMEOUT_SECS);
        let claims = claims_of(&requests[0]);
        assert_eq!(claims["iss"], "APIkey");
        assert_eq!(claims["video"]["roomCreate"], true);
    }

    #[tokio::test]
    async fn dispatch_agent_targets_the_room() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.AgentDispatchService/CreateDispatch"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "AD_1",
                "agent_name": "SurveyAgent",
                "room": "outbound-abc"
            })))
            .mount(&server)
            .await;

        let handle = client(&server)
            .dispatch_agent(&room(), "SurveyAgent", r#"{"campaign_id":42}"#)
            .await
            .unwrap();
        assert_eq!(handle.id, "AD_1");

        let requests = server.received_requests().await.unwrap();
        let body: Value = requests[0].body_json().unwrap();
        assert_eq!(
            body,
            json!({
                "agent_name": "SurveyAgent",
                "room": "outbound-abc",
                "metadata": "{\"campaign_id\":42}"
            })
        );
        let claims = claims_of(&requests[0]);
        assert_eq!(claims["video"]["roomAdmin"], true);
        assert_eq!(claims["video"]["room"], "outbound-abc");
    }

    #[tokio::test]
    async fn place_sip_call_returns_participant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/twirp/livekit.SIP/CreateSIPParticipant"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "participant_id": "PA_1",
                "participant_identity": "Acme-caller-1",
                "room_name": "outbound-abc",
                "sip_call_id": "SCL_1"
            })))
            .mount(&server)
            .await;

        let call = SipCallRequest {
            phone_number: "+15551234567".to_string(),
            trunk_id: "ST_trunk".to_string(),
            participant_identity: "Acme-caller-1".to_string(),
            participant_name: "Acme".to_string(),
            krisp_enabled: true,
            wait_until_answered: false,
        };
        let participant = client(&server).place_sip_call(&room(), &call).await.unwrap();
        assert_eq!(participant.participant_id, "PA_1");
        assert_eq!(participant.sip_call_id, "SCL_1");

        let requests = server.received_requests().await.unwrap();
        let body: Value = requests[0].body_json().unwrap();
        assert_eq!(body["sip_trunk_id"], "ST_trunk");
        assert_eq!(body["sip_call_to"], "+15551234567");
        assert_eq!(body["room_name"], "outbound-abc");
        assert_eq!(body["krisp_enabled"], true);
        assert_eq!(body["wait_until_answered"], false);
        assert_eq!(claims_of(&requests[0])["sip"]["call"], true);
    }

    #[tokio::test]
    async fn twirp_errors_become_rejections() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "code": "unauthenticated",
                "msg": "invalid API key"
            })))
            .mount(&server)
            .await;

        let err = client(&server).create_room().await.unwrap_err();
        match err {
            PlatformError::Rejected {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 401);
                assert_eq!(code, "unauthenticated");
                assert_eq!(message, "invalid API key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_participant_id_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let call = SipCallRequest {
            phone_number: "+15551234567".to_string(),
            trunk_id: "ST_trunk".to_string(),
            participant_identity: "Acme-caller-1".to_string(),
            participant_name: "Acme".to_string(),
            krisp_enabled: false,
            wait_until_answered: false,
        };
        let err = client(&server)
            .place_sip_call(&room(), &call)
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_server_is_unavailable() {
        // Nothing listens on port 9 of localhost.
        let client = LiveKitClient::new(
            reqwest::Client::new(),
            "ws://127.0.0.1:9",
            "APIkey",
            "s3cret",
        );
        let err = client.create_room().await.unwrap_err();
        assert!(matches!(err, PlatformError::Unavailable(_)));
    }
}
