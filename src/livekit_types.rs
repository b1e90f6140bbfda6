//! JSON bodies for LiveKit's Twirp server API.  LiveKit accepts protobuf field names, and
//! answers with them; the camelCase aliases cover servers configured for camelCase output.

mod room {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Debug)]
    pub struct CreateRoomRequest {
        pub name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub empty_timeout: Option<u32>,
    }

    #[derive(Deserialize, Debug, Default)]
    pub struct Room {
        #[serde(default)]
        pub sid: String,
        #[serde(default)]
        pub name: String,
    }
}
pub use room::*;

mod dispatch {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Debug)]
    pub struct CreateAgentDispatchRequest {
        pub agent_name: String,
        pub room: String,
        pub metadata: String,
    }

    #[derive(Deserialize, Debug, Default)]
    pub struct AgentDispatch {
        #[serde(default)]
        pub id: String,
    }
}
pub use dispatch::*;

mod sip {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Debug)]
    pub struct CreateSipParticipantRequest {
        pub sip_trunk_id: String,
        pub sip_call_to: String,
        pub room_name: String,
        pub participant_identity: String,
        pub participant_name: String,
        pub krisp_enabled: bool,
        pub wait_until_answered: bool,
    }

    #[derive(Deserialize, Debug, Default)]
    pub struct SipParticipantInfo {
        #[serde(default, alias = "participantId")]
        pub participant_id: String,
        #[serde(default, alias = "participantIdentity")]
        pub participant_identity: String,
        #[serde(default, alias = "sipCallId")]
        pub sip_call_id: String,
    }
}
pub use sip::*;

mod twirp {
    use serde::Deserialize;

    /// Error body returned by Twirp on any non-2xx response.
    #[derive(Deserialize, Debug)]
    pub struct TwirpError {
        pub code: String,
        #[serde(default)]
        pub msg: String,
    }
}
pub use twirp::*;

mod token {
    use serde::Serialize;

    /// Access token claims for server API calls.
    #[derive(Serialize, Debug)]
    pub struct Claims {
        pub iss: String,
        pub nbf: i64,
        pub exp: i64,
        pub video: VideoGrant,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub sip: Option<SipGrant>,
    }

    #[derive(Serialize, Debug, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct VideoGrant {
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        pub room_create: bool,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        pub room_admin: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub room: Option<String>,
    }

    #[derive(Serialize, Debug)]
    pub struct SipGrant {
        pub call: bool,
    }
}
pub use token::*;
