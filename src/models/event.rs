// src/models/event.rs
use serde_json::Value;

/// Provider call notification, decoded from the raw webhook payload.
///
/// The payload shape is Telnyx-style: `data.event_type` names the event and
/// `data.payload` carries the call-control id and, on hangup, the reported
/// duration. Anything unrecognized maps to `Unknown` so the state machine
/// stays exhaustive without rejecting new provider event kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallEvent {
    Initiated { call_control_id: String },
    Answered { call_control_id: String },
    Hangup { call_control_id: String, duration_secs: Option<i64> },
    Failed { call_control_id: String },
    Unknown { call_control_id: Option<String> },
}

impl CallEvent {
    pub fn parse(payload: &Value) -> Self {
        let data = &payload["data"];
        let call_control_id = data["payload"]["call_control_id"]
            .as_str()
            .map(|s| s.to_string());

        let event_type = match data["event_type"].as_str() {
            Some(t) => t,
            None => return CallEvent::Unknown { call_control_id },
        };

        match (event_type, call_control_id) {
            ("call.initiated", Some(id)) => CallEvent::Initiated { call_control_id: id },
            ("call.answered", Some(id)) => CallEvent::Answered { call_control_id: id },
            ("call.hangup", Some(id)) => CallEvent::Hangup {
                call_control_id: id,
                duration_secs: data["payload"]["duration_seconds"].as_i64(),
            },
            ("call.failed", Some(id)) => CallEvent::Failed { call_control_id: id },
            (_, id) => CallEvent::Unknown { call_control_id: id },
        }
    }

    pub fn call_control_id(&self) -> Option<&str> {
        match self {
            CallEvent::Initiated { call_control_id }
            | CallEvent::Answered { call_control_id }
            | CallEvent::Hangup { call_control_id, .. }
            | CallEvent::Failed { call_control_id } => Some(call_control_id),
            CallEvent::Unknown { call_control_id } => call_control_id.as_deref(),
        }
    }
}
