//! Envelope types and their JSON codec.
//!
//! Register metadata and signaling payloads are open-ended, so frames are
//! decoded through an explicit parse step over [`serde_json::Value`]
//! rather than a derived deserializer. Decoding fails soft: the caller
//! drops the frame and the connection lives on.

use serde_json::{Map, Value};
use thiserror::Error;

/// Why a frame failed to decode.
///
/// Never fatal; the router logs it and moves to the next frame.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The line is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The line parsed, but not to a JSON object.
    #[error("frame is not a JSON object")]
    NotAnObject,

    /// The object has no string `type` field.
    #[error("missing or non-string `type` field")]
    MissingType,

    /// A register frame without a string `userId`.
    #[error("register frame missing a string `userId`")]
    MissingUserId,
}

/// A registration request: binds `userId` to the connection it arrives on.
#[derive(Debug, Clone, PartialEq)]
pub struct Register {
    pub user_id: String,
    /// Every top-level field other than `type` and `userId`. Opaque to
    /// routing; stored on the entry and echoed in the ack.
    pub metadata: Map<String, Value>,
}

impl Register {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            metadata: Map::new(),
        }
    }

    /// Attach one metadata field, builder style.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    fn from_fields(mut fields: Map<String, Value>) -> Result<Self, DecodeError> {
        let user_id = match fields.remove("userId") {
            Some(Value::String(id)) => id,
            _ => return Err(DecodeError::MissingUserId),
        };
        Ok(Self {
            user_id,
            metadata: fields,
        })
    }
}

/// The acknowledgement emitted after a registration is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterAck {
    pub user_id: String,
    /// Metadata echoed back from the register frame.
    pub metadata: Map<String, Value>,
}

/// The message kinds the hub forwards by recipient identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayKind {
    /// Unicast chat (`"message"` on the wire).
    Chat,
    Offer,
    Answer,
    IceCandidate,
    /// Wrapper kind carrying an inner signal object in `data`.
    WebrtcSignal,
}

impl RelayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayKind::Chat => "message",
            RelayKind::Offer => "offer",
            RelayKind::Answer => "answer",
            RelayKind::IceCandidate => "ice-candidate",
            RelayKind::WebrtcSignal => "webrtc-signal",
        }
    }

    fn from_type(kind: &str) -> Option<RelayKind> {
        match kind {
            "message" => Some(RelayKind::Chat),
            "offer" => Some(RelayKind::Offer),
            "answer" => Some(RelayKind::Answer),
            "ice-candidate" => Some(RelayKind::IceCandidate),
            "webrtc-signal" => Some(RelayKind::WebrtcSignal),
            _ => None,
        }
    }

    /// Signaling frames are forwarded whole; chat frames are rebuilt from
    /// their defined fields on delivery.
    pub fn is_signal(&self) -> bool {
        !matches!(self, RelayKind::Chat)
    }
}

impl std::fmt::Display for RelayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An addressed frame the hub forwards without interpreting.
#[derive(Debug, Clone, PartialEq)]
pub struct Relay {
    pub kind: RelayKind,
    /// Recipient identifier. A relay without a usable string `to` cannot
    /// be routed and is dropped as recipient-absent.
    pub to: Option<String>,
    /// The remaining fields of the frame, carried as-is.
    pub fields: Map<String, Value>,
}

impl Relay {
    /// Build a chat frame.
    pub fn chat(
        to: impl Into<String>,
        from: impl Into<String>,
        message: impl Into<String>,
        timestamp: u64,
    ) -> Self {
        let mut fields = Map::new();
        fields.insert("from".into(), Value::String(from.into()));
        fields.insert("message".into(), Value::String(message.into()));
        fields.insert("timestamp".into(), Value::from(timestamp));
        Self {
            kind: RelayKind::Chat,
            to: Some(to.into()),
            fields,
        }
    }

    /// Build a signaling frame of the given kind.
    pub fn signal(kind: RelayKind, to: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            kind,
            to: Some(to.into()),
            fields,
        }
    }

    pub fn recipient(&self) -> Option<&str> {
        self.to.as_deref()
    }

    fn from_fields(kind: RelayKind, mut fields: Map<String, Value>) -> Self {
        let to = match fields.remove("to") {
            Some(Value::String(to)) => Some(to),
            _ => None,
        };
        // Chat carries exactly its defined fields; extras do not propagate.
        let fields = match kind {
            RelayKind::Chat => {
                let mut kept = Map::new();
                for key in ["from", "message", "timestamp"] {
                    if let Some(value) = fields.remove(key) {
                        kept.insert(key.to_string(), value);
                    }
                }
                kept
            }
            _ => fields,
        };
        Self { kind, to, fields }
    }
}

/// One parsed wire frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Register(Register),
    Registered(RegisterAck),
    Relay(Relay),
    /// Parsed fine, but not a kind the hub acts on.
    Unknown { kind: String },
}

impl Envelope {
    /// Parse one wire frame.
    pub fn decode(raw: &str) -> Result<Envelope, DecodeError> {
        let value: Value = serde_json::from_str(raw)?;
        let Value::Object(mut fields) = value else {
            return Err(DecodeError::NotAnObject);
        };
        let kind = match fields.remove("type") {
            Some(Value::String(kind)) => kind,
            _ => return Err(DecodeError::MissingType),
        };

        if kind == "register" {
            return Ok(Envelope::Register(Register::from_fields(fields)?));
        }
        if kind == "registered" {
            let reg = Register::from_fields(fields)?;
            return Ok(Envelope::Registered(RegisterAck {
                user_id: reg.user_id,
                metadata: reg.metadata,
            }));
        }
        match RelayKind::from_type(&kind) {
            Some(relay) => Ok(Envelope::Relay(Relay::from_fields(relay, fields))),
            None => Ok(Envelope::Unknown { kind }),
        }
    }

    /// The JSON object for this envelope.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        match self {
            Envelope::Register(reg) => {
                map.extend(reg.metadata.clone());
                map.insert("userId".into(), Value::String(reg.user_id.clone()));
                map.insert("type".into(), Value::String("register".into()));
            }
            Envelope::Registered(ack) => {
                map.extend(ack.metadata.clone());
                map.insert("userId".into(), Value::String(ack.user_id.clone()));
                map.insert("type".into(), Value::String("registered".into()));
            }
            Envelope::Relay(relay) => {
                map.extend(relay.fields.clone());
                if let Some(to) = &relay.to {
                    map.insert("to".into(), Value::String(to.clone()));
                }
                map.insert("type".into(), Value::String(relay.kind.as_str().into()));
            }
            Envelope::Unknown { kind } => {
                map.insert("type".into(), Value::String(kind.clone()));
            }
        }
        Value::Object(map)
    }

    /// Serialize for the wire. One line, no trailing newline.
    pub fn encode(&self) -> String {
        self.to_value().to_string()
    }
}
