//! Inbound submission payload.
//!
//! The payload is deliberately untyped: any JSON object is accepted and every
//! field lookup yields an `Option` instead of failing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::AppError;

/// Submission type, selecting which store a record lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionKind {
    Partner,
    Waitlist,
}

impl SubmissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionKind::Partner => "partner",
            SubmissionKind::Waitlist => "waitlist",
        }
    }

    /// Classify a raw `type` value. Only the exact string `"waitlist"` selects
    /// the waitlist; everything else, absence included, is a partner request.
    pub fn classify(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) if s == "waitlist" => SubmissionKind::Waitlist,
            _ => SubmissionKind::Partner,
        }
    }
}

impl std::fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A JSON object submitted by a caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload(Map<String, Value>);

impl Payload {
    /// Extract the payload from an invocation event.
    ///
    /// A truthy `body` field carries the payload as a JSON-encoded string
    /// (transport envelope); otherwise the event itself is the payload.
    pub fn from_event(event: Value) -> Result<Self, AppError> {
        let mut fields = match event {
            Value::Object(fields) => fields,
            other => {
                return Err(AppError::Parse(format!(
                    "Event must be a JSON object, got {}",
                    type_name(&other)
                )))
            }
        };

        match fields.remove("body") {
            Some(Value::String(raw)) if !raw.is_empty() => Self::from_json(&raw),
            Some(body) if is_truthy(&body) => Err(AppError::Parse(format!(
                "Event body must be a JSON-encoded string, got {}",
                type_name(&body)
            ))),
            Some(body) => {
                // Falsy body: the event is the payload, body included.
                fields.insert("body".to_string(), body);
                Ok(Self(fields))
            }
            None => Ok(Self(fields)),
        }
    }

    /// Parse a JSON-encoded payload.
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        match serde_json::from_str::<Value>(raw)? {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(AppError::Parse(format!(
                "Payload must be a JSON object, got {}",
                type_name(&other)
            ))),
        }
    }

    /// Read a field exactly as submitted. `null` and absent fields are `None`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.get(key).filter(|value| !value.is_null()).cloned()
    }

    pub fn kind(&self) -> SubmissionKind {
        SubmissionKind::classify(self.0.get("type"))
    }

    /// Pin the submission type, overriding whatever the caller declared.
    pub fn set_kind(&mut self, kind: SubmissionKind) {
        self.0
            .insert("type".to_string(), Value::String(kind.as_str().to_string()));
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
