//! Records persisted by the intake pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Payload, SubmissionKind};
use crate::db::Item;
use crate::errors::AppError;

/// Status assigned to every new partner request.
pub const PENDING_STATUS: &str = "PENDING";

/// An inquiry from an organization wanting a network partnership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerRequest {
    pub request_id: String,
    #[serde(rename = "type")]
    pub kind: SubmissionKind,
    pub organization: Option<Value>,
    pub contact: Option<Value>,
    pub email: Option<Value>,
    pub phone: Option<Value>,
    pub timestamp: i64,
    pub status: String,
}

/// A lightweight waitlist signup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistEntry {
    pub email: Option<Value>,
    pub timestamp: i64,
    pub request_id: String,
    #[serde(rename = "type")]
    pub kind: SubmissionKind,
}

/// A record ready to be written to exactly one store.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionRecord {
    Partner(PartnerRequest),
    Waitlist(WaitlistEntry),
}

impl SubmissionRecord {
    /// Build the record for a payload, copying fields verbatim.
    pub fn build(payload: &Payload, request_id: String, timestamp: i64) -> Self {
        match payload.kind() {
            SubmissionKind::Waitlist => SubmissionRecord::Waitlist(WaitlistEntry {
                email: payload.get("email"),
                timestamp,
                request_id,
                kind: SubmissionKind::Waitlist,
            }),
            SubmissionKind::Partner => SubmissionRecord::Partner(PartnerRequest {
                request_id,
                kind: SubmissionKind::Partner,
                organization: payload.get("organization"),
                contact: payload.get("contact"),
                email: payload.get("email"),
                phone: payload.get("phone"),
                timestamp,
                status: PENDING_STATUS.to_string(),
            }),
        }
    }

    pub fn kind(&self) -> SubmissionKind {
        match self {
            SubmissionRecord::Partner(_) => SubmissionKind::Partner,
            SubmissionRecord::Waitlist(_) => SubmissionKind::Waitlist,
        }
    }

    pub fn request_id(&self) -> &str {
        match self {
            SubmissionRecord::Partner(r) => &r.request_id,
            SubmissionRecord::Waitlist(r) => &r.request_id,
        }
    }

    /// Convert into the key-value mapping handed to a record store.
    pub fn to_item(&self) -> Result<Item, AppError> {
        let value = match self {
            SubmissionRecord::Partner(r) => serde_json::to_value(r),
            SubmissionRecord::Waitlist(r) => serde_json::to_value(r),
        }
        .map_err(|e| AppError::Internal(format!("Failed to serialize record: {}", e)))?;

        match value {
            Value::Object(item) => Ok(item),
            _ => Err(AppError::Internal(
                "Record did not serialize to an object".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        Payload::from_event(value).unwrap()
    }

    #[test]
    fn test_partner_record() {
        let record = SubmissionRecord::build(
            &payload(json!({
                "organization": "Acme",
                "contact": "Jo",
                "email": "jo@acme.com",
                "phone": "555-1000"
            })),
            "req-1".to_string(),
            1_700_000_000,
        );

        let item = record.to_item().unwrap();
        assert_eq!(
            Value::Object(item),
            json!({
                "requestId": "req-1",
                "type": "partner",
                "organization": "Acme",
                "contact": "Jo",
                "email": "jo@acme.com",
                "phone": "555-1000",
                "timestamp": 1_700_000_000,
                "status": "PENDING"
            })
        );
    }

    #[test]
    fn test_waitlist_record() {
        let record = SubmissionRecord::build(
            &payload(json!({ "type": "waitlist", "email": "a@b.com", "phone": "ignored" })),
            "req-2".to_string(),
            42,
        );

        assert_eq!(record.kind(), SubmissionKind::Waitlist);
        assert_eq!(record.request_id(), "req-2");
        assert_eq!(
            Value::Object(record.to_item().unwrap()),
            json!({
                "email": "a@b.com",
                "timestamp": 42,
                "requestId": "req-2",
                "type": "waitlist"
            })
        );
    }

    #[test]
    fn test_non_string_values_kept_as_submitted() {
        let record = SubmissionRecord::build(
            &payload(json!({ "phone": 5551000, "organization": { "name": "Acme" }, "contact": true })),
            "req-5".to_string(),
            7,
        );
        let item = record.to_item().unwrap();

        assert_eq!(item["phone"], json!(5551000));
        assert_eq!(item["organization"], json!({ "name": "Acme" }));
        assert_eq!(item["contact"], json!(true));

        let record = SubmissionRecord::build(
            &payload(json!({ "type": "waitlist", "email": ["a@b.com", "c@d.com"] })),
            "req-6".to_string(),
            7,
        );
        assert_eq!(
            record.to_item().unwrap()["email"],
            json!(["a@b.com", "c@d.com"])
        );
    }

    #[test]
    fn test_absent_fields_stay_null() {
        let record = SubmissionRecord::build(&payload(json!({})), "req-3".to_string(), 1);
        let item = record.to_item().unwrap();

        assert_eq!(item["type"], "partner");
        assert_eq!(item["status"], "PENDING");
        for field in ["organization", "contact", "email", "phone"] {
            assert!(item[field].is_null(), "{} should be null", field);
        }
    }

    #[test]
    fn test_caller_identity_fields_ignored() {
        let record = SubmissionRecord::build(
            &payload(json!({ "requestId": "spoofed", "timestamp": 1, "status": "APPROVED" })),
            "req-4".to_string(),
            99,
        );

        let SubmissionRecord::Partner(partner) = record else {
            panic!("expected partner record");
        };
        assert_eq!(partner.request_id, "req-4");
        assert_eq!(partner.timestamp, 99);
        assert_eq!(partner.status, "PENDING");
    }
}
