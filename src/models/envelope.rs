//! Response envelope returned for every invocation.

use std::collections::BTreeMap;

use axum::{
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const APPLICATION_JSON: &str = "application/json";
pub const SUCCESS_MESSAGE: &str = "Submission successful";

/// Uniform `{statusCode, body, headers}` wrapper. `body` is a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub body: String,
    pub headers: BTreeMap<String, String>,
}

impl ResponseEnvelope {
    pub fn success(request_id: &str) -> Self {
        Self::json(
            StatusCode::OK,
            json!({ "message": SUCCESS_MESSAGE, "requestId": request_id }),
        )
    }

    pub fn failure(status: StatusCode, description: &str) -> Self {
        Self::json(status, json!({ "error": description }))
    }

    fn json(status: StatusCode, body: serde_json::Value) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string());

        Self {
            status_code: status.as_u16(),
            body: body.to_string(),
            headers,
        }
    }
}

/// Maps the envelope onto a plain HTTP response, the way a function URL does.
impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, self.body).into_response();

        for (name, value) in &self.headers {
            match (
                HeaderName::try_from(name.as_str()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    response.headers_mut().insert(name, value);
                }
                _ => tracing::warn!("Dropping invalid response header {:?}", name),
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;
    use serde_json::Value;

    #[test]
    fn test_success_envelope() {
        let envelope = ResponseEnvelope::success("abc");
        assert_eq!(envelope.status_code, 200);
        assert_eq!(envelope.headers[CONTENT_TYPE], APPLICATION_JSON);

        let body: Value = serde_json::from_str(&envelope.body).unwrap();
        assert_eq!(
            body,
            json!({ "message": "Submission successful", "requestId": "abc" })
        );
    }

    #[test]
    fn test_failure_envelope_serialization() {
        let envelope = ResponseEnvelope::failure(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["statusCode"], 500);
        assert_eq!(value["headers"]["Content-Type"], "application/json");
        let body: Value = serde_json::from_str(value["body"].as_str().unwrap()).unwrap();
        assert_eq!(body, json!({ "error": "boom" }));
    }

    #[test]
    fn test_into_http_response() {
        let response = ResponseEnvelope::failure(StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
