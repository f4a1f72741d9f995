//! JSON response envelope shared by every route.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Envelope wrapping every API payload.
///
/// Success bodies carry `data`, failure bodies carry `error`. The
/// unused field is omitted rather than serialized as null.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// 200 with a success envelope.
pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse {
        success: true,
        data: Some(data),
        error: None,
        timestamp: timestamp(),
    })
}

/// 201 with a success envelope.
pub fn created<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(ApiResponse {
        success: true,
        data: Some(data),
        error: None,
        timestamp: timestamp(),
    })
}

/// Failure envelope with the given status.
pub fn fail(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(ApiResponse::<()> {
        success: false,
        data: None,
        error: Some(message.to_string()),
        timestamp: timestamp(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_omits_error() {
        let envelope = ApiResponse {
            success: true,
            data: Some(serde_json::json!({"id": 1})),
            error: None,
            timestamp: timestamp(),
        };
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["id"], 1);
        assert!(value.get("error").is_none());
        assert!(value["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_failure_envelope_omits_data() {
        let envelope = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some("Not found".to_string()),
            timestamp: timestamp(),
        };
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "Not found");
        assert!(value.get("data").is_none());
    }
}
