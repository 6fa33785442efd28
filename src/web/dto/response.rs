//! Response DTOs for Web API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::envelope::{Envelope, MessageKey, Status};
use crate::i18n::Localizer;

/// JSON body returned by every API route.
#[derive(Debug, Serialize)]
pub struct EnvelopeBody<T: Serialize> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// HTTP status code, repeated in the body.
    pub status_code: u16,
    /// Payload, present only on success.
    pub data: Option<T>,
    /// Catalogue key of the message.
    pub message_key: MessageKey,
    /// Localized message text.
    pub message: String,
}

impl<T: Serialize> EnvelopeBody<T> {
    /// Build a body from a service result.
    pub fn from_envelope(envelope: Envelope<T>, localizer: &dyn Localizer) -> Self {
        let status = envelope.status();
        let key = envelope.message();
        Self {
            success: status.is_success(),
            status_code: StatusCode::from(status).as_u16(),
            data: envelope.into_data(),
            message_key: key,
            message: localizer.resolve(key),
        }
    }

    /// Build a body for a failure that never reached a service.
    pub fn failure(status: Status, key: MessageKey, message: String) -> Self {
        Self {
            success: false,
            status_code: StatusCode::from(status).as_u16(),
            data: None,
            message_key: key,
            message,
        }
    }
}

/// Convert a service result into an HTTP response.
pub fn envelope_response<T: Serialize>(
    envelope: Envelope<T>,
    localizer: &dyn Localizer,
) -> Response {
    let status = StatusCode::from(envelope.status());
    (status, Json(EnvelopeBody::from_envelope(envelope, localizer))).into_response()
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::I18n;
    use crate::weather::WeatherForecast;

    #[test]
    fn test_success_body() {
        let i18n = I18n::embedded();
        let envelope = Envelope::ok(
            WeatherForecast::new("Cairo", 35.2, "Sunny"),
            MessageKey::WeatherRetrievedSuccessfully,
        );

        let body = EnvelopeBody::from_envelope(envelope, &i18n);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["status_code"], 200);
        assert_eq!(json["data"]["city"], "Cairo");
        assert_eq!(json["message_key"], "WeatherRetrievedSuccessfully");
        assert_eq!(json["message"], "Weather data retrieved successfully.");
    }

    #[test]
    fn test_failure_body_has_null_data() {
        let i18n = I18n::embedded();
        let envelope: Envelope<WeatherForecast> = Envelope::not_found(MessageKey::WeatherNotFound);

        let json = serde_json::to_value(EnvelopeBody::from_envelope(envelope, &i18n)).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["status_code"], 404);
        assert!(json["data"].is_null());
        assert_eq!(json["message_key"], "WeatherNotFound");
    }

    #[test]
    fn test_envelope_response_status() {
        let i18n = I18n::embedded();
        let response = envelope_response(
            Envelope::<()>::conflict(MessageKey::UsernameAlreadyExists),
            &i18n,
        );
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_health_response() {
        let json = serde_json::to_value(HealthResponse::ok()).unwrap();
        assert_eq!(json["status"], "ok");
    }
}
