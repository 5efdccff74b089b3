use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    response::Response,
    Form,
};
use serde_json::{Map, Value};

use crate::err_responses::{ErrorResponse, MapErrorResponse};

/// Undecoded request fields, from a URL-encoded form or a JSON object.
#[derive(Debug)]
pub struct RawFields(pub Map<String, Value>);

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

impl<S: Send + Sync> FromRequest<S> for RawFields {
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(pairs) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err_response(ErrorResponse::BadRequest)?;
            return Ok(Self(
                pairs
                    .into_iter()
                    .map(|(key, value)| (key, Value::String(value)))
                    .collect(),
            ));
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err_response(ErrorResponse::BadRequest)?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(Map::new()));
        }

        serde_json::from_slice(&body)
            .map(Self)
            .map_err_response(ErrorResponse::BadRequest)
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use http_body_util::BodyExt;

    use super::*;

    async fn extract(content_type: Option<&str>, body: &'static str) -> Result<RawFields, Response> {
        let mut builder = Request::builder().method("POST").uri("/isAlive");
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        RawFields::from_request(builder.body(Body::from(body)).unwrap(), &()).await
    }

    #[tokio::test]
    async fn json_body_without_content_type() {
        let RawFields(fields) = extract(None, r#"{"terminalId":"18000377","systemTraceAuditNumber":5}"#)
            .await
            .unwrap();
        assert_eq!(fields["terminalId"], "18000377");
        assert_eq!(fields["systemTraceAuditNumber"], 5);
    }

    #[tokio::test]
    async fn form_body_by_content_type() {
        let RawFields(fields) = extract(
            Some("application/x-www-form-urlencoded"),
            "terminalId=18000377&tranAmount=12.5",
        )
        .await
        .unwrap();
        assert_eq!(fields["terminalId"], "18000377");
        assert_eq!(fields["tranAmount"], "12.5");
    }

    #[tokio::test]
    async fn empty_body_has_no_fields() {
        let RawFields(fields) = extract(Some("application/json"), "").await.unwrap();
        assert!(fields.is_empty());
    }

    #[tokio::test]
    async fn undecodable_body_is_a_validation_error() {
        let response = extract(Some("application/json"), "{not json").await.unwrap_err();
        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "BadRequest");
        assert_eq!(body["details"][0]["field"], "body");
    }

    #[tokio::test]
    async fn non_object_json_is_rejected() {
        assert!(extract(None, "[1,2,3]").await.is_err());
    }
}
