use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::{
    ebs_client::{EbsFailure, EbsReply},
    ebs_fields::GenericEbsResponseFields,
    validation::Violation,
};

pub const VALIDATION_MESSAGE: &str = "Request fields validation error";
pub const PARSING_MESSAGE: &str = "Unable to parse the request";

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStatus {
    BadRequest,
    ParsingError,
    #[serde(rename = "EBSError")]
    EbsError,
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum Details {
    Fields(Vec<Violation>),
    Ebs(GenericEbsResponseFields),
}

#[derive(Serialize, Debug)]
pub struct ErrorDetails {
    pub details: Option<Details>,
    pub code: i32,
    pub message: &'static str,
    pub status: EnvelopeStatus,
}

#[derive(Serialize, Debug)]
pub struct SuccessfulResponse {
    #[serde(rename = "ebsResponse")]
    pub ebs_response: GenericEbsResponseFields,
}

pub fn validation_error(violations: Vec<Violation>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorDetails {
            details: Some(Details::Fields(violations)),
            code: i32::from(StatusCode::BAD_REQUEST.as_u16()),
            message: VALIDATION_MESSAGE,
            status: EnvelopeStatus::BadRequest,
        }),
    )
        .into_response()
}

pub fn parsing_error() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorDetails {
            details: None,
            code: i32::from(StatusCode::BAD_REQUEST.as_u16()),
            message: PARSING_MESSAGE,
            status: EnvelopeStatus::ParsingError,
        }),
    )
        .into_response()
}

pub fn ebs_error(failure: EbsFailure) -> Response {
    (
        failure.status,
        Json(ErrorDetails {
            code: failure.response.response_code,
            details: Some(Details::Ebs(failure.response)),
            message: "EBSError",
            status: EnvelopeStatus::EbsError,
        }),
    )
        .into_response()
}

pub fn success(reply: EbsReply) -> Response {
    (
        reply.status,
        Json(SuccessfulResponse {
            ebs_response: reply.response,
        }),
    )
        .into_response()
}

pub enum ErrorResponse {
    /// Undecodable body, reported as a validation error on `body`.
    BadRequest,
    ParsingError,
}

pub trait MapErrorResponse<T> {
    fn map_err_response(self, mapper: ErrorResponse) -> Result<T, Response>;
}

impl<T, E: ToString> MapErrorResponse<T> for Result<T, E> {
    fn map_err_response(self, mapper: ErrorResponse) -> Result<T, Response> {
        match self {
            Ok(val) => Ok(val),
            Err(err) => Err(mapper.transform(err)),
        }
    }
}

impl ErrorResponse {
    pub fn transform<E: ToString>(&self, err: E) -> Response {
        match self {
            Self::BadRequest => validation_error(vec![Violation::new("body", err.to_string())]),
            Self::ParsingError => {
                tracing::error!(error = %err.to_string(), "unable to parse validated request fields");
                parsing_error()
            }
        }
    }
}
