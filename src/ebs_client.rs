use std::time::Duration;

use async_trait::async_trait;
use axum::http::{header::CONTENT_TYPE, StatusCode};
use thiserror::Error;

use crate::ebs_fields::GenericEbsResponseFields;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EbsTarget {
    Mock(String),
    Live(String),
}

impl EbsTarget {
    pub fn base_url(&self) -> &str {
        match self {
            Self::Mock(url) | Self::Live(url) => url,
        }
    }

    pub fn is_mock(&self) -> bool {
        matches!(self, Self::Mock(_))
    }

    pub fn url_for(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Error)]
pub enum EbsError {
    #[error("EBS switch unreachable at {endpoint}: {source}")]
    Unreachable {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unparseable reply from {endpoint}: {source}")]
    Unparseable {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("EBS declined with code {code}: {message}")]
    Declined { code: i32, message: String },
}

impl EbsError {
    pub fn is_transport(&self) -> bool {
        !matches!(self, Self::Declined { .. })
    }
}

#[derive(Debug)]
pub struct EbsReply {
    pub status: StatusCode,
    pub response: GenericEbsResponseFields,
}

#[derive(Debug)]
pub struct EbsFailure {
    pub status: StatusCode,
    pub response: GenericEbsResponseFields,
    pub error: EbsError,
}

impl EbsFailure {
    // No parsed reply: the status code doubles as the response code.
    fn transport(status: StatusCode, error: EbsError) -> Self {
        Self {
            status,
            response: GenericEbsResponseFields {
                response_code: i32::from(status.as_u16()),
                response_status: "Failed".to_string(),
                response_message: error.to_string(),
                ..Default::default()
            },
            error,
        }
    }
}

#[async_trait]
pub trait EbsClient: Send + Sync {
    async fn call(&self, endpoint: &str, payload: Vec<u8>) -> Result<EbsReply, EbsFailure>;
}

pub struct HttpEbsClient {
    http: reqwest::Client,
    target: EbsTarget,
    api_key: Option<String>,
}

impl HttpEbsClient {
    pub fn new(
        target: EbsTarget,
        timeout: Duration,
        api_key: Option<String>,
        accept_invalid_certs: bool,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;

        Ok(Self {
            http,
            target,
            api_key,
        })
    }

    pub fn target(&self) -> &EbsTarget {
        &self.target
    }
}

#[async_trait]
impl EbsClient for HttpEbsClient {
    async fn call(&self, endpoint: &str, payload: Vec<u8>) -> Result<EbsReply, EbsFailure> {
        let url = self.target.url_for(endpoint);

        let mut request = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload);
        if let Some(key) = &self.api_key {
            request = request.header("API-Key", key);
        }

        let unreachable = |source| EbsError::Unreachable {
            endpoint: url.clone(),
            source,
        };

        let reply = match request.send().await {
            Ok(reply) => reply,
            Err(err) => {
                return Err(EbsFailure::transport(
                    StatusCode::GATEWAY_TIMEOUT,
                    unreachable(err),
                ))
            }
        };

        let http_status = reply.status();
        let body = match reply.bytes().await {
            Ok(body) => body,
            Err(err) => {
                return Err(EbsFailure::transport(
                    StatusCode::BAD_GATEWAY,
                    unreachable(err),
                ))
            }
        };

        let response: GenericEbsResponseFields = match serde_json::from_slice(&body) {
            Ok(response) => response,
            Err(source) => {
                return Err(EbsFailure::transport(
                    StatusCode::BAD_GATEWAY,
                    EbsError::Unparseable {
                        endpoint: url.clone(),
                        source,
                    },
                ))
            }
        };

        tracing::debug!(
            endpoint = %url,
            http_status = http_status.as_u16(),
            response_code = response.response_code,
            "EBS switch replied"
        );

        // Code 0 is an approval whatever the HTTP status says.
        if response.is_approved() {
            let status = if http_status.is_success() {
                http_status
            } else {
                StatusCode::OK
            };
            return Ok(EbsReply { status, response });
        }

        let status = if http_status.is_client_error() || http_status.is_server_error() {
            http_status
        } else {
            StatusCode::BAD_GATEWAY
        };

        Err(EbsFailure {
            status,
            error: EbsError::Declined {
                code: response.response_code,
                message: response.response_message.clone(),
            },
            response,
        })
    }
}
