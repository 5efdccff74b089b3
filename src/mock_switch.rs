use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::ebs_fields::{EbsService, GenericEbsResponseFields};

pub const MOCK_WORKING_KEY: &str = "A5B6C7D8E9F01234";
pub const DECLINED_PIN: &str = "0000";
pub const INSUFFICIENT_FUNDS_ABOVE: i64 = 100_000;

#[derive(Clone, Debug, Default)]
pub struct MockSwitch {
    forced_code: Option<i32>,
}

impl MockSwitch {
    /// Answers every well-formed request with `code`.
    pub fn always(code: i32) -> Self {
        Self {
            forced_code: Some(code),
        }
    }
}

pub fn router(switch: MockSwitch) -> Router {
    Router::new()
        .route("/{endpoint}", post(respond))
        .with_state(switch)
}

fn response_message(code: i32) -> &'static str {
    match code {
        0 => "Approval",
        12 => "Invalid transaction",
        51 => "Insufficient funds",
        55 => "Incorrect PIN",
        68 => "Response received too late",
        91 => "Issuer or switch inoperative",
        _ => "Transaction declined",
    }
}

fn decide(switch: &MockSwitch, request: &Map<String, Value>) -> i32 {
    if let Some(code) = switch.forced_code {
        return code;
    }
    if request.get("PIN").and_then(Value::as_str) == Some(DECLINED_PIN) {
        return 55;
    }
    let amount = request.get("tranAmount").and_then(Value::as_f64);
    if amount.is_some_and(|amount| amount > INSUFFICIENT_FUNDS_ABOVE as f64) {
        return 51;
    }
    0
}

fn invalid_transaction() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(GenericEbsResponseFields {
            response_code: 12,
            response_message: response_message(12).to_string(),
            response_status: "Failed".to_string(),
            ..Default::default()
        }),
    )
        .into_response()
}

async fn respond(
    State(switch): State<MockSwitch>,
    Path(endpoint): Path<String>,
    body: Bytes,
) -> Response {
    let Some(service) = EbsService::from_endpoint(&endpoint) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let Ok(request) = serde_json::from_slice::<Map<String, Value>>(&body) else {
        return invalid_transaction();
    };

    // Identifying keys share their names with the reply, so the request
    // deserializes straight into the echo.
    let Ok(mut reply) =
        serde_json::from_value::<GenericEbsResponseFields>(Value::Object(request.clone()))
    else {
        return invalid_transaction();
    };

    let code = decide(&switch, &request);
    reply.response_code = code;
    reply.response_message = response_message(code).to_string();

    if code != 0 {
        reply.response_status = "Failed".to_string();
        tracing::debug!(%service, code, "mock switch declining");
        return Json(reply).into_response();
    }

    reply.response_status = "Successful".to_string();
    reply.reference_number = format!("{:012}", reply.system_trace_audit_number);
    reply.approval_code = Uuid::new_v4().simple().to_string()[..6].to_uppercase();

    match service {
        EbsService::WorkingKey => reply.working_key = MOCK_WORKING_KEY.to_string(),
        EbsService::Balance => {
            reply.balance = Some(json!({ "available": 1500.0, "leger": 1500.0 }));
        }
        EbsService::MiniStatement => {
            reply.mini_statement_records = Some(json!([
                { "operationDate": "1910", "operationSign": "C", "operationAmount": 500.0, "operationCode": "CashIn" },
                { "operationDate": "1910", "operationSign": "D", "operationAmount": 120.0, "operationCode": "Purchase" },
            ]));
        }
        EbsService::BillInquiry => {
            reply.bill_info = Some(json!({
                "dueAmount": reply.tran_amount.unwrap_or(Decimal::ZERO),
                "payeeId": reply.payee_id,
            }));
        }
        _ => {}
    }

    Json(reply).into_response()
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;

    async fn post_json(switch: MockSwitch, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = router(switch)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn card_request() -> Value {
        json!({
            "systemTraceAuditNumber": 9,
            "tranDateTime": "191020181200",
            "terminalId": "18000377",
            "clientId": "noebs",
            "PAN": "9222081700176714465",
            "PIN": "a1b2c3",
            "expDate": "2203",
            "tranAmount": 100.0
        })
    }

    #[tokio::test]
    async fn approves_and_echoes_identifiers() {
        let (status, body) = post_json(MockSwitch::default(), "/purchase", card_request()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["responseCode"], 0);
        assert_eq!(body["responseStatus"], "Successful");
        assert_eq!(body["PAN"], "9222081700176714465");
        assert_eq!(body["referenceNumber"], "000000000009");
        assert_eq!(body["approvalCode"].as_str().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn fills_operation_outputs() {
        let (_, body) = post_json(MockSwitch::default(), "/getWorkingKey", card_request()).await;
        assert_eq!(body["workingKey"], MOCK_WORKING_KEY);

        let (_, body) = post_json(MockSwitch::default(), "/getBalance", card_request()).await;
        assert_eq!(body["balance"]["available"], 1500.0);
    }

    #[tokio::test]
    async fn declines_wrong_pin_and_large_amounts() {
        let mut request = card_request();
        request["PIN"] = json!(DECLINED_PIN);
        let (_, body) = post_json(MockSwitch::default(), "/purchase", request).await;
        assert_eq!(body["responseCode"], 55);

        let mut request = card_request();
        request["tranAmount"] = json!(250_000);
        let (_, body) = post_json(MockSwitch::default(), "/cashOut", request).await;
        assert_eq!(body["responseCode"], 51);
        assert_eq!(body["responseStatus"], "Failed");
    }

    #[tokio::test]
    async fn forced_code_wins() {
        let (status, body) = post_json(MockSwitch::always(68), "/isAlive", card_request()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["responseCode"], 68);
        assert_eq!(body["responseMessage"], "Response received too late");
    }

    #[tokio::test]
    async fn unknown_endpoint_and_bad_body() {
        let (status, _) = post_json(MockSwitch::default(), "/nope", card_request()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = post_json(MockSwitch::default(), "/isAlive", json!([1, 2])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["responseCode"], 12);
    }
}
