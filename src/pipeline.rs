use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};

use crate::{
    bind::RawFields,
    db::transactions::Transaction,
    ebs_client::{EbsFailure, EbsReply},
    ebs_fields::*,
    err_responses::{self, ErrorResponse, MapErrorResponse},
    validation::{self, Binding, Violation},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Validating,
    Rejected,
    Forwarding,
    EbsFailed,
    Succeeded,
    Responded,
}

pub enum Outcome {
    Rejected(Vec<Violation>),
    Unparsable(Response),
    EbsFailed(EbsFailure),
    Succeeded(EbsReply),
}

impl Outcome {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Rejected(_) | Self::Unparsable(_) => Stage::Rejected,
            Self::EbsFailed(_) => Stage::EbsFailed,
            Self::Succeeded(_) => Stage::Succeeded,
        }
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        match self {
            Self::Rejected(violations) => err_responses::validation_error(violations),
            Self::Unparsable(response) => response,
            Self::EbsFailed(failure) => err_responses::ebs_error(failure),
            Self::Succeeded(reply) => err_responses::success(reply),
        }
    }
}

pub async fn run<R: EbsRequest>(state: &crate::AppState, RawFields(raw): RawFields) -> Outcome {
    let service = R::SERVICE;
    tracing::debug!(%service, stage = ?Stage::Validating);

    let fields = match validation::bind::<R>(raw) {
        Binding::Valid(fields) => fields,
        Binding::Rejected(violations) => {
            tracing::debug!(%service, stage = ?Stage::Rejected, violations = violations.len());
            return Outcome::Rejected(violations);
        }
        Binding::Internal(detail) => {
            return Outcome::Unparsable(ErrorResponse::ParsingError.transform(detail));
        }
    };

    let payload = match serde_json::to_vec(&fields).map_err_response(ErrorResponse::ParsingError) {
        Ok(payload) => payload,
        Err(response) => return Outcome::Unparsable(response),
    };

    tracing::debug!(%service, stage = ?Stage::Forwarding, endpoint = service.endpoint());
    let result = state.ebs.call(service.endpoint(), payload).await;

    let response = match &result {
        Ok(reply) => &reply.response,
        Err(failure) => &failure.response,
    };
    // Only calls that reached the switch are audited.
    state.audit.submit(Transaction::record(service, response));

    match result {
        Ok(reply) => {
            tracing::info!(
                %service,
                stage = ?Stage::Succeeded,
                status = reply.status.as_u16(),
                reference_number = %reply.response.reference_number,
                "EBS call approved"
            );
            Outcome::Succeeded(reply)
        }
        Err(failure) if failure.error.is_transport() => {
            tracing::warn!(
                %service,
                stage = ?Stage::EbsFailed,
                status = failure.status.as_u16(),
                error = %failure.error,
                "EBS call failed"
            );
            Outcome::EbsFailed(failure)
        }
        Err(failure) => {
            tracing::info!(
                %service,
                stage = ?Stage::EbsFailed,
                response_code = failure.response.response_code,
                error = %failure.error,
                "EBS declined"
            );
            Outcome::EbsFailed(failure)
        }
    }
}

pub async fn handle<R: EbsRequest>(
    State(state): State<crate::AppState>,
    raw: RawFields,
) -> Response {
    let service = R::SERVICE;
    tracing::debug!(%service, stage = ?Stage::Received);
    let response = run::<R>(&state, raw).await.into_response();
    tracing::debug!(%service, stage = ?Stage::Responded, status = response.status().as_u16());
    response
}

fn route<R: EbsRequest>(router: Router<crate::AppState>) -> Router<crate::AppState> {
    router.route(R::SERVICE.route(), post(handle::<R>))
}

pub fn router() -> Router<crate::AppState> {
    let router = Router::new();
    let router = route::<IsAliveFields>(router);
    let router = route::<WorkingKeyFields>(router);
    let router = route::<BalanceFields>(router);
    let router = route::<MiniStatementFields>(router);
    let router = route::<ChangePinFields>(router);
    let router = route::<CardTransferFields>(router);
    let router = route::<PurchaseFields>(router);
    let router = route::<CashInFields>(router);
    let router = route::<CashOutFields>(router);
    let router = route::<BillInquiryFields>(router);
    route::<BillPaymentFields>(router)
}
