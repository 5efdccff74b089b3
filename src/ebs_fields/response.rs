use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// A reply missing `responseCode` reads as code 0.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GenericEbsResponseFields {
    pub response_code: i32,
    pub response_message: String,
    pub response_status: String,
    pub reference_number: String,
    pub approval_code: String,

    pub terminal_id: String,
    pub system_trace_audit_number: i64,
    pub client_id: String,
    #[serde(rename = "PAN")]
    pub pan: String,
    pub tran_amount: Option<Decimal>,
    pub tran_currency_code: String,
    pub tran_date_time: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub to_card: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub payee_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub personal_payment_info: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub working_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mini_statement_records: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_info: Option<serde_json::Value>,
}

impl GenericEbsResponseFields {
    pub fn is_approved(&self) -> bool {
        self.response_code == 0
    }
}
