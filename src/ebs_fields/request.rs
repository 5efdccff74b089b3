use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_inline_default::serde_inline_default;

use crate::validation::{FieldKind, FieldRule};

pub const COMMON_RULES: &[FieldRule] = &[
    FieldRule::required(
        "systemTraceAuditNumber",
        "system trace audit number",
        FieldKind::Integer,
    ),
    FieldRule::required("tranDateTime", "transaction date time", FieldKind::Text),
    FieldRule::required("terminalId", "terminal ID", FieldKind::Exact(8)),
    FieldRule::required("clientId", "client ID", FieldKind::Text),
];

pub const CARD_RULES: &[FieldRule] = &[
    FieldRule::required("PAN", "PAN", FieldKind::Digits { min: 12, max: 19 }),
    FieldRule::required("PIN", "PIN", FieldKind::Text),
    FieldRule::required("expDate", "expiry date", FieldKind::Digits { min: 4, max: 4 }),
];

pub const AMOUNT_RULES: &[FieldRule] = &[
    FieldRule::required("tranAmount", "transaction amount", FieldKind::Amount),
    FieldRule::optional(
        "tranCurrencyCode",
        "transaction currency code",
        FieldKind::Text,
    ),
];

pub const TO_CARD_RULES: &[FieldRule] = &[FieldRule::required(
    "toCard",
    "to card",
    FieldKind::Digits { min: 12, max: 19 },
)];

pub const NEW_PIN_RULES: &[FieldRule] = &[FieldRule::required("newPIN", "new PIN", FieldKind::Text)];

pub const BILLER_RULES: &[FieldRule] = &[
    FieldRule::required("personalPaymentInfo", "personal payment info", FieldKind::Text),
    FieldRule::required("payeeId", "payee ID", FieldKind::Text),
];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommonFields {
    pub system_trace_audit_number: i64,
    pub tran_date_time: String,
    pub terminal_id: String,
    pub client_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CardInfoFields {
    #[serde(rename = "PAN")]
    pub pan: String,
    #[serde(rename = "PIN")]
    pub pin: String,
    #[serde(rename = "expDate")]
    pub exp_date: String,
}

#[serde_inline_default]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AmountFields {
    pub tran_amount: Decimal,
    #[serde_inline_default("SDG".to_string())]
    pub tran_currency_code: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BillerFields {
    pub personal_payment_info: String,
    pub payee_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IsAliveFields {
    #[serde(flatten)]
    pub common: CommonFields,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkingKeyFields {
    #[serde(flatten)]
    pub common: CommonFields,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BalanceFields {
    #[serde(flatten)]
    pub common: CommonFields,
    #[serde(flatten)]
    pub card: CardInfoFields,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MiniStatementFields {
    #[serde(flatten)]
    pub common: CommonFields,
    #[serde(flatten)]
    pub card: CardInfoFields,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChangePinFields {
    #[serde(flatten)]
    pub common: CommonFields,
    #[serde(flatten)]
    pub card: CardInfoFields,
    #[serde(rename = "newPIN")]
    pub new_pin: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CardTransferFields {
    #[serde(flatten)]
    pub common: CommonFields,
    #[serde(flatten)]
    pub card: CardInfoFields,
    #[serde(flatten)]
    pub amount: AmountFields,
    #[serde(rename = "toCard")]
    pub to_card: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PurchaseFields {
    #[serde(flatten)]
    pub common: CommonFields,
    #[serde(flatten)]
    pub card: CardInfoFields,
    #[serde(flatten)]
    pub amount: AmountFields,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CashInFields {
    #[serde(flatten)]
    pub common: CommonFields,
    #[serde(flatten)]
    pub card: CardInfoFields,
    #[serde(flatten)]
    pub amount: AmountFields,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CashOutFields {
    #[serde(flatten)]
    pub common: CommonFields,
    #[serde(flatten)]
    pub card: CardInfoFields,
    #[serde(flatten)]
    pub amount: AmountFields,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BillInquiryFields {
    #[serde(flatten)]
    pub common: CommonFields,
    #[serde(flatten)]
    pub card: CardInfoFields,
    #[serde(flatten)]
    pub amount: AmountFields,
    #[serde(flatten)]
    pub biller: BillerFields,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BillPaymentFields {
    #[serde(flatten)]
    pub common: CommonFields,
    #[serde(flatten)]
    pub card: CardInfoFields,
    #[serde(flatten)]
    pub amount: AmountFields,
    #[serde(flatten)]
    pub biller: BillerFields,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn purchase_serializes_flat_with_switch_keys() {
        let fields: PurchaseFields = serde_json::from_value(json!({
            "systemTraceAuditNumber": 42,
            "tranDateTime": "191020181200",
            "terminalId": "18000377",
            "clientId": "noebs",
            "PAN": "9222081700176714465",
            "PIN": "a1b2c3",
            "expDate": "2203",
            "tranAmount": 150.5
        }))
        .unwrap();

        assert_eq!(fields.amount.tran_currency_code, "SDG");

        let value = serde_json::to_value(&fields).unwrap();
        assert_eq!(value["terminalId"], "18000377");
        assert_eq!(value["PAN"], "9222081700176714465");
        assert_eq!(value["tranAmount"], 150.5);
        assert_eq!(value["tranCurrencyCode"], "SDG");
        assert!(value.get("common").is_none());
    }
}
