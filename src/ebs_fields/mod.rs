use std::fmt;

use serde::{de::DeserializeOwned, Serialize};

use crate::validation::FieldRule;

pub mod request;
pub mod response;

pub use request::*;
pub use response::GenericEbsResponseFields;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EbsService {
    IsAlive,
    WorkingKey,
    Balance,
    MiniStatement,
    ChangePin,
    CardTransfer,
    Purchase,
    CashIn,
    CashOut,
    BillInquiry,
    BillPayment,
}

impl EbsService {
    pub const ALL: [EbsService; 11] = [
        Self::IsAlive,
        Self::WorkingKey,
        Self::Balance,
        Self::MiniStatement,
        Self::ChangePin,
        Self::CardTransfer,
        Self::Purchase,
        Self::CashIn,
        Self::CashOut,
        Self::BillInquiry,
        Self::BillPayment,
    ];

    pub fn route(self) -> &'static str {
        match self {
            Self::IsAlive => "/isAlive",
            Self::WorkingKey => "/workingKey",
            Self::Balance => "/balance",
            Self::MiniStatement => "/miniStatement",
            Self::ChangePin => "/changePin",
            Self::CardTransfer => "/cardTransfer",
            Self::Purchase => "/purchase",
            Self::CashIn => "/cashIn",
            Self::CashOut => "/cashOut",
            Self::BillInquiry => "/billInquiry",
            Self::BillPayment => "/billPayment",
        }
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            Self::IsAlive => "isAlive",
            Self::WorkingKey => "getWorkingKey",
            Self::Balance => "getBalance",
            Self::MiniStatement => "getMiniStatement",
            Self::ChangePin => "changePin",
            Self::CardTransfer => "doCardTransfer",
            Self::Purchase => "purchase",
            Self::CashIn => "cashIn",
            Self::CashOut => "cashOut",
            Self::BillInquiry => "getBill",
            Self::BillPayment => "payBill",
        }
    }

    pub fn transaction_name(self) -> &'static str {
        match self {
            Self::IsAlive => "IsAliveTransaction",
            Self::WorkingKey => "WorkingKeyTransaction",
            Self::Balance => "BalanceTransaction",
            Self::MiniStatement => "MiniStatementTransaction",
            Self::ChangePin => "ChangePINTransaction",
            Self::CardTransfer => "CardTransferTransaction",
            Self::Purchase => "PurchaseTransaction",
            Self::CashIn => "CashInTransaction",
            Self::CashOut => "CashOutTransaction",
            Self::BillInquiry => "BillInquiryTransaction",
            Self::BillPayment => "BillPaymentTransaction",
        }
    }

    pub fn from_endpoint(endpoint: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|service| service.endpoint() == endpoint)
    }
}

impl fmt::Display for EbsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.transaction_name())
    }
}

/// `SCHEMA` must name every field `Self` requires.
pub trait EbsRequest: Serialize + DeserializeOwned + Send + 'static {
    const SERVICE: EbsService;
    const SCHEMA: &'static [&'static [FieldRule]];
}

impl EbsRequest for IsAliveFields {
    const SERVICE: EbsService = EbsService::IsAlive;
    const SCHEMA: &'static [&'static [FieldRule]] = &[COMMON_RULES];
}

impl EbsRequest for WorkingKeyFields {
    const SERVICE: EbsService = EbsService::WorkingKey;
    const SCHEMA: &'static [&'static [FieldRule]] = &[COMMON_RULES];
}

impl EbsRequest for BalanceFields {
    const SERVICE: EbsService = EbsService::Balance;
    const SCHEMA: &'static [&'static [FieldRule]] = &[COMMON_RULES, CARD_RULES];
}

impl EbsRequest for MiniStatementFields {
    const SERVICE: EbsService = EbsService::MiniStatement;
    const SCHEMA: &'static [&'static [FieldRule]] = &[COMMON_RULES, CARD_RULES];
}

impl EbsRequest for ChangePinFields {
    const SERVICE: EbsService = EbsService::ChangePin;
    const SCHEMA: &'static [&'static [FieldRule]] = &[COMMON_RULES, CARD_RULES, NEW_PIN_RULES];
}

impl EbsRequest for CardTransferFields {
    const SERVICE: EbsService = EbsService::CardTransfer;
    const SCHEMA: &'static [&'static [FieldRule]] =
        &[COMMON_RULES, CARD_RULES, AMOUNT_RULES, TO_CARD_RULES];
}

impl EbsRequest for PurchaseFields {
    const SERVICE: EbsService = EbsService::Purchase;
    const SCHEMA: &'static [&'static [FieldRule]] = &[COMMON_RULES, CARD_RULES, AMOUNT_RULES];
}

impl EbsRequest for CashInFields {
    const SERVICE: EbsService = EbsService::CashIn;
    const SCHEMA: &'static [&'static [FieldRule]] = &[COMMON_RULES, CARD_RULES, AMOUNT_RULES];
}

impl EbsRequest for CashOutFields {
    const SERVICE: EbsService = EbsService::CashOut;
    const SCHEMA: &'static [&'static [FieldRule]] = &[COMMON_RULES, CARD_RULES, AMOUNT_RULES];
}

impl EbsRequest for BillInquiryFields {
    const SERVICE: EbsService = EbsService::BillInquiry;
    const SCHEMA: &'static [&'static [FieldRule]] =
        &[COMMON_RULES, CARD_RULES, AMOUNT_RULES, BILLER_RULES];
}

impl EbsRequest for BillPaymentFields {
    const SERVICE: EbsService = EbsService::BillPayment;
    const SCHEMA: &'static [&'static [FieldRule]] =
        &[COMMON_RULES, CARD_RULES, AMOUNT_RULES, BILLER_RULES];
}
