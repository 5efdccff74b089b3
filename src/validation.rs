use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::ebs_fields::EbsRequest;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Exact(usize),
    Digits { min: usize, max: usize },
    Integer,
    Amount,
}

#[derive(Clone, Copy, Debug)]
pub struct FieldRule {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldRule {
    pub const fn required(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: true,
        }
    }

    pub const fn optional(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: false,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub reason: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug)]
pub enum Binding<T> {
    Valid(T),
    Rejected(Vec<Violation>),
    /// The payload passed every rule but could not be turned into `T`.
    Internal(String),
}

pub fn bind<R: EbsRequest>(raw: Map<String, Value>) -> Binding<R> {
    let mut normalized = Map::new();
    let mut violations = Vec::new();

    for rule in R::SCHEMA.iter().flat_map(|group| group.iter()) {
        match raw.get(rule.key).filter(|value| !is_blank(value)) {
            None if rule.required => violations.push(Violation::new(rule.label, "required")),
            None => {}
            Some(value) => match normalize(rule.kind, value) {
                Ok(value) => {
                    normalized.insert(rule.key.to_string(), value);
                }
                Err(reason) => violations.push(Violation::new(rule.label, reason)),
            },
        }
    }

    if !violations.is_empty() {
        return Binding::Rejected(violations);
    }

    match serde_json::from_value(Value::Object(normalized)) {
        Ok(fields) => Binding::Valid(fields),
        Err(err) => Binding::Internal(err.to_string()),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn as_text(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err("must be text".to_string()),
    }
}

fn normalize(kind: FieldKind, value: &Value) -> Result<Value, String> {
    match kind {
        FieldKind::Text => as_text(value).map(Value::String),
        FieldKind::Exact(len) => {
            let text = as_text(value)?;
            if text.chars().count() != len {
                return Err(format!("must be exactly {len} characters long"));
            }
            Ok(Value::String(text))
        }
        FieldKind::Digits { min, max } => {
            let text = as_text(value)?;
            if !text.chars().all(|c| c.is_ascii_digit()) {
                return Err("must contain only digits".to_string());
            }
            if !(min..=max).contains(&text.len()) {
                return Err(if min == max {
                    format!("must be exactly {min} digits long")
                } else {
                    format!("must be between {min} and {max} digits long")
                });
            }
            Ok(Value::String(text))
        }
        FieldKind::Integer => {
            let parsed = match value {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            };
            parsed
                .map(|n| Value::Number(n.into()))
                .ok_or_else(|| "must be a whole number".to_string())
        }
        FieldKind::Amount => {
            let text = match value {
                Value::Number(n) => n.to_string(),
                Value::String(s) => s.trim().to_string(),
                _ => return Err("must be a positive amount".to_string()),
            };
            let amount = Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .map_err(|_| "must be a positive amount".to_string())?;
            if amount <= Decimal::ZERO {
                return Err("must be a positive amount".to_string());
            }
            Ok(Value::String(amount.to_string()))
        }
    }
}
