//! Patient intake form as posted by callers, and its presence checks.

use serde::Deserialize;
use serde_json::Value;

use crate::errors::ValidationError;

/// Raw intake payload. Field values stay untyped JSON so numeric ages and
/// other scalar shapes are accepted the way callers send them.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct IntakeForm {
    #[serde(default)]
    pub gender: Option<Value>,
    #[serde(default)]
    pub age: Option<Value>,
    #[serde(default)]
    pub allergies: Option<Value>,
    #[serde(default)]
    pub diagnosis: Option<Value>,
    #[serde(default)]
    pub prescriptions: Option<Value>,
    #[serde(default)]
    pub other: Option<Value>,
    #[serde(default)]
    pub conversation_id: Option<Value>,
}

/// Intake form that passed presence checks, with every field rendered to text.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedIntake {
    pub gender: String,
    pub age: String,
    pub allergies: String,
    pub diagnosis: String,
    pub prescriptions: String,
    pub other: Option<String>,
    pub conversation_id: Option<Value>,
}

impl IntakeForm {
    /// Reads a form from a request body. Only JSON objects carry fields;
    /// arrays and scalars yield an empty form.
    pub fn from_json(body: Value) -> Self {
        match body {
            Value::Object(fields) => {
                serde_json::from_value(Value::Object(fields)).unwrap_or_default()
            }
            _ => Self::default(),
        }
    }

    pub fn validate(self) -> Result<ValidatedIntake, ValidationError> {
        let required = [
            ("gender", &self.gender),
            ("age", &self.age),
            ("allergies", &self.allergies),
            ("diagnosis", &self.diagnosis),
            ("prescriptions", &self.prescriptions),
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| !matches!(value, Some(present) if is_truthy(present)))
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError { missing });
        }

        Ok(ValidatedIntake {
            gender: required_text(self.gender),
            age: required_text(self.age),
            allergies: required_text(self.allergies),
            diagnosis: required_text(self.diagnosis),
            prescriptions: required_text(self.prescriptions),
            other: self.other.filter(is_truthy).map(|value| field_text(&value)),
            conversation_id: self.conversation_id.filter(is_truthy),
        })
    }
}

/// Presence test for a JSON value: null, `false`, zero and the empty string
/// count as absent.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text for a form field: strings verbatim, everything else in JSON notation.
pub fn field_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn required_text(value: Option<Value>) -> String {
    value.as_ref().map(field_text).unwrap_or_default()
}
