use serde::Serialize;
use thiserror::Error;

/// One ship observation, built from a single request's query string.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryReport {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub fuel: f64,
}

/// Why a report was rejected. The display text is what the client sees.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{0} must be a number")]
    NotANumber(&'static str),
    #[error("{0} must be a non-negative number")]
    Negative(&'static str),
    #[error("{0} must not contain control characters")]
    ControlCharacter(&'static str),
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Missing(field)
            | ValidationError::NotANumber(field)
            | ValidationError::Negative(field)
            | ValidationError::ControlCharacter(field) => field,
        }
    }
}

impl TelemetryReport {
    /// Fields are checked in order `name`, `x`, `y`, `fuel`; the first failure
    /// wins. Repeated keys resolve to their first occurrence.
    pub fn from_query(params: &[(String, String)]) -> Result<Self, ValidationError> {
        let name = required(params, "name")?.to_string();
        let x = number(params, "x")?;
        let y = number(params, "y")?;
        let fuel = number(params, "fuel")?;
        if fuel < 0.0 {
            return Err(ValidationError::Negative("fuel"));
        }

        Ok(Self { name, x, y, fuel })
    }
}

fn first<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(candidate, _)| candidate == key)
        .map(|(_, value)| value.as_str())
}

fn required<'a>(
    params: &'a [(String, String)],
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    // Log lines are newline-delimited, so decoded values must stay on one line.
    match first(params, field) {
        Some(value) if value.chars().any(char::is_control) => {
            Err(ValidationError::ControlCharacter(field))
        }
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ValidationError::Missing(field)),
    }
}

fn number(params: &[(String, String)], field: &'static str) -> Result<f64, ValidationError> {
    required(params, field)?
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        // Adding 0.0 turns -0 into 0.
        .map(|value| value + 0.0)
        .ok_or(ValidationError::NotANumber(field))
}

/// JSON body of every response: `{"greeting": ..}` or `{"error": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseEnvelope {
    Ack { greeting: String },
    ErrorBody { error: String },
}

impl ResponseEnvelope {
    pub fn ack(name: &str) -> Self {
        ResponseEnvelope::Ack {
            greeting: format!("Hello, {name}!"),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ResponseEnvelope::ErrorBody {
            error: message.into(),
        }
    }
}
