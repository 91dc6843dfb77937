use std::collections::BTreeMap;
use std::path::PathBuf;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::models::ResourceKind;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("{kind} not found: {reference}")]
    NotFound {
        kind: ResourceKind,
        reference: String,
    },

    #[error("validation failed ({status}): {}", describe_fields(.fields))]
    Validation {
        status: StatusCode,
        body: String,
        fields: BTreeMap<String, Vec<String>>,
    },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid server URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("{0} cannot be looked up by name")]
    Unsupported(ResourceKind),
}

impl ApiError {
    pub fn not_found(kind: ResourceKind, reference: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            reference: reference.into(),
        }
    }

    /// Classifies a non-success response. Field-level validation messages
    /// from a 4xx are surfaced separately; everything else keeps the raw body.
    pub fn from_response(status: StatusCode, body: impl Into<String>) -> Self {
        let body = body.into();
        if status.is_client_error() {
            if let Some(fields) = parse_field_errors(&body) {
                return Self::Validation {
                    status,
                    body,
                    fields,
                };
            }
        }
        Self::Api { status, body }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } | Self::Validation { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

fn parse_field_errors(body: &str) -> Option<BTreeMap<String, Vec<String>>> {
    let Value::Object(map) = serde_json::from_str::<Value>(body).ok()? else {
        return None;
    };
    if map.is_empty() || (map.len() == 1 && map.contains_key("detail")) {
        return None;
    }

    let mut fields = BTreeMap::new();
    for (field, value) in map {
        let messages = match value {
            Value::String(message) => vec![message],
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(message) => message,
                    other => other.to_string(),
                })
                .collect(),
            _ => return None,
        };
        fields.insert(field, messages);
    }
    Some(fields)
}

fn describe_fields(fields: &BTreeMap<String, Vec<String>>) -> String {
    fields
        .iter()
        .map(|(field, messages)| format!("{field}: {}", messages.join(" ")))
        .collect::<Vec<_>>()
        .join("; ")
}
