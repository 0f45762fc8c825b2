use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{Enrollment, User};

/// List endpoints answer with either a bare array or a paginated envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Bare(Vec<T>),
    Paginated {
        results: Vec<T>,
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
    },
}

impl<T> ListResponse<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListResponse::Bare(items) => items,
            ListResponse::Paginated { results, .. } => results,
        }
    }

    pub fn next_page(&self) -> Option<&str> {
        match self {
            ListResponse::Bare(_) => None,
            ListResponse::Paginated { next, .. } => next.as_deref(),
        }
    }
}

/// The create-enrollment endpoint wraps the record as
/// `{"message": ..., "enrollment": {...}}`; a bare record is accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CreatedEnrollment {
    Wrapped { enrollment: Enrollment },
    Bare(Enrollment),
}

impl CreatedEnrollment {
    pub fn into_enrollment(self) -> Enrollment {
        match self {
            CreatedEnrollment::Wrapped { enrollment } | CreatedEnrollment::Bare(enrollment) => {
                enrollment
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub tokens: TokenPair,
}

#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// Pull a human readable message out of an error body.
///
/// Checked in order: `error`, `detail`, `message`, `non_field_errors[0]`,
/// then the first field error list (`{"username": ["..."]}`). Plain text
/// bodies are used as-is unless they look like an HTML error page.
pub fn extract_error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
        if trimmed.starts_with('<') {
            return None;
        }
        return Some(trimmed.to_string());
    };

    match value {
        Value::String(s) => Some(s),
        Value::Array(items) => items.first().and_then(first_text),
        Value::Object(map) => {
            for key in ["error", "detail", "message", "non_field_errors"] {
                if let Some(text) = map.get(key).and_then(first_text) {
                    return Some(text);
                }
            }
            map.iter().find_map(|(field, v)| match v {
                Value::Array(items) => items
                    .first()
                    .and_then(first_text)
                    .map(|text| format!("{field}: {text}")),
                _ => None,
            })
        }
        _ => None,
    }
}

fn first_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.first().and_then(first_text),
        _ => None,
    }
}
