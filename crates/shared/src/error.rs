use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

const MAX_TEXT_DETAIL: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    RateLimited,
    Internal,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            400 | 409 | 422 => Self::Validation,
            429 => Self::RateLimited,
            _ => Self::Internal,
        }
    }
}

/// A non-2xx answer from the content API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code:?} (HTTP {status}): {}", .detail.as_deref().unwrap_or("no detail"))]
pub struct ApiError {
    pub code: ErrorCode,
    pub status: u16,
    pub detail: Option<String>,
}

impl ApiError {
    pub fn new(status: u16, detail: Option<String>) -> Self {
        Self {
            code: ErrorCode::from_status(status),
            status,
            detail,
        }
    }

    pub fn from_response(status: u16, body: &[u8]) -> Self {
        Self::new(status, extract_detail(body))
    }
}

/// Pulls a human-readable detail out of an error body.
///
/// Prefers the `error`, `detail` or `message` string; field-error maps are
/// kept as compact JSON; HTML error pages yield nothing.
pub fn extract_detail(body: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => {
            for key in ["error", "detail", "message"] {
                if let Some(Value::String(detail)) = map.get(key) {
                    return Some(detail.clone());
                }
            }
            if map.is_empty() {
                None
            } else {
                Some(Value::Object(map).to_string())
            }
        }
        Ok(Value::String(detail)) => Some(detail),
        Ok(Value::Null) => None,
        Ok(other) => Some(other.to_string()),
        Err(_) if text.starts_with('<') => None,
        Err(_) => Some(text.chars().take(MAX_TEXT_DETAIL).collect()),
    }
}
