use derive_more::Display;
use serde_json::Value;
use strum::{AsRefStr, Display as StrumDisplay};
use thiserror::Error;

const MAX_TEXT_BODY: usize = 512;

/// Failure of a single service call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: ErrorBody,
    },
    #[error("unexpected response shape from {url}: {source}")]
    Malformed {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, StrumDisplay, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Status,
    Malformed,
    InvalidRequest,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network { .. } => ErrorKind::Network,
            ApiError::Status { .. } => ErrorKind::Status,
            ApiError::Malformed { .. } => ErrorKind::Malformed,
            ApiError::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short text suitable for a status line.
    pub fn message(&self) -> String {
        match self {
            ApiError::Network { source, .. } if source.is_timeout() => {
                "request timed out".to_string()
            }
            ApiError::Network { .. } => "prediction service unreachable".to_string(),
            ApiError::Status { status, body: ErrorBody::Empty, .. } => format!("HTTP {status}"),
            ApiError::Status { status, body, .. } => format!("HTTP {status}: {body}"),
            ApiError::Malformed { .. } => "unexpected response from service".to_string(),
            ApiError::InvalidRequest(msg) => msg.clone(),
        }
    }
}

/// Error payload of a non-2xx response, reduced to what the service meant to say.
#[derive(Clone, Debug, PartialEq, Display)]
pub enum ErrorBody {
    #[display("(empty body)")]
    Empty,
    #[display("{_0}")]
    Message(String),
    #[display("{_0}")]
    Json(Value),
    #[display("{_0}")]
    Text(String),
}

impl ErrorBody {
    pub fn from_text(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return ErrorBody::Empty;
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => match message_field(&value) {
                Some(msg) => ErrorBody::Message(msg),
                None => ErrorBody::Json(value),
            },
            Err(_) => {
                let mut text: String = raw.chars().take(MAX_TEXT_BODY).collect();
                if text.len() < raw.len() {
                    text.push('…');
                }
                ErrorBody::Text(text)
            }
        }
    }
}

// FastAPI puts validation errors in `detail` as a list of `{msg, ...}`.
fn message_field(value: &Value) -> Option<String> {
    let obj = value.as_object()?;
    for key in ["detail", "message", "error"] {
        match obj.get(key) {
            Some(Value::String(s)) => return Some(s.clone()),
            Some(Value::Array(items)) => {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|i| i.get("msg").and_then(Value::as_str))
                    .collect();
                if !msgs.is_empty() {
                    return Some(msgs.join("; "));
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_string_is_extracted() {
        let body = ErrorBody::from_text(r#"{"detail":"Ticker not found"}"#);
        assert_eq!(body, ErrorBody::Message("Ticker not found".into()));
        assert_eq!(body.to_string(), "Ticker not found");
    }

    #[test]
    fn validation_detail_list_is_joined() {
        let body = ErrorBody::from_text(
            r#"{"detail":[{"loc":["body","ticker"],"msg":"field required"},{"msg":"bad days"}]}"#,
        );
        assert_eq!(body, ErrorBody::Message("field required; bad days".into()));
    }

    #[test]
    fn other_json_is_kept_verbatim() {
        let body = ErrorBody::from_text(r#"{"code":42}"#);
        assert!(matches!(body, ErrorBody::Json(_)));
        assert_eq!(body.to_string(), r#"{"code":42}"#);
    }

    #[test]
    fn plain_text_and_empty_bodies() {
        assert_eq!(ErrorBody::from_text("  \n"), ErrorBody::Empty);
        assert_eq!(
            ErrorBody::from_text("Bad Gateway"),
            ErrorBody::Text("Bad Gateway".into())
        );
        let long = "x".repeat(MAX_TEXT_BODY + 10);
        match ErrorBody::from_text(&long) {
            ErrorBody::Text(t) => assert!(t.ends_with('…')),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn status_message_uses_normalized_body() {
        let err = ApiError::Status {
            url: "http://x/api/predict".into(),
            status: 422,
            body: ErrorBody::Message("forecast_days too large".into()),
        };
        assert_eq!(err.kind(), ErrorKind::Status);
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.message(), "HTTP 422: forecast_days too large");
        assert_eq!(err.kind().to_string(), "status");
    }
}
