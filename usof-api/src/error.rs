use std::str::FromStr;

use anyhow::{anyhow, Context};
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Unknown(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Not found: {0}")]
    NotFound(Uuid),

    #[error("Comment content must not be empty")]
    EmptyContent,

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),

    #[error("Cannot pin reply {0}, only top-level comments can be pinned")]
    CannotPinReply(Uuid),
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::PermissionDenied => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::EmptyContent => StatusCode::BAD_REQUEST,
            Error::NullByteInString(_) => StatusCode::BAD_REQUEST,
            Error::CannotPinReply(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::PermissionDenied => json!({
                "message": "permission denied",
                "type": "permission-denied",
            }),
            Error::NotFound(id) => json!({
                "message": "no such resource",
                "type": "not-found",
                "id": id,
            }),
            Error::EmptyContent => json!({
                "message": "comment content must not be empty",
                "type": "empty-content",
            }),
            Error::NullByteInString(s) => json!({
                "message": "there was a null byte in argument string",
                "type": "null-byte",
                "string": s,
            }),
            Error::CannotPinReply(id) => json!({
                "message": "only top-level comments can be pinned",
                "type": "cannot-pin-reply",
                "id": id,
            }),
        })
        .expect("serializing error contents")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let id_field = |data: &serde_json::Value| -> anyhow::Result<Uuid> {
            data.get("id")
                .and_then(|id| id.as_str())
                .and_then(|id| Uuid::from_str(id).ok())
                .ok_or_else(|| anyhow!("error contents has no proper id"))
        };
        Ok(
            match data
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("error type is not a string"))?
            {
                "unknown" => Error::Unknown(String::from(
                    data.get("message")
                        .and_then(|msg| msg.as_str())
                        .unwrap_or(""),
                )),
                "permission-denied" => Error::PermissionDenied,
                "not-found" => Error::NotFound(id_field(&data)?),
                "empty-content" => Error::EmptyContent,
                "null-byte" => Error::NullByteInString(String::from(
                    data.get("string").and_then(|s| s.as_str()).ok_or_else(|| {
                        anyhow!("error is a null-byte-in-string without a string")
                    })?,
                )),
                "cannot-pin-reply" => Error::CannotPinReply(id_field(&data)?),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let errors = vec![
            Error::Unknown(String::from("boom")),
            Error::PermissionDenied,
            Error::NotFound(Uuid::new_v4()),
            Error::EmptyContent,
            Error::NullByteInString(String::from("a\0b")),
            Error::CannotPinReply(Uuid::new_v4()),
        ];
        for e in errors {
            assert_eq!(Error::parse(&e.contents()).unwrap(), e);
        }
    }

    #[test]
    fn rejects_garbage() {
        assert!(Error::parse(b"not json").is_err());
        assert!(Error::parse(br#"{"type":"some-future-type"}"#).is_err());
    }
}
