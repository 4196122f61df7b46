//! One-shot notices carried to the next rendered page in a cookie.
//!
//! Notices are JSON, hex encoded so the cookie value stays within the
//! token charset. Any page that renders them clears the cookie.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tracing::warn;

pub const COOKIE_NAME: &str = "fyyur_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: Level,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }

    /// Bootstrap alert class for the layout.
    pub fn css_class(&self) -> &'static str {
        match self.level {
            Level::Success => "alert-success",
            Level::Error => "alert-danger",
        }
    }
}

/// Notices left by the previous response.
#[derive(Debug, Default)]
pub struct Flash(Vec<Notice>);

impl Flash {
    pub fn into_notices(self) -> Vec<Notice> {
        self.0
    }

    /// Incoming notices followed by `notice`.
    pub fn with(self, notice: Notice) -> Vec<Notice> {
        let mut notices = self.0;
        notices.push(notice);
        notices
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|header| header.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == COOKIE_NAME)
            .map(|(_, value)| value.to_string());

        Ok(Flash(raw.map(|value| decode(&value)).unwrap_or_default()))
    }
}

pub fn encode(notices: &[Notice]) -> String {
    match serde_json::to_vec(notices) {
        Ok(bytes) => hex::encode(bytes),
        Err(e) => {
            warn!("Failed to encode flash notices: {}", e);
            String::new()
        }
    }
}

/// Malformed cookies decode to no notices.
pub fn decode(value: &str) -> Vec<Notice> {
    hex::decode(value)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

/// `Set-Cookie` value carrying `notices` to the next page.
pub fn set_cookie(notices: &[Notice]) -> String {
    format!(
        "{COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Lax",
        encode(notices)
    )
}

/// `Set-Cookie` value removing any pending notices.
pub fn clear_cookie() -> String {
    format!("{COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn test_cookie_value_round_trips_non_ascii_messages() {
        let notices = vec![
            Notice::success("Venue Café Ñandú was successfully listed!"),
            Notice::error("An error occurred."),
        ];
        assert_eq!(decode(&encode(&notices)), notices);
    }

    #[test]
    fn test_garbage_cookie_yields_nothing() {
        assert!(decode("not-hex").is_empty());
        assert!(decode(&hex::encode("not json")).is_empty());
    }

    #[tokio::test]
    async fn test_extractor_reads_named_cookie() {
        let value = encode(&[Notice::success("Hello")]);
        let request = Request::builder()
            .header(COOKIE, format!("other=1; {COOKIE_NAME}={value}"))
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let flash = Flash::from_request_parts(&mut parts, &()).await.unwrap();
        let notices = flash.into_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "Hello");
        assert_eq!(notices[0].css_class(), "alert-success");
    }

    #[tokio::test]
    async fn test_extractor_without_cookie_is_empty() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        let flash = Flash::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(flash.into_notices().is_empty());
    }
}
