use axum::async_trait;
use axum::extract::FromRef;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use clap::ValueEnum;

use crate::error::ApiError;

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum AuthMode {
    /// Local development only.
    None,
    ApiKey,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub mode: AuthMode,
    pub api_key: Option<String>,
}

/// Marker extractor: a handler taking it only runs for authorized callers.
#[derive(Debug, Clone, Copy)]
pub struct Authorized;

#[async_trait]
impl<S> FromRequestParts<S> for Authorized
where
    AuthConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AuthConfig::from_ref(state);
        check_api_key(parts, &config)?;
        tracing::debug!(auth_mode = ?config.mode, "request authorized");
        Ok(Authorized)
    }
}

fn check_api_key(parts: &Parts, config: &AuthConfig) -> Result<(), ApiError> {
    if config.mode == AuthMode::None {
        return Ok(());
    }

    let Some(expected) = config.api_key.as_deref() else {
        return Err(ApiError::Unauthorized("server has no API key configured".into()));
    };

    match parts
        .headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        None => Err(ApiError::Unauthorized("missing X-API-Key header".into())),
        Some(provided) if provided != expected => {
            Err(ApiError::Unauthorized("invalid API key".into()))
        }
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(key: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/score");
        if let Some(key) = key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn api_key_config(key: Option<&str>) -> AuthConfig {
        AuthConfig {
            mode: AuthMode::ApiKey,
            api_key: key.map(str::to_string),
        }
    }

    #[test]
    fn matching_key_is_accepted() {
        assert!(check_api_key(&parts(Some("k")), &api_key_config(Some("k"))).is_ok());
    }

    #[test]
    fn missing_or_wrong_key_is_unauthorized() {
        let config = api_key_config(Some("k"));
        assert!(matches!(
            check_api_key(&parts(None), &config),
            Err(ApiError::Unauthorized(msg)) if msg.contains("missing")
        ));
        assert!(matches!(
            check_api_key(&parts(Some("nope")), &config),
            Err(ApiError::Unauthorized(msg)) if msg.contains("invalid")
        ));
    }

    #[test]
    fn unconfigured_server_key_rejects_everyone() {
        assert!(check_api_key(&parts(Some("k")), &api_key_config(None)).is_err());
    }

    #[test]
    fn none_mode_skips_the_header() {
        let config = AuthConfig {
            mode: AuthMode::None,
            api_key: None,
        };
        assert!(check_api_key(&parts(None), &config).is_ok());
    }
}
