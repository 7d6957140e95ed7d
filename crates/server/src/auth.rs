//! Token gate in front of every ledger route.

use std::collections::HashMap;

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
};

use crate::{ServerError, server::ServerState};

static TOKEN_HEADER: HeaderName = HeaderName::from_static("x-token");

/// `TypedHeader` for the `X-Token` header.
#[derive(Debug)]
pub struct XToken(String);

impl Header for XToken {
    fn name() -> &'static HeaderName {
        &TOKEN_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };

        Ok(XToken(value.trim().to_string()))
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        match HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-token header"),
        }
    }
}

/// Resolves an access token to the owner id every ledger row is scoped to.
pub trait TokenVerifier: Send + Sync + 'static {
    fn owner(&self, token: &str) -> Option<String>;
}

/// Fixed token → owner table, usually loaded from settings.
#[derive(Clone, Debug, Default)]
pub struct StaticTokens {
    tokens: HashMap<String, String>,
}

impl StaticTokens {
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }
}

impl TokenVerifier for StaticTokens {
    fn owner(&self, token: &str) -> Option<String> {
        self.tokens.get(token).cloned()
    }
}

/// Authenticated owner, inserted as a request extension by the gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Owner(pub String);

pub(crate) async fn auth(
    token: Option<TypedHeader<XToken>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let token = token.map(|TypedHeader(XToken(token))| token).unwrap_or_default();
    if token.is_empty() {
        return Err(ServerError::Generic("token cannot be empty".to_string()));
    }

    let owner = state
        .verifier
        .owner(&token)
        .ok_or_else(|| ServerError::Generic("token is invalid".to_string()))?;

    request.extensions_mut().insert(Owner(owner));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_tokens_resolve_known_tokens_only() {
        let verifier = StaticTokens::new(HashMap::from([(
            "secret".to_string(),
            "alice".to_string(),
        )]));

        assert_eq!(verifier.owner("secret"), Some("alice".to_string()));
        assert_eq!(verifier.owner("guess"), None);
    }

    #[test]
    fn token_header_is_trimmed() {
        let value = HeaderValue::from_static(" secret ");
        let decoded = XToken::decode(&mut std::iter::once(&value)).unwrap();
        assert_eq!(decoded.0, "secret");
    }
}
