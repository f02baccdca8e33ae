//! OAuth identity providers.
//!
//! A provider turns an authorization `code` returned to the callback URL into
//! a [`ProviderIdentity`]. Providers are looked up by name through the
//! [`ProviderRegistry`] held in the application state.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use domain::models::user::{IdentityProviderKind, ProviderIdentity};

use crate::config::Config;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const GOOGLE_SCOPES: &str = "openid email profile";

/// Error type for OAuth operations.
#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Unknown identity provider: {0}")]
    UnknownProvider(String),

    #[error("Missing '{0}' parameter")]
    MissingParameter(&'static str),

    #[error("Authorization denied by provider: {0}")]
    Denied(String),

    #[error("OAuth state does not match")]
    StateMismatch,

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("Failed to fetch user info: {0}")]
    UserInfo(String),

    #[error("Provider returned no email address")]
    MissingEmail,

    #[error("Provider email address is not verified")]
    UnverifiedEmail,

    #[error("Invalid provider endpoint: {0}")]
    InvalidEndpoint(String),
}

/// An external identity service users can sign in with.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn kind(&self) -> IdentityProviderKind;

    /// URL the browser is sent to, carrying the signed `state`.
    fn authorization_url(&self, state: &str) -> Result<String, OAuthError>;

    /// Exchanges an authorization code for the signed-in user's identity.
    async fn exchange_code(&self, code: &str) -> Result<ProviderIdentity, OAuthError>;
}

/// Google OAuth 2.0 / OpenID Connect provider.
pub struct GoogleProvider {
    http_client: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_url: String,
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
}

/// OpenID Connect userinfo response.
#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    email: Option<String>,
    email_verified: Option<bool>,
    name: Option<String>,
    picture: Option<String>,
}

impl GoogleProvider {
    pub fn new(client_id: String, client_secret: String, redirect_url: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            client_id,
            client_secret,
            redirect_url,
        }
    }

    async fn fetch_access_token(&self, code: &str) -> Result<String, OAuthError> {
        let response = self
            .http_client
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| OAuthError::TokenExchange(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OAuthError::TokenExchange(format!(
                "Google returned status {}",
                response.status()
            )));
        }

        let token: GoogleTokenResponse = response
            .json()
            .await
            .map_err(|e| OAuthError::TokenExchange(e.to_string()))?;
        Ok(token.access_token)
    }

    async fn fetch_user_info(&self, access_token: &str) -> Result<GoogleUserInfo, OAuthError> {
        let response = self
            .http_client
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| OAuthError::UserInfo(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OAuthError::UserInfo(format!(
                "Google returned status {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| OAuthError::UserInfo(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn kind(&self) -> IdentityProviderKind {
        IdentityProviderKind::Google
    }

    fn authorization_url(&self, state: &str) -> Result<String, OAuthError> {
        let url = reqwest::Url::parse_with_params(
            GOOGLE_AUTH_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("response_type", "code"),
                ("scope", GOOGLE_SCOPES),
                ("state", state),
                ("access_type", "online"),
                ("prompt", "select_account"),
            ],
        )
        .map_err(|e| OAuthError::InvalidEndpoint(e.to_string()))?;
        Ok(url.to_string())
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderIdentity, OAuthError> {
        let access_token = self.fetch_access_token(code).await?;
        let info = self.fetch_user_info(&access_token).await?;
        identity_from_google(info)
    }
}

fn identity_from_google(info: GoogleUserInfo) -> Result<ProviderIdentity, OAuthError> {
    let email = info
        .email
        .filter(|e| !e.is_empty())
        .ok_or(OAuthError::MissingEmail)?;

    if info.email_verified == Some(false) {
        return Err(OAuthError::UnverifiedEmail);
    }

    Ok(ProviderIdentity {
        provider: IdentityProviderKind::Google,
        provider_user_id: info.sub,
        email,
        name: info.name,
        avatar_url: info.picture,
    })
}

/// Registered identity providers, keyed by name.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<&'static str, Arc<dyn IdentityProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the provider named by `auth.provider`, if any.
    pub fn from_config(config: &Config) -> Result<Self, OAuthError> {
        let mut registry = Self::new();
        let name = config.auth.provider.trim();
        if name.is_empty() {
            return Ok(registry);
        }

        let kind: IdentityProviderKind = name
            .parse()
            .map_err(|_| OAuthError::UnknownProvider(name.to_string()))?;
        match kind {
            IdentityProviderKind::Google => {
                registry.register(Arc::new(GoogleProvider::new(
                    config.auth.key.clone(),
                    config.auth.secret.clone(),
                    config.oauth_callback_url(),
                )));
            }
        }
        Ok(registry)
    }

    pub fn register(&mut self, provider: Arc<dyn IdentityProvider>) {
        tracing::info!(provider = %provider.kind(), "Registered identity provider");
        self.providers.insert(provider.kind().as_str(), provider);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn IdentityProvider>, OAuthError> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| OAuthError::UnknownProvider(name.to_string()))
    }

    /// Registered provider names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.providers.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}
