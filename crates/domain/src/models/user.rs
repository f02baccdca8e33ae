//! User domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A person who signed in through an identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub account_id: Option<Uuid>,
    pub role_id: Option<Uuid>,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub provider: IdentityProviderKind,
    pub provider_user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Identity providers the server knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityProviderKind {
    Google,
}

impl IdentityProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityProviderKind::Google => "google",
        }
    }
}

impl FromStr for IdentityProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" => Ok(IdentityProviderKind::Google),
            _ => Err(format!("Invalid identity provider: {}", s)),
        }
    }
}

impl fmt::Display for IdentityProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity details returned by a provider after a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    pub provider: IdentityProviderKind,
    pub provider_user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Profile of the signed-in user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub provider: IdentityProviderKind,
    pub account_id: Option<Uuid>,
    pub role: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl UserProfileResponse {
    pub fn new(user: User, role: Option<String>) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            avatar_url: user.avatar_url,
            provider: user.provider,
            account_id: user.account_id,
            role,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}
