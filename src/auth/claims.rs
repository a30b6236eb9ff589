use serde::{Deserialize, Serialize};

/// JWT claims structure for identity-provider ID tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (opaque user id assigned by the identity provider)
    pub sub: String,

    /// Audience
    pub aud: String,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// When the user last signed in - optional
    #[serde(default)]
    pub auth_time: Option<i64>,

    /// User email - optional
    #[serde(default)]
    pub email: Option<String>,

    /// Whether the email is verified - optional
    #[serde(default)]
    pub email_verified: Option<bool>,

    /// Display name - optional
    #[serde(default)]
    pub name: Option<String>,
}
