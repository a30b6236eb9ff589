use super::Claims;

/// Authenticated user context extracted from a verified ID token
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// User id (from the JWT sub claim); opaque string assigned by the
    /// identity provider, also the first segment of every storage path
    pub user_id: String,

    /// User email if available
    pub email: Option<String>,

    /// Display name if available
    pub name: Option<String>,
}

impl AuthContext {
    pub fn from_claims(claims: &Claims) -> Result<Self, &'static str> {
        if claims.sub.is_empty() {
            return Err("Empty user id in token");
        }

        Ok(Self {
            user_id: claims.sub.clone(),
            email: claims.email.clone(),
            name: claims.name.clone(),
        })
    }
}
