//! User claims and identity-directory types
//!
//! There is no local user table: authentication and user records live in the
//! external identity provider. The server validates the provider's JWTs and
//! resolves display info through the directory API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

/// User role carried in the identity provider's token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Employee
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// JWT claims issued by the identity provider.
///
/// The role claim is trusted verbatim: the provider is the authority on
/// role assignment and this server only verifies the token signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// Opaque user identifier
    pub sub: String,
    #[serde(default)]
    pub role: Role,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

impl UserClaims {
    /// Parse and verify a JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Check if the actor holds the administrator role
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require administrator privileges.
    ///
    /// The single authorization gate in front of every admin operation;
    /// handlers never inspect the role claim directly.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Administrator privileges required".to_string()))
        }
    }
}

/// User record as returned by the identity directory API
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryUser {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub public_metadata: DirectoryMetadata,
}

/// Free-form provider metadata; only the role key is meaningful here
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryMetadata {
    pub role: Option<Role>,
}

impl DirectoryUser {
    pub fn role(&self) -> Role {
        self.public_metadata.role.unwrap_or_default()
    }

    /// Display name, falling back like the original UI did
    pub fn display_name(&self) -> String {
        self.first_name
            .clone()
            .or_else(|| self.last_name.clone())
            .unwrap_or_else(|| "Un usuario".to_string())
    }
}

/// Requester display info embedded in admin request listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
}

impl From<DirectoryUser> for UserSummary {
    fn from(user: DirectoryUser) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            image_url: user.image_url,
        }
    }
}
