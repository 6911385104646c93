//! User model: accounts backed by a password, a wallet, or both.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::USERNAME_REGEX;

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";

/// A Zorium user account.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v7, time-sortable)
    pub id: Uuid,

    /// Unique username (case-insensitive)
    pub username: String,

    #[serde(skip_serializing)]
    pub email: Option<String>,

    /// Argon2id password hash; absent for wallet-only accounts
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,

    /// Linked wallet address, lowercase hex
    pub wallet_address: Option<String>,

    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,

    /// "user" or "admin"
    pub role: String,

    pub email_verified: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 32, message = "Username must be 3-32 characters"))]
    #[validate(regex(
        path = *USERNAME_REGEX,
        message = "Username can only contain letters, numbers, dots, underscores, and hyphens"
    ))]
    pub username: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

/// Login request. `login` is either the username or the email address.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 3, max = 254))]
    pub login: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Safe user representation for API responses (no sensitive fields)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub wallet_address: Option<String>,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    pub bio: Option<String>,
    pub role: String,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            display_name: u.display_name,
            wallet_address: u.wallet_address,
            avatar_url: u.avatar_url,
            banner_url: u.banner_url,
            bio: u.bio,
            role: u.role,
            email_verified: u.email_verified,
            created_at: u.created_at,
        }
    }
}

/// Public profile with social counters.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: UserResponse,
    pub followers: i64,
    pub following: i64,
    pub nfts_created: i64,
    /// Set when the request carries a valid token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followed_by_me: Option<bool>,
}

/// Update profile request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 32))]
    #[validate(regex(path = *USERNAME_REGEX))]
    pub username: Option<String>,

    #[validate(length(max = 64))]
    pub display_name: Option<String>,

    #[validate(length(max = 500))]
    pub bio: Option<String>,

    #[validate(url)]
    pub avatar_url: Option<String>,

    #[validate(url)]
    pub banner_url: Option<String>,
}

/// Admin role change.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Signed sign-in challenge returned by a wallet.
#[derive(Debug, Deserialize, Validate)]
pub struct WalletAuthRequest {
    #[validate(length(equal = 42, message = "Address must be 0x followed by 40 hex characters"))]
    pub address: String,

    #[validate(length(min = 130, max = 132, message = "Signature must be 65 hex-encoded bytes"))]
    pub signature: String,
}
