use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// Request model for user login
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username or email
    #[oai(default)]
    pub username: String,

    #[oai(default)]
    pub password: String,
}

/// Authenticated user summary returned on login
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
#[oai(rename_all = "camelCase")]
pub struct LoginUser {
    pub id: String,
    pub username: String,
    pub full_name: String,
    /// Role name, e.g. `Mahasiswa`
    pub role: String,
    /// Permission names granted through the role, sorted
    pub permissions: Vec<String>,
}

/// Response model containing authentication tokens
#[derive(Object, Debug, Serialize, Deserialize)]
#[oai(rename_all = "camelCase")]
pub struct LoginResponse {
    /// JWT access token for API authentication
    pub token: String,

    /// Refresh token for obtaining new access tokens
    pub refresh_token: String,

    /// Token type (always "Bearer")
    pub token_type: String,

    /// Number of seconds until the access token expires
    pub expires_in: i64,

    pub user: LoginUser,
}

/// Request model for token refresh and logout
#[derive(Object, Debug, Serialize, Deserialize)]
#[oai(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[oai(default)]
    pub refresh_token: String,
}

/// Response model for token refresh
#[derive(Object, Debug, Serialize, Deserialize)]
#[oai(rename_all = "camelCase")]
pub struct RefreshResponse {
    /// New JWT access token
    pub token: String,

    pub token_type: String,

    pub expires_in: i64,
}

/// Profile of the authenticated caller
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
#[oai(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role_id: String,
}

#[derive(Object, Debug)]
pub struct LoginEnvelope {
    pub status: String,
    pub data: LoginResponse,
}

#[derive(Object, Debug)]
pub struct RefreshEnvelope {
    pub status: String,
    pub data: RefreshResponse,
}

#[derive(Object, Debug)]
pub struct ProfileEnvelope {
    pub status: String,
    pub data: ProfileResponse,
}
