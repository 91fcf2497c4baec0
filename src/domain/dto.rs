use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Role, User};

/// Registration request
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// Login request
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Partial profile update. Absent or blank fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Token pair returned by register, login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResult {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

impl AuthResult {
    pub fn bearer(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

/// Public view of a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub role: Role,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name(),
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_result_wire_format() {
        let result = AuthResult::bearer("a.b.c".into(), "r".into(), 900);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["accessToken"], "a.b.c");
        assert_eq!(json["refreshToken"], "r");
        assert_eq!(json["tokenType"], "Bearer");
        assert_eq!(json["expiresIn"], 900);
    }

    #[test]
    fn test_register_request_reads_camel_case() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "username": "alice",
            "firstName": "Alice",
            "lastName": "Liddell",
            "password": "pw123"
        }))
        .unwrap();

        assert_eq!(req.first_name, "Alice");
        assert_eq!(req.last_name, "Liddell");
    }

    #[test]
    fn test_user_response_exposes_no_hash() {
        let user = User::new("bob".into(), "Bob".into(), "Ross".into(), "$2b$secret".into(), Role::Admin);
        let json = serde_json::to_string(&UserResponse::from(&user)).unwrap();

        assert!(!json.contains("$2b$secret"));
        assert!(json.contains("\"fullName\":\"Bob Ross\""));
        assert!(json.contains("\"role\":\"ADMIN\""));
    }
}
